//! # Domain Layer - Transaction Admission Subsystem
//!
//! Pure business logic: no I/O, no scheduling.
//!
//! ## Components
//!
//! - `entities`: Transaction, CandidateTransaction, ValidationState, AdmissionConfig
//! - `queue`: CandidateQueue keyed by signature
//! - `invalid`: InvalidTransactionRecords (cool-downs)
//! - `unconfirmed_cache`: per-import-phase UnconfirmedCache
//! - `services`: Ed25519 signature verification
//! - `value_objects`: ImportResult, SubmitOutcome, CycleReport, AdmissionStatus
//! - `errors`: AdmissionError enumeration

pub mod entities;
pub mod errors;
pub mod invalid;
pub mod queue;
pub mod services;
pub mod unconfirmed_cache;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use invalid::*;
pub use queue::*;
pub use services::*;
pub use unconfirmed_cache::*;
pub use value_objects::*;
