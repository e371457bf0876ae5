//! # Shared Types Crate
//!
//! Primitives shared by the Transaction Admission (qc-06) and Block
//! Archive (qc-02) subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: signature, key, height and timestamp types
//!   are defined once here.
//! - **Transient repository failures**: every port backed by the repository
//!   reports [`RepositoryError`], which callers treat as "try again later".

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
