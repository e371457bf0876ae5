//! Adapters layer for the Transaction Admission subsystem.
//!
//! - `worker`: tokio task driving the cycle
//! - `chain_lock`: the shared non-blocking chain-state lock

pub mod chain_lock;
pub mod worker;

pub use chain_lock::{ChainLock, HeldChainLock};
pub use worker::AdmissionWorker;
