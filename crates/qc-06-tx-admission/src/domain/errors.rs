//! Admission error types.

use shared_types::RepositoryError;
use thiserror::Error;

/// Transaction Admission subsystem errors.
///
/// None of these are fatal: a phase that fails is abandoned and the next
/// cycle tries again.
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// Repository or chain-state port failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Stop was requested while work was in flight.
    #[error("Admission pipeline stopped")]
    Stopped,

    /// Background worker task failed to join.
    #[error("Admission worker failed: {0}")]
    Worker(String),
}

/// Result type for admission operations
pub type AdmissionResult<T> = Result<T, AdmissionError>;
