//! # Error Types
//!
//! Defines error types used across subsystems.

use thiserror::Error;

/// Failure reported by a repository-backed port.
///
/// Always transient from the caller's point of view: the operation is
/// abandoned and retried on the next scheduled pass.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// Underlying storage could not be read or written.
    #[error("Repository I/O error: {0}")]
    Io(String),

    /// The repository session could not be opened or was closed underneath us.
    #[error("Repository unavailable: {0}")]
    Unavailable(String),

    /// Stored data could not be decoded.
    #[error("Repository data corrupt: {0}")]
    Corrupt(String),
}
