//! # Archive Errors
//!
//! Every variant is recoverable: the public fetch operations log the error
//! and report "not found".

use shared_types::{BlockHeight, RepositoryError};
use thiserror::Error;

/// Block Archive subsystem errors.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Directory listing or segment read failed.
    #[error("Archive I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Segment header carries a format version the reader does not know.
    #[error("Unsupported archive format version {0}")]
    UnsupportedVersion(i32),

    /// Requested height lies outside the segment's declared range.
    #[error("Height {height} outside segment range {start}-{end}")]
    HeightOutOfRange { height: i64, start: i64, end: i64 },

    /// Record found at the indexed offset belongs to another height.
    #[error("Expected block at height {expected}, found height {found}")]
    HeightMismatch { expected: BlockHeight, found: i64 },

    /// File or record ended before `context` could be read.
    #[error("Truncated archive data while reading {0}")]
    Truncated(&'static str),

    /// Structurally invalid data (negative length, trailing bytes, bincode failure).
    #[error("Archive decode error: {0}")]
    Decode(String),

    /// Archive index lookup failed.
    #[error("Archive index error: {0}")]
    Index(#[from] RepositoryError),
}

impl From<bincode::Error> for ArchiveError {
    fn from(err: bincode::Error) -> Self {
        ArchiveError::Decode(err.to_string())
    }
}

/// Result type for archive operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Map an I/O failure, turning an early end of file into `Truncated`.
pub(crate) fn read_error(err: std::io::Error, context: &'static str) -> ArchiveError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        ArchiveError::Truncated(context)
    } else {
        ArchiveError::Io(err)
    }
}
