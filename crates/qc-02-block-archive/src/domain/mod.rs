//! # Domain Layer - Block Archive Subsystem
//!
//! - `entities`: ArchivedBlock, SerializedBlock, RecordVersion, ArchiveConfig
//! - `directory`: segment file names and the directory snapshot
//! - `segment`: segment header and record lookup
//! - `codec`: v1 and v2 record decoders
//! - `errors`: ArchiveError

pub mod codec;
pub mod directory;
pub mod entities;
pub mod errors;
pub mod segment;

pub use codec::*;
pub use directory::*;
pub use entities::*;
pub use errors::*;
pub use segment::*;
