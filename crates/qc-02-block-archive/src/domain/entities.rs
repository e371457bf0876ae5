//! # Archive Entities
//!
//! Decoded archived blocks, raw serialized records and the reader
//! configuration.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use std::path::PathBuf;

pub use shared_types::{BlockHeight, PublicKey, Signature, Timestamp};

/// Header fields of an archived block.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedBlockHeader {
    pub height: BlockHeight,
    /// Block timestamp (ms).
    pub timestamp: Timestamp,
    /// Signature of the parent block.
    #[serde_as(as = "Bytes")]
    pub reference: Signature,
    /// Minting account's public key.
    pub minter: PublicKey,
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
}

/// Automated-transaction state carried with a block.
///
/// Version 1 records carry every AT state; version 2 records only a hash
/// over them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtStates {
    Full(Vec<Vec<u8>>),
    Hash([u8; 32]),
}

/// A finalized block as decoded from an archive segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedBlock {
    pub header: ArchivedBlockHeader,
    /// Encoded transactions, in block order.
    pub transactions: Vec<Vec<u8>>,
    pub at_states: AtStates,
}

impl ArchivedBlock {
    pub fn height(&self) -> BlockHeight {
        self.header.height
    }

    pub fn signature(&self) -> &Signature {
        &self.header.signature
    }
}

/// Block record encoding, taken from the segment's format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordVersion {
    V1,
    V2,
}

impl RecordVersion {
    /// Map a segment header's format version.
    pub fn from_format(version: i32) -> Option<Self> {
        match version {
            1 => Some(Self::V1),
            2 => Some(Self::V2),
            _ => None,
        }
    }

    pub fn as_format(&self) -> i32 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
        }
    }
}

/// Raw record payload exactly as stored, for relaying to peers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedBlock {
    pub height: BlockHeight,
    pub version: RecordVersion,
    pub bytes: Vec<u8>,
}

/// Archive reader configuration.
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    /// Directory holding `<start>-<end>.<ext>` segment files.
    pub archive_dir: PathBuf,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            archive_dir: PathBuf::from("./data/archive"),
        }
    }
}

impl ArchiveConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the segment directory.
    pub fn with_archive_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.archive_dir = dir.into();
        self
    }
}
