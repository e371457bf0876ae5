//! # Core Domain Entities
//!
//! Primitives shared between the Transaction Admission (qc-06) and
//! Block Archive (qc-02) subsystems.

use serde::{Deserialize, Serialize};

/// A 64-byte Ed25519 signature. Transactions and blocks are keyed by it.
pub type Signature = [u8; 64];

/// A 32-byte Ed25519 public key.
pub type PublicKey = [u8; 32];

/// Timestamp in milliseconds since UNIX epoch.
pub type Timestamp = u64;

/// Height of a block in the chain (genesis is 1).
pub type BlockHeight = u32;

/// Text encoding of a signature, used as the key of cool-down records
/// and in log output.
pub fn signature_to_text(signature: &Signature) -> String {
    hex::encode(signature)
}

/// Short prefix of a signature for log lines.
pub fn short_signature(signature: &Signature) -> String {
    hex::encode(&signature[..4])
}

/// The most recently accepted block, used as the reference point for
/// transaction deadline checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainTip {
    /// Height of the tip block.
    pub height: BlockHeight,
    /// Timestamp of the tip block (ms).
    pub timestamp: Timestamp,
}

impl ChainTip {
    pub fn new(height: BlockHeight, timestamp: Timestamp) -> Self {
        Self { height, timestamp }
    }
}

/// Transaction class.
///
/// `Chat` is the low-priority class: it is kept out of the per-cycle
/// unconfirmed cache but imported like every other type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Payment,
    Transfer,
    Message,
    Chat,
    Other(u8),
}

impl TransactionType {
    /// Wire tag of this type.
    pub fn tag(&self) -> u8 {
        match self {
            TransactionType::Payment => 2,
            TransactionType::Transfer => 12,
            TransactionType::Message => 17,
            TransactionType::Chat => 18,
            TransactionType::Other(tag) => *tag,
        }
    }

    /// Inverse of [`TransactionType::tag`].
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            2 => TransactionType::Payment,
            12 => TransactionType::Transfer,
            17 => TransactionType::Message,
            18 => TransactionType::Chat,
            other => TransactionType::Other(other),
        }
    }
}
