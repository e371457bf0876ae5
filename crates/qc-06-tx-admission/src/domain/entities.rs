//! Core domain entities for the Transaction Admission subsystem.
//!
//! Defines the candidate state machine and the transaction payload carried
//! through the validate and import phases.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use std::time::Duration;

// Re-export from shared-types for convenience
pub use shared_types::{ChainTip, PublicKey, Signature, Timestamp, TransactionType};

/// How long a transaction stays importable after its own timestamp (24h).
pub const TRANSACTION_LIFETIME_MS: u64 = 24 * 60 * 60 * 1000;

/// A transaction relayed by a peer.
///
/// The body is opaque to this subsystem; only the signature and deadline
/// are checked here. Everything else is the repository's business.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction class.
    pub tx_type: TransactionType,
    /// Creation timestamp (ms).
    pub timestamp: Timestamp,
    /// Creator's Ed25519 public key.
    pub creator: PublicKey,
    /// Encoded type-specific fields.
    pub body: Vec<u8>,
    /// Creator's signature over [`Transaction::signed_bytes`].
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
}

impl Transaction {
    /// Last moment (ms) at which this transaction may still be included.
    pub fn deadline(&self) -> Timestamp {
        self.timestamp.saturating_add(TRANSACTION_LIFETIME_MS)
    }

    /// True once the chain tip has reached or passed the deadline.
    pub fn is_expired_at(&self, tip: &ChainTip) -> bool {
        self.deadline() <= tip.timestamp
    }

    /// Bytes covered by the signature:
    /// `type tag (1) || timestamp (u64 BE) || creator (32) || body`.
    pub fn signed_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + 8 + 32 + self.body.len());
        bytes.push(self.tx_type.tag());
        bytes.extend_from_slice(&self.timestamp.to_be_bytes());
        bytes.extend_from_slice(&self.creator);
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

/// Validation tag of a queued candidate.
///
/// ```text
/// [Unvalidated] ──verify──→ [SignatureValid] ──import──→ (removed)
///       │                          │
///       └── expired/bad sig ──→ (removed, cool-down)
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize)]
pub enum ValidationState {
    /// Received, not yet checked.
    #[default]
    Unvalidated,
    /// Signature checked (or trusted in lite mode); eligible for import.
    SignatureValid,
}

/// A transaction held in the admission queue.
///
/// INVARIANT: at most one candidate per signature (enforced by the queue).
#[derive(Clone, Debug)]
pub struct CandidateTransaction {
    /// The relayed transaction.
    pub transaction: Transaction,
    /// Current validation tag.
    pub state: ValidationState,
    /// When the candidate was queued (ms).
    pub received_at: Timestamp,
}

impl CandidateTransaction {
    pub fn new(transaction: Transaction, received_at: Timestamp) -> Self {
        Self {
            transaction,
            state: ValidationState::Unvalidated,
            received_at,
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.transaction.signature
    }

    pub fn is_signature_valid(&self) -> bool {
        matches!(self.state, ValidationState::SignatureValid)
    }

    /// Flip the tag to `SignatureValid`. Returns false if it already was.
    pub fn mark_signature_valid(&mut self) -> bool {
        if self.is_signature_valid() {
            return false;
        }
        self.state = ValidationState::SignatureValid;
        true
    }
}

/// Admission pipeline configuration.
#[derive(Clone, Debug)]
pub struct AdmissionConfig {
    /// Period between cycles.
    pub cycle_interval: Duration,
    /// Cool-down after a candidate expired against the chain tip.
    pub expired_cooldown_ms: u64,
    /// Cool-down after a bad signature or a rejected import.
    pub invalid_cooldown_ms: u64,
    /// Cool-down after an import rejected as "timestamp too old".
    pub timestamp_too_old_cooldown_ms: u64,
    /// Trust peer-supplied signatures instead of verifying them.
    pub lite_mode: bool,
    /// Types kept out of the per-cycle unconfirmed cache.
    pub low_priority_types: Vec<TransactionType>,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            cycle_interval: Duration::from_millis(500),
            expired_cooldown_ms: 10 * 60 * 1000,                 // 10 minutes
            invalid_cooldown_ms: 60 * 60 * 1000,                 // 1 hour
            timestamp_too_old_cooldown_ms: 24 * 60 * 60 * 1000, // 24 hours
            lite_mode: false,
            low_priority_types: vec![TransactionType::Chat],
        }
    }
}

impl AdmissionConfig {
    /// Creates a config with a fast cycle for testing.
    pub fn for_testing() -> Self {
        Self {
            cycle_interval: Duration::from_millis(10),
            ..Default::default()
        }
    }

    /// Enable or disable lite mode.
    pub fn with_lite_mode(mut self, lite_mode: bool) -> Self {
        self.lite_mode = lite_mode;
        self
    }

    /// Set the cycle period.
    pub fn with_cycle_interval(mut self, interval: Duration) -> Self {
        self.cycle_interval = interval;
        self
    }

    /// Set the low-priority transaction classes.
    pub fn with_low_priority_types(mut self, types: Vec<TransactionType>) -> Self {
        self.low_priority_types = types;
        self
    }

    /// True if `tx_type` is kept out of the unconfirmed cache.
    pub fn is_low_priority(&self, tx_type: TransactionType) -> bool {
        self.low_priority_types.contains(&tx_type)
    }
}
