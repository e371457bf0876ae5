//! Value objects for the Transaction Admission subsystem.

use serde::Serialize;

/// Outcome of handing a candidate to the repository.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportResult {
    /// Saved as unconfirmed.
    Ok,
    /// Repository already holds this transaction.
    AlreadyExists,
    /// Repository could not take the chain lock; try again later.
    LockUnavailable,
    /// Rejected by the repository's own validity checks.
    Invalid(InvalidReason),
}

/// Why the repository refused a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvalidReason {
    /// Timestamp older than the repository accepts. Gets the long cool-down.
    TimestampTooOld,
    /// Timestamp too far in the future.
    TimestampTooNew,
    /// Creator cannot cover the fee.
    InsufficientFee,
    /// Any other type-specific rule.
    Other(String),
}

impl std::fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TimestampTooOld => write!(f, "timestamp too old"),
            Self::TimestampTooNew => write!(f, "timestamp too new"),
            Self::InsufficientFee => write!(f, "insufficient fee"),
            Self::Other(reason) => write!(f, "{}", reason),
        }
    }
}

/// Result of `submit`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// New candidate queued as unvalidated.
    Queued,
    /// A candidate with the same signature is already queued.
    AlreadyQueued,
    /// Signature was recently rejected or expired; ignored until the cool-down ends.
    CoolingDown,
}

/// Why an import phase did nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ImportSkipReason {
    /// Full-chain sync in progress or requested.
    Synchronizing,
    /// Chain lock held by another subsystem.
    ChainLockBusy,
}

/// Counters produced by one `run_cycle`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Candidates newly tagged `SignatureValid`.
    pub validated: usize,
    /// Candidates removed because their deadline passed.
    pub expired: usize,
    /// Candidates removed for a bad signature or an invalid import.
    pub rejected: usize,
    /// Candidates saved as unconfirmed.
    pub imported: usize,
    /// Candidates the repository already held.
    pub already_known: usize,
    /// `SignatureValid` candidates waiting after the validate phase.
    pub pending_import: usize,
    /// Cool-down records purged.
    pub purged: usize,
    /// Set when the import phase was skipped entirely.
    pub import_skipped: Option<ImportSkipReason>,
    /// Set when the import batch stopped early (sync request or stop signal).
    pub import_interrupted: bool,
    /// Set when the cycle did not run because the pipeline is stopping.
    pub stopped: bool,
}

impl CycleReport {
    /// True if anything moved in this cycle.
    pub fn has_activity(&self) -> bool {
        self.validated + self.expired + self.rejected + self.imported + self.already_known
            + self.purged
            > 0
    }
}

/// Monitoring snapshot of the pipeline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AdmissionStatus {
    /// All queued candidates.
    pub pending: usize,
    /// Queued candidates tagged `SignatureValid`.
    pub validated: usize,
    /// Signatures currently in a cool-down.
    pub invalid: usize,
    /// Pipeline runs in lite mode.
    pub lite_mode: bool,
}
