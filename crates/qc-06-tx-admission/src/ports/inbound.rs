//! # Inbound Port - TransactionAdmissionApi
//!
//! Primary driving port of the admission pipeline.
//!
//! | Method | Caller |
//! |--------|--------|
//! | `submit` | Network receive path |
//! | `filter_unknown_signatures` | Network receive path (signature announcements) |
//! | `run_cycle` | `AdmissionWorker` every cycle interval |
//! | `request_stop` | Node lifecycle |
//! | read accessors | API / monitoring, any thread |

use crate::domain::{
    AdmissionResult, AdmissionStatus, CycleReport, Signature, SubmitOutcome, Transaction,
};

/// Primary API for the Transaction Admission subsystem.
pub trait TransactionAdmissionApi: Send + Sync {
    /// Queue a peer-relayed transaction. No validation happens here.
    fn submit(&self, tx: Transaction) -> SubmitOutcome;

    /// Run validate, import and cleanup phases once, in that order.
    fn run_cycle(&self) -> CycleReport;

    /// Ask in-flight and future cycles to stop at the next check.
    fn request_stop(&self);

    /// True once `request_stop` was called.
    fn is_stopped(&self) -> bool;

    /// Of `signatures`, those not queued, not cooling down and not in the
    /// repository.
    fn filter_unknown_signatures(
        &self,
        signatures: &[Signature],
    ) -> AdmissionResult<Vec<Signature>>;

    /// Number of queued candidates.
    fn pending_count(&self) -> usize;

    /// Number of queued candidates tagged `SignatureValid`.
    fn validated_count(&self) -> usize;

    /// Number of signatures on cool-down.
    fn invalid_count(&self) -> usize;

    fn is_queued(&self, signature: &Signature) -> bool;

    fn is_cooling_down(&self, signature: &Signature) -> bool;

    /// Monitoring snapshot.
    fn status(&self) -> AdmissionStatus;
}
