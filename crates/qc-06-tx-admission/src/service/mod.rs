//! # Transaction Importer Service
//!
//! Application service implementing [`TransactionAdmissionApi`].
//!
//! ## Cycle
//!
//! ```text
//! run_cycle()
//!   ├─ validate-phase  deadline check on all, Unvalidated → SignatureValid | Invalid
//!   ├─ import-phase    SignatureValid → repository (under chain lock)
//!   └─ cleanup-phase   purge cool-downs past expiry
//! ```
//!
//! Each phase works on a snapshot of the queue taken at phase entry.
//! Failures end the phase early; the next cycle retries.

use crate::domain::{
    verify_batch, AdmissionConfig, AdmissionError, AdmissionResult, AdmissionStatus,
    CandidateQueue, CandidateTransaction, CycleReport, ImportResult, ImportSkipReason,
    InvalidReason, InvalidTransactionRecords, Signature, SubmitOutcome, Transaction,
    UnconfirmedCache,
};
use crate::ports::inbound::TransactionAdmissionApi;
use crate::ports::outbound::{
    ChainLockGuard, ChainState, SignatureBroadcaster, SyncCoordinator, TimeSource,
    TransactionRepository,
};
use shared_types::short_signature;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

#[cfg(test)]
mod tests;

/// Dependencies for the importer.
pub struct AdmissionDependencies<R, C, S, B, T>
where
    R: TransactionRepository,
    C: ChainState,
    S: SyncCoordinator,
    B: SignatureBroadcaster,
    T: TimeSource,
{
    pub repository: R,
    pub chain_state: C,
    pub sync: S,
    pub broadcaster: B,
    pub time_source: T,
}

/// The transaction admission pipeline.
///
/// Constructed explicitly by the node and shared behind an `Arc` between
/// the network receive path and the [`AdmissionWorker`](crate::adapters::AdmissionWorker).
pub struct TransactionImporter<R, C, S, B, T>
where
    R: TransactionRepository,
    C: ChainState,
    S: SyncCoordinator,
    B: SignatureBroadcaster,
    T: TimeSource,
{
    repository: R,
    chain_state: C,
    sync: S,
    broadcaster: B,
    time_source: T,
    config: AdmissionConfig,
    queue: CandidateQueue,
    invalid: InvalidTransactionRecords,
    stop_requested: AtomicBool,
}

impl<R, C, S, B, T> TransactionImporter<R, C, S, B, T>
where
    R: TransactionRepository,
    C: ChainState,
    S: SyncCoordinator,
    B: SignatureBroadcaster,
    T: TimeSource,
{
    pub fn new(deps: AdmissionDependencies<R, C, S, B, T>, config: AdmissionConfig) -> Self {
        Self {
            repository: deps.repository,
            chain_state: deps.chain_state,
            sync: deps.sync,
            broadcaster: deps.broadcaster,
            time_source: deps.time_source,
            config,
            queue: CandidateQueue::new(),
            invalid: InvalidTransactionRecords::new(),
            stop_requested: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &AdmissionConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn chain_state(&self) -> &C {
        &self.chain_state
    }

    pub fn sync(&self) -> &S {
        &self.sync
    }

    pub fn broadcaster(&self) -> &B {
        &self.broadcaster
    }

    pub fn time_source(&self) -> &T {
        &self.time_source
    }

    /// Expiry of a signature's cool-down, if it has one.
    pub fn cooldown_expiry(&self, signature: &Signature) -> Option<u64> {
        self.invalid.expiry_of(signature)
    }

    // =========================================================================
    // VALIDATE PHASE
    // =========================================================================

    fn validate_phase(&self, report: &mut CycleReport) -> AdmissionResult<()> {
        let candidates = self.queue.snapshot();
        if candidates.is_empty() {
            return Ok(());
        }

        let tip = self.chain_state.current_tip()?;
        let now = self.time_source.now();

        let mut to_verify = Vec::new();
        for candidate in candidates {
            let tx = &candidate.transaction;
            // deadlines are checked every cycle, validated candidates included
            if let Some(tip) = tip.as_ref() {
                if tx.is_expired_at(tip) {
                    debug!(
                        "[qc-06] Expired transaction {} (deadline {} <= tip {})",
                        short_signature(&tx.signature),
                        tx.deadline(),
                        tip.timestamp
                    );
                    self.queue.remove(&tx.signature);
                    self.invalid
                        .record(&tx.signature, now + self.config.expired_cooldown_ms);
                    report.expired += 1;
                    continue;
                }
            }

            if candidate.is_signature_valid() {
                continue;
            }

            if self.config.lite_mode {
                if self.queue.mark_signature_valid(&tx.signature) {
                    report.validated += 1;
                }
                continue;
            }

            to_verify.push(candidate.transaction);
        }

        for (signature, valid) in verify_batch(&to_verify) {
            if valid {
                if self.queue.mark_signature_valid(&signature) {
                    report.validated += 1;
                }
            } else {
                debug!(
                    "[qc-06] Bad signature on transaction {}",
                    short_signature(&signature)
                );
                self.queue.remove(&signature);
                self.invalid
                    .record(&signature, now + self.config.invalid_cooldown_ms);
                report.rejected += 1;
            }
        }

        if report.validated > 0 {
            debug!("[qc-06] Validated {} transactions", report.validated);
        }
        Ok(())
    }

    // =========================================================================
    // IMPORT PHASE
    // =========================================================================

    fn import_phase(&self, report: &mut CycleReport) -> AdmissionResult<()> {
        let validated = self.queue.snapshot_validated();
        if validated.is_empty() {
            return Ok(());
        }

        if self.sync.sync_in_progress() || self.sync.sync_request_pending() {
            debug!("[qc-06] Sync active, deferring import of {} transactions", validated.len());
            report.import_skipped = Some(ImportSkipReason::Synchronizing);
            return Ok(());
        }

        let mut imported = Vec::new();
        let result = {
            let Some(_lock) = ChainLockGuard::try_acquire(&self.chain_state) else {
                debug!("[qc-06] Chain lock busy, deferring import");
                report.import_skipped = Some(ImportSkipReason::ChainLockBusy);
                return Ok(());
            };

            let mut cache = UnconfirmedCache::new(
                self.repository
                    .unconfirmed_transactions(&self.config.low_priority_types)?,
            );
            self.import_batch(validated, &mut cache, &mut imported, report)
        };

        // announced after the chain lock is released
        if !imported.is_empty() {
            info!("[qc-06] Imported {} transactions", imported.len());
            if let Err(e) = self.broadcaster.announce(&imported) {
                warn!("[qc-06] Failed to announce imported transactions: {}", e);
            }
        }

        result
    }

    fn import_batch(
        &self,
        validated: Vec<Transaction>,
        cache: &mut UnconfirmedCache,
        imported: &mut Vec<Signature>,
        report: &mut CycleReport,
    ) -> AdmissionResult<()> {
        for tx in validated {
            if self.is_stopped() {
                report.import_interrupted = true;
                return Err(AdmissionError::Stopped);
            }
            if self.sync.sync_request_pending() {
                debug!("[qc-06] Sync requested, abandoning rest of import batch");
                report.import_interrupted = true;
                return Ok(());
            }

            let signature = tx.signature;
            match self.repository.save_as_unconfirmed(&tx, cache)? {
                ImportResult::Ok => {
                    self.queue.remove(&signature);
                    imported.push(signature);
                    report.imported += 1;
                    if !self.config.is_low_priority(tx.tx_type) {
                        cache.push(tx);
                    }
                }
                ImportResult::AlreadyExists => {
                    self.queue.remove(&signature);
                    report.already_known += 1;
                }
                ImportResult::LockUnavailable => {
                    debug!(
                        "[qc-06] Repository lock unavailable for {}, retrying later",
                        short_signature(&signature)
                    );
                }
                ImportResult::Invalid(reason) => {
                    debug!(
                        "[qc-06] Transaction {} rejected: {}",
                        short_signature(&signature),
                        reason
                    );
                    self.queue.remove(&signature);
                    self.invalid
                        .record(&signature, self.time_source.now() + self.cooldown_for(&reason));
                    report.rejected += 1;
                }
            }
        }
        Ok(())
    }

    fn cooldown_for(&self, reason: &InvalidReason) -> u64 {
        match reason {
            InvalidReason::TimestampTooOld => self.config.timestamp_too_old_cooldown_ms,
            _ => self.config.invalid_cooldown_ms,
        }
    }

    // =========================================================================
    // CLEANUP PHASE
    // =========================================================================

    fn cleanup_phase(&self, report: &mut CycleReport) {
        report.purged = self.invalid.purge_expired(self.time_source.now());
    }
}

impl<R, C, S, B, T> TransactionAdmissionApi for TransactionImporter<R, C, S, B, T>
where
    R: TransactionRepository,
    C: ChainState,
    S: SyncCoordinator,
    B: SignatureBroadcaster,
    T: TimeSource,
{
    fn submit(&self, tx: Transaction) -> SubmitOutcome {
        let now = self.time_source.now();
        if self.invalid.is_cooling_down(&tx.signature, now) {
            return SubmitOutcome::CoolingDown;
        }
        if self.queue.insert_if_absent(CandidateTransaction::new(tx, now)) {
            SubmitOutcome::Queued
        } else {
            SubmitOutcome::AlreadyQueued
        }
    }

    fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();
        if self.is_stopped() {
            report.stopped = true;
            return report;
        }

        if let Err(e) = self.validate_phase(&mut report) {
            warn!("[qc-06] Validate phase aborted: {}", e);
        }
        report.pending_import = self.queue.validated_len();
        if report.pending_import > 0 {
            debug!("[qc-06] {} transactions pending import", report.pending_import);
        }
        match self.import_phase(&mut report) {
            Ok(()) => {}
            Err(AdmissionError::Stopped) => {
                report.stopped = true;
                return report;
            }
            Err(e) => warn!("[qc-06] Import phase aborted: {}", e),
        }
        self.cleanup_phase(&mut report);
        report
    }

    fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    fn is_stopped(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    fn filter_unknown_signatures(
        &self,
        signatures: &[Signature],
    ) -> AdmissionResult<Vec<Signature>> {
        let now = self.time_source.now();
        let mut unknown = Vec::new();
        for signature in signatures {
            if self.queue.contains(signature) || self.invalid.is_cooling_down(signature, now) {
                continue;
            }
            if !self.repository.exists(signature)? {
                unknown.push(*signature);
            }
        }
        Ok(unknown)
    }

    fn pending_count(&self) -> usize {
        self.queue.len()
    }

    fn validated_count(&self) -> usize {
        self.queue.validated_len()
    }

    fn invalid_count(&self) -> usize {
        self.invalid.len()
    }

    fn is_queued(&self, signature: &Signature) -> bool {
        self.queue.contains(signature)
    }

    fn is_cooling_down(&self, signature: &Signature) -> bool {
        self.invalid
            .is_cooling_down(signature, self.time_source.now())
    }

    fn status(&self) -> AdmissionStatus {
        AdmissionStatus {
            pending: self.queue.len(),
            validated: self.queue.validated_len(),
            invalid: self.invalid.len(),
            lite_mode: self.config.lite_mode,
        }
    }
}
