use super::*;
use crate::domain::{ChainTip, TransactionType, TRANSACTION_LIFETIME_MS};
use crate::test_utils::*;

const NOW: u64 = 1_700_000_000_000;
const TIP: u64 = NOW;
const TEN_MINUTES: u64 = 10 * 60 * 1000;
const ONE_HOUR: u64 = 60 * 60 * 1000;
const ONE_DAY: u64 = 24 * ONE_HOUR;

fn importer() -> TestImporter {
    make_importer(AdmissionConfig::for_testing(), NOW, TIP)
}

fn payment(seed: u8, body: &[u8]) -> Transaction {
    signed_tx(&signing_key(seed), TransactionType::Payment, NOW - 1_000, body)
}

fn chat(seed: u8, body: &[u8]) -> Transaction {
    signed_tx(&signing_key(seed), TransactionType::Chat, NOW - 1_000, body)
}

// =============================================================================
// SUBMIT
// =============================================================================

#[test]
fn test_submit_queues_unvalidated() {
    let importer = importer();
    let tx = payment(1, b"a");

    assert_eq!(importer.submit(tx.clone()), SubmitOutcome::Queued);
    assert!(importer.is_queued(&tx.signature));
    assert_eq!(importer.pending_count(), 1);
    assert_eq!(importer.validated_count(), 0);
}

#[test]
fn test_submit_duplicate_signature_is_ignored() {
    let importer = importer();
    let tx = payment(1, b"a");

    assert_eq!(importer.submit(tx.clone()), SubmitOutcome::Queued);
    assert_eq!(importer.submit(tx), SubmitOutcome::AlreadyQueued);
    assert_eq!(importer.pending_count(), 1);
}

// =============================================================================
// VALIDATE PHASE
// =============================================================================

#[test]
fn test_valid_transaction_is_imported_and_announced() {
    let importer = importer();
    let tx = payment(1, b"a");
    importer.submit(tx.clone());

    let report = importer.run_cycle();

    assert_eq!(report.validated, 1);
    assert_eq!(report.imported, 1);
    assert!(importer.repository().contains(&tx.signature));
    assert!(!importer.is_queued(&tx.signature));
    assert_eq!(importer.broadcaster().messages(), vec![vec![tx.signature]]);
    assert!(!importer.chain_state().lock().is_held());
}

#[test]
fn test_expired_transaction_removed_with_short_cooldown() {
    let importer = importer();
    let tx = signed_tx(
        &signing_key(1),
        TransactionType::Payment,
        TIP - TRANSACTION_LIFETIME_MS,
        b"old",
    );
    importer.submit(tx.clone());

    let report = importer.run_cycle();

    assert_eq!(report.expired, 1);
    assert_eq!(report.imported, 0);
    assert!(!importer.is_queued(&tx.signature));
    assert_eq!(importer.cooldown_expiry(&tx.signature), Some(NOW + TEN_MINUTES));
    assert_eq!(importer.repository().save_calls(), 0);
}

#[test]
fn test_deadline_just_after_tip_is_not_expired() {
    let importer = importer();
    let tx = signed_tx(
        &signing_key(1),
        TransactionType::Payment,
        TIP - TRANSACTION_LIFETIME_MS + 1,
        b"edge",
    );
    importer.submit(tx);

    let report = importer.run_cycle();

    assert_eq!(report.expired, 0);
    assert_eq!(report.imported, 1);
}

#[test]
fn test_bad_signature_rejected_and_resubmit_ignored() {
    let importer = importer();
    let tx = badly_signed_tx(&signing_key(1), NOW - 1_000, b"forged");
    importer.submit(tx.clone());

    let report = importer.run_cycle();

    assert_eq!(report.rejected, 1);
    assert!(!importer.is_queued(&tx.signature));
    assert_eq!(importer.cooldown_expiry(&tx.signature), Some(NOW + ONE_HOUR));
    assert_eq!(importer.repository().save_calls(), 0);

    importer.time_source().advance(10_000);
    assert_eq!(importer.submit(tx.clone()), SubmitOutcome::CoolingDown);
    assert!(!importer.is_queued(&tx.signature));
    assert!(importer.is_cooling_down(&tx.signature));
}

#[test]
fn test_lite_mode_skips_signature_check() {
    let importer = make_importer(AdmissionConfig::for_testing().with_lite_mode(true), NOW, TIP);
    let tx = badly_signed_tx(&signing_key(1), NOW - 1_000, b"trusted");
    importer.submit(tx.clone());

    let report = importer.run_cycle();

    assert_eq!(report.validated, 1);
    assert_eq!(report.rejected, 0);
    assert!(importer.repository().contains(&tx.signature));
}

#[test]
fn test_lite_mode_still_drops_expired() {
    let importer = make_importer(AdmissionConfig::for_testing().with_lite_mode(true), NOW, TIP);
    let tx = signed_tx(
        &signing_key(1),
        TransactionType::Payment,
        TIP - TRANSACTION_LIFETIME_MS - 5,
        b"old",
    );
    importer.submit(tx.clone());

    let report = importer.run_cycle();

    assert_eq!(report.expired, 1);
    assert!(importer.is_cooling_down(&tx.signature));
}

#[test]
fn test_no_tip_skips_expiry_check() {
    let importer = importer();
    importer.chain_state().set_tip(None);
    let tx = signed_tx(&signing_key(1), TransactionType::Payment, 5, b"ancient");
    importer.submit(tx);

    let report = importer.run_cycle();

    assert_eq!(report.expired, 0);
    assert_eq!(report.imported, 1);
}

#[test]
fn test_validated_candidate_expires_while_import_deferred() {
    let importer = importer();
    importer.sync().set_in_progress(true);
    // deadline one millisecond past the current tip
    let tx = signed_tx(
        &signing_key(1),
        TransactionType::Payment,
        TIP - TRANSACTION_LIFETIME_MS + 1,
        b"late",
    );
    importer.submit(tx.clone());

    let report = importer.run_cycle();
    assert_eq!(report.validated, 1);
    assert_eq!(importer.validated_count(), 1);

    importer.chain_state().set_tip(Some(ChainTip {
        height: 101,
        timestamp: TIP + 5_000,
    }));
    importer.sync().set_in_progress(false);
    let report = importer.run_cycle();

    assert_eq!(report.expired, 1);
    assert_eq!(report.imported, 0);
    assert_eq!(report.pending_import, 0);
    assert!(!importer.is_queued(&tx.signature));
    assert!(!importer.repository().contains(&tx.signature));
    assert_eq!(importer.cooldown_expiry(&tx.signature), Some(NOW + TEN_MINUTES));
    assert_eq!(importer.broadcaster().message_count(), 0);
}

#[test]
fn test_tip_failure_ends_validate_phase() {
    let importer = importer();
    importer.chain_state().set_tip_failing(true);
    let tx = payment(1, b"a");
    importer.submit(tx.clone());

    let report = importer.run_cycle();

    assert_eq!(report.validated, 0);
    assert_eq!(report.imported, 0);
    assert!(importer.is_queued(&tx.signature));
    assert_eq!(importer.validated_count(), 0);

    importer.chain_state().set_tip_failing(false);
    let report = importer.run_cycle();
    assert_eq!(report.imported, 1);
}

// =============================================================================
// IMPORT PHASE
// =============================================================================

#[test]
fn test_sync_in_progress_defers_import() {
    let importer = importer();
    importer.sync().set_in_progress(true);
    let tx = payment(1, b"a");
    importer.submit(tx.clone());

    let report = importer.run_cycle();

    assert_eq!(report.validated, 1);
    assert_eq!(report.import_skipped, Some(ImportSkipReason::Synchronizing));
    assert_eq!(importer.validated_count(), 1);
    assert_eq!(importer.chain_state().acquisitions(), 0);
    assert_eq!(importer.repository().save_calls(), 0);
    assert_eq!(importer.broadcaster().message_count(), 0);

    importer.sync().set_in_progress(false);
    let report = importer.run_cycle();
    assert_eq!(report.imported, 1);
    assert!(!importer.is_queued(&tx.signature));
}

#[test]
fn test_pending_import_reported_every_cycle() {
    let importer = importer();
    importer.sync().set_in_progress(true);
    importer.submit(payment(1, b"a"));
    importer.submit(payment(2, b"b"));

    assert_eq!(importer.run_cycle().pending_import, 2);
    // nothing left to validate, both still waiting
    let report = importer.run_cycle();
    assert_eq!(report.validated, 0);
    assert_eq!(report.pending_import, 2);

    importer.chain_state().set_tip_failing(true);
    assert_eq!(importer.run_cycle().pending_import, 2);
}

#[test]
fn test_pending_sync_request_defers_import() {
    let importer = importer();
    importer.sync().set_pending(true);
    importer.submit(payment(1, b"a"));

    let report = importer.run_cycle();

    assert_eq!(report.import_skipped, Some(ImportSkipReason::Synchronizing));
    assert_eq!(importer.chain_state().acquisitions(), 0);
    assert_eq!(importer.pending_count(), 1);
}

#[test]
fn test_busy_chain_lock_defers_import() {
    let importer = importer();
    let minting = importer.chain_state().lock().try_acquire().unwrap();
    let tx = payment(1, b"a");
    importer.submit(tx.clone());

    let report = importer.run_cycle();

    assert_eq!(report.import_skipped, Some(ImportSkipReason::ChainLockBusy));
    assert_eq!(importer.validated_count(), 1);
    assert_eq!(importer.repository().save_calls(), 0);
    // still held by the other subsystem
    assert!(importer.chain_state().lock().is_held());

    drop(minting);
    let report = importer.run_cycle();
    assert_eq!(report.imported, 1);
}

#[test]
fn test_chain_lock_released_when_repository_fails() {
    let importer = importer();
    importer.repository().set_failing(true);
    let tx = payment(1, b"a");
    importer.submit(tx.clone());

    let report = importer.run_cycle();

    assert_eq!(report.imported, 0);
    assert_eq!(importer.chain_state().acquisitions(), 1);
    assert!(!importer.chain_state().lock().is_held());
    assert!(importer.is_queued(&tx.signature));
    assert_eq!(importer.broadcaster().message_count(), 0);
}

#[test]
fn test_already_known_transaction_dropped_without_announcement() {
    let importer = importer();
    let tx = payment(1, b"a");
    importer.repository().insert(tx.clone());
    importer.submit(tx.clone());

    let report = importer.run_cycle();

    assert_eq!(report.already_known, 1);
    assert_eq!(report.imported, 0);
    assert!(!importer.is_queued(&tx.signature));
    assert!(!importer.is_cooling_down(&tx.signature));
    assert_eq!(importer.broadcaster().message_count(), 0);
}

#[test]
fn test_lock_unavailable_keeps_candidate() {
    let importer = importer();
    let tx = payment(1, b"a");
    importer
        .repository()
        .script(tx.signature, ImportResult::LockUnavailable);
    importer.submit(tx.clone());

    let report = importer.run_cycle();

    assert_eq!(report.imported, 0);
    assert!(importer.is_queued(&tx.signature));
    assert_eq!(importer.validated_count(), 1);
    assert!(!importer.is_cooling_down(&tx.signature));

    let report = importer.run_cycle();
    assert_eq!(report.validated, 0);
    assert_eq!(report.imported, 1);
}

#[test]
fn test_invalid_import_gets_one_hour_cooldown() {
    let importer = importer();
    let tx = payment(1, b"a");
    importer.repository().script(
        tx.signature,
        ImportResult::Invalid(InvalidReason::InsufficientFee),
    );
    importer.submit(tx.clone());

    let report = importer.run_cycle();

    assert_eq!(report.rejected, 1);
    assert!(!importer.is_queued(&tx.signature));
    assert_eq!(importer.cooldown_expiry(&tx.signature), Some(NOW + ONE_HOUR));
}

#[test]
fn test_timestamp_too_old_gets_one_day_cooldown() {
    let importer = importer();
    let tx = payment(1, b"a");
    importer.repository().script(
        tx.signature,
        ImportResult::Invalid(InvalidReason::TimestampTooOld),
    );
    importer.submit(tx.clone());

    importer.run_cycle();

    assert_eq!(importer.cooldown_expiry(&tx.signature), Some(NOW + ONE_DAY));
}

#[test]
fn test_low_priority_excluded_from_cache() {
    let importer = importer();
    let stored_chat = chat(10, b"stored chat");
    let stored_payment = payment(11, b"stored payment");
    importer.repository().insert(stored_chat.clone());
    importer.repository().insert(stored_payment.clone());

    let new_chat = chat(1, b"new chat");
    let new_payment = payment(2, b"new payment");
    importer.submit(new_chat.clone());
    importer.submit(new_payment.clone());

    let report = importer.run_cycle();

    // low-priority transactions are still imported
    assert_eq!(report.imported, 2);
    assert!(importer.repository().contains(&new_chat.signature));

    let views = importer.repository().cache_views();
    assert_eq!(views.len(), 2);
    for view in &views {
        assert!(view.contains(&stored_payment.signature));
        assert!(!view.contains(&stored_chat.signature));
        assert!(!view.contains(&new_chat.signature));
    }
}

#[test]
fn test_imported_transaction_visible_to_later_saves() {
    let importer = importer();
    let first = payment(1, b"first");
    let second = payment(2, b"second");
    importer.submit(first.clone());
    importer.submit(second.clone());

    importer.run_cycle();

    let views = importer.repository().cache_views();
    assert_eq!(views.len(), 2);
    assert!(views[0].is_empty());
    assert_eq!(views[1].len(), 1);
}

#[test]
fn test_sync_request_mid_batch_abandons_rest() {
    let importer = importer();
    for seed in 1..=3 {
        importer.submit(payment(seed, &[seed]));
    }
    // pre-check and first item pass, second item sees the request
    importer.sync().request_sync_after(2);

    let report = importer.run_cycle();

    assert_eq!(report.imported, 1);
    assert!(report.import_interrupted);
    assert_eq!(importer.pending_count(), 2);
    assert_eq!(importer.validated_count(), 2);
    assert_eq!(importer.broadcaster().message_count(), 1);
    assert_eq!(importer.broadcaster().messages()[0].len(), 1);
    assert!(!importer.chain_state().lock().is_held());
}

#[test]
fn test_repository_error_mid_batch_still_announces_imported() {
    let importer = importer();
    importer.submit(payment(1, b"a"));
    importer.submit(payment(2, b"b"));
    importer.repository().fail_after_saves(1);

    let report = importer.run_cycle();

    assert_eq!(report.imported, 1);
    assert_eq!(importer.pending_count(), 1);
    assert_eq!(
        importer.broadcaster().messages(),
        vec![importer.repository().stored_signatures()]
    );
    assert!(!importer.chain_state().lock().is_held());
}

#[test]
fn test_one_announcement_per_batch() {
    let importer = importer();
    let txs: Vec<_> = (1..=5).map(|seed| payment(seed, &[seed])).collect();
    for tx in &txs {
        importer.submit(tx.clone());
    }

    let report = importer.run_cycle();

    assert_eq!(report.imported, 5);
    let messages = importer.broadcaster().messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].len(), 5);
    for tx in &txs {
        assert!(messages[0].contains(&tx.signature));
    }
}

#[test]
fn test_announcement_sent_after_chain_lock_released() {
    let importer = importer();
    importer
        .broadcaster()
        .observe_lock(importer.chain_state().lock().clone());
    importer.submit(payment(1, b"a"));
    importer.submit(payment(2, b"b"));

    let report = importer.run_cycle();

    assert_eq!(report.imported, 2);
    assert_eq!(importer.chain_state().acquisitions(), 1);
    assert_eq!(importer.broadcaster().lock_held_on_announce(), vec![false]);
}

#[test]
fn test_broadcast_failure_does_not_undo_import() {
    let importer = importer();
    importer.broadcaster().set_failing(true);
    let tx = payment(1, b"a");
    importer.submit(tx.clone());

    let report = importer.run_cycle();

    assert_eq!(report.imported, 1);
    assert!(importer.repository().contains(&tx.signature));
    assert!(!importer.is_queued(&tx.signature));
}

// =============================================================================
// CLEANUP PHASE
// =============================================================================

#[test]
fn test_cooldown_purged_after_expiry() {
    let importer = importer();
    let tx = badly_signed_tx(&signing_key(1), NOW - 1_000, b"forged");
    importer.submit(tx.clone());
    importer.run_cycle();
    assert_eq!(importer.invalid_count(), 1);

    // expiry itself is still cooling down
    importer.time_source().set(NOW + ONE_HOUR);
    assert_eq!(importer.run_cycle().purged, 0);
    assert_eq!(importer.submit(tx.clone()), SubmitOutcome::CoolingDown);

    importer.time_source().set(NOW + ONE_HOUR + 1);
    assert_eq!(importer.run_cycle().purged, 1);
    assert_eq!(importer.invalid_count(), 0);
    assert_eq!(importer.submit(tx), SubmitOutcome::Queued);
}

#[test]
fn test_expired_cooldown_lapses_after_ten_minutes() {
    let importer = importer();
    let tx = signed_tx(
        &signing_key(1),
        TransactionType::Payment,
        TIP - TRANSACTION_LIFETIME_MS,
        b"old",
    );
    importer.submit(tx.clone());
    importer.run_cycle();

    importer.time_source().advance(TEN_MINUTES + 1);
    let report = importer.run_cycle();

    assert_eq!(report.purged, 1);
    assert!(!importer.is_cooling_down(&tx.signature));
}

// =============================================================================
// LIFECYCLE & QUERIES
// =============================================================================

#[test]
fn test_stopped_pipeline_does_nothing() {
    let importer = importer();
    importer.submit(payment(1, b"a"));
    importer.request_stop();

    let report = importer.run_cycle();

    assert!(report.stopped);
    assert!(importer.is_stopped());
    assert_eq!(report.validated, 0);
    assert_eq!(importer.pending_count(), 1);
}

#[test]
fn test_filter_unknown_signatures() {
    let importer = importer();
    let queued = payment(1, b"queued");
    let stored = payment(2, b"stored");
    let forged = badly_signed_tx(&signing_key(3), NOW - 1_000, b"forged");
    let unknown = payment(4, b"unknown");

    importer.submit(forged.clone());
    importer.run_cycle();
    importer.submit(queued.clone());
    importer.repository().insert(stored.clone());

    let result = importer
        .filter_unknown_signatures(&[
            queued.signature,
            stored.signature,
            forged.signature,
            unknown.signature,
        ])
        .unwrap();

    assert_eq!(result, vec![unknown.signature]);
}

#[test]
fn test_filter_unknown_signatures_propagates_repository_error() {
    let importer = importer();
    importer.repository().set_failing(true);

    let result = importer.filter_unknown_signatures(&[[7u8; 64]]);

    assert!(matches!(result, Err(AdmissionError::Repository(_))));
}

#[test]
fn test_status_snapshot() {
    let importer = make_importer(AdmissionConfig::for_testing().with_lite_mode(true), NOW, TIP);
    importer.sync().set_in_progress(true);
    importer.submit(payment(1, b"a"));
    importer.submit(payment(2, b"b"));
    importer.run_cycle();
    importer.submit(payment(3, b"c"));

    let status = importer.status();

    assert_eq!(
        status,
        AdmissionStatus {
            pending: 3,
            validated: 2,
            invalid: 0,
            lite_mode: true,
        }
    );
    assert_eq!(
        serde_json::to_value(&status).unwrap(),
        serde_json::json!({
            "pending": 3,
            "validated": 2,
            "invalid": 0,
            "lite_mode": true,
        })
    );
}

#[test]
fn test_cycle_report_serializes() {
    let importer = importer();
    importer.sync().set_in_progress(true);
    importer.submit(payment(1, b"a"));

    let report = importer.run_cycle();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["validated"], 1);
    assert_eq!(json["pending_import"], 1);
    assert_eq!(json["import_skipped"], "Synchronizing");
    assert_eq!(json["import_interrupted"], false);
    assert_eq!(json["stopped"], false);
}
