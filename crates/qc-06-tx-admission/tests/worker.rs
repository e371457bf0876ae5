//! Admission worker driving the importer on a real tokio runtime.

use qc_06_tx_admission::test_utils::*;
use qc_06_tx_admission::{
    AdmissionConfig, AdmissionWorker, SubmitOutcome, TransactionAdmissionApi, TransactionType,
};
use std::sync::Arc;
use std::time::Duration;

const NOW: u64 = 1_700_000_000_000;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("qc_06_tx_admission=debug")
        .with_test_writer()
        .try_init();
}

async fn wait_until<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

#[tokio::test]
async fn test_worker_imports_submitted_transactions() {
    init_tracing();
    let config = AdmissionConfig::for_testing();
    let interval = config.cycle_interval;
    let importer = Arc::new(make_importer(config, NOW, NOW));
    let worker = AdmissionWorker::spawn(Arc::clone(&importer), interval);

    let key = signing_key(1);
    let txs: Vec<_> = (0..4u8)
        .map(|i| signed_tx(&key, TransactionType::Payment, NOW - 1_000, &[i]))
        .collect();
    for tx in &txs {
        assert_eq!(importer.submit(tx.clone()), SubmitOutcome::Queued);
    }

    assert!(wait_until(|| importer.pending_count() == 0).await);
    for tx in &txs {
        assert!(importer.repository().contains(&tx.signature));
    }
    let announced: usize = importer
        .broadcaster()
        .messages()
        .iter()
        .map(|m| m.len())
        .sum();
    assert_eq!(announced, txs.len());

    worker.shutdown().await.unwrap();
    assert!(importer.is_stopped());
}

#[tokio::test]
async fn test_worker_waits_out_sync() {
    init_tracing();
    let importer = Arc::new(make_importer(AdmissionConfig::for_testing(), NOW, NOW));
    importer.sync().set_in_progress(true);
    let worker = AdmissionWorker::spawn(Arc::clone(&importer), Duration::from_millis(5));

    let tx = signed_tx(&signing_key(2), TransactionType::Message, NOW - 1_000, b"hello");
    importer.submit(tx.clone());

    assert!(wait_until(|| importer.validated_count() == 1).await);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!importer.repository().contains(&tx.signature));

    importer.sync().set_in_progress(false);
    assert!(wait_until(|| importer.repository().contains(&tx.signature)).await);

    worker.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_stops_cycles() {
    init_tracing();
    let importer = Arc::new(make_importer(AdmissionConfig::for_testing(), NOW, NOW));
    let worker = AdmissionWorker::spawn(Arc::clone(&importer), Duration::from_millis(5));
    assert!(worker.is_running());

    worker.shutdown().await.unwrap();

    importer.submit(signed_tx(&signing_key(3), TransactionType::Payment, NOW - 1_000, b"late"));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(importer.pending_count(), 1);
    assert_eq!(importer.repository().save_calls(), 0);
}
