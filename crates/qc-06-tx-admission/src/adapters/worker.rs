//! # Admission Worker
//!
//! Background task that drives [`TransactionAdmissionApi::run_cycle`] on a
//! fixed period.
//!
//! ```text
//! loop {
//!     select! {
//!         tick     → spawn_blocking(run_cycle)   // cycles never overlap
//!         shutdown → break
//!     }
//! }
//! ```
//!
//! Cycles run on the blocking pool: signature verification fans out over
//! rayon and repository calls may touch disk.

use crate::domain::{AdmissionError, AdmissionResult};
use crate::ports::inbound::TransactionAdmissionApi;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Handle to the running admission loop.
pub struct AdmissionWorker {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
    api: Arc<dyn TransactionAdmissionApi>,
}

impl AdmissionWorker {
    /// Start the loop on the current tokio runtime.
    pub fn spawn<A>(api: Arc<A>, interval: Duration) -> Self
    where
        A: TransactionAdmissionApi + 'static,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run_loop(Arc::clone(&api), interval, shutdown_rx));
        info!("[qc-06] Admission worker started (interval {:?})", interval);

        Self {
            shutdown_tx,
            handle,
            api,
        }
    }

    /// True while the loop task has not finished.
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Signal the pipeline to stop and wait for the current cycle to end.
    pub async fn shutdown(self) -> AdmissionResult<()> {
        self.api.request_stop();
        let _ = self.shutdown_tx.send(true);
        self.handle
            .await
            .map_err(|e| AdmissionError::Worker(e.to_string()))?;
        info!("[qc-06] Admission worker stopped");
        Ok(())
    }
}

async fn run_loop<A>(api: Arc<A>, interval: Duration, mut shutdown_rx: watch::Receiver<bool>)
where
    A: TransactionAdmissionApi + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown_rx.changed() => {
                debug!("[qc-06] Shutdown signal received");
                break;
            }
        }

        if api.is_stopped() {
            break;
        }

        let cycle_api = Arc::clone(&api);
        match tokio::task::spawn_blocking(move || cycle_api.run_cycle()).await {
            Ok(report) if report.stopped => break,
            Ok(report) => {
                if report.has_activity() {
                    debug!("[qc-06] Cycle: {:?}", report);
                }
            }
            Err(e) => warn!("[qc-06] Admission cycle panicked: {}", e),
        }
    }
}
