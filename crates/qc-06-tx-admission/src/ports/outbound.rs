//! Outbound (Driven) ports for the Transaction Admission subsystem.
//!
//! These traits define what the pipeline needs from the rest of the node.
//! Implementations live with the repository, the synchronizer and the
//! network layer.

use crate::domain::{
    ChainTip, ImportResult, Signature, Timestamp, Transaction, TransactionType, UnconfirmedCache,
};
use shared_types::RepositoryError;
use thiserror::Error;

/// Unconfirmed-transaction storage.
pub trait TransactionRepository: Send + Sync {
    /// All unconfirmed transactions except the given classes.
    fn unconfirmed_transactions(
        &self,
        excluded: &[TransactionType],
    ) -> Result<Vec<Transaction>, RepositoryError>;

    /// Validate `tx` against repository state and save it as unconfirmed.
    ///
    /// `unconfirmed` is this import phase's snapshot of pending transactions,
    /// already including earlier imports from the same batch.
    fn save_as_unconfirmed(
        &self,
        tx: &Transaction,
        unconfirmed: &UnconfirmedCache,
    ) -> Result<ImportResult, RepositoryError>;

    /// True if the repository holds this transaction (confirmed or not).
    fn exists(&self, signature: &Signature) -> Result<bool, RepositoryError>;
}

/// Chain tip and the chain-state lock shared by every subsystem that
/// mutates chain state.
pub trait ChainState: Send + Sync {
    /// Most recently accepted block, if any.
    fn current_tip(&self) -> Result<Option<ChainTip>, RepositoryError>;

    /// Take the chain lock if free. Never blocks.
    fn try_acquire_chain_lock(&self) -> bool;

    /// Release a lock taken by `try_acquire_chain_lock`.
    fn release_chain_lock(&self);
}

/// Full-chain synchronization status.
pub trait SyncCoordinator: Send + Sync {
    fn sync_in_progress(&self) -> bool;

    fn sync_request_pending(&self) -> bool;
}

/// Announces newly imported signatures to peers.
pub trait SignatureBroadcaster: Send + Sync {
    fn announce(&self, signatures: &[Signature]) -> Result<(), BroadcastError>;
}

/// Error type for broadcast operations.
#[derive(Debug, Clone, Error)]
pub enum BroadcastError {
    /// No peers connected.
    #[error("No peers connected")]
    NoPeers,
    /// Network layer failure.
    #[error("Network error: {0}")]
    Network(String),
}

/// Time source for consistent timestamp handling.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Returns the current timestamp in milliseconds.
    fn now(&self) -> Timestamp;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

/// Holds the chain lock for the lifetime of the guard.
///
/// Released on drop, so every exit from the import phase (errors included)
/// gives the lock back.
pub struct ChainLockGuard<'a, C: ChainState + ?Sized> {
    chain_state: &'a C,
}

impl<'a, C: ChainState + ?Sized> ChainLockGuard<'a, C> {
    /// Try once; `None` if another subsystem holds the lock.
    pub fn try_acquire(chain_state: &'a C) -> Option<Self> {
        chain_state
            .try_acquire_chain_lock()
            .then(|| Self { chain_state })
    }
}

impl<C: ChainState + ?Sized> Drop for ChainLockGuard<'_, C> {
    fn drop(&mut self) {
        self.chain_state.release_chain_lock();
    }
}
