//! Test doubles for the admission ports and signed-transaction helpers.

use crate::adapters::{ChainLock, HeldChainLock};
use crate::domain::{
    ChainTip, ImportResult, Signature, Timestamp, Transaction, TransactionType, UnconfirmedCache,
};
use crate::ports::outbound::{
    BroadcastError, ChainState, SignatureBroadcaster, SyncCoordinator, TimeSource,
    TransactionRepository,
};
use crate::service::{AdmissionDependencies, TransactionImporter};
use crate::AdmissionConfig;
use ed25519_dalek::{Signer, SigningKey};
use parking_lot::Mutex;
use shared_types::RepositoryError;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

/// Importer wired to the in-memory doubles below.
pub type TestImporter = TransactionImporter<
    InMemoryTransactionRepository,
    MockChainState,
    MockSyncCoordinator,
    RecordingBroadcaster,
    MockTimeSource,
>;

/// Build a [`TestImporter`] at time `now` with a tip at `tip_timestamp`.
pub fn make_importer(
    config: AdmissionConfig,
    now: Timestamp,
    tip_timestamp: Timestamp,
) -> TestImporter {
    TransactionImporter::new(
        AdmissionDependencies {
            repository: InMemoryTransactionRepository::new(),
            chain_state: MockChainState::with_tip(ChainTip::new(100, tip_timestamp)),
            sync: MockSyncCoordinator::new(),
            broadcaster: RecordingBroadcaster::new(),
            time_source: MockTimeSource::new(now),
        },
        config,
    )
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

pub fn signing_key(seed: u8) -> SigningKey {
    SigningKey::from_bytes(&[seed; 32])
}

/// A correctly signed transaction.
pub fn signed_tx(
    key: &SigningKey,
    tx_type: TransactionType,
    timestamp: Timestamp,
    body: &[u8],
) -> Transaction {
    let mut tx = Transaction {
        tx_type,
        timestamp,
        creator: key.verifying_key().to_bytes(),
        body: body.to_vec(),
        signature: [0u8; 64],
    };
    tx.signature = key.sign(&tx.signed_bytes()).to_bytes();
    tx
}

/// A transaction whose signature does not verify.
pub fn badly_signed_tx(key: &SigningKey, timestamp: Timestamp, body: &[u8]) -> Transaction {
    let mut tx = signed_tx(key, TransactionType::Payment, timestamp, body);
    tx.body.push(0xFF);
    tx
}

// =============================================================================
// TIME
// =============================================================================

/// Deterministic time source.
pub struct MockTimeSource {
    time: AtomicU64,
}

impl MockTimeSource {
    pub fn new(initial: Timestamp) -> Self {
        Self {
            time: AtomicU64::new(initial),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.time.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, time: Timestamp) {
        self.time.store(time, Ordering::SeqCst);
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        self.time.load(Ordering::SeqCst)
    }
}

// =============================================================================
// REPOSITORY
// =============================================================================

/// Unconfirmed-transaction store held in memory.
///
/// Results for `save_as_unconfirmed` can be scripted per signature; anything
/// unscripted is saved and reported `Ok` (or `AlreadyExists` the second time).
#[derive(Default)]
pub struct InMemoryTransactionRepository {
    stored: Mutex<Vec<Transaction>>,
    scripted: Mutex<HashMap<Signature, VecDeque<ImportResult>>>,
    fail: AtomicBool,
    fail_after_saves: Mutex<Option<usize>>,
    save_calls: AtomicUsize,
    cache_views: Mutex<Vec<HashSet<Signature>>>,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the store.
    pub fn insert(&self, tx: Transaction) {
        self.stored.lock().push(tx);
    }

    /// Queue a result returned the next time `signature` is saved.
    pub fn script(&self, signature: Signature, result: ImportResult) {
        self.scripted
            .lock()
            .entry(signature)
            .or_default()
            .push_back(result);
    }

    /// Make every call fail with `RepositoryError::Unavailable`.
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Let `saves` more saves through, then start failing.
    pub fn fail_after_saves(&self, saves: usize) {
        *self.fail_after_saves.lock() = Some(saves);
    }

    pub fn stored_signatures(&self) -> Vec<Signature> {
        self.stored.lock().iter().map(|tx| tx.signature).collect()
    }

    pub fn contains(&self, signature: &Signature) -> bool {
        self.stored.lock().iter().any(|tx| tx.signature == *signature)
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    /// Signatures visible in the cache on each `save_as_unconfirmed` call.
    pub fn cache_views(&self) -> Vec<HashSet<Signature>> {
        self.cache_views.lock().clone()
    }

    fn check_available(&self) -> Result<(), RepositoryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("repository offline".to_string()));
        }
        Ok(())
    }
}

impl TransactionRepository for InMemoryTransactionRepository {
    fn unconfirmed_transactions(
        &self,
        excluded: &[TransactionType],
    ) -> Result<Vec<Transaction>, RepositoryError> {
        self.check_available()?;
        Ok(self
            .stored
            .lock()
            .iter()
            .filter(|tx| !excluded.contains(&tx.tx_type))
            .cloned()
            .collect())
    }

    fn save_as_unconfirmed(
        &self,
        tx: &Transaction,
        unconfirmed: &UnconfirmedCache,
    ) -> Result<ImportResult, RepositoryError> {
        self.check_available()?;
        {
            let mut remaining = self.fail_after_saves.lock();
            if let Some(n) = remaining.as_mut() {
                if *n == 0 {
                    return Err(RepositoryError::Io("write failed".to_string()));
                }
                *n -= 1;
            }
        }
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        self.cache_views.lock().push(
            unconfirmed
                .transactions()
                .iter()
                .map(|t| t.signature)
                .collect(),
        );

        let scripted = self
            .scripted
            .lock()
            .get_mut(&tx.signature)
            .and_then(|results| results.pop_front());
        if let Some(result) = scripted {
            if result == ImportResult::Ok {
                self.stored.lock().push(tx.clone());
            }
            return Ok(result);
        }

        let mut stored = self.stored.lock();
        if stored.iter().any(|t| t.signature == tx.signature) {
            return Ok(ImportResult::AlreadyExists);
        }
        stored.push(tx.clone());
        Ok(ImportResult::Ok)
    }

    fn exists(&self, signature: &Signature) -> Result<bool, RepositoryError> {
        self.check_available()?;
        Ok(self.contains(signature))
    }
}

// =============================================================================
// CHAIN STATE
// =============================================================================

/// Chain tip plus a real [`ChainLock`].
pub struct MockChainState {
    tip: Mutex<Option<ChainTip>>,
    lock: ChainLock,
    held: Mutex<Option<HeldChainLock>>,
    fail_tip: AtomicBool,
    acquisitions: AtomicUsize,
}

impl MockChainState {
    pub fn new() -> Self {
        Self {
            tip: Mutex::new(None),
            lock: ChainLock::new(),
            held: Mutex::new(None),
            fail_tip: AtomicBool::new(false),
            acquisitions: AtomicUsize::new(0),
        }
    }

    pub fn with_tip(tip: ChainTip) -> Self {
        let state = Self::new();
        state.set_tip(Some(tip));
        state
    }

    pub fn set_tip(&self, tip: Option<ChainTip>) {
        *self.tip.lock() = tip;
    }

    pub fn set_tip_failing(&self, fail: bool) {
        self.fail_tip.store(fail, Ordering::SeqCst);
    }

    /// The lock other subsystems would contend on.
    pub fn lock(&self) -> &ChainLock {
        &self.lock
    }

    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }
}

impl Default for MockChainState {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainState for MockChainState {
    fn current_tip(&self) -> Result<Option<ChainTip>, RepositoryError> {
        if self.fail_tip.load(Ordering::SeqCst) {
            return Err(RepositoryError::Io("tip unreadable".to_string()));
        }
        Ok(*self.tip.lock())
    }

    fn try_acquire_chain_lock(&self) -> bool {
        match self.lock.try_acquire() {
            Some(held) => {
                *self.held.lock() = Some(held);
                self.acquisitions.fetch_add(1, Ordering::SeqCst);
                true
            }
            None => false,
        }
    }

    fn release_chain_lock(&self) {
        self.held.lock().take();
    }
}

// =============================================================================
// SYNC
// =============================================================================

/// Synchronizer flags.
///
/// `request_sync_after(n)` makes `sync_request_pending` start returning true
/// after it has been queried `n` times, to simulate a sync request arriving
/// in the middle of an import batch.
#[derive(Default)]
pub struct MockSyncCoordinator {
    in_progress: AtomicBool,
    pending: AtomicBool,
    pending_after: Mutex<Option<usize>>,
}

impl MockSyncCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_in_progress(&self, value: bool) {
        self.in_progress.store(value, Ordering::SeqCst);
    }

    pub fn set_pending(&self, value: bool) {
        self.pending.store(value, Ordering::SeqCst);
    }

    pub fn request_sync_after(&self, queries: usize) {
        *self.pending_after.lock() = Some(queries);
    }
}

impl SyncCoordinator for MockSyncCoordinator {
    fn sync_in_progress(&self) -> bool {
        self.in_progress.load(Ordering::SeqCst)
    }

    fn sync_request_pending(&self) -> bool {
        let mut countdown = self.pending_after.lock();
        if let Some(remaining) = countdown.as_mut() {
            if *remaining == 0 {
                self.pending.store(true, Ordering::SeqCst);
                *countdown = None;
            } else {
                *remaining -= 1;
            }
        }
        self.pending.load(Ordering::SeqCst)
    }
}

// =============================================================================
// BROADCAST
// =============================================================================

/// Records every announcement.
///
/// With `observe_lock`, also records whether that chain lock was held at the
/// moment of each announcement.
#[derive(Default)]
pub struct RecordingBroadcaster {
    messages: Mutex<Vec<Vec<Signature>>>,
    fail: AtomicBool,
    observed_lock: Mutex<Option<ChainLock>>,
    lock_held_on_announce: Mutex<Vec<bool>>,
}

impl RecordingBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn messages(&self) -> Vec<Vec<Signature>> {
        self.messages.lock().clone()
    }

    pub fn message_count(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn observe_lock(&self, lock: ChainLock) {
        *self.observed_lock.lock() = Some(lock);
    }

    pub fn lock_held_on_announce(&self) -> Vec<bool> {
        self.lock_held_on_announce.lock().clone()
    }
}

impl SignatureBroadcaster for RecordingBroadcaster {
    fn announce(&self, signatures: &[Signature]) -> Result<(), BroadcastError> {
        if let Some(lock) = self.observed_lock.lock().as_ref() {
            self.lock_held_on_announce.lock().push(lock.is_held());
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(BroadcastError::NoPeers);
        }
        self.messages.lock().push(signatures.to_vec());
        Ok(())
    }
}
