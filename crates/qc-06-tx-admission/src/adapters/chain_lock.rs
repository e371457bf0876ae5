//! Non-blocking chain-state lock.
//!
//! The node creates one `ChainLock` and hands clones to every subsystem that
//! mutates chain state (block minting, sync, transaction import). Only the
//! holder of the [`HeldChainLock`] returned by `try_acquire` can release it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared try-lock over chain state.
#[derive(Debug, Clone, Default)]
pub struct ChainLock {
    held: Arc<AtomicBool>,
}

impl ChainLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lock if free. Never blocks.
    pub fn try_acquire(&self) -> Option<HeldChainLock> {
        self.held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| HeldChainLock {
                held: Arc::clone(&self.held),
            })
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

/// Ownership of the chain lock. Released on drop.
#[derive(Debug)]
#[must_use = "the chain lock is released as soon as this is dropped"]
pub struct HeldChainLock {
    held: Arc<AtomicBool>,
}

impl Drop for HeldChainLock {
    fn drop(&mut self) {
        self.held.store(false, Ordering::Release);
    }
}
