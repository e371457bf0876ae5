//! # Candidate Queue
//!
//! Incoming, not-yet-confirmed transactions keyed by signature.
//!
//! Written by network threads (`insert_if_absent`) and by the admission
//! cycle (tag flips, removals). Bulk readers get point-in-time copies so
//! the lock is never held across repository or crypto work.
//!
//! ## Invariants Enforced
//!
//! - At most one candidate per signature (`insert_if_absent`)
//! - Tags only move `Unvalidated → SignatureValid` (`mark_signature_valid`)

use super::entities::{CandidateTransaction, Signature, Transaction};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct CandidateQueue {
    by_signature: Mutex<HashMap<Signature, CandidateTransaction>>,
}

impl CandidateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `candidate` unless its signature is already present.
    ///
    /// Returns true if it was inserted.
    pub fn insert_if_absent(&self, candidate: CandidateTransaction) -> bool {
        let mut by_signature = self.by_signature.lock();
        if by_signature.contains_key(candidate.signature()) {
            return false;
        }
        by_signature.insert(*candidate.signature(), candidate);
        true
    }

    pub fn contains(&self, signature: &Signature) -> bool {
        self.by_signature.lock().contains_key(signature)
    }

    /// Number of queued candidates.
    pub fn len(&self) -> usize {
        self.by_signature.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_signature.lock().is_empty()
    }

    /// Number of candidates tagged `SignatureValid`.
    pub fn validated_len(&self) -> usize {
        self.by_signature
            .lock()
            .values()
            .filter(|c| c.is_signature_valid())
            .count()
    }

    /// Copy of every queued candidate with its tag.
    pub fn snapshot(&self) -> Vec<CandidateTransaction> {
        self.by_signature.lock().values().cloned().collect()
    }

    /// Copy of every candidate tagged `SignatureValid`.
    pub fn snapshot_validated(&self) -> Vec<Transaction> {
        self.by_signature
            .lock()
            .values()
            .filter(|c| c.is_signature_valid())
            .map(|c| c.transaction.clone())
            .collect()
    }

    /// Tag a candidate `SignatureValid`.
    ///
    /// Returns false if the candidate is gone (removed concurrently) or was
    /// already valid.
    pub fn mark_signature_valid(&self, signature: &Signature) -> bool {
        self.by_signature
            .lock()
            .get_mut(signature)
            .map(CandidateTransaction::mark_signature_valid)
            .unwrap_or(false)
    }

    pub fn remove(&self, signature: &Signature) -> Option<CandidateTransaction> {
        self.by_signature.lock().remove(signature)
    }
}
