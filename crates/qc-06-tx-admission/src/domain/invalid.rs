//! # Invalid-Transaction Records
//!
//! Cool-downs for signatures that expired or failed validation. Keyed by the
//! text encoding of the signature.
//!
//! A signature is cooling down while `now <= expiry`; the record is purged by
//! the cleanup phase once `now > expiry`.

use super::entities::{Signature, Timestamp};
use parking_lot::Mutex;
use shared_types::signature_to_text;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct InvalidTransactionRecords {
    expiries: Mutex<HashMap<String, Timestamp>>,
}

impl InvalidTransactionRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `signature` on cool-down until `expiry`. A later expiry replaces
    /// an earlier one, never the reverse.
    pub fn record(&self, signature: &Signature, expiry: Timestamp) {
        let mut expiries = self.expiries.lock();
        let entry = expiries.entry(signature_to_text(signature)).or_insert(expiry);
        if *entry < expiry {
            *entry = expiry;
        }
    }

    pub fn is_cooling_down(&self, signature: &Signature, now: Timestamp) -> bool {
        self.expiry_of(signature)
            .map(|expiry| now <= expiry)
            .unwrap_or(false)
    }

    pub fn expiry_of(&self, signature: &Signature) -> Option<Timestamp> {
        self.expiries
            .lock()
            .get(&signature_to_text(signature))
            .copied()
    }

    /// Drop every record whose expiry has passed. Returns how many went.
    pub fn purge_expired(&self, now: Timestamp) -> usize {
        let mut expiries = self.expiries.lock();
        let before = expiries.len();
        expiries.retain(|_, expiry| now <= *expiry);
        before - expiries.len()
    }

    pub fn len(&self) -> usize {
        self.expiries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.expiries.lock().is_empty()
    }
}
