//! # Unconfirmed Cache
//!
//! Snapshot of the repository's unconfirmed transactions, built at the start
//! of an import phase and dropped at its end. Low-priority classes are left
//! out of construction and of appends; they are still imported.

use super::entities::{Signature, Transaction};
use std::collections::HashSet;

#[derive(Debug, Default, Clone)]
pub struct UnconfirmedCache {
    transactions: Vec<Transaction>,
    signatures: HashSet<Signature>,
}

impl UnconfirmedCache {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        let signatures = transactions.iter().map(|tx| tx.signature).collect();
        Self {
            transactions,
            signatures,
        }
    }

    /// Append a freshly imported transaction.
    pub fn push(&mut self, transaction: Transaction) {
        if self.signatures.insert(transaction.signature) {
            self.transactions.push(transaction);
        }
    }

    pub fn contains(&self, signature: &Signature) -> bool {
        self.signatures.contains(signature)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
