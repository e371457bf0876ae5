//! Domain services for the Transaction Admission subsystem.
//!
//! Ed25519 signature checks over [`Transaction::signed_bytes`].

use super::entities::{Signature, Transaction};
use ed25519_dalek::{Signature as Ed25519Signature, VerifyingKey};
use rayon::prelude::*;

/// Verify the creator's signature over the transaction's signed bytes.
///
/// Uses strict verification: rejects small-order keys and non-canonical
/// signatures.
pub fn verify_transaction_signature(tx: &Transaction) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(&tx.creator) else {
        return false;
    };
    let signature = Ed25519Signature::from_bytes(&tx.signature);
    verifying_key
        .verify_strict(&tx.signed_bytes(), &signature)
        .is_ok()
}

/// Verify a batch in parallel, returning each signature with its verdict
/// in input order.
pub fn verify_batch(transactions: &[Transaction]) -> Vec<(Signature, bool)> {
    transactions
        .par_iter()
        .map(|tx| (tx.signature, verify_transaction_signature(tx)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};
    use shared_types::TransactionType;

    fn signed_tx(seed: u8, body: Vec<u8>) -> Transaction {
        let key = SigningKey::from_bytes(&[seed; 32]);
        let mut tx = Transaction {
            tx_type: TransactionType::Payment,
            timestamp: 1_700_000_000_000,
            creator: key.verifying_key().to_bytes(),
            body,
            signature: [0; 64],
        };
        tx.signature = key.sign(&tx.signed_bytes()).to_bytes();
        tx
    }

    #[test]
    fn test_valid_signature() {
        assert!(verify_transaction_signature(&signed_tx(7, vec![1, 2, 3])));
    }

    #[test]
    fn test_tampered_body_fails() {
        let mut tx = signed_tx(7, vec![1, 2, 3]);
        tx.body.push(4);
        assert!(!verify_transaction_signature(&tx));
    }

    #[test]
    fn test_wrong_creator_fails() {
        let mut tx = signed_tx(7, vec![1]);
        tx.creator = SigningKey::from_bytes(&[8; 32]).verifying_key().to_bytes();
        assert!(!verify_transaction_signature(&tx));
    }

    #[test]
    fn test_garbage_signature_fails() {
        let mut tx = signed_tx(7, vec![1]);
        tx.signature = [0xFF; 64];
        assert!(!verify_transaction_signature(&tx));
    }

    #[test]
    fn test_batch_preserves_order() {
        let good = signed_tx(1, vec![1]);
        let mut bad = signed_tx(2, vec![2]);
        bad.body.clear();

        let verdicts = verify_batch(&[good.clone(), bad.clone()]);
        assert_eq!(verdicts, vec![(good.signature, true), (bad.signature, false)]);
    }
}
