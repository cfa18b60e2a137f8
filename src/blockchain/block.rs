use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha512};

use super::transaction::Transaction;

/// Tag byte fed to the digest before a previous hash
const TAG_PREVIOUS_HASH: u8 = 1;

/// Tag byte fed to the digest in place of the genesis block's missing previous hash
const TAG_NO_PREVIOUS_HASH: u8 = 0;

/// Represents a block in the blockchain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// List of transactions included in this block, in hashing order
    pub transactions: Vec<Transaction>,

    /// Hash of the previous block, `None` only for the genesis block
    pub previous_hash: Option<String>,

    /// Nonce mixed into the hash
    pub nonce: u64,

    /// Hash of the current block (calculated)
    pub hash: String,
}

impl Block {
    /// Creates a new block linked to `previous_hash`
    ///
    /// # Arguments
    ///
    /// * `transactions` - The list of transactions to include in the block
    /// * `previous_hash` - The hash of the previous block
    ///
    /// # Returns
    ///
    /// A new Block with a random nonce and a matching hash
    pub fn new(transactions: Vec<Transaction>, previous_hash: impl Into<String>) -> Self {
        Self::with_previous_hash(transactions, Some(previous_hash.into()))
    }

    /// Creates a genesis block: no transactions, no previous hash
    ///
    /// The random nonce doubles as the seed that makes each genesis hash unique.
    pub fn genesis() -> Self {
        Self::with_previous_hash(Vec::new(), None)
    }

    /// Creates a block with a random nonce, linked to `previous_hash` if given
    pub(crate) fn with_previous_hash(transactions: Vec<Transaction>, previous_hash: Option<String>) -> Self {
        let mut block = Block {
            transactions,
            previous_hash,
            nonce: 0,
            hash: String::new(),
        };
        block.calculate_hash(rand::random());
        block
    }

    /// Sets the nonce and recalculates the hash from the current contents
    pub fn calculate_hash(&mut self, nonce: u64) {
        self.hash = compute_hash(&self.transactions, self.previous_hash.as_deref(), nonce);
        self.nonce = nonce;
    }

    /// Returns true for a block shaped like a genesis block
    pub fn is_genesis(&self) -> bool {
        self.previous_hash.is_none() && self.transactions.is_empty()
    }
}

/// Serializes transactions into the fixed form used for hashing
///
/// A JSON array of objects with sorted keys. Changing this form
/// invalidates every hash computed before the change.
pub fn serialize_transactions(transactions: &[Transaction]) -> String {
    let entries = transactions
        .iter()
        .map(|tx| {
            json!({
                "source": tx.source.0,
                "recipient": tx.recipient.0,
                "amount": tx.amount,
                "signature": tx.signature.0,
            })
        })
        .collect();

    Value::Array(entries).to_string()
}

/// Computes the SHA-512 hash of a block's contents as lowercase hex
pub fn compute_hash(transactions: &[Transaction], previous_hash: Option<&str>, nonce: u64) -> String {
    let mut hasher = Sha512::new();
    hasher.update(serialize_transactions(transactions).as_bytes());
    match previous_hash {
        Some(hash) => {
            hasher.update([TAG_PREVIOUS_HASH]);
            hasher.update(hash.as_bytes());
        }
        None => hasher.update([TAG_NO_PREVIOUS_HASH]),
    }
    hasher.update(nonce.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::test_utils::random_transaction;

    #[test]
    fn test_new_block() {
        let transactions = vec![random_transaction(), random_transaction()];

        let block = Block::new(transactions.clone(), "previous_hash");

        assert_eq!(block.transactions, transactions);
        assert_eq!(block.previous_hash.as_deref(), Some("previous_hash"));
        assert_eq!(block.hash.len(), 128); // SHA-512 hash is 128 characters in hex
        assert_eq!(
            block.hash,
            compute_hash(&block.transactions, Some("previous_hash"), block.nonce)
        );
    }

    #[test]
    fn test_genesis_block() {
        let genesis = Block::genesis();

        assert!(genesis.is_genesis());
        assert!(genesis.transactions.is_empty());
        assert!(genesis.previous_hash.is_none());
        assert_eq!(genesis.hash, compute_hash(&[], None, genesis.nonce));
    }

    #[test]
    fn test_calculate_hash_is_deterministic() {
        let mut block = Block::new(vec![random_transaction()], "abc");

        block.calculate_hash(0);
        let first = block.hash.clone();
        block.calculate_hash(0);

        assert_eq!(block.nonce, 0);
        assert_eq!(block.hash, first);

        block.calculate_hash(1);
        assert_eq!(block.nonce, 1);
        assert_ne!(block.hash, first);
    }

    #[test]
    fn test_hash_changes_when_transaction_pushed() {
        let mut block = Block::new(vec![random_transaction()], "abc");
        block.calculate_hash(0);
        let original_hash = block.hash.clone();

        block.transactions.push(random_transaction());
        block.calculate_hash(0);

        assert_ne!(block.hash, original_hash);
    }

    #[test]
    fn test_hash_depends_on_transaction_order() {
        let a = random_transaction();
        let b = random_transaction();

        let forward = compute_hash(&[a.clone(), b.clone()], Some("abc"), 3);
        let backward = compute_hash(&[b, a], Some("abc"), 3);

        assert_ne!(forward, backward);
    }

    #[test]
    fn test_hash_depends_on_previous_hash() {
        let transactions = vec![random_transaction()];

        assert_ne!(
            compute_hash(&transactions, Some("abc"), 3),
            compute_hash(&transactions, Some("abd"), 3)
        );
        assert_ne!(
            compute_hash(&transactions, None, 3),
            compute_hash(&transactions, Some(""), 3)
        );
    }

    #[test]
    fn test_missing_previous_hash_differs_from_any_text() {
        for text in ["null", "None", "\0", "\u{1}"] {
            assert_ne!(
                compute_hash(&[], None, 9),
                compute_hash(&[], Some(text), 9),
                "previous hash {:?} collides with no previous hash",
                text
            );
        }
    }
}
