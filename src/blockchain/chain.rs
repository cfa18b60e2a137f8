use log::{debug, info};

use super::block::Block;
use super::crypto::PublicKey;
use super::transaction::Transaction;

/// Represents the blockchain
///
/// Owned by a single writer: `add_block` takes `&mut self` and there is no
/// internal locking.
#[derive(Debug, Clone)]
pub struct Blockchain {
    /// The chain of blocks, genesis first
    blocks: Vec<Block>,
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

impl Blockchain {
    /// Creates a new blockchain with a genesis block
    ///
    /// # Returns
    ///
    /// A new Blockchain instance
    pub fn new() -> Self {
        let genesis = Block::genesis();
        debug!("Created genesis block {}", genesis.hash);

        Blockchain {
            blocks: vec![genesis],
        }
    }

    /// Wraps an existing list of blocks without checking it
    ///
    /// Used to audit chains assembled elsewhere. The result may not even
    /// have a genesis block; the validator reports that.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Blockchain { blocks }
    }

    /// Gets the last block in the chain
    ///
    /// `None` only for a chain built with `from_blocks(vec![])`.
    pub fn head_block(&self) -> Option<&Block> {
        self.blocks.last()
    }

    /// Appends a new block holding `transactions`, linked to the head block
    ///
    /// No validation happens here; invalid transactions are accepted and
    /// left for the validator to find. On an empty chain the new block has
    /// no previous hash.
    ///
    /// # Returns
    ///
    /// The newly appended block
    pub fn add_block(&mut self, transactions: Vec<Transaction>) -> &Block {
        let previous_hash = self.head_block().map(|head| head.hash.clone());
        let block = Block::with_previous_hash(transactions, previous_hash);

        info!(
            "Appended block {} with {} transactions",
            self.blocks.len(),
            block.transactions.len()
        );
        self.blocks.push(block);
        &self.blocks[self.blocks.len() - 1]
    }

    /// Calculates the balance of a public key
    ///
    /// Sum received minus sum sent across every transaction in the chain.
    /// There is no minting, so balances can be negative. Sums are kept in
    /// `i128` so totals past the range of a single amount stay exact.
    pub fn balance_of(&self, public_key: &PublicKey) -> i128 {
        self.blocks
            .iter()
            .flat_map(|block| block.transactions.iter())
            .fold(0i128, |mut balance, tx| {
                if &tx.recipient == public_key {
                    balance += i128::from(tx.amount);
                }
                if &tx.source == public_key {
                    balance -= i128::from(tx.amount);
                }
                balance
            })
    }

    /// Gets all blocks in the chain
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Mutable access to one block, for tampering with it in place
    ///
    /// Changes made here do not update the block's hash.
    pub fn block_mut(&mut self, index: usize) -> Option<&mut Block> {
        self.blocks.get_mut(index)
    }

    /// Number of blocks, genesis included
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true for a chain with no blocks at all, not even genesis
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::crypto::create_keys;
    use crate::blockchain::test_utils::random_transaction;

    #[test]
    fn test_new_blockchain() {
        let blockchain = Blockchain::new();

        assert_eq!(blockchain.len(), 1);
        let genesis = blockchain.head_block().unwrap();
        assert!(genesis.transactions.is_empty());
        assert!(genesis.previous_hash.is_none());
        assert!(!genesis.hash.is_empty());
    }

    #[test]
    fn test_genesis_hash_is_unique_per_chain() {
        let first = Blockchain::new();
        let second = Blockchain::new();

        assert_ne!(first.head_block().unwrap().hash, second.head_block().unwrap().hash);
    }

    #[test]
    fn test_add_block_links_to_head() {
        let mut blockchain = Blockchain::new();
        let genesis_hash = blockchain.head_block().unwrap().hash.clone();

        let block = blockchain.add_block(vec![random_transaction()]);
        assert_eq!(block.previous_hash.as_deref(), Some(genesis_hash.as_str()));
        let first_hash = block.hash.clone();

        blockchain.add_block(vec![random_transaction(), random_transaction()]);
        assert_eq!(blockchain.len(), 3);
        assert_eq!(
            blockchain.head_block().unwrap().previous_hash.as_deref(),
            Some(first_hash.as_str())
        );
        assert_eq!(blockchain.head_block().unwrap().transactions.len(), 2);
    }

    #[test]
    fn test_balance_of() {
        let mut blockchain = Blockchain::new();
        let signer = create_keys();
        let recipient = create_keys();

        let transaction = Transaction::new(&signer.private_key, recipient.public_key.clone(), 100);
        blockchain.add_block(vec![transaction]);

        assert_eq!(blockchain.balance_of(&recipient.public_key), 100);
        assert_eq!(blockchain.balance_of(&signer.public_key), -100);
    }

    #[test]
    fn test_balance_across_blocks() {
        let mut blockchain = Blockchain::new();
        let alice = create_keys();
        let bob = create_keys();
        let carol = create_keys();

        blockchain.add_block(vec![Transaction::new(&alice.private_key, bob.public_key.clone(), 30)]);
        blockchain.add_block(vec![
            Transaction::new(&bob.private_key, carol.public_key.clone(), 10),
            Transaction::new(&carol.private_key, alice.public_key.clone(), 5),
        ]);

        assert_eq!(blockchain.balance_of(&alice.public_key), -25);
        assert_eq!(blockchain.balance_of(&bob.public_key), 20);
        assert_eq!(blockchain.balance_of(&carol.public_key), 5);
        assert_eq!(blockchain.balance_of(&create_keys().public_key), 0);
    }

    #[test]
    fn test_balance_beyond_single_amount_range() {
        let mut blockchain = Blockchain::new();
        let alice = create_keys();
        let bob = create_keys();
        let recipient = create_keys();

        blockchain.add_block(vec![
            Transaction::new(&alice.private_key, recipient.public_key.clone(), i64::MAX),
            Transaction::new(&bob.private_key, recipient.public_key.clone(), i64::MAX),
        ]);
        assert!(crate::blockchain::is_valid_chain(&blockchain));

        assert_eq!(
            blockchain.balance_of(&recipient.public_key),
            2 * i128::from(i64::MAX)
        );
        assert_eq!(
            blockchain.balance_of(&alice.public_key),
            -i128::from(i64::MAX)
        );
    }

    #[test]
    fn test_empty_chain() {
        let mut blockchain = Blockchain::from_blocks(Vec::new());
        assert!(blockchain.is_empty());
        assert!(blockchain.head_block().is_none());

        let block = blockchain.add_block(vec![random_transaction()]);
        assert!(block.previous_hash.is_none());
        assert_eq!(blockchain.len(), 1);

        // The first block carries transactions, so it is not a valid genesis
        assert!(!crate::blockchain::is_valid_chain(&blockchain));
    }

    #[test]
    fn test_self_transfer_nets_zero() {
        let mut blockchain = Blockchain::new();
        let keys = create_keys();

        blockchain.add_block(vec![Transaction::new(&keys.private_key, keys.public_key.clone(), 50)]);

        assert_eq!(blockchain.balance_of(&keys.public_key), 0);
    }

    #[test]
    fn test_add_block_accepts_invalid_transactions() {
        let mut blockchain = Blockchain::new();
        let keys = create_keys();

        blockchain.add_block(vec![Transaction::new(&keys.private_key, PublicKey::from("x"), -1)]);

        assert_eq!(blockchain.len(), 2);
        assert_eq!(blockchain.balance_of(&PublicKey::from("x")), -1);
    }

    #[test]
    fn test_block_mut_does_not_rehash() {
        let mut blockchain = Blockchain::new();
        blockchain.add_block(vec![random_transaction()]);
        let hash = blockchain.head_block().unwrap().hash.clone();

        if let Some(block) = blockchain.block_mut(1) {
            block.transactions.clear();
        }

        assert_eq!(blockchain.head_block().unwrap().hash, hash);
        assert!(blockchain.block_mut(5).is_none());
    }
}
