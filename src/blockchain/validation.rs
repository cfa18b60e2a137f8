// Transaction, block and chain validation.
//
// Each level composes the one below it: a block is valid when its hash
// matches its contents and all its transactions are valid, and a chain is
// valid when its genesis is well formed, its links are intact and every
// later block is valid. The `validate_*` functions say what failed and
// where; the `is_valid_*` functions reduce that to a boolean.

use log::{debug, warn};
use thiserror::Error;

use super::block::{compute_hash, Block};
use super::chain::Blockchain;
use super::crypto;
use super::transaction::Transaction;

/// Previous hash written into a lone genesis block by [`break_chain`]
const TAMPERED_PREVIOUS_HASH: &str = "tampered";

/// Amount added to a transaction by [`break_chain`]
const TAMPER_AMOUNT: i64 = 1_000_000;

/// Reasons a transaction, block or chain fails validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Negative amount: {0}")]
    NegativeAmount(i64),

    #[error("Signature does not match source, recipient and amount")]
    InvalidSignature,

    #[error("Stored hash {stored} does not match recomputed hash {computed}")]
    HashMismatch { stored: String, computed: String },

    #[error("Transaction {index} is invalid: {reason}")]
    InvalidTransaction {
        index: usize,
        reason: Box<ValidationError>,
    },

    #[error("Chain has no genesis block")]
    MissingGenesis,

    #[error("Genesis block holds {0} transactions")]
    GenesisHasTransactions(usize),

    #[error("Genesis block has a previous hash")]
    GenesisHasPreviousHash,

    #[error("Block {0} has no hash")]
    MissingHash(usize),

    #[error("Block {0} has no previous hash")]
    MissingPreviousHash(usize),

    #[error("Block {index} does not link to the hash of the block before it")]
    BrokenLink { index: usize },

    #[error("Block {index} is invalid ({} problems)", .errors.len())]
    InvalidBlock {
        index: usize,
        errors: Vec<ValidationError>,
    },
}

/// Checks a transaction's amount and signature
pub fn validate_transaction(transaction: &Transaction) -> Result<(), ValidationError> {
    if transaction.amount < 0 {
        return Err(ValidationError::NegativeAmount(transaction.amount));
    }

    let message = transaction.signing_message();
    if !crypto::verify(&transaction.source, message.as_bytes(), &transaction.signature) {
        return Err(ValidationError::InvalidSignature);
    }

    Ok(())
}

/// Checks a block's hash against its contents and validates every transaction
///
/// The block is not modified: the hash is recomputed into a scratch value.
/// Every transaction is checked even after a failure.
///
/// # Returns
///
/// All problems found, in order: the hash mismatch first, then each
/// invalid transaction
pub fn validate_block(block: &Block) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let computed = compute_hash(&block.transactions, block.previous_hash.as_deref(), block.nonce);
    if computed != block.hash {
        errors.push(ValidationError::HashMismatch {
            stored: block.hash.clone(),
            computed,
        });
    }

    for (index, transaction) in block.transactions.iter().enumerate() {
        if let Err(reason) = validate_transaction(transaction) {
            errors.push(ValidationError::InvalidTransaction {
                index,
                reason: Box::new(reason),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks the whole chain
///
/// The genesis block must have no transactions, no previous hash and a
/// hash. It is not checked with [`validate_block`]. Every later block must
/// have a hash and a previous hash, the previous hash must equal the hash
/// of the block before it, and the block itself must be valid.
///
/// # Returns
///
/// The first failure found, walking from genesis to head
pub fn validate_chain(chain: &Blockchain) -> Result<(), ValidationError> {
    let blocks = chain.blocks();

    let genesis = blocks.first().ok_or(ValidationError::MissingGenesis)?;
    if !genesis.transactions.is_empty() {
        return Err(ValidationError::GenesisHasTransactions(genesis.transactions.len()));
    }
    if genesis.previous_hash.is_some() {
        return Err(ValidationError::GenesisHasPreviousHash);
    }
    if genesis.hash.is_empty() {
        return Err(ValidationError::MissingHash(0));
    }

    for (index, pair) in blocks.windows(2).enumerate() {
        let (previous, block) = (&pair[0], &pair[1]);
        let index = index + 1;

        if block.hash.is_empty() {
            return Err(ValidationError::MissingHash(index));
        }
        let previous_hash = match block.previous_hash.as_deref() {
            Some(hash) if !hash.is_empty() => hash,
            _ => return Err(ValidationError::MissingPreviousHash(index)),
        };
        if previous_hash != previous.hash {
            return Err(ValidationError::BrokenLink { index });
        }
        validate_block(block).map_err(|errors| ValidationError::InvalidBlock { index, errors })?;
    }

    Ok(())
}

/// Returns true if the transaction has a non-negative amount and a valid signature
pub fn is_valid_transaction(transaction: &Transaction) -> bool {
    match validate_transaction(transaction) {
        Ok(()) => true,
        Err(err) => {
            debug!("Rejected transaction from {}: {}", transaction.source, err);
            false
        }
    }
}

/// Returns true if the block's hash is current and all its transactions are valid
pub fn is_valid_block(block: &Block) -> bool {
    match validate_block(block) {
        Ok(()) => true,
        Err(errors) => {
            for err in &errors {
                debug!("Rejected block {}: {}", block.hash, err);
            }
            false
        }
    }
}

/// Returns true if the chain passes every check in [`validate_chain`]
pub fn is_valid_chain(chain: &Blockchain) -> bool {
    match validate_chain(chain) {
        Ok(()) => true,
        Err(err) => {
            debug!("Rejected chain: {}", err);
            false
        }
    }
}

/// Tampers with the head block without fixing its hash or signatures
///
/// Inflates the first transaction's amount, or bumps the nonce when the
/// block is empty. A chain holding only its genesis block gets a previous
/// hash instead. Afterwards [`is_valid_chain`] returns false.
pub fn break_chain(chain: &mut Blockchain) {
    let head = chain.len().saturating_sub(1);
    let block = match chain.block_mut(head) {
        Some(block) => block,
        None => return,
    };

    if head == 0 {
        warn!("Tampering with genesis block: setting a previous hash");
        block.previous_hash = Some(TAMPERED_PREVIOUS_HASH.to_string());
        return;
    }

    match block.transactions.first_mut() {
        Some(transaction) => {
            warn!("Tampering with block {}: inflating transaction amount", head);
            transaction.amount = transaction.amount.wrapping_add(TAMPER_AMOUNT);
        }
        None => {
            warn!("Tampering with block {}: changing nonce", head);
            block.nonce = block.nonce.wrapping_add(1);
        }
    }
}
