// Blockchain module
//
// This module contains the core ledger implementation including:
// - Signing and verification (secp256k1)
// - Transaction structure
// - Block structure and hashing
// - Blockchain structure
// - Transaction, block and chain validation

pub mod block;
pub mod chain;
pub mod crypto;
pub mod transaction;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export main components for easier access
pub use block::{compute_hash, Block};
pub use chain::Blockchain;
pub use crypto::{CryptoError, KeyPair, PrivateKey, PublicKey, Signature};
pub use transaction::Transaction;
pub use validation::{
    break_chain, is_valid_block, is_valid_chain, is_valid_transaction, validate_block,
    validate_chain, validate_transaction, ValidationError,
};
