use rand::Rng;

use super::crypto::{create_keys, create_private_key};
use super::transaction::Transaction;

/// A correctly signed transaction between two fresh keys, amount 1..=100
pub fn random_transaction() -> Transaction {
    let signer = create_private_key();
    let recipient = create_keys().public_key;
    let amount = rand::thread_rng().gen_range(1..=100);
    Transaction::new(&signer, recipient, amount)
}
