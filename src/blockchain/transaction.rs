use serde::{Deserialize, Serialize};

use super::crypto::{self, PrivateKey, PublicKey, Signature};

/// A signed transfer of value from one public key to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Sender's public key, derived from the signing private key
    pub source: PublicKey,

    /// Recipient's public key
    pub recipient: PublicKey,

    /// Amount being transferred
    ///
    /// Negative amounts can be constructed; the validator rejects them.
    pub amount: i64,

    /// Signature over `source || recipient || amount`
    pub signature: Signature,
}

impl Transaction {
    /// Creates and signs a new transaction
    ///
    /// # Arguments
    ///
    /// * `private_key` - The sender's private key, used to derive `source` and sign
    /// * `recipient` - The public key of the recipient
    /// * `amount` - The amount to transfer
    ///
    /// # Returns
    ///
    /// A new Transaction instance with all fields populated
    pub fn new(private_key: &PrivateKey, recipient: PublicKey, amount: i64) -> Self {
        let source = crypto::get_public_key(private_key);
        let message = signing_message(&source, &recipient, amount);
        let signature = crypto::sign(private_key, message.as_bytes());

        Transaction {
            source,
            recipient,
            amount,
            signature,
        }
    }

    /// The message the signature should cover, built from the current fields
    pub fn signing_message(&self) -> String {
        signing_message(&self.source, &self.recipient, self.amount)
    }
}

/// Builds the signing message: source, recipient and decimal amount, concatenated
pub fn signing_message(source: &PublicKey, recipient: &PublicKey, amount: i64) -> String {
    format!("{}{}{}", source, recipient, amount)
}
