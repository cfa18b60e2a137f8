use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use secp256k1::{ecdsa, All, Message, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use std::fmt;
use std::str::FromStr;

/// Shared secp256k1 context, built once on first use.
static SECP256K1: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

/// Errors that can occur while reading key material
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Decoding error: {0}")]
    DecodingError(#[from] hex::FromHexError),
}

/// A secp256k1 private key
///
/// Always holds a valid scalar, so every operation that takes a
/// `PrivateKey` is infallible. The text form is 64 hex characters.
#[derive(Clone)]
pub struct PrivateKey(SecretKey);

impl PrivateKey {
    /// Generates a fresh random private key from the OS random number generator
    pub fn generate() -> Self {
        PrivateKey(SecretKey::new(&mut OsRng))
    }

    /// Parses a private key from its hex form
    pub fn from_hex(hex_str: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(hex_str)?;
        SecretKey::from_slice(&bytes)
            .map(PrivateKey)
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))
    }

    /// Exports the private key as lowercase hex
    pub fn to_hex(&self) -> String {
        hex::encode(self.0.secret_bytes())
    }

    /// Derives the matching compressed public key
    pub fn public_key(&self) -> PublicKey {
        let point = secp256k1::PublicKey::from_secret_key(&SECP256K1, &self.0);
        PublicKey(hex::encode(point.serialize()))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey(<redacted>)")
    }
}

impl FromStr for PrivateKey {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrivateKey::from_hex(s)
    }
}

/// A public key as hex text (66 characters for a compressed point)
///
/// Kept as plain text: recipients are never checked for existence and a
/// tampered transaction may carry anything here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey(pub String);

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PublicKey {
    fn from(s: &str) -> Self {
        PublicKey(s.to_string())
    }
}

/// A compact ECDSA signature as hex text (128 characters)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(pub String);

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A private key together with its public key
#[derive(Debug, Clone)]
pub struct KeyPair {
    pub private_key: PrivateKey,
    pub public_key: PublicKey,
}

/// Creates a new random private key
pub fn create_private_key() -> PrivateKey {
    PrivateKey::generate()
}

/// Derives the public key for a private key
pub fn get_public_key(private_key: &PrivateKey) -> PublicKey {
    private_key.public_key()
}

/// Creates a private key and returns it along with its public key
pub fn create_keys() -> KeyPair {
    let private_key = create_private_key();
    let public_key = private_key.public_key();
    KeyPair {
        private_key,
        public_key,
    }
}

fn message_digest(message: &[u8]) -> Message {
    Message::from_digest(Sha256::digest(message).into())
}

/// Signs a message with a private key
///
/// The message is hashed with SHA-256 before signing.
pub fn sign(private_key: &PrivateKey, message: &[u8]) -> Signature {
    let signature = SECP256K1.sign_ecdsa(&message_digest(message), &private_key.0);
    Signature(hex::encode(signature.serialize_compact()))
}

/// Verifies a signature against a message and public key
///
/// # Returns
///
/// `false` when the signature does not match, and also when the key or
/// signature text is not well-formed
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
    let public_key = match hex::decode(&public_key.0)
        .ok()
        .and_then(|bytes| secp256k1::PublicKey::from_slice(&bytes).ok())
    {
        Some(key) => key,
        None => return false,
    };

    let signature = match hex::decode(&signature.0)
        .ok()
        .and_then(|bytes| ecdsa::Signature::from_compact(&bytes).ok())
    {
        Some(sig) => sig,
        None => return false,
    };

    SECP256K1
        .verify_ecdsa(&message_digest(message), &signature, &public_key)
        .is_ok()
}
