use anyhow::Context;
use log::{info, warn};

use signed_ledger::blockchain::{self, Blockchain, PrivateKey, Transaction};

/// Environment variable holding an optional hex private key for the sender
const SIGNER_KEY_VAR: &str = "LEDGER_SIGNER_KEY";

// Use the configured sender key, or make a throwaway one
fn load_signer() -> anyhow::Result<PrivateKey> {
    match std::env::var(SIGNER_KEY_VAR) {
        Ok(hex_key) => {
            let key = hex_key
                .trim()
                .parse::<PrivateKey>()
                .with_context(|| format!("{} is not a valid private key", SIGNER_KEY_VAR))?;
            info!("Using sender key from {}", SIGNER_KEY_VAR);
            Ok(key)
        }
        Err(_) => Ok(blockchain::crypto::create_private_key()),
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let signer = load_signer()?;
    let sender = signer.public_key();
    let recipient = blockchain::crypto::create_keys();

    let mut chain = Blockchain::new();
    chain.add_block(vec![
        Transaction::new(&signer, recipient.public_key.clone(), 100),
        Transaction::new(&recipient.private_key, sender.clone(), 25),
    ]);

    info!("Sender balance: {}", chain.balance_of(&sender));
    info!("Recipient balance: {}", chain.balance_of(&recipient.public_key));
    println!("{}", serde_json::to_string_pretty(chain.blocks())?);

    match blockchain::validate_chain(&chain) {
        Ok(()) => info!("Chain of {} blocks is valid", chain.len()),
        Err(err) => warn!("Chain is invalid: {}", err),
    }

    blockchain::break_chain(&mut chain);

    match blockchain::validate_chain(&chain) {
        Ok(()) => warn!("Tampered chain still validates"),
        Err(err) => info!("Tampering detected: {}", err),
    }

    Ok(())
}
