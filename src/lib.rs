// A minimal append-only ledger of signed value transfers.
//
// Transactions are signed with secp256k1 keys, bundled into SHA-512 hashed
// blocks, and chained by previous-block hash. Nothing is checked on the way
// in; `blockchain::validation` audits transactions, blocks and whole
// chains after the fact.

pub mod blockchain;
