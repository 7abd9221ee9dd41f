//! Cryptographic primitives for relayed wallet transactions.
//!
//! - `create2`: deterministic contract-wallet address derivation
//! - `safe_hash`: EIP-712 domain-separated transaction hashing
//! - `signer`: ECDSA signing with Safe-compatible recovery-byte encoding
//! - `builder_auth`: HMAC authentication for Builder API requests

pub mod builder_auth;
pub mod create2;
pub mod safe_hash;
pub mod signer;
