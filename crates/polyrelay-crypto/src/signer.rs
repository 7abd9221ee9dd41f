//! ECDSA signing with Safe-compatible recovery-byte encoding.
//!
//! The relayer verifies signatures through the Safe's `checkSignatures`
//! eth_sign path: the digest is wrapped with the personal-message prefix
//! before signing, and the recovery byte is shifted into the 31/32 range
//! so the contract selects that recovery path. A cryptographically valid
//! signature with the wrong recovery byte is rejected on-chain.

use alloy_primitives::{keccak256, Address, B256};
use k256::ecdsa::SigningKey;
use polyrelay_types::{bytes_to_hex, Hex, RelayError, Result};

const PERSONAL_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// A secp256k1 signing key and its derived EOA address.
pub struct PrivateKey {
    key: SigningKey,
    address: Address,
}

impl PrivateKey {
    /// Parse a hex-encoded 32-byte private key (0x prefix optional).
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = polyrelay_types::hex_to_bytes(hex_str)?;
        let key = SigningKey::from_slice(&bytes)
            .map_err(|e| RelayError::InvalidArgument(format!("invalid private key: {}", e)))?;
        let address = address_of(&key);
        Ok(Self { key, address })
    }

    /// The signer address recovered by the contract.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a 32-byte digest: personal-message wrap, deterministic ECDSA,
    /// then recovery-byte normalization. Returns the 65-byte `r || s || v`
    /// signature as a 0x-prefixed hex string.
    pub fn sign_digest(&self, digest: &B256) -> Result<Hex> {
        let message_hash = personal_message_hash(digest);
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(message_hash.as_slice())
            .map_err(|e| RelayError::InvalidArgument(format!("ecdsa signing failed: {}", e)))?;

        let v = normalize_v(recovery_id.to_byte())?;

        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = v;
        Ok(bytes_to_hex(&out))
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// `keccak256("\x19Ethereum Signed Message:\n32" || digest)`.
pub fn personal_message_hash(digest: &B256) -> B256 {
    let mut data = Vec::with_capacity(PERSONAL_PREFIX.len() + 32);
    data.extend_from_slice(PERSONAL_PREFIX);
    data.extend_from_slice(digest.as_slice());
    keccak256(&data)
}

/// Map a raw recovery byte into the contract's eth_sign convention:
/// `{0,1} -> {31,32}`, `{27,28} -> {31,32}`. Anything else is rejected.
pub fn normalize_v(v: u8) -> Result<u8> {
    match v {
        0 | 1 => Ok(v + 31),
        27 | 28 => Ok(v + 4),
        other => Err(RelayError::InvalidSignature(other)),
    }
}

fn address_of(key: &SigningKey) -> Address {
    let point = key.verifying_key().to_encoded_point(false);
    // Skip the 0x04 uncompressed-point tag.
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}
