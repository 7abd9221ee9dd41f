//! Deterministic contract-wallet address derivation.
//!
//! `address = last 20 bytes of keccak256(0xff || factory || salt || init_code_hash)`
//!
//! The two wallet variants differ only in how the salt is built from the
//! owner address and in their factory init-code hash.

use alloy_primitives::{address, b256, keccak256, Address, B256};
use polyrelay_abi::AbiValue;
use polyrelay_types::WalletType;

/// Safe proxy factory on Polygon.
pub const SAFE_FACTORY: Address = address!("aacFeEa03eb1561C4e67d661e40682Bd20E3541b");

/// Proxy-wallet factory on Polygon.
pub const PROXY_FACTORY: Address = address!("aB45c5A4B0c941a2F231C04C3f49182e1A254052");

/// Init-code hash deployed by the Safe factory.
pub const SAFE_INIT_CODE_HASH: B256 =
    b256!("2bce2127ff07fb632d16c8347c4ebf501f4841168bed00d9e6ef715ddb6fcecf");

/// Init-code hash deployed by the proxy factory.
pub const PROXY_INIT_CODE_HASH: B256 =
    b256!("d21df8dc65880a8606f09fe0ce3df9b8869287ab0b058be05aa9e8af6330a00b");

/// Derive the Safe wallet address for an owner.
///
/// `salt = keccak256(abi.encode(owner))` — the owner is padded to a full
/// 32-byte word before hashing.
pub fn derive_safe(owner: Address, factory: Address) -> Address {
    let salt = keccak256(polyrelay_abi::encode(&[AbiValue::Address(owner)]));
    create2_address(factory, salt, SAFE_INIT_CODE_HASH)
}

/// Derive the proxy wallet address for an owner.
///
/// `salt = keccak256(owner)` over the raw 20 owner bytes, no padding.
pub fn derive_proxy_wallet(owner: Address, factory: Address) -> Address {
    let salt = keccak256(owner.as_slice());
    create2_address(factory, salt, PROXY_INIT_CODE_HASH)
}

/// Derive the wallet address for an owner using the production factory
/// for the given variant.
pub fn derive_wallet(owner: Address, wallet_type: WalletType) -> Address {
    match wallet_type {
        WalletType::Safe => derive_safe(owner, SAFE_FACTORY),
        WalletType::Proxy => derive_proxy_wallet(owner, PROXY_FACTORY),
    }
}

/// CREATE2 address computation.
pub fn create2_address(deployer: Address, salt: B256, init_code_hash: B256) -> Address {
    let mut data = Vec::with_capacity(1 + 20 + 32 + 32);
    data.push(0xff);
    data.extend_from_slice(deployer.as_slice());
    data.extend_from_slice(salt.as_slice());
    data.extend_from_slice(init_code_hash.as_slice());

    let hash = keccak256(&data);
    Address::from_slice(&hash[12..])
}
