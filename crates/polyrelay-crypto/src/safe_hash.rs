//! EIP-712 hashing for Safe transactions.
//!
//! Two-part domain-separated hash: the domain binds `chainId` and the
//! verifying wallet contract, the struct hash covers the full transaction
//! record. Field order in both type strings is fixed by the Safe contract;
//! reordering produces a validly-formed but wrong hash that fails only at
//! signature verification.

use alloy_primitives::{keccak256, Address, B256, U256};
use polyrelay_types::{Operation, SafeTransaction};

const DOMAIN_TYPE: &str = "EIP712Domain(uint256 chainId,address verifyingContract)";

const SAFE_TX_TYPE: &str = "SafeTx(address to,uint256 value,bytes data,uint8 operation,\
                            uint256 safeTxGas,uint256 baseGas,uint256 gasPrice,\
                            address gasToken,address refundReceiver,uint256 nonce)";

/// The full SafeTx record as hashed for signing.
///
/// The relayer fixes the five gas/refund fields at zero; they stay in the
/// record because the contract hashes all ten fields.
#[derive(Debug, Clone)]
pub struct SafeTxMessage {
    pub to: Address,
    pub value: U256,
    pub data: Vec<u8>,
    pub operation: Operation,
    pub safe_tx_gas: U256,
    pub base_gas: U256,
    pub gas_price: U256,
    pub gas_token: Address,
    pub refund_receiver: Address,
    pub nonce: U256,
}

impl SafeTxMessage {
    /// Wrap an aggregated transaction with the relayer's zeroed gas fields.
    pub fn from_transaction(tx: &SafeTransaction, nonce: U256) -> Self {
        Self {
            to: tx.to,
            value: tx.value,
            data: tx.data.clone(),
            operation: tx.operation,
            safe_tx_gas: U256::ZERO,
            base_gas: U256::ZERO,
            gas_price: U256::ZERO,
            gas_token: Address::ZERO,
            refund_receiver: Address::ZERO,
            nonce,
        }
    }
}

/// Hash of the encoded domain record `{chainId, verifyingContract}`.
///
/// The chain id is carried as `u64` but encoded as a full uint256 word;
/// it is never truncated on the hashing path.
pub fn domain_separator(chain_id: u64, verifying_contract: Address) -> B256 {
    let mut encoded = Vec::with_capacity(3 * 32);
    encoded.extend_from_slice(keccak256(DOMAIN_TYPE.as_bytes()).as_slice());
    encoded.extend_from_slice(&U256::from(chain_id).to_be_bytes::<32>());
    encoded.extend_from_slice(&address_word(verifying_contract));
    keccak256(&encoded)
}

/// Hash of the encoded SafeTx record. Dynamic `data` is hashed, not
/// embedded, per the EIP-712 rules for `bytes`.
pub fn struct_hash(msg: &SafeTxMessage) -> B256 {
    let mut encoded = Vec::with_capacity(11 * 32);
    encoded.extend_from_slice(keccak256(SAFE_TX_TYPE.as_bytes()).as_slice());
    encoded.extend_from_slice(&address_word(msg.to));
    encoded.extend_from_slice(&msg.value.to_be_bytes::<32>());
    encoded.extend_from_slice(keccak256(&msg.data).as_slice());
    encoded.extend_from_slice(&U256::from(msg.operation.as_u8()).to_be_bytes::<32>());
    encoded.extend_from_slice(&msg.safe_tx_gas.to_be_bytes::<32>());
    encoded.extend_from_slice(&msg.base_gas.to_be_bytes::<32>());
    encoded.extend_from_slice(&msg.gas_price.to_be_bytes::<32>());
    encoded.extend_from_slice(&address_word(msg.gas_token));
    encoded.extend_from_slice(&address_word(msg.refund_receiver));
    encoded.extend_from_slice(&msg.nonce.to_be_bytes::<32>());
    keccak256(&encoded)
}

/// Final signing hash: `keccak256(0x19 || 0x01 || domainSeparator || structHash)`.
pub fn transaction_digest(chain_id: u64, verifying_contract: Address, msg: &SafeTxMessage) -> B256 {
    let separator = domain_separator(chain_id, verifying_contract);
    let hash = struct_hash(msg);

    let mut data = Vec::with_capacity(2 + 32 + 32);
    data.push(0x19);
    data.push(0x01);
    data.extend_from_slice(separator.as_slice());
    data.extend_from_slice(hash.as_slice());
    keccak256(&data)
}

fn address_word(addr: Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(addr.as_slice());
    word
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256};
    use polyrelay_types::hex_to_bytes;

    // The tests reuse the redeem call for the condition id 0xbbbb..bb against
    // a Safe derived from the test owner 0x1a90d474..., nonce 42.
    const SAFE: Address = address!("fa07388d1fe14d7b387290a511c05cbb26a33241");
    const CTF: Address = address!("4D97DCd97eC945f40cF65F87097ACe5EA0476045");

    fn redeem_message(nonce: u64) -> SafeTxMessage {
        let data = hex_to_bytes(
            "0x01b7037c\
             0000000000000000000000002791bca1f2de4661ed88a30c99a7a9449aa84174\
             0000000000000000000000000000000000000000000000000000000000000000\
             bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb\
             0000000000000000000000000000000000000000000000000000000000000080\
             0000000000000000000000000000000000000000000000000000000000000002\
             0000000000000000000000000000000000000000000000000000000000000001\
             0000000000000000000000000000000000000000000000000000000000000002",
        )
        .unwrap();
        SafeTxMessage::from_transaction(
            &SafeTransaction {
                to: CTF,
                operation: Operation::Call,
                data,
                value: U256::ZERO,
            },
            U256::from(nonce),
        )
    }

    #[test]
    fn test_type_hashes_match_contract_constants() {
        // Published constants from the Safe v1.3.0 contracts.
        assert_eq!(
            keccak256(DOMAIN_TYPE.as_bytes()),
            b256!("47e79534a245952e8b16893a336b85a3d9ea9fa8c573f3d803afb92a79469218")
        );
        assert_eq!(
            keccak256(SAFE_TX_TYPE.as_bytes()),
            b256!("bb8310d486368db6bd6f849402fdd73ad53d316b5a4b2644ad6efe0f941286d8")
        );
    }

    #[test]
    fn test_domain_separator_golden() {
        assert_eq!(
            domain_separator(137, SAFE),
            b256!("507f2ba44dc47deb36f2cf037e0dd44d9991fcb92479d7f832f6c4efe515f4bc")
        );
    }

    #[test]
    fn test_struct_hash_golden() {
        assert_eq!(
            struct_hash(&redeem_message(42)),
            b256!("69b53501e1aaf7060217b5f7b63a90116bc6edb33f6669ff7b9cc93ebfd5fb43")
        );
    }

    #[test]
    fn test_transaction_digest_golden() {
        assert_eq!(
            transaction_digest(137, SAFE, &redeem_message(42)),
            b256!("9ece8cd06a98fa825126428f43b9788677a4c622ad54e035b55f70b40a21c981")
        );
    }

    #[test]
    fn test_digest_binds_every_field() {
        let base = transaction_digest(137, SAFE, &redeem_message(42));

        assert_ne!(base, transaction_digest(1, SAFE, &redeem_message(42)));
        assert_ne!(base, transaction_digest(137, CTF, &redeem_message(42)));
        assert_ne!(base, transaction_digest(137, SAFE, &redeem_message(43)));

        let mut msg = redeem_message(42);
        msg.data.push(0x00);
        assert_ne!(base, transaction_digest(137, SAFE, &msg));

        let mut msg = redeem_message(42);
        msg.operation = Operation::DelegateCall;
        assert_ne!(base, transaction_digest(137, SAFE, &msg));
    }
}
