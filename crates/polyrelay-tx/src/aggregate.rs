//! Multi-call aggregation through the multisend helper contract.

use alloy_primitives::{address, Address, U256};
use polyrelay_abi::AbiValue;
use polyrelay_types::{Operation, RelayError, Result, SafeTransaction};

/// Multisend helper contract on Polygon.
pub const SAFE_MULTISEND: Address = address!("A238CBeb142c10Ef7Ad8442C6D1f9E89e07e7761");

/// Collapse a batch of calls into one wallet transaction.
///
/// A single call passes through unchanged. Multiple calls are packed into
/// one `multiSend(bytes)` delegate call so the wallet executes them
/// atomically under a single nonce and signature.
pub fn aggregate(txs: &[SafeTransaction], multisend: Address) -> Result<SafeTransaction> {
    match txs {
        [] => Err(RelayError::InvalidArgument(
            "no transactions to aggregate".to_string(),
        )),
        [single] => Ok(single.clone()),
        many => {
            let packed = polyrelay_abi::encode_packed(many);
            let data =
                polyrelay_abi::encode_call("multiSend(bytes)", &["bytes"], &[AbiValue::Bytes(packed)])?;
            Ok(SafeTransaction {
                to: multisend,
                operation: Operation::DelegateCall,
                data,
                value: U256::ZERO,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polyrelay_types::hex_to_bytes;

    const CTF: Address = address!("4D97DCd97eC945f40cF65F87097ACe5EA0476045");

    const REDEEM_CALLDATA: &str = "01b7037c\
        0000000000000000000000002791bca1f2de4661ed88a30c99a7a9449aa84174\
        0000000000000000000000000000000000000000000000000000000000000000\
        bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb\
        0000000000000000000000000000000000000000000000000000000000000080\
        0000000000000000000000000000000000000000000000000000000000000002\
        0000000000000000000000000000000000000000000000000000000000000001\
        0000000000000000000000000000000000000000000000000000000000000002";

    fn redeem_tx() -> SafeTransaction {
        SafeTransaction {
            to: CTF,
            operation: Operation::Call,
            data: hex_to_bytes(REDEEM_CALLDATA).unwrap(),
            value: U256::ZERO,
        }
    }

    fn small_tx() -> SafeTransaction {
        SafeTransaction {
            to: CTF,
            operation: Operation::Call,
            data: vec![0xde, 0xad, 0xbe, 0xef],
            value: U256::ZERO,
        }
    }

    #[test]
    fn test_empty_batch_rejected() {
        assert!(matches!(
            aggregate(&[], SAFE_MULTISEND),
            Err(RelayError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_single_call_passes_through() {
        let tx = redeem_tx();
        let aggregated = aggregate(&[tx.clone()], SAFE_MULTISEND).unwrap();
        assert_eq!(aggregated, tx);
        assert_eq!(aggregated.operation, Operation::Call);
    }

    #[test]
    fn test_multi_call_golden_calldata() {
        let aggregated = aggregate(&[redeem_tx(), small_tx()], SAFE_MULTISEND).unwrap();
        assert_eq!(aggregated.to, SAFE_MULTISEND);
        assert_eq!(aggregated.operation, Operation::DelegateCall);
        assert_eq!(aggregated.value, U256::ZERO);

        let ctf_hex = "4d97dcd97ec945f40cf65f87097ace5ea0476045";
        let zero_word = "0".repeat(64);
        // op (1) || to (20) || value (32) || data length (32) || data
        let packed_redeem = format!(
            "00{}{}{:064x}{}",
            ctf_hex,
            zero_word,
            228,
            REDEEM_CALLDATA
        );
        let packed_small = format!("00{}{}{:064x}deadbeef", ctf_hex, zero_word, 4);
        // selector || tail offset || byte length 0x192 || packed || pad to word
        let expected = format!(
            "0x8d80ff0a{:064x}{:064x}{}{}{}",
            32,
            0x192,
            packed_redeem,
            packed_small,
            "00".repeat(14)
        );
        assert_eq!(polyrelay_types::bytes_to_hex(&aggregated.data), expected);
    }

    #[test]
    fn test_multi_call_round_trips_through_packed_decoding() {
        let txs = vec![redeem_tx(), small_tx()];
        let aggregated = aggregate(&txs, SAFE_MULTISEND).unwrap();
        // Strip selector, offset, and length words to reach the packed bytes.
        let packed = &aggregated.data[4 + 32 + 32..4 + 32 + 32 + 402];
        assert_eq!(polyrelay_abi::decode_packed(packed).unwrap(), txs);
    }
}
