//! ABI encoding for the calls the relayer builds.
//!
//! - Canonical head/tail encoding for the supported parameter set
//! - Function-selector computation and call-data construction
//! - Packed multisend encoding (and its inverse, for inspection)
//!
//! Both encodings must be bit-exact with the on-chain decoders: a single
//! misplaced offset or padding byte produces an undecodable call.

use alloy_primitives::{keccak256, Address, B256, U256};
use polyrelay_types::{Operation, RelayError, Result, SafeTransaction};

const WORD: usize = 32;

/// A typed ABI parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Address(Address),
    Uint256(U256),
    Bytes32(B256),
    Bytes(Vec<u8>),
    Uint256Array(Vec<U256>),
}

impl AbiValue {
    fn type_name(&self) -> &'static str {
        match self {
            AbiValue::Address(_) => "address",
            AbiValue::Uint256(_) => "uint256",
            AbiValue::Bytes32(_) => "bytes32",
            AbiValue::Bytes(_) => "bytes",
            AbiValue::Uint256Array(_) => "uint256[]",
        }
    }

    fn is_dynamic(&self) -> bool {
        matches!(self, AbiValue::Bytes(_) | AbiValue::Uint256Array(_))
    }
}

const SUPPORTED_TYPES: [&str; 5] = ["address", "uint256", "bytes32", "bytes", "uint256[]"];

/// Encode an ordered list of `(type name, value)` pairs.
///
/// Fails if the counts mismatch, a type name is outside the supported set,
/// or a value does not match its declared type.
pub fn encode_params(types: &[&str], values: &[AbiValue]) -> Result<Vec<u8>> {
    if types.len() != values.len() {
        return Err(RelayError::Encoding(format!(
            "types and values length mismatch: {} vs {}",
            types.len(),
            values.len()
        )));
    }
    for (ty, value) in types.iter().zip(values.iter()) {
        if !SUPPORTED_TYPES.contains(ty) {
            return Err(RelayError::Encoding(format!("unsupported type: {}", ty)));
        }
        if *ty != value.type_name() {
            return Err(RelayError::Encoding(format!(
                "type mismatch: declared {}, value is {}",
                ty,
                value.type_name()
            )));
        }
    }
    Ok(encode(values))
}

/// Canonical head/tail encoding: static values inline in 32-byte slots,
/// dynamic values referenced by offset with a length-prefixed payload.
pub fn encode(values: &[AbiValue]) -> Vec<u8> {
    let head_size = values.len() * WORD;
    let mut head = Vec::with_capacity(head_size);
    let mut tail: Vec<u8> = Vec::new();

    for value in values {
        if value.is_dynamic() {
            let offset = U256::from(head_size + tail.len());
            head.extend_from_slice(&offset.to_be_bytes::<32>());
            tail.extend_from_slice(&encode_tail(value));
        } else {
            head.extend_from_slice(&static_word(value));
        }
    }

    head.extend_from_slice(&tail);
    head
}

fn static_word(value: &AbiValue) -> [u8; 32] {
    match value {
        AbiValue::Address(a) => {
            let mut word = [0u8; 32];
            word[12..].copy_from_slice(a.as_slice());
            word
        }
        AbiValue::Uint256(v) => v.to_be_bytes::<32>(),
        AbiValue::Bytes32(b) => b.0,
        _ => unreachable!("dynamic values have no static word"),
    }
}

fn encode_tail(value: &AbiValue) -> Vec<u8> {
    match value {
        AbiValue::Bytes(data) => {
            let mut out = Vec::with_capacity(WORD + data.len() + WORD);
            out.extend_from_slice(&U256::from(data.len()).to_be_bytes::<32>());
            out.extend_from_slice(data);
            let rem = data.len() % WORD;
            if rem != 0 {
                out.extend_from_slice(&vec![0u8; WORD - rem]);
            }
            out
        }
        AbiValue::Uint256Array(items) => {
            let mut out = Vec::with_capacity(WORD * (items.len() + 1));
            out.extend_from_slice(&U256::from(items.len()).to_be_bytes::<32>());
            for item in items {
                out.extend_from_slice(&item.to_be_bytes::<32>());
            }
            out
        }
        _ => unreachable!("static values have no tail"),
    }
}

/// First 4 bytes of keccak256 of the canonical function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Build call data: selector followed by the encoded parameters.
pub fn encode_call(signature: &str, types: &[&str], values: &[AbiValue]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    out.extend_from_slice(&selector(signature));
    out.extend_from_slice(&encode_params(types, values)?);
    Ok(out)
}

/// Packed multisend encoding: for each transaction,
/// `operation (1) || to (20) || value (32, big-endian) || data length (32) || data`,
/// concatenated with no padding between entries.
pub fn encode_packed(txs: &[SafeTransaction]) -> Vec<u8> {
    let mut out = Vec::new();
    for tx in txs {
        out.push(tx.operation.as_u8());
        out.extend_from_slice(tx.to.as_slice());
        out.extend_from_slice(&tx.value.to_be_bytes::<32>());
        out.extend_from_slice(&U256::from(tx.data.len()).to_be_bytes::<32>());
        out.extend_from_slice(&tx.data);
    }
    out
}

/// Decode a packed multisend payload back into its constituent transactions.
pub fn decode_packed(data: &[u8]) -> Result<Vec<SafeTransaction>> {
    let mut txs = Vec::new();
    let mut pos = 0usize;
    while pos < data.len() {
        if data.len() - pos < 1 + 20 + 32 + 32 {
            return Err(RelayError::Encoding(format!(
                "truncated packed entry at offset {}",
                pos
            )));
        }
        let operation = Operation::from_u8(data[pos])
            .map_err(|_| RelayError::Encoding(format!("invalid operation byte at offset {}", pos)))?;
        pos += 1;
        let to = Address::from_slice(&data[pos..pos + 20]);
        pos += 20;
        let value = U256::from_be_slice(&data[pos..pos + 32]);
        pos += 32;
        let len = U256::from_be_slice(&data[pos..pos + 32]);
        pos += 32;
        let len = usize::try_from(len)
            .map_err(|_| RelayError::Encoding(format!("data length overflow at offset {}", pos)))?;
        if data.len() - pos < len {
            return Err(RelayError::Encoding(format!(
                "packed data length {} exceeds remaining {} bytes",
                len,
                data.len() - pos
            )));
        }
        let tx_data = data[pos..pos + len].to_vec();
        pos += len;
        txs.push(SafeTransaction {
            to,
            operation,
            data: tx_data,
            value,
        });
    }
    Ok(txs)
}
