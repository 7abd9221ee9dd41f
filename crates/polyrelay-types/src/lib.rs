use std::fmt;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 0x-prefixed hex string (e.g. "0x1234...").
pub type Hex = String;

/// Polyrelay SDK error types.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("abi encoding failed: {0}")]
    Encoding(String),

    #[error("invalid signature recovery byte: {0}")]
    InvalidSignature(u8),

    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("relayer returned status {status}: {body}")]
    Relay { status: u16, body: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("unsupported wallet type: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, RelayError>;

/// Execution mode for a contract-wallet call.
///
/// Delegate calls run the target's code in the wallet's own storage
/// context; the multisend helper requires this mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Operation {
    Call = 0,
    DelegateCall = 1,
}

impl Operation {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(v: u8) -> Result<Self> {
        match v {
            0 => Ok(Operation::Call),
            1 => Ok(Operation::DelegateCall),
            other => Err(RelayError::InvalidArgument(format!(
                "invalid operation byte: {}",
                other
            ))),
        }
    }
}

/// Contract-wallet variant the relayer executes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletType {
    #[serde(rename = "SAFE")]
    Safe,
    #[serde(rename = "PROXY")]
    Proxy,
}

impl WalletType {
    pub fn as_str(self) -> &'static str {
        match self {
            WalletType::Safe => "SAFE",
            WalletType::Proxy => "PROXY",
        }
    }
}

impl fmt::Display for WalletType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One contract call. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub to: Address,
    pub data: Vec<u8>,
    pub value: U256,
}

/// A contract call plus its wallet execution mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeTransaction {
    pub to: Address,
    pub operation: Operation,
    pub data: Vec<u8>,
    pub value: U256,
}

impl From<Transaction> for SafeTransaction {
    fn from(tx: Transaction) -> Self {
        SafeTransaction {
            to: tx.to,
            operation: Operation::Call,
            data: tx.data,
            value: tx.value,
        }
    }
}

/// Builder API credentials. The secret is a base64-encoded HMAC key.
#[derive(Clone)]
pub struct BuilderCreds {
    pub key: String,
    pub secret: String,
    pub passphrase: String,
}

impl BuilderCreds {
    pub fn new(
        key: impl Into<String>,
        secret: impl Into<String>,
        passphrase: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
            passphrase: passphrase.into(),
        }
    }

    /// Load credentials from `POLY_BUILDER_API_KEY`, `POLY_BUILDER_SECRET`,
    /// and `POLY_BUILDER_PASSPHRASE`.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| {
            std::env::var(name)
                .map_err(|_| RelayError::InvalidCredentials(format!("{} is not set", name)))
        };
        Ok(Self {
            key: var("POLY_BUILDER_API_KEY")?,
            secret: var("POLY_BUILDER_SECRET")?,
            passphrase: var("POLY_BUILDER_PASSPHRASE")?,
        })
    }
}

// Secret and passphrase never appear in logs or error output.
impl fmt::Debug for BuilderCreds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuilderCreds")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .field("passphrase", &"<redacted>")
            .finish()
    }
}

/// Parse a hex string (with or without 0x prefix) to bytes.
pub fn hex_to_bytes(hex_str: &str) -> Result<Vec<u8>> {
    let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    hex::decode(hex_str).map_err(|e| RelayError::InvalidArgument(format!("invalid hex: {}", e)))
}

/// Convert bytes to a 0x-prefixed hex string.
pub fn bytes_to_hex(bytes: &[u8]) -> Hex {
    format!("0x{}", hex::encode(bytes))
}
