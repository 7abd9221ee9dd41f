//! Relayer request builder and client.
//!
//! - Aggregate calls into a single wallet transaction
//! - Hash and sign the transaction for the wallet contract
//! - Submit to the relayer service

use serde::{Deserialize, Serialize};
use polyrelay_types::Hex;

pub mod aggregate;
pub mod relayer_client;

pub use aggregate::{aggregate, SAFE_MULTISEND};
pub use relayer_client::{RelayerClient, RelayerConfig};

/// Signature metadata the relayer forwards to the wallet contract.
///
/// The full field set covers both wallet variants; each request populates
/// only the fields its variant uses and omits the rest from the JSON body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relayer_fee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relay_hub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relay: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safe_txn_gas: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_gas: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_receiver: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_receiver: Option<String>,
}

/// Signed transaction submitted to POST /submit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    #[serde(rename = "type")]
    pub tx_type: String,
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_wallet: Option<String>,
    pub data: Hex,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    pub signature: Hex,
    pub signature_params: SignatureParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

/// Relayer response after submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteResponse {
    #[serde(rename = "transactionID")]
    pub transaction_id: String,
    pub state: String,
    pub hash: String,
    #[serde(rename = "transactionHash")]
    pub transaction_hash: String,
}

/// Response from GET /nonce. The nonce comes back as a decimal string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NonceResponse {
    pub nonce: String,
}
