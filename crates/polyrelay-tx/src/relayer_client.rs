//! HTTP client for the relayer service.
//!
//! Endpoints:
//! - GET /nonce?address=<owner>&type=<wallet type>
//! - POST /submit

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use alloy_primitives::{Address, U256};
use tracing::debug;

use polyrelay_crypto::builder_auth::build_hmac_signature;
use polyrelay_crypto::create2::{derive_safe, SAFE_FACTORY};
use polyrelay_crypto::safe_hash::{transaction_digest, SafeTxMessage};
use polyrelay_crypto::signer::PrivateKey;
use polyrelay_types::{
    bytes_to_hex, BuilderCreds, RelayError, Result, SafeTransaction, Transaction, WalletType,
};

use crate::aggregate::{aggregate, SAFE_MULTISEND};
use crate::{ExecuteResponse, NonceResponse, SignatureParams, TransactionRequest};

/// Production relayer endpoint.
pub const DEFAULT_RELAYER_URL: &str = "https://relayer-v2.polymarket.com";

/// Polygon mainnet.
pub const POLYGON_CHAIN_ID: u64 = 137;

/// Relayer client configuration.
///
/// Either `private_key` or `owner` must be set. When both are present the
/// key wins: the owner address is always derived from it so the signature
/// and the derived wallet can never disagree.
#[derive(Debug, Clone)]
pub struct RelayerConfig {
    pub base_url: String,
    pub chain_id: u64,
    pub wallet_type: WalletType,
    pub creds: Option<BuilderCreds>,
    pub private_key: Option<String>,
    pub owner: Option<Address>,
    pub timeout_ms: Option<u64>,
}

impl Default for RelayerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_RELAYER_URL.to_string(),
            chain_id: POLYGON_CHAIN_ID,
            wallet_type: WalletType::Safe,
            creds: None,
            private_key: None,
            owner: None,
            timeout_ms: None,
        }
    }
}

/// Relayer client for building and submitting wallet transactions.
pub struct RelayerClient {
    base_url: String,
    chain_id: u64,
    wallet_type: WalletType,
    creds: Option<BuilderCreds>,
    key: Option<PrivateKey>,
    address: Address,
    client: reqwest::Client,
    timeout: Duration,
}

impl RelayerClient {
    pub fn new(config: RelayerConfig) -> Result<Self> {
        let key = match &config.private_key {
            Some(hex_key) => Some(PrivateKey::from_hex(hex_key)?),
            None => None,
        };
        let address = match (&key, config.owner) {
            (Some(key), _) => key.address(),
            (None, Some(owner)) => owner,
            (None, None) => {
                return Err(RelayError::InvalidArgument(
                    "either a private key or an owner address is required".to_string(),
                ))
            }
        };

        let timeout_ms = config.timeout_ms.unwrap_or(30_000);
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            chain_id: config.chain_id,
            wallet_type: config.wallet_type,
            creds: config.creds,
            key,
            address,
            client: reqwest::Client::builder()
                .timeout(Duration::from_millis(timeout_ms))
                .build()
                .unwrap_or_default(),
            timeout: Duration::from_millis(timeout_ms),
        })
    }

    /// The owner address requests are built for.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Fetch the signer's next nonce from the relayer.
    ///
    /// GET /nonce?address=<signer>&type=<wallet type>
    pub async fn get_nonce(&self, signer: Address) -> Result<U256> {
        let url = format!(
            "{}/nonce?address={}&type={}",
            self.base_url, signer, self.wallet_type
        );

        let resp = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| RelayError::Network(format!("nonce request failed: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(RelayError::Relay { status, body });
        }

        let body: NonceResponse = resp
            .json()
            .await
            .map_err(|e| RelayError::Decode(format!("nonce response: {}", e)))?;

        let nonce = U256::from_str_radix(&body.nonce, 10)
            .map_err(|e| RelayError::Decode(format!("nonce {:?}: {}", body.nonce, e)))?;
        debug!(nonce = %nonce, "fetched wallet nonce");
        Ok(nonce)
    }

    /// Sign and submit a batch of calls as one wallet transaction.
    ///
    /// POST /submit
    pub async fn execute(&self, txs: &[Transaction], metadata: &str) -> Result<ExecuteResponse> {
        let nonce = self.get_nonce(self.address).await?;
        let request = self.build_request(txs, nonce, metadata)?;

        let body = serde_json::to_string(&request)
            .map_err(|e| RelayError::Encoding(format!("request serialization: {}", e)))?;

        let url = format!("{}/submit", self.base_url);
        let mut req = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Credentials", "true")
            .timeout(self.timeout);

        // The HMAC covers the exact body string sent on the wire.
        if let Some(creds) = &self.creds {
            let timestamp = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs() as i64)
                .unwrap_or(0);
            let signature =
                build_hmac_signature(&creds.secret, timestamp, "POST", "/submit", Some(&body))?;
            req = req
                .header("POLY_BUILDER_API_KEY", &creds.key)
                .header("POLY_BUILDER_TIMESTAMP", timestamp.to_string())
                .header("POLY_BUILDER_PASSPHRASE", &creds.passphrase)
                .header("POLY_BUILDER_SIGNATURE", signature);
        }

        let resp = req
            .body(body)
            .send()
            .await
            .map_err(|e| RelayError::Network(format!("submit request failed: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(RelayError::Relay { status, body });
        }

        let result: ExecuteResponse = resp
            .json()
            .await
            .map_err(|e| RelayError::Decode(format!("submit response: {}", e)))?;

        debug!(
            tx_id = %result.transaction_id,
            state = %result.state,
            "relayer accepted transaction"
        );
        Ok(result)
    }

    /// Build the signed request for a batch of calls at a known nonce.
    ///
    /// Pure function of the client configuration and its inputs; `execute`
    /// pairs it with a freshly fetched nonce.
    pub fn build_request(
        &self,
        txs: &[Transaction],
        nonce: U256,
        metadata: &str,
    ) -> Result<TransactionRequest> {
        match self.wallet_type {
            WalletType::Safe => {
                let stxs: Vec<SafeTransaction> =
                    txs.iter().cloned().map(SafeTransaction::from).collect();
                self.build_safe_request(&stxs, nonce, metadata)
            }
            WalletType::Proxy => Err(RelayError::Unsupported(
                WalletType::Proxy.as_str().to_string(),
            )),
        }
    }

    fn build_safe_request(
        &self,
        txs: &[SafeTransaction],
        nonce: U256,
        metadata: &str,
    ) -> Result<TransactionRequest> {
        let key = self.key.as_ref().ok_or_else(|| {
            RelayError::InvalidArgument("a private key is required to sign requests".to_string())
        })?;

        let transaction = aggregate(txs, SAFE_MULTISEND)?;
        let safe = derive_safe(self.address, SAFE_FACTORY);

        let message = SafeTxMessage::from_transaction(&transaction, nonce);
        let digest = transaction_digest(self.chain_id, safe, &message);
        let signature = key.sign_digest(&digest)?;

        let zero_address = Address::ZERO.to_string();
        Ok(TransactionRequest {
            tx_type: WalletType::Safe.as_str().to_string(),
            from: self.address.to_string(),
            to: transaction.to.to_string(),
            proxy_wallet: Some(safe.to_string()),
            data: bytes_to_hex(&transaction.data),
            nonce: Some(nonce.to_string()),
            signature,
            signature_params: SignatureParams {
                gas_price: Some("0".to_string()),
                operation: Some(transaction.operation.as_u8().to_string()),
                safe_txn_gas: Some("0".to_string()),
                base_gas: Some("0".to_string()),
                gas_token: Some(zero_address.clone()),
                refund_receiver: Some(zero_address),
                ..SignatureParams::default()
            },
            metadata: Some(metadata.to_string()),
        })
    }
}
