//! End-to-end operation orchestration.
//!
//! Builds the calldata for higher-level market operations and hands the
//! resulting transactions to the relayer client.

use alloy_primitives::{address, Address, B256, U256};
use tracing::debug;

use polyrelay_abi::AbiValue;
use polyrelay_tx::{ExecuteResponse, RelayerClient};
use polyrelay_types::{Result, Transaction};

/// Conditional tokens framework contract on Polygon.
pub const CTF_ADDRESS: Address = address!("4D97DCd97eC945f40cF65F87097ACe5EA0476045");

/// USDC collateral token on Polygon.
pub const USDC_ADDRESS: Address = address!("2791Bca1f2de4661ED88A30C99A7a9449Aa84174");

/// Parameters for a `redeemPositions` call.
#[derive(Debug, Clone)]
pub struct RedeemParams {
    pub conditional_tokens: Address,
    pub collateral_token: Address,
    pub parent_collection_id: B256,
    pub condition_id: B256,
    pub index_sets: Vec<U256>,
}

impl RedeemParams {
    /// Standard redemption for a binary market: USDC collateral, the root
    /// collection, and both outcome index sets.
    pub fn for_condition(condition_id: B256) -> Self {
        Self {
            conditional_tokens: CTF_ADDRESS,
            collateral_token: USDC_ADDRESS,
            parent_collection_id: B256::ZERO,
            condition_id,
            index_sets: vec![U256::from(1), U256::from(2)],
        }
    }
}

/// Encode a `redeemPositions` call against the conditional tokens contract.
pub fn build_redeem_transaction(params: &RedeemParams) -> Result<Transaction> {
    let data = polyrelay_abi::encode_call(
        "redeemPositions(address,bytes32,bytes32,uint256[])",
        &["address", "bytes32", "bytes32", "uint256[]"],
        &[
            AbiValue::Address(params.collateral_token),
            AbiValue::Bytes32(params.parent_collection_id),
            AbiValue::Bytes32(params.condition_id),
            AbiValue::Uint256Array(params.index_sets.clone()),
        ],
    )?;

    Ok(Transaction {
        to: params.conditional_tokens,
        data,
        value: U256::ZERO,
    })
}

/// Redeem both outcome positions for a resolved condition.
pub async fn redeem(client: &RelayerClient, condition_id: B256) -> Result<ExecuteResponse> {
    let params = RedeemParams::for_condition(condition_id);
    let tx = build_redeem_transaction(&params)?;
    debug!(condition_id = %condition_id, "submitting redemption");
    client.execute(&[tx], "Redeem positions").await
}
