//! HTTP client for the data API.
//!
//! Endpoints:
//! - GET /positions?user=<owner>&...

use std::time::Duration;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::debug;

use polyrelay_types::{RelayError, Result};

/// Production data API endpoint.
pub const DEFAULT_DATA_API_URL: &str = "https://data-api.polymarket.com";

/// One open position as reported by the data API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub proxy_wallet: String,
    pub asset: String,
    pub condition_id: String,
    pub size: f64,
    pub avg_price: f64,
    pub initial_value: f64,
    pub current_value: f64,
    pub cash_pnl: f64,
    pub percent_pnl: f64,
    pub total_bought: f64,
    pub realized_pnl: f64,
    pub percent_realized_pnl: f64,
    pub cur_price: f64,
    pub redeemable: bool,
    pub mergeable: bool,
    pub title: String,
    pub slug: String,
    pub icon: String,
    pub event_slug: String,
    pub outcome: String,
    pub outcome_index: i64,
    pub opposite_outcome: String,
    pub opposite_asset: String,
    pub end_date: String,
    pub negative_risk: bool,
}

/// Filters for a positions query. `user` is the only required field.
#[derive(Debug, Clone)]
pub struct PositionsQuery {
    pub user: Address,
    pub market: Vec<String>,
    pub event_id: Vec<i64>,
    pub size_threshold: f64,
    pub redeemable: bool,
    pub mergeable: bool,
    pub limit: u32,
    pub offset: u32,
    pub sort_by: String,
    pub sort_direction: String,
    pub title: String,
}

impl PositionsQuery {
    pub fn for_user(user: Address) -> Self {
        Self {
            user,
            market: Vec::new(),
            event_id: Vec::new(),
            size_threshold: 1.0,
            redeemable: false,
            mergeable: false,
            limit: 100,
            offset: 0,
            sort_by: "TOKENS".to_string(),
            sort_direction: "DESC".to_string(),
            title: String::new(),
        }
    }

    /// Flatten into query pairs. Repeatable filters emit one pair per value.
    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("user", self.user.to_string())];
        for market in &self.market {
            pairs.push(("market", market.clone()));
        }
        for event_id in &self.event_id {
            pairs.push(("eventId", event_id.to_string()));
        }
        pairs.push(("sizeThreshold", format!("{:.0}", self.size_threshold)));
        pairs.push(("redeemable", self.redeemable.to_string()));
        pairs.push(("mergeable", self.mergeable.to_string()));
        pairs.push(("limit", self.limit.to_string()));
        pairs.push(("offset", self.offset.to_string()));
        if !self.sort_by.is_empty() {
            pairs.push(("sortBy", self.sort_by.clone()));
        }
        if !self.sort_direction.is_empty() {
            pairs.push(("sortDirection", self.sort_direction.clone()));
        }
        if !self.title.is_empty() {
            pairs.push(("title", self.title.clone()));
        }
        pairs
    }
}

/// Data API client.
pub struct DataClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl DataClient {
    pub fn new(base_url: &str, timeout_ms: Option<u64>) -> Self {
        let timeout_ms = timeout_ms.unwrap_or(20_000);
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_millis(timeout_ms))
                .build()
                .unwrap_or_default(),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// Fetch positions matching the query.
    ///
    /// GET /positions?user=<owner>&sizeThreshold=N&redeemable=...&limit=L&offset=N
    pub async fn positions(&self, query: &PositionsQuery) -> Result<Vec<Position>> {
        let url = format!("{}/positions", self.base_url);

        let resp = self
            .client
            .get(&url)
            .query(&query.to_pairs())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| RelayError::Network(format!("positions request failed: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(RelayError::Relay { status, body });
        }

        let positions: Vec<Position> = resp
            .json()
            .await
            .map_err(|e| RelayError::Decode(format!("positions response: {}", e)))?;

        debug!(count = positions.len(), "fetched positions");
        Ok(positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_default_query_pairs() {
        let query =
            PositionsQuery::for_user(address!("1a90d4744979058aa58a8f981542cce348a85fd5"));
        let pairs = query.to_pairs();

        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(
            get("user").map(str::to_lowercase),
            Some("0x1a90d4744979058aa58a8f981542cce348a85fd5".to_string())
        );
        assert_eq!(get("sizeThreshold"), Some("1"));
        assert_eq!(get("redeemable"), Some("false"));
        assert_eq!(get("mergeable"), Some("false"));
        assert_eq!(get("limit"), Some("100"));
        assert_eq!(get("offset"), Some("0"));
        assert_eq!(get("sortBy"), Some("TOKENS"));
        assert_eq!(get("sortDirection"), Some("DESC"));
        assert_eq!(get("title"), None);
        assert_eq!(get("market"), None);
        assert_eq!(get("eventId"), None);
    }

    #[test]
    fn test_repeatable_filters_emit_one_pair_each() {
        let mut query =
            PositionsQuery::for_user(address!("1a90d4744979058aa58a8f981542cce348a85fd5"));
        query.market = vec!["0xaaaa".to_string(), "0xbbbb".to_string()];
        query.event_id = vec![12, 34];
        query.redeemable = true;
        query.title = "election".to_string();

        let pairs = query.to_pairs();
        let values = |key: &str| -> Vec<&str> {
            pairs
                .iter()
                .filter(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
                .collect()
        };
        assert_eq!(values("market"), vec!["0xaaaa", "0xbbbb"]);
        assert_eq!(values("eventId"), vec!["12", "34"]);
        assert_eq!(values("redeemable"), vec!["true"]);
        assert_eq!(values("title"), vec!["election"]);
    }

    #[tokio::test]
    async fn test_unreachable_api_is_a_network_error() {
        let client = DataClient::new("http://127.0.0.1:1", Some(1_000));
        let query =
            PositionsQuery::for_user(address!("1a90d4744979058aa58a8f981542cce348a85fd5"));
        assert!(matches!(
            client.positions(&query).await,
            Err(RelayError::Network(_))
        ));
    }

    #[test]
    fn test_position_decodes_from_wire_json() {
        let json = r#"{
            "proxyWallet": "0xfa07388d1fe14d7b387290a511c05cbb26a33241",
            "asset": "1234",
            "conditionId": "0xbbbb",
            "size": 10.5,
            "avgPrice": 0.42,
            "initialValue": 4.41,
            "currentValue": 10.5,
            "cashPnl": 6.09,
            "percentPnl": 138.1,
            "totalBought": 10.5,
            "realizedPnl": 0.0,
            "percentRealizedPnl": 0.0,
            "curPrice": 1.0,
            "redeemable": true,
            "mergeable": false,
            "title": "Example market",
            "slug": "example-market",
            "icon": "https://example.com/icon.png",
            "eventSlug": "example-event",
            "outcome": "Yes",
            "outcomeIndex": 0,
            "oppositeOutcome": "No",
            "oppositeAsset": "5678",
            "endDate": "2026-01-01",
            "negativeRisk": false
        }"#;

        let position: Position = serde_json::from_str(json).unwrap();
        assert_eq!(position.condition_id, "0xbbbb");
        assert!(position.redeemable);
        assert_eq!(position.outcome_index, 0);
        assert_eq!(position.cur_price, 1.0);
    }
}
