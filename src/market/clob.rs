//! CLOB API client
//!
//! Price history, top-of-book quotes, and order placement against
//! Polymarket's CLOB REST API.

use super::{PriceFeed, PricePoint, TopOfBook};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// CLOB API base URL
pub const CLOB_API_URL: &str = "https://clob.polymarket.com";

/// Configuration for the CLOB client
#[derive(Debug, Clone)]
pub struct ClobConfig {
    /// Base URL for the CLOB API
    pub base_url: String,
    /// Request timeout
    pub timeout: std::time::Duration,
    /// API key for authenticated order placement
    pub api_key: Option<String>,
}

impl Default for ClobConfig {
    fn default() -> Self {
        Self {
            base_url: CLOB_API_URL.to_string(),
            timeout: std::time::Duration::from_secs(30),
            api_key: std::env::var("POLYMARKET_API_KEY").ok(),
        }
    }
}

/// Client for Polymarket's CLOB API
pub struct ClobClient {
    config: ClobConfig,
    client: Client,
}

impl ClobClient {
    /// Create a new CLOB client with default configuration
    pub fn new() -> Self {
        Self::with_config(ClobConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClobConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Submit a buy order for an outcome token.
    ///
    /// Requires an API key in the configuration; rejected orders surface as
    /// errors and leave no state behind.
    pub async fn place_order(
        &self,
        token_id: &str,
        price: Decimal,
        size: Decimal,
    ) -> anyhow::Result<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("POLYMARKET_API_KEY not configured"))?;

        let url = format!("{}/order", self.config.base_url);
        let request = OrderRequest {
            token_id: token_id.to_string(),
            price,
            size,
            side: "BUY".to_string(),
        };

        let response = self
            .client
            .post(&url)
            .header("X-API-KEY", api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("CLOB order rejected: {} - {}", status, body);
        }

        let order: OrderResponse = response.json().await?;
        if !order.success {
            anyhow::bail!(
                "CLOB order rejected: {}",
                order.error_msg.unwrap_or_else(|| "unknown error".to_string())
            );
        }

        order
            .order_id
            .ok_or_else(|| anyhow::anyhow!("CLOB order accepted without an order ID"))
    }
}

impl Default for ClobClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceFeed for ClobClient {
    async fn fetch_price_history(
        &self,
        token_id: &str,
        end_time: DateTime<Utc>,
        fidelity_minutes: u32,
        lookback_minutes: i64,
    ) -> anyhow::Result<Vec<PricePoint>> {
        let end_ts = end_time.timestamp();
        let start_ts = end_ts - lookback_minutes * 60;
        let url = format!(
            "{}/prices-history?startTs={}&market={}&fidelity={}&endTs={}",
            self.config.base_url, start_ts, token_id, fidelity_minutes, end_ts
        );

        tracing::debug!(token_id, start_ts, end_ts, "Fetching price history");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            // A token without history is an expected condition, not a fault
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Ok(vec![]);
            }
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("CLOB API error: {} - {}", status, body);
        }

        let data: PricesHistoryResponse = response.json().await?;
        Ok(data.history)
    }

    async fn fetch_top_of_book(&self, token_id: &str) -> anyhow::Result<Option<TopOfBook>> {
        let url = format!("{}/book", self.config.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("token_id", token_id)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("CLOB API error: {} - {}", status, body);
        }

        let book: BookResponse = response.json().await?;
        Ok(top_of_book(&book))
    }
}

/// CLOB prices-history response
#[derive(Debug, Deserialize)]
struct PricesHistoryResponse {
    #[serde(default)]
    history: Vec<PricePoint>,
}

/// CLOB book response
#[derive(Debug, Deserialize)]
struct BookResponse {
    #[serde(default)]
    bids: Vec<BookLevel>,
    #[serde(default)]
    asks: Vec<BookLevel>,
}

/// Price level in the order book; the API serves both fields as strings
#[derive(Debug, Deserialize)]
struct BookLevel {
    price: String,
    #[allow(dead_code)]
    size: String,
}

/// Order submission payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderRequest {
    token_id: String,
    price: Decimal,
    size: Decimal,
    side: String,
}

/// Order submission response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderResponse {
    #[serde(default)]
    success: bool,
    #[serde(alias = "orderID")]
    order_id: Option<String>,
    error_msg: Option<String>,
}

/// Reduce a book to its top of book. Level ordering is not guaranteed by
/// the API, so best ask is the minimum ask and best bid the maximum bid.
fn top_of_book(book: &BookResponse) -> Option<TopOfBook> {
    let best_ask = book
        .asks
        .iter()
        .filter_map(|level| Decimal::from_str(&level.price).ok())
        .min()?;
    let best_bid = book
        .bids
        .iter()
        .filter_map(|level| Decimal::from_str(&level.price).ok())
        .max();

    Some(TopOfBook { best_ask, best_bid })
}
