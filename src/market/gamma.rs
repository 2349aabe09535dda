//! Gamma API client for market discovery
//!
//! Fetches "Bitcoin Up or Down" markets from Polymarket's Gamma API: closed
//! markets for the backtest path and open markets for the live scanner.

use super::{Market, MarketFeed, OutcomeSide};
use crate::classify::{self, PatternMode};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

/// Gamma API base URL
pub const GAMMA_API_URL: &str = "https://gamma-api.polymarket.com";

/// Tag ID for the crypto short-interval category that carries the up/down
/// markets; listing by tag is the only way Gamma exposes them in bulk
const CRYPTO_UP_DOWN_TAG: &str = "102175";

/// Configuration for the Gamma client
#[derive(Debug, Clone)]
pub struct GammaConfig {
    /// Base URL for the Gamma API
    pub base_url: String,
    /// Request timeout
    pub timeout: std::time::Duration,
    /// Title phrase identifying the market family
    pub family_phrase: String,
}

impl Default for GammaConfig {
    fn default() -> Self {
        Self {
            base_url: GAMMA_API_URL.to_string(),
            timeout: std::time::Duration::from_secs(30),
            family_phrase: classify::FAMILY_PHRASE.to_string(),
        }
    }
}

/// Client for Polymarket's Gamma API
pub struct GammaClient {
    config: GammaConfig,
    client: Client,
}

impl GammaClient {
    /// Create a new Gamma API client with default configuration
    pub fn new() -> Self {
        Self::with_config(GammaConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: GammaConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Convert a listing row into a Market, or `None` when the row is not a
    /// usable binary up/down market (wrong outcomes, missing tokens)
    fn convert_to_market(&self, raw: GammaMarket) -> Option<Market> {
        let outcomes = parse_string_list(raw.outcomes.as_deref())?;
        if outcomes.len() != 2 {
            return None;
        }
        // Both canonical sides must be present, in either listing order
        for side in OutcomeSide::BOTH {
            outcomes
                .iter()
                .position(|o| OutcomeSide::parse(o) == Some(side))?;
        }

        let token_ids = parse_string_list(raw.clob_token_ids.as_deref())?;
        if token_ids.len() < 2 {
            return None;
        }

        let close_time = parse_close_time(raw.end_date.as_deref()?)?;

        Some(Market {
            id: raw.id,
            question: raw.question,
            outcomes,
            token_ids,
            close_time,
            volume: parse_decimal_field(raw.volume.as_ref()),
            liquidity: parse_decimal_field(raw.liquidity.as_ref()),
        })
    }
}

impl Default for GammaClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketFeed for GammaClient {
    /// Fetch closed family markets matching the window pattern.
    ///
    /// The tag listing mixes window granularities and other assets, so the
    /// request oversamples (5x the limit, floor 200) and filters locally:
    /// family phrase, window classification, and a close-time cutoff that
    /// skips markets closed too recently to have settled price history.
    async fn fetch_closed_markets(
        &self,
        limit: usize,
        min_minutes_since_close: i64,
        mode: PatternMode,
    ) -> anyhow::Result<Vec<Market>> {
        let url = format!("{}/markets", self.config.base_url);
        let fetch_limit = (limit * 5).max(200);

        tracing::debug!(url = %url, fetch_limit, "Fetching closed markets from Gamma API");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("tag_id", CRYPTO_UP_DOWN_TAG),
                ("closed", "true"),
                ("limit", &fetch_limit.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gamma API error: {} - {}", status, body);
        }

        let raw_markets: Vec<GammaMarket> = response.json().await?;
        let cutoff = Utc::now() - Duration::minutes(min_minutes_since_close);

        let mut markets: Vec<Market> = raw_markets
            .into_iter()
            .filter(|raw| {
                raw.question
                    .to_lowercase()
                    .contains(&self.config.family_phrase)
            })
            .filter(|raw| classify::matches(&raw.question, mode))
            .filter_map(|raw| self.convert_to_market(raw))
            .filter(|m| m.close_time <= cutoff)
            .collect();

        // Newest close first
        markets.sort_by(|a, b| b.close_time.cmp(&a.close_time));
        markets.truncate(limit);

        tracing::info!(market_count = markets.len(), "Found closed family markets");
        Ok(markets)
    }

    /// Fetch one page of open markets.
    ///
    /// Gamma has no free-text search on the markets listing, so the query
    /// filter is applied locally to each page; an empty page still ends
    /// pagination at the caller.
    async fn fetch_open_markets(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> anyhow::Result<Vec<Market>> {
        let url = format!("{}/markets", self.config.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("tag_id", CRYPTO_UP_DOWN_TAG),
                ("closed", "false"),
                ("active", "true"),
                ("limit", &limit.to_string()),
                ("offset", &offset.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gamma API error: {} - {}", status, body);
        }

        let raw_markets: Vec<GammaMarket> = response.json().await?;
        let query_lower = query.to_lowercase();

        let markets: Vec<Market> = raw_markets
            .into_iter()
            .filter(|raw| raw.question.to_lowercase().contains(&query_lower))
            .filter_map(|raw| self.convert_to_market(raw))
            .collect();

        tracing::debug!(
            offset,
            page_markets = markets.len(),
            "Fetched open market page"
        );
        Ok(markets)
    }
}

/// Raw market row from the Gamma listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GammaMarket {
    id: String,
    question: String,
    /// Outcome names as a JSON-encoded string array
    outcomes: Option<String>,
    /// CLOB token IDs as a JSON-encoded string array
    clob_token_ids: Option<String>,
    /// Close time, present under either key depending on endpoint version
    #[serde(alias = "endDateIso", alias = "end_date_iso")]
    end_date: Option<String>,
    volume: Option<serde_json::Value>,
    liquidity: Option<serde_json::Value>,
}

/// Parse a JSON-encoded string array field ("[\"Up\", \"Down\"]")
fn parse_string_list(raw: Option<&str>) -> Option<Vec<String>> {
    serde_json::from_str(raw?).ok()
}

/// Parse an ISO close time, tolerating a trailing Z
fn parse_close_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Gamma serves volume/liquidity as either a number or a string
fn parse_decimal_field(value: Option<&serde_json::Value>) -> Decimal {
    match value {
        Some(serde_json::Value::String(s)) => Decimal::from_str(s).unwrap_or(Decimal::ZERO),
        Some(serde_json::Value::Number(n)) => n
            .as_f64()
            .and_then(|f| Decimal::try_from(f).ok())
            .unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}
