//! Market data module
//!
//! Domain types for Polymarket up/down markets plus the collaborator seams
//! the core consumes: market discovery (Gamma API) and price data (CLOB API).

mod clob;
mod gamma;

pub use clob::{ClobClient, ClobConfig};
pub use gamma::{GammaClient, GammaConfig};

use crate::classify::PatternMode;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One side of a binary up/down market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeSide {
    Up,
    Down,
}

impl OutcomeSide {
    /// Both sides in evaluation order (Up first, as listed by the market)
    pub const BOTH: [OutcomeSide; 2] = [OutcomeSide::Up, OutcomeSide::Down];

    /// Parse a case-insensitive outcome name
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "up" => Some(OutcomeSide::Up),
            "down" => Some(OutcomeSide::Down),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeSide::Up => "Up",
            OutcomeSide::Down => "Down",
        }
    }
}

impl std::fmt::Display for OutcomeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Polymarket binary up/down market
///
/// Constructed by the market-data client from raw listing data and read-only
/// thereafter. `outcomes` and `token_ids` are index-aligned and hold exactly
/// two entries whose names resolve to Up and Down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    /// Market identifier
    pub id: String,
    /// Free-text market question/title
    pub question: String,
    /// Outcome names, exactly two ("Up"/"Down" in any case)
    pub outcomes: Vec<String>,
    /// CLOB token ID per outcome, index-aligned with `outcomes`
    pub token_ids: Vec<String>,
    /// Nominal close/settlement time
    pub close_time: DateTime<Utc>,
    /// Traded volume
    pub volume: Decimal,
    /// Current liquidity
    pub liquidity: Decimal,
}

impl Market {
    /// Index of the given side within `outcomes`/`token_ids`
    pub fn outcome_index(&self, side: OutcomeSide) -> Option<usize> {
        self.outcomes
            .iter()
            .position(|o| OutcomeSide::parse(o) == Some(side))
    }

    /// CLOB token ID for the given side
    pub fn token_for(&self, side: OutcomeSide) -> Option<&str> {
        let idx = self.outcome_index(side)?;
        self.token_ids.get(idx).map(String::as_str)
    }

    /// Minutes until the nominal close, negative once closed
    pub fn minutes_to_close(&self, now: DateTime<Utc>) -> i64 {
        (self.close_time - now).num_minutes()
    }
}

/// A single observed price for one outcome token
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Seconds since epoch
    #[serde(rename = "t")]
    pub timestamp: i64,
    /// Price in [0, 1]
    #[serde(rename = "p")]
    pub price: Decimal,
}

/// Top-of-book quote for one outcome token
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopOfBook {
    /// Best (lowest) ask price
    pub best_ask: Decimal,
    /// Best (highest) bid price, if any bids exist
    pub best_bid: Option<Decimal>,
}

/// Market discovery seam
#[async_trait]
pub trait MarketFeed: Send + Sync {
    /// Fetch closed family markets, newest first, truncated to `limit`
    async fn fetch_closed_markets(
        &self,
        limit: usize,
        min_minutes_since_close: i64,
        mode: PatternMode,
    ) -> anyhow::Result<Vec<Market>>;

    /// Fetch one page of currently open markets matching `query`.
    /// Callers drive pagination until an empty page comes back.
    async fn fetch_open_markets(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> anyhow::Result<Vec<Market>>;
}

/// Price data seam
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Fetch an outcome token's price history over the window ending at
    /// `end_time`, oldest point first
    async fn fetch_price_history(
        &self,
        token_id: &str,
        end_time: DateTime<Utc>,
        fidelity_minutes: u32,
        lookback_minutes: i64,
    ) -> anyhow::Result<Vec<PricePoint>>;

    /// Fetch the current top of book; `None` when the book has no asks
    async fn fetch_top_of_book(&self, token_id: &str) -> anyhow::Result<Option<TopOfBook>>;
}
