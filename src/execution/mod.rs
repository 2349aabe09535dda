//! Execution engine module
//!
//! Order submission behind one seam, with a dry-run engine that records
//! simulated intents and a live engine that places real CLOB orders.

mod dry_run;
mod live;

pub use dry_run::DryRunEngine;
pub use live::LiveEngine;

use crate::market::OutcomeSide;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Order identifier as issued by the venue (or synthesized in dry-run mode)
pub type OrderId = String;

/// A buy intent for one outcome of one market
#[derive(Debug, Clone, Serialize)]
pub struct TradeIntent {
    /// Target market identifier
    pub market_id: String,
    /// Outcome being bought
    pub outcome: OutcomeSide,
    /// CLOB token ID for the outcome
    pub token_id: String,
    /// Limit price
    pub price: Decimal,
    /// Size in shares
    pub size: Decimal,
    /// Intent creation time
    pub timestamp: DateTime<Utc>,
}

impl TradeIntent {
    /// Create an intent stamped with the current time
    pub fn new(
        market_id: &str,
        outcome: OutcomeSide,
        token_id: &str,
        price: Decimal,
        size: Decimal,
    ) -> Self {
        Self {
            market_id: market_id.to_string(),
            outcome,
            token_id: token_id.to_string(),
            price,
            size,
            timestamp: Utc::now(),
        }
    }
}

/// Trait for execution engine implementations
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    /// Mode label for logs
    fn mode(&self) -> &'static str;

    /// Submit a buy order; an error means nothing was acquired
    async fn place_order(&self, intent: TradeIntent) -> anyhow::Result<OrderId>;
}
