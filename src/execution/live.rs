//! Live execution engine

use super::{ExecutionEngine, OrderId, TradeIntent};
use crate::market::ClobClient;
use async_trait::async_trait;
use std::sync::Arc;

/// Live execution: orders go to the CLOB API. A rejected order surfaces as
/// an error and acquires nothing, leaving the market eligible for the next
/// poll.
pub struct LiveEngine {
    client: Arc<ClobClient>,
}

impl LiveEngine {
    /// Create a live engine on top of a CLOB client
    pub fn new(client: Arc<ClobClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ExecutionEngine for LiveEngine {
    fn mode(&self) -> &'static str {
        "live"
    }

    async fn place_order(&self, intent: TradeIntent) -> anyhow::Result<OrderId> {
        tracing::info!(
            market_id = %intent.market_id,
            outcome = %intent.outcome,
            price = %intent.price,
            size = %intent.size,
            "Executing buy"
        );

        let order_id = self
            .client
            .place_order(&intent.token_id, intent.price, intent.size)
            .await?;

        tracing::info!(order_id = %order_id, "Order sent");
        Ok(order_id)
    }
}
