//! Dry-run execution engine

use super::{ExecutionEngine, OrderId, TradeIntent};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Simulated execution: every order "fills" immediately and the intent is
/// recorded for inspection
pub struct DryRunEngine {
    intents: Arc<RwLock<Vec<TradeIntent>>>,
}

impl DryRunEngine {
    /// Create a new dry-run engine
    pub fn new() -> Self {
        Self {
            intents: Arc::new(RwLock::new(vec![])),
        }
    }

    /// All recorded trade intents
    pub async fn intents(&self) -> Vec<TradeIntent> {
        self.intents.read().await.clone()
    }
}

impl Default for DryRunEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExecutionEngine for DryRunEngine {
    fn mode(&self) -> &'static str {
        "dry-run"
    }

    async fn place_order(&self, intent: TradeIntent) -> anyhow::Result<OrderId> {
        let order_id = Uuid::new_v4().to_string();

        tracing::info!(
            market_id = %intent.market_id,
            outcome = %intent.outcome,
            price = %intent.price,
            size = %intent.size,
            order_id = %order_id,
            "[DRY RUN] Would buy"
        );

        let mut intents = self.intents.write().await;
        intents.push(intent);

        Ok(order_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::OutcomeSide;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_dry_run_records_intent() {
        let engine = DryRunEngine::new();
        let intent = TradeIntent::new("m1", OutcomeSide::Up, "tok-up", dec!(0.55), dec!(9.09));

        let order_id = engine.place_order(intent).await.unwrap();
        assert!(!order_id.is_empty());

        let intents = engine.intents().await;
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].market_id, "m1");
        assert_eq!(intents[0].price, dec!(0.55));
    }

    #[tokio::test]
    async fn test_dry_run_multiple_orders() {
        let engine = DryRunEngine::new();
        for side in [OutcomeSide::Up, OutcomeSide::Down] {
            let intent = TradeIntent::new("m1", side, "tok", dec!(0.55), dec!(1));
            engine.place_order(intent).await.unwrap();
        }
        assert_eq!(engine.intents().await.len(), 2);
    }

    #[test]
    fn test_mode_label() {
        assert_eq!(DryRunEngine::new().mode(), "dry-run");
    }
}
