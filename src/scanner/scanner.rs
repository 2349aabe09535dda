//! Scanner loop
//!
//! One cooperative loop with two cadences: a market-list refresh and an
//! order-book poll. Per-market failures never abort the loop; loop-level
//! failures back off and resume. A stop signal takes effect between
//! iterations, leaving guard state as of the last completed one.

use super::PositionGuard;
use crate::classify::{self, PatternMode};
use crate::config::{ExecutionConfig, MarketConfig, ScannerConfig};
use crate::execution::{ExecutionEngine, TradeIntent};
use crate::market::{Market, MarketFeed, OutcomeSide, PriceFeed};
use crate::telemetry::metrics as scan_metrics;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::watch;

/// Live market scanner
pub struct SignalScanner {
    markets: Arc<dyn MarketFeed>,
    prices: Arc<dyn PriceFeed>,
    execution: Arc<dyn ExecutionEngine>,
    market_config: MarketConfig,
    config: ScannerConfig,
    execution_config: ExecutionConfig,
    guard: PositionGuard,
    monitored: Vec<Market>,
}

impl SignalScanner {
    /// Create a new scanner
    pub fn new(
        markets: Arc<dyn MarketFeed>,
        prices: Arc<dyn PriceFeed>,
        execution: Arc<dyn ExecutionEngine>,
        market_config: MarketConfig,
        config: ScannerConfig,
        execution_config: ExecutionConfig,
    ) -> Self {
        Self {
            markets,
            prices,
            execution,
            market_config,
            config,
            execution_config,
            guard: PositionGuard::new(),
            monitored: Vec::new(),
        }
    }

    /// Current guard state
    pub fn guard(&self) -> &PositionGuard {
        &self.guard
    }

    /// Markets currently being monitored
    pub fn monitored(&self) -> &[Market] {
        &self.monitored
    }

    /// Run the scan loop until the stop signal flips (or its sender drops).
    pub async fn run(&mut self, mut stop: watch::Receiver<bool>) -> anyhow::Result<()> {
        let mut refresh = tokio::time::interval(std::time::Duration::from_secs(
            self.market_config.refresh_interval_secs,
        ));
        let mut poll =
            tokio::time::interval(std::time::Duration::from_secs(self.config.poll_interval_secs));
        let backoff = std::time::Duration::from_secs(self.config.error_backoff_secs);

        tracing::info!(
            mode = self.execution.mode(),
            min_prob = %self.config.min_prob,
            max_prob = %self.config.max_prob,
            amount = %self.execution_config.amount,
            "Scanner started"
        );

        loop {
            tokio::select! {
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        tracing::info!("Stop signal received, scanner shutting down");
                        break;
                    }
                }
                _ = refresh.tick() => {
                    if let Err(e) = self.refresh_markets().await {
                        tracing::error!(error = %e, "Market refresh failed, backing off");
                        tokio::time::sleep(backoff).await;
                    }
                }
                _ = poll.tick() => {
                    self.poll_markets().await;
                }
            }
        }

        Ok(())
    }

    /// Rebuild the monitored set from a paginated open-market search.
    ///
    /// Markets failing any filter drop out until the next refresh. Guard
    /// entries are garbage-collected only for markets past close.
    async fn refresh_markets(&mut self) -> anyhow::Result<()> {
        let now = Utc::now();
        let mut found: Vec<Market> = Vec::new();
        let mut offset = 0;

        for _ in 0..self.config.max_pages {
            let page = self
                .markets
                .fetch_open_markets(
                    &self.market_config.family_phrase,
                    self.config.page_size,
                    offset,
                )
                .await?;
            if page.is_empty() {
                break;
            }

            for market in page {
                if self.accepts(&market, now) && !found.iter().any(|m| m.id == market.id) {
                    found.push(market);
                }
            }
            offset += self.config.page_size;
        }

        found.sort_by_key(|m| m.close_time);

        let closed: Vec<String> = self
            .monitored
            .iter()
            .filter(|m| m.close_time <= now)
            .map(|m| m.id.clone())
            .collect();
        self.guard.release_closed(closed.iter().map(String::as_str));

        scan_metrics::set_monitored_markets(found.len());
        tracing::info!(market_count = found.len(), "Monitoring active markets");

        self.monitored = found;
        Ok(())
    }

    /// Whether a listed market belongs in the monitored set right now
    fn accepts(&self, market: &Market, now: DateTime<Utc>) -> bool {
        if !classify::matches(&market.question, PatternMode::FifteenMin) {
            return false;
        }
        if market.close_time <= now {
            return false;
        }

        // The window opens a fixed offset before close; a market listed
        // earlier than that is a later instance, not yet tradeable
        let window_start =
            market.close_time - Duration::minutes(self.config.window_open_offset_minutes);
        if now < window_start {
            return false;
        }

        let seconds_left = (market.close_time - now).num_seconds();
        if seconds_left < self.config.min_minutes_to_close * 60 {
            return false;
        }
        if seconds_left > self.config.max_minutes_to_close * 60 {
            return false;
        }

        true
    }

    /// One poll pass over the monitored set. Per-market errors are logged
    /// and contained so the rest of the set still gets scanned.
    async fn poll_markets(&mut self) {
        scan_metrics::record_poll_cycle();
        let now = Utc::now();

        let due: Vec<Market> = self
            .monitored
            .iter()
            .filter(|m| m.close_time > now)
            .filter(|m| !self.guard.any_position(&m.id))
            .cloned()
            .collect();

        for market in due {
            if let Err(e) = self.check_market(&market).await {
                tracing::warn!(market_id = %market.id, error = %e, "Market check failed");
            }
        }
    }

    /// Evaluate one market's outcomes in their listed left-to-right order
    /// and enter on the first match. Never attempts both outcomes of one
    /// market in a single cycle.
    async fn check_market(&mut self, market: &Market) -> anyhow::Result<()> {
        tracing::debug!(question = %market.question, "Checking market");

        let outcomes: Vec<(OutcomeSide, String)> = market
            .outcomes
            .iter()
            .take(2)
            .zip(market.token_ids.iter())
            .filter_map(|(name, token)| {
                OutcomeSide::parse(name).map(|side| (side, token.clone()))
            })
            .collect();

        if outcomes.is_empty() {
            anyhow::bail!("no recognizable up/down outcomes");
        }

        for (side, token_id) in outcomes {
            let top = match self.prices.fetch_top_of_book(&token_id).await {
                Ok(top) => top,
                Err(e) => {
                    tracing::warn!(
                        market_id = %market.id,
                        outcome = %side,
                        error = %e,
                        "Order book fetch failed"
                    );
                    continue;
                }
            };

            let Some(top) = top else {
                tracing::debug!(outcome = %side, "No asks available");
                continue;
            };

            let ask = top.best_ask;
            if ask >= self.config.min_prob && ask <= self.config.max_prob {
                tracing::info!(
                    question = %market.question,
                    outcome = %side,
                    price = %ask,
                    "Entry signal found"
                );
                scan_metrics::record_signal();
                self.try_enter(market, side, &token_id, ask).await;
                break;
            }

            tracing::debug!(outcome = %side, price = %ask, "Outside entry band");
        }

        Ok(())
    }

    /// Size and submit one trade attempt. The guard is only marked on a
    /// successful (or simulated) acquisition; failed and undersized
    /// attempts leave the market eligible for later polls.
    async fn try_enter(&mut self, market: &Market, side: OutcomeSide, token_id: &str, price: Decimal) {
        let size = (self.execution_config.amount / price).round_dp(2);

        if size < self.execution_config.min_trade_size {
            tracing::info!(%size, "Trade size below minimum, skipping");
            return;
        }

        let intent = TradeIntent::new(&market.id, side, token_id, price, size);

        match self.execution.place_order(intent).await {
            Ok(order_id) => {
                self.guard.mark_acquired(&market.id, side);
                scan_metrics::record_trade();
                tracing::info!(
                    order_id = %order_id,
                    mode = self.execution.mode(),
                    market_id = %market.id,
                    outcome = %side,
                    "Position acquired"
                );
            }
            Err(e) => {
                tracing::error!(
                    market_id = %market.id,
                    outcome = %side,
                    error = %e,
                    "Trade failed, market remains eligible"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::{DryRunEngine, OrderId};
    use crate::market::{PricePoint, TopOfBook};
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn market(id: &str, minutes_to_close: i64) -> Market {
        Market {
            id: id.to_string(),
            question: "Bitcoin Up or Down - 1:00 PM - 1:15 PM".to_string(),
            outcomes: vec!["Up".to_string(), "Down".to_string()],
            token_ids: vec![format!("{}-up", id), format!("{}-down", id)],
            close_time: Utc::now() + Duration::minutes(minutes_to_close),
            volume: Decimal::ZERO,
            liquidity: Decimal::ZERO,
        }
    }

    /// Fake market/price collaborator with scripted books
    #[derive(Default)]
    struct FakeFeed {
        pages: Vec<Vec<Market>>,
        books: HashMap<String, Option<TopOfBook>>,
        fail_tokens: Vec<String>,
    }

    #[async_trait]
    impl MarketFeed for FakeFeed {
        async fn fetch_closed_markets(
            &self,
            _limit: usize,
            _min_minutes_since_close: i64,
            _mode: PatternMode,
        ) -> anyhow::Result<Vec<Market>> {
            Ok(vec![])
        }

        async fn fetch_open_markets(
            &self,
            _query: &str,
            _limit: usize,
            offset: usize,
        ) -> anyhow::Result<Vec<Market>> {
            let page = offset / 100;
            Ok(self.pages.get(page).cloned().unwrap_or_default())
        }
    }

    #[async_trait]
    impl PriceFeed for FakeFeed {
        async fn fetch_price_history(
            &self,
            _token_id: &str,
            _end_time: DateTime<Utc>,
            _fidelity_minutes: u32,
            _lookback_minutes: i64,
        ) -> anyhow::Result<Vec<PricePoint>> {
            Ok(vec![])
        }

        async fn fetch_top_of_book(&self, token_id: &str) -> anyhow::Result<Option<TopOfBook>> {
            if self.fail_tokens.iter().any(|t| t == token_id) {
                anyhow::bail!("timeout");
            }
            Ok(self.books.get(token_id).copied().flatten())
        }
    }

    /// Execution engine that always rejects
    struct RejectingEngine;

    #[async_trait]
    impl ExecutionEngine for RejectingEngine {
        fn mode(&self) -> &'static str {
            "live"
        }

        async fn place_order(&self, _intent: TradeIntent) -> anyhow::Result<OrderId> {
            anyhow::bail!("order rejected")
        }
    }

    fn ask(price: Decimal) -> Option<TopOfBook> {
        Some(TopOfBook {
            best_ask: price,
            best_bid: None,
        })
    }

    fn scanner_with(
        feed: FakeFeed,
        execution: Arc<dyn ExecutionEngine>,
    ) -> SignalScanner {
        let feed = Arc::new(feed);
        SignalScanner::new(
            feed.clone(),
            feed,
            execution,
            MarketConfig::default(),
            ScannerConfig::default(),
            ExecutionConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_entry_signal_acquires_once() {
        // An ask inside [0.52, 0.60] triggers exactly one trade
        let mut books = HashMap::new();
        books.insert("m1-up".to_string(), ask(dec!(0.55)));
        books.insert("m1-down".to_string(), ask(dec!(0.47)));

        let engine = Arc::new(DryRunEngine::new());
        let mut scanner = scanner_with(
            FakeFeed {
                books,
                ..Default::default()
            },
            engine.clone(),
        );
        scanner.monitored = vec![market("m1", 10)];

        scanner.poll_markets().await;
        assert!(scanner.guard.has_position("m1", OutcomeSide::Up));
        assert!(!scanner.guard.has_position("m1", OutcomeSide::Down));
        assert_eq!(engine.intents().await.len(), 1);

        // Second cycle with the same book: no second attempt
        scanner.poll_markets().await;
        assert_eq!(engine.intents().await.len(), 1);
    }

    #[tokio::test]
    async fn test_poll_stops_at_first_matching_outcome() {
        // Both outcomes in band; only the first (Up) may be attempted
        let mut books = HashMap::new();
        books.insert("m1-up".to_string(), ask(dec!(0.55)));
        books.insert("m1-down".to_string(), ask(dec!(0.55)));

        let engine = Arc::new(DryRunEngine::new());
        let mut scanner = scanner_with(
            FakeFeed {
                books,
                ..Default::default()
            },
            engine.clone(),
        );
        scanner.monitored = vec![market("m1", 10)];

        scanner.poll_markets().await;

        let intents = engine.intents().await;
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].outcome, OutcomeSide::Up);
    }

    #[tokio::test]
    async fn test_out_of_band_prices_do_not_trigger() {
        let mut books = HashMap::new();
        books.insert("m1-up".to_string(), ask(dec!(0.61)));
        books.insert("m1-down".to_string(), ask(dec!(0.39)));

        let engine = Arc::new(DryRunEngine::new());
        let mut scanner = scanner_with(
            FakeFeed {
                books,
                ..Default::default()
            },
            engine.clone(),
        );
        scanner.monitored = vec![market("m1", 10)];

        scanner.poll_markets().await;
        assert!(!scanner.guard.any_position("m1"));
        assert!(engine.intents().await.is_empty());
    }

    #[tokio::test]
    async fn test_band_bounds_are_inclusive() {
        let mut books = HashMap::new();
        books.insert("m1-up".to_string(), ask(dec!(0.52)));
        books.insert("m2-up".to_string(), ask(dec!(0.60)));

        let engine = Arc::new(DryRunEngine::new());
        let mut scanner = scanner_with(
            FakeFeed {
                books,
                ..Default::default()
            },
            engine.clone(),
        );
        scanner.monitored = vec![market("m1", 10), market("m2", 10)];

        scanner.poll_markets().await;
        assert!(scanner.guard.has_position("m1", OutcomeSide::Up));
        assert!(scanner.guard.has_position("m2", OutcomeSide::Up));
    }

    #[tokio::test]
    async fn test_failed_trade_leaves_market_eligible() {
        let mut books = HashMap::new();
        books.insert("m1-up".to_string(), ask(dec!(0.55)));

        let mut scanner = scanner_with(
            FakeFeed {
                books,
                ..Default::default()
            },
            Arc::new(RejectingEngine),
        );
        scanner.monitored = vec![market("m1", 10)];

        scanner.poll_markets().await;
        assert!(!scanner.guard.any_position("m1"));

        // Still polled next cycle
        scanner.poll_markets().await;
        assert!(!scanner.guard.any_position("m1"));
    }

    #[tokio::test]
    async fn test_undersized_trade_skips_without_guard_mutation() {
        let mut books = HashMap::new();
        books.insert("m1-up".to_string(), ask(dec!(0.55)));

        let engine = Arc::new(DryRunEngine::new());
        let feed = FakeFeed {
            books,
            ..Default::default()
        };
        let feed = Arc::new(feed);
        let mut execution_config = ExecutionConfig::default();
        // 0.05 / 0.55 rounds to 0.09 shares, below the 0.1 minimum
        execution_config.amount = dec!(0.05);

        let mut scanner = SignalScanner::new(
            feed.clone(),
            feed,
            engine.clone(),
            MarketConfig::default(),
            ScannerConfig::default(),
            execution_config,
        );
        scanner.monitored = vec![market("m1", 10)];

        scanner.poll_markets().await;
        assert!(!scanner.guard.any_position("m1"));
        assert!(engine.intents().await.is_empty());
    }

    #[tokio::test]
    async fn test_per_market_error_isolation() {
        // m1's book times out; m2 must still be scanned and entered
        let mut books = HashMap::new();
        books.insert("m2-up".to_string(), ask(dec!(0.55)));

        let engine = Arc::new(DryRunEngine::new());
        let mut scanner = scanner_with(
            FakeFeed {
                books,
                fail_tokens: vec!["m1-up".to_string(), "m1-down".to_string()],
                ..Default::default()
            },
            engine.clone(),
        );
        scanner.monitored = vec![market("m1", 10), market("m2", 10)];

        scanner.poll_markets().await;
        assert!(scanner.guard.has_position("m2", OutcomeSide::Up));
    }

    #[tokio::test]
    async fn test_closed_markets_not_polled() {
        let mut books = HashMap::new();
        books.insert("m1-up".to_string(), ask(dec!(0.55)));

        let engine = Arc::new(DryRunEngine::new());
        let feed = FakeFeed {
            books,
            ..Default::default()
        };
        let mut scanner = scanner_with(feed, engine.clone());
        scanner.monitored = vec![market("m1", -1)];

        scanner.poll_markets().await;
        assert!(engine.intents().await.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_filters_window_state() {
        let engine = Arc::new(DryRunEngine::new());
        let pages = vec![vec![
            market("active", 10),     // inside its window
            market("not-open", 30),   // window has not begun (> 20 min out)
            market("ending", 1),      // under the 2-minute floor
            market("closed", -5),     // already closed
        ]];

        let mut scanner = scanner_with(
            FakeFeed {
                pages,
                ..Default::default()
            },
            engine,
        );

        scanner.refresh_markets().await.unwrap();
        let ids: Vec<&str> = scanner.monitored().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["active"]);
    }

    #[tokio::test]
    async fn test_refresh_rejects_non_fifteen_minute_windows() {
        let engine = Arc::new(DryRunEngine::new());
        let mut hourly = market("hourly", 10);
        hourly.question = "Bitcoin Up or Down - 1:00 PM - 2:00 PM".to_string();

        let mut scanner = scanner_with(
            FakeFeed {
                pages: vec![vec![hourly, market("good", 10)]],
                ..Default::default()
            },
            engine,
        );

        scanner.refresh_markets().await.unwrap();
        let ids: Vec<&str> = scanner.monitored().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["good"]);
    }

    #[tokio::test]
    async fn test_refresh_dedupes_and_sorts_by_close() {
        let engine = Arc::new(DryRunEngine::new());
        let pages = vec![
            vec![market("later", 15), market("sooner", 5)],
            vec![market("sooner", 5)],
        ];

        let mut scanner = scanner_with(
            FakeFeed {
                pages,
                ..Default::default()
            },
            engine,
        );

        scanner.refresh_markets().await.unwrap();
        let ids: Vec<&str> = scanner.monitored().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["sooner", "later"]);
    }

    #[tokio::test]
    async fn test_refresh_releases_guard_only_after_close() {
        let engine = Arc::new(DryRunEngine::new());
        let mut scanner = scanner_with(FakeFeed::default(), engine);

        scanner.monitored = vec![market("open", 10), market("done", -1)];
        scanner.guard.mark_acquired("open", OutcomeSide::Up);
        scanner.guard.mark_acquired("done", OutcomeSide::Up);

        scanner.refresh_markets().await.unwrap();

        assert!(scanner.guard.has_position("open", OutcomeSide::Up));
        assert!(!scanner.guard.any_position("done"));
    }

    #[tokio::test]
    async fn test_run_honors_stop_signal() {
        let engine = Arc::new(DryRunEngine::new());
        let mut scanner = scanner_with(FakeFeed::default(), engine);

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            scanner.run(rx).await.unwrap();
            scanner
        });

        tx.send(true).unwrap();
        let scanner = tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .expect("scanner should stop promptly")
            .unwrap();
        assert_eq!(scanner.guard().market_count(), 0);
    }
}
