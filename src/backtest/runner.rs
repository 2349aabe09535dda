//! Backtest runner
//!
//! Drives market discovery, price-history collection, extraction, and
//! aggregation. Per-market failures are contained here: a market with no
//! data, an undetermined winner, or a failed fetch is logged and skipped,
//! and the report is produced from whatever survived.

use super::{
    extract_bets, find_optimal_entry, momentum_slice, price_bucket_slice, threshold_slice,
    time_slice, BacktestReport, BetRecord,
};
use crate::classify::PatternMode;
use crate::config::BacktestConfig;
use crate::market::{Market, MarketFeed, OutcomeSide, PriceFeed};
use std::sync::Arc;

/// Runs the backtest pipeline against the market and price collaborators
pub struct BacktestRunner {
    markets: Arc<dyn MarketFeed>,
    prices: Arc<dyn PriceFeed>,
    config: BacktestConfig,
}

impl BacktestRunner {
    /// Create a new runner
    pub fn new(
        markets: Arc<dyn MarketFeed>,
        prices: Arc<dyn PriceFeed>,
        config: BacktestConfig,
    ) -> Self {
        Self {
            markets,
            prices,
            config,
        }
    }

    /// Fetch closed markets, collect bet records, and aggregate them.
    ///
    /// The report is always produced, even when every market was skipped.
    pub async fn run(&self, mode: PatternMode) -> anyhow::Result<BacktestReport> {
        let markets = self
            .markets
            .fetch_closed_markets(self.config.limit, self.config.min_minutes_since_close, mode)
            .await?;

        tracing::info!(market_count = markets.len(), "Collecting price data");

        let mut all_bets = Vec::new();
        let mut analyzed = 0usize;
        let mut skipped = 0usize;

        for (idx, market) in markets.iter().enumerate() {
            tracing::info!(
                progress = format!("{}/{}", idx + 1, markets.len()),
                question = %market.question,
                "Processing market"
            );

            match self.collect_market(market).await {
                Ok(bets) => {
                    analyzed += 1;
                    all_bets.extend(bets);
                }
                Err(reason) => {
                    skipped += 1;
                    tracing::warn!(market_id = %market.id, %reason, "Skipping market");
                }
            }
        }

        Ok(aggregate(all_bets, analyzed, skipped, &self.config))
    }

    /// Collect both outcome histories for one market and extract bets
    async fn collect_market(&self, market: &Market) -> anyhow::Result<Vec<BetRecord>> {
        let up_token = market
            .token_for(OutcomeSide::Up)
            .ok_or_else(|| anyhow::anyhow!("missing Up token"))?;
        let down_token = market
            .token_for(OutcomeSide::Down)
            .ok_or_else(|| anyhow::anyhow!("missing Down token"))?;

        let up_history = self
            .prices
            .fetch_price_history(
                up_token,
                market.close_time,
                self.config.fidelity_minutes,
                self.config.lookback_minutes,
            )
            .await?;
        let down_history = self
            .prices
            .fetch_price_history(
                down_token,
                market.close_time,
                self.config.fidelity_minutes,
                self.config.lookback_minutes,
            )
            .await?;

        Ok(extract_bets(market, &up_history, &down_history)?)
    }
}

/// Reduce collected records to the full report
fn aggregate(
    bets: Vec<BetRecord>,
    analyzed: usize,
    skipped: usize,
    config: &BacktestConfig,
) -> BacktestReport {
    BacktestReport {
        markets_analyzed: analyzed,
        markets_skipped: skipped,
        total_bets: bets.len(),
        thresholds: threshold_slice(&bets, &config.thresholds),
        buckets: price_bucket_slice(
            &bets,
            config.bucket_width,
            config.bucket_min,
            config.bucket_max,
        ),
        timing: time_slice(&bets),
        momentum: momentum_slice(&bets, &config.deviation_thresholds),
        optimal: find_optimal_entry(&bets, config.min_optimal_sample),
    }
}
