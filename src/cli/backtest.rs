//! Backtest command implementation

use crate::backtest::BacktestRunner;
use crate::classify::PatternMode;
use crate::config::Config;
use crate::market::{ClobClient, GammaClient, GammaConfig};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct BacktestArgs {
    /// Number of markets to analyze (overrides config)
    #[arg(long)]
    pub limit: Option<usize>,

    /// Only include markets closed at least this many minutes ago
    #[arg(long)]
    pub min_close: Option<i64>,

    /// Market filter pattern: "15min" or "any"
    #[arg(long, default_value = "15min")]
    pub pattern: String,
}

impl BacktestArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mode = parse_pattern(&self.pattern)?;

        let mut backtest_config = config.backtest.clone();
        if let Some(limit) = self.limit {
            backtest_config.limit = limit;
        }
        if let Some(min_close) = self.min_close {
            backtest_config.min_minutes_since_close = min_close;
        }

        let gamma = Arc::new(GammaClient::with_config(GammaConfig {
            family_phrase: config.market.family_phrase.clone(),
            ..GammaConfig::default()
        }));
        let clob = Arc::new(ClobClient::new());

        let runner = BacktestRunner::new(gamma, clob, backtest_config);
        let report = runner.run(mode).await?;

        println!("{}", report.format_full());
        Ok(())
    }
}

fn parse_pattern(pattern: &str) -> anyhow::Result<PatternMode> {
    match pattern {
        "15min" => Ok(PatternMode::FifteenMin),
        "any" => Ok(PatternMode::Any),
        other => anyhow::bail!("unknown pattern '{}', expected '15min' or 'any'", other),
    }
}
