//! Run command implementation

use crate::config::{Config, ExecutionMode};
use crate::execution::{DryRunEngine, ExecutionEngine, LiveEngine};
use crate::market::{ClobClient, GammaClient, GammaConfig};
use crate::scanner::SignalScanner;
use clap::Args;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Amount to bet per trade in USDC
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// ENABLE REAL TRADING. Without this flag the scanner runs dry
    #[arg(long)]
    pub live: bool,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut execution_config = config.execution.clone();
        if let Some(amount) = self.amount {
            execution_config.amount = amount;
        }
        if self.live {
            execution_config.mode = ExecutionMode::Live;
        }

        let gamma = Arc::new(GammaClient::with_config(GammaConfig {
            family_phrase: config.market.family_phrase.clone(),
            ..GammaConfig::default()
        }));
        let clob = Arc::new(ClobClient::new());

        let execution: Arc<dyn ExecutionEngine> = match execution_config.mode {
            ExecutionMode::DryRun => Arc::new(DryRunEngine::new()),
            ExecutionMode::Live => {
                tracing::warn!("LIVE TRADING enabled, real money will be used");
                Arc::new(LiveEngine::new(clob.clone()))
            }
        };

        let mut scanner = SignalScanner::new(
            gamma,
            clob,
            execution,
            config.market.clone(),
            config.scanner.clone(),
            execution_config,
        );

        let (stop_tx, stop_rx) = watch::channel(false);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupt received, stopping after this iteration");
            }
            let _ = stop_tx.send(true);
        });

        scanner.run(stop_rx).await
    }
}
