//! CLI interface for poly-updown
//!
//! Provides subcommands for:
//! - `backtest`: Analyze closed markets and print strategy tables
//! - `run`: Start the live signal scanner (dry-run by default)
//! - `config`: Show effective configuration

mod backtest;
mod run;

pub use backtest::BacktestArgs;
pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "poly-updown")]
#[command(about = "Backtesting and live momentum scanner for Polymarket Bitcoin up/down markets")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Backtest betting strategies on closed markets
    Backtest(BacktestArgs),
    /// Start the live signal scanner
    Run(RunArgs),
    /// Show effective configuration
    Config,
}
