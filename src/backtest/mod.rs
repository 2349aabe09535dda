//! Backtesting module
//!
//! Turns closed up/down markets into per-timestamp betting opportunities and
//! slices them along independent strategy dimensions:
//! - entry price thresholds
//! - fixed-width price buckets
//! - minutes to close
//! - momentum (favored-side) deviation
//! plus a joint time/deviation search for the single best entry bucket.

mod extract;
mod optimal;
mod report;
mod runner;
mod slices;

pub use extract::extract_bets;
pub use optimal::{find_optimal_entry, OptimalEntry};
pub use report::BacktestReport;
pub use runner::BacktestRunner;
pub use slices::{
    momentum_slice, price_bucket_slice, threshold_slice, time_slice, StrategyBucketStats,
    TimeBucketStats,
};

use crate::market::OutcomeSide;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Extraction failures; both are expected per-market conditions the caller
/// skips past, never run-level faults
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// Price history came back empty (thin market or API gap)
    #[error("no price history")]
    NoPriceData,
    /// Final price sits exactly on the decision boundary
    #[error("final price exactly 0.5, winner undetermined")]
    UndeterminedWinner,
}

/// One betting opportunity: a single outcome at a single observed timestamp.
///
/// Created once during extraction, immutable afterwards. Exactly two records
/// exist per observed timestamp per market, one per outcome; their entry
/// prices need not sum to 1 since the two sides trade on independent books.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BetRecord {
    /// Source market identifier
    pub market_id: String,
    /// Outcome this bet is placed on
    pub outcome: OutcomeSide,
    /// Outcome price at the observed timestamp
    pub entry_price: Decimal,
    /// Whether this outcome ended up winning the market
    pub won: bool,
    /// `1 - entry_price` if won, `-entry_price` otherwise
    pub profit: Decimal,
    /// Minutes from this timestamp to the market's last observed timestamp
    pub minutes_to_close: Decimal,
    /// `|entry_price - 0.5|`
    pub price_deviation: Decimal,
    /// The market's winning outcome
    pub winner: OutcomeSide,
}
