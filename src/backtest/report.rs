//! Backtest reporting
//!
//! Fixed-width console tables for the four strategy slices and the optimal
//! entry search.

use super::{OptimalEntry, StrategyBucketStats, TimeBucketStats};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Complete backtest results
#[derive(Debug, Clone, Default)]
pub struct BacktestReport {
    /// Markets that contributed records
    pub markets_analyzed: usize,
    /// Markets skipped (no data, undetermined winner, fetch failure)
    pub markets_skipped: usize,
    /// Total betting opportunities collected
    pub total_bets: usize,
    /// Threshold slice keyed by threshold
    pub thresholds: BTreeMap<Decimal, StrategyBucketStats>,
    /// Price-bucket slice keyed by bucket lower bound
    pub buckets: BTreeMap<Decimal, StrategyBucketStats>,
    /// Time slice keyed by exact minutes to close
    pub timing: BTreeMap<Decimal, TimeBucketStats>,
    /// Momentum slice keyed by deviation threshold
    pub momentum: BTreeMap<Decimal, StrategyBucketStats>,
    /// Best joint time/deviation bucket, when one clears the sample gate
    pub optimal: Option<OptimalEntry>,
}

const PCT: Decimal = dec!(100);

impl BacktestReport {
    /// Format all tables for CLI output
    pub fn format_full(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "\nMarkets analyzed: {} (skipped: {})",
            self.markets_analyzed, self.markets_skipped
        );
        let _ = writeln!(out, "Total betting opportunities: {}", self.total_bets);
        out.push_str(&self.format_threshold_table());
        out.push_str(&self.format_bucket_table());
        out.push_str(&self.format_timing_table());
        out.push_str(&self.format_momentum_table());
        out.push_str(&self.format_optimal());
        out
    }

    /// Threshold strategy table
    pub fn format_threshold_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\n{}", "=".repeat(85));
        let _ = writeln!(out, "BACKTEST: Threshold Strategy (bet when price >= X)");
        let _ = writeln!(out, "{}", "=".repeat(85));
        let _ = writeln!(
            out,
            "{:>10} {:>8} {:>6} {:>7} {:>8} {:>10} {:>11}",
            "Threshold", "Bets", "Wins", "Win%", "Edge", "Avg EV", "Total P/L"
        );
        let _ = writeln!(out, "{}", "-".repeat(85));

        for (threshold, stats) in &self.thresholds {
            if stats.bet_count == 0 {
                let _ = writeln!(out, "{:>9.1}% {:>8}", threshold * PCT, "N/A");
            } else {
                let _ = writeln!(
                    out,
                    "{:>9.1}% {:>8} {:>6} {:>6.1}% {:>+7.1}% {:>+10.4} {:>+11.2}",
                    threshold * PCT,
                    stats.bet_count,
                    stats.win_count,
                    stats.win_rate * PCT,
                    stats.edge * PCT,
                    stats.avg_ev,
                    stats.total_profit,
                );
            }
        }
        out
    }

    /// Price bucket analysis table
    pub fn format_bucket_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\n{}", "=".repeat(85));
        let _ = writeln!(out, "BACKTEST: Price Bucket Analysis");
        let _ = writeln!(out, "{}", "=".repeat(85));
        let _ = writeln!(
            out,
            "{:>12} {:>8} {:>6} {:>7} {:>9} {:>8} {:>10}",
            "Price", "Bets", "Wins", "Win%", "Required", "Edge", "Avg EV"
        );
        let _ = writeln!(out, "{}", "-".repeat(85));

        for (lower, stats) in &self.buckets {
            let _ = writeln!(
                out,
                "{:>11.1}% {:>8} {:>6} {:>6.1}% {:>8.1}% {:>+7.1}% {:>+10.4}",
                lower * PCT,
                stats.bet_count,
                stats.win_count,
                stats.win_rate * PCT,
                stats.avg_entry_price * PCT,
                stats.edge * PCT,
                stats.avg_ev,
            );
        }
        out
    }

    /// Entry timing table, furthest from close first
    pub fn format_timing_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\n{}", "=".repeat(85));
        let _ = writeln!(out, "BACKTEST: Entry Timing Analysis (by minutes to close)");
        let _ = writeln!(out, "{}", "=".repeat(85));
        let _ = writeln!(
            out,
            "{:>13} {:>8} {:>7} {:>9} {:>10} {:>11}",
            "Mins to Close", "Bets", "Win%", "Avg Dev", "Avg EV", "Total P/L"
        );
        let _ = writeln!(out, "{}", "-".repeat(85));

        for (mins, bucket) in self.timing.iter().rev() {
            let _ = writeln!(
                out,
                "{:>10.1} min {:>8} {:>6.1}% {:>8.2}% {:>+10.4} {:>+11.2}",
                mins,
                bucket.stats.bet_count,
                bucket.stats.win_rate * PCT,
                bucket.avg_deviation * PCT,
                bucket.stats.avg_ev,
                bucket.stats.total_profit,
            );
        }
        out
    }

    /// Momentum strategy table
    pub fn format_momentum_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\n{}", "=".repeat(85));
        let _ = writeln!(
            out,
            "BACKTEST: Momentum Strategy (bet favored side when price > 50% + threshold)"
        );
        let _ = writeln!(out, "{}", "=".repeat(85));
        let _ = writeln!(
            out,
            "{:>13} {:>8} {:>6} {:>7} {:>8} {:>10} {:>11}",
            "Min Deviation", "Bets", "Wins", "Win%", "Edge", "Avg EV", "Total P/L"
        );
        let _ = writeln!(out, "{}", "-".repeat(85));

        for (threshold, stats) in &self.momentum {
            if stats.bet_count == 0 {
                let _ = writeln!(out, ">{:>11.1}% {:>8}", threshold * PCT, "N/A");
            } else {
                let _ = writeln!(
                    out,
                    ">{:>11.1}% {:>8} {:>6} {:>6.1}% {:>+7.1}% {:>+10.4} {:>+11.2}",
                    threshold * PCT,
                    stats.bet_count,
                    stats.win_count,
                    stats.win_rate * PCT,
                    stats.edge * PCT,
                    stats.avg_ev,
                    stats.total_profit,
                );
            }
        }
        out
    }

    /// Optimal entry summary
    pub fn format_optimal(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\n{}", "=".repeat(60));
        let _ = writeln!(out, "OPTIMAL ENTRY POINT");
        let _ = writeln!(out, "{}", "=".repeat(60));

        match &self.optimal {
            Some(optimal) => {
                let _ = writeln!(out, "  Minutes before close: {} min", optimal.minutes_range);
                let _ = writeln!(out, "  Price deviation:      >{:.1}%", optimal.deviation_pct);
                let _ = writeln!(out, "  Sample size:          {} bets", optimal.bet_count);
                let _ = writeln!(out, "  Win rate:             {:.1}%", optimal.win_rate * PCT);
                let _ = writeln!(out, "  Average EV:           {:+.4}", optimal.avg_ev);
            }
            None => {
                let _ = writeln!(out, "  ! Not enough data to determine optimal entry");
            }
        }
        let _ = writeln!(out, "{}", "=".repeat(60));
        out
    }
}
