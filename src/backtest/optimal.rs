//! Joint optimum search
//!
//! Scans favored-side records across a 2-D (time bucket, deviation bucket)
//! grid and picks the single bucket with the best average EV.

use super::BetRecord;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

/// Minutes covered by one time bucket
const TIME_BUCKET_MINUTES: i64 = 3;

/// The best-performing joint entry bucket
#[derive(Debug, Clone, PartialEq)]
pub struct OptimalEntry {
    /// Time bucket index (bucket N covers minutes `3N ..= 3N+2`)
    pub time_bucket: i64,
    /// Human-readable minutes range, e.g. "3-5"
    pub minutes_range: String,
    /// Deviation bucket in percent, one decimal place
    pub deviation_pct: Decimal,
    pub bet_count: usize,
    pub win_rate: Decimal,
    pub avg_ev: Decimal,
}

/// Find the optimal entry bucket among favored-side records.
///
/// Records on the favored side (own price above 0.5) are keyed by
/// `(minutes_to_close / 3 floored, deviation * 100 rounded to 0.1)`. Keys
/// with fewer than `min_sample` records are gated out; among the rest the
/// highest average EV wins. Ties break to the first-seen key: the scan runs
/// in first-seen order and only a strictly greater EV replaces the current
/// best, so a later equal EV never wins.
///
/// `None` when no key clears the sample gate; callers treat that as a
/// normal outcome.
pub fn find_optimal_entry(records: &[BetRecord], min_sample: usize) -> Option<OptimalEntry> {
    // Insertion-ordered grouping keeps the tie-break independent of map
    // internals
    let mut order: Vec<(i64, Decimal)> = Vec::new();
    let mut groups: HashMap<(i64, Decimal), Vec<&BetRecord>> = HashMap::new();

    for bet in records {
        if bet.entry_price <= dec!(0.5) {
            continue;
        }

        let time_bucket = (bet.minutes_to_close / Decimal::from(TIME_BUCKET_MINUTES))
            .floor()
            .to_i64()?;
        let dev_bucket = (bet.price_deviation * dec!(100)).round_dp(1);

        let key = (time_bucket, dev_bucket);
        groups
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(bet);
    }

    let mut best: Option<OptimalEntry> = None;

    for key in order {
        let bets = &groups[&key];
        if bets.len() < min_sample {
            continue;
        }

        let count = Decimal::from(bets.len());
        let avg_ev = bets.iter().map(|b| b.profit).sum::<Decimal>() / count;
        let win_rate =
            Decimal::from(bets.iter().filter(|b| b.won).count()) / count;

        if best.as_ref().map_or(true, |b| avg_ev > b.avg_ev) {
            let (time_bucket, deviation_pct) = key;
            best = Some(OptimalEntry {
                time_bucket,
                minutes_range: format!(
                    "{}-{}",
                    time_bucket * TIME_BUCKET_MINUTES,
                    time_bucket * TIME_BUCKET_MINUTES + TIME_BUCKET_MINUTES - 1
                ),
                deviation_pct,
                bet_count: bets.len(),
                win_rate,
                avg_ev,
            });
        }
    }

    best
}
