//! Strategy slicings
//!
//! Four independent, pure reducers over one shared bet-record set. All of
//! them re-derive everything from the records alone.

use super::BetRecord;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

/// Aggregate statistics for one strategy bucket.
///
/// An empty selection is a valid state: `bet_count = 0` with every ratio at
/// zero by convention, distinguishable from real data only via `bet_count`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyBucketStats {
    pub bet_count: usize,
    pub win_count: usize,
    pub win_rate: Decimal,
    pub total_profit: Decimal,
    pub avg_entry_price: Decimal,
    pub avg_ev: Decimal,
    /// Win rate minus average entry price; meaningful when the strategy bets
    /// the side whose price is its own implied win probability
    pub edge: Decimal,
}

impl StrategyBucketStats {
    /// Reduce a selection of records to bucket statistics
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a BetRecord>,
    {
        let mut bet_count = 0usize;
        let mut win_count = 0usize;
        let mut total_profit = Decimal::ZERO;
        let mut entry_sum = Decimal::ZERO;

        for bet in records {
            bet_count += 1;
            if bet.won {
                win_count += 1;
            }
            total_profit += bet.profit;
            entry_sum += bet.entry_price;
        }

        if bet_count == 0 {
            return Self::default();
        }

        let count = Decimal::from(bet_count);
        let win_rate = Decimal::from(win_count) / count;
        let avg_entry_price = entry_sum / count;

        Self {
            bet_count,
            win_count,
            win_rate,
            total_profit,
            avg_entry_price,
            avg_ev: total_profit / count,
            edge: win_rate - avg_entry_price,
        }
    }
}

/// Time bucket statistics; the timing report also tracks how far prices had
/// drifted from even money at each entry distance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeBucketStats {
    pub stats: StrategyBucketStats,
    pub avg_deviation: Decimal,
}

/// Threshold slice: bet whenever `entry_price >= t`.
///
/// Thresholds with no matching records stay in the result with zeroed stats.
/// Over an ascending threshold list the eligible sets are nested, so
/// `bet_count` never grows with the threshold.
pub fn threshold_slice(
    records: &[BetRecord],
    thresholds: &[Decimal],
) -> BTreeMap<Decimal, StrategyBucketStats> {
    thresholds
        .iter()
        .map(|&t| {
            let stats =
                StrategyBucketStats::from_records(records.iter().filter(|b| b.entry_price >= t));
            (t, stats)
        })
        .collect()
}

/// Price-bucket slice: partition `[min_price, max_price)` into half-open
/// `[lo, lo + width)` buckets keyed by lower bound.
///
/// Each in-range record lands in exactly one bucket; records at a boundary
/// fall upward. Empty buckets are omitted, not zero-filled.
pub fn price_bucket_slice(
    records: &[BetRecord],
    width: Decimal,
    min_price: Decimal,
    max_price: Decimal,
) -> BTreeMap<Decimal, StrategyBucketStats> {
    let mut grouped: BTreeMap<Decimal, Vec<&BetRecord>> = BTreeMap::new();

    for bet in records {
        if bet.entry_price < min_price || bet.entry_price >= max_price {
            continue;
        }
        let index = ((bet.entry_price - min_price) / width).floor();
        let lower_bound = min_price + index * width;
        grouped.entry(lower_bound).or_default().push(bet);
    }

    grouped
        .into_iter()
        .map(|(lo, bets)| (lo, StrategyBucketStats::from_records(bets.iter().copied())))
        .collect()
}

/// Time slice: group by the exact observed `minutes_to_close` value.
///
/// No binning happens here; the group count tracks the granularity of the
/// observed series, so fine-grained series produce many sparse groups.
pub fn time_slice(records: &[BetRecord]) -> BTreeMap<Decimal, TimeBucketStats> {
    let mut grouped: BTreeMap<Decimal, Vec<&BetRecord>> = BTreeMap::new();

    for bet in records {
        grouped.entry(bet.minutes_to_close).or_default().push(bet);
    }

    grouped
        .into_iter()
        .map(|(mins, bets)| {
            let stats = StrategyBucketStats::from_records(bets.iter().copied());
            let deviation_sum: Decimal = bets.iter().map(|b| b.price_deviation).sum();
            let avg_deviation = deviation_sum / Decimal::from(bets.len());
            (mins, TimeBucketStats { stats, avg_deviation })
        })
        .collect()
}

/// Momentum slice: at each deviation threshold `d`, keep only bets on the
/// favored side, i.e. the outcome's own price above `0.5 + d`.
///
/// Up and down records mix freely whenever each is independently favored,
/// and a record appears at every threshold it clears (nested inclusion, not
/// a partition). Empty thresholds stay in the result with zeroed stats.
pub fn momentum_slice(
    records: &[BetRecord],
    deviation_thresholds: &[Decimal],
) -> BTreeMap<Decimal, StrategyBucketStats> {
    deviation_thresholds
        .iter()
        .map(|&d| {
            let floor = dec!(0.5) + d;
            let stats = StrategyBucketStats::from_records(
                records.iter().filter(|b| b.entry_price > floor),
            );
            (d, stats)
        })
        .collect()
}
