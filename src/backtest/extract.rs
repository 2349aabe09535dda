//! Opportunity extraction
//!
//! Reconstructs per-timestamp betting opportunities from a closed market's
//! two outcome price series.

use super::{BetRecord, ExtractError};
use crate::market::{Market, OutcomeSide, PricePoint};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const SECONDS_PER_MINUTE: Decimal = dec!(60);

/// Extract bet records from a market's up/down price histories.
///
/// The winner is read off the final observed up price: above 0.5 is Up,
/// below is Down, and exactly 0.5 discards the whole market rather than
/// guessing. Every up-series index yields two records, one per outcome.
///
/// The down series frequently lags or misaligns (asynchronous sampling), so
/// a missing down point at index `i` is synthesized as `1 - up_price`
/// instead of dropping the timestamp.
///
/// Time-to-close anchors on the last *observed* up-series timestamp, not the
/// nominal close time; observed data may lag or lead the nominal close and
/// the time slicing must stay self-consistent.
pub fn extract_bets(
    market: &Market,
    up_history: &[PricePoint],
    down_history: &[PricePoint],
) -> Result<Vec<BetRecord>, ExtractError> {
    let last = up_history.last().ok_or(ExtractError::NoPriceData)?;

    let winner = match last.price.cmp(&dec!(0.5)) {
        std::cmp::Ordering::Greater => OutcomeSide::Up,
        std::cmp::Ordering::Less => OutcomeSide::Down,
        std::cmp::Ordering::Equal => return Err(ExtractError::UndeterminedWinner),
    };

    let mut bets = Vec::with_capacity(up_history.len() * 2);

    for (i, point) in up_history.iter().enumerate() {
        let up_price = point.price;
        let down_price = down_history
            .get(i)
            .map(|p| p.price)
            .unwrap_or(Decimal::ONE - up_price);

        let minutes_to_close =
            Decimal::from(last.timestamp - point.timestamp) / SECONDS_PER_MINUTE;

        bets.push(bet_record(
            market,
            OutcomeSide::Up,
            up_price,
            winner,
            minutes_to_close,
        ));
        bets.push(bet_record(
            market,
            OutcomeSide::Down,
            down_price,
            winner,
            minutes_to_close,
        ));
    }

    Ok(bets)
}

fn bet_record(
    market: &Market,
    outcome: OutcomeSide,
    entry_price: Decimal,
    winner: OutcomeSide,
    minutes_to_close: Decimal,
) -> BetRecord {
    let won = outcome == winner;
    // Each side's profit uses its own entry price; the two books are priced
    // independently
    let profit = if won {
        Decimal::ONE - entry_price
    } else {
        -entry_price
    };

    BetRecord {
        market_id: market.id.clone(),
        outcome,
        entry_price,
        won,
        profit,
        minutes_to_close,
        price_deviation: (entry_price - dec!(0.5)).abs(),
        winner,
    }
}
