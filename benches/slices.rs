//! Benchmarks for the strategy slicing reducers

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use poly_updown::backtest::{
    find_optimal_entry, momentum_slice, price_bucket_slice, threshold_slice, BetRecord,
};
use poly_updown::market::OutcomeSide;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Synthetic record set: 50 markets x 12 timestamps x 2 outcomes
fn sample_records() -> Vec<BetRecord> {
    let mut records = Vec::new();

    for market in 0..50 {
        let winner = if market % 2 == 0 {
            OutcomeSide::Up
        } else {
            OutcomeSide::Down
        };

        for minute in 0..12 {
            // Spread entries across [0.38, 0.62] deterministically
            let offset = Decimal::new(((market * 7 + minute * 3) % 25) as i64 - 12, 2);
            let up_price = dec!(0.50) + offset;
            let down_price = Decimal::ONE - up_price;

            for (outcome, entry_price) in
                [(OutcomeSide::Up, up_price), (OutcomeSide::Down, down_price)]
            {
                let won = outcome == winner;
                records.push(BetRecord {
                    market_id: format!("m{}", market),
                    outcome,
                    entry_price,
                    won,
                    profit: if won {
                        Decimal::ONE - entry_price
                    } else {
                        -entry_price
                    },
                    minutes_to_close: Decimal::from(minute),
                    price_deviation: (entry_price - dec!(0.5)).abs(),
                    winner,
                });
            }
        }
    }

    records
}

fn benchmark_threshold_slice(c: &mut Criterion) {
    let records = sample_records();
    let thresholds = [
        dec!(0.50),
        dec!(0.52),
        dec!(0.55),
        dec!(0.60),
        dec!(0.70),
        dec!(0.80),
    ];

    c.bench_function("threshold_slice", |b| {
        b.iter(|| threshold_slice(black_box(&records), black_box(&thresholds)))
    });
}

fn benchmark_price_bucket_slice(c: &mut Criterion) {
    let records = sample_records();

    c.bench_function("price_bucket_slice", |b| {
        b.iter(|| {
            price_bucket_slice(
                black_box(&records),
                dec!(0.005),
                dec!(0.50),
                dec!(0.95),
            )
        })
    });
}

fn benchmark_momentum_slice(c: &mut Criterion) {
    let records = sample_records();
    let deviations = [
        Decimal::ZERO,
        dec!(0.005),
        dec!(0.01),
        dec!(0.02),
        dec!(0.05),
        dec!(0.10),
    ];

    c.bench_function("momentum_slice", |b| {
        b.iter(|| momentum_slice(black_box(&records), black_box(&deviations)))
    });
}

fn benchmark_optimal_entry(c: &mut Criterion) {
    let records = sample_records();

    c.bench_function("find_optimal_entry", |b| {
        b.iter(|| find_optimal_entry(black_box(&records), black_box(10)))
    });
}

criterion_group!(
    benches,
    benchmark_threshold_slice,
    benchmark_price_bucket_slice,
    benchmark_momentum_slice,
    benchmark_optimal_entry
);
criterion_main!(benches);
