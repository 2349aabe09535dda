//! Prometheus metrics

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Poll cycles completed by the scanner
const POLL_CYCLES: &str = "updown_poll_cycles_total";
/// Entry signals found
const SIGNALS: &str = "updown_signals_total";
/// Trades acquired (real or simulated)
const TRADES: &str = "updown_trades_total";
/// Markets currently monitored
const MONITORED_MARKETS: &str = "updown_monitored_markets";

/// Install the Prometheus recorder and scrape endpoint.
///
/// Must run inside a tokio runtime. Installing twice (e.g. from tests)
/// reports the error and keeps the first recorder.
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let result = PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install();

    match result {
        Ok(()) => {
            tracing::info!(port, "Prometheus metrics exporter listening");
            Ok(())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Metrics exporter not installed");
            Ok(())
        }
    }
}

/// Count one scanner poll cycle
pub fn record_poll_cycle() {
    counter!(POLL_CYCLES).increment(1);
}

/// Count one entry signal
pub fn record_signal() {
    counter!(SIGNALS).increment(1);
}

/// Count one acquired trade
pub fn record_trade() {
    counter!(TRADES).increment(1);
}

/// Track the size of the monitored market set
pub fn set_monitored_markets(count: usize) {
    gauge!(MONITORED_MARKETS).set(count as f64);
}
