//! Configuration types for poly-updown

use rust_decimal::Decimal;
use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub backtest: BacktestConfig,
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Market discovery configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    /// Title phrase identifying the target market family
    #[serde(default = "default_family_phrase")]
    pub family_phrase: String,

    /// Seconds between open-market list refreshes
    #[serde(default = "default_refresh_secs")]
    pub refresh_interval_secs: u64,
}

fn default_family_phrase() -> String {
    "bitcoin up or down".to_string()
}
fn default_refresh_secs() -> u64 {
    60
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            family_phrase: default_family_phrase(),
            refresh_interval_secs: 60,
        }
    }
}

/// Backtest configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BacktestConfig {
    /// Number of closed markets to analyze
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Only include markets closed at least this many minutes ago
    #[serde(default = "default_min_close")]
    pub min_minutes_since_close: i64,

    /// Price history sampling fidelity in minutes
    #[serde(default = "default_fidelity")]
    pub fidelity_minutes: u32,

    /// Minutes of history to fetch before each market close
    #[serde(default = "default_lookback")]
    pub lookback_minutes: i64,

    /// Entry price thresholds, strictly ascending
    #[serde(default = "default_thresholds")]
    pub thresholds: Vec<Decimal>,

    /// Price bucket width
    #[serde(default = "default_bucket_width")]
    pub bucket_width: Decimal,

    /// Lower bound of the bucketed price range
    #[serde(default = "default_bucket_min")]
    pub bucket_min: Decimal,

    /// Upper bound (exclusive) of the bucketed price range
    #[serde(default = "default_bucket_max")]
    pub bucket_max: Decimal,

    /// Momentum deviation thresholds, strictly ascending
    #[serde(default = "default_deviations")]
    pub deviation_thresholds: Vec<Decimal>,

    /// Minimum records for an optimal-entry bucket to qualify
    #[serde(default = "default_min_sample")]
    pub min_optimal_sample: usize,
}

fn default_limit() -> usize {
    50
}
fn default_min_close() -> i64 {
    5
}
fn default_fidelity() -> u32 {
    5
}
fn default_lookback() -> i64 {
    60
}
fn default_thresholds() -> Vec<Decimal> {
    vec![
        Decimal::new(500, 3),
        Decimal::new(505, 3),
        Decimal::new(510, 3),
        Decimal::new(520, 3),
        Decimal::new(550, 3),
        Decimal::new(600, 3),
        Decimal::new(650, 3),
        Decimal::new(700, 3),
        Decimal::new(750, 3),
        Decimal::new(800, 3),
    ]
}
fn default_bucket_width() -> Decimal {
    Decimal::new(5, 3) // 0.005
}
fn default_bucket_min() -> Decimal {
    Decimal::new(50, 2) // 0.50
}
fn default_bucket_max() -> Decimal {
    Decimal::new(95, 2) // 0.95
}
fn default_deviations() -> Vec<Decimal> {
    vec![
        Decimal::ZERO,
        Decimal::new(5, 3),
        Decimal::new(10, 3),
        Decimal::new(20, 3),
        Decimal::new(50, 3),
        Decimal::new(100, 3),
        Decimal::new(150, 3),
        Decimal::new(200, 3),
    ]
}
fn default_min_sample() -> usize {
    10
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            min_minutes_since_close: default_min_close(),
            fidelity_minutes: default_fidelity(),
            lookback_minutes: default_lookback(),
            thresholds: default_thresholds(),
            bucket_width: default_bucket_width(),
            bucket_min: default_bucket_min(),
            bucket_max: default_bucket_max(),
            deviation_thresholds: default_deviations(),
            min_optimal_sample: default_min_sample(),
        }
    }
}

/// Live scanner configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScannerConfig {
    /// Lower bound of the entry price band (inclusive)
    #[serde(default = "default_min_prob")]
    pub min_prob: Decimal,

    /// Upper bound of the entry price band (inclusive)
    #[serde(default = "default_max_prob")]
    pub max_prob: Decimal,

    /// Skip markets with less than this many minutes to close
    #[serde(default = "default_min_minutes")]
    pub min_minutes_to_close: i64,

    /// Skip markets with more than this many minutes to close
    #[serde(default = "default_max_minutes")]
    pub max_minutes_to_close: i64,

    /// A window opens this many minutes before its close
    #[serde(default = "default_window_offset")]
    pub window_open_offset_minutes: i64,

    /// Seconds between order book polls
    #[serde(default = "default_poll_secs")]
    pub poll_interval_secs: u64,

    /// Open-market search page size
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Maximum search pages per refresh
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Seconds to sleep after a loop-level error
    #[serde(default = "default_error_backoff")]
    pub error_backoff_secs: u64,
}

fn default_min_prob() -> Decimal {
    Decimal::new(52, 2) // 0.52
}
fn default_max_prob() -> Decimal {
    Decimal::new(60, 2) // 0.60
}
fn default_min_minutes() -> i64 {
    2
}
fn default_max_minutes() -> i64 {
    120
}
fn default_window_offset() -> i64 {
    20
}
fn default_poll_secs() -> u64 {
    3
}
fn default_page_size() -> usize {
    100
}
fn default_max_pages() -> usize {
    10
}
fn default_error_backoff() -> u64 {
    5
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            min_prob: default_min_prob(),
            max_prob: default_max_prob(),
            min_minutes_to_close: default_min_minutes(),
            max_minutes_to_close: default_max_minutes(),
            window_open_offset_minutes: default_window_offset(),
            poll_interval_secs: default_poll_secs(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            error_backoff_secs: default_error_backoff(),
        }
    }
}

/// Execution engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionConfig {
    #[serde(default)]
    pub mode: ExecutionMode,

    /// Amount to spend per trade in USDC
    #[serde(default = "default_amount")]
    pub amount: Decimal,

    /// Minimum viable trade size in shares
    #[serde(default = "default_min_trade_size")]
    pub min_trade_size: Decimal,
}

fn default_amount() -> Decimal {
    Decimal::new(5, 0)
}
fn default_min_trade_size() -> Decimal {
    Decimal::new(1, 1) // 0.1
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::DryRun,
            amount: default_amount(),
            min_trade_size: default_min_trade_size(),
        }
    }
}

/// Execution mode: simulated or live trading
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    DryRun,
    Live,
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_metrics_port() -> u16 {
    9090
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            metrics_port: default_metrics_port(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Validate configuration at startup
    ///
    /// A malformed configuration is the only fatal startup error; everything
    /// downstream is contained per market or per bucket.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !strictly_ascending(&self.backtest.thresholds) {
            anyhow::bail!("backtest.thresholds must be non-empty and strictly ascending");
        }
        if !strictly_ascending(&self.backtest.deviation_thresholds) {
            anyhow::bail!("backtest.deviation_thresholds must be non-empty and strictly ascending");
        }
        if self.backtest.bucket_width <= Decimal::ZERO {
            anyhow::bail!("backtest.bucket_width must be positive");
        }
        if self.backtest.bucket_min >= self.backtest.bucket_max {
            anyhow::bail!("backtest.bucket_min must be below bucket_max");
        }
        if self.scanner.min_prob > self.scanner.max_prob {
            anyhow::bail!("scanner.min_prob must not exceed max_prob");
        }
        if self.scanner.poll_interval_secs == 0 || self.market.refresh_interval_secs == 0 {
            anyhow::bail!("poll and refresh intervals must be non-zero");
        }
        Ok(())
    }
}

fn strictly_ascending(values: &[Decimal]) -> bool {
    !values.is_empty() && values.windows(2).all(|w| w[0] < w[1])
}
