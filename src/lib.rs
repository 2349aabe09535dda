//! poly-updown: Backtesting and live momentum scanning for Polymarket
//! "Bitcoin Up or Down" 15-minute markets
//!
//! This library provides the core components for:
//! - Market title classification (15-minute window detection)
//! - Market discovery via the Gamma API
//! - Price history and order books via the CLOB API
//! - Opportunity extraction from closed-market price paths
//! - Strategy slicing: threshold, price bucket, timing, momentum
//! - Joint optimal-entry search
//! - Live signal scanning with position-state guarding
//! - Dry-run and live execution engines
//! - Full observability stack

pub mod backtest;
pub mod classify;
pub mod cli;
pub mod config;
pub mod execution;
pub mod market;
pub mod scanner;
pub mod telemetry;
