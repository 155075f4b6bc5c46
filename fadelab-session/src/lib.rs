//! Fadelab Session — Jakarta-session orchestration for the exhaustion fade.
//!
//! This crate builds on `fadelab-core` to run one paper-trading day:
//! - Market data seam with a deterministic synthetic provider
//! - TOML session config with content-addressed ids
//! - Ticker-tape scanner with meme-symbol prioritization
//! - Parallel golden-hour evaluation and paper entry booking
//! - Time-windowed session driver with daily risk reset
//! - Day report artifacts (JSON, CSV, Markdown)

pub mod config;
pub mod evaluate;
pub mod provider;
pub mod report;
pub mod runner;
pub mod scanner;

pub use config::{AccountConfig, ConfigError, EntryConfig, ScannerConfig, SessionConfig};
pub use evaluate::{evaluate_candidates, evaluate_symbol, Decision, SkipReason};
pub use provider::{DataError, DataResult, MarketData, StaticProvider, TickerStats, Timeframe};
pub use report::{
    export_json, export_trades_csv, generate_summary, import_json, load_day_report,
    save_day_report, DayReport, SCHEMA_VERSION,
};
pub use runner::{poll_delay, SessionError, SessionRunner, StepOutcome};
pub use scanner::{select_candidates, Candidate};
