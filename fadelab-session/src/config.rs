//! Session configuration.
//!
//! One TOML file drives a full day: account sizing, scanner bands, entry
//! rules, and the indicator thresholds handed down to `fadelab-core`.
//! Every config resolves to a content-addressed id so day reports can be
//! traced back to the exact parameters that produced them.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use fadelab_core::analytics::MAX_SCORE;
use fadelab_core::config::{ThresholdConfig, ThresholdError};
use fadelab_core::domain::Symbol;
use fadelab_core::indicators::MIN_BARS;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid thresholds: {0}")]
    Thresholds(#[from] ThresholdError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Paper account parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountConfig {
    pub balance: f64,
    pub risk_per_trade: f64,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            balance: 10_000.0,
            risk_per_trade: 100.0,
        }
    }
}

/// Candidate selection bands. Both bands are exclusive on both ends:
/// a coin pumping harder than `max_change` is already exhausted or
/// about to be squeezed, and one below `min_change` is not stretched
/// enough to fade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerConfig {
    pub min_quote_volume: f64,
    pub max_quote_volume: f64,
    pub min_change: f64,
    pub max_change: f64,
    /// Symbols pulled to the front of the candidate list when present
    pub priority: Vec<Symbol>,
    pub limit: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            min_quote_volume: 20_000_000.0,
            max_quote_volume: 35_000_000.0,
            min_change: 0.20,
            max_change: 0.35,
            priority: vec!["PEPEUSDT".into(), "WIFUSDT".into(), "BONKUSDT".into()],
            limit: 5,
        }
    }
}

/// Entry rules for the golden hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryConfig {
    /// Minimum exhaustion score before an entry is considered
    pub score_min: f64,
    /// Limit price as a fraction of the nearest liquidation cluster
    pub discount: f64,
    /// 15m candles fetched per evaluated symbol
    pub candle_history: usize,
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            score_min: 7.0,
            discount: 0.997,
            candle_history: 100,
        }
    }
}

/// Complete session parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub account: AccountConfig,
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub entry: EntryConfig,
    /// No serde default: a config file must spell out all eight knobs
    pub thresholds: ThresholdConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            account: AccountConfig::default(),
            scanner: ScannerConfig::default(),
            entry: EntryConfig::default(),
            thresholds: ThresholdConfig::baseline(),
        }
    }
}

impl SessionConfig {
    /// Loads and validates a TOML session config.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()?;
        if self.account.balance <= 0.0 || !self.account.balance.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "account balance must be positive, got {}",
                self.account.balance
            )));
        }
        if self.account.risk_per_trade <= 0.0 || !self.account.risk_per_trade.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "risk per trade must be positive, got {}",
                self.account.risk_per_trade
            )));
        }
        if self.scanner.min_quote_volume >= self.scanner.max_quote_volume {
            return Err(ConfigError::Invalid(format!(
                "scanner volume band is empty: ({}, {})",
                self.scanner.min_quote_volume, self.scanner.max_quote_volume
            )));
        }
        if self.scanner.min_change >= self.scanner.max_change {
            return Err(ConfigError::Invalid(format!(
                "scanner change band is empty: ({}, {})",
                self.scanner.min_change, self.scanner.max_change
            )));
        }
        if self.scanner.limit == 0 {
            return Err(ConfigError::Invalid(
                "scanner limit must be at least 1".to_string(),
            ));
        }
        if !(0.0..=MAX_SCORE).contains(&self.entry.score_min) {
            return Err(ConfigError::Invalid(format!(
                "entry score_min must lie in [0, {MAX_SCORE}], got {}",
                self.entry.score_min
            )));
        }
        if !(self.entry.discount > 0.9 && self.entry.discount <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "entry discount must lie in (0.9, 1.0], got {}",
                self.entry.discount
            )));
        }
        if self.entry.candle_history < MIN_BARS {
            return Err(ConfigError::Invalid(format!(
                "candle_history must be at least {MIN_BARS}, got {}",
                self.entry.candle_history
            )));
        }
        Ok(())
    }

    /// Content-addressed id: hash of the canonical JSON form.
    pub fn config_id(&self) -> String {
        let bytes = serde_json::to_vec(self).expect("SessionConfig serialization failed");
        blake3::hash(&bytes).to_hex().to_string()
    }
}
