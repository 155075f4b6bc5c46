//! Strategy threshold configuration.
//!
//! All eight knobs are mandatory: a missing field is a deserialization
//! error, not a silent default. Units differ per field and the score
//! formulas consume them as-is, so each field documents its own scale.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation failures for threshold values.
#[derive(Debug, Error, PartialEq)]
pub enum ThresholdError {
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field} must be within {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
}

/// The eight tuning knobs of the exhaustion strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// RSI level treated as overbought (0-100 scale).
    pub rsi_threshold: f64,
    /// Minimum EMA5-above-close stretch, in percent.
    pub ema_distance_pct: f64,
    /// Volume spike as a multiple of the 20-bar volume average.
    pub volume_spike_ratio: f64,
    /// Minimum upper-wick fraction of bar range, in [0, 1].
    pub wick_ratio_min: f64,
    /// Minimum close-above-VWAP deviation, as a fraction (0.05 = 5%).
    pub vwap_deviation: f64,
    /// Maximum distance to the nearest liquidation cluster, in percent.
    pub liquidation_proximity_pct: f64,
    /// BTC 1h ATR/price ratio at which the volatility breaker trips.
    pub btc_atr_threshold: f64,
    /// Daily drawdown fraction that latches the drawdown breaker.
    pub max_daily_drawdown: f64,
}

impl ThresholdConfig {
    /// Production defaults.
    pub fn baseline() -> Self {
        Self {
            rsi_threshold: 70.0,
            ema_distance_pct: 4.8,
            volume_spike_ratio: 3.7,
            wick_ratio_min: 0.6,
            vwap_deviation: 0.05,
            liquidation_proximity_pct: 1.5,
            btc_atr_threshold: 0.02,
            max_daily_drawdown: 0.015,
        }
    }

    /// Range-check every field. Call once at startup; the scoring path
    /// assumes validated values.
    pub fn validate(&self) -> Result<(), ThresholdError> {
        in_range("rsi_threshold", self.rsi_threshold, 0.0, 100.0)?;
        in_range("ema_distance_pct", self.ema_distance_pct, 0.0, 100.0)?;
        in_range("volume_spike_ratio", self.volume_spike_ratio, 0.0, 1000.0)?;
        in_range("wick_ratio_min", self.wick_ratio_min, 0.0, 1.0)?;
        in_range("vwap_deviation", self.vwap_deviation, 0.0, 1.0)?;
        in_range(
            "liquidation_proximity_pct",
            self.liquidation_proximity_pct,
            0.0,
            100.0,
        )?;
        in_range("btc_atr_threshold", self.btc_atr_threshold, 0.0, 1.0)?;
        in_range("max_daily_drawdown", self.max_daily_drawdown, 0.0, 1.0)?;
        Ok(())
    }
}

fn in_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ThresholdError> {
    if !value.is_finite() {
        return Err(ThresholdError::NotFinite { field, value });
    }
    if value < min || value > max {
        return Err(ThresholdError::OutOfRange {
            field,
            min,
            max,
            value,
        });
    }
    Ok(())
}
