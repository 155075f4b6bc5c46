//! The exhaustion score: five capped components summed and capped at 10.
//!
//! Each component measures one dimension of overextension on the most
//! recent bar. Components are individually capped so no single input can
//! saturate the score, and the sum is capped at `MAX_SCORE`. The session
//! layer compares the total against its entry threshold (7.0 by default).

use crate::config::ThresholdConfig;
use crate::domain::IndicatorSeries;
use serde::{Deserialize, Serialize};

/// Ceiling for the summed score.
pub const MAX_SCORE: f64 = 10.0;

/// Defined rows required before the score is meaningful. Below this the
/// breakdown is all zeros.
pub const SCORING_MIN_ROWS: usize = 20;

const RSI_WEIGHT: f64 = 0.3;
const RSI_CAP: f64 = 3.0;
const WICK_WEIGHT: f64 = 25.0;
const WICK_CAP: f64 = 2.5;
const VOLUME_WEIGHT: f64 = 5.0;
const VOLUME_CAP: f64 = 2.0;
const EMA_WEIGHT: f64 = 3.125;
const EMA_CAP: f64 = 1.5;
const LIQUIDATION_WEIGHT: f64 = 66.67;
const LIQUIDATION_CAP: f64 = 1.0;

/// Per-component score contributions. `total()` is what gets compared
/// against the entry threshold; the parts are kept for logs and reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub rsi: f64,
    pub wick: f64,
    pub volume: f64,
    pub ema: f64,
    pub liquidation: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        (self.rsi + self.wick + self.volume + self.ema + self.liquidation).min(MAX_SCORE)
    }
}

/// Score the most recent bar of an indicator series.
///
/// `liquidation_price` is the nearest heatmap cluster, if the feed had
/// one; without it the liquidation component is zero. A series shorter
/// than `SCORING_MIN_ROWS` scores zero everywhere.
pub fn exhaustion_score(
    series: &IndicatorSeries,
    thresholds: &ThresholdConfig,
    liquidation_price: Option<f64>,
) -> ScoreBreakdown {
    if series.len() < SCORING_MIN_ROWS {
        return ScoreBreakdown::default();
    }
    // Non-empty by the length check above
    let Some((bar, row)) = series.last() else {
        return ScoreBreakdown::default();
    };

    let mut breakdown = ScoreBreakdown::default();

    // RSI stretch above the overbought threshold
    if row.rsi14 > thresholds.rsi_threshold {
        breakdown.rsi = ((row.rsi14 - thresholds.rsi_threshold) * RSI_WEIGHT).min(RSI_CAP);
    }

    // Upper wick, unconditional: even a modest wick contributes
    breakdown.wick = (row.wick_ratio * WICK_WEIGHT).min(WICK_CAP);

    // Volume spike above the ratio threshold
    let volume_ratio = bar.volume / row.volume_sma20;
    if volume_ratio > thresholds.volume_spike_ratio {
        breakdown.volume =
            ((volume_ratio - thresholds.volume_spike_ratio) * VOLUME_WEIGHT).min(VOLUME_CAP);
    }

    // Distance below the fast EMA, in percent of close
    let ema_distance_pct = (row.ema5 - bar.close) / bar.close * 100.0;
    if ema_distance_pct > thresholds.ema_distance_pct {
        breakdown.ema =
            ((ema_distance_pct - thresholds.ema_distance_pct) * EMA_WEIGHT).min(EMA_CAP);
    }

    // Proximity to the nearest liquidation cluster, in percent of close
    if let Some(liq_price) = liquidation_price {
        let proximity = thresholds.liquidation_proximity_pct;
        let distance_pct = (liq_price - bar.close).abs() / bar.close * 100.0;
        breakdown.liquidation =
            ((proximity - distance_pct.min(proximity)) * LIQUIDATION_WEIGHT).min(LIQUIDATION_CAP);
    }

    breakdown
}
