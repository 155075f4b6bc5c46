//! Boolean entry gates.
//!
//! Six independent checks on the most recent bar. All six must pass
//! before the session layer will consider an entry, regardless of how
//! high the score is. Gates and score overlap deliberately: the score
//! ranks candidates, the gates veto marginal ones. The RSI gate is the
//! strictest of the six: it needs the level *and* a bearish divergence
//! print, so a strong but still-confirming trend cannot open it.

use super::divergence::{bearish_rsi_divergence, DIVERGENCE_LOOKBACK};
use super::exhaustion::SCORING_MIN_ROWS;
use crate::config::ThresholdConfig;
use crate::domain::IndicatorSeries;
use serde::{Deserialize, Serialize};

/// One flag per gate. `all_ok()` is the unanimous AND.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSet {
    /// RSI above the overbought threshold with bearish divergence printing.
    pub rsi_ok: bool,
    /// Close stretched below the fast EMA by more than the distance threshold.
    pub ema_ok: bool,
    /// Volume above the spike multiple of its 20-bar average.
    pub vol_ok: bool,
    /// Upper wick above the minimum fraction of bar range.
    pub wick_ok: bool,
    /// Close above VWAP by more than the deviation fraction.
    pub vwap_ok: bool,
    /// Nearest liquidation cluster within the proximity band.
    pub liq_ok: bool,
}

impl SignalSet {
    /// All six gates open.
    pub fn all_ok(&self) -> bool {
        self.rsi_ok && self.ema_ok && self.vol_ok && self.wick_ok && self.vwap_ok && self.liq_ok
    }

    /// Every gate closed; what short series and missing data produce.
    pub fn none() -> Self {
        Self::default()
    }
}

/// Evaluate all six gates on the most recent bar.
///
/// `liquidation_price` follows the same convention as the score: `None`
/// means no heatmap data, which closes the liquidation gate. A series
/// shorter than `SCORING_MIN_ROWS` closes everything.
pub fn entry_signals(
    series: &IndicatorSeries,
    thresholds: &ThresholdConfig,
    liquidation_price: Option<f64>,
) -> SignalSet {
    if series.len() < SCORING_MIN_ROWS {
        return SignalSet::none();
    }
    let Some((bar, row)) = series.last() else {
        return SignalSet::none();
    };

    let ema_distance_pct = (row.ema5 - bar.close) / bar.close * 100.0;
    let volume_ratio = bar.volume / row.volume_sma20;

    let liq_ok = liquidation_price.is_some_and(|liq_price| {
        let distance_pct = (liq_price - bar.close).abs() / bar.close * 100.0;
        distance_pct < thresholds.liquidation_proximity_pct
    });

    SignalSet {
        rsi_ok: row.rsi14 > thresholds.rsi_threshold
            && bearish_rsi_divergence(series, DIVERGENCE_LOOKBACK),
        ema_ok: ema_distance_pct > thresholds.ema_distance_pct,
        vol_ok: volume_ratio > thresholds.volume_spike_ratio,
        wick_ok: row.wick_ratio > thresholds.wick_ratio_min,
        vwap_ok: bar.close > row.vwap * (1.0 + thresholds.vwap_deviation),
        liq_ok,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bar, IndicatorSeries, IndicatorSet};
    use chrono::{Duration, TimeZone, Utc};

    fn with_leadin(bar: Bar, last_row: IndicatorSet, filler: IndicatorSet) -> IndicatorSeries {
        let base = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();
        let mut bars: Vec<Bar> = (0..19)
            .map(|i| Bar {
                ts: base + Duration::minutes(15 * i as i64),
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.0,
                volume: 1000.0,
            })
            .collect();
        let mut rows = vec![filler; 19];
        bars.push(bar);
        rows.push(last_row);
        IndicatorSeries::new(bars, rows)
    }

    fn series_of(bar: Bar, last_row: IndicatorSet) -> IndicatorSeries {
        with_leadin(bar, last_row, neutral_row())
    }

    /// Lead-in rows hot enough that the prior high carries a stronger RSI
    /// than the last bar, so the divergence leg of the RSI gate holds.
    fn fading_series(bar: Bar, last_row: IndicatorSet) -> IndicatorSeries {
        with_leadin(
            bar,
            last_row,
            IndicatorSet {
                rsi14: 90.0,
                ..neutral_row()
            },
        )
    }

    fn neutral_row() -> IndicatorSet {
        IndicatorSet {
            ema5: 100.0,
            rsi14: 50.0,
            vwap: 100.0,
            atr14: 1.0,
            volume_sma20: 1000.0,
            wick_ratio: 0.0,
        }
    }

    /// A bar/row pair engineered to open every gate under baseline thresholds.
    fn exhausted() -> (Bar, IndicatorSet) {
        let bar = Bar {
            ts: Utc.with_ymd_and_hms(2024, 1, 2, 17, 0, 0).unwrap(),
            open: 108.0,
            high: 112.0,
            low: 99.0,
            close: 100.0,
            volume: 5000.0,
        };
        let row = IndicatorSet {
            ema5: 106.0,       // 6% above close, threshold 4.8
            rsi14: 82.0,       // threshold 70
            vwap: 90.0,        // close 11% above, threshold 5%
            atr14: 1.5,
            volume_sma20: 1000.0, // ratio 5.0, threshold 3.7
            wick_ratio: 0.9,   // threshold 0.6
        };
        (bar, row)
    }

    fn thresholds() -> ThresholdConfig {
        ThresholdConfig::baseline()
    }

    #[test]
    fn all_gates_open_on_exhausted_bar() {
        let (bar, row) = exhausted();
        let signals = entry_signals(&fading_series(bar, row), &thresholds(), Some(100.5));
        assert!(signals.rsi_ok);
        assert!(signals.ema_ok);
        assert!(signals.vol_ok);
        assert!(signals.wick_ok);
        assert!(signals.vwap_ok);
        assert!(signals.liq_ok);
        assert!(signals.all_ok());
    }

    #[test]
    fn one_closed_gate_vetoes_all_ok() {
        let (bar, mut row) = exhausted();
        row.rsi14 = 69.9;
        let signals = entry_signals(&fading_series(bar, row), &thresholds(), Some(100.5));
        assert!(!signals.rsi_ok);
        assert!(signals.ema_ok);
        assert!(!signals.all_ok());
    }

    #[test]
    fn rsi_gate_needs_divergence_not_just_level() {
        // Same exhausted bar, but the lead-in RSI never beat the last
        // row's 82, so price made a new high with *strengthening* RSI.
        let (bar, row) = exhausted();
        let signals = entry_signals(&series_of(bar, row), &thresholds(), Some(100.5));
        assert!(!signals.rsi_ok);
        assert!(signals.ema_ok);
        assert!(signals.vol_ok);
        assert!(!signals.all_ok());
    }

    #[test]
    fn missing_liquidation_closes_that_gate_only() {
        let (bar, row) = exhausted();
        let signals = entry_signals(&fading_series(bar, row), &thresholds(), None);
        assert!(!signals.liq_ok);
        assert!(signals.rsi_ok);
        assert!(!signals.all_ok());
    }

    #[test]
    fn distant_cluster_closes_liquidation_gate() {
        let (bar, row) = exhausted();
        // 10% away vs 1.5% proximity band
        let signals = entry_signals(&fading_series(bar, row), &thresholds(), Some(110.0));
        assert!(!signals.liq_ok);
    }

    #[test]
    fn neutral_bar_closes_everything() {
        let bar = Bar {
            ts: Utc.with_ymd_and_hms(2024, 1, 2, 17, 0, 0).unwrap(),
            open: 100.0,
            high: 101.0,
            low: 99.0,
            close: 100.0,
            volume: 1000.0,
        };
        let signals = entry_signals(&series_of(bar, neutral_row()), &thresholds(), None);
        assert_eq!(signals, SignalSet::none());
        assert!(!signals.all_ok());
    }

    #[test]
    fn short_series_closes_everything() {
        let (bar, row) = exhausted();
        let base = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();
        let bars = vec![
            Bar {
                ts: base,
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.0,
                volume: 1000.0,
            },
            bar,
        ];
        let series = IndicatorSeries::new(bars, vec![neutral_row(), row]);
        let signals = entry_signals(&series, &thresholds(), Some(100.5));
        assert_eq!(signals, SignalSet::none());
    }
}
