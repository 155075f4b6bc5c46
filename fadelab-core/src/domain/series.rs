//! Indicator-augmented bar series.
//!
//! `IndicatorSeries` is what the analytics layer consumes: bars zipped with a
//! fully-defined feature row per bar. The pipeline only emits rows where every
//! feature is finite, so downstream code never checks for NaN.

use super::bar::Bar;
use serde::{Deserialize, Serialize};

/// One row of computed features, aligned to a bar.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IndicatorSet {
    /// 5-period EMA of close.
    pub ema5: f64,
    /// 14-period Wilder RSI, in [0, 100].
    pub rsi14: f64,
    /// Cumulative VWAP anchored to the start of the fetched window.
    pub vwap: f64,
    /// 14-period Wilder ATR, in price units.
    pub atr14: f64,
    /// 20-period simple moving average of volume.
    pub volume_sma20: f64,
    /// Upper-wick fraction of bar range, in [0, 1].
    pub wick_ratio: f64,
}

/// Bars paired one-to-one with their feature rows.
///
/// Invariant: `bars.len() == rows.len()`, enforced at construction.
/// An empty series means "not enough data to decide", never an error.
#[derive(Debug, Clone, Default)]
pub struct IndicatorSeries {
    bars: Vec<Bar>,
    rows: Vec<IndicatorSet>,
}

impl IndicatorSeries {
    pub fn new(bars: Vec<Bar>, rows: Vec<IndicatorSet>) -> Self {
        assert_eq!(bars.len(), rows.len(), "bars and rows must align");
        Self { bars, rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn rows(&self) -> &[IndicatorSet] {
        &self.rows
    }

    pub fn bar(&self, i: usize) -> &Bar {
        &self.bars[i]
    }

    pub fn row(&self, i: usize) -> &IndicatorSet {
        &self.rows[i]
    }

    /// The most recent bar and its features, if any.
    pub fn last(&self) -> Option<(&Bar, &IndicatorSet)> {
        match (self.bars.last(), self.rows.last()) {
            (Some(b), Some(r)) => Some((b, r)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bar(close: f64) -> Bar {
        Bar {
            ts: Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000.0,
        }
    }

    fn row() -> IndicatorSet {
        IndicatorSet {
            ema5: 100.0,
            rsi14: 50.0,
            vwap: 100.0,
            atr14: 1.0,
            volume_sma20: 1000.0,
            wick_ratio: 0.5,
        }
    }

    #[test]
    fn last_pairs_bar_and_row() {
        let series = IndicatorSeries::new(vec![bar(100.0), bar(101.0)], vec![row(), row()]);
        let (b, r) = series.last().unwrap();
        assert_eq!(b.close, 101.0);
        assert_eq!(r.rsi14, 50.0);
    }

    #[test]
    fn empty_series_has_no_last() {
        assert!(IndicatorSeries::empty().last().is_none());
        assert!(IndicatorSeries::empty().is_empty());
    }

    #[test]
    #[should_panic(expected = "must align")]
    fn mismatched_lengths_panic() {
        IndicatorSeries::new(vec![bar(100.0)], vec![]);
    }
}
