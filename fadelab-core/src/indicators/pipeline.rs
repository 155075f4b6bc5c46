//! Full indicator pipeline.
//!
//! Computes all six features over a candle window and keeps only the rows
//! where every feature is defined. With the standard periods the binding
//! warmup is the 20-bar volume SMA, so a 100-bar fetch yields 81 usable
//! rows. Too little data is not an error: the result is simply empty and
//! every downstream consumer treats an empty series as "no decision".

use super::atr::atr;
use super::ema::ema;
use super::rsi::rsi;
use super::volume_sma::volume_sma;
use super::vwap::vwap;
use super::wick::wick_ratios;
use crate::domain::{Bar, IndicatorSeries, IndicatorSet};

pub const EMA_PERIOD: usize = 5;
pub const RSI_PERIOD: usize = 14;
pub const ATR_PERIOD: usize = 14;
pub const VOLUME_SMA_PERIOD: usize = 20;

/// Minimum candles before any indicator work is attempted.
pub const MIN_BARS: usize = 20;

/// Compute the full feature set and drop every row with an undefined value.
pub fn compute_indicators(bars: &[Bar]) -> IndicatorSeries {
    if bars.len() < MIN_BARS {
        return IndicatorSeries::empty();
    }

    let ema5 = ema(bars, EMA_PERIOD);
    let rsi14 = rsi(bars, RSI_PERIOD);
    let vwap_series = vwap(bars);
    let atr14 = atr(bars, ATR_PERIOD);
    let volume_sma20 = volume_sma(bars, VOLUME_SMA_PERIOD);
    let wick = wick_ratios(bars);

    let mut kept = Vec::with_capacity(bars.len());
    let mut rows = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let row = IndicatorSet {
            ema5: ema5[i],
            rsi14: rsi14[i],
            vwap: vwap_series[i],
            atr14: atr14[i],
            volume_sma20: volume_sma20[i],
            wick_ratio: wick[i],
        };
        if row_defined(&row) {
            kept.push(bar.clone());
            rows.push(row);
        }
    }

    IndicatorSeries::new(kept, rows)
}

fn row_defined(row: &IndicatorSet) -> bool {
    row.ema5.is_finite()
        && row.rsi14.is_finite()
        && row.vwap.is_finite()
        && row.atr14.is_finite()
        && row.volume_sma20.is_finite()
        && row.wick_ratio.is_finite()
}
