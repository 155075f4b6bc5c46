//! Bearish RSI divergence.
//!
//! The pattern: the current bar prints a higher high than anything in the
//! recent window while RSI is overbought yet *lower* than it was at the
//! prior high. Momentum failing to confirm a price extreme is the
//! classic exhaustion precursor, and the RSI entry gate refuses to open
//! without it.

use crate::domain::IndicatorSeries;

/// Bars to look back when hunting the reference high.
pub const DIVERGENCE_LOOKBACK: usize = 5;

/// RSI floor for the current bar before divergence can register.
pub const OVERBOUGHT_RSI: f64 = 70.0;

/// True when the last row prints a new high with weakening, overbought RSI.
///
/// The reference is the highest high among the `lookback` rows before the
/// current one; on ties the earliest occurrence wins. Needs `lookback + 1`
/// defined rows, otherwise returns false.
pub fn bearish_rsi_divergence(series: &IndicatorSeries, lookback: usize) -> bool {
    let n = series.len();
    if lookback == 0 || n < lookback + 1 {
        return false;
    }

    let current_rsi = series.row(n - 1).rsi14;
    if current_rsi <= OVERBOUGHT_RSI {
        return false;
    }

    let window_start = n - 1 - lookback;
    let mut ref_idx = window_start;
    for i in window_start..(n - 1) {
        if series.bar(i).high > series.bar(ref_idx).high {
            ref_idx = i;
        }
    }

    let current_high = series.bar(n - 1).high;
    let ref_high = series.bar(ref_idx).high;
    let ref_rsi = series.row(ref_idx).rsi14;

    current_high > ref_high && current_rsi < ref_rsi
}
