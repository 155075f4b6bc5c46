//! Upper-wick ratio.
//!
//! wick_ratio = (high - close) / (high - low), clamped to [0, 1].
//! Measures how much of the bar's range was rejected from the high; a
//! tall upper wick on the signal bar is the core exhaustion tell.
//!
//! Degenerate bars (high == low, or any non-finite input) yield 0.0 so a
//! flat bar can never manufacture a wick signal.

use crate::domain::Bar;

/// Upper-wick fraction of a single bar's range, in [0, 1].
pub fn wick_ratio(bar: &Bar) -> f64 {
    let range = bar.high - bar.low;
    if !range.is_finite() || range <= 0.0 {
        return 0.0;
    }
    let ratio = (bar.high - bar.close) / range;
    if !ratio.is_finite() {
        return 0.0;
    }
    ratio.clamp(0.0, 1.0)
}

/// Per-bar wick ratios, aligned to the input. Defined from index 0.
pub fn wick_ratios(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(wick_ratio).collect()
}
