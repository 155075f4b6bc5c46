//! Indicator primitives for the exhaustion pipeline.
//!
//! Each function returns a `Vec<f64>` aligned to the input bars, with NaN
//! for warmup rows where the value is not yet defined. The Wilder family
//! (RSI, ATR) seeds with a simple average and smooths with alpha = 1/period.
//! A NaN input taints every later output; `pipeline::compute_indicators`
//! keeps only the rows where every column is defined, so the analytics
//! layer never sees NaN.

pub mod atr;
pub mod ema;
pub mod pipeline;
pub mod rsi;
pub mod volume_sma;
pub mod vwap;
pub mod wick;

pub use atr::{atr, true_range, wilder_smooth};
pub use ema::ema;
pub use pipeline::{
    compute_indicators, ATR_PERIOD, EMA_PERIOD, MIN_BARS, RSI_PERIOD, VOLUME_SMA_PERIOD,
};
pub use rsi::rsi;
pub use volume_sma::volume_sma;
pub use vwap::vwap;
pub use wick::{wick_ratio, wick_ratios};

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLCV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            let high = open.max(close) + 1.0;
            let low = open.min(close) - 1.0;
            Bar {
                ts: base + chrono::Duration::minutes(15 * i as i64),
                open,
                high,
                low,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Create bars from explicit (open, high, low, close, volume) tuples.
#[cfg(test)]
pub fn make_ohlcv_bars(data: &[(f64, f64, f64, f64, f64)]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close, volume))| Bar {
            ts: base + chrono::Duration::minutes(15 * i as i64),
            open,
            high,
            low,
            close,
            volume,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
