//! Exponential Moving Average (EMA) of close.
//!
//! Recursive: EMA[t] = alpha * close[t] + (1 - alpha) * EMA[t-1]
//! Seed: EMA[period-1] = SMA of first `period` close values.
//! First defined value at index period-1.

use crate::domain::Bar;

/// EMA of close prices. NaN until the seed forms; a NaN close taints
/// every later value.
pub fn ema(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];

    if n < period || period == 0 {
        return result;
    }

    let alpha = 2.0 / (period as f64 + 1.0);

    // Seed: SMA of first `period` values
    let mut sum = 0.0;
    for bar in bars.iter().take(period) {
        if bar.close.is_nan() {
            return result; // NaN in seed window → all NaN
        }
        sum += bar.close;
    }
    let seed = sum / period as f64;
    result[period - 1] = seed;

    let mut prev = seed;
    for i in period..n {
        if bars[i].close.is_nan() {
            for val in result.iter_mut().skip(i) {
                *val = f64::NAN;
            }
            return result;
        }
        let val = alpha * bars[i].close + (1.0 - alpha) * prev;
        result[i] = val;
        prev = val;
    }

    result
}
