//! Simple moving average of volume.
//!
//! Rolling mean over a lookback window, first defined at index period-1.
//! The volume-spike score component divides current volume by this.

use crate::domain::Bar;

/// Rolling mean of volume. NaN while the window is incomplete or
/// contains a NaN volume.
pub fn volume_sma(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];

    if n < period || period == 0 {
        return result;
    }

    let mut sum = 0.0;
    let mut nan_in_window = false;
    for bar in bars.iter().take(period) {
        if bar.volume.is_nan() {
            nan_in_window = true;
        }
        sum += bar.volume;
    }

    if !nan_in_window {
        result[period - 1] = sum / period as f64;
    }

    for i in period..n {
        let leaving = bars[i - period].volume;
        let entering = bars[i].volume;
        sum = sum - leaving + entering;

        if entering.is_nan() || leaving.is_nan() || nan_in_window {
            // Rescan the window; rolling sums don't recover from NaN
            nan_in_window = false;
            sum = 0.0;
            for bar in &bars[(i + 1 - period)..=i] {
                if bar.volume.is_nan() {
                    nan_in_window = true;
                }
                sum += bar.volume;
            }
            if nan_in_window {
                result[i] = f64::NAN;
                continue;
            }
        }

        result[i] = sum / period as f64;
    }

    result
}
