//! Volume-Weighted Average Price (VWAP).
//!
//! Cumulative over the fetched window, anchored to its first bar:
//! VWAP[t] = sum(typical * volume)[0..=t] / sum(volume)[0..=t]
//! where typical = (high + low + close) / 3. The anchor is deliberately
//! the window start, not the session open; the score compares close
//! against stretch from the recent past, and the provider's window is
//! that past.
//!
//! Defined from index 0 unless cumulative volume is still zero (NaN) or a
//! void bar poisons the running sums (NaN from there on).

use crate::domain::Bar;

/// Window-anchored cumulative VWAP.
pub fn vwap(bars: &[Bar]) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];

    let mut cum_pv = 0.0;
    let mut cum_vol = 0.0;

    for i in 0..n {
        let bar = &bars[i];
        if bar.is_void() {
            // Cumulative sums are unrecoverable past a void bar
            return result;
        }
        cum_pv += bar.typical_price() * bar.volume;
        cum_vol += bar.volume;
        if cum_vol > 0.0 {
            result[i] = cum_pv / cum_vol;
        }
    }

    result
}
