//! Deterministic synthetic candle generation.
//!
//! Two shapes: a drifting random walk for uninteresting symbols, and a
//! pump-and-reject pattern (steady ramp into a blow-off spike that closes
//! deep in the bar on heavy volume) that reliably presents as exhausted.
//! Both are seeded, so providers and tests get identical bars per seed.

use crate::domain::Bar;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const BAR_MINUTES: i64 = 15;
const BASE_VOLUME: f64 = 10_000.0;

/// Per-bar growth of the pump ramp (0.9%).
const RAMP_RATE: f64 = 0.009;
/// Final-bar spike above its open (2.5%).
const BLOWOFF_SPIKE: f64 = 0.025;
/// Final-bar close below its open (3.8%): deep rejection.
const BLOWOFF_CRASH: f64 = 0.038;
/// Final-bar volume multiple of the base.
const BLOWOFF_VOLUME_MULT: f64 = 4.0;

/// Sideways random walk: closes wander a few tenths of a percent per bar,
/// volumes stay within 5% of base. Never presents a volume spike, so the
/// entry gates can never unanimously open on it.
pub fn random_walk(seed: u64, n: usize, start_price: f64, start: DateTime<Utc>) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut close = start_price;
    let mut bars = Vec::with_capacity(n);

    for i in 0..n {
        let open = close;
        close *= 1.0 + rng.gen_range(-0.002..0.002);
        bars.push(make_bar(
            start + Duration::minutes(BAR_MINUTES * i as i64),
            open,
            close,
            BASE_VOLUME * rng.gen_range(0.95..1.05),
        ));
    }

    bars
}

/// Ramp for n-1 bars, then a blow-off bar: new high above every prior
/// bar, close crashed below the open, four times the base volume. The
/// last bar carries an overbought-but-weakening RSI, a stretched EMA,
/// a tall upper wick, a volume spike, and a close far above VWAP.
pub fn pump_and_reject(seed: u64, n: usize, start_price: f64, start: DateTime<Utc>) -> Vec<Bar> {
    assert!(n >= 2, "pump needs at least a ramp bar and a blow-off bar");
    let mut rng = StdRng::seed_from_u64(seed);
    let mut close = start_price;
    let mut bars = Vec::with_capacity(n);

    for i in 0..n - 1 {
        let open = close;
        // Jitter is kept an order of magnitude under the ramp so every
        // ramp bar is a gain bar.
        close *= 1.0 + RAMP_RATE + rng.gen_range(-0.001..0.001);
        bars.push(make_bar(
            start + Duration::minutes(BAR_MINUTES * i as i64),
            open,
            close,
            BASE_VOLUME * rng.gen_range(0.95..1.05),
        ));
    }

    let open = close;
    let high = open * (1.0 + BLOWOFF_SPIKE);
    let blowoff_close = open * (1.0 - BLOWOFF_CRASH);
    let low = blowoff_close * 0.998;
    bars.push(Bar {
        ts: start + Duration::minutes(BAR_MINUTES * (n - 1) as i64),
        open,
        high,
        low,
        close: blowoff_close,
        volume: BASE_VOLUME * BLOWOFF_VOLUME_MULT,
    });

    bars
}

fn make_bar(ts: DateTime<Utc>, open: f64, close: f64, volume: f64) -> Bar {
    Bar {
        ts,
        open,
        high: open.max(close) * 1.002,
        low: open.min(close) * 0.998,
        close,
        volume,
    }
}
