//! Volatility-tiered position sizing and the take-profit ladder.
//!
//! BTC 1h volatility (ATR/price ratio) selects a stop multiplier tier:
//! calm markets place wider stops, stressed markets tighter ones plus a
//! size haircut. The stop distance multiplies entry price by
//! (multiplier * ATR) with ATR in price units, so distances grow with
//! both price level and range; dividing the fixed dollar budget by that
//! distance is what holds per-trade risk constant, and sizes come out
//! correspondingly small on high-priced symbols.

use crate::domain::{Side, TakeProfit};

/// Stop multiplier when BTC 1h volatility is under 1%.
pub const LOW_VOL_MULTIPLIER: f64 = 0.50;
/// Stop multiplier for BTC 1h volatility in [1%, 2%).
pub const MID_VOL_MULTIPLIER: f64 = 0.42;
/// Stop multiplier when BTC 1h volatility is 2% or above.
pub const HIGH_VOL_MULTIPLIER: f64 = 0.30;

pub const LOW_VOL_BOUND: f64 = 0.01;
pub const HIGH_VOL_BOUND: f64 = 0.02;

/// Size haircut applied when BTC 1h volatility is strictly above 2%.
pub const HIGH_VOL_SIZE_FACTOR: f64 = 0.6;

/// (ATR multiple, percent of size) per ladder rung. Weights sum to 100.
const TP_LADDER: [(f64, f64); 3] = [(1.0, 50.0), (2.0, 30.0), (3.0, 20.0)];

/// Everything the book needs to open a position, or a zero-size plan
/// when the inputs are degenerate.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPlan {
    pub size: f64,
    pub stop_distance: f64,
    pub tp_levels: Vec<TakeProfit>,
}

impl OrderPlan {
    fn empty() -> Self {
        Self {
            size: 0.0,
            stop_distance: 0.0,
            tp_levels: Vec::new(),
        }
    }

    /// A plan the evaluator should act on.
    pub fn is_tradable(&self) -> bool {
        self.size > 0.0 && self.stop_distance > 0.0
    }
}

/// Stop multiplier for the current BTC volatility tier.
pub fn stop_multiplier(btc_volatility: f64) -> f64 {
    if btc_volatility < LOW_VOL_BOUND {
        LOW_VOL_MULTIPLIER
    } else if btc_volatility < HIGH_VOL_BOUND {
        MID_VOL_MULTIPLIER
    } else {
        HIGH_VOL_MULTIPLIER
    }
}

/// Stop distance in price units: entry * (tier multiplier * ATR).
pub fn stop_distance(entry_price: f64, atr: f64, btc_volatility: f64) -> f64 {
    entry_price * (stop_multiplier(btc_volatility) * atr)
}

/// Contracts to open: the dollar risk budget divided by the stop
/// distance, cut by `HIGH_VOL_SIZE_FACTOR` when BTC volatility is
/// strictly above the high bound. Zero on degenerate inputs.
pub fn position_size(
    entry_price: f64,
    atr: f64,
    btc_volatility: f64,
    risk_per_trade: f64,
) -> f64 {
    if !inputs_usable(entry_price, atr, btc_volatility) || risk_per_trade <= 0.0 {
        return 0.0;
    }
    let distance = stop_distance(entry_price, atr, btc_volatility);
    let mut size = risk_per_trade / distance;
    if btc_volatility > HIGH_VOL_BOUND {
        size *= HIGH_VOL_SIZE_FACTOR;
    }
    size
}

/// Three-rung ladder at 1, 2 and 3 ATR from entry: below entry for
/// sells, above for buys. Weights are 50/30/20 percent of original size.
pub fn tp_ladder(side: Side, entry_price: f64, atr: f64) -> Vec<TakeProfit> {
    TP_LADDER
        .iter()
        .map(|&(atr_multiple, weight_pct)| {
            let offset = atr_multiple * atr;
            let price = match side {
                Side::Sell => entry_price - offset,
                Side::Buy => entry_price + offset,
            };
            TakeProfit { price, weight_pct }
        })
        .collect()
}

/// Size, stop distance, and ladder in one pass.
pub fn plan_order(
    side: Side,
    entry_price: f64,
    atr: f64,
    btc_volatility: f64,
    risk_per_trade: f64,
) -> OrderPlan {
    if !inputs_usable(entry_price, atr, btc_volatility) || risk_per_trade <= 0.0 {
        return OrderPlan::empty();
    }
    OrderPlan {
        size: position_size(entry_price, atr, btc_volatility, risk_per_trade),
        stop_distance: stop_distance(entry_price, atr, btc_volatility),
        tp_levels: tp_ladder(side, entry_price, atr),
    }
}

fn inputs_usable(entry_price: f64, atr: f64, btc_volatility: f64) -> bool {
    entry_price.is_finite()
        && entry_price > 0.0
        && atr.is_finite()
        && atr > 0.0
        && btc_volatility.is_finite()
        && btc_volatility >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries() {
        assert_eq!(stop_multiplier(0.005), LOW_VOL_MULTIPLIER);
        assert_eq!(stop_multiplier(0.0099), LOW_VOL_MULTIPLIER);
        assert_eq!(stop_multiplier(0.01), MID_VOL_MULTIPLIER);
        assert_eq!(stop_multiplier(0.019), MID_VOL_MULTIPLIER);
        assert_eq!(stop_multiplier(0.02), HIGH_VOL_MULTIPLIER);
        assert_eq!(stop_multiplier(0.05), HIGH_VOL_MULTIPLIER);
    }

    #[test]
    fn calm_market_stop_distance() {
        // entry 60_000, ATR 1_500, vol 0.8% → multiplier 0.50
        // distance = 60_000 * (0.50 * 1_500) = 45_000_000
        let distance = stop_distance(60_000.0, 1_500.0, 0.008);
        assert_eq!(distance, 45_000_000.0);
    }

    #[test]
    fn size_is_budget_over_distance() {
        let size = position_size(60_000.0, 1_500.0, 0.008, 100.0);
        assert!((size - 100.0 / 45_000_000.0).abs() < 1e-18);
    }

    #[test]
    fn haircut_only_above_high_bound() {
        let at_bound = position_size(100.0, 2.0, 0.02, 100.0);
        // exactly 2%: high tier multiplier, but no haircut
        assert!((at_bound - 100.0 / (100.0 * 0.30 * 2.0)).abs() < 1e-12);

        let above = position_size(100.0, 2.0, 0.025, 100.0);
        assert!((above - HIGH_VOL_SIZE_FACTOR * 100.0 / (100.0 * 0.30 * 2.0)).abs() < 1e-12);
    }

    #[test]
    fn short_ladder_descends_from_entry() {
        let ladder = tp_ladder(Side::Sell, 60_000.0, 1_500.0);
        assert_eq!(ladder.len(), 3);
        assert_eq!(ladder[0].price, 58_500.0);
        assert_eq!(ladder[1].price, 57_000.0);
        assert_eq!(ladder[2].price, 55_500.0);
        assert_eq!(ladder[0].weight_pct, 50.0);
        assert_eq!(ladder[1].weight_pct, 30.0);
        assert_eq!(ladder[2].weight_pct, 20.0);
    }

    #[test]
    fn ladder_weights_sum_to_100() {
        let ladder = tp_ladder(Side::Sell, 100.0, 1.0);
        let total: f64 = ladder.iter().map(|tp| tp.weight_pct).sum();
        assert_eq!(total, 100.0);
    }

    #[test]
    fn buy_ladder_mirrors() {
        let ladder = tp_ladder(Side::Buy, 100.0, 2.0);
        assert_eq!(ladder[0].price, 102.0);
        assert_eq!(ladder[2].price, 106.0);
    }

    #[test]
    fn degenerate_inputs_plan_nothing() {
        assert!(!plan_order(Side::Sell, 0.0, 1.0, 0.01, 100.0).is_tradable());
        assert!(!plan_order(Side::Sell, 100.0, 0.0, 0.01, 100.0).is_tradable());
        assert!(!plan_order(Side::Sell, 100.0, -2.0, 0.01, 100.0).is_tradable());
        assert!(!plan_order(Side::Sell, 100.0, 1.0, f64::NAN, 100.0).is_tradable());
        assert!(!plan_order(Side::Sell, 100.0, 1.0, 0.01, 0.0).is_tradable());
    }

    #[test]
    fn full_plan_matches_parts() {
        let plan = plan_order(Side::Sell, 60_000.0, 1_500.0, 0.008, 100.0);
        assert!(plan.is_tradable());
        assert_eq!(plan.stop_distance, 45_000_000.0);
        assert_eq!(plan.size, position_size(60_000.0, 1_500.0, 0.008, 100.0));
        assert_eq!(plan.tp_levels, tp_ladder(Side::Sell, 60_000.0, 1_500.0));
    }
}
