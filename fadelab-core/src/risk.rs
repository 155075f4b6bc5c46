//! Circuit breakers for the trading session.
//!
//! Three independent breakers gate all entries:
//! - `high_volatility` follows the BTC 1h ATR ratio and clears when the
//!   market calms down.
//! - `api_failure` latches once the daily provider-error count passes the
//!   limit and stays latched for the rest of the day.
//! - `exceeded_drawdown` latches once daily losses reach the configured
//!   fraction of the starting balance.
//!
//! `trading_allowed()` is the unanimous check the session layer calls
//! before any entry. Only `reset_daily()` clears the latched breakers.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Daily provider-error budget; one more error latches the API breaker.
pub const API_FAILURE_LIMIT: u32 = 5;

/// The three entry-blocking flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakers {
    pub high_volatility: bool,
    pub api_failure: bool,
    pub exceeded_drawdown: bool,
}

impl Breakers {
    pub fn any(&self) -> bool {
        self.high_volatility || self.api_failure || self.exceeded_drawdown
    }
}

/// Snapshot of the engine state, for logs and the day report.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RiskSnapshot {
    pub daily_pnl: f64,
    pub starting_balance: f64,
    pub current_balance: f64,
    pub drawdown: f64,
    pub breakers: Breakers,
}

#[derive(Debug)]
struct RiskState {
    daily_pnl: f64,
    starting_balance: f64,
    breakers: Breakers,
}

/// Session risk engine. Shared across evaluation threads; every method
/// takes `&self` and locks internally.
#[derive(Debug)]
pub struct RiskEngine {
    state: Mutex<RiskState>,
    max_daily_drawdown: f64,
    btc_atr_threshold: f64,
}

impl RiskEngine {
    /// `account_balance` seeds the starting balance; the balance is
    /// simulated as starting + accumulated daily PnL.
    pub fn new(max_daily_drawdown: f64, btc_atr_threshold: f64, account_balance: f64) -> Self {
        assert!(
            max_daily_drawdown > 0.0 && max_daily_drawdown < 1.0,
            "max_daily_drawdown must be a fraction in (0, 1)"
        );
        assert!(account_balance > 0.0, "account balance must be positive");
        Self {
            state: Mutex::new(RiskState {
                daily_pnl: 0.0,
                starting_balance: account_balance,
                breakers: Breakers::default(),
            }),
            max_daily_drawdown,
            btc_atr_threshold,
        }
    }

    /// True while no breaker is raised.
    pub fn trading_allowed(&self) -> bool {
        !self.state.lock().unwrap().breakers.any()
    }

    /// Re-evaluate the volatility breaker against the BTC 1h ATR ratio.
    /// Unlike the latching breakers this one clears when volatility drops
    /// back under the threshold. Returns the new flag.
    pub fn check_btc_volatility(&self, atr_ratio: f64) -> bool {
        let mut state = self.state.lock().unwrap();
        state.breakers.high_volatility = atr_ratio > self.btc_atr_threshold;
        state.breakers.high_volatility
    }

    /// Latch the API breaker once the daily error count exceeds
    /// `API_FAILURE_LIMIT`. Never clears within a day.
    pub fn check_api_failures(&self, error_count: u32) -> bool {
        let mut state = self.state.lock().unwrap();
        if error_count > API_FAILURE_LIMIT {
            state.breakers.api_failure = true;
        }
        state.breakers.api_failure
    }

    /// Add realized PnL and re-check the drawdown latch.
    pub fn update_pnl(&self, amount: f64) {
        let mut state = self.state.lock().unwrap();
        state.daily_pnl += amount;
        let drawdown = drawdown_of(&state);
        if drawdown >= self.max_daily_drawdown {
            state.breakers.exceeded_drawdown = true;
        }
    }

    /// Clear all breakers and PnL for a new session day. The balance the
    /// previous day ended with becomes the new starting balance.
    pub fn reset_daily(&self) {
        let mut state = self.state.lock().unwrap();
        state.starting_balance += state.daily_pnl;
        state.daily_pnl = 0.0;
        state.breakers = Breakers::default();
    }

    pub fn daily_pnl(&self) -> f64 {
        self.state.lock().unwrap().daily_pnl
    }

    pub fn snapshot(&self) -> RiskSnapshot {
        let state = self.state.lock().unwrap();
        RiskSnapshot {
            daily_pnl: state.daily_pnl,
            starting_balance: state.starting_balance,
            current_balance: state.starting_balance + state.daily_pnl,
            drawdown: drawdown_of(&state),
            breakers: state.breakers,
        }
    }
}

fn drawdown_of(state: &RiskState) -> f64 {
    let current = state.starting_balance + state.daily_pnl;
    (state.starting_balance - current) / state.starting_balance
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> RiskEngine {
        RiskEngine::new(0.015, 0.02, 10_000.0)
    }

    #[test]
    fn starts_with_trading_allowed() {
        let risk = engine();
        assert!(risk.trading_allowed());
        assert_eq!(risk.daily_pnl(), 0.0);
    }

    #[test]
    fn volatility_breaker_clears_when_market_calms() {
        let risk = engine();
        assert!(risk.check_btc_volatility(0.03));
        assert!(!risk.trading_allowed());

        // Next reading is below the threshold → breaker clears
        assert!(!risk.check_btc_volatility(0.01));
        assert!(risk.trading_allowed());
    }

    #[test]
    fn volatility_at_threshold_does_not_trip() {
        let risk = engine();
        assert!(!risk.check_btc_volatility(0.02));
        assert!(risk.trading_allowed());
    }

    #[test]
    fn api_breaker_latches_past_limit() {
        let risk = engine();
        assert!(!risk.check_api_failures(5)); // at the limit: still fine
        assert!(risk.trading_allowed());
        assert!(risk.check_api_failures(6));
        assert!(!risk.trading_allowed());

        // A later lower count must not unlatch it
        assert!(risk.check_api_failures(0));
        assert!(!risk.trading_allowed());
    }

    #[test]
    fn drawdown_latches_at_max() {
        let risk = engine();
        // 10_000 * 0.015 = 150 of losses latches the breaker
        risk.update_pnl(-100.0);
        assert!(risk.trading_allowed());
        risk.update_pnl(-50.0);
        assert!(!risk.trading_allowed());

        // Winning it back must not unlatch
        risk.update_pnl(500.0);
        assert!(!risk.trading_allowed());
    }

    #[test]
    fn profits_never_trip_drawdown() {
        let risk = engine();
        risk.update_pnl(5_000.0);
        assert!(risk.trading_allowed());
        assert!(risk.snapshot().drawdown < 0.0);
    }

    #[test]
    fn reset_clears_breakers_and_rolls_balance() {
        let risk = engine();
        risk.check_btc_volatility(0.05);
        risk.check_api_failures(10);
        risk.update_pnl(-200.0);
        assert!(!risk.trading_allowed());

        risk.reset_daily();
        assert!(risk.trading_allowed());
        assert_eq!(risk.daily_pnl(), 0.0);
        // Yesterday's loss carries into the new starting balance
        let snap = risk.snapshot();
        assert_eq!(snap.starting_balance, 9_800.0);
        assert_eq!(snap.drawdown, 0.0);
    }

    #[test]
    fn snapshot_reports_current_balance() {
        let risk = engine();
        risk.update_pnl(-120.0);
        let snap = risk.snapshot();
        assert_eq!(snap.current_balance, 9_880.0);
        assert!((snap.drawdown - 0.012).abs() < 1e-12);
        assert!(!snap.breakers.exceeded_drawdown);
    }

    #[test]
    fn each_breaker_blocks_alone() {
        let risk = engine();
        risk.check_btc_volatility(0.05);
        assert!(!risk.trading_allowed());
        risk.reset_daily();

        risk.check_api_failures(6);
        assert!(!risk.trading_allowed());
        risk.reset_daily();

        risk.update_pnl(-150.0);
        assert!(!risk.trading_allowed());
    }
}
