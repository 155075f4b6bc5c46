//! FadeLab Core — indicator pipeline, exhaustion analytics, risk, execution, session clock.
//!
//! This crate contains the decision core of the exhaustion fader:
//! - Domain types (bars, positions, liquidation clusters, indicator rows)
//! - Indicator pipeline with NaN warmup trimming
//! - Exhaustion scoring and the unanimous entry gates
//! - Circuit-breaker risk engine with daily drawdown tracking
//! - Volatility-tiered sizing and the take-profit ladder
//! - Paper execution book
//! - Jakarta session state machine
//! - Seeded synthetic candle generation for tests and benches

pub mod analytics;
pub mod config;
pub mod domain;
pub mod execution;
pub mod indicators;
pub mod risk;
pub mod session;
pub mod synthetic;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything shared across the scan fan-out and the
    /// session loop is Send + Sync. If any type fails this check, the build
    /// breaks immediately.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::Position>();
        require_sync::<domain::Position>();
        require_send::<domain::LiquidationCluster>();
        require_sync::<domain::LiquidationCluster>();
        require_send::<domain::IndicatorSeries>();
        require_sync::<domain::IndicatorSeries>();

        // Config
        require_send::<config::ThresholdConfig>();
        require_sync::<config::ThresholdConfig>();

        // Analytics outputs
        require_send::<analytics::ScoreBreakdown>();
        require_sync::<analytics::ScoreBreakdown>();
        require_send::<analytics::SignalSet>();
        require_sync::<analytics::SignalSet>();

        // Shared mutable state
        require_send::<risk::RiskEngine>();
        require_sync::<risk::RiskEngine>();
        require_send::<execution::PaperBook>();
        require_sync::<execution::PaperBook>();

        // Session clock
        require_send::<session::SessionState>();
        require_sync::<session::SessionState>();
        require_send::<session::SessionSnapshot>();
        require_sync::<session::SessionSnapshot>();
    }
}
