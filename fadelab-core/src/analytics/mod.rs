//! Exhaustion analytics: divergence detection, the multi-factor score,
//! and the boolean entry gates.
//!
//! Everything here is pure over an `IndicatorSeries`. A series that is
//! too short (fewer than `SCORING_MIN_ROWS` defined rows) yields inert
//! outputs: zero score, no divergence, every gate closed.

pub mod divergence;
pub mod exhaustion;
pub mod gates;

pub use divergence::{bearish_rsi_divergence, DIVERGENCE_LOOKBACK, OVERBOUGHT_RSI};
pub use exhaustion::{exhaustion_score, ScoreBreakdown, MAX_SCORE, SCORING_MIN_ROWS};
pub use gates::{entry_signals, SignalSet};
