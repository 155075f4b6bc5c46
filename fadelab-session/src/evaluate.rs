//! Golden-hour symbol evaluation.
//!
//! For each candidate: fetch 15m history, run the indicator pipeline,
//! score the latest row against the thresholds, and book a paper entry
//! when the score and every gate agree. Candidates are independent, so
//! the fan-out runs data-parallel.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use fadelab_core::analytics::{entry_signals, exhaustion_score, SCORING_MIN_ROWS};
use fadelab_core::domain::{nearest_cluster, Side, Symbol};
use fadelab_core::execution::{plan_order, PaperBook};
use fadelab_core::indicators::compute_indicators;
use fadelab_core::risk::RiskEngine;

use crate::config::SessionConfig;
use crate::provider::{MarketData, Timeframe};
use crate::scanner::Candidate;

/// Why a candidate did not become a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    RiskHalted,
    DataUnavailable,
    InsufficientHistory,
    NoLiquidationReference,
    GatesClosed,
    ScoreBelowMinimum,
    UntradablePlan,
    AlreadyOpen,
}

/// Outcome of evaluating one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Entered {
        symbol: Symbol,
        score: f64,
        entry_price: f64,
        size: f64,
        stop_price: f64,
    },
    Skipped {
        symbol: Symbol,
        reason: SkipReason,
        /// Present once the symbol got far enough to be scored
        score: Option<f64>,
    },
}

impl Decision {
    pub fn symbol(&self) -> &str {
        match self {
            Decision::Entered { symbol, .. } => symbol,
            Decision::Skipped { symbol, .. } => symbol,
        }
    }

    pub fn is_entry(&self) -> bool {
        matches!(self, Decision::Entered { .. })
    }
}

fn skipped(symbol: &str, reason: SkipReason, score: Option<f64>) -> Decision {
    info!("SKIP: {} | {:?}", symbol, reason);
    Decision::Skipped {
        symbol: symbol.to_string(),
        reason,
        score,
    }
}

/// Runs the full decision chain for one symbol and books the entry on
/// success. Short positions only: the strategy fades blow-offs.
pub fn evaluate_symbol<P: MarketData + ?Sized>(
    provider: &P,
    symbol: &str,
    config: &SessionConfig,
    risk: &RiskEngine,
    book: &PaperBook,
    btc_volatility: f64,
    now: DateTime<Utc>,
) -> Decision {
    if !risk.trading_allowed() {
        return skipped(symbol, SkipReason::RiskHalted, None);
    }

    let bars = match provider.candles(symbol, Timeframe::M15, config.entry.candle_history) {
        Ok(bars) => bars,
        Err(err) => {
            warn!("DATA: {} candles unavailable: {}", symbol, err);
            return skipped(symbol, SkipReason::DataUnavailable, None);
        }
    };

    let series = compute_indicators(&bars);
    if series.len() < SCORING_MIN_ROWS {
        return skipped(symbol, SkipReason::InsufficientHistory, None);
    }

    let clusters = match provider.liquidation_clusters(symbol) {
        Ok(clusters) => clusters,
        Err(err) => {
            warn!("DATA: {} liquidation clusters unavailable: {}", symbol, err);
            return skipped(symbol, SkipReason::DataUnavailable, None);
        }
    };

    // series.len() >= SCORING_MIN_ROWS > 0, so last() is present
    let Some((bar, row)) = series.last() else {
        return skipped(symbol, SkipReason::InsufficientHistory, None);
    };
    let Some(cluster) = nearest_cluster(&clusters, bar.close) else {
        return skipped(symbol, SkipReason::NoLiquidationReference, None);
    };

    let breakdown = exhaustion_score(&series, &config.thresholds, Some(cluster.price));
    let signals = entry_signals(&series, &config.thresholds, Some(cluster.price));
    let total = breakdown.total();

    if !signals.all_ok() {
        return skipped(symbol, SkipReason::GatesClosed, Some(total));
    }
    if total < config.entry.score_min {
        return skipped(symbol, SkipReason::ScoreBelowMinimum, Some(total));
    }

    // Limit just below the cluster so the fill front-runs the cascade
    let entry_price = cluster.price * config.entry.discount;
    let plan = plan_order(
        Side::Sell,
        entry_price,
        row.atr14,
        btc_volatility,
        config.account.risk_per_trade,
    );
    if !plan.is_tradable() {
        return skipped(symbol, SkipReason::UntradablePlan, Some(total));
    }

    match book.open(
        symbol,
        Side::Sell,
        entry_price,
        plan.size,
        plan.stop_distance,
        plan.tp_levels.clone(),
        now,
    ) {
        Ok(position) => {
            info!(
                "ENTRY: {} SELL {:.4} @ {:.6} | score {:.2} | stop {:.6}",
                symbol, plan.size, entry_price, total, position.stop_price
            );
            Decision::Entered {
                symbol: symbol.to_string(),
                score: total,
                entry_price,
                size: plan.size,
                stop_price: position.stop_price,
            }
        }
        Err(err) => {
            warn!("ENTRY REJECTED: {} | {}", symbol, err);
            skipped(symbol, SkipReason::AlreadyOpen, Some(total))
        }
    }
}

/// Evaluates every candidate in parallel, preserving candidate order in
/// the returned decisions.
pub fn evaluate_candidates<P: MarketData>(
    provider: &P,
    candidates: &[Candidate],
    config: &SessionConfig,
    risk: &RiskEngine,
    book: &PaperBook,
    btc_volatility: f64,
    now: DateTime<Utc>,
) -> Vec<Decision> {
    candidates
        .par_iter()
        .map(|candidate| {
            evaluate_symbol(
                provider,
                &candidate.symbol,
                config,
                risk,
                book,
                btc_volatility,
                now,
            )
        })
        .collect()
}
