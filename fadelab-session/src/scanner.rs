//! Candidate selection from the 24h ticker tape.
//!
//! The fade wants coins that ran hard on real flow but are not yet
//! majors: volume and change must both sit strictly inside their bands.
//! Known meme leaders are pulled to the front, then the list is cut to
//! the session limit.

use serde::{Deserialize, Serialize};
use tracing::info;

use fadelab_core::domain::Symbol;

use crate::config::ScannerConfig;
use crate::provider::TickerStats;

/// A symbol that passed the scan, with the tape stats that qualified it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub symbol: Symbol,
    pub last_price: f64,
    pub quote_volume_24h: f64,
    pub change_24h: f64,
}

/// Filters the tape down to fade candidates.
///
/// Both bands are exclusive on both ends. Priority symbols keep their
/// configured order at the front; everything else keeps tape order
/// behind them.
pub fn select_candidates(tickers: &[TickerStats], config: &ScannerConfig) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = tickers
        .iter()
        .filter(|t| {
            t.quote_volume_24h > config.min_quote_volume
                && t.quote_volume_24h < config.max_quote_volume
                && t.change_24h > config.min_change
                && t.change_24h < config.max_change
        })
        .map(|t| Candidate {
            symbol: t.symbol.clone(),
            last_price: t.last_price,
            quote_volume_24h: t.quote_volume_24h,
            change_24h: t.change_24h,
        })
        .collect();

    candidates.sort_by_key(|c| priority_rank(&c.symbol, config));
    candidates.truncate(config.limit);

    info!(
        "SCAN: {} candidates from {} tickers: {:?}",
        candidates.len(),
        tickers.len(),
        candidates.iter().map(|c| c.symbol.as_str()).collect::<Vec<_>>()
    );
    candidates
}

fn priority_rank(symbol: &Symbol, config: &ScannerConfig) -> usize {
    config
        .priority
        .iter()
        .position(|p| p == symbol)
        .unwrap_or(config.priority.len())
}
