//! Paper execution book.
//!
//! Pure bookkeeping: nothing is transmitted anywhere. The book enforces
//! one open position per symbol, supports fractional closes as a
//! percentage of the *remaining* size, and keeps an append-only history
//! of every simulated open and close for the day report.
//!
//! Closing a symbol with nothing open is a no-op (`Ok(None)`), not an
//! error; the exit window sweeps every symbol without caring which ones
//! already flattened.

use crate::domain::{IdGen, OrderId, Position, PositionStatus, Side, Symbol, TakeProfit};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

/// Fraction of the original size below which a remainder counts as dust
/// and the position is flattened.
const DUST_FRACTION: f64 = 1e-9;

#[derive(Debug, Error, PartialEq)]
pub enum PaperError {
    #[error("position already open for {symbol}")]
    AlreadyOpen { symbol: String },

    #[error("close percentage must be in (0, 100], got {percentage}")]
    InvalidPercentage { percentage: f64 },
}

/// Record of a simulated open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    pub symbol: Symbol,
    pub side: Side,
    pub entry_price: f64,
    pub size: f64,
    pub stop_price: f64,
    pub tp_levels: Vec<TakeProfit>,
    pub ts: DateTime<Utc>,
}

/// Record of a simulated close, full or partial.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseRecord {
    pub id: OrderId,
    pub symbol: Symbol,
    /// Side of the closing order, opposite the position.
    pub side: Side,
    pub closed_size: f64,
    /// Percentage of the remaining size that was closed.
    pub percentage: f64,
    pub exit_price: f64,
    pub realized_pnl: f64,
    /// True when this close flattened the position.
    pub flattened: bool,
    pub ts: DateTime<Utc>,
}

/// One entry in the book's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeEvent {
    Open(OrderRecord),
    Close(CloseRecord),
}

#[derive(Debug, Default)]
struct BookInner {
    /// Open positions only; flattened ones live on in `history`.
    positions: HashMap<Symbol, Position>,
    history: Vec<TradeEvent>,
    ids: IdGen,
}

/// Shared paper book. Every method takes `&self` and locks internally,
/// same as the risk engine.
#[derive(Debug, Default)]
pub struct PaperBook {
    inner: Mutex<BookInner>,
}

impl PaperBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a position. The protective stop lands above entry for sells
    /// and below for buys. Rejects a symbol that still has anything open.
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        &self,
        symbol: &str,
        side: Side,
        entry_price: f64,
        size: f64,
        stop_distance: f64,
        tp_levels: Vec<TakeProfit>,
        ts: DateTime<Utc>,
    ) -> Result<Position, PaperError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.positions.contains_key(symbol) {
            return Err(PaperError::AlreadyOpen {
                symbol: symbol.to_string(),
            });
        }

        let stop_price = match side {
            Side::Sell => entry_price + stop_distance,
            Side::Buy => entry_price - stop_distance,
        };

        let position = Position {
            symbol: symbol.to_string(),
            side,
            entry_price,
            size,
            initial_size: size,
            stop_price,
            tp_levels: tp_levels.clone(),
            status: PositionStatus::Open,
            opened_at: ts,
            closed_at: None,
        };

        let id = inner.ids.next_order();
        inner.history.push(TradeEvent::Open(OrderRecord {
            id,
            symbol: symbol.to_string(),
            side,
            entry_price,
            size,
            stop_price,
            tp_levels,
            ts,
        }));
        inner.positions.insert(symbol.to_string(), position.clone());

        Ok(position)
    }

    /// Close `percentage` of the remaining size at the entry price
    /// (bookkeeping-only close, zero realized PnL).
    pub fn close(
        &self,
        symbol: &str,
        percentage: f64,
        ts: DateTime<Utc>,
    ) -> Result<Option<CloseRecord>, PaperError> {
        let mut inner = self.inner.lock().unwrap();
        close_inner(&mut inner, symbol, percentage, None, ts)
    }

    /// Close `percentage` of the remaining size at `mark_price`,
    /// realizing PnL against the entry.
    pub fn close_at(
        &self,
        symbol: &str,
        percentage: f64,
        mark_price: f64,
        ts: DateTime<Utc>,
    ) -> Result<Option<CloseRecord>, PaperError> {
        let mut inner = self.inner.lock().unwrap();
        close_inner(&mut inner, symbol, percentage, Some(mark_price), ts)
    }

    pub fn position(&self, symbol: &str) -> Option<Position> {
        self.inner.lock().unwrap().positions.get(symbol).cloned()
    }

    /// Symbols with anything open, sorted for deterministic iteration.
    pub fn open_symbols(&self) -> Vec<Symbol> {
        let inner = self.inner.lock().unwrap();
        let mut symbols: Vec<Symbol> = inner.positions.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    pub fn open_count(&self) -> usize {
        self.inner.lock().unwrap().positions.len()
    }

    pub fn history(&self) -> Vec<TradeEvent> {
        self.inner.lock().unwrap().history.clone()
    }
}

fn close_inner(
    inner: &mut BookInner,
    symbol: &str,
    percentage: f64,
    mark_price: Option<f64>,
    ts: DateTime<Utc>,
) -> Result<Option<CloseRecord>, PaperError> {
    if !(percentage > 0.0 && percentage <= 100.0) {
        return Err(PaperError::InvalidPercentage { percentage });
    }

    let Some(position) = inner.positions.get_mut(symbol) else {
        return Ok(None);
    };

    let closed_size = position.size * (percentage / 100.0);
    let exit_price = mark_price.unwrap_or(position.entry_price);
    let realized_pnl = position.pnl_at(exit_price, closed_size);

    position.size -= closed_size;
    let flattened = position.size <= position.initial_size * DUST_FRACTION;
    if flattened {
        position.size = 0.0;
        position.status = PositionStatus::Closed;
        position.closed_at = Some(ts);
    }

    let record = CloseRecord {
        id: inner.ids.next_order(),
        symbol: symbol.to_string(),
        side: position.side.opposite(),
        closed_size,
        percentage,
        exit_price,
        realized_pnl,
        flattened,
        ts,
    };

    if flattened {
        inner.positions.remove(symbol);
    }
    inner.history.push(TradeEvent::Close(record.clone()));

    Ok(Some(record))
}
