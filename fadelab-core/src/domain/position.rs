//! Positions, sides, and take-profit ladder levels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trade direction. The exhaustion strategy only ever opens `Sell`,
/// but the book and the ladder arithmetic handle both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Position lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionStatus {
    Open,
    Closed,
}

/// One rung of the take-profit ladder: a price and the percentage of
/// the original size to unload there. Ladder weights sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TakeProfit {
    pub price: f64,
    pub weight_pct: f64,
}

/// A simulated position held by the paper book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub side: Side,
    pub entry_price: f64,
    /// Contracts still open. Shrinks on partial closes.
    pub size: f64,
    /// Original size at open, the base for ladder weights.
    pub initial_size: f64,
    /// Protective stop: above entry for sells, below for buys.
    pub stop_price: f64,
    pub tp_levels: Vec<TakeProfit>,
    pub status: PositionStatus,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl Position {
    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }

    /// Signed PnL for closing `size` contracts at `mark`.
    pub fn pnl_at(&self, mark: f64, size: f64) -> f64 {
        match self.side {
            Side::Buy => (mark - self.entry_price) * size,
            Side::Sell => (self.entry_price - mark) * size,
        }
    }

    pub fn unrealized_pnl(&self, mark: f64) -> f64 {
        self.pnl_at(mark, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn short_position() -> Position {
        Position {
            symbol: "PEPEUSDT".into(),
            side: Side::Sell,
            entry_price: 100.0,
            size: 10.0,
            initial_size: 10.0,
            stop_price: 105.0,
            tp_levels: vec![
                TakeProfit { price: 97.0, weight_pct: 50.0 },
                TakeProfit { price: 94.0, weight_pct: 30.0 },
                TakeProfit { price: 91.0, weight_pct: 20.0 },
            ],
            status: PositionStatus::Open,
            opened_at: Utc.with_ymd_and_hms(2024, 1, 2, 12, 45, 0).unwrap(),
            closed_at: None,
        }
    }

    #[test]
    fn short_pnl_gains_when_price_falls() {
        let pos = short_position();
        assert!(pos.unrealized_pnl(95.0) > 0.0);
        assert!(pos.unrealized_pnl(105.0) < 0.0);
        assert_eq!(pos.unrealized_pnl(95.0), 50.0);
    }

    #[test]
    fn long_pnl_is_mirrored() {
        let mut pos = short_position();
        pos.side = Side::Buy;
        assert_eq!(pos.unrealized_pnl(95.0), -50.0);
    }

    #[test]
    fn side_opposite() {
        assert_eq!(Side::Sell.opposite(), Side::Buy);
        assert_eq!(Side::Buy.opposite(), Side::Sell);
    }
}
