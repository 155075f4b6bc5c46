//! Market data access for the session loop.
//!
//! Everything the runner knows about the outside world comes through
//! `MarketData`. The real exchange client lives behind this trait; the
//! `StaticProvider` here serves deterministic synthetic tape for tests
//! and `--test` sessions.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use fadelab_core::domain::{Bar, LiquidationCluster, Side, Symbol};
use fadelab_core::synthetic;

pub type DataResult<T> = Result<T, DataError>;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("no candles returned for {symbol}")]
    NoCandles { symbol: String },
    #[error("feed unavailable: {0}")]
    Unavailable(String),
}

/// Candle timeframe requested from the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Timeframe {
    M15,
    H1,
}

/// One row of the 24h ticker tape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerStats {
    pub symbol: Symbol,
    pub last_price: f64,
    /// 24h traded volume in quote units (USD)
    pub quote_volume_24h: f64,
    /// 24h price change as a fraction (0.25 = +25%)
    pub change_24h: f64,
}

/// External market data seam.
pub trait MarketData: Send + Sync {
    fn candles(&self, symbol: &str, timeframe: Timeframe, limit: usize) -> DataResult<Vec<Bar>>;
    fn tickers(&self) -> DataResult<Vec<TickerStats>>;
    fn liquidation_clusters(&self, symbol: &str) -> DataResult<Vec<LiquidationCluster>>;
    fn funding_rate(&self, symbol: &str) -> DataResult<f64>;
    fn btc_dominance(&self) -> DataResult<f64>;
}

const BTC_SYMBOL: &str = "BTCUSDT";
const PUMP_PRICE: f64 = 2.5;
const WALK_PRICE: f64 = 1.2;
const BTC_PRICE: f64 = 64_000.0;
/// Canonical tape length per symbol; fetches return a suffix of this,
/// so a 2-bar mark fetch agrees with a 100-bar history fetch.
const SERIES_LEN: usize = 120;

/// Deterministic in-memory provider. Pump symbols replay the blow-off
/// shape and carry liquidation clusters; walk symbols get quiet tape and
/// none. Candle series are reproducible per (seed, symbol).
pub struct StaticProvider {
    seed: u64,
    pump_symbols: Vec<Symbol>,
    walk_symbols: Vec<Symbol>,
    fail_candles: bool,
}

impl StaticProvider {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            pump_symbols: vec!["PEPEUSDT".into(), "TURBOUSDT".into()],
            walk_symbols: vec!["BONKUSDT".into(), "FLOKIUSDT".into(), "MEWUSDT".into()],
            fail_candles: false,
        }
    }

    pub fn with_symbols(mut self, pump: Vec<Symbol>, walk: Vec<Symbol>) -> Self {
        self.pump_symbols = pump;
        self.walk_symbols = walk;
        self
    }

    /// Every candle fetch fails. Exercises the API-failure breaker path.
    pub fn with_candle_failures(mut self) -> Self {
        self.fail_candles = true;
        self
    }

    fn symbol_seed(&self, symbol: &str) -> u64 {
        let hash = blake3::hash(symbol.as_bytes());
        let mut eight = [0u8; 8];
        eight.copy_from_slice(&hash.as_bytes()[..8]);
        self.seed ^ u64::from_le_bytes(eight)
    }

    fn is_pump(&self, symbol: &str) -> bool {
        self.pump_symbols.iter().any(|s| s == symbol)
    }

    fn series_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap()
    }

    fn generate(&self, symbol: &str, limit: usize) -> Vec<Bar> {
        let seed = self.symbol_seed(symbol);
        let full = if symbol == BTC_SYMBOL {
            synthetic::random_walk(seed, SERIES_LEN, BTC_PRICE, Self::series_start())
        } else if self.is_pump(symbol) {
            synthetic::pump_and_reject(seed, SERIES_LEN, PUMP_PRICE, Self::series_start())
        } else {
            synthetic::random_walk(seed, SERIES_LEN, WALK_PRICE, Self::series_start())
        };
        let skip = full.len().saturating_sub(limit);
        full[skip..].to_vec()
    }

    fn last_close(&self, symbol: &str) -> f64 {
        self.generate(symbol, 2)
            .last()
            .map(|bar| bar.close)
            .unwrap_or(WALK_PRICE)
    }
}

impl MarketData for StaticProvider {
    fn candles(&self, symbol: &str, _timeframe: Timeframe, limit: usize) -> DataResult<Vec<Bar>> {
        if self.fail_candles {
            return Err(DataError::Unavailable("synthetic outage".into()));
        }
        if limit < 2 {
            return Err(DataError::NoCandles {
                symbol: symbol.to_string(),
            });
        }
        Ok(self.generate(symbol, limit))
    }

    fn tickers(&self) -> DataResult<Vec<TickerStats>> {
        let mut rows = Vec::new();
        // Walk symbols first so priority reordering is observable
        for symbol in &self.walk_symbols {
            rows.push(TickerStats {
                symbol: symbol.clone(),
                last_price: self.last_close(symbol),
                quote_volume_24h: 12_000_000.0,
                change_24h: 0.08,
            });
        }
        for symbol in &self.pump_symbols {
            rows.push(TickerStats {
                symbol: symbol.clone(),
                last_price: self.last_close(symbol),
                quote_volume_24h: 28_000_000.0,
                change_24h: 0.27,
            });
        }
        Ok(rows)
    }

    fn liquidation_clusters(&self, symbol: &str) -> DataResult<Vec<LiquidationCluster>> {
        if !self.is_pump(symbol) {
            return Ok(Vec::new());
        }
        let close = self.last_close(symbol);
        let ts = Self::series_start();
        Ok(vec![
            LiquidationCluster {
                price: close * 1.005,
                size: 1_200_000.0,
                side: Side::Sell,
                ts,
            },
            LiquidationCluster {
                price: close * 1.03,
                size: 400_000.0,
                side: Side::Sell,
                ts,
            },
            LiquidationCluster {
                price: close * 0.97,
                size: 250_000.0,
                side: Side::Buy,
                ts,
            },
        ])
    }

    fn funding_rate(&self, _symbol: &str) -> DataResult<f64> {
        Ok(0.0001)
    }

    fn btc_dominance(&self) -> DataResult<f64> {
        Ok(54.2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candles_are_reproducible_per_symbol() {
        let provider = StaticProvider::new(7);
        let a = provider.candles("PEPEUSDT", Timeframe::M15, 60).unwrap();
        let b = provider.candles("PEPEUSDT", Timeframe::M15, 60).unwrap();
        assert_eq!(a.len(), 60);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.close, y.close);
        }
    }

    #[test]
    fn different_symbols_get_different_tape() {
        let provider = StaticProvider::new(7);
        let a = provider.candles("BONKUSDT", Timeframe::M15, 40).unwrap();
        let b = provider.candles("FLOKIUSDT", Timeframe::M15, 40).unwrap();
        assert!(a.iter().zip(&b).any(|(x, y)| x.close != y.close));
    }

    #[test]
    fn short_fetch_is_a_suffix_of_the_long_fetch() {
        let provider = StaticProvider::new(7);
        let long = provider.candles("PEPEUSDT", Timeframe::M15, 100).unwrap();
        let short = provider.candles("PEPEUSDT", Timeframe::M15, 2).unwrap();
        assert_eq!(short.len(), 2);
        assert_eq!(short[1].close, long.last().unwrap().close);
        assert_eq!(short[1].ts, long.last().unwrap().ts);
    }

    #[test]
    fn pump_symbols_carry_clusters_walks_do_not() {
        let provider = StaticProvider::new(7);
        let clusters = provider.liquidation_clusters("PEPEUSDT").unwrap();
        assert_eq!(clusters.len(), 3);
        let close = provider.last_close("PEPEUSDT");
        assert!(clusters[0].price > close);

        assert!(provider.liquidation_clusters("BONKUSDT").unwrap().is_empty());
    }

    #[test]
    fn ticker_tape_splits_the_bands() {
        let provider = StaticProvider::new(7);
        let tickers = provider.tickers().unwrap();
        assert_eq!(tickers.len(), 5);
        let pump = tickers.iter().find(|t| t.symbol == "PEPEUSDT").unwrap();
        assert!(pump.quote_volume_24h > 20_000_000.0 && pump.quote_volume_24h < 35_000_000.0);
        assert!(pump.change_24h > 0.20 && pump.change_24h < 0.35);
        let walk = tickers.iter().find(|t| t.symbol == "BONKUSDT").unwrap();
        assert!(walk.quote_volume_24h < 20_000_000.0);
    }

    #[test]
    fn outage_mode_fails_candles_only() {
        let provider = StaticProvider::new(7).with_candle_failures();
        assert!(provider.candles("PEPEUSDT", Timeframe::M15, 60).is_err());
        assert!(provider.tickers().is_ok());
    }

    #[test]
    fn btc_tape_is_quiet() {
        let provider = StaticProvider::new(7);
        let bars = provider.candles(BTC_SYMBOL, Timeframe::H1, 48).unwrap();
        assert_eq!(bars.len(), 48);
        for bar in &bars {
            assert!(bar.is_sane());
            // A random walk stays within a few percent of its anchor
            assert!(bar.close > BTC_PRICE * 0.8 && bar.close < BTC_PRICE * 1.2);
        }
    }
}
