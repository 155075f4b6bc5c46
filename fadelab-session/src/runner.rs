//! Session driver.
//!
//! `SessionRunner` owns the paper book, the risk engine, and the day's
//! working state, and advances one step at a time. Each step projects
//! the wall clock into Jakarta time, classifies the session window, and
//! runs that window's duties:
//!
//! - `PRE_SESSION`  — daily reset, BTC volatility and market checks
//! - `SCANNING`     — refresh the candidate list from the ticker tape
//! - `GOLDEN_HOUR`  — evaluate candidates every poll and book entries
//! - `MANAGEMENT`   — hold and observe
//! - `EXIT_WINDOW`  — trim half of every open position
//! - `SHUTDOWN`     — flatten, write the day report, wait for tomorrow
//!
//! The runner never sleeps: callers drive it with `step()` and pace
//! themselves with `poll_delay()`.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Asia::Jakarta;
use thiserror::Error;
use tracing::{info, warn};

use fadelab_core::domain::Symbol;
use fadelab_core::execution::PaperBook;
use fadelab_core::indicators::compute_indicators;
use fadelab_core::risk::RiskEngine;
use fadelab_core::session::{state_at, SessionSnapshot, SessionState};

use crate::config::{ConfigError, SessionConfig};
use crate::evaluate::{evaluate_candidates, Decision, SkipReason};
use crate::provider::{DataError, MarketData, Timeframe};
use crate::report::{save_day_report, DayReport, SCHEMA_VERSION};
use crate::scanner::{select_candidates, Candidate};

const BTC_SYMBOL: &str = "BTCUSDT";
/// 1h candles fetched for the BTC volatility check.
const BTC_H1_HISTORY: usize = 48;
/// ATR ratio assumed when BTC data is unavailable.
const DEFAULT_BTC_VOLATILITY: f64 = 0.01;
/// Upper bound on the poll sleep, so state flips are picked up promptly.
const MAX_POLL_SECONDS: i64 = 30;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error(transparent)]
    Report(#[from] anyhow::Error),
}

/// What one step did, for callers and tests.
#[derive(Debug)]
pub struct StepOutcome {
    pub state: SessionState,
    pub entered: usize,
    pub trimmed: usize,
    pub flattened: usize,
    pub report_path: Option<PathBuf>,
}

impl StepOutcome {
    fn idle(state: SessionState) -> Self {
        Self {
            state,
            entered: 0,
            trimmed: 0,
            flattened: 0,
            report_path: None,
        }
    }
}

/// One trading day, stepped by the caller's clock.
pub struct SessionRunner<P: MarketData> {
    provider: P,
    config: SessionConfig,
    risk: RiskEngine,
    book: PaperBook,
    output_dir: PathBuf,
    candidates: Vec<Candidate>,
    decisions: Vec<Decision>,
    api_failures: u32,
    trimmed: HashSet<Symbol>,
    last_reset: Option<NaiveDate>,
    last_state: Option<SessionState>,
    /// True between the daily reset and the report write.
    session_open: bool,
    /// True once the day reached its opening window. Distinguishes the
    /// 19:15-19:30 dead zone from the end-of-day shutdown.
    golden_seen: bool,
    btc_volatility: f64,
}

impl<P: MarketData> SessionRunner<P> {
    pub fn new(
        provider: P,
        config: SessionConfig,
        output_dir: PathBuf,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let risk = RiskEngine::new(
            config.thresholds.max_daily_drawdown,
            config.thresholds.btc_atr_threshold,
            config.account.balance,
        );
        Ok(Self {
            provider,
            config,
            risk,
            book: PaperBook::new(),
            output_dir,
            candidates: Vec::new(),
            decisions: Vec::new(),
            api_failures: 0,
            trimmed: HashSet::new(),
            last_reset: None,
            last_state: None,
            session_open: false,
            golden_seen: false,
            btc_volatility: DEFAULT_BTC_VOLATILITY,
        })
    }

    /// Classifies `now` into a session window and runs it.
    pub fn step(&mut self, now: DateTime<Utc>) -> Result<StepOutcome, SessionError> {
        let local = now.with_timezone(&Jakarta).naive_local();
        let state = state_at(local.time());
        self.step_state(state, local.date(), now)
    }

    /// Runs one window's duties directly. `step()` is the normal entry;
    /// this is public so a dry run can force the rotation.
    pub fn step_state(
        &mut self,
        state: SessionState,
        session_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<StepOutcome, SessionError> {
        let mut outcome = StepOutcome::idle(state);

        match state {
            SessionState::PreSession => {
                if self.last_reset != Some(session_date) {
                    self.begin_session(session_date);
                }
            }
            SessionState::Scanning => match self.provider.tickers() {
                Ok(tickers) => {
                    self.candidates = select_candidates(&tickers, &self.config.scanner);
                }
                Err(err) => {
                    warn!("DATA: ticker tape unavailable: {}", err);
                    self.note_api_failure();
                }
            },
            SessionState::GoldenHour => {
                self.golden_seen = true;
                outcome.entered = self.run_golden_hour(now);
            }
            SessionState::Management => {
                info!(
                    "STATE: MANAGEMENT | {} open: {:?}",
                    self.book.open_count(),
                    self.book.open_symbols()
                );
                self.golden_seen = true;
            }
            SessionState::ExitWindow => {
                self.golden_seen = true;
                outcome.trimmed = self.trim_positions(now);
            }
            SessionState::Shutdown => {
                outcome.flattened = self.flatten_positions(now);
                if self.session_open && self.golden_seen {
                    let path = self.write_report(session_date)?;
                    info!("SESSION COMPLETE: report at {}", path.display());
                    self.session_open = false;
                    outcome.report_path = Some(path);
                }
            }
        }

        self.last_state = Some(state);
        Ok(outcome)
    }

    fn begin_session(&mut self, session_date: NaiveDate) {
        info!("STATE: PRE_SESSION | {} | daily checks", session_date);
        self.risk.reset_daily();
        self.candidates.clear();
        self.decisions.clear();
        self.trimmed.clear();
        self.api_failures = 0;
        self.golden_seen = false;

        self.btc_volatility = self.fetch_btc_volatility();
        if self.risk.check_btc_volatility(self.btc_volatility) {
            warn!(
                "BTC 1h volatility {:.4} above threshold, entries blocked",
                self.btc_volatility
            );
        } else {
            info!("CHECK: BTC 1h volatility {:.4}", self.btc_volatility);
        }

        match self.provider.btc_dominance() {
            Ok(dominance) => info!("CHECK: BTC dominance {:.1}%", dominance),
            Err(err) => {
                warn!("DATA: BTC dominance unavailable: {}", err);
                self.note_api_failure();
            }
        }
        match self.provider.funding_rate(BTC_SYMBOL) {
            Ok(rate) => info!("CHECK: BTC funding rate {:.4}%", rate * 100.0),
            Err(err) => {
                warn!("DATA: BTC funding rate unavailable: {}", err);
                self.note_api_failure();
            }
        }

        self.last_reset = Some(session_date);
        self.session_open = true;
    }

    /// BTC 1h ATR over price, from the latest defined pipeline row.
    fn fetch_btc_volatility(&mut self) -> f64 {
        match self
            .provider
            .candles(BTC_SYMBOL, Timeframe::H1, BTC_H1_HISTORY)
        {
            Ok(bars) => {
                let series = compute_indicators(&bars);
                match series.last() {
                    Some((bar, row)) if bar.close > 0.0 => row.atr14 / bar.close,
                    _ => {
                        warn!("BTC history too short for ATR, assuming calm");
                        DEFAULT_BTC_VOLATILITY
                    }
                }
            }
            Err(err) => {
                warn!("DATA: BTC candles unavailable, assuming calm: {}", err);
                self.note_api_failure();
                DEFAULT_BTC_VOLATILITY
            }
        }
    }

    /// Evaluates every candidate. Runs on each poll inside the window,
    /// so a symbol whose score crosses the floor mid-window still gets
    /// its entry; symbols already open are rejected by the book and
    /// re-evaluation stays idempotent.
    fn run_golden_hour(&mut self, now: DateTime<Utc>) -> usize {
        if self.candidates.is_empty() {
            // Late start can skip the scanning window entirely
            if let Ok(tickers) = self.provider.tickers() {
                self.candidates = select_candidates(&tickers, &self.config.scanner);
            }
        }
        let decisions = evaluate_candidates(
            &self.provider,
            &self.candidates,
            &self.config,
            &self.risk,
            &self.book,
            self.btc_volatility,
            now,
        );
        let failures = decisions
            .iter()
            .filter(|d| {
                matches!(
                    d,
                    Decision::Skipped {
                        reason: SkipReason::DataUnavailable,
                        ..
                    }
                )
            })
            .count();
        for _ in 0..failures {
            self.note_api_failure();
        }
        let entered = decisions.iter().filter(|d| d.is_entry()).count();
        info!(
            "STATE: GOLDEN_HOUR | {} evaluated | {} entered",
            decisions.len(),
            entered
        );
        for decision in decisions {
            self.record_decision(decision);
        }
        entered
    }

    /// Keeps one decision per symbol across repeated polls: the latest
    /// outcome wins, except that a booked entry is never overwritten by
    /// the `AlreadyOpen` skips that follow it.
    fn record_decision(&mut self, decision: Decision) {
        match self
            .decisions
            .iter_mut()
            .find(|d| d.symbol() == decision.symbol())
        {
            Some(existing) if !existing.is_entry() => *existing = decision,
            Some(_) => {}
            None => self.decisions.push(decision),
        }
    }

    fn trim_positions(&mut self, now: DateTime<Utc>) -> usize {
        let mut trimmed = 0;
        for symbol in self.book.open_symbols() {
            if self.trimmed.contains(&symbol) {
                continue;
            }
            if self.close_fraction(&symbol, 50.0, now) {
                trimmed += 1;
            }
            self.trimmed.insert(symbol);
        }
        if trimmed > 0 {
            info!("STATE: EXIT_WINDOW | trimmed {} positions", trimmed);
        }
        trimmed
    }

    fn flatten_positions(&mut self, now: DateTime<Utc>) -> usize {
        let mut flattened = 0;
        for symbol in self.book.open_symbols() {
            if self.close_fraction(&symbol, 100.0, now) {
                flattened += 1;
            }
        }
        if flattened > 0 {
            info!("STATE: SHUTDOWN | flattened {} positions", flattened);
        }
        flattened
    }

    /// Closes part of one position at the current mark, falling back to
    /// the entry price when the mark cannot be fetched. Booked PnL flows
    /// into the risk engine.
    fn close_fraction(&mut self, symbol: &str, percentage: f64, now: DateTime<Utc>) -> bool {
        let result = match self.mark_price(symbol) {
            Some(mark) => self.book.close_at(symbol, percentage, mark, now),
            None => self.book.close(symbol, percentage, now),
        };
        match result {
            Ok(Some(close)) => {
                self.risk.update_pnl(close.realized_pnl);
                info!(
                    "EXIT: {} {:.0}% @ {:.6} | pnl {:+.2}",
                    symbol, percentage, close.exit_price, close.realized_pnl
                );
                true
            }
            Ok(None) => false,
            Err(err) => {
                warn!("EXIT FAILED: {} | {}", symbol, err);
                false
            }
        }
    }

    fn mark_price(&mut self, symbol: &str) -> Option<f64> {
        match self.provider.candles(symbol, Timeframe::M15, 2) {
            Ok(bars) => bars.last().map(|bar| bar.close),
            Err(err) => {
                warn!("DATA: {} mark unavailable, closing at entry: {}", symbol, err);
                self.note_api_failure();
                None
            }
        }
    }

    fn note_api_failure(&mut self) {
        self.api_failures += 1;
        if self.risk.check_api_failures(self.api_failures) {
            warn!("API failure budget exhausted ({})", self.api_failures);
        }
    }

    fn write_report(&mut self, fallback_date: NaiveDate) -> Result<PathBuf, SessionError> {
        let snapshot = self.risk.snapshot();
        let report = DayReport {
            schema_version: SCHEMA_VERSION,
            session_date: self.last_reset.unwrap_or(fallback_date),
            config_id: self.config.config_id(),
            starting_balance: snapshot.starting_balance,
            closing_balance: snapshot.current_balance,
            daily_pnl: snapshot.daily_pnl,
            drawdown: snapshot.drawdown,
            breakers: snapshot.breakers,
            decisions: self.decisions.clone(),
            trades: self.book.history(),
        };
        Ok(save_day_report(&report, &self.output_dir)?)
    }

    pub fn book(&self) -> &PaperBook {
        &self.book
    }

    pub fn risk(&self) -> &RiskEngine {
        &self.risk
    }

    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

/// Sleep budget until the next meaningful wakeup: the next boundary,
/// capped so a long window is still polled regularly.
pub fn poll_delay(snapshot: &SessionSnapshot, now: NaiveDateTime) -> Duration {
    snapshot.eta(now).min(Duration::seconds(MAX_POLL_SECONDS))
}
