//! Day report artifacts — JSON, CSV, and Markdown.
//!
//! Every shutdown writes one artifact directory per session:
//! - `report.json` — the full `DayReport`, schema-versioned
//! - `trades.csv` — the paper trade tape for external analysis
//! - `summary.md` — a human-readable recap
//!
//! Reports carry the `config_id` of the parameters that produced them,
//! so a day can always be traced back to its exact configuration.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use fadelab_core::execution::TradeEvent;
use fadelab_core::risk::Breakers;

use crate::evaluate::Decision;

pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Everything one session produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub session_date: NaiveDate,
    pub config_id: String,
    pub starting_balance: f64,
    pub closing_balance: f64,
    pub daily_pnl: f64,
    pub drawdown: f64,
    pub breakers: Breakers,
    pub decisions: Vec<Decision>,
    pub trades: Vec<TradeEvent>,
}

impl DayReport {
    pub fn entry_count(&self) -> usize {
        self.decisions.iter().filter(|d| d.is_entry()).count()
    }
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `DayReport` to pretty JSON.
pub fn export_json(report: &DayReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize DayReport to JSON")
}

/// Deserialize a `DayReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<DayReport> {
    let report: DayReport =
        serde_json::from_str(json).context("failed to deserialize DayReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the trade tape as CSV.
///
/// Columns: event, id, symbol, side, price, size, percentage,
/// realized_pnl, flattened, ts. Close-only columns are empty on OPEN
/// rows.
pub fn export_trades_csv(trades: &[TradeEvent]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    // Header
    wtr.write_record([
        "event",
        "id",
        "symbol",
        "side",
        "price",
        "size",
        "percentage",
        "realized_pnl",
        "flattened",
        "ts",
    ])?;

    for event in trades {
        match event {
            TradeEvent::Open(o) => {
                wtr.write_record([
                    "OPEN",
                    &o.id.to_string(),
                    &o.symbol,
                    &format!("{:?}", o.side),
                    &format!("{:.6}", o.entry_price),
                    &format!("{:.6}", o.size),
                    "",
                    "",
                    "",
                    &o.ts.to_rfc3339(),
                ])?;
            }
            TradeEvent::Close(c) => {
                wtr.write_record([
                    "CLOSE",
                    &c.id.to_string(),
                    &c.symbol,
                    &format!("{:?}", c.side),
                    &format!("{:.6}", c.exit_price),
                    &format!("{:.6}", c.closed_size),
                    &format!("{:.1}", c.percentage),
                    &format!("{:.2}", c.realized_pnl),
                    &c.flattened.to_string(),
                    &c.ts.to_rfc3339(),
                ])?;
            }
        }
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Markdown summary ───────────────────────────────────────────────

/// Generate a Markdown recap of the session.
pub fn generate_summary(report: &DayReport) -> String {
    let mut md = String::with_capacity(1024);

    md.push_str(&format!("# Session Report — {}\n\n", report.session_date));

    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Config | `{}` |\n", &report.config_id[..12.min(report.config_id.len())]));
    md.push_str(&format!(
        "| Starting Balance | ${:.2} |\n",
        report.starting_balance
    ));
    md.push_str(&format!(
        "| Closing Balance | ${:.2} |\n",
        report.closing_balance
    ));
    md.push_str(&format!("| Daily PnL | {:+.2} |\n", report.daily_pnl));
    md.push_str(&format!(
        "| Drawdown | {:.2}% |\n",
        report.drawdown * 100.0
    ));
    md.push_str(&format!("| Entries | {} |\n", report.entry_count()));
    if report.breakers.any() {
        md.push_str(&format!(
            "| Breakers | volatility={} api={} drawdown={} |\n",
            report.breakers.high_volatility,
            report.breakers.api_failure,
            report.breakers.exceeded_drawdown
        ));
    }
    md.push('\n');

    if !report.decisions.is_empty() {
        md.push_str("## Decisions\n\n");
        md.push_str("| Symbol | Outcome | Score |\n");
        md.push_str("| --- | --- | ---: |\n");
        for decision in &report.decisions {
            match decision {
                Decision::Entered {
                    symbol,
                    score,
                    entry_price,
                    ..
                } => {
                    md.push_str(&format!(
                        "| {symbol} | entered @ {entry_price:.6} | {score:.2} |\n"
                    ));
                }
                Decision::Skipped {
                    symbol,
                    reason,
                    score,
                } => {
                    let score = score
                        .map(|s| format!("{s:.2}"))
                        .unwrap_or_else(|| "-".to_string());
                    md.push_str(&format!("| {symbol} | skipped ({reason:?}) | {score} |\n"));
                }
            }
        }
        md.push('\n');
    }

    md
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for one session.
///
/// Creates `{session_date}_{config_id[..8]}/` under `output_dir`. The
/// directory name is deterministic so reruns of the same day and config
/// overwrite their own artifacts.
pub fn save_day_report(report: &DayReport, output_dir: &Path) -> Result<PathBuf> {
    let short_id = &report.config_id[..8.min(report.config_id.len())];
    let run_dir = output_dir.join(format!("{}_{}", report.session_date, short_id));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create report dir: {}", run_dir.display()))?;

    let json = export_json(report)?;
    std::fs::write(run_dir.join("report.json"), &json)?;

    let trades_csv = export_trades_csv(&report.trades)?;
    std::fs::write(run_dir.join("trades.csv"), &trades_csv)?;

    let summary = generate_summary(report);
    std::fs::write(run_dir.join("summary.md"), &summary)?;

    Ok(run_dir)
}

/// Load a `DayReport` back from an artifact directory.
pub fn load_day_report(dir: &Path) -> Result<DayReport> {
    let report_path = dir.join("report.json");
    let json = std::fs::read_to_string(&report_path)
        .with_context(|| format!("failed to read {}", report_path.display()))?;
    import_json(&json)
}
