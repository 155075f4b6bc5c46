//! Fadelab CLI — session loop, state inspection, and config checks.
//!
//! Commands:
//! - `run` — drive the Jakarta session loop against the paper provider
//! - `state` — print the session window for now or a given time
//! - `check` — validate a session config and print its content id

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveTime, Utc};
use clap::{Parser, Subcommand};

use fadelab_core::session::{jakarta_now, snapshot_at, SessionState};
use fadelab_session::config::SessionConfig;
use fadelab_session::provider::{MarketData, StaticProvider};
use fadelab_session::runner::{poll_delay, SessionRunner};

/// Pause between windows when `--test` forces the rotation.
const ROTATION_SECONDS: u64 = 60;

#[derive(Parser)]
#[command(
    name = "fadelab",
    about = "Fadelab CLI — Jakarta-session exhaustion fade"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive the session loop against the deterministic paper provider.
    Run {
        /// Path to a TOML session config. Defaults to the baseline.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Seed for the synthetic provider.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Force one rotation through all six windows, then exit.
        #[arg(long, default_value_t = false)]
        test: bool,

        /// Output directory for day reports.
        #[arg(long, default_value = "reports")]
        output_dir: PathBuf,
    },
    /// Print the session window for now or a given Jakarta time.
    State {
        /// Jakarta wall-clock time (HH:MM). Defaults to now.
        #[arg(long)]
        at: Option<String>,
    },
    /// Validate a session config and print its content id.
    Check {
        /// Path to a TOML session config.
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fadelab_session=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            seed,
            test,
            output_dir,
        } => run_session(config, seed, test, output_dir),
        Commands::State { at } => show_state(at.as_deref()),
        Commands::Check { config } => check_config(&config),
    }
}

fn run_session(
    config_path: Option<PathBuf>,
    seed: u64,
    test: bool,
    output_dir: PathBuf,
) -> Result<()> {
    let config = match config_path {
        Some(path) => SessionConfig::load(&path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SessionConfig::default(),
    };
    println!("config id: {}", config.config_id());

    let provider = StaticProvider::new(seed);
    let mut runner = SessionRunner::new(provider, config, output_dir)?;

    if test {
        return run_rotation(&mut runner);
    }

    let mut last_state = None;
    loop {
        let outcome = runner.step(Utc::now())?;
        if last_state != Some(outcome.state) {
            let local = jakarta_now();
            let snapshot = snapshot_at(local);
            println!(
                "{} until {} ({})",
                outcome.state,
                snapshot.next_change.format("%H:%M"),
                snapshot.next_state
            );
            last_state = Some(outcome.state);
        }
        if let Some(path) = outcome.report_path {
            println!("Day report: {}", path.display());
        }

        let local = jakarta_now();
        let delay = poll_delay(&snapshot_at(local), local);
        std::thread::sleep(
            delay
                .to_std()
                .unwrap_or(std::time::Duration::from_secs(1)),
        );
    }
}

/// One pass through every window against the same book, paced so state
/// transitions are observable in the log.
fn run_rotation<P: MarketData>(runner: &mut SessionRunner<P>) -> Result<()> {
    let states = [
        SessionState::PreSession,
        SessionState::Scanning,
        SessionState::GoldenHour,
        SessionState::Management,
        SessionState::ExitWindow,
        SessionState::Shutdown,
    ];
    let date = jakarta_now().date();

    for (i, state) in states.iter().enumerate() {
        if i > 0 {
            std::thread::sleep(std::time::Duration::from_secs(ROTATION_SECONDS));
        }
        println!("forcing {state}");
        let outcome = runner.step_state(*state, date, Utc::now())?;
        if let Some(path) = outcome.report_path {
            println!("Day report: {}", path.display());
        }
    }
    Ok(())
}

fn show_state(at: Option<&str>) -> Result<()> {
    let now = match at {
        Some(raw) => {
            let time = NaiveTime::parse_from_str(raw, "%H:%M")
                .with_context(|| format!("invalid time {raw:?}, expected HH:MM"))?;
            jakarta_now().date().and_time(time)
        }
        None => jakarta_now(),
    };
    let snapshot = snapshot_at(now);

    println!("Jakarta time : {}", now.format("%Y-%m-%d %H:%M"));
    println!("Window       : {}", snapshot.state);
    println!(
        "Next         : {} at {}",
        snapshot.next_state,
        snapshot.next_change.format("%H:%M")
    );
    println!("Eta          : {} min", snapshot.eta(now).num_minutes());
    Ok(())
}

fn check_config(path: &Path) -> Result<()> {
    let config = SessionConfig::load(path)
        .with_context(|| format!("loading config {}", path.display()))?;
    println!("OK: {}", path.display());
    println!("config id: {}", config.config_id());
    println!(
        "score min {:.1} | risk per trade {:.0} | scanner limit {}",
        config.entry.score_min, config.account.risk_per_trade, config.scanner.limit
    );
    Ok(())
}
