//! # captable: Command-Line Front End
//!
//! Loads a scenario document, folds its events with captable-core and
//! prints the cap table after every event.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CLI Startup                                      │
//! │                                                                         │
//! │  1. Parse arguments (clap) ───────────────────────────────────────────► │
//! │                                                                         │
//! │  2. Initialize Tracing ───────────────────────────────────────────────► │
//! │     • tracing-subscriber with env filter, written to stderr             │
//! │     • Default: info,captable=debug; RUST_LOG or --log-level override    │
//! │                                                                         │
//! │  3. Load Settings ────────────────────────────────────────────────────► │
//! │     • defaults → --config TOML → CAPTABLE_* env                         │
//! │                                                                         │
//! │  4. Dispatch ─────────────────────────────────────────────────────────► │
//! │     • run / validate / exit, output to stdout                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cli;
mod commands;
mod report;
mod settings;

use anyhow::Result;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.log_level.as_deref());

    let config = settings::load(cli.config.as_deref())?;
    debug!(command = ?cli.command, "Dispatching command");

    let output = match &cli.command {
        Command::Run { scenario, exit, json } => commands::run(scenario, *exit, *json, &config)?,
        Command::Validate { scenario } => commands::validate(scenario, &config)?,
        Command::Exit {
            scenario,
            valuation,
            json,
        } => commands::exit(scenario, *valuation, *json, &config)?,
    };

    println!("{output}");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `--log-level debug` - Wins over everything else
/// - `RUST_LOG=trace` - Show every pipeline step of every round
/// - Default - `info,captable=debug`
fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,captable=debug")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
