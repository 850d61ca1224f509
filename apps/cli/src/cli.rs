//! Command-line argument parsing.

use std::path::PathBuf;

use captable_core::Money;
use clap::{Parser, Subcommand};

/// Cap table dilution engine.
#[derive(Parser, Debug, Clone)]
#[command(name = "captable")]
#[command(about = "Fold financing events over a cap table and simulate exits")]
#[command(version)]
pub struct Cli {
    /// TOML file overriding model settings.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides RUST_LOG.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fold every event and print the cap table after each one.
    Run {
        /// Scenario JSON document.
        scenario: PathBuf,

        /// Also simulate an exit at this valuation on the final state.
        #[arg(long, value_parser = parse_amount)]
        exit: Option<Money>,

        /// Print the timeline as JSON instead of tables.
        #[arg(long)]
        json: bool,
    },

    /// Check a scenario document without printing tables.
    Validate {
        /// Scenario JSON document.
        scenario: PathBuf,
    },

    /// Simulate an exit on the final state of a scenario.
    Exit {
        /// Scenario JSON document.
        scenario: PathBuf,

        /// Company sale price in currency units (e.g. 50000000 or 50,000,000).
        #[arg(long, value_parser = parse_amount)]
        valuation: Money,

        /// Print the payouts as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Parses a currency amount in major units, accepting `$`, `,` and `_`.
pub fn parse_amount(raw: &str) -> Result<Money, String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '_'))
        .collect();

    let value: f64 = cleaned
        .parse()
        .map_err(|_| format!("'{raw}' is not an amount"))?;
    if !value.is_finite() {
        return Err(format!("'{raw}' is not an amount"));
    }

    Ok(Money::from_major_f64(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_defaults() {
        let cli = Cli::parse_from(["captable", "run", "seed.json"]);
        match cli.command {
            Command::Run { scenario, exit, json } => {
                assert_eq!(scenario, PathBuf::from("seed.json"));
                assert!(exit.is_none());
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(cli.config.is_none());
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn test_exit_valuation_and_globals() {
        let cli = Cli::parse_from([
            "captable",
            "exit",
            "seed.json",
            "--valuation",
            "$50,000,000",
            "--config",
            "model.toml",
            "--log-level",
            "debug",
        ]);
        match cli.command {
            Command::Exit { valuation, json, .. } => {
                assert_eq!(valuation, Money::from_major(50_000_000));
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.config, Some(PathBuf::from("model.toml")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_exit_requires_valuation() {
        assert!(Cli::try_parse_from(["captable", "exit", "seed.json"]).is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1_000_000").unwrap(), Money::from_major(1_000_000));
        assert_eq!(parse_amount("1234.56").unwrap(), Money::from_cents(123_456));
        assert!(parse_amount("ten million").is_err());
        assert!(parse_amount("inf").is_err());
    }
}
