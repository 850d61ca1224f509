//! Subcommand handlers.
//!
//! Each handler loads the scenario, runs the core, and returns the text to
//! print so the handlers can be tested without capturing stdout.

use std::path::Path;

use anyhow::{Context, Result};
use captable_core::{simulate_exit, ModelConfig, Money, Scenario, Timeline};
use serde::Serialize;
use tracing::info;

use crate::report::{ExitReport, TimelineReport};

/// Reads and parses a scenario document.
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
    let scenario = Scenario::from_json(&json)
        .with_context(|| format!("Failed to parse scenario file {}", path.display()))?;

    info!(
        scenario = %scenario.name,
        founders = scenario.founders.len(),
        events = scenario.events.len(),
        "Loaded scenario"
    );
    Ok(scenario)
}

fn fold(scenario: &Scenario, config: &ModelConfig) -> Result<Timeline> {
    scenario
        .run(config)
        .with_context(|| format!("Scenario '{}' could not be folded", scenario.name))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunOutput<'a> {
    timeline: &'a Timeline,
    #[serde(skip_serializing_if = "Option::is_none")]
    exit: Option<captable_core::ExitResult>,
}

/// `captable run`: every state, optionally followed by an exit table.
pub fn run(path: &Path, exit: Option<Money>, json: bool, config: &ModelConfig) -> Result<String> {
    let scenario = load_scenario(path)?;
    let timeline = fold(&scenario, config)?;
    let exit = exit
        .map(|valuation| simulate_exit(timeline.final_state(), valuation))
        .transpose()?;

    if json {
        let output = RunOutput {
            timeline: &timeline,
            exit,
        };
        return Ok(serde_json::to_string_pretty(&output)?);
    }

    let mut text = TimelineReport(&timeline).to_string();
    if let Some(exit) = &exit {
        text.push('\n');
        text.push_str(&ExitReport(exit).to_string());
    }
    Ok(text)
}

/// `captable validate`: a one-line verdict, or the first error.
pub fn validate(path: &Path, config: &ModelConfig) -> Result<String> {
    let scenario = load_scenario(path)?;
    let timeline = fold(&scenario, config)?;
    Ok(format!(
        "{}: OK ({} founders, {} events, {} shares after the last event)",
        scenario.name,
        scenario.founders.len(),
        timeline.steps.len(),
        crate::report::group_thousands(timeline.final_state().total_shares)
    ))
}

/// `captable exit`: payouts on the final state.
pub fn exit(path: &Path, valuation: Money, json: bool, config: &ModelConfig) -> Result<String> {
    let scenario = load_scenario(path)?;
    let timeline = fold(&scenario, config)?;
    let result = simulate_exit(timeline.final_state(), valuation)?;

    if json {
        return Ok(serde_json::to_string_pretty(&result)?);
    }
    Ok(ExitReport(&result).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios/seed-to-series-a.json")
    }

    #[test]
    fn test_sample_scenario_validates() {
        let text = validate(&sample(), &ModelConfig::default()).unwrap();
        assert!(text.starts_with("Seed to Series A: OK (2 founders, 4 events"));
    }

    #[test]
    fn test_run_text_and_json() {
        let config = ModelConfig::default();
        let text = run(&sample(), Some(Money::from_major(100_000_000)), false, &config).unwrap();
        assert!(text.starts_with("Initial cap table"));
        assert!(text.contains("#4 Series A"));
        assert!(text.contains("Exit at $100,000,000.00"));

        let json = run(&sample(), None, true, &config).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["timeline"]["steps"].as_array().unwrap().len(), 4);
        assert!(value.get("exit").is_none());
    }

    #[test]
    fn test_exit_json() {
        let json = exit(&sample(), Money::from_major(50_000_000), true, &ModelConfig::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["exitValuation"], 5_000_000_000i64);
        assert_eq!(value["founders"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = validate(Path::new("/nonexistent/scenario.json"), &ModelConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to read scenario file"));
    }
}
