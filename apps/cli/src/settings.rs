//! Model settings loading.
//!
//! Settings are layered with the `config` crate, highest priority last:
//!
//! ```text
//! ModelConfig::default()  ◄── built-in defaults
//!        │
//!        ▼
//! --config model.toml     ◄── optional file
//!        │
//!        ▼
//! CAPTABLE_* env vars     ◄── e.g. CAPTABLE_INITIAL_TOTAL_SHARES=1000000
//! ```
//!
//! Keys are snake_case in both the file and the environment:
//! `initial_total_shares`, `initialization_tolerance`,
//! `reconciliation_tolerance`, `reference_price_fallback`, `max_founders`.

use std::path::{Path, PathBuf};

use captable_core::{ModelConfig, ValidationError};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "CAPTABLE";

/// Overrides read from the file and the environment.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Overrides {
    initial_total_shares: Option<u64>,
    initialization_tolerance: Option<f64>,
    reconciliation_tolerance: Option<f64>,
    reference_price_fallback: Option<f64>,
    max_founders: Option<usize>,
}

impl Overrides {
    fn apply(self, mut config: ModelConfig) -> ModelConfig {
        if let Some(v) = self.initial_total_shares {
            config.initial_total_shares = v;
        }
        if let Some(v) = self.initialization_tolerance {
            config.initialization_tolerance = v;
        }
        if let Some(v) = self.reconciliation_tolerance {
            config.reconciliation_tolerance = v;
        }
        if let Some(v) = self.reference_price_fallback {
            config.reference_price_fallback = v;
        }
        if let Some(v) = self.max_founders {
            config.max_founders = v;
        }
        config
    }
}

/// Loads the model configuration from defaults, `path` and `CAPTABLE_*`.
pub fn load(path: Option<&Path>) -> Result<ModelConfig, ConfigError> {
    load_with_env(path, Environment::with_prefix(ENV_PREFIX).try_parsing(true))
}

fn load_with_env(path: Option<&Path>, env: Environment) -> Result<ModelConfig, ConfigError> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }
        builder = builder.add_source(File::from(path).format(FileFormat::Toml));
    }

    let overrides: Overrides = builder.add_source(env).build()?.try_deserialize()?;
    let config = overrides.apply(ModelConfig::default());
    config.validate()?;

    tracing::debug!(?config, "Loaded model settings");
    Ok(config)
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Failed to read settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid settings: {0}")]
    Invalid(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .source(Some(map))
    }

    fn write_toml(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("captable-{}-{name}.toml", std::process::id()));
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_sources() {
        let config = load_with_env(None, env(&[])).unwrap();
        assert_eq!(config, ModelConfig::default());
    }

    #[test]
    fn test_file_then_env_priority() {
        let path = write_toml(
            "priority",
            "initial_total_shares = 1000000\nreference_price_fallback = 0.25\n",
        );

        let config = load_with_env(
            Some(&path),
            env(&[("CAPTABLE_INITIAL_TOTAL_SHARES", "2000000")]),
        )
        .unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.initial_total_shares, 2_000_000);
        assert_eq!(config.reference_price_fallback, 0.25);
        assert_eq!(config.max_founders, ModelConfig::default().max_founders);
    }

    #[test]
    fn test_missing_file() {
        let err = load_with_env(Some(Path::new("/nonexistent/captable.toml")), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile(_)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = load_with_env(None, env(&[("CAPTABLE_INITIAL_TOTAL_SHARES", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
