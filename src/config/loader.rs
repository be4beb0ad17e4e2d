//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::NodeConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `listener.port`.
pub const PORT_ENV: &str = "PORT";

/// Environment variable overriding `load.poll_interval_ms`.
pub const POLL_INTERVAL_ENV: &str = "LOAD_POLL_INTERVAL_MS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<NodeConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: NodeConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build the effective configuration: optional file, then process
/// environment overrides, then validation.
pub fn load(path: Option<&Path>) -> Result<NodeConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str::<NodeConfig>(&content)?
        }
        None => NodeConfig::default(),
    };

    apply_overrides(&mut config, |var| std::env::var(var).ok())
        .map_err(|e| ConfigError::Validation(vec![e]))?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment-style overrides read through `lookup`.
pub fn apply_overrides<F>(config: &mut NodeConfig, lookup: F) -> Result<(), ValidationError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(PORT_ENV) {
        config.listener.port =
            value
                .trim()
                .parse()
                .map_err(|_| ValidationError::InvalidOverride {
                    var: PORT_ENV,
                    value: value.clone(),
                })?;
    }

    if let Some(value) = lookup(POLL_INTERVAL_ENV) {
        config.load.poll_interval_ms =
            value
                .trim()
                .parse()
                .map_err(|_| ValidationError::InvalidOverride {
                    var: POLL_INTERVAL_ENV,
                    value: value.clone(),
                })?;
    }

    Ok(())
}
