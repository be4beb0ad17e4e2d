//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals and timeouts > 0)
//! - Validate addresses and URLs that are parsed later at startup
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: NodeConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::NodeConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.host must not be empty")]
    EmptyHost,

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("metadata.base_url must be an http(s) URL, got {0:?}")]
    InvalidBaseUrl(String),

    #[error("observability.log_level {0:?} is not one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("environment variable {var} has invalid value {value:?}")]
    InvalidOverride { var: &'static str, value: String },
}

/// Check a configuration, collecting every violation.
pub fn validate_config(config: &NodeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }

    if config.load.poll_interval_ms == 0 {
        errors.push(ValidationError::Zero {
            field: "load.poll_interval_ms",
        });
    }

    if config.metadata.timeout_ms == 0 {
        errors.push(ValidationError::Zero {
            field: "metadata.timeout_ms",
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "timeouts.request_secs",
        });
    }

    let base_url = &config.metadata.base_url;
    if config.metadata.enabled
        && !(base_url.starts_with("http://") || base_url.starts_with("https://"))
    {
        errors.push(ValidationError::InvalidBaseUrl(base_url.clone()));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&NodeConfig::default()), Ok(()));
    }

    #[test]
    fn collects_every_error() {
        let mut config = NodeConfig::default();
        config.listener.host = " ".to_string();
        config.load.poll_interval_ms = 0;
        config.timeouts.request_secs = 0;
        config.metadata.base_url = "metadata.local".to_string();
        config.observability.log_level = "loud".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::EmptyHost));
        assert!(errors.contains(&ValidationError::Zero {
            field: "load.poll_interval_ms"
        }));
        assert!(errors.contains(&ValidationError::InvalidLogLevel("loud".to_string())));
    }

    #[test]
    fn disabled_metadata_skips_url_check() {
        let mut config = NodeConfig::default();
        config.metadata.enabled = false;
        config.metadata.base_url = String::new();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn metrics_address_checked_only_when_enabled() {
        let mut config = NodeConfig::default();
        config.observability.metrics_address = "nowhere".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::InvalidMetricsAddress("nowhere".to_string())]
        );
    }
}
