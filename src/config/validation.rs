//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. All errors are collected
//! rather than stopping at the first one.

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: invalid URL '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field}: invalid port '{value}'")]
    InvalidPort { field: &'static str, value: String },
}

/// Validate a loaded configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    let telemetry = &config.telemetry;
    let urls = [
        ("paypal.base_url", config.paypal.base_url.clone()),
        ("telemetry.traces_endpoint", telemetry.traces_url()),
        ("telemetry.metrics_endpoint", telemetry.metrics_url()),
        ("telemetry.logs_endpoint", telemetry.logs_url()),
        ("telemetry.proxy_traces_target", telemetry.relay_traces_url()),
    ];
    for (field, value) in urls {
        if !is_http_url(&value) {
            errors.push(ValidationError::InvalidUrl { field, value });
        }
    }

    let positives = [
        ("paypal.timeout_secs", config.paypal.timeout_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("telemetry.relay_timeout_secs", telemetry.relay_timeout_secs),
        ("telemetry.metrics_export_interval_secs", telemetry.metrics_export_interval_secs),
        ("telemetry.logs_flush_interval_secs", telemetry.logs_flush_interval_secs),
        ("telemetry.logs_batch_size", telemetry.logs_batch_size as u64),
    ];
    for (field, value) in positives {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(value: &str) -> bool {
    Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".to_string();
        config.telemetry.collector_endpoint = "collector:4318".to_string();
        config.telemetry.relay_timeout_secs = 0;

        let errors = validate_config(&config).unwrap_err();

        assert!(errors.contains(&ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: "not-an-address".to_string(),
        }));
        assert!(errors.contains(&ValidationError::Zero {
            field: "telemetry.relay_timeout_secs"
        }));
        // base URL feeds all four derived endpoints
        let bad_urls = errors
            .iter()
            .filter(|e| matches!(e, ValidationError::InvalidUrl { .. }))
            .count();
        assert_eq!(bad_urls, 4);
    }

    #[test]
    fn test_error_display() {
        let err = ValidationError::Zero { field: "paypal.timeout_secs" };
        assert_eq!(err.to_string(), "paypal.timeout_secs must be greater than zero");
    }
}
