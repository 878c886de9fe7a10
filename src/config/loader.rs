//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

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

/// Build the runtime configuration: optional file, then environment, then validation.
pub fn load(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    let mut errors = apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    if let Err(invalid) = validate_config(&config) {
        errors.extend(invalid);
    }
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors));
    }

    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// Empty values are ignored so an exported-but-blank variable does not wipe a
/// file setting. Values that cannot be applied are returned as errors.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Vec<ValidationError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut errors = Vec::new();
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("PAYPAL_CLIENT_ID") {
        config.paypal.client_id = v;
    }
    if let Some(v) = get("PAYPAL_CLIENT_SECRET") {
        config.paypal.client_secret = v;
    }
    if let Some(v) = get("PAYPAL_BASE_URL") {
        config.paypal.base_url = v;
    }
    if let Some(v) = get("DEPLOY_ENV") {
        config.telemetry.deployment_environment = v;
    }
    if let Some(v) = get("OTEL_SERVICE_NAME") {
        config.telemetry.service_name = v;
    }
    if let Some(v) = get("OTEL_EXPORTER_OTLP_ENDPOINT") {
        config.telemetry.collector_endpoint = v;
    }
    if let Some(v) = get("OTEL_EXPORTER_OTLP_TRACES_ENDPOINT") {
        config.telemetry.traces_endpoint = Some(v);
    }
    if let Some(v) = get("OTEL_EXPORTER_OTLP_METRICS_ENDPOINT") {
        config.telemetry.metrics_endpoint = Some(v);
    }
    if let Some(v) = get("OTEL_EXPORTER_OTLP_LOGS_ENDPOINT") {
        config.telemetry.logs_endpoint = Some(v);
    }
    if let Some(v) = get("OTEL_COLLECTOR_PROXY_TARGET") {
        config.telemetry.proxy_traces_target = Some(v);
    }
    if let Some(v) = get("STATIC_ROOT") {
        config.static_files.root = v;
    }
    if let Some(port) = get("PORT") {
        match port.parse::<u16>() {
            Ok(port) => {
                let host = config
                    .listener
                    .bind_address
                    .rsplit_once(':')
                    .map(|(host, _)| host.to_string())
                    .unwrap_or_else(|| "0.0.0.0".to_string());
                config.listener.bind_address = format!("{}:{}", host, port);
            }
            Err(_) => errors.push(ValidationError::InvalidPort {
                field: "PORT",
                value: port,
            }),
        }
    }
    errors
}
