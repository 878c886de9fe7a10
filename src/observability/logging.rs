//! Structured logging.
//!
//! `RUST_LOG` wins over the configured level. Output is human-readable or
//! JSON lines; when telemetry export is on, spans and events are also bridged
//! into the OpenTelemetry providers.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::{LogFormat, ObservabilityConfig};
use crate::telemetry::TelemetryProviders;

/// Install the global subscriber.
pub fn init_logging(
    config: &ObservabilityConfig,
    telemetry: Option<&TelemetryProviders>,
) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(&config.log_level).into());

    // the env filter disables events for every layer, wherever it sits
    let registry = tracing_subscriber::registry()
        .with(telemetry.map(|t| t.layer::<Registry>()))
        .with(filter);

    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    }
}

fn default_filter(level: &str) -> String {
    format!("checkout_gateway={level},ui={level},tower_http=info,{level}", level = level)
}
