//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the checkout gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Payment processor credentials and endpoint.
    pub paypal: PaypalConfig,

    /// Collector endpoints and export settings.
    pub telemetry: TelemetryConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Static front-end hosting.
    pub static_files: StaticFilesConfig,

    /// Browser helper endpoints (`/ui/*`).
    pub ui: UiConfig,

    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// PayPal REST API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PaypalConfig {
    /// Public client id, also handed to the browser via `/clientid`.
    pub client_id: String,

    /// OAuth client secret. Never leaves the server.
    pub client_secret: String,

    /// API base URL (sandbox by default).
    pub base_url: String,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for PaypalConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            base_url: "https://api-m.sandbox.paypal.com".to_string(),
            timeout_secs: 30,
        }
    }
}

/// OTLP collector configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Collector base URL; per-signal paths are appended to it.
    pub collector_endpoint: String,

    /// Override for the traces endpoint.
    pub traces_endpoint: Option<String>,

    /// Override for the metrics endpoint.
    pub metrics_endpoint: Option<String>,

    /// Override for the logs endpoint.
    pub logs_endpoint: Option<String>,

    /// Where browser trace batches are relayed. Falls back to the traces endpoint.
    pub proxy_traces_target: Option<String>,

    /// `service.name` resource attribute.
    pub service_name: String,

    /// `deployment.environment` resource attribute.
    pub deployment_environment: String,

    /// Relay request timeout in seconds.
    pub relay_timeout_secs: u64,

    /// Export the gateway's spans, counters and logs to the collector.
    pub export_enabled: bool,

    /// Counter export interval in seconds.
    pub metrics_export_interval_secs: u64,

    /// Log batch flush interval in seconds.
    pub logs_flush_interval_secs: u64,

    /// Maximum log records per export batch.
    pub logs_batch_size: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            collector_endpoint: "http://localhost:4318".to_string(),
            traces_endpoint: None,
            metrics_endpoint: None,
            logs_endpoint: None,
            proxy_traces_target: None,
            service_name: "checkout-gateway".to_string(),
            deployment_environment: "dev".to_string(),
            relay_timeout_secs: 10,
            export_enabled: true,
            metrics_export_interval_secs: 60,
            logs_flush_interval_secs: 5,
            logs_batch_size: 512,
        }
    }
}

impl TelemetryConfig {
    /// Resolved traces endpoint.
    pub fn traces_url(&self) -> String {
        self.signal_url(self.traces_endpoint.as_deref(), "/v1/traces")
    }

    /// Resolved metrics endpoint.
    pub fn metrics_url(&self) -> String {
        self.signal_url(self.metrics_endpoint.as_deref(), "/v1/metrics")
    }

    /// Resolved logs endpoint.
    pub fn logs_url(&self) -> String {
        self.signal_url(self.logs_endpoint.as_deref(), "/v1/logs")
    }

    /// Target for relayed browser traces.
    pub fn relay_traces_url(&self) -> String {
        self.proxy_traces_target
            .clone()
            .unwrap_or_else(|| self.traces_url())
    }

    fn signal_url(&self, over: Option<&str>, suffix: &str) -> String {
        match over {
            Some(url) => url.to_string(),
            None => format!("{}{}", self.collector_endpoint.trim_end_matches('/'), suffix),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Prometheus endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Static file hosting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    pub enabled: bool,

    /// Directory served as the site root.
    pub root: String,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            root: "public".to_string(),
        }
    }
}

/// How `/ui/metric` maps incoming events onto counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum UiMetricMode {
    /// Every event lands on `ui.events`, tagged with its name.
    #[default]
    Events,
    /// Names matching `orders.created`/`orders.captured` feed those counters;
    /// anything else is only logged.
    NamedCounters,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct UiConfig {
    pub metric_mode: UiMetricMode,
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Allow any origin (with credentials) to call the API.
    pub cors_permissive: bool,
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cors_permissive: true,
            max_body_size: 4 * 1024 * 1024, // 4MB, OTLP batches can be large
        }
    }
}
