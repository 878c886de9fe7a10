//! Same-origin relay for browser telemetry.
//!
//! Payloads are forwarded byte-for-byte. Whatever the collector answers is
//! handed back; if it cannot be reached at all the caller gets a synthetic 500
//! carrying the error text.

use std::sync::Arc;

use axum::body::Bytes;

use crate::config::TelemetryConfig;
use crate::observability::metrics;
use crate::telemetry::exporter::TelemetryExporter;

/// Content type sent to the collector for every relayed batch.
pub const RELAY_CONTENT_TYPE: &str = "application/json";

/// OTLP signal kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Traces,
    Metrics,
    Logs,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Traces => "traces",
            Signal::Metrics => "metrics",
            Signal::Logs => "logs",
        }
    }

    /// OTLP/HTTP path suffix.
    pub fn path(&self) -> &'static str {
        match self {
            Signal::Traces => "/v1/traces",
            Signal::Metrics => "/v1/metrics",
            Signal::Logs => "/v1/logs",
        }
    }
}

/// One collector endpoint per signal.
#[derive(Debug, Clone)]
pub struct RelayTargets {
    pub traces: String,
    pub metrics: String,
    pub logs: String,
}

impl RelayTargets {
    pub fn from_config(config: &TelemetryConfig) -> Self {
        Self {
            traces: config.relay_traces_url(),
            metrics: config.metrics_url(),
            logs: config.logs_url(),
        }
    }

    pub fn get(&self, signal: Signal) -> &str {
        match signal {
            Signal::Traces => &self.traces,
            Signal::Metrics => &self.metrics,
            Signal::Logs => &self.logs,
        }
    }
}

/// What the browser gets back.
#[derive(Debug, Clone)]
pub struct RelayResponse {
    pub status: u16,
    pub body: Bytes,
    pub content_type: String,
}

pub struct TelemetryRelay {
    exporter: Arc<dyn TelemetryExporter>,
    targets: RelayTargets,
}

impl TelemetryRelay {
    pub fn new(exporter: Arc<dyn TelemetryExporter>, targets: RelayTargets) -> Self {
        Self { exporter, targets }
    }

    /// Forward one batch. Never fails; collector errors become a 500 response.
    pub async fn relay(&self, signal: Signal, payload: Bytes) -> RelayResponse {
        let target = self.targets.get(signal);
        let size = payload.len();

        let response = match self.exporter.export(target, RELAY_CONTENT_TYPE, payload).await {
            Ok(reply) => {
                tracing::debug!(
                    signal = signal.as_str(),
                    target = %target,
                    bytes = size,
                    status = reply.status,
                    "Relayed telemetry batch"
                );
                RelayResponse {
                    status: reply.status,
                    body: reply.body,
                    content_type: reply
                        .content_type
                        .unwrap_or_else(|| RELAY_CONTENT_TYPE.to_string()),
                }
            }
            Err(e) => {
                tracing::error!(
                    signal = signal.as_str(),
                    target = %target,
                    error = %e,
                    "OTLP relay failed"
                );
                RelayResponse {
                    status: 500,
                    body: Bytes::from(e.to_string()),
                    content_type: "text/plain; charset=utf-8".to_string(),
                }
            }
        };

        metrics::record_relay(signal.as_str(), response.status);
        response
    }
}
