//! Browser helper endpoints (`/ui/metric`, `/ui/log`).
//!
//! Best effort: bodies that fail to parse are treated as `{}` and both
//! endpoints always answer 204.

use axum::{body::Bytes, extract::State, http::StatusCode};
use serde_json::{json, Value};

use crate::config::UiMetricMode;
use crate::http::server::AppState;
use crate::observability::counters::{
    attributes_from_json, Attributes, MetricsRegistry, ORDERS_CAPTURED, ORDERS_CREATED,
};
use crate::telemetry::otlp::UI_TARGET;

const DEFAULT_EVENT_NAME: &str = "ui.event";

/// A metric event posted by the browser.
#[derive(Debug, Clone, PartialEq)]
pub struct UiMetric {
    pub name: String,
    pub value: f64,
    pub attrs: Attributes,
}

impl UiMetric {
    pub fn from_json(payload: &Value) -> Self {
        let name = payload
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_EVENT_NAME)
            .to_string();
        let value = match payload.get("value") {
            None | Some(Value::Null) => 1.0,
            Some(Value::Number(n)) => n.as_f64().unwrap_or(1.0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %s, "Non-numeric UI metric value, counting 1");
                1.0
            }),
            Some(other) => {
                tracing::warn!(value = %other, "Non-numeric UI metric value, counting 1");
                1.0
            }
        };
        let attrs = payload
            .get("attrs")
            .map(attributes_from_json)
            .unwrap_or_default();

        Self { name, value, attrs }
    }
}

/// Apply a UI metric to the registry. Returns the counter that received it.
pub fn record_ui_metric(
    registry: &MetricsRegistry,
    mode: UiMetricMode,
    metric: &UiMetric,
) -> Option<&'static str> {
    let counter = match mode {
        UiMetricMode::Events => {
            let mut attrs = metric.attrs.clone();
            attrs.insert("name".to_string(), metric.name.clone());
            let counter = registry.ui_events();
            return counter.add(metric.value, attrs).then(|| counter.name());
        }
        UiMetricMode::NamedCounters => match metric.name.as_str() {
            ORDERS_CREATED => registry.orders_created(),
            ORDERS_CAPTURED => registry.orders_captured(),
            _ => return None,
        },
    };
    counter
        .add(metric.value, metric.attrs.clone())
        .then(|| counter.name())
}

/// Severity a UI log line is emitted at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiLogLevel {
    Info,
    Warning,
    Error,
}

impl UiLogLevel {
    /// Case-insensitive; anything unrecognised is `Info`.
    pub fn parse(level: &str) -> Self {
        match level.trim().to_ascii_lowercase().as_str() {
            "error" => UiLogLevel::Error,
            "warn" | "warning" => UiLogLevel::Warning,
            _ => UiLogLevel::Info,
        }
    }
}

/// A log line posted by the browser.
#[derive(Debug, Clone, PartialEq)]
pub struct UiLog {
    pub level: UiLogLevel,
    pub message: String,
    pub extra: Value,
}

impl UiLog {
    pub fn from_json(payload: &Value) -> Self {
        let level = match payload.get("level") {
            Some(Value::String(s)) => UiLogLevel::parse(s),
            _ => UiLogLevel::Info,
        };
        let message = payload
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let extra = payload
            .get("extra")
            .filter(|v| v.is_object())
            .cloned()
            .unwrap_or_else(|| json!({}));

        Self {
            level,
            message,
            extra,
        }
    }

    pub fn emit(&self) {
        let extra = &self.extra;
        match self.level {
            UiLogLevel::Error => tracing::error!(target: UI_TARGET, %extra, "UI: {}", self.message),
            UiLogLevel::Warning => tracing::warn!(target: UI_TARGET, %extra, "UI: {}", self.message),
            UiLogLevel::Info => tracing::info!(target: UI_TARGET, %extra, "UI: {}", self.message),
        }
    }
}

fn lenient_json(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap_or_else(|_| json!({}))
}

pub async fn ui_metric(State(state): State<AppState>, body: Bytes) -> StatusCode {
    let metric = UiMetric::from_json(&lenient_json(&body));
    let counter = record_ui_metric(&state.metrics, state.config.ui.metric_mode, &metric);

    tracing::info!(
        target: UI_TARGET,
        name = %metric.name,
        value = metric.value,
        attrs = ?metric.attrs,
        counter = counter.unwrap_or("none"),
        "UI metric"
    );
    StatusCode::NO_CONTENT
}

pub async fn ui_log(body: Bytes) -> StatusCode {
    UiLog::from_json(&lenient_json(&body)).emit();
    StatusCode::NO_CONTENT
}
