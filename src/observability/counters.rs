//! Business counters exported to the collector.
//!
//! A `MetricsRegistry` is created once at startup from the OpenTelemetry
//! `Meter` and shared by `Arc`. Each counter is a monotonic `f64` sum; the SDK
//! keeps one series per distinct attribute set and the periodic reader ships
//! cumulative values to the metrics endpoint.

use std::collections::BTreeMap;

use opentelemetry::metrics::Meter;
use opentelemetry::{global, KeyValue};

pub const ORDERS_CREATED: &str = "orders.created";
pub const ORDERS_CAPTURED: &str = "orders.captured";
pub const UI_EVENTS: &str = "ui.events";

/// Instrumentation scope of the business counters.
pub const METER_NAME: &str = "checkout-gateway";

/// Attribute set of a series. Ordered so equal sets compare equally.
pub type Attributes = BTreeMap<String, String>;

/// A monotonically increasing named counter.
pub struct Counter {
    name: &'static str,
    inner: opentelemetry::metrics::Counter<f64>,
}

impl Counter {
    fn new(meter: &Meter, name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            inner: meter.f64_counter(name).with_description(description).build(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Add `delta` to the series identified by `attributes`.
    ///
    /// Negative and non-finite deltas are dropped. Returns whether the delta was applied.
    pub fn add(&self, delta: f64, attributes: Attributes) -> bool {
        if !delta.is_finite() || delta < 0.0 {
            tracing::warn!(counter = self.name, delta, "Rejected non-monotonic counter delta");
            return false;
        }
        self.inner.add(delta, &key_values(attributes));
        true
    }
}

fn key_values(attributes: Attributes) -> Vec<KeyValue> {
    attributes
        .into_iter()
        .map(|(k, v)| KeyValue::new(k, v))
        .collect()
}

/// Process-wide set of counters.
pub struct MetricsRegistry {
    orders_created: Counter,
    orders_captured: Counter,
    ui_events: Counter,
}

impl MetricsRegistry {
    pub fn new(meter: &Meter) -> Self {
        Self {
            orders_created: Counter::new(meter, ORDERS_CREATED, "Number of PayPal orders created"),
            orders_captured: Counter::new(meter, ORDERS_CAPTURED, "Number of PayPal orders captured"),
            ui_events: Counter::new(meter, UI_EVENTS, "Generic UI events/metrics from browser"),
        }
    }

    pub fn orders_created(&self) -> &Counter {
        &self.orders_created
    }

    pub fn orders_captured(&self) -> &Counter {
        &self.orders_captured
    }

    pub fn ui_events(&self) -> &Counter {
        &self.ui_events
    }
}

/// Counters on the global meter provider; a no-op until one is installed.
impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new(&global::meter(METER_NAME))
    }
}

/// Build an attribute set from string pairs.
pub fn attributes<K, V, I>(pairs: I) -> Attributes
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Flatten a JSON object into string attributes.
///
/// Strings are taken as-is, everything else uses its JSON text. Non-objects yield
/// an empty set.
pub fn attributes_from_json(value: &serde_json::Value) -> Attributes {
    let Some(map) = value.as_object() else {
        return Attributes::new();
    };
    map.iter()
        .map(|(k, v)| {
            let v = match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), v)
        })
        .collect()
}
