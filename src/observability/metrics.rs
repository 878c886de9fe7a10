//! Operational metrics and Prometheus exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, route, status
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_relay_total` (counter): relayed batches by signal and status
//! - `gateway_processor_calls_total` (counter): processor calls by operation, outcome
//!
//! These are for scraping the gateway itself. Business counters exported to
//! the collector live in `counters.rs`.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the global recorder and start the scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Prometheus metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install Prometheus recorder"),
    }
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    counter!("gateway_requests_total", &labels[..]).increment(1);
    histogram!("gateway_request_duration_seconds", &labels[..]).record(start.elapsed().as_secs_f64());
}

pub fn record_relay(signal: &str, status: u16) {
    counter!(
        "gateway_relay_total",
        "signal" => signal.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_processor_call(operation: &'static str, success: bool) {
    let outcome = if success { "success" } else { "error" };
    counter!(
        "gateway_processor_calls_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}
