//! Collector-facing telemetry subsystem.
//!
//! # Data Flow
//! ```text
//! Browser OTLP batch
//!     → relay.rs (same-origin pass-through, one target per signal)
//!     → exporter.rs (HTTP POST to collector)
//!
//! Gateway's own signals (otlp.rs):
//!     tracing spans   → tracing-opentelemetry → batch span processor → /v1/traces
//!     tracing events  → appender bridge       → batch log processor  → /v1/logs
//!     MetricsRegistry → SDK meter             → periodic reader      → /v1/metrics
//! ```
//!
//! # Design Decisions
//! - Relay never inspects payloads and never retries
//! - Export failures are logged and dropped; telemetry never blocks requests

pub mod exporter;
pub mod otlp;
pub mod relay;

pub use exporter::{ExportError, ExportResponse, HttpExporter, TelemetryExporter};
pub use otlp::{TelemetryError, TelemetryProviders};
pub use relay::{RelayResponse, RelayTargets, Signal, TelemetryRelay};
