//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and the order gateway produce:
//!     → logging.rs (structured log events; spans and logs optionally exported via OTLP)
//!     → counters.rs (business counters, exported to the collector)
//!     → metrics.rs (operational counters/histograms, Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every request span
//! - Business counters are OpenTelemetry SDK instruments; the SDK aggregates them
//! - Nothing here can fail a request

pub mod counters;
pub mod logging;
pub mod metrics;

pub use counters::{Attributes, Counter, MetricsRegistry};
