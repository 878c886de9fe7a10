//! Checkout gateway library.
//!
//! Same-origin backend for a PayPal checkout front end: order create/capture
//! delegated to PayPal, browser telemetry relayed to an OTLP collector, and
//! business counters exported alongside.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod orders;
pub mod telemetry;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
