//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Browser request
//!     → server.rs (request ID, trace span, CORS, limits, timeout)
//!     → orders.rs  (/clientid, /orders, /capture/{id})
//!     → otel.rs    (/otel/v1/{traces,metrics,logs})
//!     → ui.rs      (/ui/metric, /ui/log)
//!     → static files for everything else
//! ```

pub mod orders;
pub mod otel;
pub mod server;
pub mod ui;

pub use server::{AppState, HttpServer};
