//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (.env + process env)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults so the gateway runs from environment alone
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env_overrides, load, ConfigError};
pub use schema::{
    GatewayConfig, ListenerConfig, LogFormat, ObservabilityConfig, PaypalConfig,
    SecurityConfig, StaticFilesConfig, TelemetryConfig, TimeoutConfig, UiConfig, UiMetricMode,
};
