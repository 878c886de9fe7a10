//! Payment processor seam.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::orders::types::OrderRequest;

/// Errors returned by an `OrderProcessor`.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// Could not obtain an access token.
    #[error("authentication with processor failed: {0}")]
    Auth(String),

    /// Processor answered with a non-success status.
    #[error("processor returned {status}")]
    Api { status: u16, body: String },

    /// Network failure or timeout.
    #[error("processor request failed: {0}")]
    Transport(String),

    /// Success status but a body that is not JSON.
    #[error("invalid processor response: {0}")]
    InvalidResponse(String),

    /// Order id that cannot name an order, rejected before any call.
    #[error("invalid order id '{0}'")]
    InvalidOrderId(String),
}

impl ProcessorError {
    /// Short variant name, used as the exception type on spans.
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessorError::Auth(_) => "Auth",
            ProcessorError::Api { .. } => "Api",
            ProcessorError::Transport(_) => "Transport",
            ProcessorError::InvalidResponse(_) => "InvalidResponse",
            ProcessorError::InvalidOrderId(_) => "InvalidOrderId",
        }
    }
}

/// The external service owning order lifecycle.
///
/// Implementations return the processor's response body untouched.
#[async_trait]
pub trait OrderProcessor: Send + Sync {
    async fn create_order(&self, request: &OrderRequest) -> Result<Value, ProcessorError>;

    /// Capture a previously approved order, asking for the full representation.
    async fn capture_order(&self, order_id: &str) -> Result<Value, ProcessorError>;
}
