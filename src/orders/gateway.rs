//! Order gateway: observability around processor calls.
//!
//! All business rules belong to the processor. This layer resolves the line
//! item, records spans, logs and counters, and hands the processor body back
//! untouched.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::Instrument;

use crate::observability::counters::{attributes, Attributes, MetricsRegistry};
use crate::observability::metrics;
use crate::orders::processor::{OrderProcessor, ProcessorError};
use crate::orders::types::{resolve_line_item, CartItem, OrderRequest};

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("order creation failed: {0}")]
    Create(#[source] ProcessorError),

    #[error("order capture failed for {order_id}: {source}")]
    Capture {
        order_id: String,
        #[source]
        source: ProcessorError,
    },
}

impl OrderError {
    pub fn processor_error(&self) -> &ProcessorError {
        match self {
            OrderError::Create(e) => e,
            OrderError::Capture { source, .. } => source,
        }
    }
}

pub struct OrderGateway {
    processor: Arc<dyn OrderProcessor>,
    metrics: Arc<MetricsRegistry>,
}

impl OrderGateway {
    pub fn new(processor: Arc<dyn OrderProcessor>, metrics: Arc<MetricsRegistry>) -> Self {
        Self { processor, metrics }
    }

    /// Create a capture-intent order from the first cart item.
    pub async fn create_order(&self, cart: &[CartItem]) -> Result<Value, OrderError> {
        let line = resolve_line_item(cart);
        let span = tracing::info_span!(
            "orders.create",
            order.currency = %line.currency,
            order.amount = %line.amount,
            error = tracing::field::Empty,
            otel.status_code = tracing::field::Empty,
            otel.status_message = tracing::field::Empty,
        );

        async {
            tracing::info!(
                order.currency = %line.currency,
                order.amount = %line.amount,
                "Creating order"
            );

            let request = OrderRequest::capture(&line);
            match self.processor.create_order(&request).await {
                Ok(body) => {
                    metrics::record_processor_call("create", true);
                    self.metrics
                        .orders_created()
                        .add(1.0, attributes([("currency", line.currency.as_str())]));
                    Ok(body)
                }
                Err(e) => {
                    metrics::record_processor_call("create", false);
                    mark_span_failed(&e);
                    log_processor_error(&e, "Order creation failed", None);
                    Err(OrderError::Create(e))
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Capture an approved order.
    pub async fn capture_order(&self, order_id: &str) -> Result<Value, OrderError> {
        let span = tracing::info_span!(
            "orders.capture",
            order.id = %order_id,
            error = tracing::field::Empty,
            otel.status_code = tracing::field::Empty,
            otel.status_message = tracing::field::Empty,
        );

        async {
            match self.processor.capture_order(order_id).await {
                Ok(body) => {
                    metrics::record_processor_call("capture", true);
                    self.metrics.orders_captured().add(1.0, Attributes::new());
                    tracing::info!(order.id = %order_id, "Order captured");
                    Ok(body)
                }
                Err(e) => {
                    metrics::record_processor_call("capture", false);
                    mark_span_failed(&e);
                    log_processor_error(&e, "Order capture failed", Some(order_id));
                    Err(OrderError::Capture {
                        order_id: order_id.to_string(),
                        source: e,
                    })
                }
            }
        }
        .instrument(span)
        .await
    }
}

/// Flag the active span as failed; exported spans carry an ERROR status.
fn mark_span_failed(error: &ProcessorError) {
    let span = tracing::Span::current();
    span.record("error", true);
    span.record("otel.status_code", "ERROR");
    span.record("otel.status_message", error.to_string().as_str());
}

/// Logged inside the order span, so the exception also lands on the trace as a span event.
fn log_processor_error(error: &ProcessorError, message: &str, order_id: Option<&str>) {
    let order_id = order_id.unwrap_or("");
    let kind = error.kind();
    match error {
        ProcessorError::Api { status, body } => tracing::error!(
            order.id = %order_id,
            exception.type = kind,
            exception.message = %error,
            status = *status,
            body = %body,
            "{}", message
        ),
        other => tracing::error!(
            order.id = %order_id,
            exception.type = kind,
            exception.message = %other,
            "{}", message
        ),
    }
}
