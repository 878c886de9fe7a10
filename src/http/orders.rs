//! Order lifecycle endpoints.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::http::server::AppState;
use crate::orders::{CreateOrderRequest, OrderError, ProcessorError};

pub async fn client_id(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "clientid": state.config.paypal.client_id }))
}

pub async fn create_order(State(state): State<AppState>, body: Bytes) -> Response {
    let request = match parse_create_request(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected malformed order request");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("invalid order request: {}", e) })),
            )
                .into_response();
        }
    };

    match state.gateway.create_order(&request.cart).await {
        Ok(order) => Json(order).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn capture_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Response {
    match state.gateway.capture_order(&order_id).await {
        Ok(order) => Json(order).into_response(),
        Err(e) => e.into_response(),
    }
}

/// An empty body means an empty cart.
fn parse_create_request(body: &[u8]) -> Result<CreateOrderRequest, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CreateOrderRequest::default());
    }
    serde_json::from_slice(body)
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let mut payload = json!({ "error": self.to_string() });
        let status = match self.processor_error() {
            ProcessorError::InvalidOrderId(_) => StatusCode::BAD_REQUEST,
            ProcessorError::Api { body, .. } => {
                if let Ok(details) = serde_json::from_str::<Value>(body) {
                    payload["details"] = details;
                }
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::BAD_GATEWAY,
        };
        (status, Json(payload)).into_response()
    }
}
