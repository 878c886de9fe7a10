//! OTLP relay endpoints (`/otel/v1/*`).

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::server::AppState;
use crate::telemetry::relay::{RelayResponse, Signal, RELAY_CONTENT_TYPE};

pub async fn relay_traces(State(state): State<AppState>, body: Bytes) -> RelayResponse {
    state.relay.relay(Signal::Traces, body).await
}

pub async fn relay_metrics(State(state): State<AppState>, body: Bytes) -> RelayResponse {
    state.relay.relay(Signal::Metrics, body).await
}

pub async fn relay_logs(State(state): State<AppState>, body: Bytes) -> RelayResponse {
    state.relay.relay(Signal::Logs, body).await
}

impl IntoResponse for RelayResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::BAD_GATEWAY);
        let content_type = HeaderValue::from_str(&self.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static(RELAY_CONTENT_TYPE));

        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;
        response.headers_mut().insert(header::CONTENT_TYPE, content_type);
        response
    }
}
