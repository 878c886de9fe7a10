//! Outbound transport to the collector.
//!
//! Both the browser relay and the gateway's own exporters go through
//! `TelemetryExporter`, so tests can swap the network out.

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

/// Collector reply, passed back untouched.
#[derive(Debug, Clone)]
pub struct ExportResponse {
    pub status: u16,
    pub body: Bytes,
    pub content_type: Option<String>,
}

impl ExportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure to get any reply from the collector.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("collector request timed out after {0} seconds")]
    Timeout(u64),

    #[error("collector request failed: {0}")]
    Transport(String),
}

/// Something that can POST a payload to a collector endpoint.
#[async_trait]
pub trait TelemetryExporter: Send + Sync {
    async fn export(
        &self,
        endpoint: &str,
        content_type: &str,
        payload: Bytes,
    ) -> Result<ExportResponse, ExportError>;
}

/// `reqwest`-backed exporter with a fixed per-call timeout.
#[derive(Clone)]
pub struct HttpExporter {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpExporter {
    pub fn new(timeout: Duration) -> Result<Self, ExportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExportError::Transport(e.to_string()))?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl TelemetryExporter for HttpExporter {
    async fn export(
        &self,
        endpoint: &str,
        content_type: &str,
        payload: Bytes,
    ) -> Result<ExportResponse, ExportError> {
        let map_err = |e: reqwest::Error| {
            if e.is_timeout() {
                ExportError::Timeout(self.timeout.as_secs())
            } else {
                ExportError::Transport(e.to_string())
            }
        };

        let response = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, content_type)
            .body(payload)
            .send()
            .await
            .map_err(map_err)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(map_err)?;

        Ok(ExportResponse {
            status,
            body,
            content_type,
        })
    }
}
