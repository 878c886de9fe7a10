//! PayPal Orders v2 client.
//!
//! # Responsibilities
//! - Obtain and cache OAuth2 client-credentials tokens
//! - Create orders and capture them
//! - Surface non-2xx replies with their body for logging
//!
//! No retries: a failed call is reported to the caller as-is.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;
use url::Url;

use crate::config::PaypalConfig;
use crate::orders::processor::{OrderProcessor, ProcessorError};
use crate::orders::types::OrderRequest;

/// Tokens are refreshed this long before PayPal says they expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

const PREFER_REPRESENTATION: &str = "return=representation";

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

pub struct PaypalClient {
    http: reqwest::Client,
    base_url: Url,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<CachedToken>>,
}

impl PaypalClient {
    pub fn new(config: &PaypalConfig) -> Result<Self, ProcessorError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ProcessorError::Transport(format!("invalid base URL '{}': {}", config.base_url, e)))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProcessorError::Transport(e.to_string()))?;

        if config.client_id.is_empty() || config.client_secret.is_empty() {
            tracing::warn!("PayPal credentials not configured; order calls will fail");
        }

        Ok(Self {
            http,
            base_url,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            token: Mutex::new(None),
        })
    }

    /// `base_url` joined with `segments`, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ProcessorError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProcessorError::Transport("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn access_token(&self) -> Result<String, ProcessorError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        let url = self.endpoint(&["v1", "oauth2", "token"])?;
        let response = self
            .http
            .post(url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
            .send()
            .await
            .map_err(|e| ProcessorError::Auth(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProcessorError::Auth(format!("{}: {}", status, body)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProcessorError::Auth(e.to_string()))?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        tracing::debug!(expires_in = token.expires_in, "Obtained PayPal access token");
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, ProcessorError> {
        let token = self.access_token().await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ProcessorError::Transport(e.to_string()))?;
        read_body(response).await
    }
}

async fn read_body(response: Response) -> Result<Value, ProcessorError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ProcessorError::Transport(e.to_string()))?;

    if !status.is_success() {
        return Err(ProcessorError::Api {
            status: status.as_u16(),
            body,
        });
    }
    serde_json::from_str(&body).map_err(|e| ProcessorError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl OrderProcessor for PaypalClient {
    async fn create_order(&self, request: &OrderRequest) -> Result<Value, ProcessorError> {
        let url = self.endpoint(&["v2", "checkout", "orders"])?;
        self.send(self.http.post(url).json(request)).await
    }

    async fn capture_order(&self, order_id: &str) -> Result<Value, ProcessorError> {
        // `.` and `..` would be folded away by URL normalisation
        if order_id.is_empty() || order_id.chars().all(|c| c == '.') {
            return Err(ProcessorError::InvalidOrderId(order_id.to_string()));
        }
        let url = self.endpoint(&["v2", "checkout", "orders", order_id, "capture"])?;
        let request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", HeaderValue::from_static(PREFER_REPRESENTATION));
        self.send(request).await
    }
}
