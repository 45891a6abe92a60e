//! HTTP transport for JSON-RPC payloads
//!
//! The transport only moves bytes and reports the HTTP status; status
//! interpretation and retries belong to the client.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Raw upstream response
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_throttled(&self) -> bool {
        self.status == 429
    }
}

/// Single-endpoint JSON transport
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// POST a JSON payload to the upstream endpoint
    async fn post_json(&self, payload: &Value) -> AppResult<TransportResponse>;

    /// Endpoint this transport talks to (for logging)
    fn endpoint(&self) -> &str;
}

/// reqwest-backed transport with a hard per-call timeout
pub struct HttpTransport {
    client: Client,
    url: String,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn post_json(&self, payload: &Value) -> AppResult<TransportResponse> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("RPC request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Transport(format!("Failed to read RPC body: {}", e)))?;

        Ok(TransportResponse { status, body })
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}
