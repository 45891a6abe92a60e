//! Error types for the custody analyzer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Upstream kept throttling through every retry attempt
    #[error("Upstream rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    /// Upstream answered with a non-success, non-throttling status
    #[error("Upstream unavailable: {0}")]
    Unavailable(String),

    /// Request never produced a response (connect failure, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body or on-chain layout did not match the expected shape
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// JSON-RPC error object returned by the node
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Caller input failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Mitigation applied without documentation
    #[error("Mitigation for {factor} requires documentation")]
    EmptyDocumentation { factor: String },

    /// Mitigation named a factor outside the known risk-factor set
    #[error("Unknown risk factor: {0}")]
    UnknownRiskFactor(String),

    /// Analysis was cancelled before it completed
    #[error("Analysis cancelled")]
    Cancelled,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the retry policy may re-issue the call that produced this error
    pub fn is_throttling(&self) -> bool {
        matches!(self, AppError::RateLimited { .. })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Malformed(e.to_string())
    }
}

/// Error response structure for API
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, status, reason) = match &self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "error", "configuration_error"),
            AppError::RateLimited { .. } => (StatusCode::TOO_MANY_REQUESTS, "error", "rate_limited"),
            AppError::Unavailable(_) => (StatusCode::BAD_GATEWAY, "error", "upstream_unavailable"),
            AppError::Transport(_) => (StatusCode::GATEWAY_TIMEOUT, "error", "upstream_transport"),
            AppError::Malformed(_) => (StatusCode::BAD_GATEWAY, "error", "malformed_response"),
            AppError::Rpc { .. } => (StatusCode::BAD_GATEWAY, "error", "rpc_error"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "rejected", "validation_failed"),
            AppError::EmptyDocumentation { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "rejected", "empty_documentation")
            }
            AppError::UnknownRiskFactor(_) => {
                (StatusCode::BAD_REQUEST, "rejected", "unknown_risk_factor")
            }
            AppError::Cancelled => (StatusCode::SERVICE_UNAVAILABLE, "error", "cancelled"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "error", "internal_error"),
        };

        let error_response = ErrorResponse {
            status,
            reason: reason.to_string(),
            details: Some(self.to_string()),
        };

        // Log the error
        tracing::error!(
            error_type = %self,
            status_code = %status_code,
            "Request error"
        );

        (status_code, Json(json!(error_response))).into_response()
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
