//! Health check endpoint

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use super::api::ApiState;
use crate::rpc::ClientStats;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall system status
    pub status: HealthStatus,
    /// Uptime in seconds
    pub uptime_seconds: i64,
    /// Upstream RPC endpoint
    pub rpc_endpoint: String,
    /// Upstream call counters
    pub rpc: ClientStats,
}

/// Health status enum
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All systems operational
    Healthy,
    /// Upstream failing for at least half of the calls
    Degraded,
}

impl HealthStatus {
    pub fn from_stats(stats: &ClientStats) -> Self {
        if stats.failures > 0 && stats.failures * 2 >= stats.calls {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        }
    }
}

/// Health check handler
///
/// GET /health
pub async fn health_check(State(state): State<Arc<ApiState>>) -> (StatusCode, Json<HealthResponse>) {
    let uptime = (Utc::now() - state.started_at).num_seconds();
    let client = state.analyzer.client();
    let stats = client.stats();

    let response = HealthResponse {
        status: HealthStatus::from_stats(&stats),
        uptime_seconds: uptime,
        rpc_endpoint: client.endpoint().to_string(),
        rpc: stats,
    };

    // Degraded is still served; the analyzer keeps answering from retries
    (StatusCode::OK, Json(response))
}
