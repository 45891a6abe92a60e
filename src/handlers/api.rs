//! REST API handlers for the custody analyzer
//!
//! Provides endpoints for:
//! - Analysis: single address and ordered batches
//! - Mitigations: apply one documented mitigation, or merge a reviewer's map

use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::engine::{Analyzer, BatchReport, ProgressFn};
use crate::error::AppError;
use crate::metrics::MetricsState;
use crate::models::{MitigationMap, ReviewStamp, ReviewedRecord, TokenRecord};
use crate::risk;

// =============================================================================
// API STATE
// =============================================================================

/// Shared state for API handlers
pub struct ApiState {
    pub analyzer: Arc<Analyzer>,
    /// Metrics state for the Prometheus endpoint
    pub metrics: Arc<MetricsState>,
    /// Application start time
    pub started_at: chrono::DateTime<chrono::Utc>,
    /// Cancelled on shutdown; in-flight analyses run under child tokens
    pub shutdown: CancellationToken,
}

impl ApiState {
    pub fn new(analyzer: Arc<Analyzer>, metrics: Arc<MetricsState>) -> Self {
        Self {
            analyzer,
            metrics,
            started_at: chrono::Utc::now(),
            shutdown: CancellationToken::new(),
        }
    }
}

// =============================================================================
// ANALYSIS API
// =============================================================================

/// Request body for single analysis
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub address: String,
}

/// Analyze one mint
///
/// POST /api/v1/analyze
pub async fn analyze_token(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<TokenRecord>, AppError> {
    let cancel = state.shutdown.child_token();
    let record = state
        .analyzer
        .analyze_cancellable(&request.address, &cancel)
        .await?;
    Ok(Json(record))
}

/// Request body for batch analysis
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub addresses: Vec<String>,
}

/// Analyze many mints; results keep request order
///
/// POST /api/v1/analyze/batch
pub async fn analyze_batch(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<BatchRequest>,
) -> Json<BatchReport> {
    let cancel = state.shutdown.child_token();
    let total = request.addresses.len();
    let progress: &ProgressFn<'_> = &move |completed: usize, _total: usize| {
        tracing::debug!(completed = completed, total = total, "Batch progress");
    };

    let report = state
        .analyzer
        .analyze_batch(&request.addresses, Some(progress), &cancel)
        .await;
    Json(report)
}

// =============================================================================
// MITIGATIONS API
// =============================================================================

/// Request body for applying one mitigation
#[derive(Debug, Deserialize)]
pub struct ApplyMitigationRequest {
    pub record: TokenRecord,
    pub factor: String,
    #[serde(default)]
    pub documentation: String,
}

/// Apply one documented mitigation and recompute the verdict
///
/// POST /api/v1/mitigations/apply
pub async fn apply_mitigation(
    Json(request): Json<ApplyMitigationRequest>,
) -> Result<Json<TokenRecord>, AppError> {
    let updated = risk::apply_mitigation(&request.record, &request.factor, &request.documentation)?;
    Ok(Json(updated))
}

/// Request body for recomputing a record against a mitigation map
#[derive(Debug, Deserialize)]
pub struct RecomputeRequest {
    pub record: TokenRecord,
    #[serde(default)]
    pub mitigations: MitigationMap,
    /// Reviewer metadata to stamp on the result
    #[serde(default)]
    pub review: Option<ReviewStamp>,
}

/// Merge a reviewer's mitigation map and recompute
///
/// POST /api/v1/mitigations/recompute
pub async fn recompute_record(Json(request): Json<RecomputeRequest>) -> Json<ReviewedRecord> {
    let record = risk::apply_mitigation_map(&request.record, &request.mitigations);
    Json(ReviewedRecord {
        record,
        review: request.review,
    })
}
