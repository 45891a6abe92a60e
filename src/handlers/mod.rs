//! HTTP handlers for the custody analyzer

mod api;
mod health;

pub use api::*;
pub use health::*;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::metrics::metrics_router;

/// Full router: `/api/v1/*`, `/health` and `/metrics`
pub fn router(state: Arc<ApiState>) -> Router {
    let api_routes = Router::new()
        .route("/analyze", post(analyze_token))
        .route("/analyze/batch", post(analyze_batch))
        .route("/mitigations/apply", post(apply_mitigation))
        .route("/mitigations/recompute", post(recompute_record))
        .with_state(state.clone());

    Router::new()
        .route("/health", get(health_check))
        .with_state(state.clone())
        .nest("/api/v1", api_routes)
        .merge(metrics_router().with_state(state.metrics.clone()))
}
