//! Prometheus metrics for the custody analyzer
//!
//! Exposes metrics endpoint for monitoring:
//! - Upstream RPC call, throttle and failure counters
//! - Analyses by verdict, failed analyses
//! - Analysis latency histogram

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

use crate::models::SecurityReview;

/// Metrics state
pub struct MetricsState {
    /// Prometheus registry
    registry: Registry,
    /// Upstream calls issued, retries included
    pub rpc_calls: IntCounter,
    /// Upstream responses that signalled throttling
    pub rpc_rate_limited: IntCounter,
    /// Calls that failed after the retry policy gave up
    pub rpc_failures: IntCounter,
    /// Completed analyses by verdict
    pub analyses: IntCounterVec,
    /// Analyses that ended in an error
    pub analysis_errors: IntCounter,
    /// Single-token analysis latency (in milliseconds)
    pub analysis_latency: Histogram,
}

impl MetricsState {
    /// Create a new metrics state with all metrics registered
    pub fn new() -> Self {
        let registry = Registry::new();

        let rpc_calls = IntCounter::with_opts(Opts::new(
            "custody_rpc_calls_total",
            "Upstream JSON-RPC calls issued, retries included",
        ))
        .expect("Failed to create rpc_calls counter");
        registry
            .register(Box::new(rpc_calls.clone()))
            .expect("Failed to register rpc_calls");

        let rpc_rate_limited = IntCounter::with_opts(Opts::new(
            "custody_rpc_rate_limited_total",
            "Upstream responses that signalled throttling",
        ))
        .expect("Failed to create rpc_rate_limited counter");
        registry
            .register(Box::new(rpc_rate_limited.clone()))
            .expect("Failed to register rpc_rate_limited");

        let rpc_failures = IntCounter::with_opts(Opts::new(
            "custody_rpc_failures_total",
            "Upstream calls that failed after retries",
        ))
        .expect("Failed to create rpc_failures counter");
        registry
            .register(Box::new(rpc_failures.clone()))
            .expect("Failed to register rpc_failures");

        let analyses = IntCounterVec::new(
            Opts::new("custody_analyses_total", "Completed analyses by verdict"),
            &["review"],
        )
        .expect("Failed to create analyses counter");
        registry
            .register(Box::new(analyses.clone()))
            .expect("Failed to register analyses");

        let analysis_errors = IntCounter::with_opts(Opts::new(
            "custody_analysis_errors_total",
            "Analyses that ended in an error",
        ))
        .expect("Failed to create analysis_errors counter");
        registry
            .register(Box::new(analysis_errors.clone()))
            .expect("Failed to register analysis_errors");

        let analysis_latency = Histogram::with_opts(
            HistogramOpts::new(
                "custody_analysis_latency_ms",
                "Single-token analysis latency in milliseconds",
            )
            .buckets(vec![
                500.0, 2_000.0, 5_000.0, 10_000.0, 30_000.0, 60_000.0, 120_000.0,
            ]),
        )
        .expect("Failed to create analysis_latency histogram");
        registry
            .register(Box::new(analysis_latency.clone()))
            .expect("Failed to register analysis_latency");

        Self {
            registry,
            rpc_calls,
            rpc_rate_limited,
            rpc_failures,
            analyses,
            analysis_errors,
            analysis_latency,
        }
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_verdict(&self, review: SecurityReview) {
        self.analyses
            .with_label_values(&[&review.to_string()])
            .inc();
    }
}

impl Default for MetricsState {
    fn default() -> Self {
        Self::new()
    }
}

/// Metrics handler - returns Prometheus metrics in text format
///
/// GET /metrics
pub async fn metrics_handler(State(state): State<Arc<MetricsState>>) -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = state.registry().gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return (StatusCode::INTERNAL_SERVER_ERROR, [("Content-Type", "text/plain")], Vec::new());
    }

    (
        StatusCode::OK,
        [("Content-Type", "text/plain; version=0.0.4")],
        buffer,
    )
}

/// Create metrics router
pub fn metrics_router() -> Router<Arc<MetricsState>> {
    Router::new().route("/metrics", get(metrics_handler))
}
