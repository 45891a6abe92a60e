//! HTTP API Integration Tests
//!
//! Drives the full router with `oneshot` requests over a scripted node.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use spl_custody_analyzer::constants::programs;
use spl_custody_analyzer::handlers::{router, ApiState};
use spl_custody_analyzer::metrics::MetricsState;
use spl_custody_analyzer::models::{OwnerProgram, TokenRecord};

use crate::common::{legacy_mint, mints, Harness};

const FREEZER: &str = "Q6XprfkF8RQQKoQVG33xT88H7wi8Uk1B1CC7YAs69Gi";

fn app(harness: &Harness) -> (Router, Arc<MetricsState>) {
    let metrics = Arc::new(MetricsState::new());
    let analyzer = Arc::new(harness.analyzer().with_metrics(metrics.clone()));
    let state = Arc::new(ApiState::new(analyzer, metrics.clone()));
    (router(state), metrics)
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn frozen_record() -> Value {
    let mut record = TokenRecord::new(mints::USDT, OwnerProgram::Legacy);
    record.freeze_authority = Some(FREEZER.to_string());
    serde_json::to_value(&record).unwrap()
}

#[tokio::test]
async fn test_analyze_endpoint() {
    let harness = Harness::new();
    harness
        .transport
        .account(mints::USDT, programs::TOKEN, legacy_mint(Some(FREEZER)));
    let (app, _) = app(&harness);

    let (status, body) = post(app, "/api/v1/analyze", json!({"address": mints::USDT})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["address"], mints::USDT);
    assert_eq!(body["ownerProgram"]["kind"], "Legacy");
    assert_eq!(body["freezeAuthority"], FREEZER);
    assert_eq!(body["securityReview"], "FAILED");
    assert_eq!(body["mitigations"]["freeze_authority"]["applied"], false);
}

#[tokio::test]
async fn test_analyze_rejects_invalid_address() {
    let harness = Harness::new();
    let (app, _) = app(&harness);

    let (status, body) = post(app, "/api/v1/analyze", json!({"address": "0OIl"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "rejected");
    assert_eq!(body["reason"], "validation_failed");
}

#[tokio::test]
async fn test_analyze_upstream_failure_maps_to_bad_gateway() {
    let harness = Harness::new();
    harness
        .transport
        .status("getAccountInfo", Some(mints::USDC), 503);
    let (app, _) = app(&harness);

    let (status, body) = post(app, "/api/v1/analyze", json!({"address": mints::USDC})).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["reason"], "upstream_unavailable");
}

#[tokio::test]
async fn test_batch_endpoint() {
    let harness = Harness::new();
    harness
        .transport
        .account(mints::USDC, programs::TOKEN, legacy_mint(None));
    let (app, _) = app(&harness);

    let (status, body) = post(
        app,
        "/api/v1/analyze/batch",
        json!({"addresses": [mints::USDC, "bogus"]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["runId"].is_string());
    assert_eq!(body["total"], 2);
    assert_eq!(body["succeeded"], 1);
    assert_eq!(body["results"][0]["address"], mints::USDC);
    assert_eq!(body["results"][0]["securityReview"], "PASSED");
    assert_eq!(body["results"][1]["status"], "error");
    assert_eq!(body["results"][1]["address"], "bogus");
}

#[tokio::test]
async fn test_apply_mitigation_requires_documentation() {
    let harness = Harness::new();
    let (app, _) = app(&harness);

    let (status, body) = post(
        app,
        "/api/v1/mitigations/apply",
        json!({"record": frozen_record(), "factor": "freeze_authority", "documentation": "  "}),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["reason"], "empty_documentation");
}

#[tokio::test]
async fn test_apply_mitigation_unknown_factor() {
    let harness = Harness::new();
    let (app, _) = app(&harness);

    let (status, body) = post(
        app,
        "/api/v1/mitigations/apply",
        json!({"record": frozen_record(), "factor": "mint_authority", "documentation": "x"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "unknown_risk_factor");
}

#[tokio::test]
async fn test_apply_mitigation_passes_record() {
    let harness = Harness::new();
    let (app, _) = app(&harness);

    let (status, body) = post(
        app,
        "/api/v1/mitigations/apply",
        json!({
            "record": frozen_record(),
            "factor": "freeze_authority",
            "documentation": "Issuer freeze policy https://example.com/policy"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["securityReview"], "PASSED");
    assert_eq!(body["mitigations"]["freeze_authority"]["applied"], true);
}

#[tokio::test]
async fn test_client_supplied_verdict_is_ignored() {
    let harness = Harness::new();
    let (app, _) = app(&harness);
    let mut record = frozen_record();
    record["securityReview"] = json!("PASSED");

    let (status, body) = post(
        app,
        "/api/v1/mitigations/recompute",
        json!({"record": record}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["securityReview"], "FAILED");
}

#[tokio::test]
async fn test_recompute_with_review_stamp() {
    let harness = Harness::new();
    let (app, _) = app(&harness);

    let (status, body) = post(
        app,
        "/api/v1/mitigations/recompute",
        json!({
            "record": frozen_record(),
            "mitigations": {
                "freeze_authority": {"documentation": "Regulated issuer", "applied": true}
            },
            "review": {"reviewerName": "Ops Desk", "confirmationStatus": "Confirmed"}
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["securityReview"], "PASSED");
    assert_eq!(body["reviewerName"], "Ops Desk");
    assert_eq!(body["confirmationStatus"], "Confirmed");
    assert_eq!(body["address"], mints::USDT);
}

#[tokio::test]
async fn test_health_endpoint() {
    let harness = Harness::new();
    let (app, _) = app(&harness);

    let (status, body) = get(app, "/health").await;
    let body: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["rpc_endpoint"], "scripted://rpc");
    assert_eq!(body["rpc"]["calls"], 0);
}

#[tokio::test]
async fn test_metrics_endpoint_counts_verdicts() {
    let harness = Harness::new();
    harness
        .transport
        .account(mints::USDC, programs::TOKEN, legacy_mint(None));
    let (app, _) = app(&harness);

    let (status, _) = post(
        app.clone(),
        "/api/v1/analyze",
        json!({"address": mints::USDC}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, text) = get(app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("custody_analyses_total{review=\"PASSED\"} 1"));
}
