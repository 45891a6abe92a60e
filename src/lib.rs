//! SPL custody analyzer library
//!
//! Custody-risk review for SPL Token and Token-2022 mints.
//! This library exposes core modules for the service binary and tests.

pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod risk;
pub mod rpc;
pub mod token;
pub mod verifier;

// Re-export commonly used types for tests
pub use config::AppConfig;
pub use engine::{Analyzer, BatchReport, ProgressFn};
pub use error::{AppError, AppResult};
pub use models::{
    AnalysisOutcome, Extensions, InteractionKind, MitigationMap, MitigationRecord, OwnerProgram,
    ReviewedRecord, RiskFactor, SecurityReview, TokenRecord, Verification,
};
pub use risk::{apply_mitigation, apply_mitigation_map};
pub use rpc::{Clock, RateLimitedClient, RetryPolicy, RpcTransport, TransportResponse};
pub use verifier::{HeuristicVerifier, ListingService};
