//! Batch outcomes and reviewer-stamped exports

use serde::{Deserialize, Serialize};

use super::token::TokenRecord;

/// One batch item: a record or an error descriptor naming the address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AnalysisOutcome {
    Success(TokenRecord),
    Error { address: String, error: String },
}

impl AnalysisOutcome {
    pub fn error(address: impl Into<String>, error: impl std::fmt::Display) -> Self {
        AnalysisOutcome::Error {
            address: address.into(),
            error: error.to_string(),
        }
    }

    pub fn address(&self) -> &str {
        match self {
            AnalysisOutcome::Success(record) => record.address(),
            AnalysisOutcome::Error { address, .. } => address,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisOutcome::Success(_))
    }

    pub fn record(&self) -> Option<&TokenRecord> {
        match self {
            AnalysisOutcome::Success(record) => Some(record),
            AnalysisOutcome::Error { .. } => None,
        }
    }
}

/// Reviewer decision stamped onto an exported record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmationStatus {
    Confirmed,
    Denied,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStamp {
    pub reviewer_name: String,
    pub confirmation_status: ConfirmationStatus,
}

/// Flat export shape: the record plus optional reviewer metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewedRecord {
    #[serde(flatten)]
    pub record: TokenRecord,
    #[serde(flatten, default)]
    pub review: Option<ReviewStamp>,
}
