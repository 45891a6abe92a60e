//! Data models for the custody analyzer

pub mod mitigation;
pub mod outcome;
pub mod token;

pub use mitigation::{MitigationMap, MitigationRecord, RiskFactor};
pub use outcome::{AnalysisOutcome, ConfirmationStatus, ReviewStamp, ReviewedRecord};
pub use token::{
    Extensions, InteractionKind, OwnerProgram, SecurityReview, TokenRecord, Verification,
};
