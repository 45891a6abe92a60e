//! Risk factors and reviewer-supplied mitigation evidence

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::AppError;

/// Custody risk factors the scorer knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    FreezeAuthority,
    PermanentDelegate,
    TransferHook,
    ConfidentialTransfers,
    /// Older review sessions recorded this factor as `transaction_fees`
    #[serde(alias = "transaction_fees")]
    TransferFees,
}

impl RiskFactor {
    /// Factors that only exist on the extended token program
    pub const EXTENDED: [RiskFactor; 4] = [
        RiskFactor::PermanentDelegate,
        RiskFactor::TransferHook,
        RiskFactor::ConfidentialTransfers,
        RiskFactor::TransferFees,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskFactor::FreezeAuthority => "freeze_authority",
            RiskFactor::PermanentDelegate => "permanent_delegate",
            RiskFactor::TransferHook => "transfer_hook",
            RiskFactor::ConfidentialTransfers => "confidential_transfers",
            RiskFactor::TransferFees => "transfer_fees",
        }
    }
}

impl std::fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RiskFactor {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "freeze_authority" => Ok(RiskFactor::FreezeAuthority),
            "permanent_delegate" => Ok(RiskFactor::PermanentDelegate),
            "transfer_hook" => Ok(RiskFactor::TransferHook),
            "confidential_transfers" => Ok(RiskFactor::ConfidentialTransfers),
            "transfer_fees" | "transaction_fees" => Ok(RiskFactor::TransferFees),
            other => Err(AppError::UnknownRiskFactor(other.to_string())),
        }
    }
}

/// Evidence that a detected risk factor was addressed out of band
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MitigationRecord {
    /// Free text, may embed reference links
    #[serde(default)]
    pub documentation: String,
    #[serde(default)]
    pub applied: bool,
}

impl MitigationRecord {
    /// Empty record seeded when a factor is first detected
    pub fn pending() -> Self {
        Self::default()
    }

    /// Applied record; callers must have rejected blank documentation already
    pub(crate) fn applied(documentation: impl Into<String>) -> Self {
        Self {
            documentation: documentation.into(),
            applied: true,
        }
    }

    pub fn has_documentation(&self) -> bool {
        !self.documentation.trim().is_empty()
    }

    /// `http(s)://` references embedded in the documentation, in order
    pub fn links(&self) -> Vec<&str> {
        self.documentation
            .split_whitespace()
            .filter(|word| word.starts_with("http://") || word.starts_with("https://"))
            .map(|word| word.trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ')' | ']' | '>')))
            .filter(|link| !link.ends_with("://"))
            .collect()
    }
}

/// Mitigations keyed by factor
pub type MitigationMap = BTreeMap<RiskFactor, MitigationRecord>;
