//! TokenRecord - one mint's analysis result

use serde::{Deserialize, Serialize};

use super::mitigation::{MitigationMap, MitigationRecord, RiskFactor};
use crate::constants::{authorities, programs, NOT_AVAILABLE};

/// Program owning the analyzed account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum OwnerProgram {
    /// Native system program (wallet or uninitialized account)
    System,
    /// Legacy SPL Token program
    Legacy,
    /// Token-2022 program
    Extended,
    /// Any other program
    #[serde(rename_all = "camelCase")]
    Unrecognized { program_id: String },
    /// The mint account does not exist
    #[serde(rename_all = "camelCase")]
    Missing { metadata_resolved: bool },
}

impl OwnerProgram {
    pub fn from_program_id(program_id: &str) -> Self {
        match program_id {
            programs::SYSTEM => OwnerProgram::System,
            programs::TOKEN => OwnerProgram::Legacy,
            programs::TOKEN_2022 => OwnerProgram::Extended,
            other => OwnerProgram::Unrecognized {
                program_id: other.to_string(),
            },
        }
    }

    pub fn is_token_program(&self) -> bool {
        matches!(self, OwnerProgram::Legacy | OwnerProgram::Extended)
    }

    pub fn label(&self) -> &'static str {
        match self {
            OwnerProgram::System => "System Account",
            OwnerProgram::Legacy => "Token Program",
            OwnerProgram::Extended => "Token-2022 Program",
            OwnerProgram::Unrecognized { .. } => "Unrecognized Program (not a token program)",
            OwnerProgram::Missing { .. } => "Account Not Found",
        }
    }
}

impl std::fmt::Display for OwnerProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OwnerProgram::Unrecognized { program_id } => {
                write!(f, "{} [{}]", self.label(), program_id)
            }
            _ => write!(f, "{}", self.label()),
        }
    }
}

/// Derived security verdict
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityReview {
    Passed,
    #[default]
    Failed,
    NotAToken,
}

impl std::fmt::Display for SecurityReview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecurityReview::Passed => write!(f, "PASSED"),
            SecurityReview::Failed => write!(f, "FAILED"),
            SecurityReview::NotAToken => write!(f, "NOT_A_TOKEN"),
        }
    }
}

/// Token-2022 optional feature block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extensions {
    /// Authority that can move any holder's balance
    pub permanent_delegate: Option<String>,
    /// Active transfer fee; `None`/`Some(0)` means no fee
    pub transfer_fee_basis_points: Option<u16>,
    /// Authority of the program invoked on every transfer
    pub transfer_hook_authority: Option<String>,
    /// Authority controlling amount-hiding transfers
    pub confidential_transfer_authority: Option<String>,
    /// Every extension tag seen on the mint, recognized or not
    #[serde(default)]
    pub extension_types: Vec<String>,
}

impl Extensions {
    pub fn has_transfer_fee(&self) -> bool {
        self.transfer_fee_basis_points.unwrap_or(0) != 0
    }
}

/// How a bootstrap-origin token was proven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionKind {
    #[serde(rename = "secondary-market")]
    SecondaryMarket,
    #[serde(rename = "bootstrap-program")]
    BootstrapProgram,
}

impl std::fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InteractionKind::SecondaryMarket => write!(f, "secondary-market"),
            InteractionKind::BootstrapProgram => write!(f, "bootstrap-program"),
        }
    }
}

/// Heuristic verifier outcome
///
/// `graduatedToSecondaryMarket` is written on output but always derived
/// from the other fields on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "VerificationWire", into = "VerificationWire")]
pub struct Verification {
    pub is_genuine_bootstrap_token: bool,
    pub interaction_kind: Option<InteractionKind>,
    pub interaction_account: Option<String>,
    pub interaction_proof: Option<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerificationWire {
    is_genuine_bootstrap_token: bool,
    #[serde(skip_deserializing, default)]
    graduated_to_secondary_market: bool,
    #[serde(default)]
    interaction_kind: Option<InteractionKind>,
    #[serde(default)]
    interaction_account: Option<String>,
    #[serde(default)]
    interaction_proof: Option<String>,
}

impl From<VerificationWire> for Verification {
    fn from(wire: VerificationWire) -> Self {
        Self {
            is_genuine_bootstrap_token: wire.is_genuine_bootstrap_token,
            interaction_kind: wire.interaction_kind,
            interaction_account: wire.interaction_account,
            interaction_proof: wire.interaction_proof,
        }
    }
}

impl From<Verification> for VerificationWire {
    fn from(verification: Verification) -> Self {
        Self {
            graduated_to_secondary_market: verification.graduated_to_secondary_market(),
            is_genuine_bootstrap_token: verification.is_genuine_bootstrap_token,
            interaction_kind: verification.interaction_kind,
            interaction_account: verification.interaction_account,
            interaction_proof: verification.interaction_proof,
        }
    }
}

impl Verification {
    pub fn not_genuine() -> Self {
        Self {
            is_genuine_bootstrap_token: false,
            interaction_kind: None,
            interaction_account: None,
            interaction_proof: None,
        }
    }

    pub fn genuine(
        kind: InteractionKind,
        account: Option<String>,
        proof: Option<String>,
    ) -> Self {
        Self {
            is_genuine_bootstrap_token: true,
            interaction_kind: Some(kind),
            interaction_account: account,
            interaction_proof: proof,
        }
    }

    pub fn graduated_to_secondary_market(&self) -> bool {
        self.is_genuine_bootstrap_token
            && self.interaction_kind == Some(InteractionKind::SecondaryMarket)
    }
}

/// One mint's analysis result
///
/// `ownerLabel` and `securityReview` are never accepted from input; both are
/// recomputed by [`crate::risk`] whenever the record changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    pub name: String,
    pub symbol: String,
    address: String,
    pub owner_program: OwnerProgram,
    #[serde(default)]
    pub mint_authority: Option<String>,
    #[serde(default)]
    pub freeze_authority: Option<String>,
    #[serde(default)]
    pub update_authority: Option<String>,
    #[serde(default)]
    pub decimals: Option<u8>,
    /// Raw supply in base units, as reported by the node
    #[serde(default)]
    pub supply: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    extensions: Option<Extensions>,
    #[serde(flatten, default)]
    verification: Option<Verification>,
    #[serde(skip_deserializing, default)]
    owner_label: String,
    #[serde(skip_deserializing, default)]
    security_review: SecurityReview,
    #[serde(default)]
    mitigations: MitigationMap,
}

impl TokenRecord {
    /// Fresh record with sentinel display strings
    pub fn new(address: impl Into<String>, owner_program: OwnerProgram) -> Self {
        let extensions = match owner_program {
            OwnerProgram::Extended => Some(Extensions::default()),
            _ => None,
        };

        let owner_label = owner_program.to_string();

        Self {
            name: NOT_AVAILABLE.to_string(),
            symbol: NOT_AVAILABLE.to_string(),
            address: address.into(),
            owner_program,
            mint_authority: None,
            freeze_authority: None,
            update_authority: None,
            decimals: None,
            supply: None,
            extensions,
            verification: None,
            owner_label,
            security_review: SecurityReview::default(),
            mitigations: MitigationMap::new(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn extensions(&self) -> Option<&Extensions> {
        self.extensions.as_ref()
    }

    pub fn extensions_mut(&mut self) -> Option<&mut Extensions> {
        self.extensions.as_mut()
    }

    /// Restore `extensions.is_some() == (ownerProgram == Extended)`
    pub(crate) fn align_extensions(&mut self) {
        match self.owner_program {
            OwnerProgram::Extended => {
                self.extensions.get_or_insert_with(Extensions::default);
            }
            _ => self.extensions = None,
        }
    }

    pub fn verification(&self) -> Option<&Verification> {
        self.verification.as_ref()
    }

    pub fn set_verification(&mut self, verification: Verification) {
        self.verification = Some(verification);
    }

    pub fn security_review(&self) -> SecurityReview {
        self.security_review
    }

    pub(crate) fn set_security_review(&mut self, review: SecurityReview) {
        self.security_review = review;
    }

    pub fn mitigations(&self) -> &MitigationMap {
        &self.mitigations
    }

    pub fn mitigation(&self, factor: RiskFactor) -> Option<&MitigationRecord> {
        self.mitigations.get(&factor)
    }

    pub(crate) fn mitigations_mut(&mut self) -> &mut MitigationMap {
        &mut self.mitigations
    }

    /// Whether the update authority is the bootstrap program's reserved one
    pub fn has_reserved_update_authority(&self) -> bool {
        self.update_authority.as_deref() == Some(authorities::PUMP_FUN_UPDATE_AUTHORITY)
    }

    /// Owner label for display, annotated when the bootstrap program minted it
    pub fn owner_label(&self) -> String {
        if self.has_reserved_update_authority() {
            format!("{} (Pump.fun mint authority)", self.owner_program)
        } else {
            self.owner_program.to_string()
        }
    }

    pub(crate) fn refresh_owner_label(&mut self) {
        self.owner_label = self.owner_label();
    }
}
