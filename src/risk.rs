//! Risk scorer
//!
//! `securityReview` is a pure function of the owner program, the freeze
//! authority, the extension block and the mitigation map. Every mutation
//! path ends in [`rescore`], so a record never carries a stale verdict.
//!
//! Mitigations only ever close factors: applying one can turn FAILED into
//! PASSED, never the other way round.

use crate::error::{AppError, AppResult};
use crate::models::{
    MitigationMap, MitigationRecord, OwnerProgram, RiskFactor, SecurityReview, TokenRecord,
};

/// Factors that apply to a program variant
pub fn applicable_factors(owner: &OwnerProgram) -> Vec<RiskFactor> {
    match owner {
        OwnerProgram::Legacy => vec![RiskFactor::FreezeAuthority],
        OwnerProgram::Extended => {
            let mut factors = vec![RiskFactor::FreezeAuthority];
            factors.extend(RiskFactor::EXTENDED);
            factors
        }
        _ => Vec::new(),
    }
}

/// Whether the value behind `factor` is present/non-zero on the record
pub fn is_present(record: &TokenRecord, factor: RiskFactor) -> bool {
    let extensions = record.extensions();
    match factor {
        RiskFactor::FreezeAuthority => record.freeze_authority.is_some(),
        RiskFactor::PermanentDelegate => {
            extensions.is_some_and(|e| e.permanent_delegate.is_some())
        }
        RiskFactor::TransferHook => extensions.is_some_and(|e| e.transfer_hook_authority.is_some()),
        RiskFactor::ConfidentialTransfers => {
            extensions.is_some_and(|e| e.confidential_transfer_authority.is_some())
        }
        RiskFactor::TransferFees => extensions.is_some_and(|e| e.has_transfer_fee()),
    }
}

/// Applicable factors whose value is present
pub fn detected_factors(record: &TokenRecord) -> Vec<RiskFactor> {
    applicable_factors(&record.owner_program)
        .into_iter()
        .filter(|factor| is_present(record, *factor))
        .collect()
}

/// Detected factors without an applied mitigation
pub fn open_factors(record: &TokenRecord) -> Vec<RiskFactor> {
    detected_factors(record)
        .into_iter()
        .filter(|factor| !record.mitigation(*factor).is_some_and(|m| m.applied))
        .collect()
}

/// Verdict for the record as it stands
pub fn evaluate(record: &TokenRecord) -> SecurityReview {
    match record.owner_program {
        OwnerProgram::System | OwnerProgram::Unrecognized { .. } => SecurityReview::NotAToken,
        OwnerProgram::Missing {
            metadata_resolved: true,
        } => SecurityReview::Failed,
        OwnerProgram::Missing {
            metadata_resolved: false,
        } => SecurityReview::NotAToken,
        OwnerProgram::Legacy | OwnerProgram::Extended => {
            if open_factors(record).is_empty() {
                SecurityReview::Passed
            } else {
                SecurityReview::Failed
            }
        }
    }
}

/// Normalize a record and recompute its verdict
///
/// - `extensions` is aligned with the owner program
/// - every detected factor gets a mitigation entry (empty if new)
/// - an entry claiming `applied` without documentation is demoted
pub fn rescore(record: &mut TokenRecord) {
    record.align_extensions();
    record.refresh_owner_label();

    for factor in detected_factors(record) {
        record
            .mitigations_mut()
            .entry(factor)
            .or_insert_with(MitigationRecord::pending);
    }

    for mitigation in record.mitigations_mut().values_mut() {
        if mitigation.applied && !mitigation.has_documentation() {
            mitigation.applied = false;
        }
    }

    let review = evaluate(record);
    record.set_security_review(review);
}

/// Record a documented mitigation for `factor_name` and recompute
///
/// Fails with `EmptyDocumentation` on blank text, leaving the input untouched.
pub fn apply_mitigation(
    record: &TokenRecord,
    factor_name: &str,
    documentation: &str,
) -> AppResult<TokenRecord> {
    let factor: RiskFactor = factor_name.parse()?;

    if documentation.trim().is_empty() {
        return Err(AppError::EmptyDocumentation {
            factor: factor.to_string(),
        });
    }

    let mut updated = record.clone();
    updated
        .mitigations_mut()
        .insert(factor, MitigationRecord::applied(documentation));
    rescore(&mut updated);

    tracing::info!(
        address = updated.address(),
        factor = %factor,
        review = %updated.security_review(),
        "Mitigation applied"
    );

    Ok(updated)
}

/// Merge a reviewer's mitigation map into `record` and recompute
///
/// An entry counts as applied only when it is marked applied and carries
/// documentation. Unapplied entries update the draft documentation of
/// factors that are not yet mitigated. Applied mitigations are never reverted.
pub fn apply_mitigation_map(record: &TokenRecord, mitigations: &MitigationMap) -> TokenRecord {
    let mut updated = record.clone();

    for (factor, incoming) in mitigations {
        let slot = updated
            .mitigations_mut()
            .entry(*factor)
            .or_insert_with(MitigationRecord::pending);

        if incoming.applied && incoming.has_documentation() {
            *slot = MitigationRecord::applied(incoming.documentation.clone());
        } else if !slot.applied {
            slot.documentation = incoming.documentation.clone();
        }
    }

    rescore(&mut updated);
    updated
}
