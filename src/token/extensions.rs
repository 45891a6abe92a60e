//! Token-2022 extension parsing
//!
//! Walks the `extensions` array of a jsonParsed Token-2022 mint and fills
//! the [`Extensions`] block. Unknown tags are recorded in
//! `extension_types` and otherwise ignored.

use serde_json::Value;

use crate::models::{Extensions, TokenRecord};

/// Name/symbol carried by the `tokenMetadata` extension
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddedMetadata {
    pub name: Option<String>,
    pub symbol: Option<String>,
}

/// Parse the extension entries of a mint's `parsed.info`
pub fn parse_extensions(info: &Value) -> (Extensions, EmbeddedMetadata) {
    let mut extensions = Extensions::default();
    let mut embedded = EmbeddedMetadata::default();

    let entries = info
        .get("extensions")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for entry in entries {
        let Some(tag) = entry.get("extension").and_then(Value::as_str) else {
            continue;
        };
        extensions.extension_types.push(tag.to_string());

        let state = entry.get("state").unwrap_or(&Value::Null);
        match tag {
            "tokenMetadata" => {
                embedded.name = non_empty_str(state, "name");
                embedded.symbol = non_empty_str(state, "symbol");
            }
            "permanentDelegate" => {
                extensions.permanent_delegate = non_empty_str(state, "delegate");
            }
            "transferFeeConfig" => {
                extensions.transfer_fee_basis_points = active_fee_basis_points(state);
            }
            "transferHook" => {
                extensions.transfer_hook_authority = non_empty_str(state, "authority");
            }
            "confidentialTransferMint" => {
                extensions.confidential_transfer_authority = non_empty_str(state, "authority");
            }
            other => {
                tracing::trace!(extension = other, "Ignoring extension");
            }
        }
    }

    (extensions, embedded)
}

/// Parse extensions into `record`; embedded name/symbol take precedence
pub fn apply_extensions(record: &mut TokenRecord, info: &Value) {
    let (parsed, embedded) = parse_extensions(info);

    if let Some(name) = embedded.name {
        record.name = name;
    }
    if let Some(symbol) = embedded.symbol {
        record.symbol = symbol;
    }

    record.align_extensions();
    if let Some(extensions) = record.extensions_mut() {
        *extensions = parsed;
    }
}

/// Newest fee tier; the older tier only when the newer one is missing
fn active_fee_basis_points(state: &Value) -> Option<u16> {
    let tier = state
        .get("newerTransferFee")
        .filter(|tier| !tier.is_null())
        .or_else(|| state.get("olderTransferFee").filter(|tier| !tier.is_null()))?;

    tier.get("transferFeeBasisPoints")
        .and_then(Value::as_u64)
        .map(|bps| u16::try_from(bps).unwrap_or(u16::MAX))
}

fn non_empty_str(state: &Value, key: &str) -> Option<String> {
    state
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
