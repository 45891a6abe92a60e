//! Metadata side-record resolution
//!
//! Provides:
//! - PDA derivation of the metadata account for a mint
//! - Decoding of the fixed binary prefix (update authority, name, symbol)
//! - A resolver that fetches and decodes, absorbing every failure

use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use serde_json::Value;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::sync::Arc;

use crate::constants::{programs, METADATA_SEED, NOT_AVAILABLE};
use crate::rpc::{AccountEncoding, RateLimitedClient};

static METADATA_PROGRAM_ID: Lazy<Pubkey> = Lazy::new(|| {
    Pubkey::from_str(programs::METADATA).unwrap_or_else(|_| Pubkey::new_from_array([0u8; 32]))
});

/// Discriminator (1) + update authority (32) + mint (32) + name length (4)
pub const METADATA_PREFIX_LEN: usize = 1 + 32 + 32 + 4;

const UPDATE_AUTHORITY_OFFSET: usize = 1;
const NAME_LENGTH_OFFSET: usize = 65;

/// Name, symbol and update authority recovered from the side-record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnChainMetadata {
    pub name: String,
    pub symbol: String,
    pub update_authority: String,
}

/// Address of the metadata side-record for `mint`
pub fn derive_metadata_address(mint: &Pubkey) -> (Pubkey, u8) {
    let program_id = *METADATA_PROGRAM_ID;
    Pubkey::find_program_address(
        &[METADATA_SEED, program_id.as_ref(), mint.as_ref()],
        &program_id,
    )
}

/// Decode the fixed prefix of a metadata account
///
/// Returns `None` when the buffer is shorter than the prefix, a declared
/// length overruns the buffer, or name/symbol are not UTF-8.
pub fn decode_metadata(data: &[u8]) -> Option<OnChainMetadata> {
    if data.len() < METADATA_PREFIX_LEN {
        return None;
    }

    let authority: [u8; 32] = data[UPDATE_AUTHORITY_OFFSET..UPDATE_AUTHORITY_OFFSET + 32]
        .try_into()
        .ok()?;
    let update_authority = Pubkey::new_from_array(authority).to_string();

    let (name, offset) = read_string(data, NAME_LENGTH_OFFSET)?;
    let (symbol, _) = read_string(data, offset)?;

    Some(OnChainMetadata {
        name,
        symbol,
        update_authority,
    })
}

/// Read a u32-LE length-prefixed UTF-8 string; returns it with the next offset
fn read_string(data: &[u8], offset: usize) -> Option<(String, usize)> {
    let len_bytes: [u8; 4] = data.get(offset..offset + 4)?.try_into().ok()?;
    let len = u32::from_le_bytes(len_bytes) as usize;
    let start = offset + 4;
    let end = start.checked_add(len)?;
    let raw = data.get(start..end)?;
    let text = std::str::from_utf8(raw).ok()?.trim_end_matches('\0');

    let value = if text.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        text.to_string()
    };
    Some((value, end))
}

/// Fetches and decodes metadata side-records
pub struct MetadataResolver {
    client: Arc<RateLimitedClient>,
}

impl MetadataResolver {
    pub fn new(client: Arc<RateLimitedClient>) -> Self {
        Self { client }
    }

    /// Resolve metadata for `mint`; `None` means "no metadata", never an error
    pub async fn resolve(&self, mint: &Pubkey) -> Option<OnChainMetadata> {
        let (metadata_address, _) = derive_metadata_address(mint);
        let metadata_address = metadata_address.to_string();

        let account = match self
            .client
            .get_account_info(&metadata_address, AccountEncoding::Base64)
            .await
        {
            Ok(Some(account)) => account,
            Ok(None) => {
                tracing::debug!(mint = %mint, pda = %metadata_address, "No metadata account");
                return None;
            }
            Err(e) => {
                tracing::warn!(mint = %mint, error = %e, "Metadata lookup failed, continuing without it");
                return None;
            }
        };

        let Some(bytes) = decode_base64_payload(&account.data) else {
            tracing::warn!(mint = %mint, "Metadata account payload is not base64");
            return None;
        };

        let metadata = decode_metadata(&bytes);
        match &metadata {
            Some(m) => tracing::debug!(
                mint = %mint,
                name = %m.name,
                symbol = %m.symbol,
                update_authority = %m.update_authority,
                "Decoded metadata"
            ),
            None => tracing::warn!(mint = %mint, len = bytes.len(), "Metadata layout did not decode"),
        }
        metadata
    }
}

/// `data` of a base64-encoded account: `["<payload>", "base64"]`
fn decode_base64_payload(data: &Value) -> Option<Vec<u8>> {
    let payload = match data {
        Value::Array(parts) => parts.first()?.as_str()?,
        Value::String(payload) => payload.as_str(),
        _ => return None,
    };
    STANDARD.decode(payload).ok()
}
