//! Mint account classification
//!
//! Decision table, in order:
//! - system program owner -> NOT_A_TOKEN
//! - any owner other than the two token programs -> NOT_A_TOKEN
//! - legacy token program -> base authorities from the parsed mint
//! - Token-2022 -> base authorities plus the extension block

use serde_json::Value;
use std::sync::Arc;

use super::extensions::apply_extensions;
use crate::error::{AppError, AppResult};
use crate::models::{OwnerProgram, SecurityReview, TokenRecord};
use crate::rpc::{AccountEncoding, AccountInfo, RateLimitedClient};

/// Result of fetching and classifying a mint account
#[derive(Debug, Clone)]
pub enum MintAccount {
    /// The node returned no value for the address
    Missing,
    Found {
        record: TokenRecord,
        owner_program_id: String,
    },
}

/// Fetches the mint account and classifies its owning program
pub struct AccountClassifier {
    client: Arc<RateLimitedClient>,
}

impl AccountClassifier {
    pub fn new(client: Arc<RateLimitedClient>) -> Self {
        Self { client }
    }

    /// One `getAccountInfo` call; client errors propagate unchanged
    pub async fn classify(&self, address: &str) -> AppResult<MintAccount> {
        let account = self
            .client
            .get_account_info(address, AccountEncoding::JsonParsed)
            .await?;

        let Some(account) = account else {
            tracing::info!(address = address, "Mint account has no value");
            return Ok(MintAccount::Missing);
        };

        let record = classify_account(address, &account)?;
        tracing::debug!(
            address = address,
            owner = %record.owner_program,
            "Classified mint account"
        );

        Ok(MintAccount::Found {
            record,
            owner_program_id: account.owner,
        })
    }
}

/// Build the unscored record for an account the node returned
pub fn classify_account(address: &str, account: &AccountInfo) -> AppResult<TokenRecord> {
    let owner_program = OwnerProgram::from_program_id(&account.owner);

    if !owner_program.is_token_program() {
        let mut record = TokenRecord::new(address, owner_program);
        record.set_security_review(SecurityReview::NotAToken);
        return Ok(record);
    }

    let info = parsed_info(&account.data).ok_or_else(|| {
        AppError::Malformed(format!(
            "Token account {} has no jsonParsed mint payload",
            address
        ))
    })?;

    let mut record = TokenRecord::new(address, owner_program.clone());
    if let Some(name) = string_field(info, "name") {
        record.name = name;
    }
    if let Some(symbol) = string_field(info, "symbol") {
        record.symbol = symbol;
    }
    record.mint_authority = string_field(info, "mintAuthority");
    record.freeze_authority = string_field(info, "freezeAuthority");
    record.decimals = info
        .get("decimals")
        .and_then(Value::as_u64)
        .and_then(|d| u8::try_from(d).ok());
    record.supply = info.get("supply").and_then(|supply| match supply {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    });

    if owner_program == OwnerProgram::Extended {
        apply_extensions(&mut record, info);
    }

    Ok(record)
}

/// `data.parsed.info` of a jsonParsed account
fn parsed_info(data: &Value) -> Option<&Value> {
    data.get("parsed")?.get("info").filter(|info| info.is_object())
}

fn string_field(info: &Value, key: &str) -> Option<String> {
    info.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
