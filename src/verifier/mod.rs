//! Heuristic verifier for bootstrap-program origin
//!
//! Runs only for mints carrying the bootstrap program's reserved update
//! authority. Checks, cheapest first, stopping at the first proof:
//! 1. liquidity listing (graduated, no transaction inspection)
//! 2. recent signatures of the mint, newest first
//! 3. per transaction: owner of every referenced account, looking for the
//!    bootstrap program
//! 4. same transaction: any referenced account owned by, or equal to, the
//!    secondary market program
//!
//! Inspection is strictly sequential. Any failure concludes "not genuine";
//! verification never fails an analysis.

pub mod listing;

use serde_json::Value;
use std::sync::Arc;

use crate::config::VerifierConfig;
use crate::constants::{authorities, programs};
use crate::error::AppResult;
use crate::models::{InteractionKind, Verification};
use crate::rpc::RateLimitedClient;
use crate::token::OwnerCache;

pub use listing::{ListingService, RaydiumListing};

/// Bootstrap-origin verifier
pub struct HeuristicVerifier {
    client: Arc<RateLimitedClient>,
    listing: Arc<dyn ListingService>,
    owners: OwnerCache,
    signature_limit: usize,
}

impl HeuristicVerifier {
    pub fn new(
        client: Arc<RateLimitedClient>,
        listing: Arc<dyn ListingService>,
        config: &VerifierConfig,
    ) -> Self {
        Self {
            client,
            listing,
            owners: OwnerCache::new(config.owner_cache_capacity, config.owner_cache_ttl_seconds),
            signature_limit: config.signature_limit,
        }
    }

    /// Whether `update_authority` makes a mint a verification candidate
    pub fn is_candidate(update_authority: Option<&str>) -> bool {
        update_authority == Some(authorities::PUMP_FUN_UPDATE_AUTHORITY)
    }

    /// Verify `mint`; never fails
    pub async fn verify(&self, mint: &str, update_authority: Option<&str>) -> Verification {
        if !Self::is_candidate(update_authority) {
            return Verification::not_genuine();
        }

        match self.inspect(mint).await {
            Ok(verification) => {
                tracing::info!(
                    mint = mint,
                    genuine = verification.is_genuine_bootstrap_token,
                    kind = ?verification.interaction_kind,
                    account = ?verification.interaction_account,
                    signature = ?verification.interaction_proof,
                    "Bootstrap verification finished"
                );
                verification
            }
            Err(e) => {
                tracing::warn!(mint = mint, error = %e, "Bootstrap verification aborted");
                Verification::not_genuine()
            }
        }
    }

    async fn inspect(&self, mint: &str) -> AppResult<Verification> {
        if self.listing.is_listed(mint).await? {
            return Ok(Verification::genuine(
                InteractionKind::SecondaryMarket,
                None,
                None,
            ));
        }

        let signatures = self
            .client
            .get_signatures_for_address(mint, self.signature_limit)
            .await?;

        for signature in signatures {
            let Some(transaction) = self.client.get_transaction(&signature).await? else {
                tracing::debug!(signature = %signature, "Transaction not available");
                continue;
            };

            let accounts = referenced_accounts(&transaction);
            let mut owners = Vec::with_capacity(accounts.len());

            for account in accounts {
                let owner = self.owner_of(&account).await?;
                if owner.as_deref() == Some(programs::PUMP_FUN) {
                    return Ok(Verification::genuine(
                        InteractionKind::BootstrapProgram,
                        Some(account),
                        Some(signature),
                    ));
                }
                owners.push((account, owner));
            }

            let secondary = owners.into_iter().find(|(account, owner)| {
                account == programs::RAYDIUM_AMM || owner.as_deref() == Some(programs::RAYDIUM_AMM)
            });
            if let Some((account, _)) = secondary {
                return Ok(Verification::genuine(
                    InteractionKind::SecondaryMarket,
                    Some(account),
                    Some(signature),
                ));
            }
        }

        Ok(Verification::not_genuine())
    }

    async fn owner_of(&self, account: &str) -> AppResult<Option<String>> {
        if let Some(owner) = self.owners.get(account) {
            return Ok(owner);
        }

        let owner = self.client.get_account_owner(account).await?;
        self.owners.insert(account.to_string(), owner.clone());
        Ok(owner)
    }
}

/// Accounts referenced by a jsonParsed transaction
///
/// Loaded writable, loaded readonly, then static account keys (plain
/// strings or `{pubkey, ..}` objects), de-duplicated in first-seen order.
pub fn referenced_accounts(transaction: &Value) -> Vec<String> {
    let loaded = transaction.pointer("/meta/loadedAddresses");
    let lists = [
        loaded.and_then(|l| l.get("writable")),
        loaded.and_then(|l| l.get("readonly")),
        transaction.pointer("/transaction/message/accountKeys"),
    ];

    let mut accounts: Vec<String> = Vec::new();
    for entry in lists.into_iter().flatten().filter_map(Value::as_array).flatten() {
        let key = match entry {
            Value::String(key) => Some(key.as_str()),
            Value::Object(_) => entry.get("pubkey").and_then(Value::as_str),
            _ => None,
        };
        if let Some(key) = key.filter(|k| !k.is_empty()) {
            if !accounts.iter().any(|seen| seen == key) {
                accounts.push(key.to_string());
            }
        }
    }
    accounts
}
