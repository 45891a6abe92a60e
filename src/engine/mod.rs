//! Analysis engine
//!
//! Sequences one analysis: classify the mint account, resolve the metadata
//! side-record, parse extensions (inside classification), run the heuristic
//! verifier when the reserved update authority shows up, then score.

pub mod batch;

pub use batch::{BatchReport, ProgressFn};

use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::constants::NOT_AVAILABLE;
use crate::error::{AppError, AppResult};
use crate::metrics::MetricsState;
use crate::models::{OwnerProgram, TokenRecord};
use crate::risk;
use crate::rpc::RateLimitedClient;
use crate::token::{AccountClassifier, MetadataResolver, MintAccount, OnChainMetadata};
use crate::verifier::{HeuristicVerifier, ListingService, RaydiumListing};

/// Single-token and batch analysis entry point
pub struct Analyzer {
    client: Arc<RateLimitedClient>,
    classifier: AccountClassifier,
    metadata: MetadataResolver,
    verifier: HeuristicVerifier,
    max_concurrency: usize,
    metrics: Option<Arc<MetricsState>>,
}

impl Analyzer {
    /// Production wiring: reqwest transports, tokio clock, Raydium listing
    pub fn from_config(config: &AppConfig, metrics: Arc<MetricsState>) -> AppResult<Self> {
        let client = Arc::new(RateLimitedClient::from_config(config)?.with_metrics(metrics.clone()));
        let listing: Arc<dyn ListingService> = Arc::new(RaydiumListing::new(&config.listing)?);
        Ok(Self::with_components(client, listing, config).with_metrics(metrics))
    }

    /// Wire an analyzer around an existing client and listing service
    pub fn with_components(
        client: Arc<RateLimitedClient>,
        listing: Arc<dyn ListingService>,
        config: &AppConfig,
    ) -> Self {
        Self {
            classifier: AccountClassifier::new(client.clone()),
            metadata: MetadataResolver::new(client.clone()),
            verifier: HeuristicVerifier::new(client.clone(), listing, &config.verifier),
            client,
            max_concurrency: config.batch.max_concurrency.max(1),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsState>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn client(&self) -> &RateLimitedClient {
        &self.client
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Analyze one address
    pub async fn analyze(&self, address: &str) -> AppResult<TokenRecord> {
        self.analyze_cancellable(address, &CancellationToken::new())
            .await
    }

    /// Analyze one address; cancelling `cancel` abandons every pending
    /// suspension (pacing, network, backoff) of this analysis only
    pub async fn analyze_cancellable(
        &self,
        address: &str,
        cancel: &CancellationToken,
    ) -> AppResult<TokenRecord> {
        let started = Instant::now();

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AppError::Cancelled),
            result = self.run(address) => result,
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(record) => {
                tracing::info!(
                    address = record.address(),
                    owner = %record.owner_program,
                    review = %record.security_review(),
                    elapsed_ms = elapsed_ms,
                    "Analysis finished"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_verdict(record.security_review());
                    metrics.analysis_latency.observe(elapsed_ms as f64);
                }
            }
            Err(e) => {
                tracing::warn!(address = address, error = %e, elapsed_ms = elapsed_ms, "Analysis failed");
                if let Some(metrics) = &self.metrics {
                    metrics.analysis_errors.inc();
                }
            }
        }

        result
    }

    async fn run(&self, address: &str) -> AppResult<TokenRecord> {
        let address = address.trim();
        let mint = Pubkey::from_str(address)
            .map_err(|e| AppError::Validation(format!("Invalid token address {:?}: {}", address, e)))?;

        tracing::info!(address = address, "Analysis started");

        let mut record = match self.classifier.classify(address).await? {
            MintAccount::Found { record, .. } if !record.owner_program.is_token_program() => record,
            MintAccount::Found { mut record, .. } => {
                if let Some(metadata) = self.metadata.resolve(&mint).await {
                    merge_metadata(&mut record, metadata);
                }
                record
            }
            MintAccount::Missing => {
                let metadata = self.metadata.resolve(&mint).await;
                let mut record = TokenRecord::new(
                    address,
                    OwnerProgram::Missing {
                        metadata_resolved: metadata.is_some(),
                    },
                );
                if let Some(metadata) = metadata {
                    merge_metadata(&mut record, metadata);
                }
                record
            }
        };

        if HeuristicVerifier::is_candidate(record.update_authority.as_deref()) {
            tracing::info!(address = address, "Reserved update authority, verifying origin");
            let verification = self
                .verifier
                .verify(address, record.update_authority.as_deref())
                .await;
            record.set_verification(verification);
        }

        risk::rescore(&mut record);
        Ok(record)
    }
}

/// Fill sentinel display strings and take the update authority
///
/// Names from the Token-2022 metadata extension are already on the record
/// and win over the side-record.
fn merge_metadata(record: &mut TokenRecord, metadata: OnChainMetadata) {
    if record.name == NOT_AVAILABLE {
        record.name = metadata.name;
    }
    if record.symbol == NOT_AVAILABLE {
        record.symbol = metadata.symbol;
    }
    record.update_authority = Some(metadata.update_authority);
}
