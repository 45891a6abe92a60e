//! Liquidity listing service
//!
//! A mint known to the secondary market's listing API has graduated out of
//! the bootstrap program. The verifier asks this first because one cheap
//! HTTP call can settle the whole check.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ListingConfig;
use crate::error::{AppError, AppResult};
use crate::rpc::{Clock, TokioClock};

/// Lookup of a mint on the secondary market
#[async_trait]
pub trait ListingService: Send + Sync {
    /// Whether the market lists `mint`
    async fn is_listed(&self, mint: &str) -> AppResult<bool>;
}

#[derive(Debug, Deserialize)]
struct MintIdsResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Vec<Value>,
}

impl MintIdsResponse {
    fn lists_first_mint(&self) -> bool {
        self.success && self.data.first().is_some_and(|entry| !entry.is_null())
    }
}

/// Raydium v3 `mint/ids` lookup
pub struct RaydiumListing {
    client: Client,
    base_url: String,
    pacing: Duration,
    clock: Arc<dyn Clock>,
}

impl RaydiumListing {
    pub fn new(config: &ListingConfig) -> AppResult<Self> {
        Self::with_clock(config, Arc::new(TokioClock))
    }

    pub fn with_clock(config: &ListingConfig, clock: Arc<dyn Clock>) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            pacing: Duration::from_millis(config.pacing_delay_ms),
            clock,
        })
    }
}

#[async_trait]
impl ListingService for RaydiumListing {
    async fn is_listed(&self, mint: &str) -> AppResult<bool> {
        self.clock.sleep(self.pacing).await;

        let url = format!("{}/mint/ids", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("mints", mint)])
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("Listing request failed: {}", e)))?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::TOO_MANY_REQUESTS => return Err(AppError::RateLimited { attempts: 1 }),
            status => {
                return Err(AppError::Unavailable(format!(
                    "Listing service returned HTTP {}",
                    status.as_u16()
                )))
            }
        }

        let body: MintIdsResponse = response
            .json()
            .await
            .map_err(|e| AppError::Malformed(format!("Listing response: {}", e)))?;

        let listed = body.lists_first_mint();
        tracing::debug!(mint = mint, listed = listed, "Listing lookup");
        Ok(listed)
    }
}
