//! Configuration management for the custody analyzer
//!
//! Loads configuration from YAML/TOML/JSON files and environment variables.
//! Environment variables override file values.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::constants::endpoints;
use crate::rpc::RetryPolicy;

/// Upper bound accepted for `retry.max_attempts`
const MAX_RETRY_ATTEMPTS: u32 = 16;
/// Upper bound accepted for `retry.multiplier`
const MAX_RETRY_MULTIPLIER: f64 = 10.0;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream RPC endpoint configuration
    #[serde(default)]
    pub rpc: RpcConfig,
    /// Retry/backoff policy for throttled calls
    #[serde(default)]
    pub retry: RetryConfig,
    /// Liquidity listing service configuration
    #[serde(default)]
    pub listing: ListingConfig,
    /// Heuristic verifier configuration
    #[serde(default)]
    pub verifier: VerifierConfig,
    /// Batch orchestration configuration
    #[serde(default)]
    pub batch: BatchConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// RPC endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    /// JSON-RPC endpoint URL
    #[serde(default = "default_rpc_url")]
    pub url: String,
    /// Hard per-call timeout in milliseconds
    #[serde(default = "default_rpc_timeout")]
    pub timeout_ms: u64,
    /// Fixed delay before every call in milliseconds
    #[serde(default = "default_pacing_delay")]
    pub pacing_delay_ms: u64,
    /// Maximum calls in flight at once
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

fn default_rpc_url() -> String {
    endpoints::SOLANA_MAINNET_RPC.to_string()
}

fn default_rpc_timeout() -> u64 {
    30_000
}

fn default_pacing_delay() -> u64 {
    2_000
}

fn default_max_in_flight() -> usize {
    1
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: default_rpc_url(),
            timeout_ms: default_rpc_timeout(),
            pacing_delay_ms: default_pacing_delay(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

impl RpcConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }
}

/// Retry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Attempts per call, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base backoff delay in milliseconds
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,
    /// Backoff multiplier applied per attempt
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Also retry non-throttling upstream failures
    #[serde(default)]
    pub retry_unavailable: bool,
}

fn default_max_attempts() -> u32 {
    4
}

fn default_base_delay() -> u64 {
    2_000
}

fn default_multiplier() -> f64 {
    2.0
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay(),
            multiplier: default_multiplier(),
            retry_unavailable: false,
        }
    }
}

impl RetryConfig {
    /// Build the policy object injected into the rate-limited client
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            multiplier: self.multiplier,
            retry_unavailable: self.retry_unavailable,
        }
    }
}

/// Liquidity listing service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    /// Base URL of the listing API
    #[serde(default = "default_listing_url")]
    pub base_url: String,
    /// Delay before each listing query in milliseconds
    #[serde(default = "default_listing_pacing")]
    pub pacing_delay_ms: u64,
    /// Per-call timeout in milliseconds
    #[serde(default = "default_rpc_timeout")]
    pub timeout_ms: u64,
}

fn default_listing_url() -> String {
    endpoints::RAYDIUM_API.to_string()
}

fn default_listing_pacing() -> u64 {
    1_000
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            base_url: default_listing_url(),
            pacing_delay_ms: default_listing_pacing(),
            timeout_ms: default_rpc_timeout(),
        }
    }
}

/// Heuristic verifier configuration
#[derive(Debug, Clone, Deserialize)]
pub struct VerifierConfig {
    /// Recent signatures inspected per mint
    #[serde(default = "default_signature_limit")]
    pub signature_limit: usize,
    /// Owner lookup cache capacity
    #[serde(default = "default_owner_cache_capacity")]
    pub owner_cache_capacity: usize,
    /// Owner lookup cache TTL in seconds
    #[serde(default = "default_owner_cache_ttl")]
    pub owner_cache_ttl_seconds: i64,
}

fn default_signature_limit() -> usize {
    3
}

fn default_owner_cache_capacity() -> usize {
    1000
}

fn default_owner_cache_ttl() -> i64 {
    3600
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            signature_limit: default_signature_limit(),
            owner_cache_capacity: default_owner_cache_capacity(),
            owner_cache_ttl_seconds: default_owner_cache_ttl(),
        }
    }
}

/// Batch orchestration configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// Analyses running at once within a batch
    #[serde(default = "default_batch_concurrency")]
    pub max_concurrency: usize,
}

fn default_batch_concurrency() -> usize {
    1
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_batch_concurrency(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (CUSTODY_*)
    /// 2. config/config.{yaml,toml,json} (if exists)
    /// 3. config.{yaml,toml,json} (if exists)
    /// 4. Default values
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(File::with_name("config/config").required(false));
        Self::build(builder)
    }

    /// Load configuration from an explicit file, still honoring env overrides
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let builder = Config::builder().add_source(File::from(path).required(true));
        Self::build(builder)
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let config = builder
            // CUSTODY_RPC__URL=https://... -> rpc.url
            // CUSTODY_BATCH__MAX_CONCURRENCY=4 -> batch.max_concurrency
            .add_source(
                Environment::with_prefix("CUSTODY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rpc.url.is_empty() {
            return Err(ConfigError::Message("RPC URL must be set".to_string()));
        }

        if self.listing.base_url.is_empty() {
            return Err(ConfigError::Message(
                "Listing service base URL must be set".to_string(),
            ));
        }

        if self.rpc.max_in_flight == 0 {
            return Err(ConfigError::Message(
                "rpc.max_in_flight must be at least 1".to_string(),
            ));
        }

        if self.retry.max_attempts == 0 || self.retry.max_attempts > MAX_RETRY_ATTEMPTS {
            return Err(ConfigError::Message(format!(
                "retry.max_attempts must be between 1 and {}",
                MAX_RETRY_ATTEMPTS
            )));
        }

        if !self.retry.multiplier.is_finite()
            || self.retry.multiplier < 1.0
            || self.retry.multiplier > MAX_RETRY_MULTIPLIER
        {
            return Err(ConfigError::Message(format!(
                "retry.multiplier must be between 1.0 and {}",
                MAX_RETRY_MULTIPLIER
            )));
        }

        if self.batch.max_concurrency == 0 {
            return Err(ConfigError::Message(
                "batch.max_concurrency must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
