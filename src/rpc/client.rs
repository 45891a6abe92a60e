//! Rate-limited JSON-RPC client
//!
//! Single point of outbound ledger calls. Every call:
//! 1. waits for an admission permit (global semaphore, serial by default)
//! 2. sleeps the fixed pacing delay
//! 3. retries throttled responses with exponential backoff until the
//!    attempt budget is exhausted, then surfaces `RateLimited`

use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use super::retry::{Clock, RetryPolicy, TokioClock};
use super::transport::{HttpTransport, RpcTransport, TransportResponse};
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::metrics::MetricsState;

/// JSON-RPC error codes some providers use instead of HTTP 429
const THROTTLE_RPC_CODES: [i64; 2] = [429, -32429];

/// Account encoding requested from `getAccountInfo`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountEncoding {
    Base64,
    JsonParsed,
}

impl AccountEncoding {
    fn as_str(&self) -> &'static str {
        match self {
            AccountEncoding::Base64 => "base64",
            AccountEncoding::JsonParsed => "jsonParsed",
        }
    }
}

/// Account as returned by `getAccountInfo`
#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfo {
    /// Owning program id
    pub owner: String,
    /// `[payload, encoding]` for base64, parsed object for jsonParsed
    pub data: Value,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct SignatureInfo {
    signature: String,
}

/// Counters exposed on the health endpoint
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct ClientStats {
    pub calls: u64,
    pub rate_limited: u64,
    pub failures: u64,
}

/// Paced, retrying JSON-RPC client for exactly one upstream endpoint
pub struct RateLimitedClient {
    transport: Arc<dyn RpcTransport>,
    clock: Arc<dyn Clock>,
    policy: RetryPolicy,
    pacing: Duration,
    admission: Semaphore,
    next_id: AtomicU64,
    calls: AtomicU64,
    rate_limited: AtomicU64,
    failures: AtomicU64,
    metrics: Option<Arc<MetricsState>>,
}

impl RateLimitedClient {
    /// Create a client over an arbitrary transport and clock
    pub fn new(
        transport: Arc<dyn RpcTransport>,
        clock: Arc<dyn Clock>,
        policy: RetryPolicy,
        pacing: Duration,
        max_in_flight: usize,
    ) -> Self {
        Self {
            transport,
            clock,
            policy,
            pacing,
            admission: Semaphore::new(max_in_flight.max(1)),
            next_id: AtomicU64::new(1),
            calls: AtomicU64::new(0),
            rate_limited: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            metrics: None,
        }
    }

    /// Create the production client (reqwest transport, tokio clock)
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let transport = HttpTransport::new(config.rpc.url.clone(), config.rpc.timeout())?;
        Ok(Self::new(
            Arc::new(transport),
            Arc::new(TokioClock),
            config.retry.policy(),
            config.rpc.pacing_delay(),
            config.rpc.max_in_flight,
        ))
    }

    /// Attach Prometheus counters
    pub fn with_metrics(mut self, metrics: Arc<MetricsState>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn stats(&self) -> ClientStats {
        ClientStats {
            calls: self.calls.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }

    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }

    /// Issue one JSON-RPC call and return its `result` (may be `null`)
    pub async fn call(&self, method: &str, params: Value) -> AppResult<Value> {
        let _permit = self
            .admission
            .acquire()
            .await
            .map_err(|_| AppError::Internal("RPC admission semaphore closed".to_string()))?;

        let payload = json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        });

        let mut attempt = 0;
        loop {
            self.clock.sleep(self.pacing).await;
            self.calls.fetch_add(1, Ordering::Relaxed);
            if let Some(metrics) = &self.metrics {
                metrics.rpc_calls.inc();
            }

            let error = match self.send_once(&payload).await {
                Ok(result) => return Ok(result),
                Err(e) => e,
            };

            let throttled = error.is_throttling();
            if throttled {
                self.rate_limited.fetch_add(1, Ordering::Relaxed);
                if let Some(metrics) = &self.metrics {
                    metrics.rpc_rate_limited.inc();
                }
            }

            let retryable = throttled
                || (self.policy.retry_unavailable
                    && matches!(error, AppError::Unavailable(_) | AppError::Transport(_)));

            if retryable && self.policy.has_attempt_after(attempt) {
                let wait = self.policy.backoff(attempt);
                tracing::warn!(
                    method = method,
                    attempt = attempt + 1,
                    wait_ms = wait.as_millis() as u64,
                    error = %error,
                    "Upstream call failed, backing off"
                );
                self.clock.sleep(wait).await;
                attempt += 1;
                continue;
            }

            self.failures.fetch_add(1, Ordering::Relaxed);
            if let Some(metrics) = &self.metrics {
                metrics.rpc_failures.inc();
            }

            if throttled {
                return Err(AppError::RateLimited {
                    attempts: attempt + 1,
                });
            }
            return Err(error);
        }
    }

    async fn send_once(&self, payload: &Value) -> AppResult<Value> {
        let response = self.transport.post_json(payload).await?;
        interpret_response(&response)
    }

    /// `getAccountInfo`; `None` when the account does not exist
    pub async fn get_account_info(
        &self,
        address: &str,
        encoding: AccountEncoding,
    ) -> AppResult<Option<AccountInfo>> {
        let result = self
            .call(
                "getAccountInfo",
                json!([address, { "encoding": encoding.as_str(), "commitment": "confirmed" }]),
            )
            .await?;

        let value = result.get("value").cloned().unwrap_or(Value::Null);
        if value.is_null() {
            return Ok(None);
        }

        let account: AccountInfo = serde_json::from_value(value)?;
        Ok(Some(account))
    }

    /// Owning program of an account; `None` when the account does not exist
    pub async fn get_account_owner(&self, address: &str) -> AppResult<Option<String>> {
        Ok(self
            .get_account_info(address, AccountEncoding::JsonParsed)
            .await?
            .map(|account| account.owner))
    }

    /// Most recent confirmed signatures touching `address`, newest first
    pub async fn get_signatures_for_address(
        &self,
        address: &str,
        limit: usize,
    ) -> AppResult<Vec<String>> {
        let result = self
            .call(
                "getSignaturesForAddress",
                json!([address, { "limit": limit, "commitment": "confirmed" }]),
            )
            .await?;

        if result.is_null() {
            return Ok(Vec::new());
        }

        let entries: Vec<SignatureInfo> = serde_json::from_value(result)?;
        Ok(entries.into_iter().map(|entry| entry.signature).collect())
    }

    /// Full parsed transaction; `None` when the node no longer has it
    pub async fn get_transaction(&self, signature: &str) -> AppResult<Option<Value>> {
        let result = self
            .call(
                "getTransaction",
                json!([signature, {
                    "encoding": "jsonParsed",
                    "maxSupportedTransactionVersion": 0,
                    "commitment": "confirmed"
                }]),
            )
            .await?;

        Ok(if result.is_null() { None } else { Some(result) })
    }
}

/// Map a raw response onto the error taxonomy
fn interpret_response(response: &TransportResponse) -> AppResult<Value> {
    if response.is_throttled() {
        return Err(AppError::RateLimited { attempts: 1 });
    }

    if !response.is_success() {
        return Err(AppError::Unavailable(format!("HTTP {}", response.status)));
    }

    let body: Value = serde_json::from_str(&response.body)
        .map_err(|e| AppError::Malformed(format!("Invalid JSON-RPC body: {}", e)))?;

    if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
        let error: RpcErrorObject = serde_json::from_value(error.clone())?;
        if THROTTLE_RPC_CODES.contains(&error.code) {
            return Err(AppError::RateLimited { attempts: 1 });
        }
        return Err(AppError::Rpc {
            code: error.code,
            message: error.message,
        });
    }

    body.get("result")
        .cloned()
        .ok_or_else(|| AppError::Malformed("JSON-RPC body has neither result nor error".to_string()))
}
