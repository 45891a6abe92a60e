//! Shared fixtures for integration tests
//!
//! - `ScriptedTransport`: canned JSON-RPC responses keyed by method and
//!   first parameter, with a call log
//! - `RecordingClock`: records every pacing/backoff sleep without sleeping
//! - `StaticListing`: listing service with a fixed answer

#![allow(dead_code)]

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use parking_lot::Mutex;
use serde_json::{json, Value};
use solana_sdk::pubkey::Pubkey;
use std::collections::{HashMap, VecDeque};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use spl_custody_analyzer::config::AppConfig;
use spl_custody_analyzer::constants::programs;
use spl_custody_analyzer::engine::Analyzer;
use spl_custody_analyzer::error::{AppError, AppResult};
use spl_custody_analyzer::rpc::{Clock, RateLimitedClient, RpcTransport, TransportResponse};
use spl_custody_analyzer::token::derive_metadata_address;
use spl_custody_analyzer::verifier::{HeuristicVerifier, ListingService};

// Real mainnet mints, used only as well-formed addresses
pub mod mints {
    pub const USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
    pub const USDT: &str = "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB";
    pub const BONK: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";
    pub const JUP: &str = "JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN";
}

/// Status 0 is scripted as a transport failure (no HTTP status at all)
const TRANSPORT_FAILURE: u16 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: String,
    pub param: Option<String>,
}

/// Transport answering from a script
///
/// Routes are keyed by `method` + first parameter, falling back to the
/// method alone. The last scripted response of a route repeats.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<(String, Option<String>), VecDeque<TransportResponse>>>,
    calls: Mutex<Vec<RecordedCall>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, method: &str, param: Option<&str>, response: TransportResponse) {
        self.routes
            .lock()
            .entry((method.to_string(), param.map(str::to_string)))
            .or_default()
            .push_back(response);
    }

    /// Script a successful JSON-RPC `result`
    pub fn result(&self, method: &str, param: Option<&str>, result: Value) {
        self.respond(method, param, rpc_ok(result));
    }

    /// Script `getAccountInfo` for `address`
    pub fn account(&self, address: &str, owner: &str, data: Value) {
        self.result("getAccountInfo", Some(address), account_value(owner, data));
    }

    pub fn status(&self, method: &str, param: Option<&str>, status: u16) {
        self.respond(method, param, TransportResponse::new(status, "upstream says no"));
    }

    pub fn fail_transport(&self, method: &str, param: Option<&str>) {
        self.respond(method, param, TransportResponse::new(TRANSPORT_FAILURE, ""));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.method == method).count()
    }

    pub fn called_with(&self, method: &str, param: &str) -> bool {
        self.calls
            .lock()
            .iter()
            .any(|c| c.method == method && c.param.as_deref() == Some(param))
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_response(&self, method: &str, param: Option<String>) -> TransportResponse {
        let mut routes = self.routes.lock();
        let key = (method.to_string(), param);
        let fallback = (method.to_string(), None);

        let queue = if routes.contains_key(&key) {
            routes.get_mut(&key)
        } else {
            routes.get_mut(&fallback)
        };

        match queue {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue.front().cloned().unwrap(),
            _ => rpc_ok(default_result(method)),
        }
    }
}

fn default_result(method: &str) -> Value {
    match method {
        "getAccountInfo" => json!({"context": {"slot": 1}, "value": null}),
        "getSignaturesForAddress" => json!([]),
        _ => Value::Null,
    }
}

#[async_trait]
impl RpcTransport for ScriptedTransport {
    async fn post_json(&self, payload: &Value) -> AppResult<TransportResponse> {
        let method = payload["method"].as_str().unwrap_or_default().to_string();
        let param = payload["params"]
            .get(0)
            .and_then(Value::as_str)
            .map(str::to_string);

        self.calls.lock().push(RecordedCall {
            method: method.clone(),
            param: param.clone(),
        });
        let response = self.next_response(&method, param);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if response.status == TRANSPORT_FAILURE {
            return Err(AppError::Transport("connection reset".to_string()));
        }
        Ok(response)
    }

    fn endpoint(&self) -> &str {
        "scripted://rpc"
    }
}

/// Clock that records sleeps and returns immediately
#[derive(Default)]
pub struct RecordingClock {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }
}

#[async_trait]
impl Clock for RecordingClock {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().push(duration);
        tokio::task::yield_now().await;
    }
}

/// Clock whose sleeps never finish
pub struct StalledClock;

#[async_trait]
impl Clock for StalledClock {
    async fn sleep(&self, _duration: Duration) {
        std::future::pending::<()>().await;
    }
}

/// Listing service with a fixed answer
#[derive(Default)]
pub struct StaticListing {
    listed: AtomicBool,
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl StaticListing {
    pub fn listed(listed: bool) -> Arc<Self> {
        let listing = Self::default();
        listing.listed.store(listed, Ordering::SeqCst);
        Arc::new(listing)
    }

    pub fn failing() -> Arc<Self> {
        let listing = Self::default();
        listing.fail.store(true, Ordering::SeqCst);
        Arc::new(listing)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ListingService for StaticListing {
    async fn is_listed(&self, _mint: &str) -> AppResult<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Unavailable("Listing service returned HTTP 500".to_string()));
        }
        Ok(self.listed.load(Ordering::SeqCst))
    }
}

/// Scripted transport, recording clock and listing wired into a client
pub struct Harness {
    pub config: AppConfig,
    pub transport: Arc<ScriptedTransport>,
    pub clock: Arc<RecordingClock>,
    pub listing: Arc<StaticListing>,
    pub client: Arc<RateLimitedClient>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(AppConfig::default(), StaticListing::listed(false))
    }

    pub fn with_listing(listing: Arc<StaticListing>) -> Self {
        Self::with(AppConfig::default(), listing)
    }

    pub fn with(config: AppConfig, listing: Arc<StaticListing>) -> Self {
        let transport = ScriptedTransport::new();
        let clock = RecordingClock::new();
        let client = Arc::new(RateLimitedClient::new(
            transport.clone(),
            clock.clone(),
            config.retry.policy(),
            config.rpc.pacing_delay(),
            config.rpc.max_in_flight,
        ));

        Self {
            config,
            transport,
            clock,
            listing,
            client,
        }
    }

    pub fn analyzer(&self) -> Analyzer {
        Analyzer::with_components(self.client.clone(), self.listing.clone(), &self.config)
    }

    pub fn verifier(&self) -> HeuristicVerifier {
        HeuristicVerifier::new(
            self.client.clone(),
            self.listing.clone(),
            &self.config.verifier,
        )
    }
}

// =============================================================================
// RESPONSE BUILDERS
// =============================================================================

pub fn rpc_ok(result: Value) -> TransportResponse {
    TransportResponse::new(
        200,
        json!({"jsonrpc": "2.0", "id": 1, "result": result}).to_string(),
    )
}

pub fn account_value(owner: &str, data: Value) -> Value {
    json!({
        "context": {"slot": 1},
        "value": {
            "owner": owner,
            "data": data,
            "lamports": 1_461_600,
            "executable": false,
            "rentEpoch": 0
        }
    })
}

/// jsonParsed legacy mint payload
pub fn legacy_mint(freeze_authority: Option<&str>) -> Value {
    json!({
        "program": "spl-token",
        "parsed": {"type": "mint", "info": {
            "decimals": 6,
            "freezeAuthority": freeze_authority,
            "mintAuthority": null,
            "supply": "999999999000000",
            "isInitialized": true
        }},
        "space": 82
    })
}

/// jsonParsed Token-2022 mint payload
pub fn token2022_mint(freeze_authority: Option<&str>, extensions: Value) -> Value {
    json!({
        "program": "spl-token-2022",
        "parsed": {"type": "mint", "info": {
            "decimals": 9,
            "freezeAuthority": freeze_authority,
            "mintAuthority": null,
            "supply": "1000000000000000000",
            "isInitialized": true,
            "extensions": extensions
        }},
        "space": 500
    })
}

/// Metadata account bytes with name/symbol NUL-padded to the fixed widths
pub fn metadata_bytes(update_authority: &str, name: &str, symbol: &str) -> Vec<u8> {
    let authority = Pubkey::from_str(update_authority).unwrap();
    let mut data = vec![4u8];
    data.extend_from_slice(authority.as_ref());
    data.extend_from_slice(&[7u8; 32]);
    push_padded(&mut data, name, 32);
    push_padded(&mut data, symbol, 10);
    push_padded(&mut data, "https://example.com/meta.json", 200);
    data
}

fn push_padded(data: &mut Vec<u8>, text: &str, width: usize) {
    let mut field = text.as_bytes().to_vec();
    field.resize(width.max(field.len()), 0);
    data.extend_from_slice(&(field.len() as u32).to_le_bytes());
    data.extend_from_slice(&field);
}

/// base64 `data` of a metadata account
pub fn metadata_data(update_authority: &str, name: &str, symbol: &str) -> Value {
    json!([STANDARD.encode(metadata_bytes(update_authority, name, symbol)), "base64"])
}

pub fn metadata_address(mint: &str) -> String {
    derive_metadata_address(&Pubkey::from_str(mint).unwrap())
        .0
        .to_string()
}

/// Script a metadata side-record for `mint`
pub fn script_metadata(
    transport: &ScriptedTransport,
    mint: &str,
    update_authority: &str,
    name: &str,
    symbol: &str,
) {
    transport.account(
        &metadata_address(mint),
        programs::METADATA,
        metadata_data(update_authority, name, symbol),
    );
}

/// jsonParsed transaction referencing `loaded` and `static_keys`
pub fn transaction(loaded_writable: &[&str], static_keys: &[&str]) -> Value {
    let keys: Vec<Value> = static_keys
        .iter()
        .map(|key| json!({"pubkey": key, "signer": false, "writable": false, "source": "transaction"}))
        .collect();
    json!({
        "slot": 1,
        "meta": {
            "err": null,
            "loadedAddresses": {"writable": loaded_writable, "readonly": []}
        },
        "transaction": {"message": {"accountKeys": keys, "instructions": []}},
        "version": 0
    })
}

pub fn signatures(list: &[&str]) -> Value {
    Value::Array(
        list.iter()
            .map(|sig| json!({"signature": sig, "slot": 1, "err": null, "confirmationStatus": "confirmed"}))
            .collect(),
    )
}
