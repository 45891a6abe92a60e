//! Outbound ledger access
//!
//! - `transport`: raw HTTP JSON transport (one endpoint)
//! - `retry`: retry policy and clock seam
//! - `client`: paced, semaphore-bounded, retrying JSON-RPC client

pub mod client;
pub mod retry;
pub mod transport;

pub use client::{AccountEncoding, AccountInfo, ClientStats, RateLimitedClient};
pub use retry::{Clock, RetryPolicy, TokioClock};
pub use transport::{HttpTransport, RpcTransport, TransportResponse};
