//! LRU owner cache with TTL
//!
//! Caches account -> owning program lookups made while verifying a mint.
//! - Key: account address
//! - Value: owner program id, or `None` for accounts that do not exist
//! - TTL: 1 hour by default

use chrono::{DateTime, Duration, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1000) {
    Some(cap) => cap,
    None => NonZeroUsize::MIN,
};

#[derive(Clone)]
struct CacheEntry {
    owner: Option<String>,
    cached_at: DateTime<Utc>,
}

/// LRU cache for account owners
pub struct OwnerCache {
    cache: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
}

impl OwnerCache {
    /// Create a new owner cache
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of accounts to remember
    /// * `ttl_seconds` - Time-to-live in seconds for each entry
    pub fn new(capacity: usize, ttl_seconds: i64) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(DEFAULT_CAPACITY);
        Self {
            cache: Mutex::new(LruCache::new(cap)),
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    /// Cached owner lookup; the outer `None` is a miss
    pub fn get(&self, account: &str) -> Option<Option<String>> {
        let mut cache = self.cache.lock();

        if let Some(entry) = cache.get(account) {
            let age = Utc::now() - entry.cached_at;
            if age < self.ttl {
                tracing::trace!(account = account, "Owner cache hit");
                return Some(entry.owner.clone());
            }
            tracing::trace!(account = account, "Owner cache entry expired");
            cache.pop(account);
        }

        None
    }

    pub fn insert(&self, account: String, owner: Option<String>) {
        let entry = CacheEntry {
            owner,
            cached_at: Utc::now(),
        };
        self.cache.lock().put(account, entry);
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }
}

impl Default for OwnerCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY.get(), 3600)
    }
}
