//! Fetch cache for upstream JSON bodies.
//!
//! Entries are keyed by `origin;base64url(sha256(url))` so that a cache
//! dump reveals which services were called but not the coordinates.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use base64::Engine;
use parking_lot::RwLock;
use serde_json::Value;
use sha2::{Digest, Sha256};
use url::Url;

/// Cache key for a request URL.
pub fn cache_key(url: &Url) -> String {
    let digest = Sha256::digest(url.as_str().as_bytes());
    let hash = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(digest);
    format!("{};{}", url.origin().ascii_serialization(), hash)
}

/// Key/value store for fetched JSON with per-entry expiry.
pub trait FetchCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn put(&self, key: &str, value: Value, ttl: Duration);
}

#[derive(Debug)]
struct Entry {
    value: Value,
    expires_at: Instant,
}

/// Default upper bound on stored entries.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Default spacing between sweeps of expired entries.
pub const DEFAULT_PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct Entries {
    map: HashMap<String, Entry>,
    next_purge: Instant,
}

/// Process-local [`FetchCache`].
///
/// Expired entries are swept from `put` at most once per purge interval,
/// and whenever the cache is full. A full cache with nothing expired
/// evicts the entry closest to expiry.
#[derive(Debug)]
pub struct MemoryCache {
    entries: RwLock<Entries>,
    max_entries: usize,
    purge_interval: Duration,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::with_limits(DEFAULT_MAX_ENTRIES, DEFAULT_PURGE_INTERVAL)
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(max_entries: usize, purge_interval: Duration) -> Self {
        Self {
            entries: RwLock::new(Entries {
                map: HashMap::new(),
                next_purge: Instant::now() + purge_interval,
            }),
            max_entries: max_entries.max(1),
            purge_interval,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().map.is_empty()
    }

    /// Drop every expired entry.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        let mut entries = self.entries.write();
        entries.map.retain(|_, entry| entry.expires_at > now);
        entries.next_purge = now + self.purge_interval;
    }
}

impl FetchCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        {
            let entries = self.entries.read();
            match entries.map.get(key) {
                Some(entry) if entry.expires_at > now => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        self.entries.write().map.remove(key);
        None
    }

    fn put(&self, key: &str, value: Value, ttl: Duration) {
        if ttl.is_zero() {
            return;
        }
        let now = Instant::now();
        let mut entries = self.entries.write();

        if now >= entries.next_purge || entries.map.len() >= self.max_entries {
            let before = entries.map.len();
            entries.map.retain(|_, entry| entry.expires_at > now);
            entries.next_purge = now + self.purge_interval;
            tracing::debug!(
                "Purged {} expired cache entries",
                before - entries.map.len()
            );
        }

        if entries.map.len() >= self.max_entries && !entries.map.contains_key(key) {
            let oldest = entries
                .map
                .iter()
                .min_by_key(|(_, entry)| entry.expires_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.map.remove(&oldest);
            }
        }

        entries.map.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
    }
}
