//! Key-value cache with per-entry expiry
//!
//! Resolvers talk to the cache through [`CacheStore`] and only ever store
//! JSON-encoded values. Cache faults never fail a read: decode or backend
//! errors degrade to a miss, and write failures are logged and dropped.

use crate::constants::cache_keys;
use crate::{Error, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

pub mod redis_store;

pub use redis_store::RedisCache;

/// Cache backend used by the read path
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a live entry, `None` when absent or expired
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store an entry that expires after `ttl`
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;
}

/// Cache key for the weather report of a city
pub fn weather_key(city: &str) -> String {
    format!("{}:{}", cache_keys::WEATHER_PREFIX, city)
}

/// Read and decode a JSON entry, treating every failure as a miss
pub async fn get_json<T: DeserializeOwned>(cache: &dyn CacheStore, key: &str) -> Option<T> {
    let bytes = match cache.get(key).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return None,
        Err(e) => {
            warn!("Cache read failed for {}: {}", key, e);
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Discarding undecodable cache entry {}: {}", key, e);
            None
        }
    }
}

/// Encode and store a JSON entry, logging failures instead of returning them
pub async fn set_json<T: Serialize + ?Sized>(
    cache: &dyn CacheStore,
    key: &str,
    value: &T,
    ttl: Duration,
) {
    let bytes = match serde_json::to_vec(value) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Failed to encode cache entry {}: {}", key, e);
            return;
        }
    };

    if let Err(e) = cache.set(key, bytes, ttl).await {
        warn!("Cache write failed for {}: {}", key, e);
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Process-local cache backed by a concurrent map
///
/// Expired entries are evicted lazily on read, or in bulk by
/// [`InMemoryCache::purge_expired`], which [`InMemoryCache::spawn_purger`]
/// runs periodically.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: DashMap<String, CacheEntry>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included until evicted
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    /// Purge expired entries every `interval` for as long as the cache lives
    ///
    /// The task holds only a weak reference and exits once the last strong
    /// reference to the cache is dropped.
    pub fn spawn_purger(cache: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let cache = Arc::downgrade(cache);
        let interval = interval.max(Duration::from_millis(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(cache) = cache.upgrade() else {
                    debug!("Cache dropped, stopping purger");
                    break;
                };
                let purged = cache.purge_expired();
                if purged > 0 {
                    debug!("Purged {} expired cache entries", purged);
                }
            }
        })
    }

    /// Remaining lifetime of a live entry
    pub fn time_to_live(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.expires_at.saturating_duration_since(now))
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let now = Instant::now();
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
            Some(_) => {}
            None => return Ok(None),
        }

        // Read guard is released above; evict outside of it
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        if ttl.is_zero() {
            return Err(Error::cache_store(format!(
                "Refusing to store {} with zero time-to-live",
                key
            )));
        }

        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| Error::cache_store(format!("Time-to-live for {} overflows", key)))?;
        self.entries
            .insert(key.to_string(), CacheEntry { value, expires_at });
        Ok(())
    }
}
