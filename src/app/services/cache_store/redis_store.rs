//! Redis-backed cache shared between processes

use super::CacheStore;
use crate::{Error, Result};
use ::redis::aio::ConnectionManager;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// Cache stored in Redis, so entries outlive a single invocation
///
/// Entries are plain `GET`/`SET ... PX` values; expiry is left to the server.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    /// Connect to the server at `url` (`redis://host:port/db`)
    pub async fn connect(url: &str) -> Result<Self> {
        let client = ::redis::Client::open(url)
            .map_err(|e| Error::cache_store(format!("Invalid Redis URL: {}", e)))?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| Error::cache_store(format!("Failed to connect to Redis: {}", e)))?;

        info!("Connected to Redis cache");
        Ok(Self { connection })
    }
}

/// Expiry in whole milliseconds, never below one
fn expiry_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut connection = self.connection.clone();
        let value: Option<Vec<u8>> = ::redis::cmd("GET")
            .arg(key)
            .query_async(&mut connection)
            .await
            .map_err(|e| Error::cache_store(format!("Redis GET {} failed: {}", key, e)))?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        if ttl.is_zero() {
            return Err(Error::cache_store(format!(
                "Refusing to store {} with zero time-to-live",
                key
            )));
        }

        let millis = expiry_millis(ttl);
        let mut connection = self.connection.clone();
        let _: () = ::redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("PX")
            .arg(millis)
            .query_async(&mut connection)
            .await
            .map_err(|e| Error::cache_store(format!("Redis SET {} failed: {}", key, e)))?;

        debug!("Cached {} in Redis for {}ms", key, millis);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_millis_rounds_up_to_one() {
        assert_eq!(expiry_millis(Duration::from_secs(900)), 900_000);
        assert_eq!(expiry_millis(Duration::from_micros(10)), 1);
        assert_eq!(expiry_millis(Duration::MAX), u64::MAX);
    }

    #[tokio::test]
    async fn test_invalid_url_is_a_cache_store_error() {
        let result = RedisCache::connect("not a redis url").await;
        assert!(matches!(result, Err(Error::CacheStore { .. })));
    }
}
