//! Redis-backed [`DistributedCache`]

use crate::cache::backend::DistributedCache;
use crate::error::{CacheError, Result};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use std::time::Duration;
use tracing::{debug, info};

/// Cache backend talking to a Redis server with `GET` / `SETEX`
pub struct RedisCache {
    connection: MultiplexedConnection,
}

impl RedisCache {
    /// Connect to `url` (e.g. `redis://localhost:6379`) and verify it with `PING`
    pub async fn connect(url: &str) -> Result<Self> {
        info!("Connecting to Redis at {}", url);

        let client = redis::Client::open(url)
            .map_err(|e| CacheError::ConfigError(format!("Invalid Redis URL: {}", e)))?;

        let mut connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut connection)
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis ping failed: {}", e)))?;

        info!("Successfully connected to Redis");
        Ok(Self { connection })
    }
}

#[async_trait]
impl DistributedCache for RedisCache {
    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection.clone();
        let value = redis::cmd("GET")
            .arg(key)
            .query_async::<_, Option<String>>(&mut conn)
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis GET failed: {}", e)))?;

        debug!("Redis GET {} -> {}", key, if value.is_some() { "hit" } else { "miss" });
        Ok(value)
    }

    async fn set_string(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let mut conn = self.connection.clone();
        // SETEX rejects a zero expiry
        let ttl_secs = ttl.as_secs().max(1);

        redis::cmd("SETEX")
            .arg(key)
            .arg(ttl_secs)
            .arg(value)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis SETEX failed: {}", e)))?;

        debug!("Redis SETEX {} ({}s)", key, ttl_secs);
        Ok(())
    }
}
