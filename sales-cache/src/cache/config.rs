//! Configuration for the cache-aside layer and the in-process backend

use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default lifetime of cached query results
pub const DEFAULT_QUERY_TTL: Duration = Duration::from_secs(5 * 60);

/// Default lifetime of directly stored aggregates
pub const DEFAULT_AGGREGATE_TTL: Duration = Duration::from_secs(24 * 3600);

/// Configuration for the cache-aside engine and the [`MemoryCache`](crate::cache::MemoryCache) backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL applied to every query result written after a miss
    pub query_ttl: Duration,

    /// TTL applied to aggregates written through the direct-store path
    pub aggregate_ttl: Duration,

    /// Degrade to the primary store when the cache backend fails
    /// instead of propagating the error
    pub fail_open: bool,

    /// Maximum number of entries in the in-process backend
    pub max_entries: usize,

    /// Maximum total size of cached data in bytes
    pub max_size_bytes: usize,

    /// Evict least recently used entries when limits are reached
    pub enable_lru_eviction: bool,

    /// Interval for the background expired-entry sweep
    pub cleanup_interval: Duration,

    /// Keep size statistics up to date on every write
    pub enable_metrics: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            query_ttl: DEFAULT_QUERY_TTL,
            aggregate_ttl: DEFAULT_AGGREGATE_TTL,
            fail_open: true,
            max_entries: 10_000,
            // 100 MB
            max_size_bytes: 100 * 1024 * 1024,
            enable_lru_eviction: true,
            cleanup_interval: Duration::from_secs(60),
            enable_metrics: true,
        }
    }
}

impl CacheConfig {
    /// Create a new builder for cache configuration
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.query_ttl.is_zero() {
            return Err(CacheError::ConfigError(
                "query_ttl must be greater than 0".to_string(),
            ));
        }

        if self.aggregate_ttl.is_zero() {
            return Err(CacheError::ConfigError(
                "aggregate_ttl must be greater than 0".to_string(),
            ));
        }

        if self.max_entries == 0 {
            return Err(CacheError::ConfigError(
                "max_entries must be greater than 0".to_string(),
            ));
        }

        if self.max_size_bytes == 0 {
            return Err(CacheError::ConfigError(
                "max_size_bytes must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Load configuration from `SALES_CACHE_*` environment variables,
    /// falling back to defaults for anything unset
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(secs) = env_parse::<u64>("SALES_CACHE_QUERY_TTL_SECS")? {
            config.query_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = env_parse::<u64>("SALES_CACHE_AGGREGATE_TTL_SECS")? {
            config.aggregate_ttl = Duration::from_secs(secs);
        }
        if let Some(fail_open) = env_parse::<bool>("SALES_CACHE_FAIL_OPEN")? {
            config.fail_open = fail_open;
        }
        if let Some(max) = env_parse::<usize>("SALES_CACHE_MAX_ENTRIES")? {
            config.max_entries = max;
        }

        config.validate()?;
        Ok(config)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| CacheError::ConfigError(format!("{} has an invalid value: {}", name, raw))),
        Err(_) => Ok(None),
    }
}

/// Builder for cache configuration
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    query_ttl: Option<Duration>,
    aggregate_ttl: Option<Duration>,
    fail_open: Option<bool>,
    max_entries: Option<usize>,
    max_size_bytes: Option<usize>,
    enable_lru_eviction: Option<bool>,
    cleanup_interval: Option<Duration>,
    enable_metrics: Option<bool>,
}

impl CacheConfigBuilder {
    /// Set TTL for query results
    pub fn query_ttl(mut self, ttl: Duration) -> Self {
        self.query_ttl = Some(ttl);
        self
    }

    /// Set TTL for directly stored aggregates
    pub fn aggregate_ttl(mut self, ttl: Duration) -> Self {
        self.aggregate_ttl = Some(ttl);
        self
    }

    /// Choose fail-open (true) or fail-closed (false) cache error handling
    pub fn fail_open(mut self, fail_open: bool) -> Self {
        self.fail_open = Some(fail_open);
        self
    }

    /// Set maximum number of cache entries
    pub fn max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self
    }

    /// Set maximum cache size in bytes
    pub fn max_size_bytes(mut self, size: usize) -> Self {
        self.max_size_bytes = Some(size);
        self
    }

    /// Enable or disable LRU eviction
    pub fn enable_lru_eviction(mut self, enable: bool) -> Self {
        self.enable_lru_eviction = Some(enable);
        self
    }

    /// Set cleanup interval
    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = Some(interval);
        self
    }

    /// Enable or disable metrics collection
    pub fn enable_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = Some(enable);
        self
    }

    /// Build the cache configuration
    pub fn build(self) -> CacheConfig {
        let defaults = CacheConfig::default();

        CacheConfig {
            query_ttl: self.query_ttl.unwrap_or(defaults.query_ttl),
            aggregate_ttl: self.aggregate_ttl.unwrap_or(defaults.aggregate_ttl),
            fail_open: self.fail_open.unwrap_or(defaults.fail_open),
            max_entries: self.max_entries.unwrap_or(defaults.max_entries),
            max_size_bytes: self.max_size_bytes.unwrap_or(defaults.max_size_bytes),
            enable_lru_eviction: self
                .enable_lru_eviction
                .unwrap_or(defaults.enable_lru_eviction),
            cleanup_interval: self.cleanup_interval.unwrap_or(defaults.cleanup_interval),
            enable_metrics: self.enable_metrics.unwrap_or(defaults.enable_metrics),
        }
    }
}

/// Preset configurations
impl CacheConfig {
    /// Small in-process footprint, useful for tests and local runs
    pub fn small() -> Self {
        Self {
            max_entries: 1_000,
            max_size_bytes: 10 * 1024 * 1024, // 10 MB
            ..Default::default()
        }
    }

    /// Surface every cache backend failure to the caller
    pub fn fail_closed() -> Self {
        Self {
            fail_open: false,
            ..Default::default()
        }
    }
}
