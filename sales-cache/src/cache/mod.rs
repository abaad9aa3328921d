//! # Distributed cache layer
//!
//! Transport abstraction plus concrete backends used by the cache-aside
//! query engine.
//!
//! ## Backends
//!
//! - [`MemoryCache`]: in-process store with per-entry TTL, LRU eviction and statistics
//! - `RedisCache` (feature `redis`): `GET` / `SETEX` against a Redis server
//!
//! ## Example
//!
//! ```rust
//! use sales_cache::cache::{CacheConfig, DistributedCache, MemoryCache};
//! use std::time::Duration;
//!
//! # async fn example() -> sales_cache::Result<()> {
//! let cache = MemoryCache::new(CacheConfig::default());
//!
//! cache
//!     .set_string("Sale:42", "{}".to_string(), Duration::from_secs(60))
//!     .await?;
//!
//! if let Some(value) = cache.get_string("Sale:42").await? {
//!     println!("Cache hit: {}", value);
//! }
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod entry;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;
pub mod types;

pub use backend::DistributedCache;
pub use config::{CacheConfig, CacheConfigBuilder, DEFAULT_AGGREGATE_TTL, DEFAULT_QUERY_TTL};
pub use entry::CacheEntry;
pub use memory::{start_auto_cleanup, MemoryCache};
#[cfg(feature = "redis")]
pub use self::redis::RedisCache;
pub use types::{CacheKey, CacheOutcome, CacheStats, CacheValue};
