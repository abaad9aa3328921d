//! Cache-aside query execution
//!
//! [`CacheAsideEngine::query`] consults the distributed cache under the
//! query's fingerprint, falls back to the primary store on a miss and
//! populates the cache with the result for the query TTL.
//! [`CacheAsideEngine::store`] writes an aggregate directly for the
//! aggregate TTL.
//!
//! Concurrent misses on the same key are not coalesced; each one reaches the
//! store and the last write wins. Entries are never invalidated on write, so
//! a cached result can be stale for up to its TTL.

use crate::cache::backend::DistributedCache;
use crate::cache::config::CacheConfig;
use crate::cache::types::{CacheKey, CacheOutcome};
use crate::cancel::CancelSignal;
use crate::domain::entity::Entity;
use crate::error::{CacheError, Result};
use crate::query::descriptor::QueryDescriptor;
use crate::query::plan::QueryPlan;
use crate::store::QuerySource;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

/// Cache-aside reads and direct cache writes for one entity type
pub struct CacheAsideEngine<T: Entity> {
    source: Arc<dyn QuerySource<T>>,
    cache: Arc<dyn DistributedCache>,
    config: CacheConfig,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> CacheAsideEngine<T> {
    pub fn new(
        source: Arc<dyn QuerySource<T>>,
        cache: Arc<dyn DistributedCache>,
        config: CacheConfig,
    ) -> Self {
        Self {
            source,
            cache,
            config,
            _entity: PhantomData,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Run `query`, serving it from cache when a valid entry exists
    pub async fn query(&self, query: &QueryDescriptor<T>, cancel: &CancelSignal) -> Result<Vec<T>> {
        self.query_with_outcome(query, cancel)
            .await
            .map(|(items, _)| items)
    }

    /// Like [`query`](Self::query), also reporting where the result came from
    pub async fn query_with_outcome(
        &self,
        query: &QueryDescriptor<T>,
        cancel: &CancelSignal,
    ) -> Result<(Vec<T>, CacheOutcome)> {
        let key = query.cache_key();
        cancel.check("query")?;

        let mut outcome = CacheOutcome::Miss;
        match cancel.run("cache read", self.cache.get_string(&key)).await {
            Ok(Some(payload)) if !payload.trim().is_empty() => {
                match serde_json::from_str::<Vec<T>>(&payload) {
                    Ok(items) => {
                        debug!("Cache hit: {} ({} rows)", key, items.len());
                        return Ok((items, CacheOutcome::Hit));
                    }
                    Err(e) => {
                        warn!("Discarding unreadable cache entry {}: {}", key, e);
                    }
                }
            }
            Ok(_) => debug!("Cache miss: {}", key),
            Err(e @ CacheError::Cancelled(_)) => return Err(e),
            Err(e) if self.config.fail_open => {
                warn!("Cache read failed for {}, falling back to store: {}", key, e);
                outcome = CacheOutcome::Degraded;
            }
            Err(e) => return Err(e),
        }

        let plan = QueryPlan::from_descriptor(query);
        let items = cancel.run("store query", self.source.fetch(&plan)).await?;

        let payload = serde_json::to_string(&items)?;
        cancel.check("cache populate")?;
        self.populate(&key, payload).await?;

        Ok((items, outcome))
    }

    /// Write `value` under `key` for the aggregate TTL.
    ///
    /// Blank values (nil identity) are rejected before the cache is touched.
    /// Cache failures are returned to the caller regardless of `fail_open`.
    pub async fn store(&self, key: &str, value: &T, cancel: &CancelSignal) -> Result<()> {
        if key.trim().is_empty() {
            return Err(CacheError::InvalidArgument {
                name: "key",
                reason: "cache key must not be empty".to_string(),
            });
        }
        if value.is_blank() {
            return Err(CacheError::InvalidArgument {
                name: "value",
                reason: format!("refusing to cache a blank {}", T::NAME),
            });
        }

        let payload = serde_json::to_string(value)?;
        cancel.check("cache store")?;
        self.cache
            .set_string(key, payload, self.config.aggregate_ttl)
            .await?;

        debug!("Stored {} under {}", value.identity_key(), key);
        Ok(())
    }

    async fn populate(&self, key: &CacheKey, payload: String) -> Result<()> {
        match self
            .cache
            .set_string(key, payload, self.config.query_ttl)
            .await
        {
            Ok(()) => {
                debug!("Cached query result: {}", key);
                Ok(())
            }
            Err(e) if self.config.fail_open => {
                warn!("Cache write failed for {}: {}", key, e);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

impl<T: Entity> Clone for CacheAsideEngine<T> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            cache: Arc::clone(&self.cache),
            config: self.config.clone(),
            _entity: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::MemoryCache;
    use crate::domain::ExternalProduct;
    use crate::query::descriptor::Filter;
    use crate::store::MemoryStore;

    fn engine_with(
        rows: Vec<ExternalProduct>,
    ) -> (CacheAsideEngine<ExternalProduct>, Arc<MemoryCache>) {
        let cache = Arc::new(MemoryCache::new(CacheConfig::default()));
        let store = Arc::new(MemoryStore::with_rows(rows));
        let engine: CacheAsideEngine<ExternalProduct> =
            CacheAsideEngine::new(store, cache.clone(), CacheConfig::default());
        (engine, cache)
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let product = ExternalProduct::new("Keyboard", 49.9);
        let (engine, cache) = engine_with(vec![product.clone()]);
        let query = QueryDescriptor::new().filter(Filter::id_eq(product.id));
        let cancel = CancelSignal::never();

        let (first, outcome) = engine.query_with_outcome(&query, &cancel).await.unwrap();
        assert_eq!(outcome, CacheOutcome::Miss);
        assert_eq!(first, vec![product.clone()]);
        assert!(cache.contains_key(&query.cache_key()).await);

        let (second, outcome) = engine.query_with_outcome(&query, &cancel).await.unwrap();
        assert_eq!(outcome, CacheOutcome::Hit);
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn test_empty_result_is_cached() {
        let (engine, cache) = engine_with(vec![]);
        let query = QueryDescriptor::new();

        let rows = engine.query(&query, &CancelSignal::never()).await.unwrap();
        assert!(rows.is_empty());
        assert_eq!(
            cache.get(&query.cache_key()).await.as_deref(),
            Some("[]")
        );
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss() {
        let product = ExternalProduct::new("Mouse", 19.0);
        let (engine, cache) = engine_with(vec![product.clone()]);
        let query = QueryDescriptor::new();
        let key = query.cache_key();

        cache
            .insert(key.clone(), "{not json".to_string(), CacheConfig::default().query_ttl)
            .await
            .unwrap();

        let (rows, outcome) = engine
            .query_with_outcome(&query, &CancelSignal::never())
            .await
            .unwrap();
        assert_eq!(outcome, CacheOutcome::Miss);
        assert_eq!(rows, vec![product]);

        // Overwritten with a readable payload
        let payload = cache.get(&key).await.unwrap();
        assert!(serde_json::from_str::<Vec<ExternalProduct>>(&payload).is_ok());
    }

    #[tokio::test]
    async fn test_store_uses_aggregate_ttl() {
        let product = ExternalProduct::new("Monitor", 899.0);
        let (engine, cache) = engine_with(vec![]);

        engine
            .store(&product.identity_key(), &product, &CancelSignal::never())
            .await
            .unwrap();

        let ttl = cache.ttl(&product.identity_key()).await.unwrap();
        assert!(ttl > CacheConfig::default().query_ttl);
    }

    #[tokio::test]
    async fn test_store_rejects_blank_and_empty_key() {
        let (engine, cache) = engine_with(vec![]);
        let mut blank = ExternalProduct::new("Ghost", 1.0);
        blank.id = uuid::Uuid::nil();

        let result = engine.store("k", &blank, &CancelSignal::never()).await;
        assert!(matches!(
            result,
            Err(CacheError::InvalidArgument { name: "value", .. })
        ));

        let product = ExternalProduct::new("Real", 1.0);
        let result = engine.store("  ", &product, &CancelSignal::never()).await;
        assert!(matches!(
            result,
            Err(CacheError::InvalidArgument { name: "key", .. })
        ));

        assert!(cache.is_empty().await);
    }
}
