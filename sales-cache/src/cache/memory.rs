//! In-process cache backend with per-entry TTL and LRU eviction

use crate::cache::{
    backend::DistributedCache,
    config::CacheConfig,
    entry::CacheEntry,
    types::{CacheKey, CacheStats, CacheValue},
};
use crate::error::{CacheError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// In-memory [`DistributedCache`] implementation
///
/// This implementation provides:
/// - Thread-safe async access via RwLock
/// - Absolute per-entry expiry supplied by the writer
/// - LRU eviction when entry or byte limits are reached
/// - Hit/miss/eviction statistics
pub struct MemoryCache {
    pub(crate) config: CacheConfig,
    store: Arc<RwLock<CacheStore>>,
}

/// Internal cache storage
struct CacheStore {
    /// Main storage: key -> entry
    entries: HashMap<CacheKey, CacheEntry>,

    /// LRU tracking: front is least recently used
    lru_queue: VecDeque<CacheKey>,

    stats: CacheStats,

    current_size_bytes: usize,
}

impl MemoryCache {
    /// Create a new cache with the given configuration
    pub fn new(config: CacheConfig) -> Self {
        info!("Initializing in-memory cache backend with config: {:?}", config);

        let store = CacheStore {
            entries: HashMap::new(),
            lru_queue: VecDeque::new(),
            stats: CacheStats::default(),
            current_size_bytes: 0,
        };

        Self {
            config,
            store: Arc::new(RwLock::new(store)),
        }
    }

    /// Insert a value with an explicit TTL, replacing any previous value
    pub async fn insert(&self, key: CacheKey, value: CacheValue, ttl: Duration) -> Result<()> {
        let entry = CacheEntry::new(key.clone(), value, ttl);
        let size = entry.size_bytes();

        let mut store = self.store.write().await;

        // An overwrite frees the old slot before limits are checked
        if store.entries.contains_key(&key) {
            debug!("Overwriting cache entry: {}", key);
            self.remove_entry(&mut store, &key);
        } else {
            debug!("Inserting new cache entry: {}", key);
        }

        self.evict_if_needed(&mut store, size)?;

        store.entries.insert(key.clone(), entry);
        store.lru_queue.push_back(key);
        store.current_size_bytes += size;
        store.stats.writes += 1;

        self.update_stats(&mut store);

        Ok(())
    }

    /// Get a value from the cache, dropping it if expired
    pub async fn get(&self, key: &str) -> Option<CacheValue> {
        let mut store = self.store.write().await;

        let expired = match store.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                debug!("Cache miss: {}", key);
                store.stats.misses += 1;
                return None;
            }
        };

        if expired {
            debug!("Cache entry expired: {}", key);
            store.stats.misses += 1;
            store.stats.evictions_ttl += 1;
            self.remove_entry(&mut store, key);
            return None;
        }

        let value = match store.entries.get(key) {
            Some(entry) => entry.value.clone(),
            None => return None,
        };
        store.stats.hits += 1;

        if self.config.enable_lru_eviction {
            store.lru_queue.retain(|k| k != key);
            store.lru_queue.push_back(key.to_string());
        }

        debug!("Cache hit: {}", key);
        Some(value)
    }

    /// Remaining lifetime of a live entry
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let store = self.store.read().await;
        store
            .entries
            .get(key)
            .and_then(|entry| entry.time_until_expiration())
    }

    /// Check if a key exists in the cache (without updating access order)
    pub async fn contains_key(&self, key: &str) -> bool {
        let store = self.store.read().await;
        store
            .entries
            .get(key)
            .map(|entry| !entry.is_expired())
            .unwrap_or(false)
    }

    /// Remove a specific entry from the cache
    pub async fn remove(&self, key: &str) -> Option<CacheValue> {
        let mut store = self.store.write().await;
        let value = store.entries.get(key).map(|e| e.value.clone());
        self.remove_entry(&mut store, key);
        value
    }

    /// Clear all entries from the cache
    pub async fn clear(&self) {
        let mut store = self.store.write().await;

        let count = store.entries.len();
        store.entries.clear();
        store.lru_queue.clear();
        store.current_size_bytes = 0;
        store.stats.entries = 0;
        store.stats.size_bytes = 0;

        info!("Cleared {} entries from cache", count);
    }

    /// Remove all expired entries, returning their keys
    pub async fn cleanup_expired(&self) -> Vec<CacheKey> {
        let mut store = self.store.write().await;

        let expired_keys: Vec<CacheKey> = store
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove_entry(&mut store, key);
        }

        if !expired_keys.is_empty() {
            store.stats.evictions_ttl += expired_keys.len() as u64;
            debug!("Cleaned up {} expired entries", expired_keys.len());
        }

        expired_keys
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        let store = self.store.read().await;
        store.stats.clone()
    }

    /// Get number of entries in cache
    pub async fn len(&self) -> usize {
        let store = self.store.read().await;
        store.entries.len()
    }

    /// Check if cache is empty
    pub async fn is_empty(&self) -> bool {
        let store = self.store.read().await;
        store.entries.is_empty()
    }

    fn remove_entry(&self, store: &mut CacheStore, key: &str) {
        if let Some(entry) = store.entries.remove(key) {
            store.lru_queue.retain(|k| k != key);
            store.current_size_bytes = store.current_size_bytes.saturating_sub(entry.size_bytes());
            store.stats.entries = store.entries.len();
        }
    }

    fn evict_if_needed(&self, store: &mut CacheStore, needed_size: usize) -> Result<()> {
        if needed_size > self.config.max_size_bytes {
            warn!(
                "Entry of {} bytes exceeds cache limit of {} bytes",
                needed_size, self.config.max_size_bytes
            );
            return Err(CacheError::Other(format!(
                "Cache entry of {} bytes exceeds size limit",
                needed_size
            )));
        }

        while store.entries.len() >= self.config.max_entries {
            let Some(key) = store.lru_queue.pop_front() else {
                break;
            };
            debug!("Evicting entry due to max_entries limit: {}", key);
            self.remove_entry(store, &key);
            store.stats.evictions_size += 1;
        }

        while store.current_size_bytes + needed_size > self.config.max_size_bytes {
            let Some(key) = store.lru_queue.pop_front() else {
                warn!("Cannot evict more entries, cache size limit exceeded");
                return Err(CacheError::Other("Cache size limit exceeded".to_string()));
            };
            debug!("Evicting entry due to size limit: {}", key);
            self.remove_entry(store, &key);
            store.stats.evictions_size += 1;
        }

        Ok(())
    }

    fn update_stats(&self, store: &mut CacheStore) {
        store.stats.entries = store.entries.len();
        if self.config.enable_metrics {
            store.stats.size_bytes = store.current_size_bytes;
        }
    }
}

#[async_trait]
impl DistributedCache for MemoryCache {
    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key).await)
    }

    async fn set_string(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        self.insert(key.to_string(), value, ttl).await
    }
}

/// Background task sweeping expired entries every `cleanup_interval`
pub async fn start_auto_cleanup(cache: Arc<MemoryCache>) {
    let interval = cache.config.cleanup_interval;

    info!("Starting automatic cache cleanup task (interval: {:?})", interval);

    loop {
        tokio::time::sleep(interval).await;

        let removed = cache.cleanup_expired().await;
        if !removed.is_empty() {
            debug!("Auto cleanup removed {} entries", removed.len());
        }
    }
}
