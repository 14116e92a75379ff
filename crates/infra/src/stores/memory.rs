//! In-process store backed by moka
//!
//! Each entry carries its own time-to-live, so two keys written with
//! different expirations expire independently. Reads never return an entry
//! past its expiration, even before moka's housekeeping has evicted it.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use cachegate_core::{CacheStore, StoreResult};
use moka::future::Cache;
use moka::Expiry;

const MEMORY_STORE_NAME: &str = "memory";

/// Stored value plus the TTL it was written with
#[derive(Debug, Clone)]
struct StoredEntry<T> {
    value: T,
    ttl: Duration,
}

/// Expires every entry `ttl` after its latest write
struct PerEntryTtl;

impl<T> Expiry<String, StoredEntry<T>> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &StoredEntry<T>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &StoredEntry<T>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Concurrent in-memory store with per-entry expiration
///
/// Cloning is cheap and clones share the same entries.
#[derive(Clone)]
pub struct MemoryStore<T> {
    cache: Cache<String, StoredEntry<T>>,
}

impl<T> MemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an unbounded store
    pub fn new() -> Self {
        Self { cache: Cache::builder().expire_after(PerEntryTtl).build() }
    }

    /// Create a store holding at most `max_capacity` entries
    ///
    /// When full, moka evicts entries by its own admission policy.
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(max_capacity).expire_after(PerEntryTtl).build(),
        }
    }

    /// Approximate number of live entries
    ///
    /// Pending evictions are applied first, so expired entries are not
    /// counted.
    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}

impl<T> Default for MemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for MemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entry_count", &self.cache.entry_count())
            .field("max_capacity", &self.cache.policy().max_capacity())
            .finish()
    }
}

#[async_trait]
impl<T> CacheStore<T> for MemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        MEMORY_STORE_NAME
    }

    async fn get(&self, key: &str) -> StoreResult<Option<T>> {
        Ok(self.cache.get(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: T, ttl: Duration) -> StoreResult<bool> {
        self.cache.insert(key.to_string(), StoredEntry { value, ttl }).await;
        Ok(true)
    }

    async fn remove(&self, key: &str) -> StoreResult<bool> {
        self.cache.invalidate(key).await;
        Ok(true)
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.cache.contains_key(key))
    }

    async fn clear(&self) -> StoreResult<()> {
        self.cache.invalidate_all();
        tracing::debug!(store = MEMORY_STORE_NAME, "invalidated all entries");
        Ok(())
    }
}
