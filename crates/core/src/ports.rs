//! Port interfaces for the backing store and value codec
//!
//! The coordinator only talks to storage through [`CacheStore`]. Adapters
//! live in `cachegate-infra`; test doubles live in [`crate::testing`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cachegate_domain::{CodecError, StoreError};

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Key-value store with per-entry absolute expiration
///
/// Implementations must be safe for concurrent use; the coordinator adds no
/// synchronization around individual calls. `Ok(None)` from [`get`] means the
/// key is absent, `Err(_)` means the store failed.
///
/// [`get`]: CacheStore::get
#[async_trait]
pub trait CacheStore<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// A short name for logs (e.g. "memory", "serializing")
    fn name(&self) -> &'static str;

    /// Fetch the value stored under `key`
    async fn get(&self, key: &str) -> StoreResult<Option<T>>;

    /// Store `value` under `key`, expiring `ttl` from now
    async fn set(&self, key: &str, value: T, ttl: Duration) -> StoreResult<bool>;

    /// Remove `key`; removing an absent key is not an error
    async fn remove(&self, key: &str) -> StoreResult<bool>;

    /// Whether `key` currently holds an unexpired value
    async fn exists(&self, key: &str) -> StoreResult<bool>;

    /// Drop every entry
    ///
    /// Stores that cannot enumerate their keys may treat this as a no-op.
    async fn clear(&self) -> StoreResult<()>;
}

#[async_trait]
impl<T, S> CacheStore<T> for Arc<S>
where
    T: Send + Sync + 'static,
    S: CacheStore<T> + ?Sized,
{
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn get(&self, key: &str) -> StoreResult<Option<T>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: T, ttl: Duration) -> StoreResult<bool> {
        (**self).set(key, value, ttl).await
    }

    async fn remove(&self, key: &str) -> StoreResult<bool> {
        (**self).remove(key).await
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        (**self).exists(key).await
    }

    async fn clear(&self) -> StoreResult<()> {
        (**self).clear().await
    }
}

/// Type-erased store, used where the adapter is chosen at runtime
pub type DynStore<T> = Arc<dyn CacheStore<T>>;

/// Converts a typed value to and from a text encoding
pub trait ValueCodec<T>: Send + Sync {
    /// Short name of the encoding (e.g. "json")
    fn format(&self) -> &'static str;

    /// Encode a value for storage
    fn encode(&self, value: &T) -> Result<String, CodecError>;

    /// Decode a stored payload
    fn decode(&self, payload: &str) -> Result<T, CodecError>;
}
