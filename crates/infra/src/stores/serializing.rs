//! Store decorator that keeps values in an encoded text form
//!
//! [`SerializingStore`] sits in front of any `CacheStore<String>` and runs
//! every value through a [`ValueCodec`]. A payload that fails to decode is
//! reported as `StoreError::Codec`, which the coordinator treats like any
//! other store-get failure.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cachegate_core::{CacheStore, DynStore, StoreResult, ValueCodec};
use cachegate_domain::{CodecError, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;

const SERIALIZING_STORE_NAME: &str = "serializing";

/// JSON encoding through serde_json
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl<T> ValueCodec<T> for JsonCodec
where
    T: Serialize + DeserializeOwned,
{
    fn format(&self) -> &'static str {
        "json"
    }

    fn encode(&self, value: &T) -> Result<String, CodecError> {
        serde_json::to_string(value).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode(&self, payload: &str) -> Result<T, CodecError> {
        serde_json::from_str(payload).map_err(|e| CodecError::Decode(e.to_string()))
    }
}

/// Typed view over a text store
pub struct SerializingStore<T, C = JsonCodec> {
    inner: DynStore<String>,
    codec: C,
    _value: PhantomData<fn() -> T>,
}

impl<T, C> SerializingStore<T, C>
where
    T: Send + Sync + 'static,
    C: ValueCodec<T>,
{
    /// Wrap `inner`, encoding values with `codec`
    pub fn new<S>(inner: S, codec: C) -> Self
    where
        S: CacheStore<String> + 'static,
    {
        Self::from_shared(Arc::new(inner), codec)
    }

    /// Wrap a store that is also used elsewhere
    pub fn from_shared(inner: DynStore<String>, codec: C) -> Self {
        Self { inner, codec, _value: PhantomData }
    }

    /// The underlying text store
    pub fn inner(&self) -> &DynStore<String> {
        &self.inner
    }

    fn encode(&self, key: &str, value: &T) -> StoreResult<String> {
        self.codec.encode(value).map_err(|err| {
            tracing::warn!(
                key,
                format = self.codec.format(),
                error = %err,
                "failed to encode value"
            );
            StoreError::from(err)
        })
    }

    fn decode(&self, key: &str, payload: &str) -> StoreResult<T> {
        self.codec.decode(payload).map_err(|err| {
            tracing::warn!(
                key,
                format = self.codec.format(),
                error = %err,
                "failed to decode stored payload"
            );
            StoreError::from(err)
        })
    }
}

impl<T, C> std::fmt::Debug for SerializingStore<T, C>
where
    T: Send + Sync + 'static,
    C: ValueCodec<T>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerializingStore")
            .field("inner", &self.inner.name())
            .field("format", &self.codec.format())
            .finish()
    }
}

#[async_trait]
impl<T, C> CacheStore<T> for SerializingStore<T, C>
where
    T: Send + Sync + 'static,
    C: ValueCodec<T> + 'static,
{
    fn name(&self) -> &'static str {
        SERIALIZING_STORE_NAME
    }

    async fn get(&self, key: &str) -> StoreResult<Option<T>> {
        match self.inner.get(key).await? {
            Some(payload) => self.decode(key, &payload).map(Some),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: T, ttl: Duration) -> StoreResult<bool> {
        let payload = self.encode(key, &value)?;
        self.inner.set(key, payload, ttl).await
    }

    async fn remove(&self, key: &str) -> StoreResult<bool> {
        self.inner.remove(key).await
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        self.inner.exists(key).await
    }

    async fn clear(&self) -> StoreResult<()> {
        self.inner.clear().await
    }
}
