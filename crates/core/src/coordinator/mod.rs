//! Single-flight get-or-populate over a [`CacheStore`]
//!
//! The coordinator adds three things on top of a store: key validation and
//! prefixing, at most one in-flight factory per key, and a policy that turns
//! every store failure into a safe fallback.
//!
//! # Populate flow
//!
//! ```text
//! get_or_populate(key)
//!   -> validate, prefix
//!   -> store.get ......... hit  -> return (no lock)
//!   -> acquire key lock .. cancelled -> PopulateError::Cancelled
//!   -> store.get ......... hit  -> release, return
//!   -> factory() ......... err  -> release, PopulateError::Factory
//!   -> store.set (failure logged, value still returned)
//!   -> release, return
//! ```
//!
//! A store failure during either lookup skips the cache entirely: the lock
//! is released (or never taken) and the factory runs directly. A failure of
//! the final `set` is only logged; the factory never runs twice for one call.

mod key_locks;
mod stats;

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::time::Duration;

use cachegate_domain::{CacheError, CacheOptions, CacheResult, LockStrategy, EMPTY_KEY_MESSAGE};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

pub use self::stats::CoordinatorStats;
use self::key_locks::KeyLocks;
use self::stats::StatsCollector;
use crate::error::PopulateError;
use crate::ports::CacheStore;

/// Caching façade with stampede prevention
///
/// Safe to share between tasks (wrap it in an `Arc`). All operations other
/// than [`get_or_populate`](Self::get_or_populate) report failures as values
/// and never raise.
///
/// # Examples
///
/// ```
/// use std::convert::Infallible;
/// use std::time::Duration;
///
/// use cachegate_core::{CacheCoordinator, CacheStore};
/// use cachegate_domain::CacheOptions;
///
/// async fn load_user<S: CacheStore<String>>(cache: &CacheCoordinator<String, S>) -> String {
///     cache
///         .get_or_populate(
///             "user:1",
///             || async { Ok::<_, Infallible>("Ada".to_string()) },
///             Some(Duration::from_secs(60)),
///         )
///         .await
///         .unwrap_or_default()
/// }
/// ```
pub struct CacheCoordinator<T, S> {
    store: S,
    options: CacheOptions,
    locks: KeyLocks,
    stats: StatsCollector,
    _value: PhantomData<fn() -> T>,
}

impl<T, S> CacheCoordinator<T, S>
where
    T: Clone + Send + Sync + 'static,
    S: CacheStore<T>,
{
    /// Create a coordinator over `store`
    pub fn new(store: S, options: CacheOptions) -> Self {
        let locks = KeyLocks::new(options.lock_strategy);
        let stats = StatsCollector::new(options.enable_statistics);
        Self { store, options, locks, stats, _value: PhantomData }
    }

    /// Create a coordinator after validating `options`
    ///
    /// # Errors
    /// Returns `CacheError::Config` if the options are invalid.
    pub fn try_new(store: S, options: CacheOptions) -> cachegate_domain::Result<Self> {
        options.validate()?;
        Ok(Self::new(store, options))
    }

    pub const fn options(&self) -> &CacheOptions {
        &self.options
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn lock_strategy(&self) -> LockStrategy {
        self.locks.strategy()
    }

    /// Current counters; all zero unless `enable_statistics` is set
    pub fn stats(&self) -> CoordinatorStats {
        self.stats.snapshot()
    }

    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    /// Number of keys that currently have a populate in progress or queued
    ///
    /// Always zero with [`LockStrategy::Global`].
    pub fn in_flight_keys(&self) -> usize {
        self.locks.tracked()
    }

    /// Validate `key` and apply the configured prefix
    ///
    /// # Errors
    /// Returns `CacheError::InvalidArgument` for empty or whitespace-only keys.
    pub fn full_key(&self, key: &str) -> cachegate_domain::Result<String> {
        if key.trim().is_empty() {
            return Err(CacheError::empty_key());
        }
        Ok(self.options.full_key(key))
    }

    /// Return the cached value for `key`, or run `factory` once and cache it
    ///
    /// Concurrent callers for the same key wait for the first one and reuse
    /// its value. `expiration` defaults to `options.default_expiration`.
    ///
    /// # Errors
    /// - `PopulateError::InvalidArgument` if the key is empty or blank.
    /// - `PopulateError::Factory` carrying the factory's own error.
    ///
    /// Store failures are never returned.
    pub async fn get_or_populate<F, Fut, E>(
        &self,
        key: &str,
        factory: F,
        expiration: Option<Duration>,
    ) -> Result<T, PopulateError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.populate(key, factory, expiration, None).await
    }

    /// Same as [`get_or_populate`](Self::get_or_populate), giving up if
    /// `cancel` fires while waiting for the key's lock
    ///
    /// Once the factory has started the token is no longer observed here;
    /// the factory decides for itself whether to honour it.
    ///
    /// # Errors
    /// As [`get_or_populate`](Self::get_or_populate), plus
    /// `PopulateError::Cancelled`.
    pub async fn get_or_populate_with_cancellation<F, Fut, E>(
        &self,
        key: &str,
        factory: F,
        expiration: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<T, PopulateError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.populate(key, factory, expiration, Some(cancel)).await
    }

    #[instrument(level = "debug", skip(self, factory, cancel), fields(store = self.store.name()))]
    async fn populate<F, Fut, E>(
        &self,
        key: &str,
        factory: F,
        expiration: Option<Duration>,
        cancel: Option<&CancellationToken>,
    ) -> Result<T, PopulateError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let full_key = self
            .full_key(key)
            .map_err(|_| PopulateError::InvalidArgument(EMPTY_KEY_MESSAGE.to_string()))?;

        match self.store.get(&full_key).await {
            Ok(Some(value)) => {
                self.stats.record_hit();
                debug!(key = %full_key, "cache hit");
                return Ok(value);
            }
            Ok(None) => self.stats.record_miss(),
            Err(err) => {
                self.stats.record_store_failure();
                warn!(key = %full_key, error = %err, "store lookup failed, bypassing cache");
                return self.run_factory(factory).await;
            }
        }

        let guard = match cancel {
            Some(token) => tokio::select! {
                biased;
                () = token.cancelled() => {
                    debug!(key = %full_key, "cancelled while waiting for populate lock");
                    return Err(PopulateError::Cancelled);
                }
                guard = self.locks.acquire(&full_key) => guard,
            },
            None => self.locks.acquire(&full_key).await,
        };
        self.stats.record_lock_acquisition();

        // Another caller may have populated the key while we waited.
        match self.store.get(&full_key).await {
            Ok(Some(value)) => {
                self.stats.record_hit();
                debug!(key = %full_key, "populated by a concurrent caller");
                return Ok(value);
            }
            Ok(None) => {}
            Err(err) => {
                self.stats.record_store_failure();
                warn!(key = %full_key, error = %err, "store re-check failed, bypassing cache");
                drop(guard);
                return self.run_factory(factory).await;
            }
        }

        let value = self.run_factory(factory).await?;
        let ttl = self.options.effective_expiration(expiration);
        match self.store.set(&full_key, value.clone(), ttl).await {
            Ok(true) => debug!(key = %full_key, ttl_secs = ttl.as_secs(), "cached factory value"),
            Ok(false) => warn!(key = %full_key, "store declined factory value"),
            Err(err) => {
                self.stats.record_store_failure();
                warn!(key = %full_key, error = %err, "failed to cache factory value");
            }
        }

        drop(guard);
        Ok(value)
    }

    async fn run_factory<F, Fut, E>(&self, factory: F) -> Result<T, PopulateError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.stats.record_factory_run();
        factory().await.map_err(PopulateError::Factory)
    }

    /// Look up `key` without populating it
    ///
    /// Never raises: blank keys and store failures become
    /// [`CacheResult::Error`].
    pub async fn get(&self, key: &str) -> CacheResult<T> {
        let Ok(full_key) = self.full_key(key) else {
            return CacheResult::error(EMPTY_KEY_MESSAGE);
        };

        match self.store.get(&full_key).await {
            Ok(Some(value)) => {
                self.stats.record_hit();
                CacheResult::Hit(value)
            }
            Ok(None) => {
                self.stats.record_miss();
                CacheResult::Miss
            }
            Err(err) => {
                self.stats.record_store_failure();
                warn!(key = %full_key, error = %err, "store get failed");
                CacheResult::error(err.to_string())
            }
        }
    }

    /// Store `value` under `key`
    ///
    /// Returns the store's answer; `false` for blank keys or store failures.
    pub async fn set(&self, key: &str, value: T, expiration: Option<Duration>) -> bool {
        let Ok(full_key) = self.full_key(key) else {
            return false;
        };
        let ttl = self.options.effective_expiration(expiration);

        self.store.set(&full_key, value, ttl).await.unwrap_or_else(|err| {
            self.stats.record_store_failure();
            warn!(key = %full_key, error = %err, "store set failed");
            false
        })
    }

    /// Remove `key`; `false` for blank keys or store failures
    pub async fn remove(&self, key: &str) -> bool {
        let Ok(full_key) = self.full_key(key) else {
            return false;
        };

        self.store.remove(&full_key).await.unwrap_or_else(|err| {
            self.stats.record_store_failure();
            warn!(key = %full_key, error = %err, "store remove failed");
            false
        })
    }

    /// Whether `key` holds a value; `false` for blank keys or store failures
    pub async fn exists(&self, key: &str) -> bool {
        let Ok(full_key) = self.full_key(key) else {
            return false;
        };

        self.store.exists(&full_key).await.unwrap_or_else(|err| {
            self.stats.record_store_failure();
            warn!(key = %full_key, error = %err, "store exists failed");
            false
        })
    }

    /// Clear the store; failures are logged and absorbed
    pub async fn clear(&self) {
        if let Err(err) = self.store.clear().await {
            self.stats.record_store_failure();
            warn!(store = self.store.name(), error = %err, "store clear failed");
        }
    }
}

impl<T, S> fmt::Debug for CacheCoordinator<T, S>
where
    T: Clone + Send + Sync + 'static,
    S: CacheStore<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheCoordinator")
            .field("store", &self.store.name())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
