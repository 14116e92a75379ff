//! Test doubles for the store port
//!
//! [`MockStore`] keeps values in a plain map, records every call and can be
//! told to fail any operation. It does not expire entries; it records the
//! TTL each `set` received so tests can assert on it.

// Test double: errors are scripted and documented on each setter.
#![allow(clippy::missing_errors_doc)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use cachegate_domain::StoreError;
use parking_lot::Mutex;

use crate::ports::{CacheStore, StoreResult};

const MOCK_STORE_NAME: &str = "mock";

/// Counts of calls the coordinator made against a [`MockStore`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCalls {
    pub gets: usize,
    pub sets: usize,
    pub removes: usize,
    pub exists: usize,
    pub clears: usize,
}

impl StoreCalls {
    /// Total number of calls of any kind
    pub const fn total(&self) -> usize {
        self.gets + self.sets + self.removes + self.exists + self.clears
    }
}

/// In-memory, scriptable store for tests
///
/// Values are kept until removed or cleared.
#[derive(Debug)]
pub struct MockStore<T> {
    entries: Mutex<HashMap<String, T>>,
    ttls: Mutex<HashMap<String, Duration>>,
    gets: AtomicUsize,
    sets: AtomicUsize,
    removes: AtomicUsize,
    exists: AtomicUsize,
    clears: AtomicUsize,
    fail_get: AtomicBool,
    fail_gets_from: Mutex<Option<usize>>,
    fail_set: AtomicBool,
    fail_remove: AtomicBool,
    fail_exists: AtomicBool,
    fail_clear: AtomicBool,
    reject_sets: AtomicBool,
    clear_is_noop: AtomicBool,
}

impl<T> Default for MockStore<T> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttls: Mutex::new(HashMap::new()),
            gets: AtomicUsize::new(0),
            sets: AtomicUsize::new(0),
            removes: AtomicUsize::new(0),
            exists: AtomicUsize::new(0),
            clears: AtomicUsize::new(0),
            fail_get: AtomicBool::new(false),
            fail_gets_from: Mutex::new(None),
            fail_set: AtomicBool::new(false),
            fail_remove: AtomicBool::new(false),
            fail_exists: AtomicBool::new(false),
            fail_clear: AtomicBool::new(false),
            reject_sets: AtomicBool::new(false),
            clear_is_noop: AtomicBool::new(false),
        }
    }
}

impl<T: Clone> MockStore<T> {
    /// Create an empty mock store
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a value in place without counting a `set` call
    pub fn seed<K: Into<String>>(&self, key: K, value: T) {
        self.entries.lock().insert(key.into(), value);
    }

    /// Read a value without counting a `get` call
    pub fn value(&self, key: &str) -> Option<T> {
        self.entries.lock().get(key).cloned()
    }

    /// Keys currently stored
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// TTL passed to the most recent `set` of `key`
    pub fn ttl_of(&self, key: &str) -> Option<Duration> {
        self.ttls.lock().get(key).copied()
    }

    /// Snapshot of the calls made so far
    pub fn calls(&self) -> StoreCalls {
        StoreCalls {
            gets: self.gets.load(Ordering::SeqCst),
            sets: self.sets.load(Ordering::SeqCst),
            removes: self.removes.load(Ordering::SeqCst),
            exists: self.exists.load(Ordering::SeqCst),
            clears: self.clears.load(Ordering::SeqCst),
        }
    }

    /// Make every `get` fail
    pub fn fail_get(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    /// Make the `n`-th `get` (1-based) and all later ones fail
    pub fn fail_gets_from(&self, n: usize) {
        *self.fail_gets_from.lock() = Some(n);
    }

    /// Make every `set` fail
    pub fn fail_set(&self, fail: bool) {
        self.fail_set.store(fail, Ordering::SeqCst);
    }

    /// Make every `remove` fail
    pub fn fail_remove(&self, fail: bool) {
        self.fail_remove.store(fail, Ordering::SeqCst);
    }

    /// Make every `exists` fail
    pub fn fail_exists(&self, fail: bool) {
        self.fail_exists.store(fail, Ordering::SeqCst);
    }

    /// Make every `clear` fail
    pub fn fail_clear(&self, fail: bool) {
        self.fail_clear.store(fail, Ordering::SeqCst);
    }

    /// Answer `Ok(false)` to every `set` without storing
    pub fn reject_sets(&self, reject: bool) {
        self.reject_sets.store(reject, Ordering::SeqCst);
    }

    /// Behave like a store that cannot enumerate its keys
    pub fn clear_is_noop(&self, noop: bool) {
        self.clear_is_noop.store(noop, Ordering::SeqCst);
    }

    fn failure(operation: &str) -> StoreError {
        StoreError::backend(MOCK_STORE_NAME, format!("scripted {operation} failure"))
    }
}

#[async_trait]
impl<T> CacheStore<T> for MockStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        MOCK_STORE_NAME
    }

    async fn get(&self, key: &str) -> StoreResult<Option<T>> {
        let call = self.gets.fetch_add(1, Ordering::SeqCst) + 1;
        let scripted = self.fail_gets_from.lock().is_some_and(|from| call >= from);
        if scripted || self.fail_get.load(Ordering::SeqCst) {
            return Err(Self::failure("get"));
        }
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: T, ttl: Duration) -> StoreResult<bool> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        if self.fail_set.load(Ordering::SeqCst) {
            return Err(Self::failure("set"));
        }
        if self.reject_sets.load(Ordering::SeqCst) {
            return Ok(false);
        }
        self.entries.lock().insert(key.to_string(), value);
        self.ttls.lock().insert(key.to_string(), ttl);
        Ok(true)
    }

    async fn remove(&self, key: &str) -> StoreResult<bool> {
        self.removes.fetch_add(1, Ordering::SeqCst);
        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(Self::failure("remove"));
        }
        self.entries.lock().remove(key);
        Ok(true)
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        self.exists.fetch_add(1, Ordering::SeqCst);
        if self.fail_exists.load(Ordering::SeqCst) {
            return Err(Self::failure("exists"));
        }
        Ok(self.entries.lock().contains_key(key))
    }

    async fn clear(&self) -> StoreResult<()> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        if self.fail_clear.load(Ordering::SeqCst) {
            return Err(Self::failure("clear"));
        }
        if !self.clear_is_noop.load(Ordering::SeqCst) {
            self.entries.lock().clear();
            self.ttls.lock().clear();
        }
        Ok(())
    }
}
