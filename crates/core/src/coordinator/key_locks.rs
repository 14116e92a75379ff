//! Lock table for the single-flight section
//!
//! With [`LockStrategy::PerKey`] every full key gets its own async mutex,
//! created on first use and removed from the table once no holder or waiter
//! references it. With [`LockStrategy::Global`] one mutex serves every key.

use std::sync::Arc;

use cachegate_domain::LockStrategy;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type KeyLock = Arc<Mutex<()>>;

#[derive(Debug)]
pub(crate) struct KeyLocks {
    strategy: LockStrategy,
    global: KeyLock,
    per_key: DashMap<String, KeyLock>,
}

/// Reference to one lock, kept while waiting for or holding it
///
/// Dropping the handle (including when an acquire future is cancelled) prunes
/// the table entry if nobody else refers to it.
#[derive(Debug)]
struct LockHandle<'a> {
    table: Option<&'a DashMap<String, KeyLock>>,
    key: String,
    lock: KeyLock,
}

impl Drop for LockHandle<'_> {
    fn drop(&mut self) {
        if let Some(table) = self.table {
            // Table entry plus this handle: nobody else is waiting or holding.
            table.remove_if(&self.key, |_, lock| {
                Arc::ptr_eq(lock, &self.lock) && Arc::strong_count(lock) == 2
            });
        }
    }
}

/// Held for the duration of the locked section
#[derive(Debug)]
pub(crate) struct KeyLockGuard<'a> {
    // Field order matters: the mutex is released before the handle prunes.
    _guard: OwnedMutexGuard<()>,
    _handle: LockHandle<'a>,
}

impl KeyLocks {
    pub(crate) fn new(strategy: LockStrategy) -> Self {
        Self { strategy, global: Arc::new(Mutex::new(())), per_key: DashMap::new() }
    }

    pub(crate) const fn strategy(&self) -> LockStrategy {
        self.strategy
    }

    /// Wait until the lock for `full_key` is free and take it
    pub(crate) async fn acquire(&self, full_key: &str) -> KeyLockGuard<'_> {
        let handle = self.handle(full_key);
        let guard = Arc::clone(&handle.lock).lock_owned().await;
        KeyLockGuard { _guard: guard, _handle: handle }
    }

    /// Number of per-key locks currently tracked
    pub(crate) fn tracked(&self) -> usize {
        self.per_key.len()
    }

    fn handle(&self, full_key: &str) -> LockHandle<'_> {
        match self.strategy {
            LockStrategy::Global => {
                LockHandle { table: None, key: String::new(), lock: Arc::clone(&self.global) }
            }
            LockStrategy::PerKey => {
                let lock = Arc::clone(self.per_key.entry(full_key.to_string()).or_default().value());
                LockHandle { table: Some(&self.per_key), key: full_key.to_string(), lock }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn per_key_locks_are_pruned_after_release() {
        let locks = KeyLocks::new(LockStrategy::PerKey);

        {
            let _guard = locks.acquire("a").await;
            assert_eq!(locks.tracked(), 1);
        }

        assert_eq!(locks.tracked(), 0);
    }

    #[tokio::test]
    async fn different_keys_do_not_block_each_other() {
        let locks = KeyLocks::new(LockStrategy::PerKey);
        let _a = locks.acquire("a").await;

        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire("b")).await;
        assert!(b.is_ok(), "lock for 'b' must not wait on 'a'");
    }

    #[tokio::test]
    async fn global_strategy_serializes_all_keys() {
        let locks = KeyLocks::new(LockStrategy::Global);
        let _a = locks.acquire("a").await;

        let b = tokio::time::timeout(Duration::from_millis(50), locks.acquire("b")).await;
        assert!(b.is_err(), "global lock must be shared across keys");
        assert_eq!(locks.tracked(), 0);
    }

    #[tokio::test]
    async fn same_key_waits_for_holder() {
        let locks = Arc::new(KeyLocks::new(LockStrategy::PerKey));
        let guard = locks.acquire("k").await;

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire("k").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.expect("waiter task panicked");
        assert_eq!(locks.tracked(), 0);
    }

    #[tokio::test]
    async fn cancelled_waiter_does_not_leak_entry() {
        let locks = KeyLocks::new(LockStrategy::PerKey);
        let guard = locks.acquire("k").await;

        let timed_out = tokio::time::timeout(Duration::from_millis(20), locks.acquire("k")).await;
        assert!(timed_out.is_err());
        assert_eq!(locks.tracked(), 1);

        drop(guard);
        assert_eq!(locks.tracked(), 0);
    }
}
