//! Coordinator statistics
//!
//! Counters are only advanced when `enable_statistics` is set. No caching
//! decision reads them.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of coordinator counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorStats {
    /// Lookups that found a value (fast path, double-check or `get`)
    pub hits: u64,

    /// Lookups that found nothing
    pub misses: u64,

    /// Factory invocations, including fallback runs
    pub factory_runs: u64,

    /// Store operations that failed and were absorbed
    pub store_failures: u64,

    /// Times a caller entered the locked section
    pub lock_acquisitions: u64,
}

impl CoordinatorStats {
    /// Calculate hit rate (hits / total lookups)
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_lookups();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Total number of lookups that reached a verdict (hits + misses)
    pub const fn total_lookups(&self) -> u64 {
        self.hits + self.misses
    }
}

/// Lock-free counters behind [`CoordinatorStats`]
#[derive(Debug, Default)]
pub(crate) struct StatsCollector {
    enabled: bool,
    hits: AtomicU64,
    misses: AtomicU64,
    factory_runs: AtomicU64,
    store_failures: AtomicU64,
    lock_acquisitions: AtomicU64,
}

impl StatsCollector {
    pub(crate) fn new(enabled: bool) -> Self {
        Self { enabled, ..Self::default() }
    }

    pub(crate) fn record_hit(&self) {
        self.bump(&self.hits);
    }

    pub(crate) fn record_miss(&self) {
        self.bump(&self.misses);
    }

    pub(crate) fn record_factory_run(&self) {
        self.bump(&self.factory_runs);
    }

    pub(crate) fn record_store_failure(&self) {
        self.bump(&self.store_failures);
    }

    pub(crate) fn record_lock_acquisition(&self) {
        self.bump(&self.lock_acquisitions);
    }

    pub(crate) fn snapshot(&self) -> CoordinatorStats {
        CoordinatorStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            factory_runs: self.factory_runs.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
            lock_acquisitions: self.lock_acquisitions.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn reset(&self) {
        for counter in [
            &self.hits,
            &self.misses,
            &self.factory_runs,
            &self.store_failures,
            &self.lock_acquisitions,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    fn bump(&self, counter: &AtomicU64) {
        if self.enabled {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for coordinator::stats.
    use super::*;

    /// Validates hit rate over a mixed sample.
    #[test]
    fn test_hit_rate_calculation() {
        let stats = CoordinatorStats { hits: 80, misses: 20, ..Default::default() };

        assert!((stats.hit_rate() - 0.8).abs() < 1e-10);
        assert_eq!(stats.total_lookups(), 100);
    }

    #[test]
    fn test_hit_rate_no_lookups() {
        assert!(CoordinatorStats::default().hit_rate().abs() < f64::EPSILON);
    }

    /// Disabled collectors never move.
    #[test]
    fn test_disabled_collector_stays_at_zero() {
        let collector = StatsCollector::new(false);
        collector.record_hit();
        collector.record_factory_run();
        collector.record_store_failure();

        assert_eq!(collector.snapshot(), CoordinatorStats::default());
    }

    #[test]
    fn test_enabled_collector_counts_and_resets() {
        let collector = StatsCollector::new(true);
        collector.record_hit();
        collector.record_hit();
        collector.record_miss();
        collector.record_lock_acquisition();

        let stats = collector.snapshot();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.lock_acquisitions, 1);

        collector.reset();
        assert_eq!(collector.snapshot(), CoordinatorStats::default());
    }
}
