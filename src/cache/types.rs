//! Core type definitions for the decision cache

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cache key type, derived from string request parameters
pub type CacheKey = String;

/// Statistics snapshot for cache performance monitoring
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Decisions answered from the cache
    pub hits: u64,

    /// Cacheable requests that had to be computed by the engine
    pub misses: u64,

    /// Requests that skipped the cache (disabled or not cacheable)
    pub bypassed: u64,

    /// Full clears plus single-key deletions
    pub invalidations: u64,

    /// Store operations that failed
    pub store_errors: u64,
}

impl CacheStats {
    /// Calculate cache hit rate as a percentage of cacheable lookups
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }

    /// Calculate miss rate as a percentage
    pub fn miss_rate(&self) -> f64 {
        100.0 - self.hit_rate()
    }

    /// Total number of enforcement requests seen
    pub fn total_requests(&self) -> u64 {
        self.hits + self.misses + self.bypassed
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CacheStats {{ hits: {}, misses: {}, hit_rate: {:.2}%, bypassed: {}, \
             invalidations: {}, store_errors: {} }}",
            self.hits,
            self.misses,
            self.hit_rate(),
            self.bypassed,
            self.invalidations,
            self.store_errors
        )
    }
}

/// Lock-free counters behind [`CacheStats`]
#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    bypassed: AtomicU64,
    invalidations: AtomicU64,
    store_errors: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_bypass(&self) {
        self.bypassed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_invalidation(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_store_error(&self) {
        self.store_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            bypassed: self.bypassed.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.bypassed.store(0, Ordering::Relaxed);
        self.invalidations.store(0, Ordering::Relaxed);
        self.store_errors.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_stats_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..Default::default()
        };

        assert_eq!(stats.hit_rate(), 80.0);
        assert_eq!(stats.miss_rate(), 20.0);
    }

    #[test]
    fn test_cache_stats_zero_requests() {
        let stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
        assert_eq!(stats.miss_rate(), 100.0);
        assert_eq!(stats.total_requests(), 0);
    }

    #[test]
    fn test_bypass_excluded_from_hit_rate() {
        let stats = CacheStats {
            hits: 1,
            misses: 1,
            bypassed: 98,
            ..Default::default()
        };
        assert_eq!(stats.hit_rate(), 50.0);
        assert_eq!(stats.total_requests(), 100);
    }

    #[test]
    fn test_counters_snapshot_and_reset() {
        let counters = StatsCounters::default();
        counters.record_hit();
        counters.record_hit();
        counters.record_miss();
        counters.record_bypass();
        counters.record_invalidation();
        counters.record_store_error();

        let stats = counters.snapshot();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.bypassed, 1);
        assert_eq!(stats.invalidations, 1);
        assert_eq!(stats.store_errors, 1);

        counters.reset();
        assert_eq!(counters.snapshot(), CacheStats::default());
    }

    #[test]
    fn test_cache_stats_display() {
        let stats = CacheStats {
            hits: 100,
            misses: 50,
            bypassed: 5,
            invalidations: 3,
            store_errors: 0,
        };

        let display = format!("{}", stats);
        assert!(display.contains("hits: 100"));
        assert!(display.contains("misses: 50"));
        assert!(display.contains("bypassed: 5"));
    }
}
