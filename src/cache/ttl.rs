//! In-memory decision store that enforces expiry
//!
//! Unlike [`MemoryStore`](crate::cache::MemoryStore), this store honours the
//! survival hint of every write:
//! - Per-entry TTL, falling back to the configured `default_ttl`
//! - Expired entries read as absent, and are dropped by `purge_expired`,
//!   by an overwrite, or when the size bound is reached
//! - Optional LRU eviction once `max_entries` is reached
//!
//! Reads never reorder anything. A hit bumps the entry's recency tick, and
//! eviction walks the insertion queue, requeueing any entry used since it was
//! queued and evicting the first one that was not.

use crate::cache::entry::DecisionEntry;
use crate::cache::store::{effective_ttl, DecisionStore};
use crate::cache::types::CacheKey;
use crate::config::CacheConfig;
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// Slack allowed for records of removed entries before the queue is compacted
const QUEUE_SLACK: usize = 64;

/// Position of one insertion in the eviction queue
#[derive(Debug)]
struct QueuedKey {
    key: CacheKey,
    generation: u64,
    tick: u64,
}

/// Expiring store with an optional size bound
pub struct TtlStore {
    config: CacheConfig,

    /// Main storage: key -> entry
    entries: HashMap<CacheKey, DecisionEntry>,

    /// Eviction order for bounded stores: front is the oldest record
    lru_queue: VecDeque<QueuedKey>,

    /// Monotonic tick stamped on writes and hits
    clock: AtomicU64,

    /// Entries dropped by expiry or the size bound since creation
    evictions: u64,
}

impl TtlStore {
    /// Create a store using `max_entries`, `default_ttl` and `ttl_jitter` from `config`
    pub fn new(config: CacheConfig) -> Self {
        info!(
            "Initializing ttl store (max_entries: {:?}, default_ttl: {:?})",
            config.max_entries, config.default_ttl
        );

        Self {
            config,
            entries: HashMap::new(),
            lru_queue: VecDeque::new(),
            clock: AtomicU64::new(0),
            evictions: 0,
        }
    }

    /// Remove every expired entry, returning the removed keys
    pub fn purge_expired(&mut self) -> Vec<CacheKey> {
        let expired: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove_entry(key);
        }
        self.evictions += expired.len() as u64;

        if !expired.is_empty() {
            debug!("Purged {} expired decisions", expired.len());
        }
        expired
    }

    /// Entries dropped by expiry or the size bound
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    /// Inspect an entry without touching its recency
    pub fn peek(&self, key: &str) -> Option<&DecisionEntry> {
        self.entries.get(key).filter(|entry| !entry.is_expired())
    }

    fn bounded(&self) -> bool {
        self.config.max_entries.is_some()
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn resolve_ttl(&self, hint: Option<Duration>) -> Option<Duration> {
        effective_ttl(hint)
            .or_else(|| effective_ttl(self.config.default_ttl))
            .map(|ttl| self.config.ttl_with_jitter(ttl))
    }

    fn remove_entry(&mut self, key: &str) -> Option<DecisionEntry> {
        // The queue record is left behind and skipped once popped
        let entry = self.entries.remove(key)?;
        self.compact_queue();
        Some(entry)
    }

    fn compact_queue(&mut self) {
        if self.lru_queue.len() <= self.entries.len() * 2 + QUEUE_SLACK {
            return;
        }

        let entries = &self.entries;
        self.lru_queue.retain(|queued| {
            entries
                .get(&queued.key)
                .map_or(false, |entry| entry.generation == queued.generation)
        });
    }

    fn evict_if_needed(&mut self) {
        let Some(max) = self.config.max_entries else {
            return;
        };

        if self.entries.len() >= max {
            self.purge_expired();
        }

        while self.entries.len() >= max {
            let Some(queued) = self.lru_queue.pop_front() else {
                break;
            };

            let last_used = match self.entries.get(&queued.key) {
                Some(entry) if entry.generation == queued.generation => entry.last_used(),
                _ => continue,
            };

            if last_used > queued.tick {
                self.lru_queue.push_back(QueuedKey {
                    tick: last_used,
                    ..queued
                });
            } else {
                debug!("Evicting decision due to max_entries limit: {}", queued.key);
                self.entries.remove(&queued.key);
                self.evictions += 1;
            }
        }
    }
}

#[async_trait]
impl DecisionStore for TtlStore {
    async fn set(
        &mut self,
        key: &str,
        value: bool,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        let ttl = self.resolve_ttl(ttl);
        let tick = self.tick();

        let existing = self.entries.get(key).map(|entry| entry.generation);
        let generation = match existing {
            Some(generation) => {
                debug!("Updating cached decision: {}", key);
                generation
            }
            None => {
                self.evict_if_needed();
                if self.bounded() {
                    self.lru_queue.push_back(QueuedKey {
                        key: key.to_string(),
                        generation: tick,
                        tick,
                    });
                }
                tick
            }
        };

        let entry = DecisionEntry::new(value, ttl).stamped(generation, tick);
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<bool>, StoreError> {
        match self.entries.get(key) {
            // Expired entries are left for the next write or purge
            Some(entry) if entry.is_expired() => {
                debug!("Cached decision expired: {}", key);
                Ok(None)
            }
            Some(entry) => {
                entry.touch(self.tick());
                Ok(Some(entry.value))
            }
            None => Ok(None),
        }
    }

    async fn delete(&mut self, key: &str) -> Result<Option<bool>, StoreError> {
        Ok(self
            .remove_entry(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value))
    }

    async fn clear(&mut self) -> Result<(), StoreError> {
        self.entries.clear();
        self.lru_queue.clear();
        Ok(())
    }

    async fn len(&self) -> Result<usize, StoreError> {
        Ok(self.entries.values().filter(|entry| !entry.is_expired()).count())
    }

    fn name(&self) -> &'static str {
        "ttl"
    }
}
