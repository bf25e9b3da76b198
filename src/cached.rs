//! Cached enforcement
//!
//! [`CachedEnforcer`] wraps an [`Enforcer`] and memoizes its decisions.
//! Keys come from [`build_key`], so only all-string requests are cached.
//! Rule removals and policy reloads drop the affected decisions before the
//! engine is touched, so a partial failure leaves a miss behind rather than
//! a stale hit.
//!
//! Locking:
//! - the enable flag is an atomic and never waits on the store
//! - lookups take the store's read lock, writes take its write lock
//! - no lock is held while the engine runs
//!
//! Two identical requests that miss at the same time both reach the engine
//! and both write the same decision.

use crate::cache::invalidation::{InvalidationEvent, InvalidationReason};
use crate::cache::key::{build_key, rule_key};
use crate::cache::memory::MemoryStore;
use crate::cache::store::DecisionStore;
use crate::cache::ttl::TtlStore;
use crate::cache::types::{CacheKey, CacheStats, StatsCounters};
use crate::config::CacheConfig;
use crate::enforcer::Enforcer;
use crate::error::{Result, StoreError};
use crate::request::RequestValue;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

/// Buffered invalidation events per subscriber
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Decision cache in front of an [`Enforcer`]
pub struct CachedEnforcer<E> {
    enforcer: Arc<E>,
    store: RwLock<Box<dyn DecisionStore>>,
    enabled: AtomicBool,
    /// Survival time in milliseconds, zero for no expiry
    expire_millis: AtomicU64,
    metrics: bool,
    stats: StatsCounters,
    events: broadcast::Sender<InvalidationEvent>,
}

impl<E: Enforcer> CachedEnforcer<E> {
    /// Wrap `enforcer` with an in-memory cache, enabled, entries never expiring
    pub fn new(enforcer: E) -> Self {
        Self::from_shared(Arc::new(enforcer))
    }

    /// Wrap an engine that is shared with other components
    pub fn from_shared(enforcer: Arc<E>) -> Self {
        Self::assemble(enforcer, Box::new(MemoryStore::new()), &CacheConfig::default())
    }

    /// Wrap `enforcer` with a caller-supplied store
    pub fn with_store<S>(enforcer: E, store: S) -> Self
    where
        S: DecisionStore + 'static,
    {
        Self::assemble(Arc::new(enforcer), Box::new(store), &CacheConfig::default())
    }

    /// Wrap `enforcer` using `config`
    ///
    /// A [`TtlStore`] is used when the config bounds the cache, sets a
    /// default ttl or asks for ttl jitter, otherwise a [`MemoryStore`].
    pub fn with_config(enforcer: E, config: &CacheConfig) -> Result<Self> {
        config.validate()?;

        let store: Box<dyn DecisionStore> = if needs_ttl_store(config) {
            Box::new(TtlStore::new(config.clone()))
        } else {
            Box::new(MemoryStore::new())
        };

        Ok(Self::assemble(Arc::new(enforcer), store, config))
    }

    fn assemble(enforcer: Arc<E>, store: Box<dyn DecisionStore>, config: &CacheConfig) -> Self {
        info!(
            "Initializing cached enforcer (store: {}, enabled: {}, expire_time: {:?})",
            store.name(),
            config.enabled,
            config.expire_time
        );

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            enforcer,
            store: RwLock::new(store),
            enabled: AtomicBool::new(config.enabled),
            expire_millis: AtomicU64::new(duration_to_millis(config.expire_time)),
            metrics: config.enable_metrics,
            stats: StatsCounters::default(),
            events,
        }
    }

    /// Turn caching on or off; cached decisions survive a disable/enable cycle
    pub fn enable_cache(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Whether lookups currently go through the cache
    pub fn is_cache_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Decide a request, answering from the cache when possible
    ///
    /// Store failures are returned as errors, never treated as misses. A
    /// decision that was computed but could not be written back is also
    /// reported as an error.
    pub async fn enforce(&self, rvals: &[RequestValue]) -> Result<bool> {
        if !self.is_cache_enabled() {
            self.count(StatsCounters::record_bypass);
            return Ok(self.enforcer.enforce(rvals).await?);
        }

        let Some(key) = build_key(rvals) else {
            debug!("Request has non-string parameters, bypassing decision cache");
            self.count(StatsCounters::record_bypass);
            return Ok(self.enforcer.enforce(rvals).await?);
        };

        if let Some(decision) = self.get_cached_result(&key).await? {
            debug!("Decision cache hit: {}", key);
            self.count(StatsCounters::record_hit);
            return Ok(decision);
        }

        debug!("Decision cache miss: {}", key);
        self.count(StatsCounters::record_miss);

        let decision = self.enforcer.enforce(rvals).await?;
        self.set_cached_result(&key, decision, self.expire_hint()).await?;

        Ok(decision)
    }

    /// Reload the engine's rules, clearing the cache first when enabled
    ///
    /// If the clear fails the reload is not attempted.
    pub async fn load_policy(&self) -> Result<()> {
        if self.is_cache_enabled() {
            self.clear_store(InvalidationReason::PolicyReload).await?;
        }

        Ok(self.enforcer.load_policy().await?)
    }

    /// Remove one rule, dropping its cached decision first when enabled
    ///
    /// A store failure other than a missing key aborts before the engine is
    /// asked to remove anything.
    pub async fn remove_policy(&self, params: &[RequestValue]) -> Result<bool> {
        if self.is_cache_enabled() {
            if let Some(key) = build_key(params) {
                self.delete_keys(vec![key], InvalidationReason::PolicyRemoved)
                    .await?;
            }
        }

        Ok(self.enforcer.remove_policy(params).await?)
    }

    /// Remove a batch of rules, dropping each cached decision first when enabled
    ///
    /// The first store failure aborts the batch before the engine is called.
    pub async fn remove_policies(&self, rules: &[Vec<String>]) -> Result<bool> {
        if self.is_cache_enabled() && !rules.is_empty() {
            let keys: Vec<CacheKey> = rules.iter().map(|rule| rule_key(rule)).collect();
            self.delete_keys(keys, InvalidationReason::PoliciesRemoved { count: rules.len() })
                .await?;
        }

        Ok(self.enforcer.remove_policies(rules).await?)
    }

    /// Drop every cached decision
    ///
    /// For callers that change policy through paths this wrapper does not see.
    pub async fn invalidate_cache(&self) -> Result<()> {
        self.clear_store(InvalidationReason::Manual).await
    }

    /// Set the survival time attached to new entries; zero means no expiry
    ///
    /// Requests already in flight may still use the previous value.
    pub fn set_expire_time(&self, expire_time: Duration) {
        self.expire_millis
            .store(duration_to_millis(expire_time), Ordering::Relaxed);
    }

    /// Survival time attached to new entries
    pub fn expire_time(&self) -> Duration {
        Duration::from_millis(self.expire_millis.load(Ordering::Relaxed))
    }

    /// Replace the cache store
    ///
    /// Decisions held by the previous store are discarded with it.
    pub async fn set_cache<S>(&self, store: S)
    where
        S: DecisionStore + 'static,
    {
        let mut guard = self.store.write().await;
        info!("Replacing decision store {} with {}", guard.name(), store.name());
        *guard = Box::new(store);
        drop(guard);

        self.publish(InvalidationEvent::all(InvalidationReason::StoreReplaced));
    }

    /// Number of decisions the store currently holds
    pub async fn cached_entries(&self) -> Result<usize> {
        let store = self.store.read().await;
        Ok(store.len().await?)
    }

    /// Cache statistics since creation or the last reset
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    /// Reset all counters to zero
    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    /// Receive an event whenever cached decisions are dropped
    pub fn subscribe(&self) -> broadcast::Receiver<InvalidationEvent> {
        self.events.subscribe()
    }

    /// The wrapped engine, for operations this layer does not intercept
    pub fn enforcer(&self) -> &E {
        &self.enforcer
    }

    /// Add one rule (not intercepted)
    pub async fn add_policy(&self, params: &[RequestValue]) -> Result<bool> {
        Ok(self.enforcer.add_policy(params).await?)
    }

    /// Add a batch of rules (not intercepted)
    pub async fn add_policies(&self, rules: &[Vec<String>]) -> Result<bool> {
        Ok(self.enforcer.add_policies(rules).await?)
    }

    /// Whether the rule is present (not intercepted)
    pub async fn has_policy(&self, params: &[RequestValue]) -> bool {
        self.enforcer.has_policy(params).await
    }

    /// All rules currently loaded (not intercepted)
    pub async fn get_policy(&self) -> Vec<Vec<String>> {
        self.enforcer.get_policy().await
    }

    fn expire_hint(&self) -> Option<Duration> {
        let expire_time = self.expire_time();
        (!expire_time.is_zero()).then_some(expire_time)
    }

    async fn get_cached_result(&self, key: &str) -> Result<Option<bool>> {
        let store = self.store.read().await;
        store
            .get(key)
            .await
            .map_err(|e| self.store_failure("get", e))
    }

    async fn set_cached_result(
        &self,
        key: &str,
        decision: bool,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let mut store = self.store.write().await;
        store
            .set(key, decision, ttl)
            .await
            .map_err(|e| self.store_failure("set", e))
    }

    async fn delete_keys(&self, keys: Vec<CacheKey>, reason: InvalidationReason) -> Result<()> {
        let mut store = self.store.write().await;
        let mut removed = 0usize;

        for key in &keys {
            if store
                .delete(key)
                .await
                .map_err(|e| self.store_failure("delete", e))?
                .is_some()
            {
                removed += 1;
                self.count(StatsCounters::record_invalidation);
            }
        }
        drop(store);

        debug!(
            "Dropped {} of {} cached decisions ({})",
            removed,
            keys.len(),
            reason
        );
        self.publish(InvalidationEvent::keys(reason, keys));
        Ok(())
    }

    async fn clear_store(&self, reason: InvalidationReason) -> Result<()> {
        let mut store = self.store.write().await;
        store
            .clear()
            .await
            .map_err(|e| self.store_failure("clear", e))?;
        drop(store);

        info!("Cleared decision cache ({})", reason);
        self.count(StatsCounters::record_invalidation);
        self.publish(InvalidationEvent::all(reason));
        Ok(())
    }

    fn store_failure(&self, op: &str, error: StoreError) -> crate::error::CacheError {
        warn!("Decision store {} failed: {}", op, error);
        self.count(StatsCounters::record_store_error);
        error.into()
    }

    fn count(&self, record: fn(&StatsCounters)) {
        if self.metrics {
            record(&self.stats);
        }
    }

    fn publish(&self, event: InvalidationEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

fn needs_ttl_store(config: &CacheConfig) -> bool {
    config.max_entries.is_some() || config.default_ttl.is_some() || config.ttl_jitter > 0.0
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
