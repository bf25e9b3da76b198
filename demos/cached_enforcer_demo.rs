//! Cached Enforcer Demo
//!
//! Wraps a toy rule-table engine with a decision cache and shows hits,
//! bypasses and invalidation.
//!
//! Usage:
//!   cargo run --example cached_enforcer_demo
//!
//! Environment variables (also read from `.env`):
//!   DECISION_CACHE_ENABLED     - enable the cache (default: true)
//!   DECISION_CACHE_EXPIRE_SECS - survival time of cached decisions (default: 0)
//!   DECISION_CACHE_MAX_ENTRIES - bound the cache with a ttl store
//!   RUST_LOG                   - log filter (default: decision_cache=debug)

use async_trait::async_trait;
use decision_cache::{CacheConfig, CachedEnforcer, Enforcer, EnforcerError, RequestValue};
use serde_json::json;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Rule table engine with an artificial evaluation cost
struct SlowTableEnforcer {
    rules: RwLock<Vec<Vec<String>>>,
    cost: Duration,
}

impl SlowTableEnforcer {
    fn new(rules: Vec<Vec<String>>, cost: Duration) -> Self {
        Self {
            rules: RwLock::new(rules),
            cost,
        }
    }

    fn key(params: &[RequestValue]) -> Vec<String> {
        params.iter().map(|p| p.to_string()).collect()
    }

    fn rules(&self) -> Result<RwLockReadGuard<'_, Vec<Vec<String>>>, EnforcerError> {
        self.rules
            .read()
            .map_err(|_| EnforcerError::Other("rule table poisoned".to_string()))
    }

    fn rules_mut(&self) -> Result<RwLockWriteGuard<'_, Vec<Vec<String>>>, EnforcerError> {
        self.rules
            .write()
            .map_err(|_| EnforcerError::Other("rule table poisoned".to_string()))
    }
}

#[async_trait]
impl Enforcer for SlowTableEnforcer {
    async fn enforce(&self, rvals: &[RequestValue]) -> Result<bool, EnforcerError> {
        tokio::time::sleep(self.cost).await;
        let wanted = Self::key(rvals);
        Ok(self.rules()?.iter().any(|rule| *rule == wanted))
    }

    async fn load_policy(&self) -> Result<(), EnforcerError> {
        Ok(())
    }

    async fn remove_policy(&self, params: &[RequestValue]) -> Result<bool, EnforcerError> {
        let wanted = Self::key(params);
        let mut rules = self.rules_mut()?;
        let before = rules.len();
        rules.retain(|rule| *rule != wanted);
        Ok(rules.len() != before)
    }

    async fn remove_policies(&self, batch: &[Vec<String>]) -> Result<bool, EnforcerError> {
        let mut rules = self.rules_mut()?;
        let before = rules.len();
        rules.retain(|rule| !batch.contains(rule));
        Ok(rules.len() != before)
    }

    async fn add_policy(&self, params: &[RequestValue]) -> Result<bool, EnforcerError> {
        let rule = Self::key(params);
        let mut rules = self.rules_mut()?;
        if rules.contains(&rule) {
            return Ok(false);
        }
        rules.push(rule);
        Ok(true)
    }

    async fn add_policies(&self, batch: &[Vec<String>]) -> Result<bool, EnforcerError> {
        let mut rules = self.rules_mut()?;
        let before = rules.len();
        for rule in batch {
            if !rules.contains(rule) {
                rules.push(rule.clone());
            }
        }
        Ok(rules.len() != before)
    }

    async fn has_policy(&self, params: &[RequestValue]) -> bool {
        let wanted = Self::key(params);
        self.rules().map(|r| r.contains(&wanted)).unwrap_or(false)
    }

    async fn get_policy(&self) -> Vec<Vec<String>> {
        self.rules().map(|r| r.clone()).unwrap_or_default()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "decision_cache=debug,cached_enforcer_demo=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CacheConfig::from_env()?;
    info!("Using cache config: {:?}", config);

    let engine = SlowTableEnforcer::new(
        vec![
            vec!["alice".into(), "data1".into(), "read".into()],
            vec!["bob".into(), "data2".into(), "write".into()],
        ],
        Duration::from_millis(25),
    );
    let cached = CachedEnforcer::with_config(engine, &config)?;

    let mut events = cached.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!("Invalidation event {}: {} ({:?})", event.id, event.reason, event.scope);
        }
    });

    let alice: Vec<RequestValue> = vec!["alice".into(), "data1".into(), "read".into()];

    info!("--- Repeated request ---");
    for attempt in 1..=3 {
        let start = Instant::now();
        let allowed = cached.enforce(&alice).await?;
        info!("attempt {}: allowed={} in {:?}", attempt, allowed, start.elapsed());
    }

    info!("--- Structured request (bypasses cache) ---");
    let abac: Vec<RequestValue> = vec![
        json!({"name": "alice", "dept": "eng"}).into(),
        "data1".into(),
        "read".into(),
    ];
    let allowed = cached.enforce(&abac).await?;
    info!("abac request allowed={}", allowed);

    info!("--- Removing alice's rule ---");
    cached.remove_policy(&alice).await?;
    let allowed = cached.enforce(&alice).await?;
    info!("after removal: allowed={}", allowed);

    info!("--- Policy reload ---");
    cached.load_policy().await?;

    info!("Cache stats: {}", cached.stats());

    // Let the event listener drain
    tokio::time::sleep(Duration::from_millis(10)).await;
    Ok(())
}
