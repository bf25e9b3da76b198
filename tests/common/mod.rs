//! Shared test doubles: a rule-table engine and a store with injectable faults

#![allow(dead_code)]

use async_trait::async_trait;
use decision_cache::{DecisionStore, Enforcer, EnforcerError, MemoryStore, RequestValue, StoreError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Engine that allows a request iff it exactly matches a loaded rule
///
/// `load_policy` restores the initial rule set, like reloading from a file.
#[derive(Default)]
pub struct TableEnforcer {
    initial: Vec<Vec<String>>,
    rules: Mutex<Vec<Vec<String>>>,
    pub enforce_calls: AtomicUsize,
    pub load_calls: AtomicUsize,
    pub remove_calls: AtomicUsize,
    pub fail_enforce: AtomicBool,
    pub fail_load: AtomicBool,
}

impl TableEnforcer {
    pub fn new(rules: &[&[&str]]) -> Self {
        let rules: Vec<Vec<String>> = rules
            .iter()
            .map(|rule| rule.iter().map(|p| p.to_string()).collect())
            .collect();

        Self {
            initial: rules.clone(),
            rules: Mutex::new(rules),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.enforce_calls.load(Ordering::SeqCst)
    }

    fn to_rule(params: &[RequestValue]) -> Vec<String> {
        params.iter().map(|p| p.to_string()).collect()
    }
}

#[async_trait]
impl Enforcer for TableEnforcer {
    async fn enforce(&self, rvals: &[RequestValue]) -> Result<bool, EnforcerError> {
        self.enforce_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_enforce.load(Ordering::SeqCst) {
            return Err(EnforcerError::Enforcement("matcher failed".to_string()));
        }
        let wanted = Self::to_rule(rvals);
        Ok(self.rules.lock().unwrap().iter().any(|rule| *rule == wanted))
    }

    async fn load_policy(&self) -> Result<(), EnforcerError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(EnforcerError::PolicyLoad("adapter offline".to_string()));
        }
        *self.rules.lock().unwrap() = self.initial.clone();
        Ok(())
    }

    async fn remove_policy(&self, params: &[RequestValue]) -> Result<bool, EnforcerError> {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        let wanted = Self::to_rule(params);
        let mut rules = self.rules.lock().unwrap();
        let before = rules.len();
        rules.retain(|rule| *rule != wanted);
        Ok(rules.len() != before)
    }

    async fn remove_policies(&self, batch: &[Vec<String>]) -> Result<bool, EnforcerError> {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        let mut rules = self.rules.lock().unwrap();
        let before = rules.len();
        rules.retain(|rule| !batch.contains(rule));
        Ok(rules.len() != before)
    }

    async fn add_policy(&self, params: &[RequestValue]) -> Result<bool, EnforcerError> {
        let rule = Self::to_rule(params);
        let mut rules = self.rules.lock().unwrap();
        if rules.contains(&rule) {
            return Ok(false);
        }
        rules.push(rule);
        Ok(true)
    }

    async fn add_policies(&self, batch: &[Vec<String>]) -> Result<bool, EnforcerError> {
        let mut rules = self.rules.lock().unwrap();
        let mut added = false;
        for rule in batch {
            if !rules.contains(rule) {
                rules.push(rule.clone());
                added = true;
            }
        }
        Ok(added)
    }

    async fn has_policy(&self, params: &[RequestValue]) -> bool {
        let wanted = Self::to_rule(params);
        self.rules.lock().unwrap().contains(&wanted)
    }

    async fn get_policy(&self) -> Vec<Vec<String>> {
        self.rules.lock().unwrap().clone()
    }
}

/// Switches that make a [`FaultyStore`] fail individual operations
#[derive(Clone, Default)]
pub struct StoreFaults {
    pub get: Arc<AtomicBool>,
    pub set: Arc<AtomicBool>,
    pub delete: Arc<AtomicBool>,
    pub clear: Arc<AtomicBool>,
}

/// Memory store whose operations can be made to fail like an unreachable backend
pub struct FaultyStore {
    inner: MemoryStore,
    faults: StoreFaults,
}

impl FaultyStore {
    pub fn new() -> (Self, StoreFaults) {
        let faults = StoreFaults::default();
        let store = Self {
            inner: MemoryStore::new(),
            faults: faults.clone(),
        };
        (store, faults)
    }

    fn check(flag: &AtomicBool) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable {
                backend: "faulty".to_string(),
                reason: "connection refused".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DecisionStore for FaultyStore {
    async fn set(
        &mut self,
        key: &str,
        value: bool,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        Self::check(&self.faults.set)?;
        self.inner.set(key, value, ttl).await
    }

    async fn get(&self, key: &str) -> Result<Option<bool>, StoreError> {
        Self::check(&self.faults.get)?;
        self.inner.get(key).await
    }

    async fn delete(&mut self, key: &str) -> Result<Option<bool>, StoreError> {
        Self::check(&self.faults.delete)?;
        self.inner.delete(key).await
    }

    async fn clear(&mut self) -> Result<(), StoreError> {
        Self::check(&self.faults.clear)?;
        self.inner.clear().await
    }

    async fn len(&self) -> Result<usize, StoreError> {
        self.inner.len().await
    }

    fn name(&self) -> &'static str {
        "faulty"
    }
}

pub fn strs(parts: &[&str]) -> Vec<RequestValue> {
    parts.iter().map(|p| RequestValue::from(*p)).collect()
}

pub fn rule(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

/// Engine with the classic two-user policy
pub fn basic_enforcer() -> TableEnforcer {
    TableEnforcer::new(&[
        &["alice", "data1", "read"],
        &["bob", "data2", "write"],
    ])
}
