//! Default in-memory decision store

use crate::cache::store::DecisionStore;
use crate::cache::types::CacheKey;
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::trace;

/// Plain `HashMap` store used when no other backend is configured
///
/// The survival hint passed to [`set`](DecisionStore::set) is ignored: entries
/// live until they are deleted or the store is cleared. Use
/// [`TtlStore`](crate::cache::TtlStore) when expiry must be enforced.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<CacheKey, bool>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with room for `capacity` decisions
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }
}

#[async_trait]
impl DecisionStore for MemoryStore {
    async fn set(
        &mut self,
        key: &str,
        value: bool,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        if let Some(ttl) = ttl {
            trace!("MemoryStore ignores ttl hint {:?} for {}", ttl, key);
        }
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<bool>, StoreError> {
        Ok(self.entries.get(key).copied())
    }

    async fn delete(&mut self, key: &str) -> Result<Option<bool>, StoreError> {
        Ok(self.entries.remove(key))
    }

    async fn clear(&mut self) -> Result<(), StoreError> {
        self.entries = HashMap::new();
        Ok(())
    }

    async fn len(&self) -> Result<usize, StoreError> {
        Ok(self.entries.len())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
