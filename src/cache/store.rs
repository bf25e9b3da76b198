//! Pluggable decision store contract
//!
//! A store maps cache keys to boolean decisions. Lookups distinguish three
//! outcomes:
//!
//! - `Ok(Some(decision))`: the key is cached
//! - `Ok(None)`: the key is absent (never cached, evicted or expired)
//! - `Err(StoreError)`: the backend failed and the caller must not assume a miss
//!
//! Stores are owned by [`CachedEnforcer`](crate::CachedEnforcer), which guards
//! them with its own lock. Implementations therefore take `&mut self` for
//! writes and need no internal synchronization.

use crate::error::StoreError;
use async_trait::async_trait;
use std::time::Duration;

/// Storage backend for cached enforcement decisions
#[async_trait]
pub trait DecisionStore: Send + Sync {
    /// Insert or overwrite the decision for `key`
    ///
    /// `ttl` is an advisory survival time. `None` or a zero duration requests
    /// no expiry. Implementations may ignore the hint but must say so.
    async fn set(
        &mut self,
        key: &str,
        value: bool,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError>;

    /// Look up the decision for `key`
    async fn get(&self, key: &str) -> Result<Option<bool>, StoreError>;

    /// Remove the decision for `key`, returning it if it was present
    async fn delete(&mut self, key: &str) -> Result<Option<bool>, StoreError>;

    /// Remove every cached decision
    async fn clear(&mut self) -> Result<(), StoreError>;

    /// Number of decisions currently held
    async fn len(&self) -> Result<usize, StoreError>;

    /// Whether the store holds no decisions
    async fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len().await? == 0)
    }

    /// Backend name used in log output
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Normalize a survival hint: zero means "no expiry requested"
pub fn effective_ttl(ttl: Option<Duration>) -> Option<Duration> {
    ttl.filter(|d| !d.is_zero())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_ttl() {
        assert_eq!(effective_ttl(None), None);
        assert_eq!(effective_ttl(Some(Duration::ZERO)), None);
        assert_eq!(
            effective_ttl(Some(Duration::from_secs(5))),
            Some(Duration::from_secs(5))
        );
    }
}
