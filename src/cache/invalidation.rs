//! Invalidation events
//!
//! Every point where the cache drops decisions publishes an
//! [`InvalidationEvent`]. Subscribers (peer caches, audit logs) receive them
//! through [`CachedEnforcer::subscribe`](crate::CachedEnforcer::subscribe).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reason for cache invalidation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvalidationReason {
    /// Full policy reload cleared the cache
    PolicyReload,

    /// A single rule was removed
    PolicyRemoved,

    /// A batch of rules was removed
    PoliciesRemoved { count: usize },

    /// Caller requested a full invalidation
    Manual,

    /// The store backend was swapped out
    StoreReplaced,
}

impl std::fmt::Display for InvalidationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidationReason::PolicyReload => write!(f, "policy reload"),
            InvalidationReason::PolicyRemoved => write!(f, "policy removed"),
            InvalidationReason::PoliciesRemoved { count } => {
                write!(f, "{} policies removed", count)
            }
            InvalidationReason::Manual => write!(f, "manual invalidation"),
            InvalidationReason::StoreReplaced => write!(f, "store replaced"),
        }
    }
}

/// Scope of an invalidation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvalidationScope {
    /// Every cached decision was dropped
    All,

    /// Only the listed keys were dropped
    Keys(Vec<String>),
}

/// Event for cache invalidation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvalidationEvent {
    /// Unique event id
    pub id: Uuid,

    /// Reason for invalidation
    pub reason: InvalidationReason,

    /// What was dropped
    pub scope: InvalidationScope,

    /// When the invalidation occurred
    pub timestamp: DateTime<Utc>,
}

impl InvalidationEvent {
    /// Event for a full clear
    pub fn all(reason: InvalidationReason) -> Self {
        Self::new(reason, InvalidationScope::All)
    }

    /// Event for a set of dropped keys
    pub fn keys(reason: InvalidationReason, keys: Vec<String>) -> Self {
        Self::new(reason, InvalidationScope::Keys(keys))
    }

    fn new(reason: InvalidationReason, scope: InvalidationScope) -> Self {
        Self {
            id: Uuid::new_v4(),
            reason,
            scope,
            timestamp: Utc::now(),
        }
    }

    /// Whether `key` is covered by this event
    pub fn covers(&self, key: &str) -> bool {
        match &self.scope {
            InvalidationScope::All => true,
            InvalidationScope::Keys(keys) => keys.iter().any(|k| k == key),
        }
    }
}
