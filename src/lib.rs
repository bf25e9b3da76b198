//! # decision-cache
//!
//! A decision cache for policy enforcement engines.
//!
//! Evaluating an access request ("can `alice` `read` `data1`?") against a
//! policy model can be expensive. [`CachedEnforcer`] wraps any [`Enforcer`]
//! and answers repeated identical requests from a cache, while keeping the
//! cache coherent with policy reloads and rule removals.
//!
//! ## Features
//!
//! - Canonical cache keys from string request parameters; requests with
//!   structured parameters bypass the cache transparently
//! - Pluggable stores through [`DecisionStore`](cache::DecisionStore), with an
//!   in-memory default and a TTL-enforcing alternative
//! - Lock-free enable/disable toggle
//! - Invalidate-before-mutate on `load_policy`, `remove_policy` and
//!   `remove_policies`
//! - Invalidation events and hit/miss statistics
//!
//! ## Example
//!
//! ```no_run
//! use decision_cache::{CachedEnforcer, Enforcer, RequestValue};
//!
//! async fn check<E: Enforcer>(engine: E) -> anyhow::Result<()> {
//!     let cached = CachedEnforcer::new(engine);
//!
//!     let request: Vec<RequestValue> = vec!["alice".into(), "data1".into(), "read".into()];
//!
//!     // Computed by the engine and cached
//!     let allowed = cached.enforce(&request).await?;
//!
//!     // Answered from the cache
//!     assert_eq!(cached.enforce(&request).await?, allowed);
//!
//!     // Reloading rules drops every cached decision first
//!     cached.load_policy().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Custom stores
//!
//! ```no_run
//! use decision_cache::cache::TtlStore;
//! use decision_cache::{CacheConfig, CachedEnforcer, Enforcer};
//! use std::time::Duration;
//!
//! async fn bounded<E: Enforcer>(engine: E) {
//!     let config = CacheConfig::builder().max_entries(50_000).build();
//!     let cached = CachedEnforcer::with_store(engine, TtlStore::new(config));
//!     cached.set_expire_time(Duration::from_secs(300));
//! }
//! ```

pub mod cache;
pub mod cached;
pub mod config;
pub mod enforcer;
pub mod error;
pub mod request;

// Re-export main types for convenience
pub use cache::{
    build_key, rule_key, CacheKey, CacheStats, DecisionEntry, DecisionStore, InvalidationEvent,
    InvalidationReason, InvalidationScope, MemoryStore, TtlStore, KEY_DELIMITER,
};
pub use cached::CachedEnforcer;
pub use config::{CacheConfig, CacheConfigBuilder};
pub use enforcer::Enforcer;
pub use error::{CacheError, EnforcerError, Result, StoreError};
pub use request::RequestValue;
