//! # Decision Cache Storage
//!
//! Building blocks used by [`CachedEnforcer`](crate::CachedEnforcer):
//!
//! - **Key Builder**: canonical keys from string request parameters
//! - **Pluggable stores**: the [`DecisionStore`] contract with an in-memory
//!   default and a TTL-enforcing alternative
//! - **Invalidation events**: published whenever decisions are dropped
//! - **Statistics**: hit/miss/bypass counters
//!
//! ## Example
//!
//! ```rust
//! use decision_cache::cache::{build_key, DecisionStore, MemoryStore};
//! use decision_cache::RequestValue;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let params: Vec<RequestValue> = vec!["alice".into(), "data1".into(), "read".into()];
//! let key = build_key(&params).expect("string parameters are cacheable");
//!
//! let mut store = MemoryStore::new();
//! store.set(&key, true, None).await?;
//! assert_eq!(store.get(&key).await?, Some(true));
//! # Ok(())
//! # }
//! ```

pub mod entry;
pub mod invalidation;
pub mod key;
pub mod memory;
pub mod store;
pub mod ttl;
pub mod types;

pub use entry::DecisionEntry;
pub use invalidation::{InvalidationEvent, InvalidationReason, InvalidationScope};
pub use key::{build_key, rule_key, KEY_DELIMITER};
pub use memory::MemoryStore;
pub use store::DecisionStore;
pub use ttl::TtlStore;
pub use types::{CacheKey, CacheStats};
