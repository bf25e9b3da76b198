//! Contract of the wrapped enforcement engine
//!
//! The engine evaluates requests against its policy model and owns its rule
//! set. It manages its own concurrency, so every method takes `&self`.

use crate::error::EnforcerError;
use crate::request::RequestValue;
use async_trait::async_trait;

/// Policy enforcement engine wrapped by [`CachedEnforcer`](crate::CachedEnforcer)
#[async_trait]
pub trait Enforcer: Send + Sync {
    /// Decide whether the request (usually `sub, obj, act`) is allowed
    async fn enforce(&self, rvals: &[RequestValue]) -> Result<bool, EnforcerError>;

    /// Reload all rules from the backing adapter
    async fn load_policy(&self) -> Result<(), EnforcerError>;

    /// Remove one rule; `Ok(false)` if it did not exist
    async fn remove_policy(&self, params: &[RequestValue]) -> Result<bool, EnforcerError>;

    /// Remove a batch of rules; `Ok(false)` if none were removed
    async fn remove_policies(&self, rules: &[Vec<String>]) -> Result<bool, EnforcerError>;

    /// Add one rule; `Ok(false)` if it already existed
    async fn add_policy(&self, params: &[RequestValue]) -> Result<bool, EnforcerError>;

    /// Add a batch of rules; `Ok(false)` if none were added
    async fn add_policies(&self, rules: &[Vec<String>]) -> Result<bool, EnforcerError>;

    /// Whether the rule is present
    async fn has_policy(&self, params: &[RequestValue]) -> bool;

    /// All rules currently loaded
    async fn get_policy(&self) -> Vec<Vec<String>>;
}
