//! Error types for the decision cache
//!
//! Three concerns are kept apart: failures of a cache backend, failures of the
//! wrapped enforcement engine, and the crate-level error that carries either.
//! A key that is simply absent from a store is not an error at all, stores
//! report it as `Ok(None)`.

use thiserror::Error;

/// Failure of a cache store backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backend could not be reached (remote cache down, connection refused)
    #[error("Cache backend '{backend}' unavailable: {reason}")]
    Unavailable { backend: String, reason: String },

    /// Backend accepted the request but failed to serve it
    #[error("Cache backend error: {0}")]
    Backend(String),

    /// Value could not be encoded or decoded by the backend
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic store error with context
    #[error("Store error: {0}")]
    Other(String),
}

/// Failure reported by the underlying enforcement engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnforcerError {
    /// Request evaluation failed
    #[error("Enforcement error: {0}")]
    Enforcement(String),

    /// Policy (re)load failed
    #[error("Policy load error: {0}")]
    PolicyLoad(String),

    /// Adding or removing rules failed
    #[error("Policy update error: {0}")]
    PolicyUpdate(String),

    /// Generic engine error with context
    #[error("Enforcer error: {0}")]
    Other(String),
}

/// Main error type for cached enforcement
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Cache store failure, never treated as a miss
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Engine failure, propagated verbatim
    #[error(transparent)]
    Enforcer(#[from] EnforcerError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

impl CacheError {
    /// True when the error originated in the cache store rather than the engine
    pub fn is_store_error(&self) -> bool {
        matches!(self, CacheError::Store(_))
    }
}

/// Result type alias for cached enforcement
pub type Result<T> = std::result::Result<T, CacheError>;

impl From<String> for CacheError {
    fn from(s: String) -> Self {
        CacheError::Other(s)
    }
}

impl From<&str> for CacheError {
    fn from(s: &str) -> Self {
        CacheError::Other(s.to_string())
    }
}
