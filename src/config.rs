//! Configuration for cached enforcement
//!
//! Values come from code (builder or presets) or from the environment via
//! [`CacheConfig::from_env`], which also reads a `.env` file when present.

use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable toggling the cache on or off
pub const ENV_ENABLED: &str = "DECISION_CACHE_ENABLED";
/// Environment variable holding the survival time in seconds
pub const ENV_EXPIRE_SECS: &str = "DECISION_CACHE_EXPIRE_SECS";
/// Environment variable bounding the number of cached decisions
pub const ENV_MAX_ENTRIES: &str = "DECISION_CACHE_MAX_ENTRIES";
/// Environment variable holding the ttl jitter fraction
pub const ENV_TTL_JITTER: &str = "DECISION_CACHE_TTL_JITTER";

/// Configuration for a [`CachedEnforcer`](crate::CachedEnforcer) and its store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
    /// Whether decisions are cached at all
    pub enabled: bool,

    /// Survival time handed to the store with every write
    /// Zero means entries never expire
    pub expire_time: Duration,

    /// Fallback ttl used by [`TtlStore`](crate::cache::TtlStore) when a write
    /// carries no survival time
    pub default_ttl: Option<Duration>,

    /// Upper bound on cached decisions for bounded stores
    /// `None` leaves the store unbounded
    pub max_entries: Option<usize>,

    /// TTL jitter factor (0.0 - 1.0)
    /// Spreads expiry of entries written together. Only a
    /// [`TtlStore`](crate::cache::TtlStore) applies it, so a nonzero value
    /// makes [`CachedEnforcer::with_config`](crate::CachedEnforcer::with_config)
    /// pick that store
    pub ttl_jitter: f64,

    /// Enable hit/miss counters
    pub enable_metrics: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            expire_time: Duration::ZERO,
            default_ttl: None,
            max_entries: None,
            ttl_jitter: 0.0,
            enable_metrics: true,
        }
    }
}

impl CacheConfig {
    /// Create a new builder for cache configuration
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Load configuration from the environment, starting from the defaults
    ///
    /// A `.env` file in the working directory is loaded first if it exists.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_ENABLED) {
            config.enabled = parse_bool(ENV_ENABLED, &raw)?;
        }
        if let Some(raw) = lookup(ENV_EXPIRE_SECS) {
            let secs: u64 = parse_value(ENV_EXPIRE_SECS, &raw)?;
            config.expire_time = Duration::from_secs(secs);
        }
        if let Some(raw) = lookup(ENV_MAX_ENTRIES) {
            config.max_entries = Some(parse_value(ENV_MAX_ENTRIES, &raw)?);
        }
        if let Some(raw) = lookup(ENV_TTL_JITTER) {
            config.ttl_jitter = parse_value(ENV_TTL_JITTER, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_entries == Some(0) {
            return Err(CacheError::Config(
                "max_entries must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.ttl_jitter) {
            return Err(CacheError::Config(
                "ttl_jitter must be between 0.0 and 1.0".to_string(),
            ));
        }

        Ok(())
    }

    /// Apply the configured jitter to a ttl
    pub fn ttl_with_jitter(&self, ttl: Duration) -> Duration {
        if self.ttl_jitter == 0.0 {
            return ttl;
        }

        let base_secs = ttl.as_secs_f64();
        let jitter_range = base_secs * self.ttl_jitter;
        let jitter = (rand::random::<f64>() * 2.0 - 1.0) * jitter_range;
        let final_secs = (base_secs + jitter).max(0.001);

        Duration::from_secs_f64(final_secs)
    }
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(CacheError::Config(format!(
            "{} must be a boolean, got '{}'",
            name, other
        ))),
    }
}

fn parse_value<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| CacheError::Config(format!("{} has invalid value '{}'", name, raw)))
}

/// Builder for cache configuration
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    enabled: Option<bool>,
    expire_time: Option<Duration>,
    default_ttl: Option<Duration>,
    max_entries: Option<usize>,
    ttl_jitter: Option<f64>,
    enable_metrics: Option<bool>,
}

impl CacheConfigBuilder {
    /// Enable or disable caching
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Set the survival time handed to the store
    pub fn expire_time(mut self, expire_time: Duration) -> Self {
        self.expire_time = Some(expire_time);
        self
    }

    /// Set the fallback ttl for TTL-enforcing stores
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// Set maximum number of cached decisions
    pub fn max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self
    }

    /// Set TTL jitter factor (0.0 - 1.0)
    pub fn ttl_jitter(mut self, jitter: f64) -> Self {
        self.ttl_jitter = Some(jitter);
        self
    }

    /// Enable or disable metrics collection
    pub fn enable_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = Some(enable);
        self
    }

    /// Build the cache configuration
    pub fn build(self) -> CacheConfig {
        let defaults = CacheConfig::default();

        CacheConfig {
            enabled: self.enabled.unwrap_or(defaults.enabled),
            expire_time: self.expire_time.unwrap_or(defaults.expire_time),
            default_ttl: self.default_ttl.or(defaults.default_ttl),
            max_entries: self.max_entries.or(defaults.max_entries),
            ttl_jitter: self.ttl_jitter.unwrap_or(defaults.ttl_jitter),
            enable_metrics: self.enable_metrics.unwrap_or(defaults.enable_metrics),
        }
    }
}

/// Preset configurations for common deployments
impl CacheConfig {
    /// Frequently edited policies: short survival time, bounded store
    pub fn realtime() -> Self {
        Self {
            expire_time: Duration::from_secs(30),
            max_entries: Some(10_000),
            ttl_jitter: 0.10,
            ..Default::default()
        }
    }

    /// Policies that only change through reloads: long survival time
    pub fn stable() -> Self {
        Self {
            expire_time: Duration::from_secs(3600),
            max_entries: Some(100_000),
            ttl_jitter: 0.05,
            ..Default::default()
        }
    }
}
