//! Cached decision entries with TTL support

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// A cached decision together with its expiry and recency
#[derive(Debug)]
pub struct DecisionEntry {
    /// The cached decision
    pub value: bool,

    /// When the entry expires, `None` for entries that never expire
    pub expires_at: Option<DateTime<Utc>>,

    /// Identifies the insertion this entry belongs to; kept across overwrites
    pub(crate) generation: u64,

    /// Store clock tick of the last write or read
    last_used: AtomicU64,
}

impl DecisionEntry {
    /// Create an entry; `None` ttl means the entry never expires
    ///
    /// A ttl too large to represent as a timestamp also never expires.
    pub fn new(value: bool, ttl: Option<Duration>) -> Self {
        let now = Utc::now();
        let expires_at = ttl
            .and_then(|ttl| chrono::Duration::from_std(ttl).ok())
            .and_then(|d| now.checked_add_signed(d));

        Self {
            value,
            expires_at,
            generation: 0,
            last_used: AtomicU64::new(0),
        }
    }

    pub(crate) fn stamped(mut self, generation: u64, tick: u64) -> Self {
        self.generation = generation;
        self.last_used = AtomicU64::new(tick);
        self
    }

    /// Check if the entry has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at.map_or(false, |at| Utc::now() > at)
    }

    /// Store clock tick of the last write or read
    pub fn last_used(&self) -> u64 {
        self.last_used.load(Ordering::Relaxed)
    }

    pub(crate) fn touch(&self, tick: u64) {
        self.last_used.fetch_max(tick, Ordering::Relaxed);
    }
}
