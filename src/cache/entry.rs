//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A single cached value with its expiration deadline.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The stored value
    pub value: T,
    /// When the entry was inserted
    pub inserted_at: Instant,
    /// Absolute deadline after which the entry is stale
    pub expires_at: Instant,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl` from now.
    pub fn new(value: T, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            value,
            inserted_at: now,
            expires_at: now + ttl,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is considered expired when the current
    /// time is greater than or equal to the expiration deadline, so once the
    /// full TTL has elapsed the entry is immediately stale.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    // == Time To Live ==
    /// Returns the remaining time before expiration.
    ///
    /// Useful for diagnostics; returns zero once the deadline has passed.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}
