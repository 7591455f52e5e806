//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::time::Duration;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// When false, every operation bypasses storage entirely
    pub enabled: bool,
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Default TTL applied by `set` and `with_cache`
    pub default_ttl: Duration,
    /// Interval between background expiry sweeps
    pub purge_interval: Duration,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_ENABLED` - Whether caching is active (default: true)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `CACHE_DEFAULT_TTL_SECS` - Default TTL in seconds (default: 300)
    /// - `CACHE_PURGE_INTERVAL_SECS` - Sweep frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        Self {
            enabled: env::var("CACHE_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            max_entries: env::var("CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            default_ttl: env::var("CACHE_DEFAULT_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(300)),
            purge_interval: env::var("CACHE_PURGE_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(1)),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 1000,
            default_ttl: Duration::from_secs(300),
            purge_interval: Duration::from_secs(1),
        }
    }
}

/// Construction options carrying diagnostic settings.
///
/// The name identifies the instance in trace events; it has no behavioral
/// effect. Log output itself goes to whatever `tracing` subscriber the host
/// application has installed.
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// Instance name attached to every trace event
    pub name: String,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            name: "cache".to_string(),
        }
    }
}

impl CacheOptions {
    /// Creates options with the given instance name.
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
