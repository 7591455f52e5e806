//! Flightcache - a lightweight in-memory cache-aside layer
//!
//! Provides keyed caching of arbitrary-typed values with TTL expiration,
//! bounded size, background expiry sweeping and deduplicated concurrent
//! loading: at most one computation runs per key, no matter how many callers
//! request it at once.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, CacheStats};
pub use config::{CacheConfig, CacheOptions};
pub use error::{CacheError, Result};
pub use tasks::spawn_sweeper;
