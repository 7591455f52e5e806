//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache operations.
///
/// The type is `Clone` so that a single load outcome can be fanned out to
/// every caller waiting on the same key.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// The loader supplied to a get-or-load call failed
    #[error("loader failed for key '{key}': {cause}")]
    Loader {
        key: String,
        cause: Arc<anyhow::Error>,
    },

    /// The in-flight load for a key went away without reporting a result
    #[error("load interrupted for key '{key}'")]
    LoadInterrupted { key: String },

    /// Key rejected by validation
    #[error("invalid key: {0}")]
    InvalidKey(String),
}

impl CacheError {
    /// Wraps a loader error for the given key.
    pub(crate) fn loader(key: &str, cause: anyhow::Error) -> Self {
        CacheError::Loader {
            key: key.to_string(),
            cause: Arc::new(cause),
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
