//! Cache Handle Module
//!
//! Public façade tying together the entry store, the in-flight load table
//! and the expiry sweeper.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::cache::flight::{LoadOutcome, LoadState};
use crate::cache::{CacheStats, EntryStore};
use crate::config::{CacheConfig, CacheOptions};
use crate::error::{CacheError, Result};
use crate::tasks::spawn_sweeper;

// == Cache ==
/// Clonable handle to one cache instance.
///
/// All shared state lives behind `Arc`, so clones are cheap and every clone
/// operates on the same entry store, in-flight table and sweeper. Lock order
/// is the in-flight mutex first, then the store lock; no code path acquires
/// the in-flight mutex while holding a store guard.
///
/// Must be constructed inside a tokio runtime, since construction spawns the
/// background expiry sweeper (unless the cache is disabled).
pub struct Cache<T> {
    /// Instance name used in trace events
    name: Arc<str>,
    /// Immutable settings
    config: CacheConfig,
    /// Authoritative entry table
    store: Arc<RwLock<EntryStore<T>>>,
    /// In-flight loads, at most one per key
    inflight: Arc<Mutex<HashMap<String, LoadState<T>>>>,
    /// Sweeper task handle, taken exactly once on shutdown
    sweeper: Arc<std::sync::Mutex<Option<JoinHandle<()>>>>,
}

impl<T> Clone for Cache<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            config: self.config.clone(),
            store: Arc::clone(&self.store),
            inflight: Arc::clone(&self.inflight),
            sweeper: Arc::clone(&self.sweeper),
        }
    }
}

impl<T> std::fmt::Debug for Cache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish()
    }
}

impl<T> Cache<T>
where
    T: Clone + Send + Sync + 'static,
{
    // == Constructors ==
    /// Creates a cache with default options.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_options(config, CacheOptions::default())
    }

    /// Creates a cache with the given options.
    ///
    /// Starts the background expiry sweeper unless the cache is disabled.
    pub fn with_options(config: CacheConfig, options: CacheOptions) -> Self {
        let store = Arc::new(RwLock::new(EntryStore::new(config.max_entries)));

        let sweeper = if config.enabled {
            Some(spawn_sweeper(
                Arc::downgrade(&store),
                config.purge_interval,
                options.name.clone(),
            ))
        } else {
            None
        };

        info!(
            cache = %options.name,
            enabled = config.enabled,
            max_entries = config.max_entries,
            "cache initialized"
        );

        Self {
            name: options.name.into(),
            config,
            store,
            inflight: Arc::new(Mutex::new(HashMap::new())),
            sweeper: Arc::new(std::sync::Mutex::new(sweeper)),
        }
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns None if the cache is disabled, the key is absent, or its TTL
    /// has elapsed. An expired entry is removed as a side effect.
    pub async fn get(&self, key: &str) -> Option<T> {
        if !self.config.enabled {
            return None;
        }

        let value = self.store.write().await.get(key);
        trace!(cache = %self.name, key, hit = value.is_some(), "get");
        value
    }

    // == Set ==
    /// Stores a value under the given key with the default TTL.
    ///
    /// A no-op when the cache is disabled.
    pub async fn set(&self, key: impl Into<String>, value: T) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }

        let key = key.into();
        trace!(cache = %self.name, key = %key, "set");
        self.store
            .write()
            .await
            .set(key, value, self.config.default_ttl)
    }

    // == Delete ==
    /// Removes the entry for the given key.
    ///
    /// Returns whether an entry was present; deleting an absent key is not
    /// an error. A no-op when the cache is disabled.
    pub async fn delete(&self, key: &str) -> bool {
        if !self.config.enabled {
            return false;
        }

        let removed = self.store.write().await.delete(key);
        trace!(cache = %self.name, key, removed, "delete");
        removed
    }

    // == With Cache ==
    /// Returns the cached value for `key`, or computes it with `loader`.
    ///
    /// Uses the configured default TTL when storing a freshly loaded value.
    /// See [`Cache::with_cache_ttl`] for the full contract.
    pub async fn with_cache<F, Fut>(&self, key: &str, loader: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        self.with_cache_ttl(key, self.config.default_ttl, loader).await
    }

    // == With Cache TTL ==
    /// Returns the cached value for `key`, or computes it with `loader` and
    /// stores it with the given TTL.
    ///
    /// At most one load runs per key at any instant: concurrent callers for
    /// a missing key all attach to the same computation and receive the same
    /// outcome. The loader runs on a detached task, so a caller that stops
    /// waiting (e.g. via `tokio::time::timeout`) never aborts work that other
    /// callers depend on.
    ///
    /// Loader errors are returned to every attached caller and are never
    /// cached; the next call for the same key invokes the loader again.
    ///
    /// When the cache is disabled the loader is invoked on every call and
    /// storage is bypassed entirely.
    pub async fn with_cache_ttl<F, Fut>(&self, key: &str, ttl: Duration, loader: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        if !self.config.enabled {
            return loader().await.map_err(|err| CacheError::loader(key, err));
        }

        let waiter = {
            // The miss check and the in-flight registration happen under the
            // same lock, so exactly one of the racing callers starts a load.
            let mut inflight = self.inflight.lock().await;

            if let Some(value) = self.store.write().await.get(key) {
                trace!(cache = %self.name, key, "get-or-load hit");
                return Ok(value);
            }

            if let Some(state) = inflight.get(key) {
                trace!(cache = %self.name, key, "joining in-flight load");
                state.subscribe()
            } else {
                let (tx, state) = LoadState::new();
                let waiter = state.subscribe();
                inflight.insert(key.to_string(), state);
                self.spawn_load(key.to_string(), ttl, loader(), tx);
                waiter
            }
        };

        waiter.wait(key).await
    }

    /// Runs a load on a detached task and publishes its outcome.
    ///
    /// The store write happens before the in-flight entry is dropped, so a
    /// racing caller always observes either the stored value or the running
    /// load, never a gap that would trigger a duplicate computation.
    fn spawn_load<Fut>(
        &self,
        key: String,
        ttl: Duration,
        fut: Fut,
        tx: watch::Sender<Option<LoadOutcome<T>>>,
    ) where
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let name = Arc::clone(&self.name);
        let store = Arc::clone(&self.store);
        let inflight = Arc::clone(&self.inflight);

        tokio::spawn(async move {
            debug!(cache = %name, key = %key, "starting load");

            let outcome = match fut.await {
                Ok(value) => {
                    if let Err(err) =
                        store.write().await.set(key.clone(), value.clone(), ttl)
                    {
                        warn!(cache = %name, key = %key, error = %err, "load result not cached");
                    }
                    Ok(value)
                }
                Err(err) => {
                    debug!(cache = %name, key = %key, error = %err, "load failed");
                    Err(CacheError::loader(&key, err))
                }
            };

            inflight.lock().await.remove(&key);
            // Waiters that already gave up dropped their receivers; that is fine
            let _ = tx.send(Some(outcome));
        });
    }

    // == Shutdown ==
    /// Stops the background expiry sweeper.
    ///
    /// Idempotent: calling shutdown more than once is a no-op. The cache
    /// itself stays usable afterwards; only background sweeping stops, so
    /// expired entries are then removed lazily on read.
    pub fn shutdown(&self) {
        let mut guard = match self.sweeper.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(handle) = guard.take() {
            handle.abort();
            info!(cache = %self.name, "expiry sweeper stopped");
        }
    }

    // == Diagnostics ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    /// Returns the current number of entries.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// Returns true if no entries are stored.
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    /// Returns the instance name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
