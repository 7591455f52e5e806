//! Expiry Sweeper Task
//!
//! Background task that periodically removes expired cache entries, bounding
//! memory growth from entries that are written but never read again.

use std::sync::Weak;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::EntryStore;

/// Spawns the background sweep loop for a cache instance.
///
/// On every tick the sweeper takes the store's write lock for a single
/// bounded pass that removes all expired entries. The task holds only a weak
/// reference to the store: once the owning cache is dropped the loop exits on
/// its next tick. Aborting the returned handle stops the loop immediately.
///
/// # Arguments
/// * `store` - Weak reference to the shared entry store
/// * `interval` - Time between sweep passes
/// * `name` - Cache instance name used in trace events
pub fn spawn_sweeper<T>(
    store: Weak<RwLock<EntryStore<T>>>,
    interval: Duration,
    name: String,
) -> JoinHandle<()>
where
    T: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(
            cache = %name,
            interval_ms = interval.as_millis() as u64,
            "starting expiry sweeper"
        );

        loop {
            // Sleep for the configured interval
            tokio::time::sleep(interval).await;

            let store = match store.upgrade() {
                Some(store) => store,
                None => {
                    debug!(cache = %name, "cache dropped, stopping sweeper");
                    break;
                }
            };

            // Acquire the write lock only for the duration of one pass
            let removed = {
                let mut guard = store.write().await;
                guard.purge_expired()
            };

            if removed > 0 {
                info!(cache = %name, removed, "sweep removed expired entries");
            } else {
                debug!(cache = %name, "sweep found no expired entries");
            }
        }
    })
}
