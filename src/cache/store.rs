//! Entry Store Module
//!
//! Authoritative key-to-entry table combining HashMap storage with
//! insertion-order eviction and TTL expiration.

use std::collections::HashMap;
use std::time::Duration;

use crate::cache::{CacheEntry, CacheStats, InsertionTracker, MAX_KEY_LENGTH};
use crate::error::{CacheError, Result};

// == Entry Store ==
/// Bounded key-value table with TTL expiration and insertion-order eviction.
///
/// The store itself is not synchronized; the owning cache wraps it in a lock
/// and is the only component that mutates it.
#[derive(Debug)]
pub struct EntryStore<T> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<T>>,
    /// Insertion-order tracker backing eviction
    order: InsertionTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
}

impl<T: Clone> EntryStore<T> {
    // == Constructor ==
    /// Creates a new EntryStore with the specified capacity.
    ///
    /// # Arguments
    /// * `max_entries` - Maximum number of entries the store can hold
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: InsertionTracker::new(),
            stats: CacheStats::new(),
            max_entries,
        }
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns None if the key is absent or its TTL has elapsed. An expired
    /// entry is removed as a side effect of the check, so no reader ever
    /// observes a stale value.
    ///
    /// # Arguments
    /// * `key` - The key to retrieve
    pub fn get(&mut self, key: &str) -> Option<T> {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired() => {
                self.entries.remove(key);
                self.order.remove(key);
                self.stats.record_expiration();
                self.stats.record_miss();
                self.stats.set_total_entries(self.entries.len());
                None
            }
            Some(entry) => {
                // Reads do not reorder the eviction queue
                self.stats.record_hit();
                Some(entry.value.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Stores a key-value pair with the given TTL.
    ///
    /// If the key already exists, the entry is replaced and its insertion
    /// time resets. Inserting a new key into a full store first evicts the
    /// oldest entry by insertion order.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Time until the entry expires
    pub fn set(&mut self, key: String, value: T, ttl: Duration) -> Result<()> {
        // Validate key length
        if key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidKey(format!(
                "key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }

        // A zero-capacity store holds nothing; callers still get their value
        // back through the load path, it just is not retained.
        if self.max_entries == 0 {
            return Ok(());
        }

        let is_overwrite = self.entries.contains_key(&key);

        // If not overwriting and at capacity, evict the oldest entry first
        if !is_overwrite && self.entries.len() >= self.max_entries {
            if let Some(evicted_key) = self.order.evict_oldest() {
                self.entries.remove(&evicted_key);
                self.stats.record_eviction();
            }
        }

        self.entries.insert(key.clone(), CacheEntry::new(value, ttl));
        self.order.record(&key);
        self.stats.set_total_entries(self.entries.len());

        Ok(())
    }

    // == Delete ==
    /// Removes an entry by key.
    ///
    /// Returns whether an entry was present; deleting an absent key is not
    /// an error.
    ///
    /// # Arguments
    /// * `key` - The key to delete
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.order.remove(key);
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }

    // == Purge Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Single bounded pass over the table; returns the number of entries
    /// removed.
    pub fn purge_expired(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            self.entries.remove(&key);
            self.order.remove(&key);
            self.stats.record_expiration();
        }

        self.stats.set_total_entries(self.entries.len());
        count
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Length ==
    /// Returns the current number of entries in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    const TTL: Duration = Duration::from_secs(300);

    #[test]
    fn test_store_new() {
        let store: EntryStore<String> = EntryStore::new(100);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = EntryStore::new(100);

        store.set("key1".to_string(), "value1".to_string(), TTL).unwrap();
        let value = store.get("key1").unwrap();

        assert_eq!(value, "value1");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store: EntryStore<String> = EntryStore::new(100);

        assert_eq!(store.get("nonexistent"), None);
    }

    #[test]
    fn test_store_delete() {
        let mut store = EntryStore::new(100);

        store.set("key1".to_string(), "value1".to_string(), TTL).unwrap();
        assert!(store.delete("key1"));

        assert!(store.is_empty());
        assert_eq!(store.get("key1"), None);
    }

    #[test]
    fn test_store_delete_nonexistent() {
        let mut store: EntryStore<String> = EntryStore::new(100);

        assert!(!store.delete("nonexistent"));
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = EntryStore::new(100);

        store.set("key1".to_string(), "value1".to_string(), TTL).unwrap();
        store.set("key1".to_string(), "value2".to_string(), TTL).unwrap();

        assert_eq!(store.get("key1"), Some("value2".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = EntryStore::new(100);

        store
            .set("key1".to_string(), "value1".to_string(), Duration::from_millis(40))
            .unwrap();

        // Should be accessible immediately
        assert!(store.get("key1").is_some());

        // Wait for expiration
        sleep(Duration::from_millis(60));

        // Lazily expired on read
        assert_eq!(store.get("key1"), None);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_store_insertion_order_eviction() {
        let mut store = EntryStore::new(3);

        store.set("key1".to_string(), "value1".to_string(), TTL).unwrap();
        store.set("key2".to_string(), "value2".to_string(), TTL).unwrap();
        store.set("key3".to_string(), "value3".to_string(), TTL).unwrap();

        // Store is full, adding key4 evicts key1 (oldest insertion)
        store.set("key4".to_string(), "value4".to_string(), TTL).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.get("key1"), None);
        assert!(store.get("key2").is_some());
        assert!(store.get("key3").is_some());
        assert!(store.get("key4").is_some());
    }

    #[test]
    fn test_store_reads_do_not_affect_eviction_order() {
        let mut store = EntryStore::new(3);

        store.set("key1".to_string(), "value1".to_string(), TTL).unwrap();
        store.set("key2".to_string(), "value2".to_string(), TTL).unwrap();
        store.set("key3".to_string(), "value3".to_string(), TTL).unwrap();

        // Reading key1 does not protect it; eviction follows insertion order
        store.get("key1").unwrap();

        store.set("key4".to_string(), "value4".to_string(), TTL).unwrap();

        assert_eq!(store.get("key1"), None);
        assert!(store.get("key2").is_some());
    }

    #[test]
    fn test_store_overwrite_resets_insertion_order() {
        let mut store = EntryStore::new(3);

        store.set("key1".to_string(), "value1".to_string(), TTL).unwrap();
        store.set("key2".to_string(), "value2".to_string(), TTL).unwrap();
        store.set("key3".to_string(), "value3".to_string(), TTL).unwrap();

        // Overwriting key1 replaces the entry, making key2 the oldest
        store.set("key1".to_string(), "value1b".to_string(), TTL).unwrap();
        store.set("key4".to_string(), "value4".to_string(), TTL).unwrap();

        assert!(store.get("key1").is_some());
        assert_eq!(store.get("key2"), None);
    }

    #[test]
    fn test_store_zero_capacity_holds_nothing() {
        let mut store = EntryStore::new(0);

        store.set("key1".to_string(), "value1".to_string(), TTL).unwrap();

        assert_eq!(store.len(), 0);
        assert_eq!(store.get("key1"), None);
    }

    #[test]
    fn test_store_stats() {
        let mut store = EntryStore::new(100);

        store.set("key1".to_string(), "value1".to_string(), TTL).unwrap();
        store.get("key1"); // hit
        store.get("nonexistent"); // miss

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_store_purge_expired() {
        let mut store = EntryStore::new(100);

        store
            .set("key1".to_string(), "value1".to_string(), Duration::from_millis(40))
            .unwrap();
        store
            .set("key2".to_string(), "value2".to_string(), Duration::from_secs(10))
            .unwrap();

        // Wait for key1 to expire
        sleep(Duration::from_millis(60));

        let removed = store.purge_expired();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("key2").is_some());
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_store_key_too_long() {
        let mut store = EntryStore::new(100);
        let long_key = "x".repeat(MAX_KEY_LENGTH + 1);

        let result = store.set(long_key, "value".to_string(), TTL);
        assert!(matches!(result, Err(CacheError::InvalidKey(_))));
    }
}
