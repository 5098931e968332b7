//! Embedded in-memory cache
//!
//! Reference backend for the [`CacheStore`] seam. Entries carry an expiry
//! instant; expiry is enforced lazily on read, with a `sweep` helper for
//! periodic cleanup.

use super::{CacheResult, CacheStore};
use dashmap::DashMap;
use serde_json::Value;
use shelfsync_core::CacheKey;
use std::time::{Duration, Instant};

struct Entry {
    value: Value,
    expires_at: Instant,
}

/// In-memory TTL cache
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: DashMap<String, Entry>,
}

impl MemoryCacheStore {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of resident entries, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all expired entries
    pub fn sweep(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
    }
}

impl CacheStore for MemoryCacheStore {
    fn save(&self, key: &CacheKey, value: Value, ttl: Duration) -> CacheResult<()> {
        self.entries.insert(
            key.as_str().to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    fn get(&self, key: &CacheKey) -> CacheResult<Option<Value>> {
        let Some(entry) = self.entries.get(key.as_str()) else {
            return Ok(None);
        };
        if entry.expires_at <= Instant::now() {
            drop(entry);
            self.entries.remove(key.as_str());
            return Ok(None);
        }
        Ok(Some(entry.value.clone()))
    }

    fn delete(&self, key: &CacheKey) -> CacheResult<()> {
        self.entries.remove(key.as_str());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shelfsync_core::{EntityId, EntityKind};

    fn key() -> CacheKey {
        CacheKey::new(EntityKind::Book, &EntityId::generate())
    }

    #[test]
    fn test_save_get_round_trip() {
        let cache = MemoryCacheStore::new();
        let k = key();
        cache
            .save(&k, json!({ "title": "Dune" }), Duration::from_secs(60))
            .unwrap();
        let hit = cache.get(&k).unwrap().unwrap();
        assert_eq!(hit["title"], json!("Dune"));
    }

    #[test]
    fn test_miss_on_unknown_key() {
        let cache = MemoryCacheStore::new();
        assert!(cache.get(&key()).unwrap().is_none());
    }

    #[test]
    fn test_expired_entry_is_a_miss() {
        let cache = MemoryCacheStore::new();
        let k = key();
        cache
            .save(&k, json!(1), Duration::from_millis(10))
            .unwrap();
        std::thread::sleep(Duration::from_millis(30));
        assert!(cache.get(&k).unwrap().is_none());
        // Lazy expiry also evicted the entry
        assert!(cache.is_empty());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let cache = MemoryCacheStore::new();
        let k = key();
        cache.save(&k, json!(1), Duration::from_secs(60)).unwrap();
        cache.delete(&k).unwrap();
        cache.delete(&k).unwrap();
        assert!(cache.get(&k).unwrap().is_none());
    }

    #[test]
    fn test_overwrite_refreshes_value() {
        let cache = MemoryCacheStore::new();
        let k = key();
        cache.save(&k, json!(1), Duration::from_secs(60)).unwrap();
        cache.save(&k, json!(2), Duration::from_secs(60)).unwrap();
        assert_eq!(cache.get(&k).unwrap(), Some(json!(2)));
    }

    #[test]
    fn test_sweep_drops_expired_only() {
        let cache = MemoryCacheStore::new();
        let k1 = key();
        let k2 = key();
        cache
            .save(&k1, json!(1), Duration::from_millis(10))
            .unwrap();
        cache.save(&k2, json!(2), Duration::from_secs(60)).unwrap();
        std::thread::sleep(Duration::from_millis(30));
        cache.sweep();
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&k2).unwrap().is_some());
    }
}
