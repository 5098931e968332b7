//! Cache seam
//!
//! TTL key/value store accelerating reads; never authoritative. Entries are
//! serialized response-shaped snapshots keyed by `<kind>:<id>`. The
//! coordinator only ever deletes entries on mutation (never merge-writes),
//! so the worst outcome of a race is an extra miss, never stale data served
//! indefinitely.
//!
//! Cache failures are non-fatal by contract: the read path falls back to
//! the primary store and write paths log and continue.

mod memory;

pub use memory::MemoryCacheStore;

use serde_json::Value;
use shelfsync_core::CacheKey;
use std::time::Duration;
use thiserror::Error;

/// Result type for cache operations
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Cache failures (absorbed by the coordinator, never surfaced)
#[derive(Debug, Error)]
pub enum CacheError {
    /// Store unreachable or timed out
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    /// Snapshot could not be serialized or deserialized
    #[error("cache serialization error: {0}")]
    Serialization(String),
}

/// TTL key/value cache seam
///
/// Values are JSON snapshots; typed encode/decode lives with the caller so
/// the seam stays object-safe. Implementations are long-lived, shared, and
/// safe for concurrent use.
pub trait CacheStore: Send + Sync {
    /// Store a snapshot under `key` for `ttl`
    fn save(&self, key: &CacheKey, value: Value, ttl: Duration) -> CacheResult<()>;

    /// Fetch the snapshot under `key`, if present and unexpired
    fn get(&self, key: &CacheKey) -> CacheResult<Option<Value>>;

    /// Drop the entry under `key`; missing entries are not an error
    fn delete(&self, key: &CacheKey) -> CacheResult<()>;
}
