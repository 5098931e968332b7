//! Cache-first read path
//!
//! A hit is decoded and returned without touching the primary store. A
//! miss, an unavailable cache, or an undecodable entry all fall through to
//! the primary; on a primary hit the cache is repopulated best-effort. The
//! only errors a caller ever sees are primary store errors and a document
//! that no longer matches the entity type.

use crate::metrics::CoordinatorMetrics;
use shelfsync_core::{CacheKey, CatalogEntity, EntityId, Error, Result};
use shelfsync_stores::{CacheStore, PrimaryStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Read-through lookups over the cache and primary store
pub struct ReadPath {
    primary: Arc<dyn PrimaryStore>,
    cache: Arc<dyn CacheStore>,
    metrics: Arc<CoordinatorMetrics>,
    ttl: Duration,
}

impl ReadPath {
    /// Standalone read path with its own counters
    pub fn new(primary: Arc<dyn PrimaryStore>, cache: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self::with_metrics(primary, cache, Arc::new(CoordinatorMetrics::new()), ttl)
    }

    /// Read path sharing counters with a coordinator
    pub(crate) fn with_metrics(
        primary: Arc<dyn PrimaryStore>,
        cache: Arc<dyn CacheStore>,
        metrics: Arc<CoordinatorMetrics>,
        ttl: Duration,
    ) -> Self {
        Self {
            primary,
            cache,
            metrics,
            ttl,
        }
    }

    /// Look up one entity by id, cache first
    pub fn get<E: CatalogEntity>(&self, id: &EntityId) -> Result<Option<E>> {
        let key = CacheKey::new(E::KIND, id);

        match self.cache.get(&key) {
            Ok(Some(value)) => match serde_json::from_value::<E>(value) {
                Ok(entity) => {
                    self.metrics.record_cache_hit();
                    return Ok(Some(entity));
                }
                // A stale or corrupt entry must not poison reads; treat it
                // as a miss and let the primary copy repopulate it.
                Err(e) => {
                    warn!(target: "shelfsync::cache", key = %key, error = %e, "undecodable cache entry; falling through");
                    self.metrics.record_cache_failure();
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!(target: "shelfsync::cache", key = %key, error = %e, "cache read failed; falling through");
                self.metrics.record_cache_failure();
            }
        }
        self.metrics.record_cache_miss();

        let Some(doc) = self.primary.find_by_id(E::KIND, id)? else {
            return Ok(None);
        };
        // The cache snapshot is the raw document; decode failure here means
        // the stored shape no longer matches the entity, which is an error.
        let entity = serde_json::from_value::<E>(doc.clone())?;

        if let Err(e) = self.cache.save(&key, doc, self.ttl) {
            warn!(target: "shelfsync::cache", key = %key, error = %e, "read-through populate failed");
            self.metrics.record_cache_failure();
        }
        Ok(Some(entity))
    }

    /// Look up one entity by its id string
    ///
    /// A malformed id is a fatal error, not a miss: the caller sent
    /// something that can never address an entity.
    pub fn get_by_str<E: CatalogEntity>(&self, id: &str) -> Result<Option<E>> {
        let id =
            EntityId::from_string(id).ok_or_else(|| Error::MalformedId(id.to_string()))?;
        self.get(&id)
    }
}
