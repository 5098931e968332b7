//! The write coordinator
//!
//! Sequences every logical mutation across the primary store, secondary
//! index, and cache without a distributed transaction:
//!
//! 1. Primary store transaction commits first. If the operation must fail,
//!    it fails here, before anything observable changes.
//! 2. Secondary index propagation runs outside the primary transaction and
//!    is strictly best-effort: failures are logged with an operation tag,
//!    counted, and recorded in the drift ledger, never surfaced.
//! 3. Cache state changes last: populated on single inserts and read-through
//!    misses, deleted (never refreshed in place) on updates and deletes.
//!
//! No lock is held across concurrent calls on the same id; the
//! invalidate-only cache policy bounds a race to an extra miss.

use crate::config::CoordinatorConfig;
use crate::drift::DriftTracker;
use crate::metrics::{CoordinatorMetrics, MetricsSnapshot};
use crate::propagation::PropagationPool;
use crate::read::ReadPath;
use serde_json::Value;
use shelfsync_core::{
    CacheKey, CatalogEntity, EntityId, EntityKind, Error, FieldUpdate, GraphProjection, Result,
};
use shelfsync_stores::{
    CacheStore, EdgeRow, GraphStore, GraphWrite, NodeRef, NodeRow, PrimaryStore,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Coordinates writes across the three stores
///
/// Generic per-entity behavior comes from [`CatalogEntity`]; all sequencing
/// and failure policy lives here. Entities are mutated only through this
/// type, never by direct store writes.
pub struct WriteCoordinator {
    primary: Arc<dyn PrimaryStore>,
    graph: Arc<dyn GraphStore>,
    cache: Arc<dyn CacheStore>,
    pool: PropagationPool,
    drift: Arc<DriftTracker>,
    metrics: Arc<CoordinatorMetrics>,
    read: ReadPath,
    config: CoordinatorConfig,
}

impl WriteCoordinator {
    /// Build a coordinator with default configuration
    pub fn new(
        primary: Arc<dyn PrimaryStore>,
        graph: Arc<dyn GraphStore>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self::with_config(primary, graph, cache, CoordinatorConfig::default())
    }

    /// Build a coordinator with explicit configuration
    pub fn with_config(
        primary: Arc<dyn PrimaryStore>,
        graph: Arc<dyn GraphStore>,
        cache: Arc<dyn CacheStore>,
        config: CoordinatorConfig,
    ) -> Self {
        let metrics = Arc::new(CoordinatorMetrics::new());
        let read = ReadPath::with_metrics(
            Arc::clone(&primary),
            Arc::clone(&cache),
            Arc::clone(&metrics),
            config.cache_ttl,
        );
        Self {
            primary,
            graph,
            cache,
            pool: PropagationPool::new(config.propagation_workers, config.propagation_queue_depth),
            drift: Arc::new(DriftTracker::new()),
            metrics,
            read,
            config,
        }
    }

    // ========== Mutations ==========

    /// Insert one entity
    ///
    /// Requires an unassigned id and valid required fields; the primary
    /// store assigns the id inside the transaction. After commit the projection is merged into the secondary
    /// index (best-effort) and the cache is populated; single inserts are
    /// cheap to cache eagerly and it saves the immediate miss round trip.
    pub fn insert<E: CatalogEntity>(&self, mut entity: E) -> Result<E> {
        if entity.id().is_some() {
            return Err(Error::IdAlreadyAssigned(E::KIND));
        }
        entity.validate()?;
        let doc = serde_json::to_value(&entity)?;

        let mut session = self.primary.session();
        let id = session.insert_one(E::KIND, doc)?;
        session.commit()?;
        self.metrics.record_inserts(1);
        entity.assign_id(id);
        debug!(target: "shelfsync::coord", kind = %E::KIND, id = %id, "inserted");

        if let Some(projection) = entity.graph_projection() {
            self.apply_graph(E::KIND, &merge_write(projection), &[id]);
        }
        self.populate_cache(E::KIND, &id, &entity);
        Ok(entity)
    }

    /// Insert a batch of entities in one primary transaction
    ///
    /// One batched secondary index merge is built from the successfully
    /// inserted set; cache population is offloaded to the propagation pool
    /// so the caller's latency reflects only the primary round trip.
    pub fn insert_many<E: CatalogEntity>(&self, entities: Vec<E>) -> Result<Vec<E>> {
        if entities.is_empty() {
            return Ok(Vec::new());
        }
        if entities.iter().any(|e| e.id().is_some()) {
            return Err(Error::IdAlreadyAssigned(E::KIND));
        }
        for entity in &entities {
            entity.validate()?;
        }
        let docs = entities
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut session = self.primary.session();
        let ids = session.insert_many(E::KIND, docs)?;
        session.commit()?;
        self.metrics.record_inserts(ids.len() as u64);

        let mut entities = entities;
        for (entity, id) in entities.iter_mut().zip(&ids) {
            entity.assign_id(*id);
        }
        debug!(target: "shelfsync::coord", kind = %E::KIND, count = ids.len(), "batch inserted");

        self.merge_batch_projections(&entities, &ids);
        self.populate_cache_async(&entities);
        Ok(entities)
    }

    /// Partially update the entity matching `id`
    ///
    /// Returns `Ok(false)` when no document matched. On a modified document
    /// the secondary index is re-merged only when an updated field is part
    /// of the graph projection, and the cache entry is deleted (never
    /// refreshed in place) so the next read repopulates from the primary.
    pub fn update_fields<E: CatalogEntity>(
        &self,
        id: &EntityId,
        updates: &[FieldUpdate],
    ) -> Result<bool> {
        if updates.is_empty() {
            return Ok(false);
        }

        let mut session = self.primary.session();
        let modified = session.update_fields(E::KIND, id, updates)?;
        if modified == 0 {
            session.abort();
            self.metrics.record_not_found();
            return Ok(false);
        }
        session.commit()?;
        self.metrics.record_update();
        debug!(target: "shelfsync::coord", kind = %E::KIND, id = %id, fields = updates.len(), "updated");

        let projected = E::graph_projected_fields();
        if updates.iter().any(|u| projected.contains(&u.field.as_str())) {
            self.remerge_from_primary::<E>(id);
        }
        self.delete_cache_entry(E::KIND, id);
        Ok(true)
    }

    /// Delete the entity matching `id`
    ///
    /// Returns `Ok(false)` ("not found", not an error) when nothing was
    /// deleted; the transaction is aborted in that case. On success the
    /// secondary index node/edges are removed best-effort (a missing node
    /// is not an error) and the cache entry is deleted.
    pub fn delete<E: CatalogEntity>(&self, id: &EntityId) -> Result<bool> {
        let mut session = self.primary.session();
        // Capture the document before deletion so edge projections (which
        // need the endpoints, not just the id) can be torn down afterwards.
        let doc = session.find_by_id(E::KIND, id)?;
        let deleted = session.delete_one(E::KIND, id)?;
        if deleted == 0 {
            session.abort();
            self.metrics.record_not_found();
            return Ok(false);
        }
        session.commit()?;
        self.metrics.record_deletes(1);
        debug!(target: "shelfsync::coord", kind = %E::KIND, id = %id, "deleted");

        if let Some(write) = removal_write::<E>(doc.as_ref(), id) {
            self.apply_graph(E::KIND, &write, &[*id]);
        }
        self.delete_cache_entry(E::KIND, id);
        Ok(true)
    }

    /// Delete a batch of entities in one primary transaction
    ///
    /// Success means `deleted_count > 0`, not `== ids.len()`: partial
    /// deletion is documented leniency, not silent loss; the shortfall is
    /// logged and counted so the policy can be tightened by callers.
    pub fn delete_many<E: CatalogEntity>(&self, ids: &[EntityId]) -> Result<bool> {
        if ids.is_empty() {
            return Ok(false);
        }

        let mut session = self.primary.session();
        // Edge-projected kinds need their endpoints captured pre-delete.
        let docs = if E::KIND.node_label().is_none() {
            let mut docs = Vec::with_capacity(ids.len());
            for id in ids {
                docs.push(session.find_by_id(E::KIND, id)?);
            }
            docs
        } else {
            Vec::new()
        };
        let deleted = session.delete_many(E::KIND, ids)?;
        if deleted == 0 {
            session.abort();
            self.metrics.record_not_found();
            return Ok(false);
        }
        session.commit()?;
        self.metrics.record_deletes(deleted);
        if deleted < ids.len() as u64 {
            self.metrics.record_partial_batch_delete();
            warn!(
                target: "shelfsync::coord",
                kind = %E::KIND,
                requested = ids.len(),
                deleted,
                "partial batch delete treated as success"
            );
        }

        if let Some(label) = E::KIND.node_label() {
            let write = GraphWrite::DetachDeleteNodes {
                label,
                ids: ids.iter().map(ToString::to_string).collect(),
            };
            self.apply_graph(E::KIND, &write, ids);
        } else {
            for (id, doc) in ids.iter().zip(&docs) {
                if let Some(write) = removal_write::<E>(doc.as_ref(), id) {
                    self.apply_graph(E::KIND, &write, &[*id]);
                }
            }
        }
        for id in ids {
            self.delete_cache_entry(E::KIND, id);
        }
        Ok(true)
    }

    // ========== Reads ==========

    /// Cache-first lookup (see [`ReadPath`])
    pub fn find<E: CatalogEntity>(&self, id: &EntityId) -> Result<Option<E>> {
        self.read.get(id)
    }

    /// The read path, for callers that only need lookups
    pub fn reader(&self) -> &ReadPath {
        &self.read
    }

    // ========== Observability / lifecycle ==========

    /// Current metric counters
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// The needs-resync ledger (shared with the reconciler)
    pub fn drift(&self) -> &Arc<DriftTracker> {
        &self.drift
    }

    /// Active configuration
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Block until offloaded propagation work has finished
    ///
    /// Used by tests and by shutdown paths that need the cache population
    /// from batch inserts to be observable.
    pub fn drain_propagation(&self) {
        self.pool.drain();
    }

    /// Stop the propagation workers, finishing queued work first
    pub fn shutdown(&self) {
        self.pool.shutdown();
    }

    // ========== Internals ==========

    /// Execute a secondary index write, absorbing failure per contract
    fn apply_graph(&self, kind: EntityKind, write: &GraphWrite, affected: &[EntityId]) {
        if let Err(e) = self.graph.execute_write(write) {
            warn!(
                target: "shelfsync::graph",
                op = write.op_tag(),
                kind = %kind,
                affected = affected.len(),
                error = %e,
                "secondary index write failed; marked for resync"
            );
            self.metrics.record_graph_failure();
            self.drift.record(kind, affected.iter().copied());
        }
    }

    /// Build and execute the batched merges for a freshly-inserted set
    fn merge_batch_projections<E: CatalogEntity>(&self, entities: &[E], ids: &[EntityId]) {
        let mut node_label = None;
        let mut node_rows = Vec::new();
        let mut rel_type = None;
        let mut edge_rows = Vec::new();

        for entity in entities {
            match entity.graph_projection() {
                Some(GraphProjection::Node {
                    label,
                    id,
                    properties,
                }) => {
                    node_label = Some(label);
                    node_rows.push(NodeRow {
                        id: id.to_string(),
                        properties,
                    });
                }
                Some(GraphProjection::Edge {
                    from_label,
                    from_id,
                    to_label,
                    to_id,
                    rel_type: rel,
                    properties,
                }) => {
                    rel_type = Some(rel);
                    edge_rows.push(EdgeRow {
                        from: NodeRef::new(from_label, from_id.to_string()),
                        to: NodeRef::new(to_label, to_id.to_string()),
                        properties,
                    });
                }
                None => {}
            }
        }

        if let Some(label) = node_label {
            let write = GraphWrite::MergeNodes {
                label,
                rows: node_rows,
            };
            self.apply_graph(E::KIND, &write, ids);
        }
        if let Some(rel_type) = rel_type {
            let write = GraphWrite::MergeEdges {
                rel_type,
                rows: edge_rows,
            };
            self.apply_graph(E::KIND, &write, ids);
        }
    }

    /// Re-read a committed document and push its projection
    fn remerge_from_primary<E: CatalogEntity>(&self, id: &EntityId) {
        match self.primary.find_by_id(E::KIND, id) {
            Ok(Some(doc)) => match serde_json::from_value::<E>(doc) {
                Ok(entity) => {
                    if let Some(projection) = entity.graph_projection() {
                        self.apply_graph(E::KIND, &update_write(projection), &[*id]);
                    }
                }
                Err(e) => {
                    warn!(
                        target: "shelfsync::graph",
                        kind = %E::KIND,
                        id = %id,
                        error = %e,
                        "document failed to deserialize for projection; marked for resync"
                    );
                    self.metrics.record_graph_failure();
                    self.drift.record(E::KIND, [*id]);
                }
            },
            // Deleted concurrently; the delete path owns graph teardown.
            Ok(None) => {}
            Err(e) => {
                warn!(
                    target: "shelfsync::graph",
                    kind = %E::KIND,
                    id = %id,
                    error = %e,
                    "post-update read failed; marked for resync"
                );
                self.metrics.record_graph_failure();
                self.drift.record(E::KIND, [*id]);
            }
        }
    }

    /// Best-effort synchronous cache population (single-entity inserts)
    fn populate_cache<E: CatalogEntity>(&self, kind: EntityKind, id: &EntityId, entity: &E) {
        let key = CacheKey::new(kind, id);
        let value = match serde_json::to_value(entity) {
            Ok(value) => value,
            Err(e) => {
                warn!(target: "shelfsync::cache", key = %key, error = %e, "cache snapshot serialization failed");
                self.metrics.record_cache_failure();
                return;
            }
        };
        if let Err(e) = self.cache.save(&key, value, self.config.cache_ttl) {
            warn!(target: "shelfsync::cache", key = %key, error = %e, "cache populate failed");
            self.metrics.record_cache_failure();
        }
    }

    /// Fire-and-forget cache population for a freshly-inserted batch
    fn populate_cache_async<E: CatalogEntity>(&self, entities: &[E]) {
        let mut entries = Vec::with_capacity(entities.len());
        for entity in entities {
            let Some(id) = entity.id() else { continue };
            let key = CacheKey::new(E::KIND, &id);
            match serde_json::to_value(entity) {
                Ok(value) => entries.push((key, value)),
                Err(e) => {
                    warn!(target: "shelfsync::cache", key = %key, error = %e, "cache snapshot serialization failed");
                    self.metrics.record_cache_failure();
                }
            }
        }
        if entries.is_empty() {
            return;
        }

        let cache = Arc::clone(&self.cache);
        let metrics = Arc::clone(&self.metrics);
        let ttl = self.config.cache_ttl;
        let submitted = self.pool.submit(move || {
            for (key, value) in entries {
                if let Err(e) = cache.save(&key, value, ttl) {
                    warn!(target: "shelfsync::cache", key = %key, error = %e, "cache populate failed");
                    metrics.record_cache_failure();
                }
            }
        });
        if submitted.is_err() {
            self.metrics.record_propagation_rejected();
            warn!(target: "shelfsync::pool", "cache population rejected; propagation queue full");
        }
    }

    /// Best-effort cache invalidation
    fn delete_cache_entry(&self, kind: EntityKind, id: &EntityId) {
        let key = CacheKey::new(kind, id);
        if let Err(e) = self.cache.delete(&key) {
            warn!(target: "shelfsync::cache", key = %key, error = %e, "cache delete failed");
            self.metrics.record_cache_failure();
        }
    }
}

/// The idempotent merge statement for a projection
fn merge_write(projection: GraphProjection) -> GraphWrite {
    match projection {
        GraphProjection::Node {
            label,
            id,
            properties,
        } => GraphWrite::MergeNode {
            label,
            row: NodeRow {
                id: id.to_string(),
                properties,
            },
        },
        GraphProjection::Edge {
            from_label,
            from_id,
            to_label,
            to_id,
            rel_type,
            properties,
        } => GraphWrite::MergeEdge {
            rel_type,
            row: EdgeRow {
                from: NodeRef::new(from_label, from_id.to_string()),
                to: NodeRef::new(to_label, to_id.to_string()),
                properties,
            },
        },
    }
}

/// The statement pushing a committed field update to the graph
///
/// Node kinds overwrite the projected properties in place; edge kinds
/// re-merge the edge, since the edge identity (endpoints) never changes
/// under a field update.
fn update_write(projection: GraphProjection) -> GraphWrite {
    match projection {
        GraphProjection::Node {
            label,
            id,
            properties,
        } => GraphWrite::SetNodeProperties {
            label,
            id: id.to_string(),
            properties,
        },
        edge @ GraphProjection::Edge { .. } => merge_write(edge),
    }
}

/// The teardown statement for a deleted entity
///
/// Prefers the captured document's projection (edges need their endpoints);
/// falls back to a label-level detach delete, which is idempotent and
/// tolerates a missing node.
fn removal_write<E: CatalogEntity>(doc: Option<&Value>, id: &EntityId) -> Option<GraphWrite> {
    if let Some(doc) = doc {
        if let Ok(entity) = serde_json::from_value::<E>(doc.clone()) {
            if let Some(projection) = entity.graph_projection() {
                return Some(match projection {
                    GraphProjection::Node { label, id, .. } => GraphWrite::DetachDeleteNode {
                        label,
                        id: id.to_string(),
                    },
                    GraphProjection::Edge {
                        from_label,
                        from_id,
                        to_label,
                        to_id,
                        rel_type,
                        ..
                    } => GraphWrite::DeleteEdge {
                        rel_type,
                        from: NodeRef::new(from_label, from_id.to_string()),
                        to: NodeRef::new(to_label, to_id.to_string()),
                    },
                });
            }
        }
    }
    E::KIND.node_label().map(|label| GraphWrite::DetachDeleteNode {
        label,
        id: id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shelfsync_core::{Author, Genre};
    use shelfsync_stores::testing::FlakyGraphStore;
    use shelfsync_stores::{MemoryCacheStore, MemoryGraphStore, MemoryPrimaryStore};

    struct Fixture {
        primary: Arc<MemoryPrimaryStore>,
        graph: Arc<FlakyGraphStore<MemoryGraphStore>>,
        cache: Arc<MemoryCacheStore>,
        coordinator: WriteCoordinator,
    }

    fn fixture() -> Fixture {
        let primary = Arc::new(MemoryPrimaryStore::new());
        let graph = Arc::new(FlakyGraphStore::new(Arc::new(MemoryGraphStore::new())));
        let cache = Arc::new(MemoryCacheStore::new());
        let coordinator = WriteCoordinator::new(
            Arc::clone(&primary) as Arc<dyn PrimaryStore>,
            Arc::clone(&graph) as Arc<dyn GraphStore>,
            Arc::clone(&cache) as Arc<dyn CacheStore>,
        );
        Fixture {
            primary,
            graph,
            cache,
            coordinator,
        }
    }

    #[test]
    fn test_insert_assigns_id_and_populates_everything() {
        let fx = fixture();
        let genre = fx.coordinator.insert(Genre::named("Fantasy")).unwrap();
        let id = genre.id.unwrap();

        // Primary holds the document
        let doc = fx
            .primary
            .find_by_id(EntityKind::Genre, &id)
            .unwrap()
            .unwrap();
        assert_eq!(doc["name"], json!("Fantasy"));

        // Secondary holds the node
        assert!(fx.graph.inner().node_exists("Genre", &id.to_string()));

        // Cache was populated, not just invalidated
        let key = CacheKey::new(EntityKind::Genre, &id);
        assert!(fx.cache.get(&key).unwrap().is_some());
    }

    #[test]
    fn test_insert_rejects_assigned_id() {
        let fx = fixture();
        let genre = fx.coordinator.insert(Genre::named("Fantasy")).unwrap();
        let result = fx.coordinator.insert(genre);
        assert!(matches!(result, Err(Error::IdAlreadyAssigned(_))));
    }

    #[test]
    fn test_insert_rejects_missing_required_field() {
        let fx = fixture();
        let result = fx.coordinator.insert(Genre::named(""));
        assert!(matches!(result, Err(Error::MissingField { .. })));
        assert_eq!(fx.primary.count(EntityKind::Genre), 0);
    }

    #[test]
    fn test_graph_outage_does_not_fail_insert() {
        let fx = fixture();
        fx.graph.set_down(true);

        let genre = fx.coordinator.insert(Genre::named("Fantasy")).unwrap();
        let id = genre.id.unwrap();

        // Primary durability is independent of secondary availability
        assert!(fx
            .primary
            .find_by_id(EntityKind::Genre, &id)
            .unwrap()
            .is_some());
        assert!(!fx.graph.inner().node_exists("Genre", &id.to_string()));

        // The failure was absorbed, counted, and tracked for resync
        let snap = fx.coordinator.metrics();
        assert_eq!(snap.graph_failures, 1);
        assert!(fx.coordinator.drift().contains(EntityKind::Genre, &id));
    }

    #[test]
    fn test_insert_many_batches_and_caches_async() {
        let fx = fixture();
        let genres = fx
            .coordinator
            .insert_many(vec![Genre::named("Fantasy"), Genre::named("Sci-Fi")])
            .unwrap();
        assert_eq!(genres.len(), 2);

        for genre in &genres {
            let id = genre.id.unwrap();
            assert!(fx.graph.inner().node_exists("Genre", &id.to_string()));
        }

        // Cache population is fire-and-forget; drain to observe it
        fx.coordinator.drain_propagation();
        for genre in &genres {
            let key = CacheKey::new(EntityKind::Genre, &genre.id.unwrap());
            assert!(fx.cache.get(&key).unwrap().is_some());
        }
    }

    #[test]
    fn test_insert_many_empty_is_noop() {
        let fx = fixture();
        let out = fx.coordinator.insert_many(Vec::<Genre>::new()).unwrap();
        assert!(out.is_empty());
        assert_eq!(fx.coordinator.metrics().inserts, 0);
    }

    #[test]
    fn test_update_deletes_cache_entry() {
        let fx = fixture();
        let genre = fx.coordinator.insert(Genre::named("Fantasy")).unwrap();
        let id = genre.id.unwrap();
        let key = CacheKey::new(EntityKind::Genre, &id);
        assert!(fx.cache.get(&key).unwrap().is_some());

        let modified = fx
            .coordinator
            .update_fields::<Genre>(&id, &[FieldUpdate::set("description", json!("dragons"))])
            .unwrap();
        assert!(modified);
        assert!(fx.cache.get(&key).unwrap().is_none());
    }

    #[test]
    fn test_update_pushes_graph_only_for_projected_fields() {
        let fx = fixture();
        let genre = fx.coordinator.insert(Genre::named("Fantasy")).unwrap();
        let id = genre.id.unwrap();

        // Non-projected field: no graph write
        fx.coordinator
            .update_fields::<Genre>(&id, &[FieldUpdate::set("description", json!("dragons"))])
            .unwrap();
        assert_eq!(
            fx.graph.inner().node_properties("Genre", &id.to_string()).unwrap()["name"],
            json!("Fantasy")
        );

        // Projected field: node is re-merged with the committed value
        fx.coordinator
            .update_fields::<Genre>(&id, &[FieldUpdate::set("name", json!("Grimdark"))])
            .unwrap();
        assert_eq!(
            fx.graph.inner().node_properties("Genre", &id.to_string()).unwrap()["name"],
            json!("Grimdark")
        );
    }

    #[test]
    fn test_update_missing_returns_false() {
        let fx = fixture();
        let modified = fx
            .coordinator
            .update_fields::<Genre>(
                &EntityId::generate(),
                &[FieldUpdate::set("name", json!("x"))],
            )
            .unwrap();
        assert!(!modified);
        assert_eq!(fx.coordinator.metrics().not_found, 1);
    }

    #[test]
    fn test_update_with_no_fields_is_noop() {
        let fx = fixture();
        let genre = fx.coordinator.insert(Genre::named("Fantasy")).unwrap();
        let modified = fx
            .coordinator
            .update_fields::<Genre>(&genre.id.unwrap(), &[])
            .unwrap();
        assert!(!modified);
    }

    #[test]
    fn test_delete_removes_node_and_cache() {
        let fx = fixture();
        let author = fx
            .coordinator
            .insert(Author::named("Ursula K. Le Guin"))
            .unwrap();
        let id = author.id.unwrap();
        assert!(fx.graph.inner().node_exists("Author", &id.to_string()));

        let deleted = fx.coordinator.delete::<Author>(&id).unwrap();
        assert!(deleted);

        assert!(fx
            .primary
            .find_by_id(EntityKind::Author, &id)
            .unwrap()
            .is_none());
        assert!(!fx.graph.inner().node_exists("Author", &id.to_string()));
        let key = CacheKey::new(EntityKind::Author, &id);
        assert!(fx.cache.get(&key).unwrap().is_none());
    }

    #[test]
    fn test_delete_missing_reports_not_found() {
        let fx = fixture();
        let deleted = fx.coordinator.delete::<Genre>(&EntityId::generate()).unwrap();
        assert!(!deleted);
        assert_eq!(fx.coordinator.metrics().not_found, 1);
    }

    #[test]
    fn test_delete_many_partial_is_success() {
        let fx = fixture();
        let g1 = fx.coordinator.insert(Genre::named("a")).unwrap();
        let g2 = fx.coordinator.insert(Genre::named("b")).unwrap();
        let missing = EntityId::generate();

        let ids = [g1.id.unwrap(), g2.id.unwrap(), missing];
        let ok = fx.coordinator.delete_many::<Genre>(&ids).unwrap();
        assert!(ok);

        assert_eq!(fx.primary.count(EntityKind::Genre), 0);
        let snap = fx.coordinator.metrics();
        assert_eq!(snap.deletes, 2);
        assert_eq!(snap.partial_batch_deletes, 1);
    }

    #[test]
    fn test_delete_many_all_missing_is_not_found() {
        let fx = fixture();
        let ids = [EntityId::generate(), EntityId::generate()];
        let ok = fx.coordinator.delete_many::<Genre>(&ids).unwrap();
        assert!(!ok);
    }

    #[test]
    fn test_find_round_trips_through_read_path() {
        let fx = fixture();
        let genre = fx.coordinator.insert(Genre::named("Fantasy")).unwrap();
        let found: Genre = fx
            .coordinator
            .find(&genre.id.unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(found, genre);
    }

    #[test]
    fn test_graph_outage_during_update_marks_drift() {
        let fx = fixture();
        let genre = fx.coordinator.insert(Genre::named("Fantasy")).unwrap();
        let id = genre.id.unwrap();

        fx.graph.set_down(true);
        let modified = fx
            .coordinator
            .update_fields::<Genre>(&id, &[FieldUpdate::set("name", json!("Grimdark"))])
            .unwrap();
        assert!(modified);
        assert!(fx.coordinator.drift().contains(EntityKind::Genre, &id));

        // Primary committed the new value regardless
        let doc = fx
            .primary
            .find_by_id(EntityKind::Genre, &id)
            .unwrap()
            .unwrap();
        assert_eq!(doc["name"], json!("Grimdark"));
    }
}
