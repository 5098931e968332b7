//! Embedded in-memory primary store
//!
//! Reference backend for the [`PrimaryStore`] seam. Collections are plain
//! maps behind one `RwLock`; a session takes the write lock for its whole
//! lifetime and mutates working copies of the collections it touches, so a
//! commit is a plain swap and an abort is a plain drop. Readers see either
//! all of a session's mutations or none of them.

use super::{PrimarySession, PrimaryStore};
use parking_lot::{RwLock, RwLockWriteGuard};
use serde_json::Value;
use shelfsync_core::{EntityId, EntityKind, Error, FieldUpdate, Result};
use std::collections::HashMap;
use tracing::debug;

type Collection = HashMap<EntityId, Value>;
type Collections = HashMap<EntityKind, Collection>;

/// In-memory canonical document store
#[derive(Default)]
pub struct MemoryPrimaryStore {
    collections: RwLock<Collections>,
}

impl MemoryPrimaryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection (test/observability helper)
    pub fn count(&self, kind: EntityKind) -> usize {
        self.collections
            .read()
            .get(&kind)
            .map_or(0, |c| c.len())
    }
}

impl PrimaryStore for MemoryPrimaryStore {
    fn session(&self) -> Box<dyn PrimarySession + '_> {
        Box::new(MemorySession {
            guard: self.collections.write(),
            staged: HashMap::new(),
        })
    }

    fn find_by_id(&self, kind: EntityKind, id: &EntityId) -> Result<Option<Value>> {
        Ok(self
            .collections
            .read()
            .get(&kind)
            .and_then(|c| c.get(id))
            .cloned())
    }

    fn find_by_natural_keys(
        &self,
        kind: EntityKind,
        field: &str,
        keys: &[String],
    ) -> Result<Vec<Value>> {
        let collections = self.collections.read();
        let Some(collection) = collections.get(&kind) else {
            return Ok(Vec::new());
        };
        Ok(collection
            .values()
            .filter(|doc| {
                doc.get(field)
                    .and_then(Value::as_str)
                    .is_some_and(|v| keys.iter().any(|k| k == v))
            })
            .cloned()
            .collect())
    }

    fn list_all(&self, kind: EntityKind) -> Result<Vec<Value>> {
        Ok(self
            .collections
            .read()
            .get(&kind)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default())
    }
}

/// Session over working copies of touched collections
///
/// Holds the store write lock for its lifetime; the transaction scope is a
/// single coordinator call, so the exclusion window is one logical mutation.
struct MemorySession<'a> {
    guard: RwLockWriteGuard<'a, Collections>,
    staged: Collections,
}

impl MemorySession<'_> {
    /// Working copy of a collection, cloned from committed state on first touch
    fn working(&mut self, kind: EntityKind) -> &mut Collection {
        if !self.staged.contains_key(&kind) {
            let copy = self.guard.get(&kind).cloned().unwrap_or_default();
            self.staged.insert(kind, copy);
        }
        self.staged.get_mut(&kind).expect("collection staged above")
    }

    fn stage_insert(&mut self, kind: EntityKind, mut doc: Value) -> Result<EntityId> {
        let obj = doc
            .as_object_mut()
            .ok_or_else(|| Error::Primary(format!("{} document is not an object", kind)))?;
        if obj.contains_key("id") {
            return Err(Error::IdAlreadyAssigned(kind));
        }
        let id = EntityId::generate();
        obj.insert("id".to_string(), Value::String(id.to_string()));
        self.working(kind).insert(id, doc);
        Ok(id)
    }
}

impl PrimarySession for MemorySession<'_> {
    fn insert_one(&mut self, kind: EntityKind, doc: Value) -> Result<EntityId> {
        self.stage_insert(kind, doc)
    }

    fn insert_many(&mut self, kind: EntityKind, docs: Vec<Value>) -> Result<Vec<EntityId>> {
        docs.into_iter()
            .map(|doc| self.stage_insert(kind, doc))
            .collect()
    }

    fn update_fields(
        &mut self,
        kind: EntityKind,
        id: &EntityId,
        updates: &[FieldUpdate],
    ) -> Result<u64> {
        let collection = self.working(kind);
        let Some(doc) = collection.get_mut(id) else {
            return Ok(0);
        };
        let obj = doc
            .as_object_mut()
            .ok_or_else(|| Error::Primary(format!("{} document is not an object", kind)))?;
        for update in updates {
            obj.insert(update.field.clone(), update.value.clone());
        }
        // A matched document counts as modified even when the new values
        // equal the old ones.
        Ok(1)
    }

    fn delete_one(&mut self, kind: EntityKind, id: &EntityId) -> Result<u64> {
        Ok(u64::from(self.working(kind).remove(id).is_some()))
    }

    fn delete_many(&mut self, kind: EntityKind, ids: &[EntityId]) -> Result<u64> {
        let collection = self.working(kind);
        Ok(ids
            .iter()
            .filter(|id| collection.remove(id).is_some())
            .count() as u64)
    }

    fn find_by_id(&self, kind: EntityKind, id: &EntityId) -> Result<Option<Value>> {
        let doc = match self.staged.get(&kind) {
            Some(copy) => copy.get(id),
            None => self.guard.get(&kind).and_then(|c| c.get(id)),
        };
        Ok(doc.cloned())
    }

    fn commit(mut self: Box<Self>) -> Result<()> {
        let touched = self.staged.len();
        for (kind, copy) in self.staged.drain() {
            self.guard.insert(kind, copy);
        }
        debug!(target: "shelfsync::primary", touched, "transaction committed");
        Ok(())
    }

    fn abort(self: Box<Self>) {
        debug!(target: "shelfsync::primary", "transaction aborted");
        // Working copies are dropped; committed state is untouched.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn insert_genre(store: &MemoryPrimaryStore, name: &str) -> EntityId {
        let mut session = store.session();
        let id = session
            .insert_one(EntityKind::Genre, json!({ "name": name }))
            .unwrap();
        session.commit().unwrap();
        id
    }

    #[test]
    fn test_insert_commit_visible() {
        let store = MemoryPrimaryStore::new();
        let id = insert_genre(&store, "Fantasy");

        let doc = store.find_by_id(EntityKind::Genre, &id).unwrap().unwrap();
        assert_eq!(doc["name"], json!("Fantasy"));
        assert_eq!(doc["id"], json!(id.to_string()));
    }

    #[test]
    fn test_abort_discards() {
        let store = MemoryPrimaryStore::new();
        let mut session = store.session();
        let id = session
            .insert_one(EntityKind::Genre, json!({ "name": "Fantasy" }))
            .unwrap();
        session.abort();

        assert!(store.find_by_id(EntityKind::Genre, &id).unwrap().is_none());
        assert_eq!(store.count(EntityKind::Genre), 0);
    }

    #[test]
    fn test_drop_without_commit_discards() {
        let store = MemoryPrimaryStore::new();
        {
            let mut session = store.session();
            session
                .insert_one(EntityKind::Genre, json!({ "name": "Fantasy" }))
                .unwrap();
        }
        assert_eq!(store.count(EntityKind::Genre), 0);
    }

    #[test]
    fn test_insert_rejects_client_supplied_id() {
        let store = MemoryPrimaryStore::new();
        let mut session = store.session();
        let result = session.insert_one(
            EntityKind::Genre,
            json!({ "id": "client-chosen", "name": "Fantasy" }),
        );
        assert!(matches!(result, Err(Error::IdAlreadyAssigned(_))));
    }

    #[test]
    fn test_insert_many_assigns_distinct_ids() {
        let store = MemoryPrimaryStore::new();
        let mut session = store.session();
        let ids = session
            .insert_many(
                EntityKind::Genre,
                vec![json!({ "name": "a" }), json!({ "name": "b" })],
            )
            .unwrap();
        session.commit().unwrap();

        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        assert_eq!(store.count(EntityKind::Genre), 2);
    }

    #[test]
    fn test_update_fields_modified_count() {
        let store = MemoryPrimaryStore::new();
        let id = insert_genre(&store, "Fantasy");

        let mut session = store.session();
        let modified = session
            .update_fields(
                EntityKind::Genre,
                &id,
                &[FieldUpdate::set("description", json!("dragons"))],
            )
            .unwrap();
        session.commit().unwrap();

        assert_eq!(modified, 1);
        let doc = store.find_by_id(EntityKind::Genre, &id).unwrap().unwrap();
        assert_eq!(doc["description"], json!("dragons"));
    }

    #[test]
    fn test_update_missing_returns_zero() {
        let store = MemoryPrimaryStore::new();
        let mut session = store.session();
        let modified = session
            .update_fields(
                EntityKind::Genre,
                &EntityId::generate(),
                &[FieldUpdate::set("name", json!("x"))],
            )
            .unwrap();
        assert_eq!(modified, 0);
    }

    #[test]
    fn test_delete_counts() {
        let store = MemoryPrimaryStore::new();
        let id1 = insert_genre(&store, "a");
        let id2 = insert_genre(&store, "b");
        let missing = EntityId::generate();

        let mut session = store.session();
        let deleted = session
            .delete_many(EntityKind::Genre, &[id1, id2, missing])
            .unwrap();
        session.commit().unwrap();

        assert_eq!(deleted, 2);
        assert_eq!(store.count(EntityKind::Genre), 0);
    }

    #[test]
    fn test_session_reads_see_staged_state() {
        let store = MemoryPrimaryStore::new();
        let id = insert_genre(&store, "Fantasy");

        let mut session = store.session();
        session.delete_one(EntityKind::Genre, &id).unwrap();
        // In-transaction read reflects the staged delete
        assert!(session.find_by_id(EntityKind::Genre, &id).unwrap().is_none());
        session.abort();

        // After abort the document is still there
        assert!(store.find_by_id(EntityKind::Genre, &id).unwrap().is_some());
    }

    #[test]
    fn test_multi_op_transaction_is_atomic() {
        let store = MemoryPrimaryStore::new();
        let id = insert_genre(&store, "Fantasy");

        let mut session = store.session();
        session.delete_one(EntityKind::Genre, &id).unwrap();
        session
            .insert_one(EntityKind::Genre, json!({ "name": "Grimdark" }))
            .unwrap();
        session.commit().unwrap();

        assert_eq!(store.count(EntityKind::Genre), 1);
        let all = store.list_all(EntityKind::Genre).unwrap();
        assert_eq!(all[0]["name"], json!("Grimdark"));
    }

    #[test]
    fn test_find_by_natural_keys() {
        let store = MemoryPrimaryStore::new();
        insert_genre(&store, "Fantasy");
        insert_genre(&store, "Sci-Fi");
        insert_genre(&store, "Romance");

        let found = store
            .find_by_natural_keys(
                EntityKind::Genre,
                "name",
                &["Fantasy".to_string(), "Sci-Fi".to_string()],
            )
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_collections_are_isolated_by_kind() {
        let store = MemoryPrimaryStore::new();
        let id = insert_genre(&store, "Fantasy");
        assert!(store.find_by_id(EntityKind::Author, &id).unwrap().is_none());
    }
}
