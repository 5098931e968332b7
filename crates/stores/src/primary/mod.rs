//! Primary store seam
//!
//! The canonical, durable document store. Collection per entity kind,
//! id generation on insert, and a session abstraction supporting atomic
//! multi-operation transactions scoped to a single coordinator call.
//!
//! Primary failures are the only errors that reach callers, so this seam
//! speaks the core [`shelfsync_core::Error`] type directly.

mod memory;

pub use memory::MemoryPrimaryStore;

use serde_json::Value;
use shelfsync_core::{EntityId, EntityKind, FieldUpdate, Result};

/// Canonical document store
///
/// Reads outside a transaction go straight through the store; mutations go
/// through a [`PrimarySession`]. Sessions are scoped to one coordinator call
/// and must never be shared across concurrent operations.
pub trait PrimaryStore: Send + Sync {
    /// Open a transaction session
    fn session(&self) -> Box<dyn PrimarySession + '_>;

    /// Fetch one document by id
    fn find_by_id(&self, kind: EntityKind, id: &EntityId) -> Result<Option<Value>>;

    /// Fetch all documents whose `field` value is one of `keys`
    ///
    /// Used by bulk-import deduplication: the natural-key field (e.g. `name`
    /// for genres) is matched against the distinct input set.
    fn find_by_natural_keys(
        &self,
        kind: EntityKind,
        field: &str,
        keys: &[String],
    ) -> Result<Vec<Value>>;

    /// Full collection scan, used by the reconciliation task
    fn list_all(&self, kind: EntityKind) -> Result<Vec<Value>>;
}

/// A single-call transaction against the primary store
///
/// Mutations take effect within the session immediately (counts reflect the
/// in-transaction state) and become visible to readers only on `commit`.
/// `abort` discards everything. Dropping a session without committing is
/// equivalent to abort.
pub trait PrimarySession {
    /// Insert one document, assigning a fresh id
    ///
    /// The document must not carry an `id` field; the store owns id
    /// assignment. Returns the assigned id.
    fn insert_one(&mut self, kind: EntityKind, doc: Value) -> Result<EntityId>;

    /// Insert a batch of documents, assigning fresh ids in order
    fn insert_many(&mut self, kind: EntityKind, docs: Vec<Value>) -> Result<Vec<EntityId>>;

    /// Partially update the document matching `id`
    ///
    /// Returns the modified count: 1 when a document matched, 0 otherwise.
    fn update_fields(
        &mut self,
        kind: EntityKind,
        id: &EntityId,
        updates: &[FieldUpdate],
    ) -> Result<u64>;

    /// Delete the document matching `id`, returning the deleted count
    fn delete_one(&mut self, kind: EntityKind, id: &EntityId) -> Result<u64>;

    /// Delete all documents matching `ids`, returning the deleted count
    fn delete_many(&mut self, kind: EntityKind, ids: &[EntityId]) -> Result<u64>;

    /// Read a document as seen by this transaction
    fn find_by_id(&self, kind: EntityKind, id: &EntityId) -> Result<Option<Value>>;

    /// Make the session's mutations visible atomically
    fn commit(self: Box<Self>) -> Result<()>;

    /// Discard the session's mutations
    fn abort(self: Box<Self>);
}
