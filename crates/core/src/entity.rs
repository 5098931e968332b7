//! Per-entity coordinator configuration
//!
//! The write coordinator is generic over [`CatalogEntity`]. Each entity type
//! declares its kind, how its id is read and assigned, its deduplication
//! natural key, and the denormalized projection it pushes to the secondary
//! index.

use crate::id::EntityId;
use crate::kind::EntityKind;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Scalar property bag carried by graph nodes and edges
///
/// `BTreeMap` so parameter rows serialize in a stable order.
pub type PropertyMap = BTreeMap<String, Value>;

/// Denormalized view of an entity pushed to the secondary index
///
/// Most kinds project as a node keyed by the entity id (stored as a plain
/// string property, not a native foreign key). Reviews project as a `RATED`
/// edge from the reader to the book, carrying the rating and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphProjection {
    /// A labeled node keyed by entity id
    Node {
        /// Node label (entity kind family)
        label: &'static str,
        /// Entity id, stored as a string property on the node
        id: EntityId,
        /// Projected scalar properties
        properties: PropertyMap,
    },
    /// A relationship between two nodes
    Edge {
        /// Label of the source node
        from_label: &'static str,
        /// Id of the source node
        from_id: EntityId,
        /// Label of the target node
        to_label: &'static str,
        /// Id of the target node
        to_id: EntityId,
        /// Relationship type, e.g. `RATED`
        rel_type: &'static str,
        /// Scalar properties on the edge (rating, timestamp)
        properties: PropertyMap,
    },
}

/// A named-field partial update against the primary store
///
/// Field names address top-level document fields. Multi-field updates are
/// expressed as a slice of these.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldUpdate {
    /// Document field name
    pub field: String,
    /// New value for the field
    pub value: Value,
}

impl FieldUpdate {
    /// Build a single-field update
    pub fn set(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            value,
        }
    }
}

/// Per-entity configuration consumed by the generic write coordinator
///
/// Implementations are thin: they name the kind, expose the id slot, and
/// describe the projection. All sequencing and failure policy lives in the
/// coordinator itself.
pub trait CatalogEntity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The entity family this type belongs to
    const KIND: EntityKind;

    /// The assigned id, or `None` before first insert
    fn id(&self) -> Option<EntityId>;

    /// Fix the store-assigned id (called exactly once, on insert)
    fn assign_id(&mut self, id: EntityId);

    /// Check required fields before insert
    ///
    /// The coordinator rejects the insert with [`crate::Error::MissingField`]
    /// before opening a primary transaction.
    fn validate(&self) -> crate::Result<()> {
        Ok(())
    }

    /// Natural key used for bulk-import deduplication, if the kind has one
    /// (e.g. name for Genre and Author, title for Book)
    fn natural_key(&self) -> Option<&str> {
        None
    }

    /// Document field holding the natural key, used to query the primary
    /// store for existing entities during deduplication
    fn natural_key_field() -> Option<&'static str> {
        None
    }

    /// The denormalized view to merge into the secondary index, if any
    ///
    /// Returns `None` when the entity is not yet inserted (no id) or the
    /// kind is not represented in the graph.
    fn graph_projection(&self) -> Option<GraphProjection> {
        None
    }

    /// Document fields that participate in the graph projection
    ///
    /// `update_fields` only issues a secondary-index write when at least one
    /// updated field appears here.
    fn graph_projected_fields() -> &'static [&'static str] {
        &[]
    }
}
