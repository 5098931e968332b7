//! Secondary index seam
//!
//! A graph store holding a derived, relationship-oriented projection of the
//! catalog: nodes typed by entity kind (Author, Book, Reader, Genre), keyed
//! by the entity id as a plain string property, and edges such as `RATED`
//! carrying scalar properties.
//!
//! The seam is a single "execute write" operation parametrized by a
//! statement and its parameter rows, with single-row and batch (UNWIND-
//! style) variants. Every statement is idempotent: merges converge on the
//! same state when re-run and deletes of missing nodes/edges are not
//! errors, so reconciliation can replay the whole projection safely.
//!
//! Failures here are non-fatal by contract: the coordinator logs them and
//! records the affected ids for resync; they never reach callers.

mod memory;

pub use memory::MemoryGraphStore;

use shelfsync_core::PropertyMap;
use thiserror::Error;

/// Result type for secondary index operations
pub type GraphResult<T> = std::result::Result<T, GraphError>;

/// Secondary index failures (absorbed by the coordinator, never surfaced)
#[derive(Debug, Error)]
pub enum GraphError {
    /// Store unreachable or timed out
    #[error("secondary index unavailable: {0}")]
    Unavailable(String),

    /// Statement rejected by the store
    #[error("secondary index rejected statement: {0}")]
    Statement(String),
}

/// Reference to a node: label plus id property
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeRef {
    /// Node label
    pub label: &'static str,
    /// Entity id, as a string property
    pub id: String,
}

impl NodeRef {
    /// Build a node reference
    pub fn new(label: &'static str, id: impl Into<String>) -> Self {
        Self {
            label,
            id: id.into(),
        }
    }
}

/// One node parameter row for merge statements
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRow {
    /// Entity id, as a string property
    pub id: String,
    /// Projected scalar properties
    pub properties: PropertyMap,
}

/// One edge parameter row for merge statements
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRow {
    /// Source node
    pub from: NodeRef,
    /// Target node
    pub to: NodeRef,
    /// Scalar properties on the edge
    pub properties: PropertyMap,
}

/// A parametrized write statement against the secondary index
///
/// Single-row variants correspond to one-entity coordinator operations;
/// the plural variants are the batch (UNWIND-style) forms built from a
/// successfully-inserted or successfully-deleted set.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphWrite {
    /// Merge (create-or-update) one node
    MergeNode {
        /// Node label
        label: &'static str,
        /// Parameter row
        row: NodeRow,
    },
    /// Merge a batch of nodes under one label
    MergeNodes {
        /// Node label
        label: &'static str,
        /// Parameter rows
        rows: Vec<NodeRow>,
    },
    /// Overwrite projected properties on an existing node (missing node is
    /// merged, keeping the statement idempotent)
    SetNodeProperties {
        /// Node label
        label: &'static str,
        /// Entity id property
        id: String,
        /// Properties to set
        properties: PropertyMap,
    },
    /// Merge one edge
    MergeEdge {
        /// Relationship type, e.g. `RATED`
        rel_type: &'static str,
        /// Parameter row
        row: EdgeRow,
    },
    /// Merge a batch of edges of one relationship type
    MergeEdges {
        /// Relationship type
        rel_type: &'static str,
        /// Parameter rows
        rows: Vec<EdgeRow>,
    },
    /// Delete one edge; a missing edge is not an error
    DeleteEdge {
        /// Relationship type
        rel_type: &'static str,
        /// Source node
        from: NodeRef,
        /// Target node
        to: NodeRef,
    },
    /// Delete one node and all incident edges; a missing node is not an
    /// error (`OPTIONAL MATCH ... DETACH DELETE` semantics)
    DetachDeleteNode {
        /// Node label
        label: &'static str,
        /// Entity id property
        id: String,
    },
    /// Batch detach-delete under one label
    DetachDeleteNodes {
        /// Node label
        label: &'static str,
        /// Entity id properties
        ids: Vec<String>,
    },
}

impl GraphWrite {
    /// Short operation tag used in failure logs and drift tracking
    pub fn op_tag(&self) -> &'static str {
        match self {
            GraphWrite::MergeNode { .. } => "merge_node",
            GraphWrite::MergeNodes { .. } => "merge_nodes",
            GraphWrite::SetNodeProperties { .. } => "set_node_properties",
            GraphWrite::MergeEdge { .. } => "merge_edge",
            GraphWrite::MergeEdges { .. } => "merge_edges",
            GraphWrite::DeleteEdge { .. } => "delete_edge",
            GraphWrite::DetachDeleteNode { .. } => "detach_delete_node",
            GraphWrite::DetachDeleteNodes { .. } => "detach_delete_nodes",
        }
    }
}

/// Graph store seam: one entry point, many statements
///
/// Implementations are long-lived, shared, and safe for concurrent use.
pub trait GraphStore: Send + Sync {
    /// Execute one write statement
    fn execute_write(&self, write: &GraphWrite) -> GraphResult<()>;
}
