//! Embedded in-memory secondary index
//!
//! Reference backend for the [`GraphStore`] seam. Nodes and edges live in
//! concurrent maps; merge statements upsert, deletes tolerate missing
//! targets. Read helpers exist for tests and the reconciler's verification
//! paths; they are not part of the seam.

use super::{EdgeRow, GraphResult, GraphStore, GraphWrite, NodeRef, NodeRow};
use dashmap::DashMap;
use shelfsync_core::PropertyMap;
use tracing::trace;

/// Node key: (label, id property)
type NodeKey = (&'static str, String);

/// Edge key: (from, rel_type, to)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EdgeKey {
    from: NodeRef,
    rel_type: &'static str,
    to: NodeRef,
}

/// In-memory graph store
#[derive(Default)]
pub struct MemoryGraphStore {
    nodes: DashMap<NodeKey, PropertyMap>,
    edges: DashMap<EdgeKey, PropertyMap>,
}

impl MemoryGraphStore {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a node exists
    pub fn node_exists(&self, label: &'static str, id: &str) -> bool {
        self.nodes.contains_key(&(label, id.to_string()))
    }

    /// Properties of a node, if present
    pub fn node_properties(&self, label: &'static str, id: &str) -> Option<PropertyMap> {
        self.nodes.get(&(label, id.to_string())).map(|e| e.clone())
    }

    /// Properties of an edge, if present
    pub fn edge_properties(
        &self,
        from: &NodeRef,
        rel_type: &'static str,
        to: &NodeRef,
    ) -> Option<PropertyMap> {
        self.edges
            .get(&EdgeKey {
                from: from.clone(),
                rel_type,
                to: to.clone(),
            })
            .map(|e| e.clone())
    }

    /// Total node count
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total edge count
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn merge_node(&self, label: &'static str, row: &NodeRow) {
        self.nodes
            .entry((label, row.id.clone()))
            .and_modify(|props| props.extend(row.properties.clone()))
            .or_insert_with(|| row.properties.clone());
    }

    fn merge_edge(&self, rel_type: &'static str, row: &EdgeRow) {
        // Merging an edge also merges its endpoints so a projection can be
        // replayed in any order.
        self.nodes
            .entry((row.from.label, row.from.id.clone()))
            .or_default();
        self.nodes
            .entry((row.to.label, row.to.id.clone()))
            .or_default();
        self.edges
            .entry(EdgeKey {
                from: row.from.clone(),
                rel_type,
                to: row.to.clone(),
            })
            .and_modify(|props| props.extend(row.properties.clone()))
            .or_insert_with(|| row.properties.clone());
    }

    fn detach_delete(&self, label: &'static str, id: &str) {
        let removed = self.nodes.remove(&(label, id.to_string())).is_some();
        self.edges
            .retain(|key, _| !(key.from.label == label && key.from.id == id)
                && !(key.to.label == label && key.to.id == id));
        trace!(target: "shelfsync::graph", label, id, removed, "detach delete");
    }
}

impl GraphStore for MemoryGraphStore {
    fn execute_write(&self, write: &GraphWrite) -> GraphResult<()> {
        match write {
            GraphWrite::MergeNode { label, row } => self.merge_node(label, row),
            GraphWrite::MergeNodes { label, rows } => {
                for row in rows {
                    self.merge_node(label, row);
                }
            }
            GraphWrite::SetNodeProperties {
                label,
                id,
                properties,
            } => {
                self.nodes
                    .entry((label, id.clone()))
                    .and_modify(|props| props.extend(properties.clone()))
                    .or_insert_with(|| properties.clone());
            }
            GraphWrite::MergeEdge { rel_type, row } => self.merge_edge(rel_type, row),
            GraphWrite::MergeEdges { rel_type, rows } => {
                for row in rows {
                    self.merge_edge(rel_type, row);
                }
            }
            GraphWrite::DeleteEdge { rel_type, from, to } => {
                self.edges.remove(&EdgeKey {
                    from: from.clone(),
                    rel_type,
                    to: to.clone(),
                });
            }
            GraphWrite::DetachDeleteNode { label, id } => self.detach_delete(label, id),
            GraphWrite::DetachDeleteNodes { label, ids } => {
                for id in ids {
                    self.detach_delete(label, id);
                }
            }
        }
        Ok(())
    }
}
