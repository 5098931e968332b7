//! Secondary index reconciliation
//!
//! Rebuilds graph projections from the primary store, which is always the
//! source of truth. Because every graph statement is an idempotent merge,
//! resyncing entities that never drifted is harmless, so the reconciler
//! replays whole collections rather than chasing individual ledger entries.
//! Unlike the write path, failures here are surfaced: a reconciliation that
//! cannot reach the graph store has nothing useful to absorb.

use crate::drift::DriftTracker;
use serde_json::Value;
use shelfsync_core::{Author, Book, CatalogEntity, EntityKind, Genre, GraphProjection, Review, User};
use shelfsync_stores::{EdgeRow, GraphError, GraphStore, GraphWrite, NodeRef, NodeRow, PrimaryStore};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors surfaced by reconciliation
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The primary store could not be read
    #[error("primary store: {0}")]
    Primary(#[from] shelfsync_core::Error),
    /// The graph store rejected a merge
    #[error("graph store: {0}")]
    Graph(#[from] GraphError),
}

/// Outcome of a reconciliation run
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    /// Entities re-merged, per kind
    pub resynced: Vec<(EntityKind, usize)>,
    /// Drift ledger entries cleared by this run
    pub drift_cleared: usize,
}

impl ReconcileReport {
    /// Total entities re-merged across all kinds
    pub fn total(&self) -> usize {
        self.resynced.iter().map(|(_, n)| n).sum()
    }
}

/// Replays primary store collections into the secondary index
pub struct Reconciler {
    primary: Arc<dyn PrimaryStore>,
    graph: Arc<dyn GraphStore>,
    drift: Arc<DriftTracker>,
}

impl Reconciler {
    /// Build a reconciler sharing the coordinator's drift ledger
    pub fn new(
        primary: Arc<dyn PrimaryStore>,
        graph: Arc<dyn GraphStore>,
        drift: Arc<DriftTracker>,
    ) -> Self {
        Self {
            primary,
            graph,
            drift,
        }
    }

    /// Resync every projecting kind and clear the drift ledger
    ///
    /// The ledger is cleared only after every collection replays cleanly;
    /// a failed run leaves it intact for the next attempt.
    pub fn run(&self) -> Result<ReconcileReport, ReconcileError> {
        let mut report = ReconcileReport::default();
        report.resynced.push((EntityKind::Author, self.resync::<Author>()?));
        report.resynced.push((EntityKind::Genre, self.resync::<Genre>()?));
        report.resynced.push((EntityKind::Book, self.resync::<Book>()?));
        report.resynced.push((EntityKind::User, self.resync::<User>()?));
        report.resynced.push((EntityKind::Review, self.resync::<Review>()?));
        report.drift_cleared = self.drift.take_all().len();

        info!(
            target: "shelfsync::coord",
            resynced = report.total(),
            drift_cleared = report.drift_cleared,
            "reconciliation complete"
        );
        Ok(report)
    }

    /// Re-merge one kind's projections from the primary store
    ///
    /// Documents that no longer deserialize are skipped with a warning
    /// rather than aborting the run; one bad document must not hold every
    /// other projection stale.
    pub fn resync<E: CatalogEntity>(&self) -> Result<usize, ReconcileError> {
        let docs = self.primary.list_all(E::KIND)?;

        let mut node_label = None;
        let mut node_rows = Vec::new();
        let mut rel_type = None;
        let mut edge_rows = Vec::new();
        let mut count = 0;

        for doc in docs {
            let entity = match serde_json::from_value::<E>(doc.clone()) {
                Ok(entity) => entity,
                Err(e) => {
                    warn!(
                        target: "shelfsync::coord",
                        kind = %E::KIND,
                        id = display_id(&doc),
                        error = %e,
                        "skipping undecodable document during resync"
                    );
                    continue;
                }
            };
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
                    count += 1;
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
                    count += 1;
                }
                None => {}
            }
        }

        if let Some(label) = node_label {
            self.graph.execute_write(&GraphWrite::MergeNodes {
                label,
                rows: node_rows,
            })?;
        }
        if let Some(rel_type) = rel_type {
            self.graph.execute_write(&GraphWrite::MergeEdges {
                rel_type,
                rows: edge_rows,
            })?;
        }
        Ok(count)
    }
}

fn display_id(doc: &Value) -> String {
    doc.get("id")
        .and_then(Value::as_str)
        .unwrap_or("<missing>")
        .to_string()
}
