//! Needs-resync ledger
//!
//! Every absorbed secondary index failure records the affected entities
//! here instead of being silently dropped. The reconciler drains the ledger
//! on its next run; until then the pending count is the upper bound on how
//! far the graph projection can lag the primary store.

use parking_lot::Mutex;
use shelfsync_core::{EntityId, EntityKind};
use std::collections::HashSet;
use tracing::debug;

/// Ledger of entities whose secondary index projection may be stale
#[derive(Debug, Default)]
pub struct DriftTracker {
    pending: Mutex<HashSet<(EntityKind, EntityId)>>,
}

impl DriftTracker {
    /// Empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark entities as needing resync after a failed graph write
    pub fn record(&self, kind: EntityKind, ids: impl IntoIterator<Item = EntityId>) {
        let mut pending = self.pending.lock();
        let before = pending.len();
        pending.extend(ids.into_iter().map(|id| (kind, id)));
        let added = pending.len() - before;
        if added > 0 {
            debug!(target: "shelfsync::coord", kind = %kind, added, "entities marked for resync");
        }
    }

    /// Number of entities awaiting resync
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Whether a specific entity is marked
    pub fn contains(&self, kind: EntityKind, id: &EntityId) -> bool {
        self.pending.lock().contains(&(kind, *id))
    }

    /// Drain the ledger, returning everything that was pending
    pub fn take_all(&self) -> Vec<(EntityKind, EntityId)> {
        self.pending.lock().drain().collect()
    }
}
