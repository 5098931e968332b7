//! Coordinator metrics
//!
//! Counters use Relaxed ordering intentionally: they are purely
//! observational, synchronize nothing, and approximate reads are acceptable
//! while operations are in flight. The atomic ops still guarantee no torn
//! updates.

use std::sync::atomic::{AtomicU64, Ordering};

/// Operation and failure counters for the coordinator
#[derive(Debug, Default)]
pub struct CoordinatorMetrics {
    inserts: AtomicU64,
    updates: AtomicU64,
    deletes: AtomicU64,
    not_found: AtomicU64,
    graph_failures: AtomicU64,
    cache_failures: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    propagation_rejected: AtomicU64,
    partial_batch_deletes: AtomicU64,
}

impl CoordinatorMetrics {
    /// Fresh zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Record committed insert operations (single or batch)
    pub fn record_inserts(&self, count: u64) {
        self.inserts.fetch_add(count, Ordering::Relaxed);
    }

    /// Record a committed field update
    pub fn record_update(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    /// Record committed deletes (single or batch)
    pub fn record_deletes(&self, count: u64) {
        self.deletes.fetch_add(count, Ordering::Relaxed);
    }

    /// Record an operation that matched no document
    pub fn record_not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an absorbed secondary index failure
    pub fn record_graph_failure(&self) {
        self.graph_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an absorbed cache failure
    pub fn record_cache_failure(&self) {
        self.cache_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a read served from cache
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a read that fell through to the primary store
    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a propagation task rejected by the bounded pool
    pub fn record_propagation_rejected(&self) {
        self.propagation_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a batch delete that removed fewer documents than requested
    pub fn record_partial_batch_delete(&self) {
        self.partial_batch_deletes.fetch_add(1, Ordering::Relaxed);
    }

    /// Current counter values
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            inserts: self.inserts.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            graph_failures: self.graph_failures.load(Ordering::Relaxed),
            cache_failures: self.cache_failures.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            propagation_rejected: self.propagation_rejected.load(Ordering::Relaxed),
            partial_batch_deletes: self.partial_batch_deletes.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of the coordinator counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Committed insert operations
    pub inserts: u64,
    /// Committed field updates
    pub updates: u64,
    /// Documents deleted
    pub deletes: u64,
    /// Operations that matched no document
    pub not_found: u64,
    /// Absorbed secondary index failures
    pub graph_failures: u64,
    /// Absorbed cache failures
    pub cache_failures: u64,
    /// Reads served from cache
    pub cache_hits: u64,
    /// Reads that fell through to the primary store
    pub cache_misses: u64,
    /// Propagation tasks rejected by the bounded pool
    pub propagation_rejected: u64,
    /// Batch deletes that removed fewer documents than requested
    pub partial_batch_deletes: u64,
}

impl MetricsSnapshot {
    /// Cache hit rate over all reads, 0.0 when no reads have happened
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total > 0 {
            self.cache_hits as f64 / total as f64
        } else {
            0.0
        }
    }
}
