//! Write coordinator for shelfsync
//!
//! This crate sequences every logical mutation across the three stores:
//! - WriteCoordinator: insert / insert_many / update_fields / delete /
//!   delete_many, with the Primary → Secondary → Cache ordering invariant
//! - ReadPath: cache-first lookup with read-through population
//! - PropagationPool: bounded workers for fire-and-forget post-commit work
//! - DriftTracker: needs-resync ledger fed by absorbed secondary failures
//! - Reconciler: idempotent full-rescan repair of the secondary index
//! - CoordinatorMetrics: operation and failure counters
//!
//! The primary store is the single source of truth: an operation that must
//! fail does so before anything observable (graph edges, cache state)
//! changes. Secondary index and cache failures are absorbed, logged, and
//! tracked; only primary outcomes reach callers.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod coordinator;
pub mod drift;
pub mod metrics;
pub mod propagation;
pub mod read;
pub mod reconcile;

pub use config::CoordinatorConfig;
pub use coordinator::WriteCoordinator;
pub use drift::DriftTracker;
pub use metrics::{CoordinatorMetrics, MetricsSnapshot};
pub use propagation::{PoolStats, PropagationFull, PropagationPool};
pub use read::ReadPath;
pub use reconcile::{ReconcileError, ReconcileReport, Reconciler};
