//! Cross-store write/consistency coordinator for a catalog backend
//!
//! Every mutation to a catalog entity must land in three places with three
//! different failure models: a canonical document store (the primary), a
//! graph index holding a denormalized relationship projection (the
//! secondary), and a TTL cache. This workspace defines what "success" means
//! when they disagree:
//!
//! - The primary store is the single source of truth. Operations fail, if
//!   they must, before anything observable changes anywhere else.
//! - Secondary index and cache writes are best-effort: absorbed, logged,
//!   counted, and recorded in a drift ledger the reconciler repairs.
//! - Cache entries are deleted on mutation, never rewritten in place, so a
//!   racing writer can cost at most an extra miss, never stale data served
//!   indefinitely.
//!
//! The member crates:
//! - `shelfsync-core`: ids, entity kinds, the domain model, errors
//! - `shelfsync-stores`: the three store trait seams with in-memory backends
//! - `shelfsync-coordinator`: the write coordinator, read path, reconciler
//! - `shelfsync-import`: NDJSON bulk import with natural-key deduplication
//!
//! This crate re-exports the public API of all four.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use shelfsync_core::{
    Author, AuthorEmbed, Book, BookEmbed, CacheKey, CatalogEntity, EntityId, EntityKind, Error,
    FieldUpdate, Genre, GenreEmbed, GraphProjection, ImportReport, Notification, PropertyMap,
    Result, Review, ShelfEntry, User, UserRole,
};

pub use shelfsync_stores::{
    CacheError, CacheStore, EdgeRow, GraphError, GraphStore, GraphWrite, MemoryCacheStore,
    MemoryGraphStore, MemoryPrimaryStore, NodeRef, NodeRow, PrimarySession, PrimaryStore,
};

pub use shelfsync_coordinator::{
    CoordinatorConfig, CoordinatorMetrics, DriftTracker, MetricsSnapshot, ReadPath,
    ReconcileError, ReconcileReport, Reconciler, WriteCoordinator,
};

pub use shelfsync_import::{FileMeta, ImportError, ImportOutcome, ImportPipeline};
