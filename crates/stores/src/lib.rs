//! Store adapters for shelfsync
//!
//! The coordinator drives three heterogeneous stores through the trait seams
//! defined here:
//! - Primary Store: canonical document store with single-call transactions
//! - Secondary Index: idempotent graph mutations (merge / detach-delete)
//! - Cache: TTL key/value store, never authoritative
//!
//! Each seam ships with an embedded in-memory reference backend. Real
//! drivers (a document database, a graph database, a networked cache)
//! implement the same traits without touching coordinator code.
//!
//! The `testing` module provides outage-injecting wrappers used to prove
//! that primary durability is independent of secondary/cache availability.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod graph;
pub mod primary;
pub mod testing;

pub use cache::{CacheError, CacheResult, CacheStore, MemoryCacheStore};
pub use graph::{
    EdgeRow, GraphError, GraphResult, GraphStore, GraphWrite, MemoryGraphStore, NodeRef, NodeRow,
};
pub use primary::{MemoryPrimaryStore, PrimarySession, PrimaryStore};
