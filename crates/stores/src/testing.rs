//! Testing utilities for the store seams
//!
//! Outage-injecting wrappers around the secondary index and cache backends.
//! Coordinator tests flip the outage switch to prove that primary-store
//! durability is independent of secondary/cache availability, and count the
//! absorbed failures to assert the non-fatal error contract.

use crate::cache::{CacheError, CacheResult, CacheStore};
use crate::graph::{GraphError, GraphResult, GraphStore, GraphWrite};
use crate::primary::{PrimarySession, PrimaryStore};
use serde_json::Value;
use shelfsync_core::{CacheKey, EntityId, EntityKind, Error, FieldUpdate, Result};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Graph store wrapper with a switchable simulated outage
pub struct FlakyGraphStore<G> {
    inner: Arc<G>,
    down: AtomicBool,
    failures: AtomicU64,
}

impl<G: GraphStore> FlakyGraphStore<G> {
    /// Wrap a graph store, initially healthy
    pub fn new(inner: Arc<G>) -> Self {
        Self {
            inner,
            down: AtomicBool::new(false),
            failures: AtomicU64::new(0),
        }
    }

    /// Simulate an outage (subsequent writes fail) or recovery
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// Number of writes rejected while down
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::SeqCst)
    }

    /// The wrapped store, for direct inspection
    pub fn inner(&self) -> &Arc<G> {
        &self.inner
    }
}

impl<G: GraphStore> GraphStore for FlakyGraphStore<G> {
    fn execute_write(&self, write: &GraphWrite) -> GraphResult<()> {
        if self.down.load(Ordering::SeqCst) {
            self.failures.fetch_add(1, Ordering::SeqCst);
            return Err(GraphError::Unavailable("simulated outage".to_string()));
        }
        self.inner.execute_write(write)
    }
}

/// Cache store wrapper with a switchable simulated outage
pub struct FlakyCacheStore<C> {
    inner: Arc<C>,
    down: AtomicBool,
    failures: AtomicU64,
}

impl<C: CacheStore> FlakyCacheStore<C> {
    /// Wrap a cache store, initially healthy
    pub fn new(inner: Arc<C>) -> Self {
        Self {
            inner,
            down: AtomicBool::new(false),
            failures: AtomicU64::new(0),
        }
    }

    /// Simulate an outage or recovery
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// Number of operations rejected while down
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::SeqCst)
    }

    /// The wrapped store, for direct inspection
    pub fn inner(&self) -> &Arc<C> {
        &self.inner
    }

    fn fail<T>(&self) -> CacheResult<T> {
        self.failures.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Unavailable("simulated outage".to_string()))
    }
}

impl<C: CacheStore> CacheStore for FlakyCacheStore<C> {
    fn save(&self, key: &CacheKey, value: Value, ttl: Duration) -> CacheResult<()> {
        if self.down.load(Ordering::SeqCst) {
            return self.fail();
        }
        self.inner.save(key, value, ttl)
    }

    fn get(&self, key: &CacheKey) -> CacheResult<Option<Value>> {
        if self.down.load(Ordering::SeqCst) {
            return self.fail();
        }
        self.inner.get(key)
    }

    fn delete(&self, key: &CacheKey) -> CacheResult<()> {
        if self.down.load(Ordering::SeqCst) {
            return self.fail();
        }
        self.inner.delete(key)
    }
}

/// Primary store wrapper with a switchable simulated outage
///
/// Unlike the graph and cache doubles, a primary outage is fatal to the
/// enclosing operation; tests use this to drive the batch-failure paths.
pub struct FlakyPrimaryStore<P> {
    inner: Arc<P>,
    down: AtomicBool,
}

impl<P: PrimaryStore> FlakyPrimaryStore<P> {
    /// Wrap a primary store, initially healthy
    pub fn new(inner: Arc<P>) -> Self {
        Self {
            inner,
            down: AtomicBool::new(false),
        }
    }

    /// Simulate an outage or recovery
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// The wrapped store, for direct inspection
    pub fn inner(&self) -> &Arc<P> {
        &self.inner
    }
}

fn primary_outage() -> Error {
    Error::Primary("simulated outage".to_string())
}

impl<P: PrimaryStore> PrimaryStore for FlakyPrimaryStore<P> {
    fn session(&self) -> Box<dyn PrimarySession + '_> {
        if self.down.load(Ordering::SeqCst) {
            Box::new(DeadSession)
        } else {
            self.inner.session()
        }
    }

    fn find_by_id(&self, kind: EntityKind, id: &EntityId) -> Result<Option<Value>> {
        if self.down.load(Ordering::SeqCst) {
            return Err(primary_outage());
        }
        self.inner.find_by_id(kind, id)
    }

    fn find_by_natural_keys(
        &self,
        kind: EntityKind,
        field: &str,
        keys: &[String],
    ) -> Result<Vec<Value>> {
        if self.down.load(Ordering::SeqCst) {
            return Err(primary_outage());
        }
        self.inner.find_by_natural_keys(kind, field, keys)
    }

    fn list_all(&self, kind: EntityKind) -> Result<Vec<Value>> {
        if self.down.load(Ordering::SeqCst) {
            return Err(primary_outage());
        }
        self.inner.list_all(kind)
    }
}

/// Session handed out while the store is down; every operation fails
struct DeadSession;

impl PrimarySession for DeadSession {
    fn insert_one(&mut self, _kind: EntityKind, _doc: Value) -> Result<EntityId> {
        Err(primary_outage())
    }

    fn insert_many(&mut self, _kind: EntityKind, _docs: Vec<Value>) -> Result<Vec<EntityId>> {
        Err(primary_outage())
    }

    fn update_fields(
        &mut self,
        _kind: EntityKind,
        _id: &EntityId,
        _updates: &[FieldUpdate],
    ) -> Result<u64> {
        Err(primary_outage())
    }

    fn delete_one(&mut self, _kind: EntityKind, _id: &EntityId) -> Result<u64> {
        Err(primary_outage())
    }

    fn delete_many(&mut self, _kind: EntityKind, _ids: &[EntityId]) -> Result<u64> {
        Err(primary_outage())
    }

    fn find_by_id(&self, _kind: EntityKind, _id: &EntityId) -> Result<Option<Value>> {
        Err(primary_outage())
    }

    fn commit(self: Box<Self>) -> Result<()> {
        Err(primary_outage())
    }

    fn abort(self: Box<Self>) {}
}
