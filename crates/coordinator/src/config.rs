//! Coordinator configuration

use std::time::Duration;

/// Tunables for the write coordinator
///
/// Store-level timeouts are owned by the store backends themselves (a real
/// driver carries its own deadline per call); the coordinator only decides
/// what happens when a call fails, which is fixed policy, not configuration.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// TTL for cache entries written by inserts and read-through population
    pub cache_ttl: Duration,
    /// Worker threads servicing fire-and-forget propagation work
    pub propagation_workers: usize,
    /// Maximum queued propagation tasks before submissions are rejected
    pub propagation_queue_depth: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(3600),
            propagation_workers: 2,
            propagation_queue_depth: 1024,
        }
    }
}
