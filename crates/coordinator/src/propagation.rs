//! Bounded pool for fire-and-forget propagation work
//!
//! Post-commit work that the caller must not wait for (batch cache
//! population, deferred graph pushes) runs here instead of on ad hoc
//! threads. The queue is bounded: when it is full, submission fails and the
//! caller records a metric; backpressure is observable, never an exception
//! to the original request.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::error;

type Task = Box<dyn FnOnce() + Send>;

/// Error returned when the propagation queue is at capacity or shut down
#[derive(Debug)]
pub struct PropagationFull;

impl std::fmt::Display for PropagationFull {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "propagation queue is full")
    }
}

impl std::error::Error for PropagationFull {}

/// Pool metrics snapshot
#[derive(Debug, Clone)]
pub struct PoolStats {
    /// Tasks waiting in the queue
    pub queue_depth: usize,
    /// Tasks currently executing
    pub active_tasks: usize,
    /// Tasks completed since pool creation (panicked tasks included)
    pub tasks_completed: u64,
    /// Worker thread count
    pub worker_count: usize,
}

struct PoolInner {
    queue: Mutex<VecDeque<Task>>,
    work_ready: Condvar,
    drain_cond: Condvar,
    shutdown: AtomicBool,
    queue_depth: AtomicUsize,
    active_tasks: AtomicUsize,
    tasks_completed: AtomicU64,
    max_queue_depth: usize,
}

/// Fixed pool of worker threads draining a bounded FIFO queue
pub struct PropagationPool {
    inner: Arc<PoolInner>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    worker_count: usize,
}

impl PropagationPool {
    /// Spawn `workers` threads servicing a queue bounded at `max_queue_depth`
    ///
    /// Workers are named `shelfsync-prop-0`, `shelfsync-prop-1`, etc.
    pub fn new(workers: usize, max_queue_depth: usize) -> Self {
        let inner = Arc::new(PoolInner {
            queue: Mutex::new(VecDeque::new()),
            work_ready: Condvar::new(),
            drain_cond: Condvar::new(),
            shutdown: AtomicBool::new(false),
            queue_depth: AtomicUsize::new(0),
            active_tasks: AtomicUsize::new(0),
            tasks_completed: AtomicU64::new(0),
            max_queue_depth,
        });

        let mut handles = Vec::with_capacity(workers);
        for i in 0..workers {
            let inner = Arc::clone(&inner);
            let handle = std::thread::Builder::new()
                .name(format!("shelfsync-prop-{}", i))
                .spawn(move || worker_loop(&inner))
                .expect("failed to spawn propagation worker");
            handles.push(handle);
        }

        Self {
            inner,
            workers: Mutex::new(handles),
            worker_count: workers,
        }
    }

    /// Submit a task; fails when the queue is full or the pool is shut down
    pub fn submit(&self, task: impl FnOnce() + Send + 'static) -> Result<(), PropagationFull> {
        if self.inner.shutdown.load(Ordering::Acquire) {
            return Err(PropagationFull);
        }
        if self.inner.queue_depth.load(Ordering::Acquire) >= self.inner.max_queue_depth {
            return Err(PropagationFull);
        }

        {
            let mut queue = self.inner.queue.lock();
            queue.push_back(Box::new(task));
            self.inner.queue_depth.fetch_add(1, Ordering::Release);
        }
        self.inner.work_ready.notify_one();
        Ok(())
    }

    /// Block until all queued and in-flight tasks have completed
    ///
    /// Workers keep running afterwards; this is not shutdown.
    pub fn drain(&self) {
        let mut queue = self.inner.queue.lock();
        while self.inner.queue_depth.load(Ordering::Acquire) > 0
            || self.inner.active_tasks.load(Ordering::Acquire) > 0
        {
            self.inner.drain_cond.wait(&mut queue);
        }
    }

    /// Signal workers to finish remaining tasks and join them
    pub fn shutdown(&self) {
        self.inner.shutdown.store(true, Ordering::Release);

        // Hold the queue lock while notifying so a worker between its
        // shutdown check and its condvar wait cannot miss the wakeup.
        {
            let _queue = self.inner.queue.lock();
            self.inner.work_ready.notify_all();
        }

        let mut workers = self.workers.lock();
        for handle in workers.drain(..) {
            let _ = handle.join();
        }
    }

    /// Current pool metrics
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            queue_depth: self.inner.queue_depth.load(Ordering::Relaxed),
            active_tasks: self.inner.active_tasks.load(Ordering::Relaxed),
            tasks_completed: self.inner.tasks_completed.load(Ordering::Relaxed),
            worker_count: self.worker_count,
        }
    }
}

/// Decrements `active_tasks` and notifies drain waiters on drop, so the
/// bookkeeping survives a panicking task and `drain()` cannot hang.
struct TaskGuard<'a> {
    inner: &'a PoolInner,
}

impl Drop for TaskGuard<'_> {
    fn drop(&mut self) {
        let prev_active = self.inner.active_tasks.fetch_sub(1, Ordering::Release);
        self.inner.tasks_completed.fetch_add(1, Ordering::Relaxed);

        if prev_active == 1 && self.inner.queue_depth.load(Ordering::Acquire) == 0 {
            // Hold the queue lock while notifying so drain() cannot miss it
            // between its condition check and its wait.
            let _queue = self.inner.queue.lock();
            self.inner.drain_cond.notify_all();
        }
    }
}

fn worker_loop(inner: &PoolInner) {
    loop {
        let task = {
            let mut queue = inner.queue.lock();
            loop {
                if let Some(task) = queue.pop_front() {
                    inner.queue_depth.fetch_sub(1, Ordering::Release);
                    inner.active_tasks.fetch_add(1, Ordering::Release);
                    break task;
                }
                if inner.shutdown.load(Ordering::Acquire) {
                    return;
                }
                inner.work_ready.wait(&mut queue);
            }
        };

        let _guard = TaskGuard { inner };

        // catch_unwind keeps a panicking task from killing the worker; the
        // guard keeps the counters correct either way.
        if std::panic::catch_unwind(std::panic::AssertUnwindSafe(task)).is_err() {
            error!(target: "shelfsync::pool", "propagation task panicked");
        }
    }
}
