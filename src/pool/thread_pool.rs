//! Thread pool implementation

use crate::core::{PackagedTask, PoolError, Result, TaskHandle};
use crate::pool::worker::{Worker, WorkerStats};
use crate::queue::TaskQueue;
use log::{error, warn};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Configuration for thread pool
#[derive(Clone, Debug)]
pub struct ThreadPoolConfig {
    /// Number of worker threads; must be at least 1
    pub num_threads: usize,
    /// Thread name prefix
    pub thread_name_prefix: String,
    /// Worker poll interval for checking new tasks and the stop signal.
    /// Default: 100ms
    ///
    /// Shorter intervals improve shutdown responsiveness but increase CPU
    /// usage while idle.
    pub poll_interval: Duration,
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        Self {
            num_threads: num_cpus::get(),
            thread_name_prefix: "worker".to_string(),
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl ThreadPoolConfig {
    /// Create a new configuration with the specified number of threads
    ///
    /// The count is taken literally; zero is rejected by
    /// [`validate`](Self::validate) at pool construction.
    #[must_use]
    pub fn new(num_threads: usize) -> Self {
        Self {
            num_threads,
            ..Default::default()
        }
    }

    /// Set thread name prefix
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Set the worker poll interval.
    ///
    /// # Panics
    ///
    /// Panics if interval is zero.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        assert!(!interval.is_zero(), "poll interval must be non-zero");
        self.poll_interval = interval;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.num_threads == 0 {
            return Err(PoolError::invalid_config(
                "num_threads",
                "Number of threads must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// A fixed-size pool of worker threads executing submitted tasks
///
/// Workers are spawned at construction and their count never changes.
/// [`submit`](Self::submit) pushes a task onto the shared FIFO queue and
/// immediately returns a [`TaskHandle`] for its result.
///
/// # Shutdown Protocol
///
/// [`stop`](Self::stop) flips the one-way stopping flag, closes the queue and
/// abandons tasks that no worker claimed yet; their handles resolve to
/// [`PoolError::Cancelled`]. A worker executing a task finishes it before
/// terminating. Joining the worker threads is a separate step,
/// [`join`](Self::join); [`shutdown`](Self::shutdown) combines the two.
pub struct ThreadPool {
    config: ThreadPoolConfig,
    workers: RwLock<Vec<Worker>>,
    queue: Arc<TaskQueue>,
    stopping: AtomicBool,
    total_tasks_submitted: AtomicU64,
}

impl std::fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPool")
            .field("config", &self.config)
            .field("stopping", &self.stopping.load(Ordering::Relaxed))
            .field(
                "total_tasks_submitted",
                &self.total_tasks_submitted.load(Ordering::Relaxed),
            )
            .finish()
    }
}

impl ThreadPool {
    /// Create a pool with default configuration (one worker per CPU)
    pub fn new() -> Result<Self> {
        Self::with_config(ThreadPoolConfig::default())
    }

    /// Create a pool with the specified number of worker threads
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if `num_threads` is zero.
    pub fn with_threads(num_threads: usize) -> Result<Self> {
        Self::with_config(ThreadPoolConfig::new(num_threads))
    }

    /// Create a pool with custom configuration
    ///
    /// Workers are spawned here and enter their idle loop immediately; there
    /// is no separate start step.
    pub fn with_config(config: ThreadPoolConfig) -> Result<Self> {
        config.validate()?;

        let queue = Arc::new(TaskQueue::unbounded());

        let mut workers = Vec::with_capacity(config.num_threads);
        for id in 0..config.num_threads {
            match Worker::new(
                id,
                &config.thread_name_prefix,
                Arc::clone(&queue),
                config.poll_interval,
            ) {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    // Release the workers spawned so far before bailing out
                    queue.close();
                    return Err(e);
                }
            }
        }

        Ok(Self {
            config,
            workers: RwLock::new(workers),
            queue,
            stopping: AtomicBool::new(false),
            total_tasks_submitted: AtomicU64::new(0),
        })
    }

    /// Submit a task, returning a handle to its eventual result
    ///
    /// Never blocks: the push is an unbounded-channel send. The returned
    /// [`TaskHandle`] resolves once a worker has executed the closure, with
    /// the value it produced or the failure it raised.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::PoolClosed`] if [`stop`](Self::stop) has been
    /// called; no task is created in that case.
    ///
    /// # Example
    ///
    /// ```rust
    /// use task_pool::prelude::*;
    ///
    /// # fn main() -> Result<()> {
    /// let pool = ThreadPool::with_threads(4)?;
    /// let handle = pool.submit(|| Ok("done"))?;
    /// assert_eq!(handle.wait()?, "done");
    /// # pool.shutdown()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn submit<T, F>(&self, f: F) -> Result<TaskHandle<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        if self.stopping.load(Ordering::Acquire) {
            return Err(PoolError::pool_closed(&self.config.thread_name_prefix));
        }

        let (task, handle) = PackagedTask::channel(f);
        // A concurrent stop() may close the queue between the flag check and
        // this send; the send then fails with the same pool-closed error. A
        // push that slips through before the close but after the drain is
        // abandoned by the final sweep in join().
        self.queue
            .send(Box::new(task))
            .map_err(|_| PoolError::pool_closed(&self.config.thread_name_prefix))?;

        self.total_tasks_submitted.fetch_add(1, Ordering::Relaxed);
        Ok(handle)
    }

    /// Submit a task and discard its handle
    ///
    /// For fire-and-forget callers that never inspect the result; failures
    /// still surface in the worker log and statistics.
    pub fn execute<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        self.submit(f).map(|_handle| ())
    }

    /// Get the number of worker threads
    pub fn num_threads(&self) -> usize {
        self.config.num_threads
    }

    /// Check whether the pool has been stopped
    pub fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::Acquire)
    }

    /// Get total number of tasks accepted by `submit`/`execute`
    pub fn total_tasks_submitted(&self) -> u64 {
        self.total_tasks_submitted.load(Ordering::Relaxed)
    }

    /// Get current queue size (approximate)
    pub fn queue_size(&self) -> usize {
        self.queue.len()
    }

    /// Get statistics for all workers
    pub fn worker_stats(&self) -> Vec<Arc<WorkerStats>> {
        self.workers.read().iter().map(|w| w.stats()).collect()
    }

    /// Get total tasks completed successfully across all workers
    pub fn total_tasks_processed(&self) -> u64 {
        let workers = self.workers.read();
        workers.iter().map(|w| w.stats().get_tasks_processed()).sum()
    }

    /// Get total tasks that returned an error across all workers
    pub fn total_tasks_failed(&self) -> u64 {
        let workers = self.workers.read();
        workers.iter().map(|w| w.stats().get_tasks_failed()).sum()
    }

    /// Get total tasks that panicked across all workers
    pub fn total_tasks_panicked(&self) -> u64 {
        let workers = self.workers.read();
        workers.iter().map(|w| w.stats().get_tasks_panicked()).sum()
    }

    /// Stop the pool: reject new submissions and signal idle workers
    ///
    /// Idempotent and thread-safe; only the first call has any effect.
    /// Queued tasks that no worker claimed yet are abandoned and their
    /// handles resolve to [`PoolError::Cancelled`]. A worker in the middle of
    /// a task finishes that task. Returns once the flag is set, the queue is
    /// closed and unclaimed tasks are abandoned; it does not wait for worker
    /// threads to terminate (see [`join`](Self::join)).
    pub fn stop(&self) {
        if self
            .stopping
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        self.queue.close();

        // A worker finishing its current task may race this drain for the
        // next queued task; whichever side wins, the handle resolves.
        let abandoned = self.queue.drain();
        if !abandoned.is_empty() {
            warn!(
                "pool '{}' stopping with {} unclaimed tasks; abandoning them",
                self.config.thread_name_prefix,
                abandoned.len()
            );
        }
        for task in abandoned {
            task.abandon();
        }
    }

    /// Join all worker threads to full termination
    ///
    /// The separate second half of the shutdown protocol; call after
    /// [`stop`](Self::stop). Safe to call more than once. Once the workers
    /// are gone, any task a racing submitter pushed after the drain in
    /// [`stop`](Self::stop) is abandoned here, so no handle returned by
    /// [`submit`](Self::submit) can hang.
    pub fn join(&self) -> Result<()> {
        let workers = std::mem::take(&mut *self.workers.write());
        for worker in workers {
            worker.join()?;
        }

        // A submitter that loaded stopping == false can complete its push
        // after stop() drained the queue. With every worker joined, nothing
        // can race a claim, so this sweep is final.
        let leftovers = self.queue.drain();
        if !leftovers.is_empty() {
            warn!(
                "pool '{}' found {} tasks enqueued during shutdown; abandoning them",
                self.config.thread_name_prefix,
                leftovers.len()
            );
        }
        for task in leftovers {
            task.abandon();
        }

        Ok(())
    }

    /// Stop the pool and join all workers
    pub fn shutdown(&self) -> Result<()> {
        self.stop();
        self.join()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            error!(
                "failed to shut down thread pool '{}' during drop: {}",
                self.config.thread_name_prefix, e
            );
        }
    }
}
