//! Worker thread implementation

use crate::core::{BoxedTask, PoolError, Result, RunOutcome};
use crate::queue::{QueueError, TaskQueue};
use log::{debug, error, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Statistics for a worker thread
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Total number of tasks that completed successfully
    pub tasks_processed: AtomicU64,
    /// Total number of tasks that returned an error
    pub tasks_failed: AtomicU64,
    /// Total number of tasks that panicked
    pub tasks_panicked: AtomicU64,
    /// Total time spent executing tasks (microseconds)
    pub total_processing_time_us: AtomicU64,
}

impl WorkerStats {
    /// Create new worker statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one executed task
    pub fn record(&self, outcome: RunOutcome, elapsed_us: u64) {
        match outcome {
            RunOutcome::Completed => self.tasks_processed.fetch_add(1, Ordering::Relaxed),
            RunOutcome::Failed => self.tasks_failed.fetch_add(1, Ordering::Relaxed),
            RunOutcome::Panicked => self.tasks_panicked.fetch_add(1, Ordering::Relaxed),
        };
        self.total_processing_time_us
            .fetch_add(elapsed_us, Ordering::Relaxed);
    }

    /// Get total tasks that completed successfully
    pub fn get_tasks_processed(&self) -> u64 {
        self.tasks_processed.load(Ordering::Relaxed)
    }

    /// Get total tasks that returned an error
    pub fn get_tasks_failed(&self) -> u64 {
        self.tasks_failed.load(Ordering::Relaxed)
    }

    /// Get total tasks that panicked
    pub fn get_tasks_panicked(&self) -> u64 {
        self.tasks_panicked.load(Ordering::Relaxed)
    }

    /// Get average execution time per task in microseconds
    pub fn get_average_processing_time_us(&self) -> f64 {
        let total = self.total_processing_time_us.load(Ordering::Relaxed);
        let count = self.get_tasks_processed()
            + self.get_tasks_failed()
            + self.get_tasks_panicked();
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }
}

/// A worker thread that claims and executes tasks from the shared queue
///
/// The worker loop has two states: idle (blocked in the queue's timed pop)
/// and executing. It leaves the loop only when the queue reports
/// disconnection, which happens once the pool is stopping. A task failure or
/// panic never terminates the worker.
#[derive(Debug)]
pub struct Worker {
    id: usize,
    thread: Option<thread::JoinHandle<()>>,
    stats: Arc<WorkerStats>,
}

impl Worker {
    /// Create and start a new worker
    ///
    /// # Arguments
    ///
    /// * `id` - Unique identifier for this worker
    /// * `name_prefix` - Thread name prefix from the pool configuration
    /// * `queue` - Shared task queue
    /// * `poll_interval` - Upper bound on how long the worker waits in one
    ///   pop before re-checking the stop signal
    pub fn new(
        id: usize,
        name_prefix: &str,
        queue: Arc<TaskQueue>,
        poll_interval: Duration,
    ) -> Result<Self> {
        let stats = Arc::new(WorkerStats::new());
        let stats_clone = Arc::clone(&stats);

        let thread = thread::Builder::new()
            .name(format!("{}-{}", name_prefix, id))
            .spawn(move || {
                Self::run(id, queue, stats_clone, poll_interval);
            })
            .map_err(|e| PoolError::spawn_with_source(id, "spawn failed", e))?;

        Ok(Self {
            id,
            thread: Some(thread),
            stats,
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Get worker statistics
    pub fn stats(&self) -> Arc<WorkerStats> {
        Arc::clone(&self.stats)
    }

    /// Join the worker thread
    pub fn join(mut self) -> Result<()> {
        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .map_err(|_| PoolError::join(self.id, "Worker panicked"))?;
        }
        Ok(())
    }

    /// Main worker loop
    ///
    /// Idle until the queue yields a task or disconnects. Disconnection is
    /// final: the worker never re-enters the loop after it.
    fn run(id: usize, queue: Arc<TaskQueue>, stats: Arc<WorkerStats>, poll_interval: Duration) {
        debug!("worker {} started", id);

        loop {
            match queue.recv_timeout(poll_interval) {
                Ok(task) => {
                    Self::execute_task(id, task, &stats);
                }
                Err(QueueError::Empty) => {
                    // No task available within timeout, keep polling
                    continue;
                }
                Err(_) => {
                    debug!(
                        "worker {} terminating (processed: {}, failed: {}, panicked: {})",
                        id,
                        stats.get_tasks_processed(),
                        stats.get_tasks_failed(),
                        stats.get_tasks_panicked()
                    );
                    break;
                }
            }
        }
    }

    /// Execute one claimed task and record its outcome
    fn execute_task(id: usize, task: BoxedTask, stats: &WorkerStats) {
        let task_id = task.task_id();
        let start = std::time::Instant::now();

        // run() catches panics internally and always resolves the handle.
        let outcome = task.run();

        let elapsed = start.elapsed();
        match outcome {
            RunOutcome::Completed => {
                debug!(
                    "worker {}: task {} completed in {}us",
                    id,
                    task_id,
                    elapsed.as_micros()
                );
            }
            RunOutcome::Failed => {
                warn!("worker {}: task {} failed", id, task_id);
            }
            RunOutcome::Panicked => {
                error!("worker {}: task {} panicked", id, task_id);
            }
        }
        stats.record(outcome, elapsed.as_micros() as u64);
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            // Bounded wait so Drop cannot hang on a stuck task
            const JOIN_TIMEOUT: Duration = Duration::from_secs(5);

            let start = std::time::Instant::now();
            loop {
                if thread.is_finished() {
                    if let Err(payload) = thread.join() {
                        error!(
                            "worker {} panicked during shutdown: {}",
                            self.id,
                            crate::core::task::panic_message(payload)
                        );
                    }
                    break;
                }

                if start.elapsed() >= JOIN_TIMEOUT {
                    warn!(
                        "worker {} did not finish within {}s during drop; thread may be leaked",
                        self.id,
                        JOIN_TIMEOUT.as_secs()
                    );
                    break;
                }

                thread::sleep(Duration::from_millis(10));
            }
        }
    }
}
