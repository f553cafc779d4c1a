//! Task trait and result-delivery plumbing
//!
//! A task pairs a type-erased, zero-argument closure with the sending half of
//! a one-shot result channel. The receiving half is wrapped in a
//! [`TaskHandle`] and returned to the submitter, which later waits on it for
//! the computed value or the propagated failure.

use crate::core::error::{PoolError, Result};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Generates a unique task ID
fn next_task_id() -> u64 {
    NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed)
}

/// How a task run ended, from the executing worker's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The closure returned `Ok` and the result was delivered
    Completed,
    /// The closure returned `Err`; the error was delivered
    Failed,
    /// The closure panicked; the captured panic was delivered as an error
    Panicked,
}

/// A trait representing a unit of work claimed and executed by exactly one worker
///
/// Implementations own the sending half of their result channel, so both
/// [`run`](Task::run) and [`abandon`](Task::abandon) resolve the submitter's
/// handle. A task is never left in a state where its handle hangs forever.
pub trait Task: Send {
    /// Execute the task, delivering the result or failure on its channel
    ///
    /// Consumes the task; a task is invoked at most once.
    fn run(self: Box<Self>) -> RunOutcome;

    /// Resolve the task's handle with a cancellation error without running it
    ///
    /// Used at shutdown for tasks that were queued but never claimed.
    fn abandon(self: Box<Self>);

    /// Get the task's unique ID
    fn task_id(&self) -> u64;

    /// Get the task's type name for debugging and logging
    fn task_type(&self) -> &str {
        "Task"
    }
}

impl fmt::Debug for dyn Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task({}, id={})", self.task_type(), self.task_id())
    }
}

/// A boxed task that can be sent across threads
pub type BoxedTask = Box<dyn Task>;

/// Extract a readable message from a caught panic payload
pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// A closure bound to its arguments at submission time, paired with the
/// sending half of its result channel
///
/// Created through [`PackagedTask::channel`], which also produces the
/// matching [`TaskHandle`].
pub struct PackagedTask<T, F>
where
    T: Send,
    F: FnOnce() -> Result<T> + Send,
{
    task_id: u64,
    closure: F,
    sender: Sender<Result<T>>,
    name: String,
}

impl<T, F> PackagedTask<T, F>
where
    T: Send,
    F: FnOnce() -> Result<T> + Send,
{
    /// Create a packaged task and the handle that observes its result
    pub fn channel(closure: F) -> (Self, TaskHandle<T>) {
        let task_id = next_task_id();
        // Capacity 1 makes the send non-blocking and the channel one-shot.
        let (sender, receiver) = bounded(1);
        let task = Self {
            task_id,
            closure,
            sender,
            name: "PackagedTask".to_string(),
        };
        let handle = TaskHandle { task_id, receiver };
        (task, handle)
    }

    /// Create a packaged task with a custom name for logging
    pub fn channel_with_name<S: Into<String>>(closure: F, name: S) -> (Self, TaskHandle<T>) {
        let (mut task, handle) = Self::channel(closure);
        task.name = name.into();
        (task, handle)
    }
}

impl<T, F> Task for PackagedTask<T, F>
where
    T: Send,
    F: FnOnce() -> Result<T> + Send,
{
    fn run(self: Box<Self>) -> RunOutcome {
        let PackagedTask {
            task_id,
            closure,
            sender,
            ..
        } = *self;

        match catch_unwind(AssertUnwindSafe(closure)) {
            Ok(Ok(value)) => {
                // The send fails only if the submitter dropped its handle;
                // the result is simply discarded then.
                let _ = sender.send(Ok(value));
                RunOutcome::Completed
            }
            Ok(Err(e)) => {
                let _ = sender.send(Err(e));
                RunOutcome::Failed
            }
            Err(payload) => {
                let message = panic_message(payload);
                let _ = sender.send(Err(PoolError::task_panicked(task_id, message)));
                RunOutcome::Panicked
            }
        }
    }

    fn abandon(self: Box<Self>) {
        let _ = self.sender.send(Err(PoolError::cancelled(
            self.task_id,
            "pool stopped before the task was claimed",
        )));
    }

    fn task_id(&self) -> u64 {
        self.task_id
    }

    fn task_type(&self) -> &str {
        &self.name
    }
}

/// The caller-held handle to a submitted task's eventual result
///
/// Exactly one value arrives on the underlying channel: the task's computed
/// result, the failure it returned, the panic it raised, or a cancellation
/// error if the pool was stopped before any worker claimed the task.
///
/// # Example
///
/// ```rust
/// use task_pool::prelude::*;
///
/// # fn main() -> Result<()> {
/// let pool = ThreadPool::with_threads(2)?;
/// let handle = pool.submit(|| Ok(21 * 2))?;
/// assert_eq!(handle.wait()?, 42);
/// # pool.shutdown()?;
/// # Ok(())
/// # }
/// ```
pub struct TaskHandle<T> {
    task_id: u64,
    receiver: Receiver<Result<T>>,
}

impl<T> TaskHandle<T> {
    /// Get the unique ID of the task this handle observes
    pub fn task_id(&self) -> u64 {
        self.task_id
    }

    /// Check whether the result has already been delivered
    ///
    /// A `true` return means a subsequent [`wait`](Self::wait) will not block.
    pub fn is_ready(&self) -> bool {
        !self.receiver.is_empty()
    }

    /// Block until the task's result arrives
    ///
    /// Consumes the handle; the single delivered value is read exactly once.
    ///
    /// # Errors
    ///
    /// Returns the error the task produced, [`PoolError::TaskPanicked`] if it
    /// panicked, or [`PoolError::Cancelled`] if the task was abandoned at
    /// shutdown or dropped without delivering a result.
    pub fn wait(self) -> Result<T> {
        match self.receiver.recv() {
            Ok(result) => result,
            Err(_) => Err(PoolError::cancelled(
                self.task_id,
                "task dropped without delivering a result",
            )),
        }
    }

    /// Wait for the task's result, giving up after `timeout`
    ///
    /// Timing out leaves the handle usable; the caller may wait again.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::WaitTimeout`] if no result arrived in time,
    /// otherwise behaves like [`wait`](Self::wait).
    pub fn wait_timeout(&self, timeout: Duration) -> Result<T> {
        match self.receiver.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                Err(PoolError::wait_timeout(timeout.as_millis() as u64))
            }
            Err(RecvTimeoutError::Disconnected) => Err(PoolError::cancelled(
                self.task_id,
                "task dropped without delivering a result",
            )),
        }
    }
}

impl<T> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("task_id", &self.task_id)
            .field("ready", &self.is_ready())
            .finish()
    }
}
