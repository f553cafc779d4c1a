//! FIFO task queue shared between submitters and workers.
//!
//! The queue is an unbounded crossbeam channel paired with a one-way `closed`
//! flag. Submitters push without blocking; workers pop with a timeout so they
//! can periodically observe the flag. Once the queue is closed and empty,
//! worker-side receives report [`QueueError::Disconnected`], which is the
//! stop signal.

use crate::core::BoxedTask;
use crossbeam_channel::{self as channel, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Errors that can occur during queue operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// Queue is closed and not accepting new tasks
    Closed,
    /// Queue is empty (no task within the timeout)
    Empty,
    /// Queue is closed and drained; workers should terminate
    Disconnected,
}

impl std::fmt::Display for QueueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueError::Closed => write!(f, "queue is closed"),
            QueueError::Empty => write!(f, "queue is empty"),
            QueueError::Disconnected => write!(f, "queue is disconnected"),
        }
    }
}

impl std::error::Error for QueueError {}

/// Result type for queue operations.
pub type QueueResult<T> = std::result::Result<T, QueueError>;

/// An unbounded FIFO queue of pending tasks.
///
/// Ordering guarantee: tasks are received in the order they were sent. A
/// single queue feeds all workers, so dispatch is FIFO and starvation-free.
///
/// # Example
///
/// ```rust
/// use task_pool::queue::TaskQueue;
/// use task_pool::core::PackagedTask;
///
/// let queue = TaskQueue::unbounded();
/// let (task, _handle) = PackagedTask::channel(|| Ok(()));
/// queue.send(Box::new(task)).unwrap();
/// assert_eq!(queue.len(), 1);
/// ```
pub struct TaskQueue {
    sender: Sender<BoxedTask>,
    receiver: Receiver<BoxedTask>,
    closed: AtomicBool,
}

impl TaskQueue {
    /// Creates a new unbounded task queue.
    pub fn unbounded() -> Self {
        let (sender, receiver) = channel::unbounded();
        Self {
            sender,
            receiver,
            closed: AtomicBool::new(false),
        }
    }

    /// Appends a task to the tail of the queue.
    ///
    /// Never blocks; the queue is unbounded.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Closed`] if the queue has been closed.
    pub fn send(&self, task: BoxedTask) -> QueueResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(QueueError::Closed);
        }
        self.sender.send(task).map_err(|_| QueueError::Closed)
    }

    /// Attempts to remove the head task without blocking.
    ///
    /// # Returns
    ///
    /// - `Ok(task)` if a task was available
    /// - `Err(QueueError::Empty)` if the queue is open but empty
    /// - `Err(QueueError::Disconnected)` if the queue is closed and empty
    pub fn try_recv(&self) -> QueueResult<BoxedTask> {
        match self.receiver.try_recv() {
            Ok(task) => Ok(task),
            Err(TryRecvError::Empty) => {
                if self.closed.load(Ordering::SeqCst) {
                    Err(QueueError::Disconnected)
                } else {
                    Err(QueueError::Empty)
                }
            }
            Err(TryRecvError::Disconnected) => Err(QueueError::Disconnected),
        }
    }

    /// Removes the head task, waiting up to `timeout` for one to arrive.
    ///
    /// This is the worker-side blocking pop. The timeout bounds how long a
    /// worker can miss the close signal.
    ///
    /// # Returns
    ///
    /// - `Ok(task)` if a task was received within the timeout
    /// - `Err(QueueError::Empty)` if no task arrived within the timeout
    /// - `Err(QueueError::Disconnected)` if the queue is closed and empty
    pub fn recv_timeout(&self, timeout: Duration) -> QueueResult<BoxedTask> {
        // Check if closed first
        if self.closed.load(Ordering::SeqCst) && self.receiver.is_empty() {
            return Err(QueueError::Disconnected);
        }

        match self.receiver.recv_timeout(timeout) {
            Ok(task) => Ok(task),
            Err(RecvTimeoutError::Timeout) => {
                // On timeout, check if closed
                if self.closed.load(Ordering::SeqCst) && self.receiver.is_empty() {
                    Err(QueueError::Disconnected)
                } else {
                    Err(QueueError::Empty)
                }
            }
            Err(RecvTimeoutError::Disconnected) => Err(QueueError::Disconnected),
        }
    }

    /// Closes the queue; the transition is one-way.
    ///
    /// Subsequent sends fail with [`QueueError::Closed`]. Tasks already in
    /// the queue can still be received or drained.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Returns `true` if the queue has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Returns the current number of queued tasks.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns `true` if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Pushes a task past the closed flag, straight into the channel.
    ///
    /// Models a submitter whose push completes after `close()` has run;
    /// only reachable from tests.
    #[cfg(test)]
    pub(crate) fn send_unchecked(&self, task: BoxedTask) {
        let _ = self.sender.send(task);
    }

    /// Removes and returns every task still in the queue.
    ///
    /// Called after [`close`](Self::close) during shutdown so that unclaimed
    /// tasks can be abandoned explicitly instead of dropped silently. Workers
    /// racing this drain may still claim individual tasks; either way each
    /// task's handle resolves.
    pub fn drain(&self) -> Vec<BoxedTask> {
        let mut drained = Vec::new();
        while let Ok(task) = self.receiver.try_recv() {
            drained.push(task);
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PackagedTask, Task};

    fn test_task() -> BoxedTask {
        let (task, _handle) = PackagedTask::channel(|| Ok(()));
        Box::new(task)
    }

    #[test]
    fn test_send_recv_fifo() {
        let queue = TaskQueue::unbounded();
        let (first, _h1) = PackagedTask::channel(|| Ok(()));
        let first_id = first.task_id();
        queue.send(Box::new(first)).unwrap();
        queue.send(test_task()).unwrap();

        let head = queue.try_recv().unwrap();
        assert_eq!(head.task_id(), first_id);
    }

    #[test]
    fn test_try_recv_empty() {
        let queue = TaskQueue::unbounded();
        assert_eq!(queue.try_recv().err(), Some(QueueError::Empty));
    }

    #[test]
    fn test_recv_timeout_empty() {
        let queue = TaskQueue::unbounded();
        let result = queue.recv_timeout(Duration::from_millis(10));
        assert_eq!(result.err(), Some(QueueError::Empty));
    }

    #[test]
    fn test_send_after_close() {
        let queue = TaskQueue::unbounded();
        assert!(!queue.is_closed());
        queue.close();
        assert!(queue.is_closed());
        assert_eq!(queue.send(test_task()).err(), Some(QueueError::Closed));
    }

    #[test]
    fn test_closed_and_empty_disconnects() {
        let queue = TaskQueue::unbounded();
        queue.close();
        let result = queue.recv_timeout(Duration::from_millis(10));
        assert_eq!(result.err(), Some(QueueError::Disconnected));
        assert_eq!(queue.try_recv().err(), Some(QueueError::Disconnected));
    }

    #[test]
    fn test_closed_queue_still_delivers_queued_tasks() {
        let queue = TaskQueue::unbounded();
        queue.send(test_task()).unwrap();
        queue.close();

        assert!(queue.recv_timeout(Duration::from_millis(10)).is_ok());
        let result = queue.recv_timeout(Duration::from_millis(10));
        assert_eq!(result.err(), Some(QueueError::Disconnected));
    }

    #[test]
    fn test_drain() {
        let queue = TaskQueue::unbounded();
        for _ in 0..3 {
            queue.send(test_task()).unwrap();
        }
        queue.close();

        let drained = queue.drain();
        assert_eq!(drained.len(), 3);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_len_and_is_empty() {
        let queue = TaskQueue::unbounded();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);

        queue.send(test_task()).unwrap();
        assert!(!queue.is_empty());
        assert_eq!(queue.len(), 1);

        queue.try_recv().unwrap();
        assert!(queue.is_empty());
    }
}
