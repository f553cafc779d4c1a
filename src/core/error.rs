//! Error types for the task pool

/// Result type for task pool operations
pub type Result<T> = std::result::Result<T, PoolError>;

/// Errors that can occur in the task pool
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PoolError {
    /// Invalid configuration with parameter
    #[error("Invalid configuration for '{parameter}': {message}")]
    InvalidConfig {
        /// Configuration parameter name
        parameter: String,
        /// Error message
        message: String,
    },

    /// Pool has been stopped and no longer accepts tasks
    #[error("Thread pool '{pool_name}' is closed")]
    PoolClosed {
        /// Name of the thread pool
        pool_name: String,
    },

    /// Failed to spawn a worker thread with details
    #[error("Failed to spawn worker thread #{worker_id}: {message}")]
    SpawnError {
        /// ID of the worker that failed to spawn
        worker_id: usize,
        /// Error message
        message: String,
        /// Source IO error
        #[source]
        source: Option<std::io::Error>,
    },

    /// Failed to join a worker thread
    #[error("Failed to join worker thread #{worker_id}: {message}")]
    JoinError {
        /// ID of the worker that failed to join
        worker_id: usize,
        /// Error message
        message: String,
    },

    /// Task panicked during execution
    #[error("Task panicked (task_id: {task_id}): {message}")]
    TaskPanicked {
        /// ID of the panicked task
        task_id: u64,
        /// Panic message
        message: String,
    },

    /// Task was abandoned before a worker claimed it
    #[error("Task cancelled (task_id: {task_id}): {reason}")]
    Cancelled {
        /// ID of the cancelled task
        task_id: u64,
        /// Reason for cancellation
        reason: String,
    },

    /// Waiting on a task handle timed out
    #[error("Timed out after {timeout_ms}ms waiting for task result")]
    WaitTimeout {
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// General error
    #[error("{0}")]
    Other(String),
}

impl PoolError {
    /// Create an invalid config error
    pub fn invalid_config(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        PoolError::InvalidConfig {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a pool closed error
    pub fn pool_closed(pool_name: impl Into<String>) -> Self {
        PoolError::PoolClosed {
            pool_name: pool_name.into(),
        }
    }

    /// Create a spawn error
    pub fn spawn(worker_id: usize, message: impl Into<String>) -> Self {
        PoolError::SpawnError {
            worker_id,
            message: message.into(),
            source: None,
        }
    }

    /// Create a spawn error with source
    pub fn spawn_with_source(
        worker_id: usize,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        PoolError::SpawnError {
            worker_id,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a join error
    pub fn join(worker_id: usize, message: impl Into<String>) -> Self {
        PoolError::JoinError {
            worker_id,
            message: message.into(),
        }
    }

    /// Create a task panicked error
    pub fn task_panicked(task_id: u64, message: impl Into<String>) -> Self {
        PoolError::TaskPanicked {
            task_id,
            message: message.into(),
        }
    }

    /// Create a cancelled error
    pub fn cancelled(task_id: u64, reason: impl Into<String>) -> Self {
        PoolError::Cancelled {
            task_id,
            reason: reason.into(),
        }
    }

    /// Create a wait timeout error
    pub fn wait_timeout(timeout_ms: u64) -> Self {
        PoolError::WaitTimeout { timeout_ms }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        PoolError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = PoolError::invalid_config("num_threads", "must be greater than 0");
        assert!(matches!(err, PoolError::InvalidConfig { .. }));

        let err = PoolError::pool_closed("worker");
        assert!(matches!(err, PoolError::PoolClosed { .. }));

        let err = PoolError::cancelled(7, "pool stopped");
        assert!(matches!(err, PoolError::Cancelled { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = PoolError::pool_closed("worker");
        assert_eq!(err.to_string(), "Thread pool 'worker' is closed");

        let err = PoolError::task_panicked(12, "boom");
        assert_eq!(err.to_string(), "Task panicked (task_id: 12): boom");

        let err = PoolError::wait_timeout(250);
        assert_eq!(
            err.to_string(),
            "Timed out after 250ms waiting for task result"
        );
    }

    #[test]
    fn test_spawn_error_with_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = PoolError::spawn_with_source(3, "Cannot create thread", io_err);

        assert!(matches!(err, PoolError::SpawnError { .. }));
        assert!(err.to_string().contains("worker thread #3"));
    }
}
