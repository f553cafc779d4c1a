//! # Task Pool
//!
//! A fixed-size worker thread pool that returns a waitable handle for every
//! submitted task.
//!
//! ## Features
//!
//! - **Result handles**: `submit` returns a [`TaskHandle`] resolving to the
//!   task's value or its propagated failure
//! - **FIFO dispatch**: a single shared queue feeds all workers in submission
//!   order
//! - **Failure isolation**: a task that errors or panics resolves its own
//!   handle and never kills the worker that ran it
//! - **Defined shutdown**: stopping rejects new work, lets executing tasks
//!   finish, and resolves unclaimed tasks' handles with a cancellation error
//! - **Worker statistics**: per-worker processed/failed/panicked counters
//!
//! ## Quick Start
//!
//! ```rust
//! use task_pool::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let pool = ThreadPool::with_threads(4)?;
//!
//! // Submit tasks and keep their handles
//! let handles: Vec<TaskHandle<usize>> = (0..10)
//!     .map(|i| pool.submit(move || Ok(i * i)))
//!     .collect::<Result<_>>()?;
//!
//! for (i, handle) in handles.into_iter().enumerate() {
//!     assert_eq!(handle.wait()?, i * i);
//! }
//!
//! // Shutdown: stop accepting work, then join the workers
//! pool.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Fire and Forget
//!
//! ```rust
//! use task_pool::prelude::*;
//!
//! # fn main() -> Result<()> {
//! # let pool = ThreadPool::with_threads(2)?;
//! pool.execute(|| {
//!     println!("running in the background");
//!     Ok(())
//! })?;
//! # pool.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure Propagation
//!
//! ```rust
//! use task_pool::prelude::*;
//!
//! # fn main() -> Result<()> {
//! # let pool = ThreadPool::with_threads(2)?;
//! let handle = pool.submit(|| -> Result<()> {
//!     Err(PoolError::other("disk on fire"))
//! })?;
//!
//! // The failure arrives on the same channel a success would
//! assert!(handle.wait().is_err());
//! # pool.shutdown()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;
pub mod pool;
pub mod prelude;
pub mod queue;

pub use crate::core::{BoxedTask, PackagedTask, PoolError, Result, RunOutcome, Task, TaskHandle};
pub use crate::pool::{ThreadPool, ThreadPoolConfig, WorkerStats};
