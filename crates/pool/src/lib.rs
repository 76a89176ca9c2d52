//! Fixed-size work-stealing thread pool.
//!
//! Every worker owns a private FIFO queue, a binary wake signal and a piece of
//! worker-local state `S`. Tasks run as `FnOnce(&mut S)` on whichever worker
//! dequeues them, so per-worker accumulators (output shards, vocabularies)
//! never need a lock. [`WorkerPool::shutdown`] drains every queue, stops the
//! workers and hands their states back to the caller.

pub mod error;
pub mod handle;
pub mod pool;
mod signal;

pub use error::{PoolError, Result};
pub use handle::TaskHandle;
pub use pool::WorkerPool;
