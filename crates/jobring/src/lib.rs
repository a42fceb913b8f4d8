//! # jobring - fixed-capacity worker-pool job system
//!
//! Dispatch short, independent tasks to a fixed set of worker threads,
//! group them into jobs, and learn about completion either by a callback
//! or by a blocking wait.
//!
//! ## Features
//!
//! - **Fixed capacity**: job slots and the task queue are preallocated;
//!   nothing grows at runtime
//! - **Backpressure**: producers block while the task ring is full
//! - **One completion signal per job**: a callback run by the
//!   last-completing worker, a blocking `wait`, or both
//! - **Panic containment**: a panicking task still retires against its
//!   job, so accounting never wedges
//!
//! ## Quick Start
//!
//! ```no_run
//! use jobring::{Pool, PoolConfig};
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use std::sync::Arc;
//!
//! let pool = Pool::new(PoolConfig::new().workers(4)).unwrap();
//! let sum = Arc::new(AtomicU64::new(0));
//!
//! let job = pool.begin().unwrap();
//! for i in 0..1000u64 {
//!     let sum = Arc::clone(&sum);
//!     pool.add(&job, move || {
//!         sum.fetch_add(i, Ordering::Relaxed);
//!     });
//! }
//! pool.commit(&job, None);
//! pool.wait(&job);
//!
//! assert_eq!(sum.load(Ordering::Relaxed), 499500);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    User Code                        │
//! │          begin(), add(), commit(), wait()           │
//! └─────────────────────────────────────────────────────┘
//!            │                          │
//!            ▼                          ▼
//! ┌────────────────────┐    ┌────────────────────────┐
//! │      Job slab      │    │       Task ring        │
//! │ freelist, commit   │    │ bounded FIFO,          │
//! │ state, callbacks   │    │ producer backpressure  │
//! └────────────────────┘    └────────────────────────┘
//!            ▲                          │
//!            │ retire / finalise        ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                  Worker threads                     │
//! │        pop task → run → decrement job counter       │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! The slab lock and the ring lock are distinct: workers retiring a
//! finished job never contend with producers queueing tasks for an
//! unrelated one. Per-job outstanding counters are atomics touched
//! without either lock.

// Re-export core types
pub use jobring_core::{constants, DoneFn, Job, JobState, PoolError, PoolResult, Task};

// Re-export runtime
pub use jobring_runtime::{global, Pool, PoolConfig};

/// Initialise the process-wide pool.
pub fn init(config: PoolConfig) -> PoolResult<()> {
    global::init(config)
}

/// Tear down the process-wide pool. Dispatch must have drained first.
pub fn shutdown() {
    global::shutdown()
}

/// Allocate a job on the process-wide pool.
pub fn begin() -> PoolResult<Job> {
    global::handle()?.begin()
}

/// Queue one task on the process-wide pool.
pub fn add(job: &Job, task: impl FnOnce() + Send + 'static) -> PoolResult<()> {
    global::handle().map(|pool| pool.add(job, task))
}

/// Commit a job on the process-wide pool.
pub fn commit(job: &Job, callback: Option<DoneFn>) -> PoolResult<()> {
    global::handle().map(|pool| pool.commit(job, callback))
}

/// Wait for a committed job on the process-wide pool.
pub fn wait(job: &Job) -> PoolResult<()> {
    global::handle().map(|pool| pool.wait(job))
}
