//! # jobring-core
//!
//! Core types for the jobring worker pool.
//!
//! This crate is platform-agnostic and contains no threads, locks, or
//! OS-specific code. The pool itself lives in `jobring-runtime`.
//!
//! ## Modules
//!
//! - `id` - Job handle type (slot index + generation)
//! - `state` - Job slot lifecycle states
//! - `task` - Task and completion-callback payload types
//! - `error` - Error types
//! - `env` - Environment variable utilities

pub mod env;
pub mod error;
pub mod id;
pub mod state;
pub mod task;

// Re-exports for convenience
pub use env::{env_get, env_get_bool};
pub use error::{PoolError, PoolResult};
pub use id::Job;
pub use state::JobState;
pub use task::{DoneFn, Task, TaskRecord};

/// Capacity constants
pub mod constants {
    /// Maximum worker threads a pool may spawn
    pub const MAX_WORKERS: usize = 64;

    /// Default number of job slots in the slab
    pub const DEFAULT_MAX_JOBS: usize = 256;

    /// Default task ring capacity (must be a power of two)
    pub const DEFAULT_QUEUE_CAPACITY: usize = 256;
}
