//! # jobring-runtime
//!
//! The worker pool itself: job slab, task ring, worker threads, and the
//! `Pool` lifecycle API. Platform-agnostic types live in `jobring-core`.
//!
//! ## Modules
//!
//! - `config` - `PoolConfig` builder with env overrides
//! - `ring` - bounded FIFO of queued tasks with producer backpressure
//! - `slab` - fixed pool of job control blocks with a freelist
//! - `pool` - the `Pool` value: begin/add/commit/wait plus init/destroy
//! - `global` - process-wide convenience instance

pub mod config;
pub mod global;
pub mod pool;
pub mod ring;
pub mod slab;

mod worker;

pub use config::PoolConfig;
pub use pool::Pool;
