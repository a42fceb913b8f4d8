//! Compile-time defaults for `PoolConfig`

use jobring_core::constants;

/// Job slots in the slab
pub const MAX_JOBS: usize = constants::DEFAULT_MAX_JOBS;

/// Task ring capacity; must stay a power of two
pub const QUEUE_CAPACITY: usize = constants::DEFAULT_QUEUE_CAPACITY;

/// Default worker count: one per core, clamped to the compile-time cap
pub fn num_workers() -> usize {
    num_cpus::get().clamp(1, constants::MAX_WORKERS)
}
