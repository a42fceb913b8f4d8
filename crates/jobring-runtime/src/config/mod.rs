//! Pool configuration
//!
//! Compile-time defaults with runtime environment overrides.
//!
//! # Configuration priority (highest wins)
//!
//! 1. Builder methods
//! 2. Environment variables (`from_env`)
//! 3. Library defaults
//!
//! # Example
//!
//! ```rust,ignore
//! use jobring_runtime::config::PoolConfig;
//!
//! // Defaults with env overrides
//! let config = PoolConfig::from_env();
//!
//! // Or customise programmatically
//! let config = PoolConfig::new().workers(4).queue_capacity(512);
//! ```

pub mod defaults;

use jobring_core::constants::MAX_WORKERS;
use jobring_core::env_get;
use jobring_core::{PoolError, PoolResult};

/// Pool configuration with builder pattern.
///
/// The worker cap stays compile-time (`constants::MAX_WORKERS`); everything
/// here is a construction-time knob of the pool value.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of worker threads
    pub workers: usize,
    /// Job slots in the slab
    pub max_jobs: usize,
    /// Task ring capacity; must be a power of two. One slot stays unused
    /// so a full ring is distinguishable from an empty one.
    pub queue_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl PoolConfig {
    /// Create config from compile-time defaults with environment overrides.
    ///
    /// Environment variables (all optional):
    /// - `JOBRING_WORKERS` - worker thread count
    /// - `JOBRING_MAX_JOBS` - job slots in the slab
    /// - `JOBRING_QUEUE_CAPACITY` - task ring capacity (power of two)
    pub fn from_env() -> Self {
        Self {
            workers: env_get("JOBRING_WORKERS", defaults::num_workers()),
            max_jobs: env_get("JOBRING_MAX_JOBS", defaults::MAX_JOBS),
            queue_capacity: env_get("JOBRING_QUEUE_CAPACITY", defaults::QUEUE_CAPACITY),
        }
    }

    /// Create config with library defaults, ignoring the environment.
    pub fn new() -> Self {
        Self {
            workers: defaults::num_workers(),
            max_jobs: defaults::MAX_JOBS,
            queue_capacity: defaults::QUEUE_CAPACITY,
        }
    }

    // Builder methods

    pub fn workers(mut self, n: usize) -> Self {
        self.workers = n;
        self
    }

    pub fn max_jobs(mut self, n: usize) -> Self {
        self.max_jobs = n;
        self
    }

    pub fn queue_capacity(mut self, n: usize) -> Self {
        self.queue_capacity = n;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> PoolResult<()> {
        if self.workers == 0 {
            return Err(PoolError::InvalidConfig("workers must be > 0"));
        }
        if self.workers > MAX_WORKERS {
            return Err(PoolError::TooManyWorkers {
                requested: self.workers,
                max: MAX_WORKERS,
            });
        }
        if self.max_jobs == 0 {
            return Err(PoolError::InvalidConfig("max_jobs must be > 0"));
        }
        if self.max_jobs >= u32::MAX as usize {
            return Err(PoolError::InvalidConfig("max_jobs must fit in a u32"));
        }
        if self.queue_capacity < 2 || !self.queue_capacity.is_power_of_two() {
            return Err(PoolError::InvalidConfig(
                "queue_capacity must be a power of two >= 2",
            ));
        }
        Ok(())
    }
}
