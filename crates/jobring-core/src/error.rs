//! Error types for the jobring worker pool

use core::fmt;

/// Result type for pool operations
pub type PoolResult<T> = Result<T, PoolError>;

/// Errors surfaced by the pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Requested worker count exceeds the compile-time cap
    TooManyWorkers { requested: usize, max: usize },

    /// Failed to spawn a worker thread
    SpawnFailed,

    /// All job slots are in use; back off or drain in-flight work
    NoJobsFree,

    /// Global pool already initialised
    AlreadyInitialized,

    /// Global pool not initialised
    NotInitialized,

    /// Configuration failed validation
    InvalidConfig(&'static str),
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::TooManyWorkers { requested, max } => {
                write!(f, "{} workers requested, cap is {}", requested, max)
            }
            PoolError::SpawnFailed => write!(f, "failed to spawn worker thread"),
            PoolError::NoJobsFree => write!(f, "no job slots free"),
            PoolError::AlreadyInitialized => write!(f, "pool already initialised"),
            PoolError::NotInitialized => write!(f, "pool not initialised"),
            PoolError::InvalidConfig(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for PoolError {}
