//! Process-wide convenience instance
//!
//! The pool is an explicit value and most callers should own one. For the
//! common one-pool-per-process case this module keeps a global instance
//! behind `init`/`handle`/`shutdown`, so the job API does not have to
//! thread a `&Pool` through every call site.

use std::sync::Arc;

use parking_lot::Mutex;

use jobring_core::{PoolError, PoolResult};

use crate::config::PoolConfig;
use crate::pool::Pool;

static GLOBAL: Mutex<Option<Arc<Pool>>> = Mutex::new(None);

/// Initialise the global pool.
pub fn init(config: PoolConfig) -> PoolResult<()> {
    let mut slot = GLOBAL.lock();
    if slot.is_some() {
        return Err(PoolError::AlreadyInitialized);
    }
    *slot = Some(Arc::new(Pool::new(config)?));
    Ok(())
}

/// Handle to the global pool.
pub fn handle() -> PoolResult<Arc<Pool>> {
    GLOBAL.lock().clone().ok_or(PoolError::NotInitialized)
}

/// Tear down the global pool.
///
/// The workers are joined when the last handle drops; if callers still
/// hold clones from `handle()`, teardown completes when they let go. All
/// dispatch must have drained first, as with `Pool::shutdown`.
pub fn shutdown() {
    let taken = GLOBAL.lock().take();
    drop(taken);
}
