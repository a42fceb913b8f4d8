//! Worker thread management
//!
//! Workers are plain OS threads sharing one drain loop: pop a task, run
//! it, retire it against its owning job. The loop exits once the ring
//! reports shutdown.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{error, trace};

use jobring_core::{Job, PoolError, PoolResult};

use crate::pool::PoolShared;

pub(crate) struct WorkerSet {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerSet {
    /// Spawn `count` workers over the shared pool state.
    pub(crate) fn spawn(count: usize, shared: &Arc<PoolShared>) -> PoolResult<Self> {
        let mut handles = Vec::with_capacity(count);
        for worker_id in 0..count {
            let shared = Arc::clone(shared);
            let handle = thread::Builder::new()
                .name(format!("jobring-worker-{}", worker_id))
                .spawn(move || worker_main(shared, worker_id))
                .map_err(|_| PoolError::SpawnFailed)?;
            handles.push(handle);
        }
        Ok(Self { handles })
    }

    pub(crate) fn len(&self) -> usize {
        self.handles.len()
    }

    /// Wait for every worker to exit. Call after the ring's shutdown flag
    /// has been raised and broadcast.
    pub(crate) fn join(self) {
        for handle in self.handles {
            let _ = handle.join();
        }
    }
}

/// Main worker loop
fn worker_main(shared: Arc<PoolShared>, worker_id: usize) {
    trace!("worker-{} started", worker_id);
    while let Some(record) = shared.ring.pop() {
        let job = record.job;
        // The decrement fires on every exit path; a panicking task still
        // completes its accounting.
        let _completion = CompletionGuard { shared: &shared, job };
        if catch_unwind(AssertUnwindSafe(record.run)).is_err() {
            error!("worker-{}: task for job {} panicked", worker_id, job);
        }
    }
    trace!("worker-{} stopped", worker_id);
}

/// Retires one task against its job when dropped, making the last-completer
/// branch run even if the task body unwound.
struct CompletionGuard<'a> {
    shared: &'a PoolShared,
    job: Job,
}

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        if self.shared.slab.complete(&self.job) {
            trace!("job {} finalised", self.job);
        }
    }
}
