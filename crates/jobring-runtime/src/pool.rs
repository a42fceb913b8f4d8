//! The `Pool` value: job lifecycle API over slab, ring, and workers
//!
//! A `Pool` owns the whole subsystem. Construction spawns the workers;
//! `shutdown` (or drop) raises the shutdown flag, broadcasts, and joins
//! them. A process-wide convenience instance lives in `crate::global`.

use std::sync::Arc;

use log::debug;

use jobring_core::{DoneFn, Job, PoolResult, Task, TaskRecord};

use crate::config::PoolConfig;
use crate::ring::TaskRing;
use crate::slab::JobSlab;
use crate::worker::WorkerSet;

/// State shared between the pool handle and its workers.
pub(crate) struct PoolShared {
    pub(crate) ring: TaskRing,
    pub(crate) slab: JobSlab,
}

/// Fixed-capacity worker-pool job system.
///
/// Callers group tasks into jobs: `begin` a job, `add` its tasks, `commit`
/// it with an optional completion callback, then `wait` for it or rely on
/// the callback. Any task may run on any worker; insertion order is
/// preserved only in the queue itself.
pub struct Pool {
    shared: Arc<PoolShared>,
    workers: Option<WorkerSet>,
}

impl Pool {
    /// Validate the config, build the slab and ring, spawn the workers.
    pub fn new(config: PoolConfig) -> PoolResult<Self> {
        config.validate()?;
        let shared = Arc::new(PoolShared {
            ring: TaskRing::new(config.queue_capacity),
            slab: JobSlab::new(config.max_jobs),
        });
        let workers = WorkerSet::spawn(config.workers, &shared)?;
        debug!(
            "pool started: {} workers, {} job slots, ring capacity {}",
            workers.len(),
            shared.slab.capacity(),
            shared.ring.capacity(),
        );
        Ok(Self {
            shared,
            workers: Some(workers),
        })
    }

    /// Allocate a fresh job, open for tasks.
    ///
    /// Fails with `NoJobsFree` when every slot is in use; back off or wait
    /// on in-flight jobs before retrying.
    pub fn begin(&self) -> PoolResult<Job> {
        self.shared.slab.begin()
    }

    /// Queue one task for `job`, blocking while the ring is full.
    ///
    /// Tasks for one job must come from a single producer thread at a
    /// time, and only before `commit`.
    pub fn add(&self, job: &Job, task: impl FnOnce() + Send + 'static) {
        self.add_boxed(job, Box::new(task));
    }

    /// Queue a batch of already-boxed tasks, preserving order.
    pub fn add_batch(&self, job: &Job, tasks: impl IntoIterator<Item = Task>) {
        for task in tasks {
            self.add_boxed(job, task);
        }
    }

    fn add_boxed(&self, job: &Job, task: Task) {
        #[cfg(debug_assertions)]
        self.shared.slab.assert_open(job);
        let outstanding = self.shared.slab.outstanding(job);
        self.shared.ring.push(TaskRecord::new(task, *job), outstanding);
    }

    /// Close `job` to further tasks and install its completion callback.
    ///
    /// The callback (if any) runs exactly once, on whichever thread retires
    /// the job's last task - or on this thread, right here, when nothing is
    /// outstanding anymore.
    pub fn commit(&self, job: &Job, callback: Option<DoneFn>) {
        self.shared.slab.commit(job, callback);
    }

    /// Block until every task of a committed job has finished.
    ///
    /// Returns immediately if `job` was never committed: an uncommitted
    /// job may still grow, so there is nothing well-defined to wait for.
    /// Callers relying on completion callbacks instead of `wait` must
    /// still commit, or the job never completes.
    pub fn wait(&self, job: &Job) {
        self.shared.slab.wait(job);
    }

    /// Worker threads currently attached.
    pub fn worker_count(&self) -> usize {
        self.workers.as_ref().map_or(0, WorkerSet::len)
    }

    /// Job slots on the freelist.
    pub fn free_jobs(&self) -> usize {
        self.shared.slab.free_count()
    }

    /// Total job slots.
    pub fn job_capacity(&self) -> usize {
        self.shared.slab.capacity()
    }

    /// Queued, un-popped tasks.
    pub fn queued_tasks(&self) -> usize {
        self.shared.ring.len()
    }

    /// Stop the workers and wait for them to exit.
    ///
    /// Not safe to call while jobs are in flight: queued tasks no worker
    /// has popped yet are dropped unexecuted, and their jobs never
    /// complete. Drain with `wait` first.
    pub fn shutdown(&mut self) {
        if let Some(workers) = self.workers.take() {
            debug!("pool shutting down");
            self.shared.ring.shutdown();
            workers.join();
        }
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
