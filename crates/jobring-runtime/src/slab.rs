//! Job slab: fixed pool of job control blocks
//!
//! Slots live in a preallocated table with a LIFO freelist of indices. The
//! slab lock guards the freelist and each slot's state and callback; it is
//! deliberately distinct from the ring lock, so a worker retiring a
//! finished job never contends with a producer queueing tasks for an
//! unrelated one. The outstanding-task counters are atomics read and
//! written outside the lock.
//!
//! Every slot carries a generation, bumped each time it returns to the
//! freelist. Handles and queued task records capture the generation at
//! allocation time, so a late observer of a recycled slot backs off
//! instead of touching the new occupant.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU32, Ordering};

use log::error;
use parking_lot::{Condvar, Mutex};

use jobring_core::{DoneFn, Job, JobState, PoolError, PoolResult};

pub struct JobSlab {
    state: Mutex<SlabState>,
    jobs_done: Condvar,
    /// Outstanding (queued + running) tasks per slot
    counters: Box<[AtomicU32]>,
}

struct SlabState {
    slots: Box<[JobSlot]>,
    /// LIFO stack of free slot indices
    free: Vec<u32>,
}

struct JobSlot {
    generation: u32,
    state: JobState,
    callback: Option<DoneFn>,
}

impl JobSlab {
    pub fn new(max_jobs: usize) -> Self {
        let slots: Box<[JobSlot]> = (0..max_jobs)
            .map(|_| JobSlot {
                generation: 0,
                state: JobState::Vacant,
                callback: None,
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();
        let counters: Box<[AtomicU32]> =
            (0..max_jobs).map(|_| AtomicU32::new(0)).collect::<Vec<_>>().into_boxed_slice();
        // Seeded in reverse so the first begin() hands out slot 0.
        let free: Vec<u32> = (0..max_jobs as u32).rev().collect();
        Self {
            state: Mutex::new(SlabState { slots, free }),
            jobs_done: Condvar::new(),
            counters,
        }
    }

    /// Allocate a job slot, or report exhaustion.
    ///
    /// Never blocks on the workers; a caller seeing `NoJobsFree` backs off
    /// or drains in-flight jobs first.
    pub fn begin(&self) -> PoolResult<Job> {
        let mut state = self.state.lock();
        let index = state.free.pop().ok_or(PoolError::NoJobsFree)?;
        let slot = &mut state.slots[index as usize];
        debug_assert!(slot.state.is_vacant());
        debug_assert!(slot.callback.is_none());
        slot.state = JobState::Open;
        self.counters[index as usize].store(0, Ordering::Relaxed);
        Ok(Job::new(index, slot.generation))
    }

    /// Outstanding-task counter for a job's slot. The ring raises it under
    /// the ring lock before publishing each task record.
    #[inline]
    pub fn outstanding(&self, job: &Job) -> &AtomicU32 {
        &self.counters[job.slot()]
    }

    /// Close the job to further tasks and install its completion callback.
    ///
    /// If nothing is outstanding - a zero-task job, or every task already
    /// finished - the committing thread finalises the job on the spot, so
    /// the callback still fires exactly once and the slot is recycled.
    pub fn commit(&self, job: &Job, callback: Option<DoneFn>) {
        let mut state = self.state.lock();
        {
            let slot = &mut state.slots[job.slot()];
            debug_assert_eq!(slot.generation, job.generation(), "commit on a stale job handle");
            debug_assert!(slot.state.is_open(), "job committed twice");
            slot.callback = callback;
            slot.state = JobState::Committed;
        }
        if self.counters[job.slot()].load(Ordering::Acquire) == 0 {
            self.finalize_locked(&mut state, job.slot());
        }
    }

    /// Retire one finished task. Returns true when this call finalised the
    /// job.
    ///
    /// The release/acquire decrement hands slot ownership to exactly one
    /// caller: the one observing the 1 -> 0 transition. That caller still
    /// re-checks generation and state under the lock, because a commit-side
    /// finalise may have won the race on a job that drained before it was
    /// committed.
    pub fn complete(&self, job: &Job) -> bool {
        if self.counters[job.slot()].fetch_sub(1, Ordering::AcqRel) != 1 {
            return false;
        }
        let mut state = self.state.lock();
        {
            let slot = &state.slots[job.slot()];
            if slot.generation != job.generation() || !slot.state.is_committed() {
                return false;
            }
        }
        self.finalize_locked(&mut state, job.slot());
        true
    }

    /// Run the callback, recycle the slot, wake the waiters. Caller holds
    /// the slab lock and has established ownership of the slot.
    fn finalize_locked(&self, state: &mut SlabState, index: usize) {
        let slot = &mut state.slots[index];
        debug_assert!(slot.state.is_committed());
        if let Some(callback) = slot.callback.take() {
            // Runs under the slab lock; callbacks must not call back into
            // the pool.
            if catch_unwind(AssertUnwindSafe(callback)).is_err() {
                error!("completion callback for job slot {} panicked", index);
            }
        }
        let slot = &mut state.slots[index];
        slot.state = JobState::Vacant;
        slot.generation = slot.generation.wrapping_add(1);
        state.free.push(index as u32);
        // Broadcast: a single signal could wake a waiter for a different
        // job and strand the right one.
        self.jobs_done.notify_all();
    }

    /// Block until the job's counter reaches zero.
    ///
    /// Returns immediately for an uncommitted job - it may still grow, so
    /// there is nothing well-defined to wait for - and for a stale handle,
    /// whose job has already completed and been recycled.
    pub fn wait(&self, job: &Job) {
        let mut state = self.state.lock();
        loop {
            {
                let slot = &state.slots[job.slot()];
                if slot.generation != job.generation() || !slot.state.is_committed() {
                    return;
                }
            }
            if self.counters[job.slot()].load(Ordering::Acquire) == 0 {
                return;
            }
            self.jobs_done.wait(&mut state);
        }
    }

    /// Slots currently on the freelist.
    pub fn free_count(&self) -> usize {
        self.state.lock().free.len()
    }

    /// Total slots in the slab.
    pub fn capacity(&self) -> usize {
        self.counters.len()
    }

    #[cfg(debug_assertions)]
    pub(crate) fn assert_open(&self, job: &Job) {
        let state = self.state.lock();
        let slot = &state.slots[job.slot()];
        debug_assert_eq!(slot.generation, job.generation(), "add on a stale job handle");
        debug_assert!(slot.state.is_open(), "add after commit");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn test_begin_distinct_until_exhausted() {
        let slab = JobSlab::new(4);
        let mut seen = HashSet::new();
        for _ in 0..4 {
            let job = slab.begin().unwrap();
            assert!(seen.insert(job.index()));
        }
        assert_eq!(slab.begin(), Err(PoolError::NoJobsFree));
        assert_eq!(slab.free_count(), 0);
    }

    #[test]
    fn test_zero_task_commit_fires_callback_and_recycles() {
        let slab = JobSlab::new(2);
        let fired = Arc::new(AtomicUsize::new(0));

        let job = slab.begin().unwrap();
        let f = Arc::clone(&fired);
        slab.commit(&job, Some(Box::new(move || {
            f.fetch_add(1, Ordering::SeqCst);
        })));

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(slab.free_count(), 2);
    }

    #[test]
    fn test_last_complete_finalises() {
        let slab = JobSlab::new(2);
        let fired = Arc::new(AtomicUsize::new(0));

        let job = slab.begin().unwrap();
        slab.outstanding(&job).fetch_add(2, Ordering::Relaxed);
        let f = Arc::clone(&fired);
        slab.commit(&job, Some(Box::new(move || {
            f.fetch_add(1, Ordering::SeqCst);
        })));

        assert!(!slab.complete(&job));
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        assert!(slab.complete(&job));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(slab.free_count(), 2);
    }

    #[test]
    fn test_drained_before_commit_finalised_by_commit() {
        let slab = JobSlab::new(2);
        let fired = Arc::new(AtomicUsize::new(0));

        let job = slab.begin().unwrap();
        slab.outstanding(&job).fetch_add(1, Ordering::Relaxed);

        // Last task finishes before the job is committed: the worker backs
        // off and commit picks up the finalise.
        assert!(!slab.complete(&job));

        let f = Arc::clone(&fired);
        slab.commit(&job, Some(Box::new(move || {
            f.fetch_add(1, Ordering::SeqCst);
        })));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(slab.free_count(), 2);
    }

    #[test]
    fn test_wait_on_uncommitted_returns() {
        let slab = JobSlab::new(2);
        let job = slab.begin().unwrap();
        slab.outstanding(&job).fetch_add(3, Ordering::Relaxed);
        // Uncommitted: returns immediately even with tasks outstanding.
        slab.wait(&job);
    }

    #[test]
    fn test_wait_on_stale_handle_returns() {
        let slab = JobSlab::new(2);
        let job = slab.begin().unwrap();
        slab.commit(&job, None);
        // Job finalised at commit; the handle is stale now.
        slab.wait(&job);
        assert_eq!(slab.free_count(), 2);
    }

    #[test]
    fn test_generation_guards_recycled_slot() {
        let slab = JobSlab::new(1);
        let first = slab.begin().unwrap();
        slab.commit(&first, None);

        // Same slot, next generation.
        let second = slab.begin().unwrap();
        assert_eq!(first.index(), second.index());
        assert_ne!(first.generation(), second.generation());

        // A straggler holding the old handle cannot disturb the new job.
        slab.wait(&first);
        assert_eq!(slab.free_count(), 0);
    }

    #[test]
    fn test_callback_panic_is_contained() {
        let slab = JobSlab::new(2);
        let job = slab.begin().unwrap();
        slab.commit(&job, Some(Box::new(|| panic!("boom"))));
        // Slot recycled despite the panic.
        assert_eq!(slab.free_count(), 2);
    }
}
