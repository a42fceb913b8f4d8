//! Task and completion-callback payload types
//!
//! Tasks and callbacks are boxed closures that own whatever payload they
//! captured. Data the producer wrote before queueing a task is published to
//! the worker through the ring lock, so a task body may freely read state
//! its producer prepared.

use core::fmt;

use crate::id::Job;

/// A unit of work executed by some worker, exactly once.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Completion callback, invoked exactly once by the last-completing worker
/// (or by `commit` itself when nothing is outstanding).
pub type DoneFn = Box<dyn FnOnce() + Send + 'static>;

/// A queued task tagged with its owning job.
///
/// Records live only inside the task ring: created when `add` publishes a
/// slot, consumed when a worker reads it back out.
pub struct TaskRecord {
    /// Task body
    pub run: Task,
    /// Owning job; pins the job's slot until the post-run decrement
    pub job: Job,
}

impl TaskRecord {
    #[inline]
    pub fn new(run: Task, job: Job) -> Self {
        Self { run, job }
    }
}

impl fmt::Debug for TaskRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRecord").field("job", &self.job).finish()
    }
}
