//! Job slot lifecycle states

/// Lifecycle state of a job slot.
///
/// A slot is either owned by the freelist (`Vacant`) or live. Live slots
/// move `Open` → `Committed`; committed slots return to `Vacant` when the
/// last task finishes. Whether a job is committed is tracked here
/// explicitly rather than by a null-vs-installed callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// On the freelist; no handle refers to this generation
    Vacant,
    /// Handed out by `begin`; still accepting tasks
    Open,
    /// Closed to new tasks; completion callback installed
    Committed,
}

impl JobState {
    #[inline]
    pub fn is_vacant(self) -> bool {
        matches!(self, JobState::Vacant)
    }

    #[inline]
    pub fn is_open(self) -> bool {
        matches!(self, JobState::Open)
    }

    #[inline]
    pub fn is_committed(self) -> bool {
        matches!(self, JobState::Committed)
    }
}
