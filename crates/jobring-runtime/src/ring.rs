//! Task ring: bounded FIFO of queued tasks
//!
//! A single power-of-two buffer with separate producer (`head`) and
//! consumer (`tail`) cursors, paired with the classic two condition
//! variables: producers wait on `task_popped` while the ring is full,
//! workers wait on `task_pushed` while it is empty. One slot stays unused
//! so a full ring is distinguishable from an empty one.
//!
//! The shutdown flag lives under the ring lock; raising it broadcasts
//! `task_pushed` so every idle worker wakes and exits. Producers blocked
//! on a full ring are deliberately not woken: all dispatch must have
//! drained before the pool is torn down.

use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::{Condvar, Mutex};

use jobring_core::TaskRecord;

pub struct TaskRing {
    state: Mutex<RingState>,
    task_pushed: Condvar,
    task_popped: Condvar,
    mask: u32,
}

struct RingState {
    slots: Box<[Option<TaskRecord>]>,
    /// Producer cursor: next slot to write. Grows monotonically, low bits
    /// index the buffer.
    head: u32,
    /// Consumer cursor: next slot to read.
    tail: u32,
    shutdown: bool,
}

impl RingState {
    #[inline]
    fn len(&self) -> u32 {
        self.head.wrapping_sub(self.tail)
    }
}

impl TaskRing {
    /// `capacity` must be a power of two >= 2 (checked by `PoolConfig`).
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity >= 2 && capacity.is_power_of_two());
        let slots: Box<[Option<TaskRecord>]> =
            (0..capacity).map(|_| None).collect::<Vec<_>>().into_boxed_slice();
        Self {
            state: Mutex::new(RingState {
                slots,
                head: 0,
                tail: 0,
                shutdown: false,
            }),
            task_pushed: Condvar::new(),
            task_popped: Condvar::new(),
            mask: capacity as u32 - 1,
        }
    }

    pub fn capacity(&self) -> usize {
        self.mask as usize + 1
    }

    /// Queue one task, blocking while the ring is full.
    ///
    /// The owning job's outstanding counter is raised before the slot is
    /// published: a worker may start the task the instant the slot becomes
    /// visible, and must never observe it while the counter still holds
    /// its old value.
    pub fn push(&self, record: TaskRecord, outstanding: &AtomicU32) {
        let mut state = self.state.lock();
        while state.len() == self.mask {
            self.task_popped.wait(&mut state);
        }
        outstanding.fetch_add(1, Ordering::Relaxed);
        let at = (state.head & self.mask) as usize;
        debug_assert!(state.slots[at].is_none());
        state.slots[at] = Some(record);
        state.head = state.head.wrapping_add(1);
        self.task_pushed.notify_one();
    }

    /// Dequeue one task, blocking while the ring is empty.
    ///
    /// Returns `None` once shutdown has been requested. The ring lock is
    /// released before the caller runs the task body.
    pub fn pop(&self) -> Option<TaskRecord> {
        let mut state = self.state.lock();
        loop {
            if state.shutdown {
                return None;
            }
            if state.len() > 0 {
                break;
            }
            self.task_pushed.wait(&mut state);
        }
        let at = (state.tail & self.mask) as usize;
        let record = state.slots[at].take();
        debug_assert!(record.is_some());
        state.tail = state.tail.wrapping_add(1);
        self.task_popped.notify_one();
        record
    }

    /// Queued, un-popped tasks. Never exceeds capacity - 1.
    pub fn len(&self) -> usize {
        self.state.lock().len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raise the shutdown flag and wake every idle worker.
    pub fn shutdown(&self) {
        let mut state = self.state.lock();
        state.shutdown = true;
        self.task_pushed.notify_all();
    }
}
