use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{Condvar, Mutex};

/// Binary wake-up signal owned by one worker. Releases coalesce.
#[derive(Default)]
pub(crate) struct WakeSignal {
    raised: Mutex<bool>,
    cond: Condvar,
}

impl WakeSignal {
    pub(crate) fn release(&self) {
        let mut raised = self.raised.lock();
        *raised = true;
        self.cond.notify_one();
    }

    /// Blocks until released, then lowers the signal again.
    pub(crate) fn acquire(&self) {
        let mut raised = self.raised.lock();
        while !*raised {
            self.cond.wait(&mut raised);
        }
        *raised = false;
    }
}

/// Outstanding-task counter with a broadcast condition that fires whenever
/// the count drops to zero.
#[derive(Default)]
pub(crate) struct DrainLatch {
    outstanding: AtomicUsize,
    lock: Mutex<()>,
    drained: Condvar,
}

impl DrainLatch {
    pub(crate) fn add(&self) {
        self.outstanding.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn complete(&self) {
        if self.outstanding.fetch_sub(1, Ordering::AcqRel) == 1 {
            // Taking the lock orders this notify after a waiter's predicate check.
            let _guard = self.lock.lock();
            self.drained.notify_all();
        }
    }

    pub(crate) fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    pub(crate) fn wait(&self) {
        let mut guard = self.lock.lock();
        while self.outstanding.load(Ordering::Acquire) > 0 {
            self.drained.wait(&mut guard);
        }
    }
}
