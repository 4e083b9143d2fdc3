//! Binary, edge-triggered wakeup for the consumer.
//!
//! The signal holds at most one pending wakeup. Raising it twice before the
//! consumer takes it has the same effect as raising it once; the consumer is
//! expected to re-derive the actual amount of work by draining.

use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct BatchSignal {
    ready: AtomicBool,
    mutex: Mutex<()>,
    condvar: Condvar,
}

impl BatchSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the signal from idle to ready and wakes the waiter.
    ///
    /// Returns `false` when the signal was already ready, in which case nothing changes.
    /// The mutex is only taken for the notify and is never held across a wait by
    /// this side, so callers in the periodic context are not blocked behind the consumer.
    pub fn raise(&self) -> bool {
        if self.ready.swap(true, Ordering::AcqRel) {
            return false;
        }
        let _guard = self.mutex.lock();
        self.condvar.notify_one();
        true
    }

    /// Blocks until the signal is ready, then resets it to idle.
    pub fn wait_forever(&self) {
        if self.try_wait() {
            return;
        }
        let mut guard = self.mutex.lock();
        while !self.try_wait() {
            self.condvar.wait(&mut guard);
        }
    }

    /// Like [`wait_forever`](Self::wait_forever) but gives up after `timeout`.
    /// Returns `true` if the signal was taken.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        if self.try_wait() {
            return true;
        }
        let deadline = Instant::now() + timeout;
        let mut guard = self.mutex.lock();
        loop {
            if self.try_wait() {
                return true;
            }
            if self.condvar.wait_until(&mut guard, deadline).timed_out() {
                return self.try_wait();
            }
        }
    }

    /// Takes the signal if it is ready, without blocking.
    pub fn try_wait(&self) -> bool {
        self.ready.swap(false, Ordering::AcqRel)
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}
