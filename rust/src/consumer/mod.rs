use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::info;

use crate::error::ForeignSlot;
use crate::pipeline::{Monitor, Shared};
use crate::record::Record;

/// The draining half of a pipeline. It blocks on the batch signal and, once woken,
/// empties the transport queue completely before waiting again.
pub struct Consumer {
    shared: Arc<Shared>,
}

impl Consumer {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Consumer { shared }
    }

    // drain empties the transport queue, logging every record, and returns how many it took.
    // It leaves the batch signal alone: if the signal was raised, the next
    // wait_and_drain returns at once and may find nothing to drain.
    pub fn drain(&mut self) -> usize {
        self.drain_with(|_| {})
    }

    // drain_with is drain() with an observer called for each record, in dequeue order,
    // before its slot goes back to the pool.
    pub fn drain_with<F>(&mut self, mut observe: F) -> usize
    where
        F: FnMut(&Record),
    {
        let shared = &*self.shared;
        let mut drained = 0;

        while let Some(slot) = shared.transport.try_dequeue() {
            shared.pending.fetch_sub(1, Ordering::AcqRel);
            drained += 1;

            let record = slot.record();
            info!(
                sequence = record.sequence,
                uptime_ms = record.uptime_ms(),
                "consumer: record"
            );
            observe(record);

            // Only the producer fills the queue, and only with slots from this pool.
            if let Err(ForeignSlot(slot)) = shared.pool.release(slot) {
                unreachable!("drained slot {} foreign to this pipeline", slot.index());
            }
        }

        if drained > 0 {
            shared.stats.record_drain(drained);
            info!(drained, "consumer: drained {} item(s)", drained);
        }
        drained
    }

    /// Blocks until the producer signals a batch, then drains.
    pub fn wait_and_drain(&mut self) -> usize {
        self.shared.signal.wait_forever();
        self.drain()
    }

    /// Drains only if a batch has been signalled, without blocking.
    pub fn try_drain(&mut self) -> Option<usize> {
        if self.shared.signal.try_wait() {
            Some(self.drain())
        } else {
            None
        }
    }

    pub fn run_forever(&mut self) -> ! {
        loop {
            self.wait_and_drain();
        }
    }

    /// Runs the drain loop until `stop` is set, checking it every `poll`.
    ///
    /// A final drain runs after `stop` is observed so that records which never reached
    /// the threshold are not left behind. Returns the total number of records drained.
    pub fn run_until(&mut self, stop: &AtomicBool, poll: Duration) -> u64 {
        let mut total = 0u64;
        while !stop.load(Ordering::Acquire) {
            if self.shared.signal.wait_timeout(poll) {
                total += self.drain() as u64;
            }
        }
        total + self.drain() as u64
    }

    pub fn monitor(&self) -> Monitor {
        Monitor::from_shared(Arc::clone(&self.shared))
    }
}
