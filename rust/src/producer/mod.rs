use std::sync::Arc;
use std::sync::atomic::Ordering;

use tracing::{debug, warn};

use crate::error::TransportOverflow;
use crate::pipeline::{Monitor, Shared};

/// What a single producer tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A record was stamped and enqueued. `crossed` is true when this tick moved the
    /// pending count up across the half-capacity threshold and raised the signal.
    Published { sequence: u64, crossed: bool },
    /// The pool was empty; this tick's record was not produced and is not retried.
    Dropped,
}

impl TickOutcome {
    pub fn sequence(&self) -> Option<u64> {
        match self {
            TickOutcome::Published { sequence, .. } => Some(*sequence),
            TickOutcome::Dropped => None,
        }
    }

    pub fn crossed(&self) -> bool {
        matches!(self, TickOutcome::Published { crossed: true, .. })
    }
}

// crosses_threshold is the edge test applied to the pre-increment pending count.
// It holds for exactly one value of `previous`, so with single-unit increments
// it fires once per upward crossing and stays quiet while the count keeps rising.
pub fn crosses_threshold(previous: usize, half: usize) -> bool {
    previous < half && previous + 1 >= half
}

/// The periodic, non-blocking half of a pipeline.
///
/// Every operation in [`tick`](Producer::tick) completes in bounded time: the pool
/// and queue are lock-free, the counters use atomic read-modify-write, and raising
/// the signal takes a bounded, short-held lock for the notify.
pub struct Producer {
    shared: Arc<Shared>,
}

impl Producer {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Producer { shared }
    }

    pub fn tick(&mut self) -> TickOutcome {
        let shared = &*self.shared;

        let mut slot = match shared.pool.try_acquire() {
            Some(slot) => slot,
            None => {
                shared.stats.record_dropped();
                warn!(
                    pending = shared.pending.load(Ordering::Relaxed),
                    "producer: no free slots available"
                );
                return TickOutcome::Dropped;
            }
        };

        // Acquire before assigning, so a dropped tick never burns a sequence number.
        let sequence = shared.sequence.fetch_add(1, Ordering::AcqRel) + 1;
        slot.record_mut().stamp(sequence, shared.clock.now());

        let previous = shared.pending.fetch_add(1, Ordering::AcqRel);

        // The queue is as large as the pool and this producer is its only writer,
        // so a slot acquired from the pool always fits.
        if let Err(TransportOverflow(slot)) = shared.transport.enqueue(slot) {
            unreachable!("transport queue full with slot {} in hand", slot.index());
        }
        shared.stats.record_produced();

        let crossed = crosses_threshold(previous, shared.half);
        if crossed {
            debug!(pending = previous + 1, half = shared.half, "producer: batch ready");
            shared.signal.raise();
            shared.stats.record_wakeup();
        }
        TickOutcome::Published { sequence, crossed }
    }

    pub fn monitor(&self) -> Monitor {
        Monitor::from_shared(Arc::clone(&self.shared))
    }
}
