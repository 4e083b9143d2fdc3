//! Wiring of the pool, transport queue, signal and counters into one pipeline.
//!
//! A [`Pipeline`] is built once and then split into exactly one [`Producer`] and one
//! [`Consumer`]. Neither half is `Clone`, which keeps the single-producer assumption
//! behind the threshold test true by construction.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::clock::{Clock, MonotonicClock};
use crate::config::PipelineConfig;
use crate::consumer::Consumer;
use crate::error::{MAX_CAPACITY, MIN_CAPACITY, PipelineError};
use crate::producer::Producer;
use crate::signal::BatchSignal;
use crate::slotpool::SlotPool;
use crate::stats::{PipelineStats, StatsSnapshot};
use crate::transport::TransportQueue;

// State shared by the producer and consumer contexts.
pub(crate) struct Shared {
    pub(crate) pool: SlotPool,
    pub(crate) transport: TransportQueue,
    pub(crate) signal: BatchSignal,
    // records enqueued but not yet drained, in [0, capacity]
    pub(crate) pending: AtomicUsize,
    // last sequence handed out; never reset
    pub(crate) sequence: AtomicU64,
    pub(crate) half: usize,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) stats: PipelineStats,
}

pub struct Pipeline {
    shared: Arc<Shared>,
}

impl Pipeline {
    pub fn new(capacity: usize) -> Result<Self, PipelineError> {
        Self::with_clock(capacity, MonotonicClock::new())
    }

    pub fn with_clock<C>(capacity: usize, clock: C) -> Result<Self, PipelineError>
    where
        C: Clock + 'static,
    {
        if capacity < MIN_CAPACITY {
            return Err(PipelineError::CapacityTooSmall(capacity));
        }
        if capacity > MAX_CAPACITY {
            return Err(PipelineError::CapacityTooLarge(capacity));
        }
        let shared = Shared {
            pool: SlotPool::new(capacity),
            transport: TransportQueue::new(capacity),
            signal: BatchSignal::new(),
            pending: AtomicUsize::new(0),
            sequence: AtomicU64::new(0),
            half: capacity / 2,
            clock: Box::new(clock),
            stats: PipelineStats::new(),
        };
        Ok(Pipeline {
            shared: Arc::new(shared),
        })
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Self::new(config.capacity)
    }

    pub fn monitor(&self) -> Monitor {
        Monitor::from_shared(Arc::clone(&self.shared))
    }

    pub fn split(self) -> (Producer, Consumer) {
        let producer = Producer::new(Arc::clone(&self.shared));
        let consumer = Consumer::new(self.shared);
        (producer, consumer)
    }
}

/// Read-only view of a running pipeline, safe to clone and hand to any thread.
#[derive(Clone)]
pub struct Monitor {
    shared: Arc<Shared>,
}

impl Monitor {
    pub(crate) fn from_shared(shared: Arc<Shared>) -> Self {
        Monitor { shared }
    }

    pub fn capacity(&self) -> usize {
        self.shared.pool.capacity()
    }

    pub fn half(&self) -> usize {
        self.shared.half
    }

    pub fn free_slots(&self) -> usize {
        self.shared.pool.free_count()
    }

    pub fn queued(&self) -> usize {
        self.shared.transport.len()
    }

    pub fn pending(&self) -> usize {
        self.shared.pending.load(Ordering::Acquire)
    }

    pub fn last_sequence(&self) -> u64 {
        self.shared.sequence.load(Ordering::Acquire)
    }

    pub fn signal_ready(&self) -> bool {
        self.shared.signal.is_ready()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("capacity", &self.capacity())
            .field("free_slots", &self.free_slots())
            .field("queued", &self.queued())
            .field("pending", &self.pending())
            .finish()
    }
}
