use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

// Counters shared by both ends of the pipeline.
// They are informational only; the queue and the pending counter stay authoritative.
#[derive(Debug, Default)]
pub struct PipelineStats {
    produced: AtomicU64,
    dropped: AtomicU64,
    drained: AtomicU64,
    wakeups: AtomicU64,
    drain_passes: AtomicU64,
}

impl PipelineStats {
    pub const fn new() -> Self {
        Self {
            produced: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            drained: AtomicU64::new(0),
            wakeups: AtomicU64::new(0),
            drain_passes: AtomicU64::new(0),
        }
    }

    #[inline]
    pub(crate) fn record_produced(&self) {
        self.produced.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_wakeup(&self) {
        self.wakeups.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_drain(&self, drained: usize) {
        self.drained.fetch_add(drained as u64, Ordering::Relaxed);
        self.drain_passes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            produced: self.produced.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            drained: self.drained.load(Ordering::Relaxed),
            wakeups: self.wakeups.load(Ordering::Relaxed),
            drain_passes: self.drain_passes.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`PipelineStats`].
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub produced: u64,
    pub dropped: u64,
    pub drained: u64,
    pub wakeups: u64,
    pub drain_passes: u64,
}

impl StatsSnapshot {
    /// Fraction of ticks whose record was lost to pool exhaustion.
    pub fn drop_rate(&self) -> f64 {
        let attempts = self.produced + self.dropped;
        if attempts == 0 {
            0.0
        } else {
            self.dropped as f64 / attempts as f64
        }
    }

    /// Average number of records handled per drain pass.
    pub fn avg_batch(&self) -> f64 {
        if self.drain_passes == 0 {
            0.0
        } else {
            self.drained as f64 / self.drain_passes as f64
        }
    }
}
