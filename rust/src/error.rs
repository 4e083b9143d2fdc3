use thiserror::Error;

use crate::slotpool::Slot;

// The smallest capacity for which the half-capacity crossing can ever fire.
pub const MIN_CAPACITY: usize = 2;
// Upper bound on pool capacity; keeps the up-front slot allocation sane.
pub const MAX_CAPACITY: usize = 1 << 20;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pool capacity must be at least 2, got {0}")]
    CapacityTooSmall(usize),
    #[error("pool capacity must be at most 1048576, got {0}")]
    CapacityTooLarge(usize),
    #[error("production period must be non-zero")]
    ZeroPeriod,
    #[error("invalid configuration json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value {value:?} for {key}")]
    InvalidOverride { key: &'static str, value: String },
    #[error("failed to spawn timer thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Returned by [`crate::transport::TransportQueue::enqueue`] when the queue is full.
///
/// Only reachable when a slot from a different pool is pushed; the slot is handed
/// back so the caller can return it where it came from.
#[derive(Debug, Error)]
#[error("transport queue overflow (slot {})", .0.index())]
pub struct TransportOverflow(pub Slot);

/// Returned by [`crate::slotpool::SlotPool::release`] when the slot belongs to a
/// different pool. The slot is handed back so it can be returned to its owner.
#[derive(Debug, Error)]
#[error("slot {} does not belong to this pool", .0.index())]
pub struct ForeignSlot(pub Slot);
