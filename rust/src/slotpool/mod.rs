use crossbeam_queue::ArrayQueue;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::ForeignSlot;
use crate::record::Record;

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// One fixed storage unit of a [`SlotPool`].
///
/// A `Slot` can only be created by its pool and is neither `Clone` nor `Copy`:
/// releasing it moves it back, so the former owner cannot touch it afterwards.
/// Dropping a slot instead of releasing it shrinks its pool for good.
#[derive(Debug)]
#[must_use = "a slot must be released back to its pool"]
pub struct Slot {
    pool_id: u64,
    index: usize,
    record: Record,
}

impl Slot {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub(crate) fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }
}

// A SlotPool owns every slot that will ever exist for a pipeline.
// All slots are created in new() and start out free; afterwards slots are only moved
// between the free list and their current owner, never allocated or dropped.
pub struct SlotPool {
    id: u64,
    capacity: usize,
    free: ArrayQueue<Slot>,
}

impl SlotPool {
    /// Builds a pool of `capacity` slots, all free. Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "slot pool capacity must be > 0");
        let id = NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed);
        let free = ArrayQueue::new(capacity);
        for index in 0..capacity {
            // capacity matches the queue bound, so every push fits.
            let _ = free.push(Slot {
                pool_id: id,
                index,
                record: Record::default(),
            });
        }
        SlotPool { id, capacity, free }
    }

    // try_acquire hands out a free slot, or None when every slot is in use.
    // It never blocks and never allocates.
    pub fn try_acquire(&self) -> Option<Slot> {
        self.free.pop()
    }

    // release returns a slot to the free list.
    // A slot owned by another pool is refused and handed back untouched.
    pub fn release(&self, slot: Slot) -> Result<(), ForeignSlot> {
        if slot.pool_id != self.id {
            return Err(ForeignSlot(slot));
        }
        // The free list holds at most `capacity` slots and only this pool's slots
        // reach it, so the push cannot fail.
        let _ = self.free.push(slot);
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn in_use(&self) -> usize {
        self.capacity - self.free.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.free.is_empty()
    }

    pub fn owns(&self, slot: &Slot) -> bool {
        slot.pool_id == self.id
    }
}

impl std::fmt::Debug for SlotPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotPool")
            .field("id", &self.id)
            .field("capacity", &self.capacity)
            .field("free", &self.free.len())
            .finish()
    }
}
