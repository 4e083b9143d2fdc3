use crossbeam_queue::ArrayQueue;

use crate::error::TransportOverflow;
use crate::slotpool::Slot;

/// Bounded FIFO carrying filled slots from the producer to the consumer.
///
/// Its capacity equals the pool capacity, so a slot that was acquired from the
/// matching pool always fits.
pub struct TransportQueue {
    queue: ArrayQueue<Slot>,
}

impl TransportQueue {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "transport queue capacity must be > 0");
        TransportQueue {
            queue: ArrayQueue::new(capacity),
        }
    }

    // enqueue appends at the tail without blocking.
    pub fn enqueue(&self, slot: Slot) -> Result<(), TransportOverflow> {
        self.queue.push(slot).map_err(TransportOverflow)
    }

    // try_dequeue removes the head, or returns None when the queue is empty.
    pub fn try_dequeue(&self) -> Option<Slot> {
        self.queue.pop()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }
}

impl std::fmt::Debug for TransportQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportQueue")
            .field("len", &self.queue.len())
            .field("capacity", &self.queue.capacity())
            .finish()
    }
}
