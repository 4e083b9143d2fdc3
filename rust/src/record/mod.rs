use serde::{Deserialize, Serialize};
use std::time::Duration;

// A Record is the payload carried by every slot.
// Its fields are overwritten on each production; the storage itself is never reallocated.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Record {
    pub sequence: u64,
    pub timestamp: Duration,
}

impl Record {
    pub fn new(sequence: u64, timestamp: Duration) -> Self {
        Record {
            sequence,
            timestamp,
        }
    }

    // uptime_ms is the timestamp as whole milliseconds, the unit the consumer logs.
    pub fn uptime_ms(&self) -> u64 {
        self.timestamp.as_millis() as u64
    }

    pub(crate) fn stamp(&mut self, sequence: u64, timestamp: Duration) {
        self.sequence = sequence;
        self.timestamp = timestamp;
    }
}
