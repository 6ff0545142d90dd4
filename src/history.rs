use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::platform::EventRecord;

/// Bounded, FIFO-evicting store of recent intake events.
///
/// Cheap to clone; every clone refers to the same buffer. Appends hold the
/// write lock only for the push/pop, snapshots hold the read lock only while
/// copying `Arc` pointers out.
#[derive(Clone)]
pub struct HistoryBuffer {
    entries: Arc<RwLock<VecDeque<Arc<EventRecord>>>>,
    capacity: usize,
}

impl HistoryBuffer {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert at the tail, evicting the oldest record when full.
    pub async fn append(&self, record: Arc<EventRecord>) {
        let mut entries = self.entries.write().await;
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(record);
    }

    /// All current records, newest first.
    pub async fn snapshot(&self) -> Vec<Arc<EventRecord>> {
        let entries = self.entries.read().await;
        entries.iter().rev().cloned().collect()
    }
}
