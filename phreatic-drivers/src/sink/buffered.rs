//! Bounded metric queue
//!
//! Decouples the controller from a slow or asynchronous backend. The
//! controller emits into the queue synchronously; a consumer drains it at
//! its own pace. When the queue is full the oldest record is dropped so
//! the most recent state is always kept, and the drop is counted.

use heapless::Deque;
use phreatic_core::metrics::{Metric, MetricRecord};
use phreatic_core::traits::MetricSink;

/// Drop-oldest queue of owned metric records
pub struct BufferedSink<const N: usize> {
    queue: Deque<MetricRecord, N>,
    dropped: u32,
}

impl<const N: usize> Default for BufferedSink<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> BufferedSink<N> {
    /// Create an empty queue
    pub const fn new() -> Self {
        Self {
            queue: Deque::new(),
            dropped: 0,
        }
    }

    /// Oldest queued record
    pub fn front(&self) -> Option<&MetricRecord> {
        self.queue.front()
    }

    /// Remove and return the oldest record
    pub fn pop(&mut self) -> Option<MetricRecord> {
        self.queue.pop_front()
    }

    /// Queued record count
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Records dropped since creation
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl<const N: usize> MetricSink for BufferedSink<N> {
    fn emit(&mut self, metric: &Metric<'_>) {
        let record = MetricRecord::from(metric);
        if self.queue.is_full() {
            self.queue.pop_front();
            self.dropped = self.dropped.saturating_add(1);
        }
        // Cannot fail: a slot was freed above if needed
        let _ = self.queue.push_back(record);
    }
}
