use crossbeam_queue::ArrayQueue;
use std::sync::Arc;
use thiserror::Error;

/// Error raised when a buffer is constructed with no capacity.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoundedBufferError {
    #[error("buffer capacity must be positive")]
    ZeroCapacity,
}

/// Lock-free bounded FIFO that fails fast instead of blocking.
///
/// `put` rejects when full and `get` returns `None` when empty, so callers
/// must branch on rejection explicitly (retry, drop, or back off). Clones
/// share the same underlying queue.
#[derive(Debug, Clone)]
pub struct BoundedBuffer<T> {
    queue: Arc<ArrayQueue<T>>,
    capacity: usize,
}

impl<T> BoundedBuffer<T> {
    /// Builds a buffer, rejecting a zero capacity up front.
    pub fn new(capacity: usize) -> Result<Self, BoundedBufferError> {
        if capacity == 0 {
            return Err(BoundedBufferError::ZeroCapacity);
        }
        Ok(Self {
            queue: Arc::new(ArrayQueue::new(capacity)),
            capacity,
        })
    }

    /// Enqueues an item; returns false (and drops the item) when full.
    pub fn put(&self, item: T) -> bool {
        self.queue.push(item).is_ok()
    }

    /// Dequeues the oldest item, or `None` when empty.
    pub fn get(&self) -> Option<T> {
        self.queue.pop()
    }

    /// Current number of queued items.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the buffer holds no items.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
