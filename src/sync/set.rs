use std::collections::HashSet;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

/// Thread-safe set with mutual exclusion on every operation.
///
/// Clones share the same underlying storage. Operations never block beyond
/// the lock itself.
#[derive(Debug, Default)]
pub struct ConcurrentSet<T> {
    inner: Arc<Mutex<HashSet<T>>>,
}

impl<T> Clone for ConcurrentSet<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Eq + Hash + Clone> ConcurrentSet<T> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Inserts a value; false when it was already present.
    pub fn add(&self, value: T) -> bool {
        self.inner.lock().unwrap().insert(value)
    }

    /// Removes a value; false when it was absent.
    pub fn remove(&self, value: &T) -> bool {
        self.inner.lock().unwrap().remove(value)
    }

    /// Whether the value is currently present.
    pub fn contains(&self, value: &T) -> bool {
        self.inner.lock().unwrap().contains(value)
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }

    /// Snapshot of the current membership, in arbitrary order.
    pub fn items(&self) -> Vec<T> {
        self.inner.lock().unwrap().iter().cloned().collect()
    }
}
