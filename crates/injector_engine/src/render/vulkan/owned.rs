//! Ordered collections of owning handle wrappers

use std::ops::Deref;

/// Vec of RAII wrappers released last-created-first
///
/// Built one element at a time, so an early `?` during construction releases
/// whatever was already created, newest first.
pub struct OwnedList<T> {
    items: Vec<T>,
}

impl<T> OwnedList<T> {
    /// Empty list with room for `capacity` wrappers
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Append a newly created wrapper
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }
}

impl<T> Deref for OwnedList<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> Drop for OwnedList<T> {
    fn drop(&mut self) {
        while let Some(item) = self.items.pop() {
            drop(item);
        }
    }
}
