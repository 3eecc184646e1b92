//! Reorder buffer: holds early results until every lower index is out

use crate::error::ReorderError;
use std::collections::BTreeMap;

/// Outcomes waiting for their turn, keyed by index
///
/// Every pending index is at or above `next_to_emit`.
#[derive(Debug)]
pub struct ReorderBuffer<T> {
    pending: BTreeMap<usize, T>,
    next_to_emit: usize,
}

impl<T> Default for ReorderBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ReorderBuffer<T> {
    /// Empty buffer with the cursor at 0
    pub fn new() -> Self {
        Self {
            pending: BTreeMap::new(),
            next_to_emit: 0,
        }
    }

    /// Hold an outcome until its turn
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), ReorderError> {
        if index < self.next_to_emit {
            return Err(ReorderError::AlreadyEmitted {
                index,
                next: self.next_to_emit,
            });
        }
        if self.pending.contains_key(&index) {
            return Err(ReorderError::Duplicate(index));
        }
        self.pending.insert(index, value);
        Ok(())
    }

    /// Release the consecutive run starting at the cursor, in order
    ///
    /// Returns how many were released.
    pub fn drain_ready(&mut self, mut emit: impl FnMut(usize, T)) -> usize {
        let mut released = 0;
        while let Some(value) = self.pending.remove(&self.next_to_emit) {
            emit(self.next_to_emit, value);
            self.next_to_emit += 1;
            released += 1;
        }
        released
    }

    /// Index the buffer is waiting on
    pub fn next_to_emit(&self) -> usize {
        self.next_to_emit
    }

    /// Number of outcomes held
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is held
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(buffer: &mut ReorderBuffer<&'static str>) -> Vec<(usize, &'static str)> {
        let mut out = Vec::new();
        buffer.drain_ready(|i, v| out.push((i, v)));
        out
    }

    #[test]
    fn test_in_order_inserts_release_immediately() {
        let mut buffer = ReorderBuffer::new();
        buffer.insert(0, "a").unwrap();
        assert_eq!(drain(&mut buffer), vec![(0, "a")]);
        buffer.insert(1, "b").unwrap();
        assert_eq!(drain(&mut buffer), vec![(1, "b")]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_early_results_are_held() {
        let mut buffer = ReorderBuffer::new();
        buffer.insert(2, "c").unwrap();
        buffer.insert(1, "b").unwrap();
        assert!(drain(&mut buffer).is_empty());
        assert_eq!(buffer.pending(), 2);
        assert_eq!(buffer.next_to_emit(), 0);

        buffer.insert(0, "a").unwrap();
        assert_eq!(drain(&mut buffer), vec![(0, "a"), (1, "b"), (2, "c")]);
        assert_eq!(buffer.next_to_emit(), 3);
    }

    #[test]
    fn test_drain_stops_at_gap() {
        let mut buffer = ReorderBuffer::new();
        for i in [0, 1, 3, 4] {
            buffer.insert(i, "x").unwrap();
        }
        assert_eq!(buffer.drain_ready(|_, _| {}), 2);
        assert_eq!(buffer.next_to_emit(), 2);
        assert_eq!(buffer.pending(), 2);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut buffer = ReorderBuffer::new();
        buffer.insert(3, "a").unwrap();
        assert_eq!(buffer.insert(3, "b"), Err(ReorderError::Duplicate(3)));
    }

    #[test]
    fn test_insert_below_cursor_rejected() {
        let mut buffer = ReorderBuffer::new();
        buffer.insert(0, "a").unwrap();
        drain(&mut buffer);
        assert_eq!(
            buffer.insert(0, "again"),
            Err(ReorderError::AlreadyEmitted { index: 0, next: 1 })
        );
    }
}
