//! Fixed-capacity FIFO history buffer.
//!
//! Used for the per-mote reading history, the global reading history and the
//! alert log. Pushing into a full buffer evicts the oldest entry. Iteration is
//! always oldest to newest.

use std::collections::{vec_deque, VecDeque};

// ---

/// Bounded ring buffer that keeps the most recent `capacity` items.
#[derive(Debug, Clone)]
pub struct History<T> {
    // ---
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> History<T> {
    /// Create an empty buffer. A capacity of zero is bumped to one.
    pub fn with_capacity(capacity: usize) -> Self {
        // ---
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an item, returning the evicted oldest item if the buffer was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        // ---
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    /// The last `n` items, oldest first. Returns everything if fewer exist.
    pub fn recent(&self, n: usize) -> vec_deque::Iter<'_, T> {
        // ---
        let skip = self.items.len().saturating_sub(n);
        self.items.range(skip..)
    }

    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<'a, T> IntoIterator for &'a History<T> {
    type Item = &'a T;
    type IntoIter = vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_push_below_capacity_keeps_everything() {
        // ---
        let mut history = History::with_capacity(3);
        assert!(history.push(1).is_none());
        assert!(history.push(2).is_none());

        assert_eq!(history.len(), 2);
        assert_eq!(history.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_push_at_capacity_evicts_oldest() {
        // ---
        let mut history = History::with_capacity(3);
        for i in 0..3 {
            history.push(i);
        }
        assert_eq!(history.push(3), Some(0));
        assert_eq!(history.push(4), Some(1));

        assert_eq!(history.len(), 3);
        assert_eq!(history.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(history.latest(), Some(&4));
    }

    #[test]
    fn test_recent_returns_tail_oldest_first() {
        // ---
        let mut history = History::with_capacity(10);
        for i in 0..8 {
            history.push(i);
        }

        assert_eq!(history.recent(3).copied().collect::<Vec<_>>(), vec![5, 6, 7]);
        assert_eq!(history.recent(20).len(), 8);
        assert_eq!(history.recent(0).len(), 0);
    }

    #[test]
    fn test_recent_on_empty_is_empty() {
        // ---
        let history: History<u32> = History::with_capacity(5);
        assert!(history.is_empty());
        assert_eq!(history.recent(5).len(), 0);
        assert!(history.latest().is_none());
    }

    #[test]
    fn test_zero_capacity_is_bumped() {
        // ---
        let mut history = History::with_capacity(0);
        history.push('a');
        history.push('b');
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.latest(), Some(&'b'));
    }
}
