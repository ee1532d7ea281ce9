//! Fixed-capacity FIFO buffer.

use std::collections::VecDeque;

/// Rolling window retaining only the most recent `capacity` items.
///
/// Pushing into a full window evicts the oldest item first.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingWindow<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    /// Create an empty window. A zero capacity is bumped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an item, returning the evicted oldest item when full.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Newest item.
    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }

    /// The newest `n` items, oldest first.
    pub fn recent(&self, n: usize) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        let skip = self.items.len().saturating_sub(n);
        self.items.iter().skip(skip)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone> RollingWindow<T> {
    /// Clone the newest `n` items into a Vec, oldest first.
    pub fn recent_vec(&self, n: usize) -> Vec<T> {
        self.recent(n).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::RollingWindow;
    use proptest::prelude::*;

    #[test]
    fn test_push_below_capacity_keeps_everything() {
        let mut window = RollingWindow::new(3);
        assert_eq!(window.push(1), None);
        assert_eq!(window.push(2), None);
        assert_eq!(window.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_eleven_pushes_into_ten_slots_evicts_oldest() {
        let mut window = RollingWindow::new(10);
        let mut evicted = Vec::new();
        for i in 0..11 {
            if let Some(old) = window.push(i) {
                evicted.push(old);
            }
        }
        assert_eq!(window.len(), 10);
        assert_eq!(evicted, vec![0]);
        assert_eq!(
            window.iter().copied().collect::<Vec<_>>(),
            (1..11).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_recent_returns_tail_in_order() {
        let mut window = RollingWindow::new(20);
        for i in 0..8 {
            window.push(i);
        }
        assert_eq!(window.recent_vec(5), vec![3, 4, 5, 6, 7]);
        assert_eq!(window.recent_vec(50).len(), 8);
        assert_eq!(window.last(), Some(&7));
    }

    #[test]
    fn test_zero_capacity_is_bumped() {
        let mut window = RollingWindow::new(0);
        window.push('a');
        window.push('b');
        assert_eq!(window.capacity(), 1);
        assert_eq!(window.last(), Some(&'b'));
    }

    proptest! {
        #[test]
        fn prop_never_exceeds_capacity(capacity in 1usize..32, pushes in 0usize..200) {
            let mut window = RollingWindow::new(capacity);
            for i in 0..pushes {
                window.push(i);
                prop_assert!(window.len() <= capacity);
            }
            prop_assert_eq!(window.len(), pushes.min(capacity));
            if pushes > 0 {
                prop_assert_eq!(window.last().copied(), Some(pushes - 1));
            }
        }
    }
}
