// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

/// Bounded re-sequencing buffer for one topic.
///
/// Each admitted message gets the next arrival sequence number. Results may
/// complete in any order; [`drain_ready`](Self::drain_ready) releases them
/// strictly in sequence, stopping at the first gap. At most `window` messages
/// can be admitted and not yet released.
#[derive(Debug)]
pub struct ReorderBuffer<T> {
    window: usize,
    next_seq: u64,
    head: u64,
    completed: BTreeMap<u64, T>,
}

impl<T> ReorderBuffer<T> {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            next_seq: 0,
            head: 0,
            completed: BTreeMap::new(),
        }
    }

    /// Messages admitted but not yet released.
    pub fn outstanding(&self) -> usize {
        (self.next_seq - self.head) as usize
    }

    pub fn has_capacity(&self) -> bool {
        self.outstanding() < self.window
    }

    pub fn is_idle(&self) -> bool {
        self.outstanding() == 0
    }

    /// Reserve the next sequence number, or `None` if the window is full.
    pub fn admit(&mut self) -> Option<u64> {
        if !self.has_capacity() {
            return None;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        Some(seq)
    }

    /// Record the result for `seq`. Unknown or already released sequences are ignored.
    pub fn complete(&mut self, seq: u64, item: T) {
        if seq >= self.head && seq < self.next_seq {
            self.completed.insert(seq, item);
        }
    }

    /// Release every result from the head up to the first gap.
    pub fn drain_ready(&mut self) -> Vec<T> {
        let mut ready = Vec::new();
        while let Some(item) = self.completed.remove(&self.head) {
            ready.push(item);
            self.head += 1;
        }
        ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_order_completion_released_in_order() {
        let mut buffer = ReorderBuffer::new(8);
        let first = buffer.admit().unwrap();
        let second = buffer.admit().unwrap();
        let third = buffer.admit().unwrap();

        buffer.complete(third, "c");
        buffer.complete(second, "b");
        assert!(buffer.drain_ready().is_empty());
        assert_eq!(buffer.outstanding(), 3);

        buffer.complete(first, "a");
        assert_eq!(buffer.drain_ready(), vec!["a", "b", "c"]);
        assert!(buffer.is_idle());
    }

    #[test]
    fn test_window_limits_admission() {
        let mut buffer = ReorderBuffer::new(2);
        let first = buffer.admit().unwrap();
        buffer.admit().unwrap();
        assert_eq!(buffer.admit(), None);

        buffer.complete(first, 1);
        assert_eq!(buffer.drain_ready(), vec![1]);
        assert!(buffer.admit().is_some());
    }

    #[test]
    fn test_stale_completion_ignored() {
        let mut buffer = ReorderBuffer::new(2);
        let seq = buffer.admit().unwrap();
        buffer.complete(seq, "x");
        buffer.drain_ready();

        buffer.complete(seq, "again");
        buffer.complete(99, "future");
        assert!(buffer.drain_ready().is_empty());
    }
}
