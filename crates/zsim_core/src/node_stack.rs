//! Bounded recency history of action records.

use std::collections::VecDeque;

use crate::skill_node::Timed;

/// Team-wide history: "what just happened across the whole team".
pub const GLOBAL_STACK_CAPACITY: usize = 5;
/// Per-character history used for occupancy and displacement.
pub const PERSONAL_STACK_CAPACITY: usize = 3;

/// Fixed-capacity LIFO history. Pushing at capacity evicts the oldest entry.
///
/// The stack never interrupts anything itself: an action that ends early is
/// represented by a newer entry pushed on top by the scheduler.
#[derive(Debug, Clone)]
pub struct NodeStack<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T: Timed> NodeStack<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "node stack capacity must be positive");
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, entry: T) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Most recent entry.
    pub fn peek(&self) -> Option<&T> {
        self.entries.back()
    }

    /// Most recent entry if it is still running at `tick`.
    pub fn effective_node(&self, tick: u64) -> Option<&T> {
        self.peek().filter(|entry| entry.end_tick() > tick)
    }

    /// True when the most recent entry has ended by `tick`. An empty stack has
    /// nothing running, so it counts as finished.
    pub fn last_is_finished(&self, tick: u64) -> bool {
        self.peek().is_none_or(|entry| entry.end_tick() <= tick)
    }

    /// Newest entry matching `pred`, scanning from the top.
    pub fn find_newest(&self, mut pred: impl FnMut(&T) -> bool) -> Option<&T> {
        self.entries.iter().rev().find(|entry| pred(entry))
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.entries.iter()
    }
}
