//! Bounded record of recent per-step value maps
//!
//! The window only gates Kriging: it must hold more than
//! `number_of_previous_data` earlier steps before Kriging is allowed.

use std::collections::VecDeque;

use geokrige_core::ValueMap;

/// Most-recent-first window of at most `number_of_previous_data + 1` steps.
#[derive(Debug, Clone, Default)]
pub struct HistoryWindow {
    entries: VecDeque<ValueMap>,
    previous: usize,
}

impl HistoryWindow {
    pub fn new(number_of_previous_data: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(number_of_previous_data + 1),
            previous: number_of_previous_data,
        }
    }

    pub fn capacity(&self) -> usize {
        self.previous + 1
    }

    /// Append the newest step at the head, then evict from the tail.
    pub fn push(&mut self, values: ValueMap) {
        self.entries.push_front(values);
        self.entries.truncate(self.capacity());
    }

    /// Whether enough warm-up history has accumulated for Kriging.
    pub fn is_ready(&self) -> bool {
        self.previous == 0 || self.entries.len() > self.previous
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&ValueMap> {
        self.entries.front()
    }

    /// Entries, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &ValueMap> {
        self.entries.iter()
    }
}
