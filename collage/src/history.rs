//! Bounded undo/redo history over full snapshots.
//!
//! DESIGN
//! ======
//! Each entry is a deep copy of the state, not a diff. The item collection is
//! small (tens of items) so copying is cheap next to the bookkeeping a diff
//! log would need. Undo and redo only move the cursor; the entry list changes
//! on commit, when everything after the cursor is dropped (a new edit after an
//! undo invalidates the redo branch) and the oldest entry falls off once the
//! depth limit is reached.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::VecDeque;

use crate::consts::MAX_HISTORY;

/// Snapshot history with a movable cursor.
#[derive(Debug, Clone)]
pub struct History<T: Clone> {
    entries: VecDeque<T>,
    index: usize,
    max_depth: usize,
}

impl<T: Clone> History<T> {
    /// Create a history seeded with `initial` at index 0 and the default depth.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self::with_depth(initial, MAX_HISTORY)
    }

    /// Create a history seeded with `initial` that retains at most `max_depth` entries.
    ///
    /// A depth of zero is treated as one.
    #[must_use]
    pub fn with_depth(initial: T, max_depth: usize) -> Self {
        let mut entries = VecDeque::with_capacity(max_depth.max(1));
        entries.push_back(initial);
        Self { entries, index: 0, max_depth: max_depth.max(1) }
    }

    /// Record a new snapshot after the current one.
    pub fn commit(&mut self, snapshot: T) {
        self.entries.truncate(self.index + 1);
        self.entries.push_back(snapshot);
        while self.entries.len() > self.max_depth {
            self.entries.pop_front();
        }
        self.index = self.entries.len() - 1;
    }

    /// Step back one snapshot and hand it to `apply`. Returns false at the oldest entry.
    pub fn undo<F: FnOnce(&T)>(&mut self, apply: F) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        if let Some(snapshot) = self.entries.get(self.index) {
            apply(snapshot);
        }
        true
    }

    /// Step forward one snapshot and hand it to `apply`. Returns false at the newest entry.
    pub fn redo<F: FnOnce(&T)>(&mut self, apply: F) -> bool {
        if self.index + 1 >= self.entries.len() {
            return false;
        }
        self.index += 1;
        if let Some(snapshot) = self.entries.get(self.index) {
            apply(snapshot);
        }
        true
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Number of retained snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: a history holds at least its seed entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of the current snapshot.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// The snapshot at the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&T> {
        self.entries.get(self.index)
    }

    /// Discard everything and start over from `initial`.
    pub fn reset(&mut self, initial: T) {
        self.entries.clear();
        self.entries.push_back(initial);
        self.index = 0;
    }
}
