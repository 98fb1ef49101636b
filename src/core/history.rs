use std::collections::VecDeque;
use std::sync::Arc;

use crate::score::ScoreState;

use super::emitter::now_ms;

/// Default number of retained snapshots.
pub const HISTORY_CAPACITY: usize = 50;

/// Snapshot of a prior state plus what was about to happen to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// State before the labelled action.
    pub state: Arc<ScoreState>,
    /// Human-readable action label.
    pub action: String,
    /// Creation timestamp in milliseconds.
    pub ts_ms: u64,
}

/// Bounded snapshot stack for single-step undo.
///
/// Oldest entries are evicted first once the capacity is reached.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryManager {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// A capacity of zero is treated as one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn checkpoint(&mut self, state: Arc<ScoreState>, action: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(HistoryEntry {
            state,
            action: action.into(),
            ts_ms: now_ms(),
        });
    }

    /// Pops the most recent snapshot.
    pub fn undo(&mut self) -> Option<HistoryEntry> {
        self.entries.pop_back()
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty()
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

    /// Label of the action the next undo reverts.
    pub fn last_action(&self) -> Option<&str> {
        self.entries.back().map(|e| e.action.as_str())
    }

    /// Entries oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
