//! Undo/redo history with time-window coalescing

use doc_model::{Document, Range};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Maximum number of undo entries kept by default
pub const DEFAULT_MAX_ENTRIES: usize = 500;

/// Changes closer together than this are merged into one entry
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

/// Document contents and selection captured before a change
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub document: Document,
    pub selection: Option<Range>,
}

/// Bounded undo and redo stacks of snapshots
#[derive(Debug)]
pub struct History {
    /// States that can be restored by undo, oldest first
    undo_stack: VecDeque<Snapshot>,
    /// States that can be restored by redo
    redo_stack: Vec<Snapshot>,
    /// Maximum number of undo entries
    max_entries: usize,
    /// Coalescing window
    delay: Duration,
    /// Time of the most recent recorded change. Cleared by undo and redo so
    /// the next change always opens a fresh entry.
    last_recorded: Option<Instant>,
}

impl History {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_ENTRIES, DEFAULT_DELAY)
    }

    /// Create with custom limits
    pub fn with_limits(max_entries: usize, delay: Duration) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_entries: max_entries.max(1),
            delay,
            last_recorded: None,
        }
    }

    /// Record the state preceding a user change
    pub fn record(&mut self, before: Snapshot) {
        self.record_at(before, Instant::now());
    }

    /// Record with an explicit timestamp.
    ///
    /// A change inside the window of the previous one is folded into the
    /// existing entry: the entry keeps its older `before` state and the
    /// window slides forward to `now`.
    pub fn record_at(&mut self, before: Snapshot, now: Instant) {
        self.redo_stack.clear();

        if let Some(last) = self.last_recorded {
            if !self.undo_stack.is_empty() && now.saturating_duration_since(last) < self.delay {
                self.last_recorded = Some(now);
                return;
            }
        }

        self.undo_stack.push_back(before);
        self.last_recorded = Some(now);
        self.enforce_limit();
    }

    /// Step back: returns the state to restore and remembers `current` for redo
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo_stack.pop_back()?;
        self.redo_stack.push(current);
        self.last_recorded = None;
        Some(previous)
    }

    /// Step forward again after an undo
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push_back(current);
        self.enforce_limit();
        self.last_recorded = None;
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.last_recorded = None;
    }

    fn enforce_limit(&mut self) {
        while self.undo_stack.len() > self.max_entries {
            self.undo_stack.pop_front();
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
