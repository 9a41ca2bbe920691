//! Undo / Redo Log
//!
//! Two stacks of structured records. Each record is `{op, offset, len, payload}` where the
//! payload holds removed bytes only: an insert can always be re-read from the live buffer.
//!
//! Consecutive same-kind edits merge into one record when they are contiguous and arrive within
//! the merge window, so a burst of typing or backspacing undoes in one step.
//!
//! The log can be bounded by a byte budget. Each record costs [`ENTRY_HEADER_BYTES`] plus its
//! payload; when the budget is exceeded the oldest records are discarded, and a record that
//! cannot fit even into an empty log clears it and is dropped. The edit itself is never
//! refused because of the log.

use crate::buffer::TextBuffer;
use std::time::Duration;

/// Accounted size of a record header.
pub const ENTRY_HEADER_BYTES: usize = 16;

/// Default merge (debounce) window.
pub const DEFAULT_MERGE_WINDOW: Duration = Duration::from_millis(500);

/// Kind of a recorded edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOp {
    /// `len` bytes were inserted at `offset`.
    Insert,
    /// `payload` was removed from `offset`.
    Delete,
    /// `payload` at `offset` was replaced by `len` live bytes.
    Replace,
}

/// One journal record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoEntry {
    /// Edit kind.
    pub op: UndoOp,
    /// Byte offset of the edit.
    pub offset: usize,
    /// Live bytes produced by the edit (Insert/Replace), or removed bytes (Delete).
    pub len: usize,
    /// Removed bytes (Delete/Replace).
    pub payload: Vec<u8>,
}

impl UndoEntry {
    /// Record of an insert.
    pub fn insert(offset: usize, len: usize) -> Self {
        Self {
            op: UndoOp::Insert,
            offset,
            len,
            payload: Vec::new(),
        }
    }

    /// Record of a delete.
    pub fn delete(offset: usize, removed: Vec<u8>) -> Self {
        Self {
            op: UndoOp::Delete,
            offset,
            len: removed.len(),
            payload: removed,
        }
    }

    /// Record of a same-position delete followed by an insert of `len` bytes.
    pub fn replace(offset: usize, len: usize, removed: Vec<u8>) -> Self {
        Self {
            op: UndoOp::Replace,
            offset,
            len,
            payload: removed,
        }
    }

    /// Accounted size of this record.
    pub fn cost(&self) -> usize {
        ENTRY_HEADER_BYTES + self.payload.len()
    }

    fn try_merge(&mut self, next: &UndoEntry) -> bool {
        if self.op != next.op {
            return false;
        }
        match self.op {
            UndoOp::Insert if next.offset == self.offset + self.len => {
                self.len += next.len;
                true
            }
            UndoOp::Replace if next.offset == self.offset + self.len => {
                self.len += next.len;
                self.payload.extend_from_slice(&next.payload);
                true
            }
            UndoOp::Delete if next.offset + next.len == self.offset => {
                // Backspace: the new range sits right before the previous one.
                let mut payload = next.payload.clone();
                payload.extend_from_slice(&self.payload);
                self.payload = payload;
                self.offset = next.offset;
                self.len += next.len;
                true
            }
            UndoOp::Delete if next.offset == self.offset => {
                // Forward delete: the text after the previous range slid into place.
                self.payload.extend_from_slice(&next.payload);
                self.len += next.len;
                true
            }
            _ => false,
        }
    }
}

/// Size policy of the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoBudget {
    /// Grows without limit.
    Unbounded,
    /// Nothing is recorded.
    Disabled,
    /// At most this many accounted bytes across both stacks.
    Fixed(usize),
}

impl UndoBudget {
    /// Map a configured byte limit: `None` is unbounded and `Some(0)` disables the log.
    pub fn from_limit(limit: Option<usize>) -> Self {
        match limit {
            None => Self::Unbounded,
            Some(0) => Self::Disabled,
            Some(n) => Self::Fixed(n),
        }
    }
}

/// Result of applying one undo or redo step to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    /// Byte offset of the change.
    pub offset: usize,
    /// Bytes removed from the buffer.
    pub removed: usize,
    /// Bytes inserted into the buffer.
    pub inserted: usize,
    /// Where the caret goes afterwards.
    pub cursor: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Undo,
    Redo,
}

/// Undo/redo journal.
#[derive(Debug, Clone)]
pub struct UndoLog {
    undo_stack: Vec<UndoEntry>,
    redo_stack: Vec<UndoEntry>,
    budget: UndoBudget,
    merge_window: Duration,
    last_record: Option<Duration>,
    merge_open: bool,
}

impl UndoLog {
    /// Create a log with the given budget and merge window.
    pub fn new(budget: UndoBudget, merge_window: Duration) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            budget,
            merge_window,
            last_record: None,
            merge_open: false,
        }
    }

    /// Size policy.
    pub fn budget(&self) -> UndoBudget {
        self.budget
    }

    /// Can undo
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Can redo
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undo records.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of redo records.
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Most recent undo record.
    pub fn last(&self) -> Option<&UndoEntry> {
        self.undo_stack.last()
    }

    /// Accounted bytes across both stacks.
    pub fn used_bytes(&self) -> usize {
        self.undo_stack
            .iter()
            .chain(self.redo_stack.iter())
            .map(UndoEntry::cost)
            .sum()
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.merge_open = false;
    }

    /// Force the next record to start a new undo step.
    pub fn break_merge(&mut self) {
        self.merge_open = false;
    }

    /// Record an accepted edit made at time `now`. Returns `false` when nothing was kept.
    pub fn record(&mut self, entry: UndoEntry, now: Duration) -> bool {
        if self.budget == UndoBudget::Disabled {
            return false;
        }

        self.redo_stack.clear();

        let within_window = self
            .last_record
            .is_some_and(|at| now.saturating_sub(at) <= self.merge_window);
        let merged = self.merge_open
            && within_window
            && self
                .undo_stack
                .last_mut()
                .is_some_and(|top| top.try_merge(&entry));
        if !merged {
            self.undo_stack.push(entry);
        }
        self.last_record = Some(now);
        self.merge_open = true;

        self.enforce_budget()
    }

    /// Revert the most recent undo record. `None` when there is nothing to undo.
    pub fn undo(&mut self, buffer: &mut TextBuffer<'_>) -> Option<Applied> {
        self.merge_open = false;
        let entry = self.undo_stack.pop()?;
        match revert(entry, buffer, Direction::Undo) {
            Ok((applied, moved)) => {
                self.redo_stack.push(moved);
                self.enforce_budget();
                Some(applied)
            }
            Err(entry) => {
                self.undo_stack.push(entry);
                None
            }
        }
    }

    /// Re-apply the most recently undone record. `None` when there is nothing to redo.
    pub fn redo(&mut self, buffer: &mut TextBuffer<'_>) -> Option<Applied> {
        self.merge_open = false;
        let entry = self.redo_stack.pop()?;
        match revert(entry, buffer, Direction::Redo) {
            Ok((applied, moved)) => {
                self.undo_stack.push(moved);
                self.enforce_budget();
                Some(applied)
            }
            Err(entry) => {
                self.redo_stack.push(entry);
                None
            }
        }
    }

    /// Evict oldest records until the log fits. Returns `false` if the log had to be cleared.
    fn enforce_budget(&mut self) -> bool {
        let UndoBudget::Fixed(limit) = self.budget else {
            return true;
        };

        let newest_cost = self
            .undo_stack
            .last()
            .into_iter()
            .chain(self.redo_stack.last())
            .map(UndoEntry::cost)
            .max()
            .unwrap_or(0);
        if newest_cost > limit {
            tracing::debug!(cost = newest_cost, limit, "undo record exceeds budget, log cleared");
            self.clear();
            return false;
        }

        let mut used = self.used_bytes();
        while used > limit {
            let evicted = if self.undo_stack.len() > 1 {
                self.undo_stack.remove(0)
            } else if self.redo_stack.len() > 1 {
                self.redo_stack.remove(0)
            } else {
                // One record per stack left and both together are too big: keep the undo side.
                match self.redo_stack.pop() {
                    Some(entry) => entry,
                    None => break,
                }
            };
            used -= evicted.cost();
            tracing::trace!(op = ?evicted.op, cost = evicted.cost(), "evicted oldest undo record");
        }
        true
    }
}

impl Default for UndoLog {
    fn default() -> Self {
        Self::new(UndoBudget::Unbounded, DEFAULT_MERGE_WINDOW)
    }
}

/// Apply the inverse of `entry` to `buffer` and return the record for the opposite stack.
///
/// On failure the buffer is unchanged and the entry is handed back.
fn revert(
    entry: UndoEntry,
    buffer: &mut TextBuffer<'_>,
    direction: Direction,
) -> Result<(Applied, UndoEntry), UndoEntry> {
    let offset = entry.offset;
    match entry.op {
        UndoOp::Insert => {
            let removed = buffer.slice(offset..offset + entry.len).to_vec();
            if removed.len() != entry.len || !buffer.delete(offset, entry.len) {
                return Err(entry);
            }
            let applied = Applied {
                offset,
                removed: entry.len,
                inserted: 0,
                cursor: offset,
            };
            Ok((applied, UndoEntry::delete(offset, removed)))
        }
        UndoOp::Delete => {
            if !buffer.insert(offset, &entry.payload) {
                return Err(entry);
            }
            let inserted = entry.payload.len();
            let cursor = match direction {
                Direction::Undo => offset,
                Direction::Redo => offset + inserted,
            };
            let applied = Applied {
                offset,
                removed: 0,
                inserted,
                cursor,
            };
            Ok((applied, UndoEntry::insert(offset, inserted)))
        }
        UndoOp::Replace => {
            let current = buffer.slice(offset..offset + entry.len).to_vec();
            if current.len() != entry.len || !buffer.delete(offset, entry.len) {
                return Err(entry);
            }
            if !buffer.insert(offset, &entry.payload) {
                buffer.insert(offset, &current);
                return Err(entry);
            }
            let inserted = entry.payload.len();
            let applied = Applied {
                offset,
                removed: current.len(),
                inserted,
                cursor: offset + inserted,
            };
            Ok((applied, UndoEntry::replace(offset, inserted, current)))
        }
    }
}
