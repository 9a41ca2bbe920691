//! Cursor / Selection Model
//!
//! Byte-offset caret and selection state plus the movement primitives the edit controller
//! composes: code-point steps, word steps, row start/end and the multi-click tracker.
//!
//! All primitives are pure functions over the buffer text and the [`RowIndex`], so they can be
//! tested without a controller.

use crate::rows::RowIndex;
use crate::wrap::{floor_char_boundary, next_char_boundary};
use std::ops::Range;
use std::time::Duration;

/// Default interval within which repeated clicks count as a multi-click.
pub const DEFAULT_DOUBLE_CLICK: Duration = Duration::from_millis(400);

/// Caret and selection, as byte offsets into the buffer.
///
/// `selection_start` is the anchor and `selection_end` the active end, which always equals
/// `cursor`. A collapsed selection (`start == end`) means "no selection".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EditState {
    /// Caret position.
    pub cursor: usize,
    /// Selection anchor.
    pub selection_start: usize,
    /// Selection active end.
    pub selection_end: usize,
    /// Horizontal pixel position remembered across consecutive vertical moves.
    pub preferred_x: Option<f32>,
}

impl EditState {
    /// Whether a non-empty selection exists.
    pub fn has_selection(&self) -> bool {
        self.selection_start != self.selection_end
    }

    /// Ordered selection range (empty when collapsed).
    pub fn selection_range(&self) -> Range<usize> {
        self.selection_start.min(self.selection_end)..self.selection_start.max(self.selection_end)
    }

    /// Place the caret at `offset` and drop any selection.
    pub fn collapse_to(&mut self, offset: usize) {
        self.cursor = offset;
        self.selection_start = offset;
        self.selection_end = offset;
    }

    /// Select from `anchor` to `active`, leaving the caret at `active`.
    pub fn select(&mut self, anchor: usize, active: usize) {
        self.selection_start = anchor;
        self.selection_end = active;
        self.cursor = active;
    }

    /// Move the active end to `offset`, keeping (or starting) the anchor at the caret.
    pub fn extend_to(&mut self, offset: usize) {
        if !self.has_selection() {
            self.selection_start = self.cursor;
        }
        self.selection_end = offset;
        self.cursor = offset;
    }

    /// Clamp every offset into `text` and onto `char` boundaries.
    pub fn clamp_to(&mut self, text: &str) {
        self.cursor = floor_char_boundary(text, self.cursor);
        self.selection_start = floor_char_boundary(text, self.selection_start);
        self.selection_end = floor_char_boundary(text, self.selection_end);
    }
}

/// Character classes used for word motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// ASCII punctuation.
    Separator,
    /// Whitespace, including newlines.
    Space,
    /// Everything else.
    Other,
}

/// Classify a character for word motion.
pub fn classify(ch: char) -> CharClass {
    if ch.is_whitespace() {
        CharClass::Space
    } else if ch.is_ascii_punctuation() {
        CharClass::Separator
    } else {
        CharClass::Other
    }
}

fn char_at(text: &str, offset: usize) -> Option<char> {
    text.get(offset..)?.chars().next()
}

fn char_before(text: &str, offset: usize) -> Option<char> {
    text.get(..offset)?.chars().next_back()
}

/// Offset of the previous code point.
pub fn prev_char(text: &str, offset: usize) -> usize {
    let offset = floor_char_boundary(text, offset);
    char_before(text, offset).map_or(0, |ch| offset - ch.len_utf8())
}

/// Offset of the next code point.
pub fn next_char(text: &str, offset: usize) -> usize {
    next_char_boundary(text, floor_char_boundary(text, offset))
}

fn is_word_boundary(text: &str, offset: usize) -> bool {
    let Some(current) = char_at(text, offset).map(classify) else {
        return true;
    };
    match char_before(text, offset).map(classify) {
        None => true,
        Some(before) => current != CharClass::Space && current != before,
    }
}

/// Next word boundary after `offset` (or the end of the text).
pub fn word_right(text: &str, offset: usize) -> usize {
    let mut pos = next_char(text, offset);
    while pos < text.len() && !is_word_boundary(text, pos) {
        pos = next_char(text, pos);
    }
    pos
}

/// Previous word boundary before `offset` (or 0).
pub fn word_left(text: &str, offset: usize) -> usize {
    let mut pos = prev_char(text, offset);
    while pos > 0 && !is_word_boundary(text, pos) {
        pos = prev_char(text, pos);
    }
    pos
}

/// Start of the row containing `offset`.
pub fn line_start(rows: &RowIndex, offset: usize) -> usize {
    rows.row_start(rows.row_at_offset(offset))
}

/// End of the row containing `offset`.
///
/// A row ending in a hard newline stops before the newline. A soft-wrapped row stops before
/// its final code point, since the offset at the wrap break already belongs to the next row.
pub fn line_end(text: &str, rows: &RowIndex, offset: usize) -> usize {
    row_content(text, rows, rows.row_at_offset(offset)).end
}

/// The part of `row` a caret can be placed in by pointing or vertical motion.
///
/// Excludes a trailing newline, and for soft-wrapped rows the final code point: the offset
/// at the row end belongs to the next row.
pub fn row_content(text: &str, rows: &RowIndex, row: usize) -> Range<usize> {
    let range = rows.row_range(row);
    if range.is_empty() {
        return range;
    }
    let end = if text.as_bytes().get(range.end - 1) == Some(&b'\n') {
        range.end - 1
    } else if row + 1 < rows.len() {
        prev_char(text, range.end).max(range.start)
    } else {
        range.end
    };
    range.start..end
}

/// The run of same-class characters around `offset`.
pub fn word_range_at(text: &str, offset: usize) -> Range<usize> {
    let offset = floor_char_boundary(text, offset);
    let probe = if offset == text.len() || char_at(text, offset) == Some('\n') {
        prev_char(text, offset)
    } else {
        offset
    };
    let Some(class) = char_at(text, probe).map(classify) else {
        return offset..offset;
    };
    if char_at(text, probe) == Some('\n') {
        return offset..offset;
    }

    let mut start = probe;
    while let Some(ch) = char_before(text, start) {
        if ch == '\n' || classify(ch) != class {
            break;
        }
        start -= ch.len_utf8();
    }
    let mut end = probe;
    while let Some(ch) = char_at(text, end) {
        if ch == '\n' || classify(ch) != class {
            break;
        }
        end += ch.len_utf8();
    }
    start..end
}

/// The logical line (between hard newlines) around `offset`, without its newline.
pub fn paragraph_range_at(text: &str, offset: usize) -> Range<usize> {
    let offset = floor_char_boundary(text, offset);
    let start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    let end = text[offset..].find('\n').map_or(text.len(), |i| offset + i);
    start..end
}

/// Granularity a click selects at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionScope {
    /// Single click: place the caret.
    Char,
    /// Double click: select a word.
    Word,
    /// Triple click: select a line.
    Line,
}

/// Counts repeated clicks at the same offset within the double-click window.
#[derive(Debug, Clone)]
pub struct ClickTracker {
    window: Duration,
    last: Option<(Duration, usize)>,
    count: u32,
}

impl ClickTracker {
    /// Create a tracker with the given double-click window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last: None,
            count: 0,
        }
    }

    /// Register a click at `offset` and return the scope it selects.
    pub fn register(&mut self, now: Duration, offset: usize) -> SelectionScope {
        let repeated = self.last.is_some_and(|(at, last_offset)| {
            last_offset == offset && now.saturating_sub(at) <= self.window
        });
        self.count = if repeated { self.count + 1 } else { 1 };
        self.last = Some((now, offset));
        match self.count {
            1 => SelectionScope::Char,
            2 => SelectionScope::Word,
            _ => SelectionScope::Line,
        }
    }

    /// Forget the previous click.
    pub fn reset(&mut self) {
        self.last = None;
        self.count = 0;
    }
}

impl Default for ClickTracker {
    fn default() -> Self {
        Self::new(DEFAULT_DOUBLE_CLICK)
    }
}
