//! Edit Controller
//!
//! [`TextField`] is the public surface of the crate. It owns the buffer, the row index, the
//! caret/selection state, the undo log and the optional numeric adapter, and keeps them
//! consistent across every input event.
//!
//! # Mutation contract
//!
//! - Every mutation either fully succeeds (buffer, rows and undo log updated together) or
//!   returns `false` and changes nothing.
//! - A mutation that starts with a non-empty selection first deletes it (one Delete undo
//!   record) and then continues from the collapsed caret.
//! - Change notifications are queued and only delivered by
//!   [`flush_notifications`](TextField::flush_notifications), after the structures are
//!   consistent.
//!
//! # Time
//!
//! The field never reads a clock. Calls where time matters take `now`, the host's monotonic
//! time since some fixed start. Scheduled actions are exposed through
//! [`next_deadline`](TextField::next_deadline) and [`fire_due`](TextField::fire_due).
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use textfield_core::{FieldConfig, MemoryClipboard, MonospaceMetrics, TextField};
//!
//! let mut field =
//!     TextField::new(FieldConfig::multi_line(), MonospaceMetrics::unit(), MemoryClipboard::new())
//!         .unwrap();
//! field.set_viewport(5.0, 10.0);
//!
//! let now = Duration::ZERO;
//! field.insert_text("Hello World", now);
//! assert_eq!(field.row_count(), 2);
//!
//! field.undo();
//! assert_eq!(field.text(), "");
//! ```

use crate::buffer::TextBuffer;
use crate::config::{CaretStyle, EditKind, FieldConfig, NotifyMode, TabMode};
use crate::cursor::{self, ClickTracker, EditState, SelectionScope};
use crate::error::ConfigError;
use crate::history::{Applied, UndoEntry, UndoLog};
use crate::host::{ChangeCallback, ChangePayload, Clipboard, ColorClassifier, FieldStats};
use crate::metrics::{GlyphMetrics, LineMetrics};
use crate::numeric::{NumericAdapter, SPIN_INITIAL_DELAY, SPIN_REPEAT_INTERVAL, SpinDirection};
use crate::rows::RowIndex;
use crate::timers::{AUTO_SCROLL_INTERVAL, CARET_BLINK_INTERVAL, TimerAction, TimerKind, TimerSet};
use crate::wrap::{WrapEngine, WrapMode, floor_char_boundary};
use std::borrow::Cow;
use std::ops::Range;
use std::time::Duration;
use unicode_segmentation::UnicodeSegmentation;

/// Character shown for each grapheme of a password.
pub const PASSWORD_MASK: char = '\u{2022}';

/// Controller state as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    /// Nothing pending.
    Idle,
    /// A change is queued for [`TextField::flush_notifications`].
    PendingNotify,
    /// A pointer button is held on the text surface.
    DraggingSelection,
    /// Dragging outside the viewport; the auto-scroll action is armed.
    AutoScrolling,
}

/// Keys the controller interprets. Printable input arrives as [`Key::Char`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A typed character.
    Char(char),
    /// Delete backward.
    Backspace,
    /// Delete forward.
    Delete,
    /// Newline, or commit in single-line fields.
    Enter,
    /// Tab.
    Tab,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Home.
    Home,
    /// End.
    End,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
    /// Toggle overwrite mode.
    Insert,
}

/// Modifier keys held during a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Shift: extend the selection.
    pub shift: bool,
    /// Control (Command on macOS hosts): word motion and shortcuts.
    pub ctrl: bool,
}

impl Modifiers {
    /// No modifiers.
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
    };
    /// Shift only.
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
    };
    /// Control only.
    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
    };
    /// Control and Shift.
    pub const CTRL_SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: true,
    };
}

/// Caret motions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// One code point left.
    Left,
    /// One code point right.
    Right,
    /// Previous word boundary.
    WordLeft,
    /// Next word boundary.
    WordRight,
    /// Start of the current row.
    LineStart,
    /// End of the current row.
    LineEnd,
    /// One row up.
    Up,
    /// One row down.
    Down,
    /// One viewport up.
    PageUp,
    /// One viewport down.
    PageDown,
    /// Start of the text.
    DocumentStart,
    /// End of the text.
    DocumentEnd,
}

/// Scroll position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollState {
    /// First visible row.
    pub top_row: usize,
    /// Byte offset of the first visible row.
    pub top_byte_offset: usize,
    /// Horizontal scroll in pixels.
    pub horizontal_offset_px: f32,
}

#[derive(Debug, Clone)]
struct DragState {
    /// Unit selected by the initial press.
    anchor: Range<usize>,
    scope: SelectionScope,
    pointer: (f32, f32),
    auto_scrolling: bool,
}

/// A headless editable text field.
pub struct TextField<'a> {
    config: FieldConfig,
    buffer: TextBuffer<'a>,
    rows: RowIndex,
    wrap: WrapEngine,
    metrics: Box<dyn GlyphMetrics + 'a>,
    clipboard: Box<dyn Clipboard + 'a>,
    classifier: Option<Box<dyn ColorClassifier + 'a>>,
    edit: EditState,
    scroll: ScrollState,
    viewport: (f32, f32),
    history: UndoLog,
    numeric: Option<NumericAdapter>,
    spin_origin: Option<Vec<u8>>,
    timers: TimerSet,
    clicks: ClickTracker,
    drag: Option<DragState>,
    callbacks: Vec<ChangeCallback>,
    pending: bool,
    overwrite: bool,
    focused: bool,
    caret_on: bool,
    now: Duration,
}

impl std::fmt::Debug for TextField<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextField")
            .field("kind", &self.config.kind)
            .field("buffer", &self.buffer)
            .field("rows", &self.rows.len())
            .field("edit", &self.edit)
            .field("state", &self.state())
            .finish()
    }
}

impl<'a> TextField<'a> {
    /// Create an empty field with dynamic storage.
    pub fn new(
        config: FieldConfig,
        metrics: impl GlyphMetrics + 'a,
        clipboard: impl Clipboard + 'a,
    ) -> Result<Self, ConfigError> {
        Self::build(
            config,
            TextBuffer::new(),
            Box::new(metrics),
            Box::new(clipboard),
        )
    }

    /// Create a field editing caller-owned storage in place. The first `initial_len` bytes are
    /// the initial text. The field never grows past `storage.len()`.
    pub fn with_fixed_buffer(
        config: FieldConfig,
        storage: &'a mut [u8],
        initial_len: usize,
        metrics: impl GlyphMetrics + 'a,
        clipboard: impl Clipboard + 'a,
    ) -> Result<Self, ConfigError> {
        let capacity = storage.len();
        let too_large = ConfigError::InitialTextTooLarge {
            len: initial_len,
            capacity,
        };
        if initial_len > capacity {
            return Err(too_large);
        }
        if let Err(err) = std::str::from_utf8(&storage[..initial_len]) {
            return Err(ConfigError::InitialTextNotUtf8(err.valid_up_to()));
        }
        let buffer = TextBuffer::fixed(storage, initial_len).ok_or(too_large)?;
        Self::build(config, buffer, Box::new(metrics), Box::new(clipboard))
    }

    fn build(
        config: FieldConfig,
        buffer: TextBuffer<'a>,
        metrics: Box<dyn GlyphMetrics + 'a>,
        clipboard: Box<dyn Clipboard + 'a>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let tab_width = metrics.text_width(" ") * config.tab_size as f32;
        let wrap = WrapEngine::new(config.effective_wrap_mode(), 0.0, tab_width);
        let rows = RowIndex::from_rows(wrap.layout(buffer.as_str(), &*metrics));
        let limit = config.row_limit();
        if limit > 0 && rows.len() > limit {
            return Err(ConfigError::InitialTextExceedsRows {
                rows: rows.len(),
                limit,
            });
        }
        let numeric = config.kind.numeric_kind().map(|kind| {
            let mut adapter = NumericAdapter::new(kind, config.numeric.clone());
            adapter.invalidate();
            adapter
        });
        let history = UndoLog::new(config.undo_budget(), config.merge_window());
        let clicks = ClickTracker::new(config.double_click_window());

        tracing::debug!(
            kind = ?config.kind,
            len = buffer.len(),
            fixed = buffer.is_fixed(),
            "text field created"
        );

        Ok(Self {
            config,
            buffer,
            rows,
            wrap,
            metrics,
            clipboard,
            classifier: None,
            edit: EditState::default(),
            scroll: ScrollState::default(),
            viewport: (0.0, 0.0),
            history,
            numeric,
            spin_origin: None,
            timers: TimerSet::new(),
            clicks,
            drag: None,
            callbacks: Vec::new(),
            pending: false,
            overwrite: false,
            focused: false,
            caret_on: false,
            now: Duration::ZERO,
        })
    }

    // ------------------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------------------

    /// Configuration the field was built with.
    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Current text.
    pub fn text(&self) -> &str {
        self.buffer.as_str()
    }

    /// Current length in bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the text is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Buffer capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Text to render: masked for passwords, or the placeholder when empty and unfocused.
    pub fn display_text(&self) -> Cow<'_, str> {
        let text = self.buffer.as_str();
        if self.is_showing_placeholder() {
            return Cow::Borrowed(&self.config.placeholder);
        }
        if self.config.kind == EditKind::Password {
            let count = text.graphemes(true).count();
            return Cow::Owned(std::iter::repeat_n(PASSWORD_MASK, count).collect());
        }
        Cow::Borrowed(text)
    }

    /// Whether [`display_text`](Self::display_text) currently returns the placeholder.
    pub fn is_showing_placeholder(&self) -> bool {
        self.buffer.is_empty() && !self.focused && !self.config.placeholder.is_empty()
    }

    /// Selected text (empty without a selection).
    pub fn selected_text(&self) -> &str {
        let range = self.edit.selection_range();
        self.buffer.as_str().get(range).unwrap_or_default()
    }

    /// Row index.
    pub fn rows(&self) -> &RowIndex {
        &self.rows
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Text of `row`, including its newline.
    pub fn row_text(&self, row: usize) -> &str {
        let range = self.rows.row_range(row);
        self.buffer.as_str().get(range).unwrap_or_default()
    }

    /// Caret and selection.
    pub fn edit_state(&self) -> &EditState {
        &self.edit
    }

    /// Caret offset.
    pub fn cursor(&self) -> usize {
        self.edit.cursor
    }

    /// Ordered selection range.
    pub fn selection(&self) -> Range<usize> {
        self.edit.selection_range()
    }

    /// Scroll position.
    pub fn scroll(&self) -> ScrollState {
        self.scroll
    }

    /// Undo log.
    pub fn history(&self) -> &UndoLog {
        &self.history
    }

    /// Number of undo steps.
    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    /// Number of redo steps.
    pub fn redo_depth(&self) -> usize {
        self.history.redo_depth()
    }

    /// Whether overwrite mode is on.
    pub fn is_overwrite(&self) -> bool {
        self.overwrite
    }

    /// Whether the field has focus.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Caret shape.
    pub fn caret_style(&self) -> CaretStyle {
        self.config.caret.style
    }

    /// Vertical metrics of one row.
    pub fn line_metrics(&self) -> LineMetrics {
        self.metrics.line_metrics()
    }

    /// Caret position relative to the viewport origin (top of the caret's row).
    pub fn caret_position(&self) -> (f32, f32) {
        let row = self.rows.row_at_offset(self.edit.cursor);
        let x = self.caret_x(self.edit.cursor) - self.scroll.horizontal_offset_px;
        let y = (row as f32 - self.scroll.top_row as f32) * self.line_height();
        (x, y)
    }

    /// Controller state.
    pub fn state(&self) -> FieldState {
        match &self.drag {
            Some(drag) if drag.auto_scrolling => FieldState::AutoScrolling,
            Some(_) => FieldState::DraggingSelection,
            None if self.pending => FieldState::PendingNotify,
            None => FieldState::Idle,
        }
    }

    /// Compact stats record.
    pub fn stats(&self) -> FieldStats {
        let text = self.buffer.as_str();
        let cursor = self.edit.cursor;
        let row = self.rows.row_at_offset(cursor);
        let start = self.rows.row_start(row).min(cursor);
        FieldStats {
            cursor_byte: cursor,
            cursor_row: row,
            cursor_col: text.get(start..cursor).map_or(0, |s| s.chars().count()),
            total_rows: self.rows.len(),
            total_bytes: self.buffer.len(),
            pending_undo_count: self.history.undo_depth(),
        }
    }

    // ------------------------------------------------------------------------------------
    // Text mutation
    // ------------------------------------------------------------------------------------

    /// Replace the whole text programmatically. Records one undo step and queues a change.
    ///
    /// Bounded fields keep the longest prefix that fits. Returns `false` when a fixed buffer
    /// is too small.
    pub fn set_text(&mut self, text: &str) -> bool {
        let text = normalize_newlines(text);
        self.replace_all(&text, true)
    }

    /// Type `text` at the caret, honoring overwrite mode.
    pub fn insert_text(&mut self, text: &str, now: Duration) -> bool {
        self.touch(now);
        let overwrite = self.overwrite;
        self.insert_filtered(text, now, overwrite)
    }

    /// Insert the clipboard text at the caret as its own undo step.
    pub fn paste(&mut self, now: Duration) -> bool {
        if self.config.read_only {
            return false;
        }
        let Some(text) = self.clipboard.get_text() else {
            return false;
        };
        self.touch(now);
        self.history.break_merge();
        let inserted = self.insert_filtered(&text, now, false);
        self.history.break_merge();
        inserted
    }

    /// Copy the selection to the clipboard. Password fields never copy.
    pub fn copy(&mut self) -> bool {
        if self.config.kind == EditKind::Password || !self.edit.has_selection() {
            return false;
        }
        let range = self.edit.selection_range();
        let Some(text) = self.buffer.as_str().get(range) else {
            return false;
        };
        self.clipboard.set_text(text)
    }

    /// Copy the selection to the clipboard and delete it.
    pub fn cut(&mut self, now: Duration) -> bool {
        if self.config.read_only || !self.copy() {
            return false;
        }
        self.touch(now);
        self.history.break_merge();
        let range = self.edit.selection_range();
        let deleted = self.delete_range(range, now);
        self.history.break_merge();
        deleted
    }

    /// Delete the selection, or the code point before the caret.
    pub fn delete_backward(&mut self, now: Duration) -> bool {
        self.touch(now);
        if self.edit.has_selection() {
            return self.delete_selection(now);
        }
        let cursor = self.edit.cursor;
        let start = cursor::prev_char(self.buffer.as_str(), cursor);
        self.delete_range(start..cursor, now)
    }

    /// Delete the selection, or the code point after the caret.
    pub fn delete_forward(&mut self, now: Duration) -> bool {
        self.touch(now);
        if self.edit.has_selection() {
            return self.delete_selection(now);
        }
        let cursor = self.edit.cursor;
        let end = cursor::next_char(self.buffer.as_str(), cursor);
        self.delete_range(cursor..end, now)
    }

    /// Delete the selection, or back to the previous word boundary.
    pub fn delete_word_backward(&mut self, now: Duration) -> bool {
        self.touch(now);
        if self.edit.has_selection() {
            return self.delete_selection(now);
        }
        let cursor = self.edit.cursor;
        let start = cursor::word_left(self.buffer.as_str(), cursor);
        self.delete_range(start..cursor, now)
    }

    /// Delete the selection, or up to the next word boundary.
    pub fn delete_word_forward(&mut self, now: Duration) -> bool {
        self.touch(now);
        if self.edit.has_selection() {
            return self.delete_selection(now);
        }
        let cursor = self.edit.cursor;
        let end = cursor::word_right(self.buffer.as_str(), cursor);
        self.delete_range(cursor..end, now)
    }

    /// Revert the last undo step. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        if self.config.read_only {
            return false;
        }
        self.finish_spin();
        let Some(applied) = self.history.undo(&mut self.buffer) else {
            return false;
        };
        self.apply_history(applied);
        true
    }

    /// Re-apply the last undone step. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        if self.config.read_only {
            return false;
        }
        self.finish_spin();
        let Some(applied) = self.history.redo(&mut self.buffer) else {
            return false;
        };
        self.apply_history(applied);
        true
    }

    /// Toggle overwrite mode. Returns the new mode.
    pub fn toggle_overwrite(&mut self) -> bool {
        self.overwrite = !self.overwrite;
        self.overwrite
    }

    // ------------------------------------------------------------------------------------
    // Keyboard
    // ------------------------------------------------------------------------------------

    /// Handle a key press. Returns `true` when the key was consumed.
    pub fn key_press(&mut self, key: Key, modifiers: Modifiers, now: Duration) -> bool {
        self.touch(now);
        let extend = modifiers.shift;
        let ctrl = modifiers.ctrl;
        let numeric = self.numeric.is_some();

        match key {
            Key::Char(ch) if ctrl => match ch.to_ascii_lowercase() {
                'a' => {
                    self.select_all();
                    true
                }
                'c' => self.copy(),
                'x' => self.cut(now),
                'v' => self.paste(now),
                'z' if extend => self.redo(),
                'z' => self.undo(),
                'y' => self.redo(),
                _ => false,
            },
            Key::Char(ch) => {
                let mut encoded = [0u8; 4];
                self.insert_text(ch.encode_utf8(&mut encoded), now)
            }
            Key::Backspace if ctrl => self.delete_word_backward(now),
            Key::Backspace => self.delete_backward(now),
            Key::Delete if ctrl => self.delete_word_forward(now),
            Key::Delete => self.delete_forward(now),
            Key::Enter if numeric => {
                self.commit_numeric();
                true
            }
            Key::Enter if self.config.is_single_line() => false,
            Key::Enter => self.insert_filtered("\n", now, false),
            Key::Tab if self.config.tab_mode == TabMode::Forbid => false,
            Key::Tab => self.insert_filtered("\t", now, false),
            Key::Insert => {
                self.toggle_overwrite();
                true
            }
            Key::Up if numeric && !ctrl => self.step_once(SpinDirection::Up, now),
            Key::Down if numeric && !ctrl => self.step_once(SpinDirection::Down, now),
            Key::Left if ctrl => self.move_cursor(Motion::WordLeft, extend),
            Key::Left => self.move_cursor(Motion::Left, extend),
            Key::Right if ctrl => self.move_cursor(Motion::WordRight, extend),
            Key::Right => self.move_cursor(Motion::Right, extend),
            Key::Up => self.move_cursor(Motion::Up, extend),
            Key::Down => self.move_cursor(Motion::Down, extend),
            Key::Home if ctrl => self.move_cursor(Motion::DocumentStart, extend),
            Key::Home => self.move_cursor(Motion::LineStart, extend),
            Key::End if ctrl => self.move_cursor(Motion::DocumentEnd, extend),
            Key::End => self.move_cursor(Motion::LineEnd, extend),
            Key::PageUp => self.move_cursor(Motion::PageUp, extend),
            Key::PageDown => self.move_cursor(Motion::PageDown, extend),
        }
    }

    // ------------------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------------------

    /// Move the caret, extending the selection if `extend`. Returns whether anything moved.
    pub fn move_cursor(&mut self, motion: Motion, extend: bool) -> bool {
        let before = self.edit;

        match motion {
            Motion::Up => self.move_vertical(-1, extend),
            Motion::Down => self.move_vertical(1, extend),
            Motion::PageUp => self.move_vertical(-(self.page_rows() as isize), extend),
            Motion::PageDown => self.move_vertical(self.page_rows() as isize, extend),
            _ => {
                let text = self.buffer.as_str();
                let cursor = self.edit.cursor;
                let selection = self.edit.selection_range();
                let collapse = !extend && self.edit.has_selection();
                let target = match motion {
                    Motion::Left if collapse => selection.start,
                    Motion::Right if collapse => selection.end,
                    Motion::Left => cursor::prev_char(text, cursor),
                    Motion::Right => cursor::next_char(text, cursor),
                    Motion::WordLeft => cursor::word_left(text, cursor),
                    Motion::WordRight => cursor::word_right(text, cursor),
                    Motion::LineStart => cursor::line_start(&self.rows, cursor),
                    Motion::LineEnd => cursor::line_end(text, &self.rows, cursor),
                    Motion::DocumentStart => 0,
                    _ => text.len(),
                };
                self.place_caret(target, extend);
                self.edit.preferred_x = None;
            }
        }

        self.scroll_to_caret();
        let moved = self.edit.cursor != before.cursor
            || self.edit.selection_range() != before.selection_range();
        if moved {
            self.caret_moved();
        }
        moved
    }

    /// Place the caret at `offset` (clamped and snapped to a code point boundary).
    pub fn set_cursor(&mut self, offset: usize) {
        let offset = floor_char_boundary(self.buffer.as_str(), offset);
        self.edit.collapse_to(offset);
        self.edit.preferred_x = None;
        self.scroll_to_caret();
        self.caret_moved();
    }

    /// Select from `anchor` to `active` (clamped and snapped). The caret goes to `active`.
    pub fn set_selection(&mut self, anchor: usize, active: usize) {
        let text = self.buffer.as_str();
        let anchor = floor_char_boundary(text, anchor);
        let active = floor_char_boundary(text, active);
        self.edit.select(anchor, active);
        self.edit.preferred_x = None;
        self.scroll_to_caret();
        self.caret_moved();
    }

    /// Select the whole text.
    pub fn select_all(&mut self) {
        let len = self.buffer.len();
        self.set_selection(0, len);
    }

    // ------------------------------------------------------------------------------------
    // Pointer
    // ------------------------------------------------------------------------------------

    /// Button press at viewport position `(x, y)`. Repeated presses at the same place within
    /// the double-click window select a word, then a line.
    pub fn mouse_press(&mut self, x: f32, y: f32, shift: bool, now: Duration) -> bool {
        self.touch(now);
        let offset = self.offset_at_point(x, y);

        let (scope, anchor) = if shift {
            self.clicks.reset();
            let anchor = if self.edit.has_selection() {
                self.edit.selection_start
            } else {
                self.edit.cursor
            };
            self.edit.select(anchor, offset);
            (SelectionScope::Char, anchor..anchor)
        } else {
            let scope = self.clicks.register(now, offset);
            let text = self.buffer.as_str();
            let range = match scope {
                SelectionScope::Char => offset..offset,
                SelectionScope::Word => cursor::word_range_at(text, offset),
                SelectionScope::Line => cursor::paragraph_range_at(text, offset),
            };
            self.edit.select(range.start, range.end);
            (scope, range)
        };

        self.edit.preferred_x = None;
        self.drag = Some(DragState {
            anchor,
            scope,
            pointer: (x, y),
            auto_scrolling: false,
        });
        self.scroll_to_caret();
        self.caret_moved();
        true
    }

    /// Pointer motion with the button held. Outside the viewport this starts auto-scrolling.
    pub fn mouse_drag(&mut self, x: f32, y: f32, now: Duration) -> bool {
        if self.drag.is_none() {
            return false;
        }
        self.now = now;
        let outside = self.is_outside_viewport(x, y);
        if let Some(drag) = &mut self.drag {
            drag.pointer = (x, y);
            drag.auto_scrolling = outside;
        }
        if !outside {
            self.timers.cancel(TimerKind::AutoScroll);
        } else if !self.timers.is_armed(TimerKind::AutoScroll) {
            self.timers
                .arm(TimerKind::AutoScroll, now + AUTO_SCROLL_INTERVAL);
        }
        self.extend_drag();
        true
    }

    /// Button release. Ends dragging and auto-scrolling.
    pub fn mouse_release(&mut self) -> bool {
        self.timers.cancel(TimerKind::AutoScroll);
        self.drag.take().is_some()
    }

    // ------------------------------------------------------------------------------------
    // Geometry and focus
    // ------------------------------------------------------------------------------------

    /// Set the content box size. A width change rewraps every row.
    pub fn set_viewport(&mut self, width_px: f32, height_px: f32) {
        self.viewport = (width_px, height_px);
        if self.wrap.set_width(width_px) {
            self.wrap
                .reflow_all(self.buffer.as_str(), &mut self.rows, &*self.metrics);
        }
        self.scroll_to_caret();
    }

    /// Change the wrap mode of a multi-line field. Single-line fields never wrap.
    pub fn set_wrap_mode(&mut self, mode: WrapMode) {
        if self.config.is_single_line() {
            return;
        }
        self.config.wrap_mode = mode;
        if self.wrap.set_mode(mode) {
            self.wrap
                .reflow_all(self.buffer.as_str(), &mut self.rows, &*self.metrics);
            self.scroll_to_caret();
        }
    }

    /// The field received focus.
    pub fn focus_gained(&mut self, now: Duration) {
        self.focused = true;
        self.history.break_merge();
        self.touch(now);
    }

    /// The field lost focus: timers stop, the undo merge breaks and numeric fields commit
    /// their clamped, formatted value.
    pub fn focus_lost(&mut self) {
        self.focused = false;
        self.caret_on = false;
        self.drag = None;
        self.clicks.reset();
        self.finish_spin();
        self.timers.cancel_all();
        self.history.break_merge();
        self.commit_numeric();
    }

    // ------------------------------------------------------------------------------------
    // Numeric
    // ------------------------------------------------------------------------------------

    /// Current numeric value (numeric kinds only). Re-parses the text if it changed.
    pub fn value(&mut self) -> Option<f64> {
        let text = self.buffer.as_str();
        self.numeric.as_mut().map(|numeric| numeric.value(text))
    }

    /// Set the numeric value; it is clamped and written back as formatted text.
    pub fn set_value(&mut self, value: f64) -> bool {
        let Some(numeric) = &mut self.numeric else {
            return false;
        };
        let value = numeric.set(value);
        let formatted = numeric.format(value);
        let written = self.replace_all(&formatted, true);
        if let Some(numeric) = &mut self.numeric {
            if written {
                numeric.set(value);
            } else {
                numeric.invalidate();
            }
        }
        written
    }

    /// Press a step button: step once now, then auto-repeat while held.
    pub fn spin_press(&mut self, direction: SpinDirection, now: Duration) -> bool {
        if self.config.read_only || self.numeric.is_none() {
            return false;
        }
        self.touch(now);
        self.finish_spin();

        let origin = self.buffer.as_bytes().to_vec();
        let text = self.buffer.as_str();
        let Some(numeric) = &mut self.numeric else {
            return false;
        };
        let current = numeric.value(text);
        let value = numeric.begin_step(direction, current);

        self.spin_origin = Some(origin);
        self.write_spin_value(value);
        self.timers
            .arm(TimerKind::SpinRepeat, now + SPIN_INITIAL_DELAY);
        true
    }

    /// Release the step button. The whole press is one undo step.
    pub fn spin_release(&mut self) -> bool {
        self.finish_spin()
    }

    // ------------------------------------------------------------------------------------
    // Timers and notifications
    // ------------------------------------------------------------------------------------

    /// Earliest time the host should call [`fire_due`](Self::fire_due).
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Run every scheduled action due at `now`. Returns whether any fired.
    pub fn fire_due(&mut self, now: Duration) -> bool {
        self.now = now;
        let due = self.timers.take_due(now);
        for &(kind, _) in &due {
            let action = match kind {
                TimerKind::CaretBlink => {
                    self.caret_on = !self.caret_on;
                    if self.focused && self.config.caret.blink {
                        TimerAction::Rearm(CARET_BLINK_INTERVAL)
                    } else {
                        TimerAction::Cancel
                    }
                }
                TimerKind::AutoScroll => self.auto_scroll_tick(),
                TimerKind::SpinRepeat => self.spin_repeat_tick(),
            };
            tracing::trace!(?kind, ?action, "timer fired");
            self.timers.resolve(kind, action, now);
        }
        !due.is_empty()
    }

    /// Whether the caret should be drawn right now.
    pub fn caret_visible(&self) -> bool {
        self.focused && self.caret_on
    }

    /// Register a change subscriber.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&ChangePayload) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Deliver the queued change, if any. Returns whether one was pending.
    pub fn flush_notifications(&mut self) -> bool {
        if !self.pending {
            return false;
        }
        self.pending = false;
        if self.callbacks.is_empty() {
            return true;
        }

        let payload = match self.config.notify_mode {
            NotifyMode::Text => ChangePayload::Text(self.buffer.as_str().to_string()),
            NotifyMode::Stats => ChangePayload::Stats(self.stats()),
        };
        for callback in &mut self.callbacks {
            callback(&payload);
        }
        true
    }

    // ------------------------------------------------------------------------------------
    // Color classes
    // ------------------------------------------------------------------------------------

    /// Install the per-byte color class hook.
    pub fn set_color_classifier(&mut self, classifier: impl ColorClassifier + 'a) {
        self.classifier = Some(Box::new(classifier));
    }

    /// Remove the color class hook.
    pub fn clear_color_classifier(&mut self) {
        self.classifier = None;
    }

    /// Color class of every byte in `row` (all `0` without a classifier).
    pub fn color_classes(&self, row: usize) -> Vec<u8> {
        if row >= self.rows.len() {
            return Vec::new();
        }
        let range = self.rows.row_range(row);
        let mut classes = vec![0u8; range.len()];
        if let Some(classifier) = &self.classifier {
            classifier.classify(self.buffer.as_str(), range, &mut classes);
        }
        classes
    }

    // ------------------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------------------

    /// Replace `removed` bytes at `offset` with `inserted` and rewrap the affected rows.
    ///
    /// Returns the removed bytes, or `None` (nothing changed) when the buffer refused.
    fn splice(&mut self, offset: usize, removed: usize, inserted: &str) -> Option<Vec<u8>> {
        let old = self.buffer.slice(offset..offset + removed).to_vec();
        if old.len() != removed {
            return None;
        }
        if let Some(capacity) = self.buffer.fixed_capacity()
            && self.buffer.len() - removed + inserted.len() > capacity
        {
            tracing::debug!(
                len = self.buffer.len(),
                removed,
                inserted = inserted.len(),
                capacity,
                "edit exceeds fixed capacity"
            );
            return None;
        }
        if !self.buffer.delete(offset, removed) {
            return None;
        }
        if !self.buffer.insert(offset, inserted.as_bytes()) {
            self.buffer.insert(offset, &old);
            return None;
        }

        self.wrap.reflow_edit(
            self.buffer.as_str(),
            &mut self.rows,
            offset,
            removed,
            inserted.len(),
            &*self.metrics,
        );
        if let Some(numeric) = &mut self.numeric {
            numeric.invalidate();
        }
        self.edit.preferred_x = None;
        self.mark_changed();
        Some(old)
    }

    fn insert_filtered(&mut self, text: &str, now: Duration, overwrite: bool) -> bool {
        if self.config.read_only {
            return false;
        }
        // A held step button is closed out before any other edit is logged on top of it.
        self.finish_spin();
        let selection = self.edit.selection_range();
        let offset = selection.start;
        let text = self.filter_input(text, offset);
        if text.is_empty() {
            return false;
        }

        let replace_len = if selection.is_empty() && overwrite {
            self.overwrite_span(offset, text.chars().count())
        } else {
            0
        };
        let removed = selection.len() + replace_len;
        let text = self.fit_insert(offset, removed, &text);
        if text.is_empty() {
            return false;
        }
        if let Some(capacity) = self.buffer.fixed_capacity()
            && self.buffer.len() - removed + text.len() > capacity
        {
            tracing::debug!(
                len = self.buffer.len(),
                insert = text.len(),
                capacity,
                "insert rejected, fixed buffer full"
            );
            return false;
        }

        if !selection.is_empty() {
            self.history.break_merge();
            if !self.delete_range(selection, now) {
                return false;
            }
        }

        let Some(replaced) = self.splice(offset, replace_len, &text) else {
            return false;
        };
        let entry = if replace_len > 0 {
            UndoEntry::replace(offset, text.len(), replaced)
        } else {
            UndoEntry::insert(offset, text.len())
        };
        self.history.record(entry, now);
        self.edit.collapse_to(offset + text.len());
        self.scroll_to_caret();
        true
    }

    fn delete_selection(&mut self, now: Duration) -> bool {
        self.history.break_merge();
        let range = self.edit.selection_range();
        self.delete_range(range, now)
    }

    fn delete_range(&mut self, range: Range<usize>, now: Duration) -> bool {
        if self.config.read_only || range.is_empty() {
            return false;
        }
        self.finish_spin();
        let Some(removed) = self.splice(range.start, range.len(), "") else {
            return false;
        };
        self.history
            .record(UndoEntry::delete(range.start, removed), now);
        self.edit.collapse_to(range.start);
        self.scroll_to_caret();
        true
    }

    /// Replace everything as one programmatic step.
    fn replace_all(&mut self, text: &str, record: bool) -> bool {
        self.finish_spin();
        if text == self.buffer.as_str() {
            return true;
        }
        let len = self.buffer.len();
        let text = self.fit_insert(0, len, text);

        self.history.break_merge();
        let Some(old) = self.splice(0, len, &text) else {
            return false;
        };
        if record {
            self.history
                .record(UndoEntry::replace(0, text.len(), old), self.now);
        }
        self.history.break_merge();
        self.edit.collapse_to(text.len());
        self.scroll_to_caret();
        true
    }

    fn apply_history(&mut self, applied: Applied) {
        self.wrap.reflow_edit(
            self.buffer.as_str(),
            &mut self.rows,
            applied.offset,
            applied.removed,
            applied.inserted,
            &*self.metrics,
        );
        if let Some(numeric) = &mut self.numeric {
            numeric.invalidate();
        }
        self.edit.collapse_to(applied.cursor);
        self.edit.preferred_x = None;
        self.mark_changed();
        self.scroll_to_caret();
    }

    /// Normalize newlines and apply the kind and tab filters to typed or pasted text.
    fn filter_input(&self, text: &str, offset: usize) -> String {
        let text = normalize_newlines(text);
        let mut filtered: String = text
            .chars()
            .filter(|&ch| !ch.is_control() || ch == '\n' || ch == '\t')
            .collect();

        if let Some(numeric) = &self.numeric {
            filtered.retain(|ch| numeric.accepts_char(ch));
        }

        match self.config.tab_mode {
            TabMode::Preserve => filtered,
            TabMode::Forbid => filtered.replace('\t', " "),
            TabMode::ConvertToSpaces => self.expand_tabs(&filtered, offset),
        }
    }

    /// Replace tabs with spaces up to the next tab stop, counting columns from the start of
    /// the logical line at `offset`.
    fn expand_tabs(&self, text: &str, offset: usize) -> String {
        let current = self.buffer.as_str();
        let line_start = current[..offset].rfind('\n').map_or(0, |i| i + 1);
        let mut column = current[line_start..offset].chars().count();
        let tab_size = self.config.tab_size;

        let mut expanded = String::with_capacity(text.len());
        for ch in text.chars() {
            match ch {
                '\t' => {
                    let spaces = tab_size - column % tab_size;
                    expanded.extend(std::iter::repeat_n(' ', spaces));
                    column += spaces;
                }
                '\n' => {
                    expanded.push(ch);
                    column = 0;
                }
                _ => {
                    expanded.push(ch);
                    column += 1;
                }
            }
        }
        expanded
    }

    /// Bytes overwritten by typing `chars` code points at `offset`: never past a newline.
    fn overwrite_span(&self, offset: usize, chars: usize) -> usize {
        self.buffer.as_str()[offset..]
            .chars()
            .take(chars)
            .take_while(|&ch| ch != '\n')
            .map(char::len_utf8)
            .sum()
    }

    /// Longest prefix of `text` that keeps a bounded field within its row limit when it
    /// replaces `removed` bytes at `offset`.
    fn fit_insert<'t>(&self, offset: usize, removed: usize, text: &'t str) -> Cow<'t, str> {
        let limit = self.config.row_limit();
        if limit == 0 {
            return Cow::Borrowed(text);
        }

        let current = self.buffer.as_str();
        let before = &current[..offset];
        let after = &current[offset + removed..];
        let fits = |prefix: usize| {
            let mut candidate = String::with_capacity(before.len() + prefix + after.len());
            candidate.push_str(before);
            candidate.push_str(&text[..prefix]);
            candidate.push_str(after);
            self.wrap.row_count(&candidate, &*self.metrics) <= limit
        };

        if fits(text.len()) {
            return Cow::Borrowed(text);
        }

        let boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        if !fits(0) {
            tracing::debug!(limit, "row limit already reached, insert rejected");
            return Cow::Borrowed("");
        }
        // fits(boundaries[lo]) holds and the full text does not.
        let (mut lo, mut hi) = (0usize, boundaries.len());
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if fits(boundaries[mid]) {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        let kept = boundaries[lo];
        tracing::debug!(
            limit,
            requested = text.len(),
            kept,
            "insert truncated to row limit"
        );
        Cow::Borrowed(&text[..kept])
    }

    fn commit_numeric(&mut self) {
        let text = self.buffer.as_str();
        let Some(numeric) = &mut self.numeric else {
            return;
        };
        let value = numeric.value(text);
        let formatted = numeric.format(value);
        if formatted != text {
            self.replace_all(&formatted, true);
        }
        if let Some(numeric) = &mut self.numeric {
            numeric.set(value);
        }
    }

    fn step_once(&mut self, direction: SpinDirection, now: Duration) -> bool {
        self.spin_press(direction, now) && self.spin_release()
    }

    fn write_spin_value(&mut self, value: f64) {
        let Some(numeric) = &self.numeric else {
            return;
        };
        let formatted = numeric.format(value);
        let len = self.buffer.len();
        let written = formatted.as_bytes() == self.buffer.as_bytes()
            || self.splice(0, len, &formatted).is_some();
        if written {
            self.edit.collapse_to(formatted.len());
            self.scroll_to_caret();
        }
        if let Some(numeric) = &mut self.numeric {
            if written {
                numeric.set(value);
            } else {
                numeric.invalidate();
            }
        }
    }

    fn spin_repeat_tick(&mut self) -> TimerAction {
        let Some(value) = self.numeric.as_mut().and_then(NumericAdapter::repeat_step) else {
            return TimerAction::Cancel;
        };
        self.write_spin_value(value);
        TimerAction::Rearm(SPIN_REPEAT_INTERVAL)
    }

    /// End a step button press and record it as a single undo step.
    fn finish_spin(&mut self) -> bool {
        self.timers.cancel(TimerKind::SpinRepeat);
        if let Some(numeric) = &mut self.numeric {
            numeric.end_step();
        }
        let Some(origin) = self.spin_origin.take() else {
            return false;
        };
        if origin != self.buffer.as_bytes() {
            self.history.break_merge();
            self.history
                .record(UndoEntry::replace(0, self.buffer.len(), origin), self.now);
            self.history.break_merge();
        }
        true
    }

    fn auto_scroll_tick(&mut self) -> TimerAction {
        let Some(drag) = &self.drag else {
            return TimerAction::Cancel;
        };
        if !drag.auto_scrolling {
            return TimerAction::Cancel;
        }
        let (x, y) = drag.pointer;
        let (width, height) = self.viewport;

        if height > 0.0 {
            let max_top = self
                .rows
                .len()
                .saturating_sub(self.visible_rows().unwrap_or(1));
            if y < 0.0 {
                self.scroll.top_row = self.scroll.top_row.saturating_sub(1);
            } else if y > height {
                self.scroll.top_row = (self.scroll.top_row + 1).min(max_top);
            }
        }
        if width > 0.0 {
            let content_width = self.rows.iter().map(|r| r.width).fold(0.0f32, f32::max);
            let max_offset = (content_width - width).max(0.0);
            let step = width * 0.1;
            let offset = &mut self.scroll.horizontal_offset_px;
            if x < 0.0 {
                *offset = (*offset - step).max(0.0);
            } else if x > width {
                *offset = (*offset + step).min(max_offset);
            }
        }
        self.scroll.top_byte_offset = self.rows.row_start(self.scroll.top_row);

        self.extend_drag();
        TimerAction::Rearm(AUTO_SCROLL_INTERVAL)
    }

    /// Extend the drag selection to the pointer, in units of the initial click scope.
    fn extend_drag(&mut self) {
        let Some(drag) = &self.drag else {
            return;
        };
        let (x, y) = drag.pointer;
        let anchor = drag.anchor.clone();
        let scope = drag.scope;
        let offset = self.offset_at_point(x, y);
        let text = self.buffer.as_str();

        let (sel_anchor, active) = match scope {
            SelectionScope::Char => (anchor.start, offset),
            SelectionScope::Word | SelectionScope::Line => {
                let unit = if scope == SelectionScope::Word {
                    cursor::word_range_at(text, offset)
                } else {
                    cursor::paragraph_range_at(text, offset)
                };
                if offset < anchor.start {
                    (anchor.end, unit.start)
                } else {
                    (anchor.start, unit.end.max(anchor.end))
                }
            }
        };
        self.edit.select(sel_anchor, active);
        self.edit.preferred_x = None;
        self.caret_moved();
    }

    fn move_vertical(&mut self, delta: isize, extend: bool) {
        let cursor = self.edit.cursor;
        let x = self
            .edit
            .preferred_x
            .unwrap_or_else(|| self.caret_x(cursor));
        let row = self.rows.row_at_offset(cursor) as isize + delta;

        let text = self.buffer.as_str();
        let target = if row < 0 {
            0
        } else if row as usize >= self.rows.len() {
            text.len()
        } else {
            let range = cursor::row_content(text, &self.rows, row as usize);
            self.wrap.hit_test(text, range, x, &*self.metrics)
        };
        self.place_caret(target, extend);
        self.edit.preferred_x = Some(x);
    }

    fn place_caret(&mut self, target: usize, extend: bool) {
        if extend {
            self.edit.extend_to(target);
        } else {
            self.edit.collapse_to(target);
        }
    }

    /// Row-relative x of the caret at `offset`.
    fn caret_x(&self, offset: usize) -> f32 {
        let text = self.buffer.as_str();
        let start = self.rows.row_start(self.rows.row_at_offset(offset)).min(offset);
        text.get(start..offset)
            .map_or(0.0, |prefix| self.wrap.measure(prefix, &*self.metrics))
    }

    fn offset_at_point(&self, x: f32, y: f32) -> usize {
        let row = (y / self.line_height()).floor() as isize + self.scroll.top_row as isize;
        let row = row.clamp(0, self.rows.len() as isize - 1) as usize;
        let text = self.buffer.as_str();
        let range = cursor::row_content(text, &self.rows, row);
        self.wrap.hit_test(
            text,
            range,
            x + self.scroll.horizontal_offset_px,
            &*self.metrics,
        )
    }

    fn is_outside_viewport(&self, x: f32, y: f32) -> bool {
        let (width, height) = self.viewport;
        (width > 0.0 && (x < 0.0 || x > width)) || (height > 0.0 && (y < 0.0 || y > height))
    }

    fn line_height(&self) -> f32 {
        let height = self.metrics.line_metrics().height;
        if height > 0.0 { height } else { 1.0 }
    }

    fn visible_rows(&self) -> Option<usize> {
        let height = self.viewport.1;
        (height > 0.0).then(|| ((height / self.line_height()).floor() as usize).max(1))
    }

    fn page_rows(&self) -> usize {
        self.visible_rows().unwrap_or(self.rows.len()).max(1)
    }

    fn scroll_to_caret(&mut self) {
        let cursor = self.edit.cursor;
        let row = self.rows.row_at_offset(cursor);
        if let Some(visible) = self.visible_rows() {
            if row < self.scroll.top_row {
                self.scroll.top_row = row;
            } else if row >= self.scroll.top_row + visible {
                self.scroll.top_row = row + 1 - visible;
            }
        }
        self.scroll.top_row = self.scroll.top_row.min(self.rows.len() - 1);
        self.scroll.top_byte_offset = self.rows.row_start(self.scroll.top_row);

        let width = self.viewport.0;
        if self.wrap.mode() == WrapMode::None && width > 0.0 {
            let x = self.caret_x(cursor);
            let offset = &mut self.scroll.horizontal_offset_px;
            if x < *offset {
                *offset = x;
            } else if x > *offset + width {
                *offset = x - width;
            }
        } else {
            self.scroll.horizontal_offset_px = 0.0;
        }
    }

    /// Show the caret and restart the blink cycle.
    fn touch(&mut self, now: Duration) {
        self.now = now;
        self.caret_on = true;
        if self.focused && self.config.caret.blink {
            self.timers
                .arm(TimerKind::CaretBlink, now + CARET_BLINK_INTERVAL);
        }
    }

    fn mark_changed(&mut self) {
        if self.config.notify_changes {
            self.pending = true;
        }
    }

    fn caret_moved(&mut self) {
        if self.config.caret.notify {
            self.mark_changed();
        }
    }
}

/// `"\r\n"` and lone `'\r'` become `'\n'`.
fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}
