//! Word-Wrap Engine
//!
//! Computes [`Row`] descriptors for a buffer given a pixel width. Text is measured through the
//! [`GlyphMetrics`] provider one segment at a time, where a segment runs up to the next control
//! character (`'\t'` or `'\n'`). Tabs advance to the next multiple of the tab size, measured
//! against the row-relative accumulated width.
//!
//! Edits are reflowed incrementally: only rows overlapping the edit are rewrapped, plus the
//! preceding soft-wrapped rows whose break could move (a row may absorb text again). Rewrapping
//! stops as soon as a produced boundary lines up with an unchanged pre-edit boundary.

use crate::metrics::GlyphMetrics;
use crate::rows::{Row, RowIndex};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Soft wrapping mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
    /// Rows end only at hard newlines.
    None,
    /// Break at any `char` boundary that fits.
    Char,
    /// Prefer the nearest preceding word boundary, falling back to [`WrapMode::Char`] for a
    /// single token wider than the available width.
    #[default]
    Word,
}

/// Bytes after which a word-wrap break is allowed.
fn is_wrap_separator(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t')
}

fn next_control(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|&b| b == b'\t' || b == b'\n')
        .map_or(bytes.len(), |i| from + i)
}

pub(crate) fn floor_char_boundary(text: &str, mut offset: usize) -> usize {
    if offset >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

pub(crate) fn next_char_boundary(text: &str, offset: usize) -> usize {
    text[offset.min(text.len())..]
        .chars()
        .next()
        .map_or(text.len(), |ch| offset + ch.len_utf8())
}

/// Row layout policy: wrap mode, available width and tab size.
#[derive(Debug, Clone, PartialEq)]
pub struct WrapEngine {
    mode: WrapMode,
    width: f32,
    tab_width: f32,
}

impl WrapEngine {
    /// Create an engine. A `width` of zero or less means "not laid out yet" and disables
    /// wrapping until a real width arrives.
    pub fn new(mode: WrapMode, width: f32, tab_width: f32) -> Self {
        Self {
            mode,
            width,
            tab_width: tab_width.max(1.0),
        }
    }

    /// Wrap mode.
    pub fn mode(&self) -> WrapMode {
        self.mode
    }

    /// Available row width in pixels.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Tab stop distance in pixels.
    pub fn tab_width(&self) -> f32 {
        self.tab_width
    }

    /// Change the available width. Returns `true` when a full reflow is required.
    pub fn set_width(&mut self, width: f32) -> bool {
        if self.width == width {
            return false;
        }
        self.width = width;
        self.mode != WrapMode::None
    }

    /// Change the wrap mode. Returns `true` when a full reflow is required.
    pub fn set_mode(&mut self, mode: WrapMode) -> bool {
        let changed = self.mode != mode;
        self.mode = mode;
        changed
    }

    fn limit(&self) -> f32 {
        if self.mode == WrapMode::None || self.width <= 0.0 {
            f32::INFINITY
        } else {
            self.width
        }
    }

    /// Pixels a tab occupies when it starts at row-relative `x`.
    pub fn tab_advance(&self, x: f32) -> f32 {
        self.tab_width - x.rem_euclid(self.tab_width)
    }

    /// Width of `text` laid out from the start of a row, stopping at the first newline.
    pub fn measure(&self, text: &str, metrics: &dyn GlyphMetrics) -> f32 {
        let bytes = text.as_bytes();
        let mut pos = 0usize;
        let mut x = 0.0f32;
        while pos < bytes.len() {
            let end = next_control(bytes, pos);
            if end > pos {
                x += metrics.text_width(&text[pos..end]);
                pos = end;
            }
            match bytes.get(pos) {
                Some(b'\t') => {
                    x += self.tab_advance(x);
                    pos += 1;
                }
                _ => break,
            }
        }
        x
    }

    /// Lay out the row starting at `start`. Always consumes at least one `char` unless
    /// `start` is at the end of `text`.
    pub fn next_row(&self, text: &str, start: usize, metrics: &dyn GlyphMetrics) -> Row {
        let bytes = text.as_bytes();
        let limit = self.limit();
        let mut pos = start;
        let mut x = 0.0f32;

        loop {
            if pos >= bytes.len() {
                return Row::new(pos - start, x);
            }

            let segment_end = next_control(bytes, pos);
            if segment_end > pos {
                let segment = &text[pos..segment_end];
                let (fit, advance) = metrics.text_fit(segment, limit - x);
                let fit = floor_char_boundary(segment, fit);
                pos += fit;
                x += advance;
                if fit < segment.len() {
                    return self.break_row(text, start, pos, metrics);
                }
                if pos >= bytes.len() {
                    return Row::new(pos - start, x);
                }
            }

            if bytes[pos] == b'\n' {
                return Row::new(pos + 1 - start, x);
            }

            let advance = self.tab_advance(x);
            if x + advance > limit && pos > start {
                return self.break_row(text, start, pos, metrics);
            }
            x += advance;
            pos += 1;
        }
    }

    /// Truncate an overflowing row whose budget ran out at `overflow`.
    fn break_row(
        &self,
        text: &str,
        start: usize,
        overflow: usize,
        metrics: &dyn GlyphMetrics,
    ) -> Row {
        let mut end = match self.mode {
            WrapMode::Word => self.word_break(text, start, overflow).unwrap_or(overflow),
            _ => overflow,
        };
        if end <= start {
            end = next_char_boundary(text, start);
        }
        let row_text = &text[start..end];
        Row::new(end - start, self.measure(row_text, metrics))
    }

    fn word_break(&self, text: &str, start: usize, overflow: usize) -> Option<usize> {
        let bytes = text.as_bytes();

        // Spaces at the overflow point hang off the end of the row.
        let mut hang = overflow;
        while hang < bytes.len() && bytes[hang] == b' ' {
            hang += 1;
        }
        if hang > overflow {
            if bytes.get(hang) == Some(&b'\n') {
                hang += 1;
            }
            return Some(hang);
        }

        (start + 1..=overflow).rev().find(|&b| {
            b < bytes.len() && is_wrap_separator(bytes[b - 1]) && !is_wrap_separator(bytes[b])
        })
    }

    /// Lay out the whole text.
    pub fn layout(&self, text: &str, metrics: &dyn GlyphMetrics) -> Vec<Row> {
        let mut rows = Vec::new();
        let mut pos = 0usize;
        while pos < text.len() {
            let row = self.next_row(text, pos, metrics);
            pos += row.byte_len;
            rows.push(row);
        }
        if rows.is_empty() || text.ends_with('\n') {
            rows.push(Row::EMPTY);
        }
        rows
    }

    /// Number of rows `text` would occupy.
    pub fn row_count(&self, text: &str, metrics: &dyn GlyphMetrics) -> usize {
        self.layout(text, metrics).len()
    }

    /// Rebuild every row (width, mode or tab change).
    pub fn reflow_all(&self, text: &str, rows: &mut RowIndex, metrics: &dyn GlyphMetrics) {
        *rows = RowIndex::from_rows(self.layout(text, metrics));
        tracing::trace!(rows = rows.len(), "full reflow");
    }

    /// Update `rows` after `removed` bytes at `offset` were replaced by `inserted` bytes.
    ///
    /// `text` is the post-edit content; `rows` still describes the pre-edit content.
    pub fn reflow_edit(
        &self,
        text: &str,
        rows: &mut RowIndex,
        offset: usize,
        removed: usize,
        inserted: usize,
        metrics: &dyn GlyphMetrics,
    ) {
        let old_len = rows.total_bytes();
        let old_edit_end = offset + removed;

        // A word break looks one glyph past the row budget, and with double-width glyphs that
        // glyph can sit two rows further down.
        let mut first = rows.row_at_offset(offset);
        for _ in 0..2 {
            if first == 0
                || self.mode == WrapMode::None
                || self.ends_hard(rows, first - 1, text, offset)
            {
                break;
            }
            first -= 1;
        }

        // Pre-edit row starts past the edit, shifted into post-edit coordinates.
        let mut sync_points: Vec<(usize, usize)> = Vec::new();
        let mut start = 0usize;
        for (i, row) in rows.iter().enumerate() {
            if i > first && start >= old_edit_end && start < old_len {
                sync_points.push((start - removed + inserted, i));
            }
            start += row.byte_len;
        }

        let mut pos = rows.row_start(first);
        let mut produced = Vec::new();
        let mut next_sync = 0usize;
        while pos < text.len() {
            let row = self.next_row(text, pos, metrics);
            pos += row.byte_len;
            produced.push(row);

            while next_sync < sync_points.len() && sync_points[next_sync].0 < pos {
                next_sync += 1;
            }
            if let Some(&(boundary, old_row)) = sync_points.get(next_sync)
                && boundary == pos
            {
                tracing::trace!(
                    first,
                    replaced = old_row - first,
                    produced = produced.len(),
                    "incremental reflow"
                );
                rows.splice(first..old_row, produced);
                return;
            }
        }

        if (produced.is_empty() && first == 0) || text.ends_with('\n') {
            produced.push(Row::EMPTY);
        }
        tracing::trace!(first, produced = produced.len(), "reflow to end");
        let old_rows = rows.len();
        rows.splice(first..old_rows, produced);
    }

    /// Whether `row` ends at a hard newline. Looks at the pre-edit row end, which precedes
    /// `edit_offset` and is therefore unchanged in the post-edit `text`.
    fn ends_hard(&self, rows: &RowIndex, row: usize, text: &str, edit_offset: usize) -> bool {
        let end = rows.row_range(row).end;
        end > 0 && end <= edit_offset && text.as_bytes().get(end - 1) == Some(&b'\n')
    }

    /// Byte offset within `range` closest to pixel `x` (row-relative).
    ///
    /// `range` must not include a trailing newline.
    pub fn hit_test(
        &self,
        text: &str,
        range: Range<usize>,
        x: f32,
        metrics: &dyn GlyphMetrics,
    ) -> usize {
        let bytes = text.as_bytes();
        let mut pos = range.start;
        let mut acc = 0.0f32;

        while pos < range.end {
            let segment_end = next_control(bytes, pos).min(range.end);
            if segment_end > pos {
                let segment = &text[pos..segment_end];
                let (fit, advance) = metrics.text_fit(segment, x - acc);
                let fit = floor_char_boundary(segment, fit);
                if fit < segment.len() {
                    let at = pos + fit;
                    let next = next_char_boundary(text, at).min(range.end);
                    let glyph = metrics.text_width(&text[at..next]);
                    return if x - (acc + advance) > glyph / 2.0 {
                        next
                    } else {
                        at
                    };
                }
                pos = segment_end;
                acc += advance;
                if pos >= range.end {
                    break;
                }
            }

            if bytes[pos] == b'\n' {
                return pos;
            }
            let advance = self.tab_advance(acc);
            if x - acc <= advance / 2.0 {
                return pos;
            }
            acc += advance;
            pos += 1;
        }
        range.end
    }
}
