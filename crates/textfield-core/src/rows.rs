//! Row Index
//!
//! One small value struct per visual row, addressed by row number. Rows partition the buffer:
//! the byte lengths sum to the buffer length and every boundary sits on a `char` boundary.
//! A row that ends at a hard newline owns the `'\n'` byte.
//!
//! There is always at least one row. An empty buffer has a single empty row, and a buffer
//! ending with `'\n'` has a trailing empty row for the caret to live on.
//!
//! Cumulative row ends are kept alongside the rows, so row starts are a lookup and offset to
//! row mapping is a binary search. They are rebuilt from the splice point on every splice.

use std::ops::Range;

/// Descriptor of one visual row.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Row {
    /// Byte length of the row, including a terminating `'\n'` if present.
    pub byte_len: usize,
    /// Cached pixel width of the row content (without the newline).
    pub width: f32,
}

impl Row {
    /// An empty row.
    pub const EMPTY: Row = Row {
        byte_len: 0,
        width: 0.0,
    };

    /// Create a row descriptor.
    pub fn new(byte_len: usize, width: f32) -> Self {
        Self { byte_len, width }
    }
}

/// Ordered sequence of [`Row`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct RowIndex {
    rows: Vec<Row>,
    /// `ends[i]` is the byte offset one past row `i`.
    ends: Vec<usize>,
}

impl RowIndex {
    /// Row index of an empty buffer.
    pub fn new() -> Self {
        Self {
            rows: vec![Row::EMPTY],
            ends: vec![0],
        }
    }

    /// Build an index from precomputed rows. An empty list becomes a single empty row.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        if rows.is_empty() {
            return Self::new();
        }
        let mut index = Self {
            rows,
            ends: Vec::new(),
        };
        index.rebuild_ends(0);
        index
    }

    /// Number of rows (always at least 1).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always `false`; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row descriptor by number.
    pub fn get(&self, row: usize) -> Option<&Row> {
        self.rows.get(row)
    }

    /// Iterate over row descriptors.
    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Sum of all row lengths; equals the buffer length.
    pub fn total_bytes(&self) -> usize {
        self.ends.last().copied().unwrap_or(0)
    }

    /// Byte offset of the first byte of `row`. Rows past the end map to the total length.
    pub fn row_start(&self, row: usize) -> usize {
        match row.min(self.ends.len()) {
            0 => 0,
            row => self.ends[row - 1],
        }
    }

    /// Byte range of `row`, including its terminating newline.
    pub fn row_range(&self, row: usize) -> Range<usize> {
        let start = self.row_start(row);
        let len = self.rows.get(row).map_or(0, |r| r.byte_len);
        start..start + len
    }

    /// Byte ranges of all rows, in order.
    pub fn ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.rows.iter().scan(0usize, |start, row| {
            let range = *start..*start + row.byte_len;
            *start += row.byte_len;
            Some(range)
        })
    }

    /// Row containing `offset`.
    ///
    /// An offset equal to a row boundary belongs to the row that starts there; the end of the
    /// buffer belongs to the last row.
    pub fn row_at_offset(&self, offset: usize) -> usize {
        self.ends
            .partition_point(|&end| end <= offset)
            .min(self.rows.len() - 1)
    }

    pub(crate) fn splice(&mut self, range: Range<usize>, rows: Vec<Row>) {
        let first = range.start;
        self.rows.splice(range, rows);
        if self.rows.is_empty() {
            self.rows.push(Row::EMPTY);
        }
        self.rebuild_ends(first.min(self.rows.len()));
    }

    fn rebuild_ends(&mut self, first: usize) {
        self.ends.truncate(first);
        let mut end = first.checked_sub(1).map_or(0, |prev| self.ends[prev]);
        for row in &self.rows[first..] {
            end += row.byte_len;
            self.ends.push(end);
        }
    }
}

impl Default for RowIndex {
    fn default() -> Self {
        Self::new()
    }
}
