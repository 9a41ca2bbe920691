//! Glyph and Metrics Provider
//!
//! The core never shapes or rasterizes text. Everything it needs to know about glyph extents
//! goes through [`GlyphMetrics`], which the host implements on top of its font stack.
//!
//! [`MonospaceMetrics`] is a reference provider that measures text in terminal cells
//! (UAX #11 widths) scaled by a fixed cell size. It is what the tests and benches use, and it
//! is a reasonable choice for hosts that render into a character grid.

use unicode_width::UnicodeWidthChar;

/// Vertical metrics of the current font.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    /// Distance from the baseline to the top of the line box.
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the line box (positive).
    pub descent: f32,
    /// Total line advance in pixels.
    pub height: f32,
}

/// Text measurement service consumed by the wrap engine and cursor model.
///
/// Implementations must be deterministic for a fixed (font, size, text) triple within one
/// layout pass, otherwise incremental reflow can disagree with a full reflow.
pub trait GlyphMetrics {
    /// Measure the longest prefix of `text` whose advance does not exceed `max_width`.
    ///
    /// Returns `(bytes_consumed, width)`. `bytes_consumed` must lie on a `char` boundary of
    /// `text`. A negative or zero budget may consume nothing.
    fn text_fit(&self, text: &str, max_width: f32) -> (usize, f32);

    /// Total advance of `text` in pixels.
    fn text_width(&self, text: &str) -> f32;

    /// Vertical metrics of a single line.
    fn line_metrics(&self) -> LineMetrics;
}

impl<M: GlyphMetrics + ?Sized> GlyphMetrics for &M {
    fn text_fit(&self, text: &str, max_width: f32) -> (usize, f32) {
        (**self).text_fit(text, max_width)
    }

    fn text_width(&self, text: &str) -> f32 {
        (**self).text_width(text)
    }

    fn line_metrics(&self) -> LineMetrics {
        (**self).line_metrics()
    }
}

/// Calculate the cell width of a character (based on UAX #11).
///
/// Narrow characters are 1 cell, CJK/fullwidth and most emoji are 2, combining marks are 0.
/// Characters without a defined width (controls) count as 1.
pub fn char_cells(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(1)
}

/// Fixed-pitch provider: every cell is `cell_width` pixels wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    cell_width: f32,
    line_height: f32,
}

impl MonospaceMetrics {
    /// Create a provider with the given cell width and line height (pixels).
    pub fn new(cell_width: f32, line_height: f32) -> Self {
        Self {
            cell_width,
            line_height,
        }
    }

    /// One pixel per cell and per line; convenient for reasoning in character columns.
    pub fn unit() -> Self {
        Self::new(1.0, 1.0)
    }

    /// Width of a single cell in pixels.
    pub fn cell_width(&self) -> f32 {
        self.cell_width
    }
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self::new(8.0, 16.0)
    }
}

impl GlyphMetrics for MonospaceMetrics {
    fn text_fit(&self, text: &str, max_width: f32) -> (usize, f32) {
        let mut width = 0.0f32;
        for (byte_offset, ch) in text.char_indices() {
            let advance = char_cells(ch) as f32 * self.cell_width;
            if width + advance > max_width {
                return (byte_offset, width);
            }
            width += advance;
        }
        (text.len(), width)
    }

    fn text_width(&self, text: &str) -> f32 {
        text.chars().map(char_cells).sum::<usize>() as f32 * self.cell_width
    }

    fn line_metrics(&self) -> LineMetrics {
        let ascent = self.line_height * 0.8;
        LineMetrics {
            ascent,
            descent: self.line_height - ascent,
            height: self.line_height,
        }
    }
}
