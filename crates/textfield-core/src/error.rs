//! Construction errors.
//!
//! Runtime editing never fails with an error: rejected edits return `false` and out-of-range
//! arguments are clamped. Only building a field from an invalid configuration does.

use thiserror::Error;

/// Invalid field configuration or initial content.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// `min` is greater than `max` (after applying the kind's default range).
    #[error("invalid numeric range: min {min} is greater than max {max}")]
    InvalidNumericRange {
        /// Effective lower bound.
        min: f64,
        /// Effective upper bound.
        max: f64,
    },

    /// Step is zero, negative or not finite.
    #[error("invalid numeric step: {0}")]
    InvalidStep(f64),

    /// Tab size of zero columns.
    #[error("tab size must be at least 1 column")]
    InvalidTabSize,

    /// Initial content does not fit the supplied storage.
    #[error("initial text of {len} bytes exceeds buffer capacity {capacity}")]
    InitialTextTooLarge {
        /// Initial content length.
        len: usize,
        /// Storage capacity.
        capacity: usize,
    },

    /// Initial content of a fixed buffer is not UTF-8.
    #[error("initial text is not valid UTF-8 (valid up to byte {0})")]
    InitialTextNotUtf8(usize),

    /// Initial content has more lines than a bounded field allows.
    #[error("initial text spans {rows} rows but the field allows {limit}")]
    InitialTextExceedsRows {
        /// Rows of the initial content.
        rows: usize,
        /// Effective row limit.
        limit: usize,
    },
}
