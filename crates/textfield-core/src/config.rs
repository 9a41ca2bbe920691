//! Field Configuration
//!
//! Construction options of a [`TextField`](crate::TextField). Everything is plain data with
//! serde support, so hosts can keep field definitions in their own config files. Missing keys
//! take their defaults.
//!
//! The optional caller-supplied fixed buffer is not part of the configuration; it is passed to
//! [`TextField::with_fixed_buffer`](crate::TextField::with_fixed_buffer) directly.

use crate::error::ConfigError;
use crate::history::{DEFAULT_MERGE_WINDOW, UndoBudget};
use crate::numeric::{NumericAdapter, NumericConfig, NumericKind};
use crate::wrap::WrapMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Closed set of field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditKind {
    /// Free text.
    #[default]
    Plain,
    /// Free text displayed masked.
    Password,
    /// Whole number.
    Integer,
    /// Single precision number.
    Float,
    /// Double precision number.
    Double,
}

impl EditKind {
    /// Numeric interpretation, if any.
    pub fn numeric_kind(self) -> Option<NumericKind> {
        match self {
            EditKind::Integer => Some(NumericKind::Integer),
            EditKind::Float => Some(NumericKind::Float),
            EditKind::Double => Some(NumericKind::Double),
            EditKind::Plain | EditKind::Password => None,
        }
    }

    /// Whether this is a numeric kind.
    pub fn is_numeric(self) -> bool {
        self.numeric_kind().is_some()
    }
}

/// Handling of the Tab key and of tabs in inserted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabMode {
    /// Insert a literal tab.
    #[default]
    Preserve,
    /// Insert spaces up to the next tab stop.
    ConvertToSpaces,
    /// Leave the Tab key to the host (focus traversal); tabs in inserted text become spaces.
    Forbid,
}

/// Caret shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaretStyle {
    /// Thin vertical bar.
    #[default]
    IBeam,
    /// Full cell.
    Block,
    /// Bar under the cell.
    Underline,
}

/// Caret appearance and behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaretConfig {
    /// Shape.
    pub style: CaretStyle,
    /// Blink while focused.
    pub blink: bool,
    /// Notify subscribers on caret movement, not only on text changes.
    pub notify: bool,
}

impl Default for CaretConfig {
    fn default() -> Self {
        Self {
            style: CaretStyle::IBeam,
            blink: true,
            notify: false,
        }
    }
}

/// What change subscribers receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyMode {
    /// The full text.
    #[default]
    Text,
    /// A [`FieldStats`](crate::FieldStats) record.
    Stats,
}

/// Construction options of a text field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Field kind.
    pub kind: EditKind,
    /// Reject all edits (selection and copy still work).
    pub read_only: bool,
    /// Single row, no wrapping, newlines truncate the insert.
    pub single_line: bool,
    /// Text shown while the field is empty and unfocused.
    pub placeholder: String,
    /// Undo budget in bytes. `None` uses the kind default (unbounded, or disabled for
    /// passwords); `Some(0)` disables undo.
    pub max_undo_bytes: Option<usize>,
    /// Maximum number of rows, `0` for unbounded.
    pub max_rows: usize,
    /// Soft wrapping mode.
    pub wrap_mode: WrapMode,
    /// Tab handling.
    pub tab_mode: TabMode,
    /// Tab stop distance in columns.
    pub tab_size: usize,
    /// Caret options.
    pub caret: CaretConfig,
    /// Queue change notifications at all.
    pub notify_changes: bool,
    /// Notification payload.
    pub notify_mode: NotifyMode,
    /// Numeric bounds, step and precision (numeric kinds only).
    pub numeric: NumericConfig,
    /// Undo merge window in milliseconds.
    pub merge_window_ms: u64,
    /// Multi-click window in milliseconds.
    pub double_click_ms: u64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            kind: EditKind::Plain,
            read_only: false,
            single_line: false,
            placeholder: String::new(),
            max_undo_bytes: None,
            max_rows: 0,
            wrap_mode: WrapMode::Word,
            tab_mode: TabMode::Preserve,
            tab_size: 4,
            caret: CaretConfig::default(),
            notify_changes: true,
            notify_mode: NotifyMode::Text,
            numeric: NumericConfig::default(),
            merge_window_ms: DEFAULT_MERGE_WINDOW.as_millis() as u64,
            double_click_ms: 400,
        }
    }
}

impl FieldConfig {
    /// Single-line plain text field.
    pub fn single_line() -> Self {
        Self {
            single_line: true,
            wrap_mode: WrapMode::None,
            ..Self::default()
        }
    }

    /// Multi-line word-wrapped text area.
    pub fn multi_line() -> Self {
        Self::default()
    }

    /// Single-line masked field without undo.
    pub fn password() -> Self {
        Self {
            kind: EditKind::Password,
            ..Self::single_line()
        }
    }

    /// Integer entry clamped to `[min, max]`.
    pub fn integer(min: Option<f64>, max: Option<f64>) -> Self {
        Self::numeric(EditKind::Integer, min, max)
    }

    /// Single precision entry.
    pub fn float(min: Option<f64>, max: Option<f64>) -> Self {
        Self::numeric(EditKind::Float, min, max)
    }

    /// Double precision entry.
    pub fn double(min: Option<f64>, max: Option<f64>) -> Self {
        Self::numeric(EditKind::Double, min, max)
    }

    fn numeric(kind: EditKind, min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            kind,
            numeric: NumericConfig {
                min,
                max,
                ..NumericConfig::default()
            },
            ..Self::single_line()
        }
    }

    /// Whether the field is limited to one row. Numeric fields always are.
    pub fn is_single_line(&self) -> bool {
        self.single_line || self.kind.is_numeric()
    }

    /// Effective row limit, `0` for unbounded.
    pub fn row_limit(&self) -> usize {
        if self.is_single_line() {
            1
        } else {
            self.max_rows
        }
    }

    /// Effective wrap mode.
    pub fn effective_wrap_mode(&self) -> WrapMode {
        if self.is_single_line() {
            WrapMode::None
        } else {
            self.wrap_mode
        }
    }

    /// Effective undo budget.
    pub fn undo_budget(&self) -> UndoBudget {
        match (self.kind, self.max_undo_bytes) {
            (EditKind::Password, None) => UndoBudget::Disabled,
            (_, limit) => UndoBudget::from_limit(limit),
        }
    }

    /// Undo merge window.
    pub fn merge_window(&self) -> Duration {
        Duration::from_millis(self.merge_window_ms)
    }

    /// Multi-click window.
    pub fn double_click_window(&self) -> Duration {
        Duration::from_millis(self.double_click_ms)
    }

    /// Check option consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tab_size == 0 {
            return Err(ConfigError::InvalidTabSize);
        }

        if let Some(kind) = self.kind.numeric_kind() {
            let step = self.numeric.step;
            if !step.is_finite() || step <= 0.0 {
                return Err(ConfigError::InvalidStep(step));
            }
            let (min, max) = NumericAdapter::new(kind, self.numeric.clone()).bounds();
            if min.is_nan() || max.is_nan() || min > max {
                return Err(ConfigError::InvalidNumericRange { min, max });
            }
        }
        Ok(())
    }
}
