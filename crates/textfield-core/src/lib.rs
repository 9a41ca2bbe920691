#![warn(missing_docs)]
//! Textfield Core - Headless Text Field Engine
//!
//! # Overview
//!
//! `textfield-core` is the editing kernel of a single/multi-line text field, meant to sit
//! underneath a widget toolkit. It owns the text and everything derived from it, but never
//! draws, never reads a clock and never talks to the OS: glyph measurement, the clipboard and
//! timer scheduling are supplied by the host.
//!
//! # Core Features
//!
//! - **Byte Buffer**: UTF-8 bytes in an owned growable vector, or in caller-supplied fixed
//!   storage that is edited in place
//! - **Incremental Word Wrap**: None / Char / Word modes; an edit rewraps only the rows it
//!   touches
//! - **Cursor and Selection**: code point, word, row and vertical motion with a remembered
//!   column; double/triple click selection
//! - **Merging Undo Log**: typing and backspacing bursts undo in one step, with an optional
//!   byte budget
//! - **Numeric Entry**: Integer / Float / Double fields with clamping, formatting and
//!   drift-free step buttons
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Edit Controller (TextField)                │  ← Public API
//! ├──────────────────────┬──────────────────────┤
//! │  Undo / Redo Log     │  Numeric Adapter     │
//! ├──────────────────────┴──────────────────────┤
//! │  Cursor / Selection Model                   │
//! ├─────────────────────────────────────────────┤
//! │  Word-Wrap Engine → Row Index               │  ← Text Layout
//! ├─────────────────────────────────────────────┤
//! │  Text Buffer                                │  ← Text Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use textfield_core::{FieldConfig, Key, MemoryClipboard, Modifiers, MonospaceMetrics, TextField};
//!
//! let mut field =
//!     TextField::new(FieldConfig::multi_line(), MonospaceMetrics::unit(), MemoryClipboard::new())
//!         .unwrap();
//! field.set_viewport(20.0, 5.0);
//! field.focus_gained(Duration::ZERO);
//!
//! for (i, ch) in "hello".chars().enumerate() {
//!     field.key_press(Key::Char(ch), Modifiers::NONE, Duration::from_millis(i as u64 * 50));
//! }
//! assert_eq!(field.text(), "hello");
//!
//! // One burst, one undo step.
//! assert_eq!(field.undo_depth(), 1);
//! ```
//!
//! ## Numeric Fields
//!
//! ```rust
//! use std::time::Duration;
//! use textfield_core::{FieldConfig, MemoryClipboard, MonospaceMetrics, TextField};
//!
//! let config = FieldConfig::integer(Some(0.0), Some(10.0));
//! let mut field = TextField::new(config, MonospaceMetrics::unit(), MemoryClipboard::new()).unwrap();
//!
//! field.focus_gained(Duration::ZERO);
//! field.insert_text("-5", Duration::ZERO);
//! field.focus_lost();
//!
//! assert_eq!(field.text(), "0");
//! assert_eq!(field.value(), Some(0.0));
//! ```
//!
//! # Module Description
//!
//! - [`metrics`] - Glyph measurement trait and a monospace reference provider
//! - [`host`] - Clipboard, change notification and color class interfaces
//! - [`buffer`] - Dynamic or fixed-capacity byte storage
//! - [`rows`] - Row index
//! - [`wrap`] - Word-wrap engine
//! - [`cursor`] - Caret, selection and motion primitives
//! - [`history`] - Undo/redo log
//! - [`numeric`] - Numeric parsing, formatting and stepping
//! - [`timers`] - Scheduled actions
//! - [`config`] - Construction options
//! - [`field`] - The edit controller
//!
//! # Unicode Support
//!
//! - UTF-8 internal encoding; every offset handed out lies on a code point boundary
//! - Proper handling of CJK double-width characters in the monospace provider
//! - Password masking per grapheme cluster

pub mod buffer;
pub mod config;
pub mod cursor;
pub mod error;
pub mod field;
pub mod history;
pub mod host;
pub mod metrics;
pub mod numeric;
pub mod rows;
pub mod timers;
pub mod wrap;

pub use buffer::TextBuffer;
pub use config::{CaretConfig, CaretStyle, EditKind, FieldConfig, NotifyMode, TabMode};
pub use cursor::{ClickTracker, EditState, SelectionScope};
pub use error::ConfigError;
pub use field::{FieldState, Key, Modifiers, Motion, PASSWORD_MASK, ScrollState, TextField};
pub use history::{UndoBudget, UndoEntry, UndoLog, UndoOp};
pub use host::{
    ChangeCallback, ChangePayload, Clipboard, ColorClassifier, FieldStats, MemoryClipboard,
};
pub use metrics::{GlyphMetrics, LineMetrics, MonospaceMetrics};
pub use numeric::{NumericAdapter, NumericConfig, NumericKind, SpinDirection};
pub use rows::{Row, RowIndex};
pub use timers::{TimerAction, TimerKind, TimerSet};
pub use wrap::{WrapEngine, WrapMode};
