//! Host Interfaces
//!
//! Collaborators the field consumes from its host: the system clipboard, the change
//! notification sink and the optional color-class hook used by syntax coloring.

use serde::Serialize;
use std::ops::Range;
use std::sync::{Arc, Mutex, PoisonError};

/// System clipboard access.
pub trait Clipboard {
    /// Current clipboard text, if any.
    fn get_text(&mut self) -> Option<String>;

    /// Replace the clipboard text. Returns `false` when the host refused.
    fn set_text(&mut self, text: &str) -> bool;
}

/// In-process clipboard. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Arc<Mutex<Option<String>>>,
}

impl MemoryClipboard {
    /// Create an empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clipboard holding `text`.
    pub fn with_text(text: &str) -> Self {
        let clipboard = Self::new();
        *clipboard.lock() = Some(text.to_string());
        clipboard
    }

    /// Snapshot of the current contents.
    pub fn contents(&self) -> Option<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.contents.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clipboard for MemoryClipboard {
    fn get_text(&mut self) -> Option<String> {
        self.contents()
    }

    fn set_text(&mut self, text: &str) -> bool {
        *self.lock() = Some(text.to_string());
        true
    }
}

/// Compact change record for hosts that do not want the full text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldStats {
    /// Caret byte offset.
    pub cursor_byte: usize,
    /// Row holding the caret.
    pub cursor_row: usize,
    /// Caret column in `char`s from the row start.
    pub cursor_col: usize,
    /// Number of rows.
    pub total_rows: usize,
    /// Buffer length in bytes.
    pub total_bytes: usize,
    /// Number of undo steps available.
    pub pending_undo_count: usize,
}

/// Payload delivered to change subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ChangePayload {
    /// Full text after the change.
    Text(String),
    /// Stats after the change.
    Stats(FieldStats),
}

/// Change subscriber.
pub type ChangeCallback = Box<dyn FnMut(&ChangePayload) + Send>;

/// Supplies a color class per byte for rendering.
///
/// `text` is the whole buffer so the classifier can look at context; `classes` covers the
/// bytes of `range` and arrives zero-filled.
pub trait ColorClassifier {
    /// Fill `classes` for the bytes in `range`.
    fn classify(&self, text: &str, range: Range<usize>, classes: &mut [u8]);
}

impl<F> ColorClassifier for F
where
    F: Fn(&str, Range<usize>, &mut [u8]),
{
    fn classify(&self, text: &str, range: Range<usize>, classes: &mut [u8]) {
        self(text, range, classes)
    }
}
