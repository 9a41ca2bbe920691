//! Text Buffer
//!
//! Owns the raw UTF-8 bytes of a field. Two storage policies exist:
//!
//! - **Dynamic**: an owned `Vec<u8>` that grows in 256-byte steps.
//! - **Fixed**: a caller-supplied `&mut [u8]`. The caller keeps ownership of the memory and
//!   the buffer never reallocates; an insert that does not fit is rejected as a whole.
//!
//! All offsets are byte offsets. The buffer itself does not snap offsets to `char`
//! boundaries; the edit controller only ever hands it boundaries, which keeps the content
//! valid UTF-8.

use std::ops::Range;

/// Growth quantum of dynamic buffers, in bytes.
pub const GROWTH_QUANTUM: usize = 256;

enum Storage<'a> {
    Dynamic(Vec<u8>),
    Fixed(&'a mut [u8]),
}

/// UTF-8 byte storage with an explicit length/capacity pair.
pub struct TextBuffer<'a> {
    storage: Storage<'a>,
    len: usize,
    capacity: usize,
}

impl std::fmt::Debug for TextBuffer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextBuffer")
            .field("text", &self.as_str())
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .field("fixed", &self.is_fixed())
            .finish()
    }
}

fn grown_capacity(required: usize) -> usize {
    (required / GROWTH_QUANTUM + 1) * GROWTH_QUANTUM
}

impl TextBuffer<'static> {
    /// Create an empty dynamic buffer.
    pub fn new() -> Self {
        Self {
            storage: Storage::Dynamic(Vec::new()),
            len: 0,
            capacity: 0,
        }
    }

    /// Create a dynamic buffer holding `text`.
    pub fn from_text(text: &str) -> Self {
        let mut buffer = Self::new();
        buffer.insert(0, text.as_bytes());
        buffer
    }
}

impl Default for TextBuffer<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> TextBuffer<'a> {
    /// Wrap caller-owned storage. The first `len` bytes are the initial content.
    ///
    /// Returns `None` when `len` exceeds the storage size.
    pub fn fixed(storage: &'a mut [u8], len: usize) -> Option<Self> {
        if len > storage.len() {
            return None;
        }
        let capacity = storage.len();
        Some(Self {
            storage: Storage::Fixed(storage),
            len,
            capacity,
        })
    }

    /// Current length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Capacity in bytes. For dynamic buffers this is the current allocation step, not a limit.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the buffer uses caller-supplied fixed storage.
    pub fn is_fixed(&self) -> bool {
        matches!(self.storage, Storage::Fixed(_))
    }

    /// The hard capacity limit, if any.
    pub fn fixed_capacity(&self) -> Option<usize> {
        self.is_fixed().then_some(self.capacity)
    }

    /// Whether `additional` more bytes can be stored.
    pub fn can_grow_by(&self, additional: usize) -> bool {
        match self.fixed_capacity() {
            Some(capacity) => self.len + additional <= capacity,
            None => true,
        }
    }

    /// Raw content bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.storage {
            Storage::Dynamic(bytes) => bytes,
            Storage::Fixed(bytes) => &bytes[..self.len],
        }
    }

    /// Content as `&str`.
    ///
    /// Content is valid UTF-8 by construction; should that ever be violated the longest valid
    /// prefix is returned instead of panicking.
    pub fn as_str(&self) -> &str {
        let bytes = self.as_bytes();
        match std::str::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => std::str::from_utf8(&bytes[..err.valid_up_to()]).unwrap_or_default(),
        }
    }

    /// Bytes in `range`, clamped to the content.
    pub fn slice(&self, range: Range<usize>) -> &[u8] {
        let end = range.end.min(self.len);
        let start = range.start.min(end);
        &self.as_bytes()[start..end]
    }

    /// Insert `bytes` at `pos`.
    ///
    /// Returns `false` without writing anything when `pos` is past the end or when a fixed
    /// buffer lacks room for the whole insert.
    pub fn insert(&mut self, pos: usize, bytes: &[u8]) -> bool {
        if pos > self.len {
            return false;
        }
        if bytes.is_empty() {
            return true;
        }

        let required = self.len + bytes.len();
        match &mut self.storage {
            Storage::Dynamic(vec) => {
                if required > self.capacity {
                    let capacity = grown_capacity(required);
                    vec.reserve_exact(capacity - vec.len());
                    self.capacity = capacity;
                }
                vec.splice(pos..pos, bytes.iter().copied());
            }
            Storage::Fixed(storage) => {
                if required > storage.len() {
                    tracing::debug!(
                        len = self.len,
                        insert = bytes.len(),
                        capacity = storage.len(),
                        "fixed buffer full, insert rejected"
                    );
                    return false;
                }
                storage.copy_within(pos..self.len, pos + bytes.len());
                storage[pos..pos + bytes.len()].copy_from_slice(bytes);
            }
        }
        self.len = required;
        true
    }

    /// Delete `len` bytes starting at `pos`.
    ///
    /// Returns `false` without changing anything when the range is out of bounds.
    pub fn delete(&mut self, pos: usize, len: usize) -> bool {
        let Some(end) = pos.checked_add(len) else {
            return false;
        };
        if end > self.len {
            return false;
        }
        if len == 0 {
            return true;
        }

        match &mut self.storage {
            Storage::Dynamic(vec) => {
                vec.drain(pos..end);
            }
            Storage::Fixed(storage) => {
                storage.copy_within(end..self.len, pos);
            }
        }
        self.len -= len;
        true
    }

    /// Replace the whole content. Fails as a whole when a fixed buffer is too small.
    pub fn replace_all(&mut self, bytes: &[u8]) -> bool {
        if let Some(capacity) = self.fixed_capacity()
            && bytes.len() > capacity
        {
            return false;
        }
        let len = self.len;
        self.delete(0, len) && self.insert(0, bytes)
    }
}
