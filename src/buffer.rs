// src/buffer.rs
//
// Append-only text buffer for canonical wire records.
//
// The serializer writes whole records into a caller-owned DataBuffer; the
// transport layer reads the materialized text and ships it unmodified. A
// buffer can be cleared and refilled to amortize allocation across many
// events. Single-writer only: ownership is handed to transport after the
// filling thread has finished all writes.

use std::fmt;

/// Append-only byte sink that materializes its contents as text.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DataBuffer {
    body: String,
}

impl DataBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self { body: String::new() }
    }

    /// Create an empty buffer with pre-reserved capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            body: String::with_capacity(capacity),
        }
    }

    /// Append raw text verbatim.
    pub fn push_str(&mut self, text: &str) {
        self.body.push_str(text);
    }

    /// Append a single character.
    pub fn push_char(&mut self, ch: char) {
        self.body.push(ch);
    }

    /// Accumulated contents.
    pub fn as_str(&self) -> &str {
        &self.body
    }

    /// Number of accumulated bytes.
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Allocated capacity in bytes. Retained across `clear`.
    pub fn capacity(&self) -> usize {
        self.body.capacity()
    }

    /// Discard contents but keep the allocation for reuse.
    pub fn clear(&mut self) {
        self.body.clear();
    }

    /// Consume the buffer, yielding its contents.
    pub fn into_string(self) -> String {
        self.body
    }
}

impl fmt::Write for DataBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.body.push_str(s);
        Ok(())
    }
}

impl AsRef<str> for DataBuffer {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
