//! # Arena Text
//!
//! Copies of strings and byte strings that live in an [`Arena`].

#![allow(unsafe_code)]

use std::str;

use super::arena::Arena;
use crate::error::ArenaResult;

impl Arena {
    /// Copies bytes into the arena and returns a read-only view of the copy.
    ///
    /// Empty input returns an empty view without touching the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::OutOfMemory`](crate::ArenaError::OutOfMemory) if
    /// the arena cannot grow.
    pub fn alloc_bytes(&self, bytes: &[u8]) -> ArenaResult<&[u8]> {
        self.alloc_slice_copy(bytes).map(|copy| &*copy)
    }

    /// Copies a string into the arena.
    ///
    /// Empty input returns `""` without touching the cursor.
    ///
    /// # Errors
    ///
    /// Same as [`Arena::alloc_bytes`].
    pub fn alloc_str(&self, text: &str) -> ArenaResult<&str> {
        if text.is_empty() {
            return Ok("");
        }

        let bytes = self.alloc_slice_copy(text.as_bytes())?;
        // SAFETY: bytes is a verbatim copy of a valid &str
        Ok(unsafe { str::from_utf8_unchecked(bytes) })
    }

    /// Validates `bytes` as UTF-8 and copies them into the arena as text.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::InvalidUtf8`](crate::ArenaError::InvalidUtf8)
    /// before allocating anything if the bytes are not UTF-8.
    pub fn alloc_str_from_utf8(&self, bytes: &[u8]) -> ArenaResult<&str> {
        let text = str::from_utf8(bytes)?;
        self.alloc_str(text)
    }
}
