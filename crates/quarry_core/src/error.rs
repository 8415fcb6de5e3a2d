//! # Arena Error Types
//!
//! All errors that can occur while configuring or allocating from an arena.

use std::str::Utf8Error;

use thiserror::Error;

/// Errors that can occur in the arena allocator.
///
/// Every error is returned before the arena is mutated, so a failed call
/// leaves the cursor and the chunk store exactly as they were.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
    /// Chunk size is zero or too large to describe as a memory layout.
    #[error("invalid chunk size: {size} bytes")]
    InvalidChunkSize {
        /// The rejected chunk size.
        size: usize,
    },

    /// A sequence was requested with more initialized elements than capacity.
    #[error("sequence length {length} exceeds capacity {capacity}")]
    LengthExceedsCapacity {
        /// Requested number of initialized elements.
        length: usize,
        /// Requested capacity.
        capacity: usize,
    },

    /// `count * element_size` does not fit in the address space.
    #[error("capacity overflow: {count} elements of {element_size} bytes")]
    CapacityOverflow {
        /// Requested number of elements.
        count: usize,
        /// Size of one element in bytes.
        element_size: usize,
    },

    /// The global allocator could not provide a new chunk.
    #[error("out of memory: failed to allocate {size} bytes aligned to {align}")]
    OutOfMemory {
        /// Size of the chunk that could not be allocated.
        size: usize,
        /// Alignment of the chunk that could not be allocated.
        align: usize,
    },

    /// Bytes handed to a text allocation were not valid UTF-8.
    #[error("invalid utf-8 text: {0}")]
    InvalidUtf8(#[from] Utf8Error),

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for arena operations.
pub type ArenaResult<T> = Result<T, ArenaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ArenaError::LengthExceedsCapacity {
            length: 4,
            capacity: 2,
        };
        assert_eq!(err.to_string(), "sequence length 4 exceeds capacity 2");

        let err = ArenaError::InvalidChunkSize { size: 0 };
        assert_eq!(err.to_string(), "invalid chunk size: 0 bytes");
    }

    #[test]
    fn test_utf8_error_converts() {
        let bytes = [0xff_u8, 0xfe];
        let err: ArenaError = std::str::from_utf8(&bytes).unwrap_err().into();
        assert!(matches!(err, ArenaError::InvalidUtf8(_)));
    }
}
