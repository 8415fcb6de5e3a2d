//! # Chunk
//!
//! One fixed-capacity buffer obtained from the global allocator.

#![allow(unsafe_code)]

use std::alloc::{alloc, dealloc, Layout};
use std::ptr::NonNull;

use crate::error::{ArenaError, ArenaResult};

/// Base alignment of every chunk (one cache line).
pub const CHUNK_ALIGN: usize = 64;

/// A contiguous buffer that is never resized or moved once created.
///
/// The buffer lives on the heap, so moving the `Chunk` handle (for example
/// inside a growing `Vec`) leaves every pointer into it valid.
pub(crate) struct Chunk {
    data: NonNull<u8>,
    layout: Layout,
}

impl Chunk {
    /// Allocates an uninitialized chunk of `capacity` bytes.
    pub(crate) fn new(capacity: usize) -> ArenaResult<Self> {
        debug_assert!(capacity > 0, "chunk capacity must be non-zero");

        let layout = Layout::from_size_align(capacity, CHUNK_ALIGN).map_err(|_| {
            ArenaError::CapacityOverflow {
                count: capacity,
                element_size: 1,
            }
        })?;

        // SAFETY: layout has non-zero size (chunk sizes are validated > 0)
        let ptr = unsafe { alloc(layout) };
        let data = NonNull::new(ptr).ok_or(ArenaError::OutOfMemory {
            size: capacity,
            align: CHUNK_ALIGN,
        })?;

        Ok(Self { data, layout })
    }

    /// Start of the buffer.
    #[inline]
    pub(crate) const fn start(&self) -> NonNull<u8> {
        self.data
    }

    /// Capacity in bytes.
    #[inline]
    pub(crate) const fn capacity(&self) -> usize {
        self.layout.size()
    }
}

impl Drop for Chunk {
    fn drop(&mut self) {
        // SAFETY: data was returned by `alloc` with exactly this layout
        unsafe {
            dealloc(self.data.as_ptr(), self.layout);
        }
    }
}
