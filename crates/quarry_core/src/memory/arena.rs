//! # Arena Allocator
//!
//! A chunked bump allocator for short-lived values that are freed all at once.
//!
//! ## Safety Note
//!
//! This module does the pointer arithmetic for the whole crate. Everything
//! above it (typed values, sequences, text) goes through `Arena::alloc_layout`.
//!
//! ## Layout
//!
//! ```text
//!   chunks:  [ chunk 0 ][ chunk 1 ][ chunk 2 (active) ][ chunk 3 (retained) ]
//!                                   ^         ^
//!                                   cur_start  cur_start + offset
//! ```
//!
//! Allocation bumps `offset` inside the active chunk. When the request does
//! not fit, the arena moves to the next retained chunk if it is large enough,
//! otherwise it inserts a new chunk of `max(chunk_size, request)` right after
//! the active one. A request never spans two chunks.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::mem;
use std::ptr::{self, NonNull};
use std::slice;

use tracing::{debug, trace, warn};

use super::chunk::{Chunk, CHUNK_ALIGN};
use super::retention::{self, Retention};
use crate::config::ArenaConfig;
use crate::error::{ArenaError, ArenaResult};

/// Chunk slots reserved up front in the store.
const INITIAL_CHUNK_SLOTS: usize = 16;

/// A bump-pointer arena allocator.
///
/// Allocations borrow the arena immutably and hand back references that live
/// as long as that borrow. [`Arena::reset`] takes `&mut self`, so the borrow
/// checker guarantees no reference survives a reset.
///
/// Values stored in the arena are never dropped. Reset and drop release the
/// memory only.
///
/// # Thread Safety
///
/// An arena can be moved to another thread (`Send`) but not shared between
/// threads (`!Sync`). Use [`ArenaPool`](super::ArenaPool) to hand arenas
/// between threads.
///
/// # Example
///
/// ```rust
/// use quarry_core::Arena;
///
/// let mut arena = Arena::new(64 * 1024, 0)?;
///
/// let id = arena.alloc(42_u64)?;
/// let name = arena.alloc_str("Ivan")?;
/// assert_eq!((*id, name), (42, "Ivan"));
///
/// // Release everything at once
/// arena.reset();
/// # Ok::<(), quarry_core::ArenaError>(())
/// ```
pub struct Arena {
    /// Chunk store in traversal order.
    chunks: RefCell<Vec<Chunk>>,
    /// Base chunk size.
    chunk_size: usize,
    /// Retention budget applied on reset.
    max_retain: usize,
    /// Index of the active chunk.
    chunk_index: Cell<usize>,
    /// Next free byte in the active chunk.
    offset: Cell<usize>,
    /// Cached start of the active chunk.
    cur_start: Cell<NonNull<u8>>,
    /// Cached capacity of the active chunk. Zero while the store is empty.
    cur_end: Cell<usize>,
    /// Chunks ever obtained from the global allocator.
    chunk_allocations: Cell<u64>,
}

// SAFETY: the arena owns its chunks outright. Moving it to another thread
// requires that no borrow of it is alive, so nothing can observe the chunks
// from the old thread. Cell/RefCell keep it !Sync.
unsafe impl Send for Arena {}

impl Arena {
    /// Creates an arena with the given base chunk size and retention budget.
    ///
    /// A `max_retain` of zero selects `chunk_size * 10`. The first chunk is
    /// allocated immediately.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::InvalidChunkSize`] for a zero chunk size and
    /// [`ArenaError::OutOfMemory`] if the first chunk cannot be allocated.
    pub fn new(chunk_size: usize, max_retain: usize) -> ArenaResult<Self> {
        Self::with_config(&ArenaConfig::new(chunk_size, max_retain))
    }

    /// Creates an arena from a config.
    ///
    /// # Errors
    ///
    /// Same as [`Arena::new`].
    pub fn with_config(config: &ArenaConfig) -> ArenaResult<Self> {
        config.validate()?;

        let first = Chunk::new(config.chunk_size)?;
        let cur_start = first.start();
        let cur_end = first.capacity();

        let mut chunks = Vec::with_capacity(INITIAL_CHUNK_SLOTS);
        chunks.push(first);

        Ok(Self {
            chunks: RefCell::new(chunks),
            chunk_size: config.chunk_size,
            max_retain: config.retention_budget(),
            chunk_index: Cell::new(0),
            offset: Cell::new(0),
            cur_start: Cell::new(cur_start),
            cur_end: Cell::new(cur_end),
            chunk_allocations: Cell::new(1),
        })
    }

    /// Base chunk size in bytes.
    #[inline]
    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Effective retention budget in bytes.
    #[inline]
    #[must_use]
    pub const fn max_retain(&self) -> usize {
        self.max_retain
    }

    /// Number of chunks currently in the store.
    #[inline]
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.borrow().len()
    }

    /// Total capacity of all chunks in the store.
    #[must_use]
    pub fn retained_bytes(&self) -> usize {
        self.chunks.borrow().iter().map(Chunk::capacity).sum()
    }

    /// Offset of the cursor inside the active chunk.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset.get()
    }

    /// Index of the active chunk.
    #[inline]
    #[must_use]
    pub fn active_chunk(&self) -> usize {
        self.chunk_index.get()
    }

    /// Number of chunks ever obtained from the global allocator.
    #[inline]
    #[must_use]
    pub fn chunk_allocations(&self) -> u64 {
        self.chunk_allocations.get()
    }

    /// Snapshot of the arena's bookkeeping.
    #[must_use]
    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            chunk_count: self.chunk_count(),
            chunk_size: self.chunk_size,
            max_retain: self.max_retain,
            retained_bytes: self.retained_bytes(),
            active_chunk: self.active_chunk(),
            offset: self.offset(),
            chunk_allocations: self.chunk_allocations(),
        }
    }

    /// Reserves `layout.size()` bytes aligned to `layout.align()`.
    ///
    /// Zero-sized requests return an aligned dangling pointer and leave the
    /// cursor where it is.
    #[inline]
    pub(crate) fn alloc_layout(&self, layout: Layout) -> ArenaResult<NonNull<u8>> {
        if layout.size() == 0 {
            // SAFETY: alignment is never zero
            return Ok(unsafe { NonNull::new_unchecked(layout.align() as *mut u8) });
        }

        if let Some(ptr) = self.try_bump(layout.size(), layout.align()) {
            return Ok(ptr);
        }

        self.grow_and_alloc(layout.size(), layout.align())
    }

    /// Reserves storage for `capacity` values of `T`.
    pub(crate) fn alloc_array<T>(&self, capacity: usize) -> ArenaResult<NonNull<T>> {
        let layout = Layout::array::<T>(capacity).map_err(|_| ArenaError::CapacityOverflow {
            count: capacity,
            element_size: mem::size_of::<T>(),
        })?;
        Ok(self.alloc_layout(layout)?.cast())
    }

    /// Fast path: bump inside the active chunk.
    #[inline(always)]
    fn try_bump(&self, size: usize, align: usize) -> Option<NonNull<u8>> {
        debug_assert!(align.is_power_of_two(), "alignment must be power of 2");

        let start = self.cur_start.get();
        let offset = self.offset.get();
        let addr = (start.as_ptr() as usize).wrapping_add(offset);
        let padding = addr.wrapping_neg() & (align - 1);

        let new_offset = offset.checked_add(padding)?.checked_add(size)?;
        if new_offset > self.cur_end.get() {
            return None;
        }

        self.offset.set(new_offset);
        // SAFETY: offset + padding + size <= capacity of the active chunk
        Some(unsafe { NonNull::new_unchecked(start.as_ptr().add(offset + padding)) })
    }

    /// Slow path: switch to or create a chunk, then retry once.
    #[cold]
    #[inline(never)]
    fn grow_and_alloc(&self, size: usize, align: usize) -> ArenaResult<NonNull<u8>> {
        // Chunks start CHUNK_ALIGN-aligned; stricter alignments need slack.
        let required = if align <= CHUNK_ALIGN {
            size
        } else {
            size.checked_add(align).ok_or(ArenaError::CapacityOverflow {
                count: size,
                element_size: 1,
            })?
        };

        self.ensure(required)?;

        self.try_bump(size, align)
            .ok_or(ArenaError::OutOfMemory { size: required, align })
    }

    /// Makes a chunk with at least `required` bytes active.
    fn ensure(&self, required: usize) -> ArenaResult<()> {
        let mut chunks = self.chunks.borrow_mut();
        let next = if chunks.is_empty() {
            0
        } else {
            self.chunk_index.get() + 1
        };

        if let Some(chunk) = chunks.get(next) {
            if chunk.capacity() >= required {
                trace!(chunk = next, capacity = chunk.capacity(), "reusing retained chunk");
                self.activate(next, chunk);
                return Ok(());
            }
        }

        let chunk = Chunk::new(required.max(self.chunk_size))?;
        let allocations = self.chunk_allocations.get() + 1;
        self.chunk_allocations.set(allocations);
        debug!(
            chunk = next,
            capacity = chunk.capacity(),
            allocations,
            "allocated new chunk"
        );

        self.activate(next, &chunk);
        chunks.insert(next, chunk);
        Ok(())
    }

    #[inline]
    fn activate(&self, index: usize, chunk: &Chunk) {
        self.chunk_index.set(index);
        self.offset.set(0);
        self.cur_start.set(chunk.start());
        self.cur_end.set(chunk.capacity());
    }

    /// Resets the arena, releasing every allocation at once.
    ///
    /// The cursor moves back to the start of the first chunk, then the
    /// retention policy trims the store:
    ///
    /// - empty store, or first chunk alone over budget: replace everything
    ///   with one fresh chunk of `chunk_size`
    /// - otherwise keep chunks up to and including the one at which the
    ///   running capacity first exceeds the budget
    ///
    /// Memory is not zeroed. Cost is O(number of chunks).
    pub fn reset(&mut self) {
        let chunks = self.chunks.get_mut();
        let before = chunks.len();

        match retention::plan(chunks.iter().map(Chunk::capacity), self.max_retain) {
            Retention::Fresh => {
                chunks.clear();
                match Chunk::new(self.chunk_size) {
                    Ok(chunk) => {
                        *self.chunk_allocations.get_mut() += 1;
                        chunks.push(chunk);
                    }
                    // Next allocation creates the chunk through the growth path
                    Err(err) => warn!(error = %err, "reset could not allocate a fresh chunk"),
                }
            }
            Retention::Keep(count) => chunks.truncate(count),
        }

        let (start, end) = chunks
            .first()
            .map_or((NonNull::dangling(), 0), |chunk| (chunk.start(), chunk.capacity()));
        let after = chunks.len();

        *self.chunk_index.get_mut() = 0;
        *self.offset.get_mut() = 0;
        *self.cur_start.get_mut() = start;
        *self.cur_end.get_mut() = end;

        if after < before {
            debug!(retained = after, dropped = before - after, "reset trimmed chunks");
        }
    }

    /// Moves `value` into the arena.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::OutOfMemory`] if a new chunk was needed and could
    /// not be allocated.
    #[inline]
    #[allow(clippy::mut_from_ref)]
    pub fn alloc<T>(&self, value: T) -> ArenaResult<&mut T> {
        self.alloc_with(|| value)
    }

    /// Reserves a slot for `T` and fills it with the result of `f`.
    ///
    /// Zero-sized types never move the cursor.
    ///
    /// # Errors
    ///
    /// Same as [`Arena::alloc`].
    #[inline]
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_with<T, F>(&self, f: F) -> ArenaResult<&mut T>
    where
        F: FnOnce() -> T,
    {
        let ptr = self.alloc_layout(Layout::new::<T>())?.cast::<T>();
        // SAFETY: ptr is aligned for T, valid for writes of size_of::<T>() and
        // disjoint from every other allocation handed out since the last reset
        unsafe {
            ptr.as_ptr().write(f());
            Ok(&mut *ptr.as_ptr())
        }
    }

    /// Moves `T::default()` into the arena.
    ///
    /// # Errors
    ///
    /// Same as [`Arena::alloc`].
    #[inline]
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_default<T: Default>(&self) -> ArenaResult<&mut T> {
        self.alloc_with(T::default)
    }

    /// Copies a slice into the arena.
    ///
    /// An empty slice is returned without touching the cursor.
    ///
    /// # Errors
    ///
    /// Same as [`Arena::alloc`].
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_slice_copy<T: Copy>(&self, src: &[T]) -> ArenaResult<&mut [T]> {
        if src.is_empty() {
            return Ok(&mut []);
        }

        let ptr = self.alloc_layout(Layout::for_value(src))?.cast::<T>();
        // SAFETY: the destination is a fresh region sized and aligned for
        // src.len() values of T, so the ranges cannot overlap
        unsafe {
            ptr::copy_nonoverlapping(src.as_ptr(), ptr.as_ptr(), src.len());
            Ok(slice::from_raw_parts_mut(ptr.as_ptr(), src.len()))
        }
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("chunk_count", &self.chunk_count())
            .field("chunk_size", &self.chunk_size)
            .field("max_retain", &self.max_retain)
            .field("active_chunk", &self.active_chunk())
            .field("offset", &self.offset())
            .finish()
    }
}

/// Arena statistics for monitoring and debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStats {
    /// Chunks currently in the store.
    pub chunk_count: usize,
    /// Base chunk size.
    pub chunk_size: usize,
    /// Effective retention budget.
    pub max_retain: usize,
    /// Total capacity of the chunk store.
    pub retained_bytes: usize,
    /// Index of the active chunk.
    pub active_chunk: usize,
    /// Cursor offset inside the active chunk.
    pub offset: usize,
    /// Chunks ever obtained from the global allocator.
    pub chunk_allocations: u64,
}
