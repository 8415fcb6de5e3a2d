//! # Arena Sequences
//!
//! A growable sequence whose storage lives in an [`Arena`].
//!
//! Growing past capacity copies the elements into a new region of
//! `max(2 * capacity, len + additional)` and leaves the old region untouched.
//! The old bytes stay dead until the arena is reset.

#![allow(unsafe_code)]

use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};
use std::slice;

use super::arena::Arena;
use crate::error::{ArenaError, ArenaResult};

/// A sequence backed by arena memory.
///
/// Only the first `len` slots are initialized; the rest of the capacity is
/// never readable. Elements are not dropped.
///
/// # Example
///
/// ```rust
/// use quarry_core::Arena;
///
/// let arena = Arena::new(1024, 0)?;
/// let users = arena.alloc_sequence::<u32>(0, 2)?;
/// let users = arena.append(users, [1, 2, 3])?;
///
/// assert_eq!(&*users, &[1, 2, 3]);
/// assert_eq!(users.capacity(), 4);
/// # Ok::<(), quarry_core::ArenaError>(())
/// ```
pub struct ArenaVec<'a, T> {
    ptr: NonNull<T>,
    len: usize,
    capacity: usize,
    _marker: PhantomData<&'a mut [T]>,
}

impl<'a, T> ArenaVec<'a, T> {
    /// Creates an empty sequence without touching any arena.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            capacity: 0,
            _marker: PhantomData,
        }
    }

    /// Number of initialized elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Number of elements the current storage can hold.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true if there are no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Pointer to the first element.
    #[inline]
    #[must_use]
    pub const fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// The initialized elements.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first `len` slots are initialized and owned by this sequence
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// The initialized elements, mutably.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`, and `&mut self` makes the access exclusive
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Converts into a slice that lives as long as the arena borrow.
    #[inline]
    #[must_use]
    pub fn into_slice(self) -> &'a mut [T] {
        // SAFETY: the storage is valid for 'a and this sequence gives up access
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Appends `value` if there is spare capacity, otherwise hands it back.
    ///
    /// # Errors
    ///
    /// Returns the value when the sequence is full.
    pub fn push_within_capacity(&mut self, value: T) -> Result<(), T> {
        if self.len == self.capacity {
            return Err(value);
        }
        // SAFETY: len < capacity, so the slot is inside the storage
        unsafe { self.ptr.as_ptr().add(self.len).write(value) };
        self.len += 1;
        Ok(())
    }

    /// Makes room for at least `additional` more elements.
    ///
    /// Does nothing if the spare capacity already suffices. Otherwise the
    /// elements move to a new region of `max(2 * capacity, len + additional)`.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::CapacityOverflow`] if the new size overflows, or
    /// [`ArenaError::OutOfMemory`] if the arena cannot grow.
    pub fn reserve(&mut self, arena: &'a Arena, additional: usize) -> ArenaResult<()> {
        let needed = self
            .len
            .checked_add(additional)
            .ok_or(ArenaError::CapacityOverflow {
                count: usize::MAX,
                element_size: mem::size_of::<T>(),
            })?;
        if needed <= self.capacity {
            return Ok(());
        }

        let new_capacity = self.capacity.saturating_mul(2).max(needed);
        let new_ptr = arena.alloc_array::<T>(new_capacity)?;

        // SAFETY: new_ptr is a fresh region of new_capacity >= len slots, so it
        // cannot overlap the current storage. The old slots are only read.
        unsafe { ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), self.len) };

        self.ptr = new_ptr;
        self.capacity = new_capacity;
        Ok(())
    }

    /// Appends every item, growing through `arena` if needed.
    ///
    /// # Errors
    ///
    /// Same as [`ArenaVec::reserve`]. Nothing is appended on error.
    pub fn extend<I>(&mut self, arena: &'a Arena, items: I) -> ArenaResult<()>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let items = items.into_iter();
        let additional = items.len();
        if additional == 0 {
            return Ok(());
        }

        self.reserve(arena, additional)?;

        for item in items.take(additional) {
            // SAFETY: reserve left room for `additional` elements past len
            unsafe { self.ptr.as_ptr().add(self.len).write(item) };
            self.len += 1;
        }
        Ok(())
    }

    /// Appends one element, growing through `arena` if needed.
    ///
    /// # Errors
    ///
    /// Same as [`ArenaVec::reserve`].
    pub fn push(&mut self, arena: &'a Arena, value: T) -> ArenaResult<()> {
        self.extend(arena, std::iter::once(value))
    }

    /// Appends clones of every element of `items`.
    ///
    /// # Errors
    ///
    /// Same as [`ArenaVec::reserve`].
    pub fn extend_from_slice(&mut self, arena: &'a Arena, items: &[T]) -> ArenaResult<()>
    where
        T: Clone,
    {
        self.extend(arena, items.iter().cloned())
    }
}

impl Arena {
    /// Allocates a sequence with `length` default elements and room for
    /// `capacity`.
    ///
    /// A capacity of zero returns an empty sequence without touching the
    /// cursor. Arguments are checked before anything is allocated.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::LengthExceedsCapacity`] when `length > capacity`,
    /// [`ArenaError::CapacityOverflow`] when `capacity * size_of::<T>()`
    /// overflows, or [`ArenaError::OutOfMemory`] if the arena cannot grow.
    pub fn alloc_sequence<T: Default>(
        &self,
        length: usize,
        capacity: usize,
    ) -> ArenaResult<ArenaVec<'_, T>> {
        if length > capacity {
            return Err(ArenaError::LengthExceedsCapacity { length, capacity });
        }
        if capacity == 0 {
            return Ok(ArenaVec::new());
        }

        let mut seq = ArenaVec {
            ptr: self.alloc_array::<T>(capacity)?,
            len: 0,
            capacity,
            _marker: PhantomData,
        };
        for _ in 0..length {
            // SAFETY: len < length <= capacity
            unsafe { seq.ptr.as_ptr().add(seq.len).write(T::default()) };
            seq.len += 1;
        }
        Ok(seq)
    }

    /// Appends `items` to `seq` and returns the resulting sequence.
    ///
    /// Extends in place when capacity allows. Otherwise the elements are
    /// copied to a new region of `max(2 * capacity, new length)` and the old
    /// region is left as it was.
    ///
    /// # Errors
    ///
    /// Same as [`ArenaVec::reserve`].
    pub fn append<'a, T, I>(&'a self, seq: ArenaVec<'a, T>, items: I) -> ArenaResult<ArenaVec<'a, T>>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let mut seq = seq;
        seq.extend(self, items)?;
        Ok(seq)
    }
}

impl<T> Default for ArenaVec<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for ArenaVec<'_, T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for ArenaVec<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<'s, T> IntoIterator for &'s ArenaVec<'_, T> {
    type Item = &'s T;
    type IntoIter = slice::Iter<'s, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for ArenaVec<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}
