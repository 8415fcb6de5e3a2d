//! # Arena Pool
//!
//! Thread-safe cache of reset arenas, so units of work can reuse chunks
//! instead of allocating fresh ones.
//!
//! The idle set sits behind a mutex; the arenas themselves are never shared.
//! `acquire` hands out an owned [`Arena`], which no other pool client can
//! reach until it is released again.

#![allow(unsafe_code)]

use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::arena::Arena;
use crate::config::{ArenaConfig, PoolConfig};
use crate::error::ArenaResult;

/// A pool of idle arenas.
///
/// Every arena in the idle set has already been reset, so an acquired arena
/// always starts with its cursor at offset zero.
///
/// # Example
///
/// ```rust
/// use quarry_core::ArenaPool;
///
/// let pool = ArenaPool::new(1024 * 1024, 0)?;
///
/// let arena = pool.acquire()?;
/// let name = arena.alloc_str("Ivan")?;
/// assert_eq!(name, "Ivan");
/// pool.release(arena);
///
/// // Or let a guard release it on drop
/// {
///     let arena = pool.acquire_scoped()?;
///     arena.alloc(7_u32)?;
/// }
/// assert_eq!(pool.idle_count(), 1);
/// # Ok::<(), quarry_core::ArenaError>(())
/// ```
#[derive(Debug)]
pub struct ArenaPool {
    /// Config for newly created arenas.
    config: ArenaConfig,
    /// Idle set limit.
    max_idle: usize,
    /// Reset arenas waiting to be acquired.
    idle: Mutex<Vec<Arena>>,
    created: AtomicUsize,
    reused: AtomicUsize,
    released: AtomicUsize,
    discarded: AtomicUsize,
}

impl ArenaPool {
    /// Creates a pool whose arenas use the given chunk size and retention budget.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::InvalidChunkSize`](crate::ArenaError::InvalidChunkSize)
    /// for a zero chunk size.
    pub fn new(chunk_size: usize, max_retain: usize) -> ArenaResult<Self> {
        Self::with_config(PoolConfig::new(chunk_size, max_retain))
    }

    /// Creates a pool from a config.
    ///
    /// # Errors
    ///
    /// Same as [`ArenaPool::new`].
    pub fn with_config(config: PoolConfig) -> ArenaResult<Self> {
        config.arena.validate()?;

        Ok(Self {
            config: config.arena,
            max_idle: config.max_idle,
            idle: Mutex::new(Vec::new()),
            created: AtomicUsize::new(0),
            reused: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
            discarded: AtomicUsize::new(0),
        })
    }

    /// Config used for arenas this pool creates.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Maximum number of idle arenas kept.
    #[inline]
    #[must_use]
    pub const fn max_idle(&self) -> usize {
        self.max_idle
    }

    /// Number of arenas currently idle.
    #[must_use]
    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }

    /// Takes an idle arena, or creates one if the idle set is empty.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::OutOfMemory`](crate::ArenaError::OutOfMemory) if
    /// a new arena's first chunk cannot be allocated.
    pub fn acquire(&self) -> ArenaResult<Arena> {
        let cached = self.idle.lock().pop();

        if let Some(arena) = cached {
            self.reused.fetch_add(1, Ordering::Relaxed);
            trace!(chunks = arena.chunk_count(), "acquired idle arena");
            return Ok(arena);
        }

        let arena = Arena::with_config(&self.config)?;
        self.created.fetch_add(1, Ordering::Relaxed);
        trace!(chunk_size = self.config.chunk_size, "created arena for pool");
        Ok(arena)
    }

    /// Acquires an arena wrapped in a guard that releases it on drop.
    ///
    /// # Errors
    ///
    /// Same as [`ArenaPool::acquire`].
    pub fn acquire_scoped(&self) -> ArenaResult<PooledArena<'_>> {
        Ok(PooledArena {
            arena: ManuallyDrop::new(self.acquire()?),
            pool: self,
        })
    }

    /// Resets an arena and returns it to the idle set.
    ///
    /// `None` is ignored. When the idle set is full the arena is dropped and
    /// its chunks go back to the global allocator.
    pub fn release<A>(&self, arena: A)
    where
        A: Into<Option<Arena>>,
    {
        let Some(mut arena) = arena.into() else {
            return;
        };

        // Reset outside the lock; it may allocate a fresh chunk
        arena.reset();
        self.released.fetch_add(1, Ordering::Relaxed);

        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(arena);
            trace!(idle = idle.len(), "released arena to pool");
            return;
        }
        drop(idle);

        self.discarded.fetch_add(1, Ordering::Relaxed);
        debug!(max_idle = self.max_idle, "pool full, dropping released arena");
    }

    /// Drops every idle arena.
    pub fn clear(&self) {
        let drained = std::mem::take(&mut *self.idle.lock());
        if !drained.is_empty() {
            debug!(arenas = drained.len(), "cleared idle arenas");
        }
    }

    /// Pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            idle: self.idle_count(),
            created: self.created.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}

/// RAII wrapper for a pooled arena.
///
/// Derefs to [`Arena`] and hands it back to the pool when dropped.
pub struct PooledArena<'p> {
    arena: ManuallyDrop<Arena>,
    pool: &'p ArenaPool,
}

impl PooledArena<'_> {
    /// Takes the arena out of the guard without returning it to the pool.
    #[must_use]
    pub fn detach(self) -> Arena {
        let mut this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so the arena is taken exactly once
        unsafe { ManuallyDrop::take(&mut this.arena) }
    }
}

impl Deref for PooledArena<'_> {
    type Target = Arena;

    #[inline]
    fn deref(&self) -> &Arena {
        &self.arena
    }
}

impl DerefMut for PooledArena<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }
}

impl Drop for PooledArena<'_> {
    fn drop(&mut self) {
        // SAFETY: the guard is being dropped and never touches the arena again
        let arena = unsafe { ManuallyDrop::take(&mut self.arena) };
        self.pool.release(arena);
    }
}

/// Pool statistics for monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Arenas currently idle.
    pub idle: usize,
    /// Arenas created because the idle set was empty.
    pub created: usize,
    /// Acquisitions served from the idle set.
    pub reused: usize,
    /// Arenas handed back through `release`.
    pub released: usize,
    /// Released arenas dropped because the idle set was full.
    pub discarded: usize,
}
