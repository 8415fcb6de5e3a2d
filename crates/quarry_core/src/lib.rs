//! # Quarry Core
//!
//! Region-based memory for latency-sensitive work:
//! - Bump-pointer allocation out of preallocated chunks
//! - Constant-time release of everything at once
//! - Bounded memory kept across resets
//! - A thread-safe pool that recycles arenas between units of work
//!
//! ## Architecture Rules
//!
//! 1. **Hot path never calls the global allocator** - a chunk is only
//!    requested when the active one is exhausted
//! 2. **No per-object free** - memory comes back only through reset or drop
//! 3. **Borrows end at reset** - `reset` takes `&mut self`, so no reference
//!    into an arena outlives it
//!
//! ## Example
//!
//! ```rust
//! use quarry_core::ArenaPool;
//!
//! #[derive(Default)]
//! struct User<'a> {
//!     id: u64,
//!     name: &'a str,
//! }
//!
//! let pool = ArenaPool::new(1024 * 1024, 0)?;
//! let mem = pool.acquire()?;
//!
//! let users = mem.alloc_sequence::<User>(0, 2)?;
//! let users = mem.append(users, [User { id: 1, name: mem.alloc_str("Ivan")? }])?;
//! let users = mem.append(users, [User { id: 2, name: mem.alloc_str("Petr")? }])?;
//! let users = mem.append(users, [User { id: 3, name: mem.alloc_str("Oleg")? }])?;
//!
//! assert_eq!((users.len(), users.capacity()), (3, 4));
//! assert_eq!(users[2].name, "Oleg");
//!
//! pool.release(mem);
//! # Ok::<(), quarry_core::ArenaError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod memory;

pub use config::{ArenaConfig, PoolConfig};
pub use error::{ArenaError, ArenaResult};
pub use memory::{Arena, ArenaPool, ArenaStats, ArenaVec, PoolStats, PooledArena};
