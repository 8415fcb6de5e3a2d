//! # Memory Management
//!
//! Chunked bump arenas and the pool that recycles them.
//!
//! ## Design Philosophy
//!
//! A unit of work takes an arena, allocates freely, and gives everything back
//! with one reset:
//! - No per-object free
//! - No bookkeeping per allocation
//! - Retained chunks make repeated workloads allocation-free

mod arena;
mod chunk;
mod pool;
mod retention;
mod text;
mod vec;

pub use arena::{Arena, ArenaStats};
pub use chunk::CHUNK_ALIGN;
pub use pool::{ArenaPool, PoolStats, PooledArena};
pub use vec::ArenaVec;
