//! # Arena Configuration
//!
//! Chunk sizing and retention limits for arenas and pools. Configs are plain
//! data, loaded once at startup (usually from TOML) and validated before any
//! arena is built from them.
//!
//! ```toml
//! max_idle = 32
//!
//! [arena]
//! chunk_size = 1048576
//! max_retain = 0        # 0 = chunk_size * 10
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ArenaError, ArenaResult};
use crate::memory::CHUNK_ALIGN;

/// Default base chunk size (64KB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Retention budget multiplier used when `max_retain` is left at zero.
pub const DEFAULT_RETAIN_CHUNKS: usize = 10;

/// Default number of idle arenas a pool keeps.
pub const DEFAULT_MAX_IDLE: usize = 64;

/// Largest chunk size that still forms a valid aligned layout.
pub const MAX_CHUNK_SIZE: usize = isize::MAX as usize - (CHUNK_ALIGN - 1);

/// Configuration for a single arena.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Base chunk size in bytes. Must be non-zero.
    pub chunk_size: usize,
    /// Bytes of chunk capacity kept across a reset. Zero selects
    /// `chunk_size * DEFAULT_RETAIN_CHUNKS`.
    pub max_retain: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_retain: 0,
        }
    }
}

impl ArenaConfig {
    /// Creates a config with the given chunk size and retention budget.
    #[must_use]
    pub const fn new(chunk_size: usize, max_retain: usize) -> Self {
        Self {
            chunk_size,
            max_retain,
        }
    }

    /// Checks the chunk size.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::InvalidChunkSize`] when the chunk size is zero or
    /// larger than [`MAX_CHUNK_SIZE`].
    pub fn validate(&self) -> ArenaResult<()> {
        if self.chunk_size == 0 || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(ArenaError::InvalidChunkSize {
                size: self.chunk_size,
            });
        }
        Ok(())
    }

    /// The effective retention budget in bytes.
    #[inline]
    #[must_use]
    pub const fn retention_budget(&self) -> usize {
        if self.max_retain == 0 {
            self.chunk_size.saturating_mul(DEFAULT_RETAIN_CHUNKS)
        } else {
            self.max_retain
        }
    }

    /// Parses and validates a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::InvalidConfig`] if the text does not parse, or
    /// the validation error of [`ArenaConfig::validate`].
    pub fn from_toml_str(text: &str) -> ArenaResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| ArenaError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Configuration for an arena pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Config used for every arena the pool creates.
    pub arena: ArenaConfig,
    /// Maximum number of idle arenas kept. Extra released arenas are dropped.
    pub max_idle: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            arena: ArenaConfig::default(),
            max_idle: DEFAULT_MAX_IDLE,
        }
    }
}

impl PoolConfig {
    /// Creates a pool config with the default idle limit.
    #[must_use]
    pub const fn new(chunk_size: usize, max_retain: usize) -> Self {
        Self {
            arena: ArenaConfig::new(chunk_size, max_retain),
            max_idle: DEFAULT_MAX_IDLE,
        }
    }

    /// Parses and validates a pool config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::InvalidConfig`] if the text does not parse, or
    /// the validation error of the nested arena config.
    pub fn from_toml_str(text: &str) -> ArenaResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| ArenaError::InvalidConfig(e.to_string()))?;
        config.arena.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budget_is_ten_chunks() {
        let config = ArenaConfig::new(1024, 0);
        assert_eq!(config.retention_budget(), 10 * 1024);

        let config = ArenaConfig::new(1024, 4096);
        assert_eq!(config.retention_budget(), 4096);
    }

    #[test]
    fn test_budget_saturates() {
        let config = ArenaConfig::new(MAX_CHUNK_SIZE, 0);
        assert_eq!(config.retention_budget(), usize::MAX);
    }

    #[test]
    fn test_validate_rejects_zero_chunk() {
        let err = ArenaConfig::new(0, 0).validate().unwrap_err();
        assert_eq!(err, ArenaError::InvalidChunkSize { size: 0 });
        assert!(ArenaConfig::new(MAX_CHUNK_SIZE + 1, 0).validate().is_err());
        assert!(ArenaConfig::new(1, 0).validate().is_ok());
    }

    #[test]
    fn test_arena_config_from_toml() {
        let config = ArenaConfig::from_toml_str("chunk_size = 4096\nmax_retain = 65536\n").unwrap();
        assert_eq!(config, ArenaConfig::new(4096, 65536));

        // Missing keys fall back to defaults
        let config = ArenaConfig::from_toml_str("").unwrap();
        assert_eq!(config, ArenaConfig::default());
    }

    #[test]
    fn test_arena_config_from_toml_rejects_invalid() {
        let err = ArenaConfig::from_toml_str("chunk_size = 0").unwrap_err();
        assert_eq!(err, ArenaError::InvalidChunkSize { size: 0 });

        let err = ArenaConfig::from_toml_str("chunk_size = \"big\"").unwrap_err();
        assert!(matches!(err, ArenaError::InvalidConfig(_)));
    }

    #[test]
    fn test_pool_config_from_toml() {
        let text = "max_idle = 8\n\n[arena]\nchunk_size = 1048576\n";
        let config = PoolConfig::from_toml_str(text).unwrap();
        assert_eq!(config.max_idle, 8);
        assert_eq!(config.arena.chunk_size, 1024 * 1024);
        assert_eq!(config.arena.max_retain, 0);

        let config = PoolConfig::from_toml_str("").unwrap();
        assert_eq!(config, PoolConfig::default());
    }
}
