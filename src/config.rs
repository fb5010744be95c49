//! Cache Configuration Module
//!
//! Configuration for [`LruCache`](crate::LruCache) and, with the `concurrent`
//! feature, [`ConcurrentLruCache`](crate::ConcurrentLruCache).
//!
//! The config is a plain struct with a public field, so a caller that already
//! holds a `NonZeroUsize` can build it directly. Callers starting from an
//! unchecked integer go through [`LruCacheConfig::new`], which rejects zero
//! with [`ConfigError::InvalidCapacity`].
//!
//! # Examples
//!
//! ```
//! use arena_lru::config::LruCacheConfig;
//! use arena_lru::LruCache;
//! use core::num::NonZeroUsize;
//!
//! // Validated from a raw integer
//! let config = LruCacheConfig::new(1000).unwrap();
//! let cache: LruCache<String, i32> = LruCache::init(config, None);
//! assert_eq!(cache.cap().get(), 1000);
//!
//! // Built directly
//! let config = LruCacheConfig {
//!     capacity: NonZeroUsize::new(16).unwrap(),
//! };
//! let cache: LruCache<u64, u64> = LruCache::init(config, None);
//! assert_eq!(cache.cap().get(), 16);
//!
//! // Zero is a configuration error
//! assert!(LruCacheConfig::new(0).is_err());
//! ```

use crate::error::ConfigError;
use core::fmt;
use core::num::NonZeroUsize;

/// Capacity used when none is given.
pub const DEFAULT_CAPACITY: usize = 10;

/// Configuration for an LRU cache.
///
/// `capacity` is the maximum number of live entries. Inserting a new key into
/// a full cache evicts the least recently used entry first.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LruCacheConfig {
    /// Maximum number of key-value pairs the cache can hold.
    pub capacity: NonZeroUsize,
}

impl LruCacheConfig {
    /// Builds a config from an unchecked capacity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCapacity`] when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        let capacity = NonZeroUsize::new(capacity).ok_or_else(|| {
            tracing::error!(capacity, "rejected cache configuration");
            ConfigError::InvalidCapacity { capacity }
        })?;
        Ok(Self { capacity })
    }

    /// Returns the configured capacity.
    #[inline]
    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }
}

impl Default for LruCacheConfig {
    fn default() -> Self {
        Self {
            capacity: NonZeroUsize::MIN.saturating_add(DEFAULT_CAPACITY - 1),
        }
    }
}

impl fmt::Debug for LruCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCacheConfig")
            .field("capacity", &self.capacity)
            .finish()
    }
}
