//! Thread-Safe LRU Cache
//!
//! [`ConcurrentLruCache`] puts one [`LruCache`] behind a single
//! `parking_lot::Mutex`. Every public method holds that lock for its whole
//! duration.
//!
//! # Why one lock for the whole cache?
//!
//! Both `get` and `put` rewrite the recency list and read the key map in the
//! same step. Releasing the lock between the two would let another thread
//! observe a map entry whose node has already been evicted. Two splices on
//! neighbouring nodes (a move-to-front next to a pop from the back) touch the
//! same links, so the list cannot be locked per node either.
//!
//! `Mutex` rather than `RwLock` because a read is a write here: every hit
//! moves its node to the front.
//!
//! The cache is not sharded, so eviction order is global: the entry evicted
//! is always the least recently used one across the whole cache.
//!
//! # Example
//!
//! ```rust
//! use arena_lru::ConcurrentLruCache;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let cache = Arc::new(ConcurrentLruCache::new(1000).unwrap());
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|t| {
//!         let cache = Arc::clone(&cache);
//!         thread::spawn(move || {
//!             for i in 0..100 {
//!                 let key = format!("key_{}_{}", t, i);
//!                 cache.put(key.clone(), i);
//!                 assert!(cache.get(&key).is_some());
//!             }
//!         })
//!     })
//!     .collect();
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! assert_eq!(cache.len(), 400);
//! ```

use crate::config::LruCacheConfig;
use crate::error::ConfigError;
use crate::lru::LruCache;
use crate::metrics::CacheMetrics;
use alloc::collections::BTreeMap;
use alloc::string::String;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::num::NonZeroUsize;
use parking_lot::Mutex;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

/// A thread-safe LRU cache guarded by a single lock.
///
/// Values handed out by [`get`](Self::get) are clones, because a reference
/// cannot outlive the lock. Use [`get_with`](Self::get_with) to read a value
/// in place.
pub struct ConcurrentLruCache<K, V, S = DefaultHashBuilder> {
    inner: Mutex<LruCache<K, V, S>>,
}

impl<K: Hash + Eq, V> ConcurrentLruCache<K, V> {
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCapacity`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        let config = LruCacheConfig::new(capacity)?;
        Ok(Self::init(config, None))
    }

    /// Creates a cache from a configuration, with an optional hash builder.
    pub fn init(config: LruCacheConfig, hasher: Option<DefaultHashBuilder>) -> Self {
        Self::from_cache(LruCache::init(config, hasher))
    }
}

impl<K: Hash + Eq, V> Default for ConcurrentLruCache<K, V> {
    fn default() -> Self {
        Self::from_cache(LruCache::default())
    }
}

impl<K, V, S> ConcurrentLruCache<K, V, S> {
    /// Wraps an existing cache, keeping its entries and metrics.
    pub fn from_cache(cache: LruCache<K, V, S>) -> Self {
        Self {
            inner: Mutex::new(cache),
        }
    }

    /// Unwraps the inner cache.
    pub fn into_inner(self) -> LruCache<K, V, S> {
        self.inner.into_inner()
    }
}

impl<K, V, S> ConcurrentLruCache<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a cache with a custom hash builder.
    pub fn with_hasher(cap: NonZeroUsize, hash_builder: S) -> Self {
        Self::from_cache(LruCache::with_hasher(cap, hash_builder))
    }

    /// Returns the maximum number of entries.
    pub fn capacity(&self) -> NonZeroUsize {
        self.inner.lock().cap()
    }

    /// Returns the number of entries. May be stale by the time it is read.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if the cache contains no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Retrieves a clone of the value and marks it most recently used.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.inner.lock().get(key).cloned()
    }

    /// Runs `f` on the value while holding the lock, marking it most recently
    /// used. Avoids the clone that [`get`](Self::get) makes.
    ///
    /// # Example
    ///
    /// ```rust
    /// use arena_lru::ConcurrentLruCache;
    ///
    /// let cache = ConcurrentLruCache::new(4).unwrap();
    /// cache.put("greeting", String::from("hello"));
    /// assert_eq!(cache.get_with(&"greeting", |v| v.len()), Some(5));
    /// ```
    pub fn get_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&V) -> R,
    {
        self.inner.lock().get(key).map(f)
    }

    /// Runs `f` on a mutable reference to the value while holding the lock,
    /// marking it most recently used.
    pub fn get_mut_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&mut V) -> R,
    {
        self.inner.lock().get_mut(key).map(f)
    }

    /// Returns a clone of the value without refreshing its recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.inner.lock().peek(key).cloned()
    }

    /// Returns `true` if `key` is present. Does not refresh its recency.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.lock().contains(key)
    }

    /// Removes `key` and returns its value, if present.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.lock().remove(key)
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&self) -> Option<(K, V)> {
        self.inner.lock().pop_lru()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Runs `f` with exclusive access to the inner cache, for compound
    /// operations that must not interleave with other callers.
    ///
    /// # Example
    ///
    /// ```rust
    /// use arena_lru::ConcurrentLruCache;
    ///
    /// let cache = ConcurrentLruCache::new(4).unwrap();
    /// cache.put("hits", 0u64);
    /// // Read-modify-write without a window for another thread in between.
    /// cache.with_lock(|c| {
    ///     let next = c.peek(&"hits").copied().unwrap_or(0) + 1;
    ///     c.put("hits", next);
    /// });
    /// assert_eq!(cache.get(&"hits"), Some(1));
    /// ```
    pub fn with_lock<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut LruCache<K, V, S>) -> R,
    {
        f(&mut self.inner.lock())
    }
}

impl<K, V, S> ConcurrentLruCache<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    /// Inserts a key-value pair and marks it most recently used.
    ///
    /// Returns the previous pair if the key existed, or the evicted pair if
    /// the cache was full.
    pub fn put(&self, key: K, value: V) -> Option<(K, V)> {
        self.inner.lock().put(key, value)
    }
}

impl<K, V, S> CacheMetrics for ConcurrentLruCache<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.inner.lock().metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        self.inner.lock().algorithm_name()
    }
}

impl<K, V, S> fmt::Debug for ConcurrentLruCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(cache) => f
                .debug_struct("ConcurrentLruCache")
                .field("inner", &*cache)
                .finish(),
            None => f
                .debug_struct("ConcurrentLruCache")
                .field("inner", &"<locked>")
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::vec::Vec;

    #[test]
    fn test_concurrent_basic_operations() {
        let cache = ConcurrentLruCache::new(2).unwrap();
        assert_eq!(cache.put(1, "a"), None);
        assert_eq!(cache.put(2, "b"), None);
        assert_eq!(cache.get(&1), Some("a"));
        assert_eq!(cache.put(3, "c"), Some((2, "b")));
        assert!(!cache.contains(&2));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.capacity().get(), 2);
        assert_eq!(cache.remove(&1), Some("a"));
        assert_eq!(cache.pop_lru(), Some((3, "c")));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_rejects_zero_capacity() {
        assert!(ConcurrentLruCache::<u32, u32>::new(0).is_err());
    }

    #[test]
    fn test_concurrent_default_capacity() {
        let cache: ConcurrentLruCache<u32, u32> = ConcurrentLruCache::default();
        assert_eq!(cache.capacity().get(), 10);
    }

    #[test]
    fn test_concurrent_get_mut_with() {
        let cache = ConcurrentLruCache::new(4).unwrap();
        cache.put("counter", 0);
        for _ in 0..5 {
            cache.get_mut_with(&"counter", |v| *v += 1);
        }
        assert_eq!(cache.peek(&"counter"), Some(5));
        assert_eq!(cache.get_mut_with(&"missing", |v| *v += 1), None);
    }

    #[test]
    fn test_concurrent_from_cache_round_trip() {
        let mut inner = LruCache::new(3).unwrap();
        inner.put(1, 1);
        let cache = ConcurrentLruCache::from_cache(inner);
        cache.put(2, 2);
        let inner = cache.into_inner();
        assert_eq!(inner.len(), 2);
        assert_eq!(inner.peek_mru(), Some((&2, &2)));
    }

    #[test]
    fn test_concurrent_threads_respect_capacity() {
        let cache = Arc::new(ConcurrentLruCache::new(64).unwrap());
        let mut handles: Vec<thread::JoinHandle<()>> = Vec::new();

        for t in 0..8u32 {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for i in 0..1000u32 {
                    let key = (t * 31 + i) % 200;
                    if i % 3 == 0 {
                        let _ = cache.get(&key);
                    } else {
                        cache.put(key, i);
                    }
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.len() <= 64);
        cache.with_lock(|inner| {
            assert_eq!(inner.iter().count(), inner.len());
        });
    }

    #[test]
    fn test_concurrent_metrics() {
        let cache = ConcurrentLruCache::new(2).unwrap();
        cache.put("a", 1);
        cache.get(&"a");
        cache.get(&"b");
        let metrics = cache.metrics();
        assert_eq!(metrics["cache_hits"], 1.0);
        assert_eq!(metrics["cache_misses"], 1.0);
        assert_eq!(cache.algorithm_name(), "LRU");
    }

    #[test]
    fn test_concurrent_algorithm_name_matches_inner() {
        let inner: LruCache<u32, u32> = LruCache::new(2).unwrap();
        let expected = inner.algorithm_name();
        let cache = ConcurrentLruCache::from_cache(inner);
        assert_eq!(cache.algorithm_name(), expected);
    }
}
