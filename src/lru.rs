//! Least Recently Used (LRU) Cache Implementation
//!
//! A fixed-capacity cache that evicts the entry which has gone longest
//! without being read or written.
//!
//! # Algorithm
//!
//! Entries live in an arena-backed doubly linked list ordered by recency: the
//! front is the most recently used entry, the back is the next to be evicted.
//! A hash map sends each key to the [`Handle`] of its node, so a hit can move
//! its node to the front without scanning, and a full cache can drop the back
//! node in O(1).
//!
//! ```text
//!   map: key ──▶ Handle ─┐
//!                        ▼
//!   front ▶ [k3,v3] ⇄ [k1,v1] ⇄ [k7,v7] ⇄ [k2,v2] ◀ back (evicted next)
//! ```
//!
//! The map and the list are only ever changed together, so `map.len()` always
//! equals `list.len()` and both stay at or below the capacity.
//!
//! # Performance Characteristics
//!
//! - Get / Put / Remove / Evict: O(1) amortized
//! - Space: O(capacity). Freed list slots are recycled, so a cache at capacity
//!   stops allocating nodes.
//!
//! # Thread Safety
//!
//! `LruCache` is not synchronized. Both `get` and `put` mutate the recency
//! order, so shared use needs exclusive locking of the whole cache; see
//! [`ConcurrentLruCache`](crate::ConcurrentLruCache) behind the `concurrent`
//! feature.

use crate::config::LruCacheConfig;
use crate::error::{ConfigError, ListError};
use crate::list::{self, Handle, List};
use crate::metrics::{CacheMetrics, LruCacheMetrics};
use alloc::collections::BTreeMap;
use alloc::string::String;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::iter::FusedIterator;
use core::mem;
use core::num::NonZeroUsize;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// Unwraps an arena result on a path where the map guarantees the handle is
/// live. A failure here means the map and list have drifted apart.
fn in_sync<T>(result: Result<T, ListError>) -> Option<T> {
    match result {
        Ok(val) => Some(val),
        Err(err) => {
            tracing::error!(%err, "LRU map and list out of sync");
            debug_assert!(false, "LRU map and list out of sync: {err}");
            None
        }
    }
}

/// An implementation of a Least Recently Used (LRU) cache.
///
/// The cache has a fixed capacity and supports O(1) operations for
/// inserting, retrieving, and updating entries. When the cache reaches capacity,
/// the least recently used entry will be evicted to make room for new entries.
///
/// # Examples
///
/// ```
/// use arena_lru::LruCache;
///
/// let mut cache = LruCache::new(2).unwrap();
///
/// // Add items to the cache
/// cache.put("apple", 1);
/// cache.put("banana", 2);
///
/// // Accessing items updates their recency
/// assert_eq!(cache.get(&"apple"), Some(&1));
///
/// // Adding beyond capacity evicts the least recently used item
/// cache.put("cherry", 3);
/// assert_eq!(cache.get(&"banana"), None);
/// assert_eq!(cache.get(&"apple"), Some(&1));
/// assert_eq!(cache.get(&"cherry"), Some(&3));
/// ```
pub struct LruCache<K, V, S = DefaultHashBuilder> {
    config: LruCacheConfig,
    list: List<(K, V)>,
    map: HashMap<K, Handle, S>,
    metrics: LruCacheMetrics,
}

impl<K: Hash + Eq, V> LruCache<K, V> {
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCapacity`] if `capacity` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use arena_lru::LruCache;
    /// use arena_lru::error::ConfigError;
    ///
    /// let cache: LruCache<u32, u32> = LruCache::new(3).unwrap();
    /// assert_eq!(cache.cap().get(), 3);
    ///
    /// let err = LruCache::<u32, u32>::new(0).unwrap_err();
    /// assert_eq!(err, ConfigError::InvalidCapacity { capacity: 0 });
    /// ```
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        let config = LruCacheConfig::new(capacity)?;
        Ok(Self::init(config, None))
    }

    /// Creates a cache from a configuration, with an optional hash builder.
    ///
    /// If `hasher` is `None` the default hash builder is used.
    pub fn init(config: LruCacheConfig, hasher: Option<DefaultHashBuilder>) -> Self {
        Self::with_hasher(config.capacity, hasher.unwrap_or_default())
    }
}

impl<K: Hash + Eq, V> Default for LruCache<K, V> {
    /// Creates a cache with the default capacity of
    /// [`DEFAULT_CAPACITY`](crate::config::DEFAULT_CAPACITY).
    fn default() -> Self {
        Self::init(LruCacheConfig::default(), None)
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> LruCache<K, V, S> {
    /// Creates a new LRU cache with the specified capacity and hash builder.
    pub fn with_hasher(cap: NonZeroUsize, hash_builder: S) -> Self {
        tracing::debug!(capacity = cap.get(), "creating LRU cache");
        LruCache {
            config: LruCacheConfig { capacity: cap },
            list: List::with_capacity(cap.get()),
            map: HashMap::with_capacity_and_hasher(cap.get(), hash_builder),
            metrics: LruCacheMetrics::new(),
        }
    }

    /// Returns the maximum number of entries.
    #[inline]
    pub fn cap(&self) -> NonZeroUsize {
        self.config.capacity
    }

    /// Returns the number of entries currently stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the cache holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the counters collected so far.
    #[inline]
    pub fn lru_metrics(&self) -> &LruCacheMetrics {
        &self.metrics
    }

    /// Looks up `key`, refreshing it to most recently used on a hit and
    /// recording the hit or miss.
    fn touch<Q>(&mut self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let Some(&handle) = self.map.get(key) else {
            self.metrics.core.record_miss();
            return None;
        };
        in_sync(self.list.move_to_front(handle))?;
        self.metrics.core.record_hit();
        Some(handle)
    }

    /// Returns a reference to the value for `key` and marks it most recently
    /// used. Returns `None` without changing anything if the key is absent.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let handle = self.touch(key)?;
        in_sync(self.list.get(handle)).map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value for `key` and marks it most
    /// recently used.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let handle = self.touch(key)?;
        in_sync(self.list.get_mut(handle)).map(|(_, v)| v)
    }

    /// Returns the value for `key` without touching its recency or the
    /// metrics.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let &handle = self.map.get(key)?;
        in_sync(self.list.get(handle)).map(|(_, v)| v)
    }

    /// Returns true if `key` is present. Does not touch its recency.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.contains_key(key)
    }

    /// Returns the least recently used entry, the one the next eviction
    /// would drop.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.list.peek_back().ok().map(|(k, v)| (k, v))
    }

    /// Returns the most recently used entry.
    pub fn peek_mru(&self) -> Option<(&K, &V)> {
        self.list.peek_front().ok().map(|(k, v)| (k, v))
    }

    /// Removes `key` and returns its value, if present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let handle = self.map.remove(key)?;
        let (_, value) = in_sync(self.list.remove(handle))?;
        self.metrics.core.record_removal();
        Some(value)
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let entry = self.unlink_lru()?;
        self.metrics.core.record_removal();
        Some(entry)
    }

    /// Drops every entry. Capacity and metrics are kept.
    pub fn clear(&mut self) {
        tracing::debug!(len = self.map.len(), "clearing LRU cache");
        self.map.clear();
        self.list.clear();
    }

    /// Iterates entries from most to least recently used without changing
    /// their recency.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.list.iter(),
        }
    }

    fn unlink_lru(&mut self) -> Option<(K, V)> {
        if self.list.is_empty() {
            return None;
        }
        let (key, value) = in_sync(self.list.pop_back())?;
        let removed = self.map.remove(&key);
        debug_assert!(removed.is_some(), "evicted key was missing from the map");
        Some((key, value))
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher> LruCache<K, V, S> {
    /// Inserts `value` under `key` and marks it most recently used.
    ///
    /// If the key was already present its value is replaced and the old pair
    /// returned; nothing is evicted in that case. Otherwise, if the cache is
    /// full, the least recently used entry is evicted first and returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use arena_lru::LruCache;
    ///
    /// let mut cache = LruCache::new(2).unwrap();
    /// assert_eq!(cache.put(1, "a"), None);
    /// assert_eq!(cache.put(2, "b"), None);
    /// assert_eq!(cache.put(1, "c"), Some((1, "a")));  // overwrite
    /// assert_eq!(cache.put(3, "d"), Some((2, "b")));  // eviction
    /// ```
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&handle) = self.map.get(&key) {
            in_sync(self.list.move_to_front(handle))?;
            let (_, slot) = in_sync(self.list.get_mut(handle))?;
            let old_value = mem::replace(slot, value);
            self.metrics.core.record_update();
            return Some((key, old_value));
        }

        let mut evicted = None;
        if self.map.len() >= self.cap().get() {
            evicted = self.unlink_lru();
            if evicted.is_some() {
                self.metrics.core.record_eviction();
                tracing::trace!(
                    capacity = self.cap().get(),
                    len = self.map.len(),
                    "evicted least recently used entry"
                );
            }
        }

        let handle = self.list.push_front((key.clone(), value));
        self.map.insert(key, handle);
        self.metrics.core.record_insertion();

        evicted
    }
}

impl<K, V, S> fmt::Debug for LruCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("capacity", &self.config.capacity)
            .field("len", &self.list.len())
            .finish()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> CacheMetrics for LruCache<K, V, S> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.metrics.metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        self.metrics.algorithm_name()
    }
}

impl<'a, K: Hash + Eq, V, S: BuildHasher> IntoIterator for &'a LruCache<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

/// Iterator over cache entries, most recently used first.
///
/// Created by [`LruCache::iter`]. Reversing it yields the eviction order.
pub struct Iter<'a, K, V> {
    inner: list::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<(&'a K, &'a V)> {
        self.inner.next_back().map(|(k, v)| (k, v))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("inner", &self.inner).finish()
    }
}
