#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ LruCache<K, V, S>                                                │
//! │                                                                  │
//! │   map: HashMap<K, Handle>          list: List<(K, V)>            │
//! │   ┌──────────────┐                 ┌─────────────────────────┐   │
//! │   │ "a" ─▶ (2,v0)│────────────────▶│ slot 2: ("a", 1)        │   │
//! │   │ "b" ─▶ (0,v3)│──────┐          │ slot 0: ("b", 2)        │   │
//! │   └──────────────┘      └─────────▶│ ...                     │   │
//! │                                    └─────────────────────────┘   │
//! │   front (MRU) ◀──── prev/next links by slot index ────▶ back     │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The map stores [`Handle`](list::Handle)s, never references, so an entry
//! can be found by key and spliced within the list in O(1) without any
//! `unsafe` code. A handle that outlives its node is rejected by the list
//! rather than pointing at freed memory.
//!
//! ## Quick Reference
//!
//! | Operation | Cost | Effect on recency |
//! |-----------|------|-------------------|
//! | [`LruCache::put`] | O(1) | key becomes most recent |
//! | [`LruCache::get`] / [`LruCache::get_mut`] | O(1) | key becomes most recent |
//! | [`LruCache::peek`] / [`LruCache::contains`] | O(1) | none |
//! | [`LruCache::remove`] / [`LruCache::pop_lru`] | O(1) | entry dropped |
//! | [`LruCache::iter`] | O(n) | none |
//!
//! ## Concurrent Cache
//!
//! Enable the `concurrent` feature for [`ConcurrentLruCache`], which holds
//! one lock across each whole operation:
//!
//! ```toml
//! [dependencies]
//! arena-lru = { version = "0.1", features = ["concurrent"] }
//! ```
//!
//! ## Modules
//!
//! - [`lru`]: the LRU cache
//! - [`list`]: the arena-backed linked list underneath it
//! - [`config`]: cache configuration
//! - [`error`]: configuration and list error types
//! - [`metrics`]: hit/miss/eviction counters
//! - [`concurrent`]: thread-safe wrapper (requires `concurrent` feature)

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

#[cfg(any(test, feature = "std", not(feature = "hashbrown")))]
extern crate std;

#[cfg(test)]
extern crate scoped_threadpool;

/// Error types.
///
/// [`ConfigError`](error::ConfigError) for rejected configurations and
/// [`ListError`](error::ListError) for arena handle misuse.
pub mod error;

/// Doubly linked list stored in an arena and addressed by generational
/// handles.
///
/// Exposed so the building block can be reused, but the cache is the only
/// client inside this crate.
pub mod list;

/// Cache configuration.
pub mod config;

/// Least Recently Used (LRU) cache implementation.
///
/// Provides a fixed-size cache that evicts the least recently used items when
/// the capacity is reached.
pub mod lru;

/// Cache metrics.
pub mod metrics;

/// Thread-safe LRU cache behind a single lock.
///
/// Available when the `concurrent` feature is enabled.
#[cfg(feature = "concurrent")]
#[cfg_attr(docsrs, doc(cfg(feature = "concurrent")))]
pub mod concurrent;

pub use config::{LruCacheConfig, DEFAULT_CAPACITY};
pub use error::{ConfigError, ListError};
pub use lru::LruCache;

#[cfg(feature = "concurrent")]
pub use concurrent::ConcurrentLruCache;
