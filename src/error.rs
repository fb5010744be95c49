//! Error types for cache construction and the node arena.
//!
//! A missing key is not an error anywhere in this crate: lookups return
//! `Option`. The enums here cover the two remaining failure classes:
//! rejecting a configuration up front, and handle misuse inside the arena.

use thiserror::Error;

/// Configuration rejected while building a cache.
///
/// No cache object exists when this is returned.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The requested capacity was zero.
    #[error("cache capacity must be a positive integer, got {capacity}")]
    InvalidCapacity {
        /// The rejected capacity value.
        capacity: usize,
    },
}

/// Failure of a structural operation on the node arena.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListError {
    /// The handle does not name a live node: it was freed, its slot has been
    /// reused since, or it was issued by a different list.
    #[error("handle does not refer to a live node")]
    InvalidHandle,

    /// The operation needs at least one node but the list is empty.
    #[error("operation requires a non-empty list")]
    EmptyCollection,
}
