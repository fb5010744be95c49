//! Concurrent Cache Correctness Tests
//!
//! These tests validate that `ConcurrentLruCache` keeps exact LRU semantics
//! while being accessed from multiple threads.
//!
//! ## Test Strategy
//!
//! - Single-threaded setup so the expected eviction order is known
//! - Many threads hammering a small key space to force evictions
//! - After the threads join, the inner cache is checked for consistency

#![cfg(feature = "concurrent")]

use arena_lru::metrics::CacheMetrics;
use arena_lru::{ConcurrentLruCache, LruCache};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

const NUM_THREADS: usize = 8;
const OPS_PER_THREAD: usize = 2_000;

/// Forward and reverse walks agree, len stays within capacity, keys are unique.
fn assert_consistent(cache: &LruCache<usize, usize>) {
    let forward: Vec<usize> = cache.iter().map(|(k, _)| *k).collect();
    let mut backward: Vec<usize> = cache.iter().rev().map(|(k, _)| *k).collect();
    backward.reverse();

    assert!(cache.len() <= cache.cap().get());
    assert_eq!(forward.len(), cache.len());
    assert_eq!(forward, backward);
    let unique: HashSet<usize> = forward.iter().copied().collect();
    assert_eq!(unique.len(), forward.len());
}

// ============================================================================
// LRU SEMANTICS BEHIND THE LOCK
// ============================================================================

#[test]
fn test_concurrent_lru_access_prevents_eviction() {
    let cache: Arc<ConcurrentLruCache<i32, i32>> = Arc::new(ConcurrentLruCache::new(3).unwrap());

    cache.put(1, 10);
    cache.put(2, 20);
    cache.put(3, 30);

    // Touch key 1 from another thread.
    let reader = Arc::clone(&cache);
    thread::spawn(move || {
        assert_eq!(reader.get(&1), Some(10));
    })
    .join()
    .unwrap();

    // Key 2 is now least recently used.
    assert_eq!(cache.put(4, 40), Some((2, 20)));
    assert!(cache.contains(&1));
    assert!(!cache.contains(&2));
    assert_eq!(cache.len(), 3);
}

#[test]
fn test_concurrent_peek_does_not_refresh() {
    let cache = ConcurrentLruCache::new(2).unwrap();
    cache.put("a", 1);
    cache.put("b", 2);
    assert_eq!(cache.peek(&"a"), Some(1));
    assert_eq!(cache.put("c", 3), Some(("a", 1)));
}

#[test]
fn test_concurrent_get_mut_with_updates_in_place() {
    let cache = ConcurrentLruCache::new(2).unwrap();
    cache.put("n", 1u32);
    assert_eq!(cache.get_mut_with(&"n", |v| { *v += 41; *v }), Some(42));
    assert_eq!(cache.get(&"n"), Some(42));
    assert_eq!(cache.get_mut_with(&"missing", |v| *v), None);
}

#[test]
fn test_concurrent_remove_and_pop_lru() {
    let cache = ConcurrentLruCache::new(3).unwrap();
    cache.put(1, "one");
    cache.put(2, "two");
    cache.put(3, "three");

    assert_eq!(cache.remove(&2), Some("two"));
    assert_eq!(cache.pop_lru(), Some((1, "one")));
    assert_eq!(cache.len(), 1);
    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.capacity().get(), 3);
}

// ============================================================================
// THREAD SAFETY INVARIANTS
// ============================================================================

#[test]
fn test_concurrent_mixed_workload_keeps_structure_consistent() {
    let cache: Arc<ConcurrentLruCache<usize, usize>> =
        Arc::new(ConcurrentLruCache::new(16).unwrap());

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..OPS_PER_THREAD {
                    let key = (t * 31 + i * 7) % 64;
                    match i % 4 {
                        0 | 1 => {
                            cache.put(key, key * 2);
                        }
                        2 => {
                            if let Some(v) = cache.get(&key) {
                                assert_eq!(v, key * 2, "value does not belong to key");
                            }
                        }
                        _ => {
                            cache.remove(&key);
                        }
                    }
                    assert!(cache.len() <= 16);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let cache = Arc::try_unwrap(cache)
        .unwrap_or_else(|_| panic!("all threads joined"))
        .into_inner();
    assert_consistent(&cache);
}

#[test]
fn test_concurrent_disjoint_writers_never_exceed_capacity() {
    let cache: Arc<ConcurrentLruCache<usize, usize>> =
        Arc::new(ConcurrentLruCache::new(50).unwrap());

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..500 {
                    cache.put(t * 10_000 + i, i);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.len(), 50);
    cache.with_lock(|inner| assert_consistent(inner));
}

#[test]
fn test_concurrent_with_lock_is_atomic() {
    let cache: Arc<ConcurrentLruCache<&'static str, u64>> =
        Arc::new(ConcurrentLruCache::new(4).unwrap());
    cache.put("counter", 0);

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|_| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for _ in 0..1_000 {
                    cache.with_lock(|c| {
                        let next = c.peek(&"counter").copied().unwrap_or(0) + 1;
                        c.put("counter", next);
                    });
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.get(&"counter"), Some((NUM_THREADS * 1_000) as u64));
}

#[test]
fn test_concurrent_metrics_count_every_request() {
    let cache: Arc<ConcurrentLruCache<usize, usize>> =
        Arc::new(ConcurrentLruCache::new(8).unwrap());
    for k in 0..8 {
        cache.put(k, k);
    }

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for k in 0..16 {
                    cache.get(&k);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let metrics = cache.metrics();
    assert_eq!(cache.algorithm_name(), "LRU");
    assert_eq!(metrics.get("requests"), Some(&64.0));
    assert_eq!(metrics.get("cache_hits"), Some(&32.0));
    assert_eq!(metrics.get("cache_misses"), Some(&32.0));
    assert_eq!(metrics.get("insertions"), Some(&8.0));
}
