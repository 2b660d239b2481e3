//! Resolved prompt cache.
//!
//! Entries and hit/miss counters sit behind one `RwLock`. Lookups take the
//! shared lock and bump the atomic counters; population and [`PromptCache::clear`]
//! take the exclusive lock, so a clear resets entries and counters together.

use lru::LruCache;
use serde::Serialize;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use super::Fingerprint;

/// Cache counters at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups that found an entry.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Current entry count.
    pub size: usize,
    /// Entry bound, `None` when unbounded.
    pub capacity: Option<usize>,
}

impl CacheStats {
    /// Fraction of lookups that hit, `0.0` before any lookup.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct CacheState {
    entries: LruCache<Fingerprint, String>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Fingerprint to resolved text mapping.
///
/// Unbounded unless a capacity is given; with a capacity the least recently
/// stored entry is evicted first.
pub struct PromptCache {
    state: RwLock<CacheState>,
    capacity: Option<NonZeroUsize>,
}

impl PromptCache {
    /// Creates a cache, bounded when `capacity` is set.
    #[must_use]
    pub fn new(capacity: Option<NonZeroUsize>) -> Self {
        let entries = capacity.map_or_else(LruCache::unbounded, LruCache::new);
        Self {
            state: RwLock::new(CacheState {
                entries,
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
            }),
            capacity,
        }
    }

    /// Creates an unbounded cache.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Looks up an entry, counting the hit or miss.
    pub fn get(&self, key: &Fingerprint) -> Option<String> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let found = state.entries.peek(key).cloned();
        if found.is_some() {
            state.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            state.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    /// Stores an entry, replacing any previous value for the key.
    pub fn insert(&self, key: Fingerprint, value: String) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.entries.put(key, value);
    }

    /// Removes every entry and resets the counters.
    pub fn clear(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.entries.clear();
        state.hits.store(0, Ordering::Relaxed);
        state.misses.store(0, Ordering::Relaxed);
    }

    /// Returns the entry count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    /// Returns `true` if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy of every entry, keyed by hex fingerprint.
    #[must_use]
    pub fn contents(&self) -> HashMap<String, String> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .entries
            .iter()
            .map(|(key, value)| (key.as_str().to_string(), value.clone()))
            .collect()
    }

    /// Returns a consistent snapshot of the counters and size.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        CacheStats {
            hits: state.hits.load(Ordering::Relaxed),
            misses: state.misses.load(Ordering::Relaxed),
            size: state.entries.len(),
            capacity: self.capacity.map(NonZeroUsize::get),
        }
    }
}

impl Default for PromptCache {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl std::fmt::Debug for PromptCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptCache")
            .field("stats", &self.stats())
            .finish()
    }
}
