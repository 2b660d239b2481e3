//! Bounded resolution activity log.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use crate::models::ActivityLogEntry;

/// Default number of retained entries.
pub const DEFAULT_ACTIVITY_LOG_CAPACITY: usize = 1000;

/// Append-only ring of recent activity; the oldest entry is dropped when full.
///
/// Has its own lock, independent of the cache.
#[derive(Debug)]
pub struct ActivityLog {
    entries: Mutex<VecDeque<ActivityLogEntry>>,
    capacity: usize,
}

impl ActivityLog {
    /// Creates a log retaining at most `capacity` entries (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_ACTIVITY_LOG_CAPACITY))),
            capacity,
        }
    }

    /// Appends an entry, evicting the oldest when full.
    pub fn record(&self, entry: ActivityLogEntry) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Returns up to `limit` entries, newest first.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<ActivityLogEntry> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.iter().rev().take(limit).cloned().collect()
    }

    /// Returns the entry count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the retention bound.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVITY_LOG_CAPACITY)
    }
}
