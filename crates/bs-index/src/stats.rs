//! Indexing progress counters.
//!
//! [`IndexStats`] is updated from the walker threads while a pass runs and
//! can be read at any time; [`StatsSnapshot`] is the copied, serializable
//! view of it.
//!
//! All counters use [`AtomicU64`] with relaxed ordering. They are for
//! progress display and reporting only.
//!
//! # Examples
//!
//! ```
//! use bs_index::{ErrorKind, IndexStats};
//!
//! let stats = IndexStats::new();
//! stats.record_entry();
//! stats.record_skip(ErrorKind::SubtreeUnreadable);
//!
//! let snap = stats.snapshot();
//! assert_eq!(snap.entries, 1);
//! assert_eq!(snap.skipped(), 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// Atomic counters for one indexing pass.
#[derive(Debug, Default)]
pub struct IndexStats {
    /// Entries inserted into the store.
    entries: AtomicU64,
    /// Single entries skipped (unreadable or non-UTF-8).
    skipped_entries: AtomicU64,
    /// Directories whose contents were skipped.
    skipped_subtrees: AtomicU64,
}

impl IndexStats {
    /// Creates a new [`IndexStats`] with all counters at zero.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one indexed entry and returns the new total.
    #[inline]
    pub fn record_entry(&self) -> u64 {
        self.entries.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Counts one skipped entry or subtree.
    ///
    /// Kinds that do not describe a traversal failure are ignored.
    pub fn record_skip(&self, kind: ErrorKind) {
        match kind {
            ErrorKind::SubtreeUnreadable => {
                self.skipped_subtrees.fetch_add(1, Ordering::Relaxed);
            }
            ErrorKind::EntryUnreadable | ErrorKind::NonUtf8Path => {
                self.skipped_entries.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }

    /// Returns a point-in-time snapshot of all counters.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            entries: self.entries.load(Ordering::Relaxed),
            skipped_entries: self.skipped_entries.load(Ordering::Relaxed),
            skipped_subtrees: self.skipped_subtrees.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`IndexStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Entries inserted into the store.
    pub entries: u64,
    /// Single entries skipped.
    pub skipped_entries: u64,
    /// Directories whose contents were skipped.
    pub skipped_subtrees: u64,
}

impl StatsSnapshot {
    /// Returns the total number of traversal failures.
    #[inline]
    #[must_use]
    pub const fn skipped(&self) -> u64 {
        self.skipped_entries + self.skipped_subtrees
    }
}
