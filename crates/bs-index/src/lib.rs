//! Concurrent filename indexer with substring search.
//!
//! This crate walks a directory tree into an in-memory index keyed by
//! filename and answers keyword queries against it, including while the
//! walk is still running.
//!
//! # Overview
//!
//! The main entry point is [`Indexer`], which combines:
//!
//! - [`Walker`]: Directory traversal with the `ignore` crate, sequential or
//!   parallel, skipping unreadable entries and subtrees
//! - [`IndexStore`]: Filename to paths map behind one `RwLock`
//! - [`SearchEngine`]: Substring and whole-word queries over the store
//! - [`IndexStats`]: Atomic counters for progress tracking
//!
//! # Example
//!
//! ```no_run
//! use camino::Utf8Path;
//!
//! let handle = bs_index::build_index(Utf8Path::new("/data"))?;
//! for path in bs_index::search(&handle, "report") {
//!     println!("{path}");
//! }
//! # Ok::<(), bs_index::IndexError>(())
//! ```
//!
//! # Streaming API
//!
//! For large trees, [`Indexer::spawn_streaming`] reports progress as the
//! walk runs:
//!
//! ```ignore
//! use bs_index::{Indexer, IndexUpdate};
//! use tokio::sync::mpsc;
//!
//! let (tx, mut rx) = mpsc::channel(256);
//! let build = Indexer::default().spawn_streaming(Utf8Path::new("/data"), tx)?;
//!
//! while let Some(update) = rx.recv().await {
//!     match update {
//!         IndexUpdate::Progress { entries } => println!("{entries} entries"),
//!         IndexUpdate::EntrySkipped(skip) => println!("skipped: {}", skip.message),
//!         IndexUpdate::Complete(report) => println!("done: {}", report.stats.entries),
//!         IndexUpdate::Failed(failure) => println!("failed: {}", failure.message),
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Indexer::spawn
//!     │
//!     └── worker thread "bs-indexer"
//!             │
//!             ├── Walker (ignore crate, 1..n threads)
//!             │       │
//!             │       └── visitor ──► IndexStore::insert_entry
//!             │                  └──► IndexStats
//!             │
//!             └── BuildReport ──► IndexBuild::wait
//!
//! IndexHandle (clone per caller)
//!     │
//!     └── SearchEngine ──► IndexStore (read lock)
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod error;
mod handle;
mod indexer;
mod search;
mod stats;
mod store;
mod walker;

pub use error::{ErrorKind, IndexError};
pub use handle::{BuildPhase, IndexHandle};
pub use indexer::{IndexBuild, Indexer};
pub use search::SearchEngine;
pub use stats::{IndexStats, StatsSnapshot};
pub use store::{IndexStore, IndexView};
pub use walker::{WalkEnd, WalkOutcome, WalkSummary, Walker};

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

/// Upper bound on the skipped entries kept in a [`BuildReport`]. The counters
/// in [`StatsSnapshot`] keep the full totals.
pub const MAX_REPORTED_SKIPS: usize = 10_000;

/// Update sent during a streaming build.
#[derive(Debug)]
pub enum IndexUpdate {
    /// Running count of indexed entries, sent every `progress_interval`
    /// entries.
    Progress {
        /// Entries indexed so far.
        entries: u64,
    },

    /// An entry or subtree was skipped.
    EntrySkipped(SkippedEntry),

    /// The walk ended, completed or cancelled. Sent once.
    Complete(BuildReport),

    /// The root could not be opened. Sent once, instead of `Complete`.
    Failed(SkippedEntry),
}

/// A traversal failure recorded during a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    /// The path involved, when known.
    pub path: Option<Utf8PathBuf>,
    /// What kind of failure it was.
    pub kind: ErrorKind,
    /// The rendered error.
    pub message: String,
}

impl SkippedEntry {
    /// Records an error for reporting.
    #[must_use]
    pub fn from_error(err: &IndexError) -> Self {
        Self {
            path: err.path().map(Utf8Path::to_path_buf),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Result of a finished walk.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    /// The canonical root that was walked.
    pub root: Utf8PathBuf,
    /// [`BuildPhase::Ready`] or [`BuildPhase::Cancelled`].
    pub phase: BuildPhase,
    /// Final counters.
    pub stats: StatsSnapshot,
    /// Distinct filenames in the index.
    pub names: usize,
    /// Wall time of the walk.
    pub elapsed: Duration,
    /// Skipped entries, at most [`MAX_REPORTED_SKIPS`].
    pub skipped: Vec<SkippedEntry>,
}

/// Builds an index of `root` with the default configuration, blocking until
/// the walk finishes.
///
/// Unreadable entries and subtrees below the root are skipped and logged.
///
/// # Errors
///
/// Returns [`IndexError::RootUnreadable`] if the root is missing, is not a
/// directory, or cannot be opened.
pub fn build_index(root: &Utf8Path) -> Result<IndexHandle, IndexError> {
    Indexer::default().build(root)
}

/// Returns every indexed path whose filename contains `keyword`.
///
/// Matching is case-sensitive, an empty keyword returns every path, and
/// matching names are visited in lexicographic order.
#[must_use]
pub fn search(handle: &IndexHandle, keyword: &str) -> Vec<Utf8PathBuf> {
    handle.search(keyword)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skipped_entry_from_error() {
        let err = IndexError::root_unreadable(
            "/gone",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        let skip = SkippedEntry::from_error(&err);
        assert_eq!(skip.kind, ErrorKind::RootUnreadable);
        assert_eq!(skip.path.as_deref().map(Utf8Path::as_str), Some("/gone"));
        assert!(skip.message.contains("not found"));
    }

    #[test]
    fn test_skipped_entry_serialization() {
        let skip = SkippedEntry {
            path: Some(Utf8PathBuf::from("/r/locked")),
            kind: ErrorKind::SubtreeUnreadable,
            message: "denied".to_owned(),
        };
        let json = serde_json::to_string(&skip).expect("Serialization failed");
        assert_eq!(
            json,
            r#"{"path":"/r/locked","kind":"subtree_unreadable","message":"denied"}"#
        );
    }
}
