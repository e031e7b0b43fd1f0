//! Error types for the bs-index crate.
//!
//! This module provides [`IndexError`] for everything that can go wrong
//! during an indexing pass, and [`ErrorKind`] for classifying it.

use std::path::Path;

use bs_core::ConfigError;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// Classification of an [`IndexError`].
///
/// The first three kinds describe traversal failures; only
/// [`ErrorKind::RootUnreadable`] fails a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorKind {
    /// A single entry could not be read. Skipped.
    EntryUnreadable,
    /// A directory could not be opened. Its contents are skipped.
    SubtreeUnreadable,
    /// The root could not be opened. The build fails with zero entries.
    RootUnreadable,
    /// A path is not valid UTF-8. Skipped like an unreadable entry.
    NonUtf8Path,
    /// The build was cancelled.
    Cancelled,
    /// The indexing worker could not be started or panicked.
    Worker,
    /// The indexer was configured with invalid options.
    Config,
}

impl ErrorKind {
    /// Returns a short label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::EntryUnreadable => "entry unreadable",
            Self::SubtreeUnreadable => "subtree unreadable",
            Self::RootUnreadable => "root unreadable",
            Self::NonUtf8Path => "non-UTF-8 path",
            Self::Cancelled => "cancelled",
            Self::Worker => "worker failure",
            Self::Config => "invalid configuration",
        }
    }
}

/// Errors that can occur while building an index.
///
/// # Error Recovery Strategy
///
/// - **Entry / subtree / non-UTF-8**: logged, skipped, walk continues
/// - **Root unreadable**: the build fails, the index stays empty
/// - **Cancelled / worker / config**: surfaced to the caller
///
/// # Examples
///
/// ```
/// use bs_index::{ErrorKind, IndexError};
///
/// let err = IndexError::root_unreadable(
///     "/missing",
///     std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
/// );
/// assert_eq!(err.kind(), ErrorKind::RootUnreadable);
/// assert!(!err.is_recoverable());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The root path is missing, not a directory, or cannot be opened.
    #[error("cannot open root {root}: {source}")]
    RootUnreadable {
        /// The root as given by the caller.
        root: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A directory below the root could not be opened.
    #[error("skipping unreadable directory {path}: {source}")]
    SubtreeUnreadable {
        /// The directory that was skipped.
        path: Utf8PathBuf,
        /// The underlying walk error.
        #[source]
        source: ignore::Error,
    },

    /// A single entry could not be read.
    #[error("skipping unreadable entry {}: {source}", display_path(.path.as_deref()))]
    EntryUnreadable {
        /// The entry path, when the walker reported one.
        path: Option<Utf8PathBuf>,
        /// The underlying walk error.
        #[source]
        source: ignore::Error,
    },

    /// A path is not valid UTF-8.
    #[error("skipping path that is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(std::path::PathBuf),

    /// The build was cancelled before the walk finished.
    #[error("index build cancelled")]
    Cancelled,

    /// The indexing worker thread could not be spawned.
    #[error("failed to spawn indexing worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// The indexing worker panicked.
    #[error("indexing worker panicked")]
    WorkerPanicked,

    /// Invalid indexer configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn display_path(path: Option<&Utf8Path>) -> &str {
    path.map_or("<unknown>", Utf8Path::as_str)
}

impl IndexError {
    /// Creates a new [`IndexError::RootUnreadable`] error.
    #[inline]
    pub fn root_unreadable(root: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::RootUnreadable {
            root: root.into(),
            source,
        }
    }

    /// Classifies an error reported by the walker.
    ///
    /// An error attached to a path that is itself a directory means that
    /// directory could not be listed, so the whole subtree is lost. Anything
    /// else only costs the one entry.
    #[must_use]
    pub fn from_walk(source: ignore::Error) -> Self {
        let path = walk_error_path(&source).map(Path::to_path_buf);

        let Some(path) = path else {
            return Self::EntryUnreadable { path: None, source };
        };

        let is_dir = std::fs::symlink_metadata(&path).is_ok_and(|meta| meta.is_dir());

        match Utf8PathBuf::from_path_buf(path) {
            Ok(path) if is_dir || is_loop(&source) => Self::SubtreeUnreadable { path, source },
            Ok(path) => Self::EntryUnreadable {
                path: Some(path),
                source,
            },
            Err(_) => Self::EntryUnreadable { path: None, source },
        }
    }

    /// Returns the [`ErrorKind`] of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::RootUnreadable { .. } => ErrorKind::RootUnreadable,
            Self::SubtreeUnreadable { .. } => ErrorKind::SubtreeUnreadable,
            Self::EntryUnreadable { .. } => ErrorKind::EntryUnreadable,
            Self::NonUtf8Path(_) => ErrorKind::NonUtf8Path,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::WorkerSpawn(_) | Self::WorkerPanicked => ErrorKind::Worker,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Returns `true` if the walk can continue past this error.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::EntryUnreadable | ErrorKind::SubtreeUnreadable | ErrorKind::NonUtf8Path
        )
    }

    /// Returns the path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        match self {
            Self::RootUnreadable { root, .. } => Some(root),
            Self::SubtreeUnreadable { path, .. } => Some(path),
            Self::EntryUnreadable { path, .. } => path.as_deref(),
            Self::NonUtf8Path(_)
            | Self::Cancelled
            | Self::WorkerSpawn(_)
            | Self::WorkerPanicked
            | Self::Config(_) => None,
        }
    }
}

/// Digs the offending path out of a (possibly wrapped) walk error.
fn walk_error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path),
        ignore::Error::Loop { child, .. } => Some(child),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            walk_error_path(err)
        }
        _ => None,
    }
}

fn is_loop(err: &ignore::Error) -> bool {
    match err {
        ignore::Error::Loop { .. } => true,
        ignore::Error::WithDepth { err, .. }
        | ignore::Error::WithPath { err, .. }
        | ignore::Error::WithLineNumber { err, .. } => is_loop(err),
        _ => false,
    }
}
