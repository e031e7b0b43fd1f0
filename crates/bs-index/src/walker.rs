//! Directory traversal.
//!
//! This module provides [`Walker`], which uses the `ignore` crate to visit
//! every entry below a root directory, sequentially or with a pool of
//! walker threads.
//!
//! # Failure Isolation
//!
//! Every step of the walk is handed to the visitor as a [`WalkOutcome`].
//! Unreadable entries and directories arrive as `Err` values and the walk
//! carries on with their siblings. Only a root that cannot be opened ends the
//! walk with an error.
//!
//! # Examples
//!
//! ```no_run
//! use std::ops::ControlFlow;
//!
//! use bs_index::Walker;
//! use camino::Utf8Path;
//!
//! let walker = Walker::new(Utf8Path::new("/data"));
//! walker.walk(|outcome| {
//!     if let Ok(entry) = outcome {
//!         println!("{} -> {}", entry.name(), entry.path());
//!     }
//!     ControlFlow::Continue(())
//! })?;
//! # Ok::<(), bs_index::IndexError>(())
//! ```

use std::ffi::OsStr;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bs_core::{Entry, IndexConfig};
use camino::{Utf8Path, Utf8PathBuf};
use ignore::{DirEntry, WalkBuilder, WalkState};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::IndexError;

/// The result of one traversal step: an entry, or the reason it was skipped.
pub type WalkOutcome = Result<Entry, IndexError>;

/// How a walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEnd {
    /// Every reachable entry was visited.
    Completed,
    /// The visitor asked the walk to stop.
    Stopped,
}

/// Summary returned by [`Walker::walk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkSummary {
    /// The canonical root that was walked.
    pub root: Utf8PathBuf,
    /// How the walk ended.
    pub end: WalkEnd,
}

/// A directory walker that reports every entry below a root.
///
/// The root itself is not reported. Paths handed to the visitor are
/// absolute because the root is canonicalized first.
#[derive(Debug, Clone)]
pub struct Walker {
    /// The root directory to walk, as given.
    root: Utf8PathBuf,
    /// Directory names never descended into.
    skip_dirs: Vec<String>,
    /// Whether to follow symbolic links.
    follow_links: bool,
    /// Whether hidden entries are reported.
    include_hidden: bool,
    /// Whether ignore files prune the walk.
    respect_ignore_files: bool,
    /// Maximum depth below the root.
    max_depth: Option<usize>,
    /// Walker threads; `1` walks on the calling thread.
    threads: usize,
}

impl Walker {
    /// Creates a walker for `root` with default options.
    ///
    /// The root is not checked here; a missing or unreadable root is
    /// reported by [`walk`](Self::walk).
    #[must_use]
    pub fn new(root: &Utf8Path) -> Self {
        Self::from_config(root, &IndexConfig::default())
    }

    /// Creates a walker for `root` using the options of an [`IndexConfig`].
    #[must_use]
    pub fn from_config(root: &Utf8Path, config: &IndexConfig) -> Self {
        Self {
            root: root.to_owned(),
            skip_dirs: config.skip_dirs.clone(),
            follow_links: config.follow_links,
            include_hidden: config.include_hidden,
            respect_ignore_files: config.respect_ignore_files,
            max_depth: config.max_depth,
            threads: config.threads.max(1),
        }
    }

    /// Adds directory names to prune from the walk.
    #[must_use]
    pub fn with_skip_dirs(mut self, dirs: &[&str]) -> Self {
        self.skip_dirs.extend(dirs.iter().map(ToString::to_string));
        self
    }

    /// Configures whether to follow symbolic links.
    #[must_use]
    pub const fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Configures whether hidden entries are reported.
    #[must_use]
    pub const fn with_include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Limits the traversal depth below the root.
    #[must_use]
    pub const fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the number of walker threads (at least one).
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Returns the root directory as given.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Canonicalizes the root and checks that it can be listed.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::RootUnreadable`] if the root is missing, is not
    /// a directory, or cannot be opened.
    pub fn resolve_root(&self) -> Result<Utf8PathBuf, IndexError> {
        let root = self
            .root
            .canonicalize_utf8()
            .map_err(|e| IndexError::root_unreadable(&self.root, e))?;

        std::fs::read_dir(&root).map_err(|e| IndexError::root_unreadable(&self.root, e))?;

        Ok(root)
    }

    /// Walks the tree, handing every outcome to `visit`.
    ///
    /// `visit` may be called from several threads at once when more than one
    /// walker thread is configured. Returning [`ControlFlow::Break`] stops the
    /// walk as soon as the walker threads notice.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::RootUnreadable`] if the root cannot be opened.
    /// Failures below the root are passed to `visit` instead.
    pub fn walk<F>(&self, visit: F) -> Result<WalkSummary, IndexError>
    where
        F: Fn(WalkOutcome) -> ControlFlow<()> + Sync,
    {
        let root = self.resolve_root()?;
        debug!(root = %root, threads = self.threads, "Walking directory tree");

        let builder = self.build_walker(&root);

        let end = if self.threads == 1 {
            walk_sequential(builder, &visit)
        } else {
            walk_parallel(builder, &visit)
        };

        Ok(WalkSummary { root, end })
    }

    /// Collects every readable entry, logging and dropping the failures.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::RootUnreadable`] if the root cannot be opened.
    pub fn collect_entries(&self) -> Result<Vec<Entry>, IndexError> {
        let entries = Mutex::new(Vec::new());

        self.walk(|outcome| {
            match outcome {
                Ok(entry) => entries.lock().push(entry),
                Err(err) => warn!(error = %err, "Skipping entry"),
            }
            ControlFlow::Continue(())
        })?;

        Ok(entries.into_inner())
    }

    /// Builds the ignore walker with configured settings.
    fn build_walker(&self, root: &Utf8Path) -> WalkBuilder {
        let mut builder = WalkBuilder::new(root);
        builder
            // Ignore-file handling is opt-in; hidden is set separately below
            .standard_filters(self.respect_ignore_files)
            .hidden(!self.include_hidden)
            .follow_links(self.follow_links)
            .max_depth(self.max_depth)
            .threads(self.threads)
            // Don't require the root to be a git repo
            .require_git(false);

        if !self.skip_dirs.is_empty() {
            let skip_dirs: Arc<[String]> = self.skip_dirs.clone().into();
            builder.filter_entry(move |entry| !is_skipped_dir(entry, &skip_dirs));
        }

        builder
    }
}

fn walk_sequential<F>(builder: WalkBuilder, visit: &F) -> WalkEnd
where
    F: Fn(WalkOutcome) -> ControlFlow<()>,
{
    for result in builder.build() {
        let Some(outcome) = classify(result) else {
            continue;
        };
        if visit(outcome).is_break() {
            return WalkEnd::Stopped;
        }
    }
    WalkEnd::Completed
}

fn walk_parallel<F>(builder: WalkBuilder, visit: &F) -> WalkEnd
where
    F: Fn(WalkOutcome) -> ControlFlow<()> + Sync,
{
    let stopped = AtomicBool::new(false);

    builder.build_parallel().run(|| {
        let stopped = &stopped;
        Box::new(move |result| {
            let Some(outcome) = classify(result) else {
                return WalkState::Continue;
            };
            if visit(outcome).is_break() {
                stopped.store(true, Ordering::Relaxed);
                WalkState::Quit
            } else {
                WalkState::Continue
            }
        })
    });

    if stopped.load(Ordering::Relaxed) {
        WalkEnd::Stopped
    } else {
        WalkEnd::Completed
    }
}

/// Turns one raw walker result into an outcome. The root (depth 0) yields
/// `None`.
fn classify(result: Result<DirEntry, ignore::Error>) -> Option<WalkOutcome> {
    let entry = match result {
        Ok(entry) => entry,
        Err(err) => return Some(Err(IndexError::from_walk(err))),
    };

    if entry.depth() == 0 {
        return None;
    }

    match Utf8PathBuf::from_path_buf(entry.into_path()) {
        Ok(path) => Entry::from_path(path).map(Ok),
        Err(path) => Some(Err(IndexError::NonUtf8Path(path))),
    }
}

fn is_skipped_dir(entry: &DirEntry, skip_dirs: &[String]) -> bool {
    entry.depth() > 0
        && entry.file_type().is_some_and(|ft| ft.is_dir())
        && skip_dirs
            .iter()
            .any(|dir| entry.file_name() == OsStr::new(dir.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("sub/deeper")).expect("mkdir");
        fs::create_dir_all(dir.path().join("node_modules/pkg")).expect("mkdir");
        fs::write(dir.path().join("a.txt"), b"a").expect("write");
        fs::write(dir.path().join(".hidden"), b"h").expect("write");
        fs::write(dir.path().join("sub/b.txt"), b"b").expect("write");
        fs::write(dir.path().join("sub/deeper/c.txt"), b"c").expect("write");
        fs::write(dir.path().join("node_modules/pkg/index.js"), b"x").expect("write");
        dir
    }

    fn utf8(dir: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 tempdir")
    }

    fn names(walker: &Walker) -> Vec<String> {
        let mut names: Vec<String> = walker
            .collect_entries()
            .expect("walk")
            .into_iter()
            .map(|e| e.name().to_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_walk_reports_files_and_directories() {
        let dir = fixture();
        let walker = Walker::new(&utf8(&dir));

        assert_eq!(
            names(&walker),
            vec![
                ".hidden",
                "a.txt",
                "b.txt",
                "c.txt",
                "deeper",
                "index.js",
                "node_modules",
                "pkg",
                "sub"
            ]
        );
    }

    #[test]
    fn test_walk_paths_are_absolute_and_under_root() {
        let dir = fixture();
        let walker = Walker::new(&utf8(&dir));
        let root = walker.resolve_root().expect("root");

        for entry in walker.collect_entries().expect("walk") {
            assert!(entry.path().is_absolute());
            assert!(entry.path().starts_with(&root));
            assert_eq!(entry.path().file_name(), Some(entry.name()));
        }
    }

    #[test]
    fn test_skip_dirs_prunes_subtree() {
        let dir = fixture();
        let walker = Walker::new(&utf8(&dir)).with_skip_dirs(&["node_modules"]);

        let found = names(&walker);
        assert!(!found.contains(&"node_modules".to_owned()));
        assert!(!found.contains(&"index.js".to_owned()));
        assert!(found.contains(&"c.txt".to_owned()));
    }

    #[test]
    fn test_hidden_can_be_excluded() {
        let dir = fixture();
        let walker = Walker::new(&utf8(&dir)).with_include_hidden(false);
        assert!(!names(&walker).contains(&".hidden".to_owned()));
    }

    #[test]
    fn test_max_depth() {
        let dir = fixture();
        let walker = Walker::new(&utf8(&dir)).with_max_depth(Some(1));
        assert_eq!(
            names(&walker),
            vec![".hidden", "a.txt", "node_modules", "sub"]
        );
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let dir = fixture();
        let sequential = names(&Walker::new(&utf8(&dir)));
        let parallel = names(&Walker::new(&utf8(&dir)).with_threads(4));
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_visitor_can_stop_walk() {
        let dir = fixture();
        let walker = Walker::new(&utf8(&dir));
        let seen = Mutex::new(0_usize);

        let summary = walker
            .walk(|_| {
                *seen.lock() += 1;
                ControlFlow::Break(())
            })
            .expect("walk");

        assert_eq!(summary.end, WalkEnd::Stopped);
        assert_eq!(seen.into_inner(), 1);
    }

    #[test]
    fn test_missing_root_is_error() {
        let walker = Walker::new(Utf8Path::new("/nonexistent/path/that/does/not/exist"));
        let err = walker.collect_entries().err();
        assert!(matches!(err, Some(IndexError::RootUnreadable { .. })));
    }

    #[test]
    fn test_file_root_is_error() {
        let dir = fixture();
        let file = utf8(&dir).join("a.txt");
        let err = Walker::new(&file).walk(|_| ControlFlow::Continue(())).err();
        assert!(matches!(err, Some(IndexError::RootUnreadable { .. })));
    }

    #[test]
    fn test_from_config_clamps_threads() {
        let config = IndexConfig {
            threads: 0,
            ..IndexConfig::default()
        };
        let walker = Walker::from_config(Utf8Path::new("."), &config);
        assert_eq!(walker.threads, 1);
    }
}
