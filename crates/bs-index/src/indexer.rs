//! The indexing service: one pass over a root on a dedicated worker thread.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use bs_core::IndexConfig;
use camino::Utf8Path;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::IndexError;
use crate::handle::{BuildPhase, IndexHandle};
use crate::walker::{WalkEnd, Walker};
use crate::{BuildReport, IndexUpdate, MAX_REPORTED_SKIPS, SkippedEntry};

const WORKER_NAME: &str = "bs-indexer";

/// Starts indexing passes with a fixed [`IndexConfig`].
///
/// # Examples
///
/// ```no_run
/// use bs_core::IndexConfig;
/// use bs_index::Indexer;
/// use camino::Utf8Path;
///
/// let indexer = Indexer::new(IndexConfig::default())?;
/// let build = indexer.spawn(Utf8Path::new("/data"))?;
///
/// // Searchable while the walk runs.
/// let early = build.handle().search("report");
///
/// let report = build.wait()?;
/// println!("{} entries in {:?}", report.stats.entries, report.elapsed);
/// # Ok::<(), bs_index::IndexError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Indexer {
    config: IndexConfig,
}

impl Indexer {
    /// Creates an indexer after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Config`] if an option is out of range.
    pub fn new(config: IndexConfig) -> Result<Self, IndexError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the configuration used for every pass.
    #[must_use]
    pub const fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Starts a pass over `root` and returns immediately.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::WorkerSpawn`] if the worker thread cannot be
    /// started. A bad root is reported by [`IndexBuild::wait`].
    pub fn spawn(&self, root: &Utf8Path) -> Result<IndexBuild, IndexError> {
        self.start(root, UpdateSink::none())
    }

    /// Starts a pass over `root` that reports its progress on `tx`.
    ///
    /// Updates are sent in this order:
    /// 1. [`IndexUpdate::Progress`] every `progress_interval` entries, mixed
    ///    with [`IndexUpdate::EntrySkipped`] per traversal failure
    /// 2. [`IndexUpdate::Complete`] once the walk ends or is cancelled, or
    ///    [`IndexUpdate::Failed`] if the root cannot be opened
    ///
    /// Sends block while the channel is full, so keep the receiver drained.
    /// Dropping the receiver does not stop the pass; updates simply stop.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::WorkerSpawn`] if the worker thread cannot be
    /// started.
    pub fn spawn_streaming(
        &self,
        root: &Utf8Path,
        tx: mpsc::Sender<IndexUpdate>,
    ) -> Result<IndexBuild, IndexError> {
        self.start(root, UpdateSink::new(tx))
    }

    /// Runs a pass over `root` to completion and returns its handle.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::RootUnreadable`] if the root cannot be opened,
    /// or a worker error if the pass could not run.
    pub fn build(&self, root: &Utf8Path) -> Result<IndexHandle, IndexError> {
        let build = self.spawn(root)?;
        let handle = build.handle().clone();
        build.wait()?;
        Ok(handle)
    }

    fn start(&self, root: &Utf8Path, sink: UpdateSink) -> Result<IndexBuild, IndexError> {
        let handle = IndexHandle::new(root);
        let cancel = CancellationToken::new();

        let job = BuildJob {
            walker: Walker::from_config(root, &self.config),
            handle: handle.clone(),
            cancel: cancel.clone(),
            sink,
            progress_interval: self.config.progress_interval.max(1),
        };

        let worker = thread::Builder::new()
            .name(WORKER_NAME.to_owned())
            .spawn(move || job.run())
            .map_err(|e| {
                handle.finish(BuildPhase::Failed);
                IndexError::WorkerSpawn(e)
            })?;

        Ok(IndexBuild {
            handle,
            cancel,
            worker,
        })
    }
}

/// A running indexing pass.
///
/// Dropping an `IndexBuild` detaches the worker; the pass still runs to
/// the end and any [`IndexHandle`] clone keeps seeing its results.
#[derive(Debug)]
pub struct IndexBuild {
    handle: IndexHandle,
    cancel: CancellationToken,
    worker: JoinHandle<Result<BuildReport, IndexError>>,
}

impl IndexBuild {
    /// Returns a handle to the index being built.
    #[must_use]
    pub const fn handle(&self) -> &IndexHandle {
        &self.handle
    }

    /// Asks the walk to stop at the next entry.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns a token that cancels this pass, for use from other tasks.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Returns `true` once the worker has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Blocks until the pass ends.
    ///
    /// # Errors
    ///
    /// - [`IndexError::RootUnreadable`] if the root could not be opened
    /// - [`IndexError::Cancelled`] if the pass was cancelled
    /// - [`IndexError::WorkerPanicked`] if the worker died
    pub fn wait(self) -> Result<BuildReport, IndexError> {
        if let Ok(result) = self.worker.join() {
            result
        } else {
            error!(root = %self.handle.root(), "Indexing worker panicked");
            self.handle.finish(BuildPhase::Failed);
            Err(IndexError::WorkerPanicked)
        }
    }
}

/// Everything the worker thread owns for one pass.
struct BuildJob {
    walker: Walker,
    handle: IndexHandle,
    cancel: CancellationToken,
    sink: UpdateSink,
    progress_interval: u64,
}

impl BuildJob {
    fn run(self) -> Result<BuildReport, IndexError> {
        let started = Instant::now();
        let store = self.handle.store();
        let stats = self.handle.counters();
        let skipped = Mutex::new(Vec::new());

        info!(root = %self.walker.root(), "Starting index build");

        let walked = self.walker.walk(|outcome| {
            if self.cancel.is_cancelled() {
                return ControlFlow::Break(());
            }

            match outcome {
                Ok(entry) => {
                    store.insert_entry(entry);
                    let entries = stats.record_entry();
                    if entries % self.progress_interval == 0 {
                        debug!(entries, "Indexing progress");
                        self.sink.send(IndexUpdate::Progress { entries });
                    }
                }
                Err(err) => {
                    warn!(error = %err, kind = err.kind().label(), "Skipping entry");
                    stats.record_skip(err.kind());
                    let skip = SkippedEntry::from_error(&err);
                    {
                        let mut list = skipped.lock();
                        if list.len() < MAX_REPORTED_SKIPS {
                            list.push(skip.clone());
                        }
                    }
                    self.sink.send(IndexUpdate::EntrySkipped(skip));
                }
            }
            ControlFlow::Continue(())
        });

        let summary = match walked {
            Ok(summary) => summary,
            Err(err) => {
                error!(root = %self.walker.root(), error = %err, "Index build failed");
                self.handle.finish(BuildPhase::Failed);
                self.sink.send(IndexUpdate::Failed(SkippedEntry::from_error(&err)));
                return Err(err);
            }
        };

        // A cancel that lands after the last entry leaves the index complete.
        let phase = match summary.end {
            WalkEnd::Stopped => BuildPhase::Cancelled,
            WalkEnd::Completed => BuildPhase::Ready,
        };

        let report = BuildReport {
            root: summary.root,
            phase,
            stats: stats.snapshot(),
            names: store.len(),
            elapsed: started.elapsed(),
            skipped: skipped.into_inner(),
        };

        info!(
            root = %report.root,
            phase = %phase,
            entries = report.stats.entries,
            names = report.names,
            skipped = report.stats.skipped(),
            elapsed_ms = report.elapsed.as_millis(),
            "Index build finished"
        );

        self.handle.finish(phase);
        self.sink.send(IndexUpdate::Complete(report.clone()));

        match phase {
            BuildPhase::Cancelled => Err(IndexError::Cancelled),
            _ => Ok(report),
        }
    }
}

/// Optional progress channel shared by all walker threads.
struct UpdateSink {
    tx: Option<mpsc::Sender<IndexUpdate>>,
    closed: AtomicBool,
}

impl UpdateSink {
    const fn none() -> Self {
        Self {
            tx: None,
            closed: AtomicBool::new(false),
        }
    }

    const fn new(tx: mpsc::Sender<IndexUpdate>) -> Self {
        Self {
            tx: Some(tx),
            closed: AtomicBool::new(false),
        }
    }

    fn send(&self, update: IndexUpdate) {
        let Some(tx) = &self.tx else {
            return;
        };
        if self.closed.load(Ordering::Relaxed) {
            return;
        }
        if tx.blocking_send(update).is_err() {
            self.closed.store(true, Ordering::Relaxed);
            debug!("Update receiver dropped, continuing without updates");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use camino::Utf8PathBuf;

    fn utf8_root(dir: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir")
    }

    #[test]
    fn test_new_rejects_zero_threads() {
        let config = IndexConfig {
            threads: 0,
            ..IndexConfig::default()
        };
        let err = Indexer::new(config).expect_err("zero threads");
        assert_eq!(err.kind(), crate::ErrorKind::Config);
    }

    #[test]
    fn test_build_marks_ready() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("one.txt"), b"1").expect("write");
        let root = utf8_root(&dir);

        let handle = Indexer::default().build(&root).expect("build");
        assert!(handle.is_ready());
        assert_eq!(handle.stats().entries, 1);
        assert_eq!(handle.store().entry_count(), 1);
    }

    #[test]
    fn test_missing_root_fails_build() {
        let build = Indexer::default()
            .spawn(Utf8Path::new("/definitely/not/a/root"))
            .expect("spawn");
        let handle = build.handle().clone();

        let err = build.wait().expect_err("missing root");
        assert_eq!(err.kind(), crate::ErrorKind::RootUnreadable);
        assert_eq!(handle.phase(), BuildPhase::Failed);
        assert!(handle.store().is_empty());
    }

    #[test]
    fn test_cancel_before_walk() {
        let dir = tempfile::tempdir().expect("tempdir");
        for i in 0..50 {
            fs::write(dir.path().join(format!("f{i}")), b"x").expect("write");
        }
        let root = utf8_root(&dir);

        // Cancel from inside the pass so the outcome does not depend on timing.
        let config = IndexConfig::default();
        let handle = IndexHandle::new(&root);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let job = BuildJob {
            walker: Walker::from_config(&root, &config),
            handle: handle.clone(),
            cancel,
            sink: UpdateSink::none(),
            progress_interval: 1,
        };

        let err = job.run().expect_err("cancelled");
        assert!(matches!(err, IndexError::Cancelled));
        assert_eq!(handle.phase(), BuildPhase::Cancelled);
        assert!(handle.store().is_empty());
    }

    #[test]
    fn test_cancel_without_remaining_entries_is_ready() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = utf8_root(&dir);

        let handle = IndexHandle::new(&root);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let job = BuildJob {
            walker: Walker::from_config(&root, &IndexConfig::default()),
            handle: handle.clone(),
            cancel,
            sink: UpdateSink::none(),
            progress_interval: 1,
        };

        let report = job.run().expect("nothing was stopped");
        assert_eq!(report.phase, BuildPhase::Ready);
        assert_eq!(handle.phase(), BuildPhase::Ready);
        assert_eq!(report.stats.entries, 0);
    }

    #[test]
    fn test_dropped_receiver_does_not_stop_pass() {
        let dir = tempfile::tempdir().expect("tempdir");
        for i in 0..20 {
            fs::write(dir.path().join(format!("f{i}")), b"x").expect("write");
        }
        let root = utf8_root(&dir);

        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let config = IndexConfig {
            progress_interval: 1,
            ..IndexConfig::default()
        };
        let build = Indexer::new(config)
            .expect("config")
            .spawn_streaming(&root, tx)
            .expect("spawn");
        let report = build.wait().expect("build");
        assert_eq!(report.stats.entries, 20);
    }
}
