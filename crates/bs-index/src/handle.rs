//! Shared access to an index while it is built and after.

use std::sync::Arc;

use bs_core::SearchQuery;
use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::search::SearchEngine;
use crate::stats::{IndexStats, StatsSnapshot};
use crate::store::IndexStore;

/// Lifecycle of one indexing pass.
///
/// A pass starts in [`Building`](Self::Building) and ends in exactly one of
/// the other phases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildPhase {
    /// The walk is running; searches see a growing index.
    #[default]
    Building,
    /// The walk finished.
    Ready,
    /// The root could not be opened or the worker died.
    Failed,
    /// The pass was cancelled; entries found so far stay searchable.
    Cancelled,
}

impl BuildPhase {
    /// Returns `true` once the pass has ended.
    #[inline]
    #[must_use]
    pub const fn is_finished(self) -> bool {
        !matches!(self, Self::Building)
    }

    /// Returns a short label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Building => "building",
            Self::Ready => "ready",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A cheap, cloneable handle to one index.
///
/// Every clone shares the same store, counters and phase, so a handle taken
/// at the start of a build can be searched while the build runs and keeps
/// working after it ends.
#[derive(Debug, Clone)]
pub struct IndexHandle {
    /// The root as given by the caller.
    root: Utf8PathBuf,
    engine: SearchEngine,
    stats: Arc<IndexStats>,
    phase: Arc<RwLock<BuildPhase>>,
}

impl IndexHandle {
    pub(crate) fn new(root: &Utf8Path) -> Self {
        Self {
            root: root.to_owned(),
            engine: SearchEngine::new(Arc::new(IndexStore::new())),
            stats: Arc::new(IndexStats::new()),
            phase: Arc::new(RwLock::new(BuildPhase::Building)),
        }
    }

    /// Returns the root as given to the indexer.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<IndexStore> {
        self.engine.store()
    }

    /// Returns every path whose filename contains `keyword`.
    ///
    /// See [`SearchEngine::search`].
    #[must_use]
    pub fn search(&self, keyword: &str) -> Vec<Utf8PathBuf> {
        self.engine.search(keyword)
    }

    /// Returns every path whose filename satisfies `query`.
    ///
    /// See [`SearchEngine::search_query`].
    #[must_use]
    pub fn search_query(&self, query: &SearchQuery) -> Vec<Utf8PathBuf> {
        self.engine.search_query(query)
    }

    /// Returns the current phase of the pass.
    #[must_use]
    pub fn phase(&self) -> BuildPhase {
        *self.phase.read()
    }

    /// Returns `true` once the walk finished without error.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.phase() == BuildPhase::Ready
    }

    /// Returns a snapshot of the progress counters.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub(crate) fn counters(&self) -> &IndexStats {
        &self.stats
    }

    /// Moves the pass to `phase` unless it already ended.
    pub(crate) fn finish(&self, phase: BuildPhase) {
        let mut current = self.phase.write();
        if !current.is_finished() {
            *current = phase;
        }
    }
}
