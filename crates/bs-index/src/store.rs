//! Concurrent filename index.
//!
//! This module provides [`IndexStore`], the only shared mutable state of an
//! indexing pass: a map from filename to the full paths carrying that name.
//!
//! # Locking
//!
//! A single `parking_lot::RwLock` guards the whole map. An insert takes the
//! write lock for one append; a search takes the read lock for one scan of
//! the keys. A reader therefore always sees the map as it was between two
//! inserts, never a half-appended path list.
//!
//! # Examples
//!
//! ```
//! use bs_index::IndexStore;
//! use camino::Utf8PathBuf;
//!
//! let store = IndexStore::new();
//! store.insert("a.txt", Utf8PathBuf::from("/r/a.txt"));
//! store.insert("a.txt", Utf8PathBuf::from("/r/sub/a.txt"));
//!
//! assert_eq!(store.len(), 1);
//! assert_eq!(store.entry_count(), 2);
//! assert_eq!(
//!     store.paths_for("a.txt"),
//!     vec![Utf8PathBuf::from("/r/a.txt"), Utf8PathBuf::from("/r/sub/a.txt")]
//! );
//! ```

use bs_core::hash::fx_hash_map_with_capacity;
use bs_core::{Entry, FxHashMap};
use camino::Utf8PathBuf;
use parking_lot::{RwLock, RwLockReadGuard};
use smallvec::{SmallVec, smallvec};

/// Paths sharing one filename, in discovery order. Most names occur once.
type PathList = SmallVec<[Utf8PathBuf; 1]>;

#[derive(Debug, Default)]
struct Names {
    paths: FxHashMap<String, PathList>,
    /// Total (name, path) pairs across all lists.
    entries: usize,
}

/// A thread-safe map from filename to the full paths sharing it.
///
/// The store only grows: there is no remove or update. Paths under one name
/// keep their insertion order and are never deduplicated.
///
/// # Thread Safety
///
/// `IndexStore` is `Send + Sync`; share it behind an `Arc`.
#[derive(Debug, Default)]
pub struct IndexStore {
    inner: RwLock<Names>,
}

impl IndexStore {
    /// Creates a new empty store.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with room for `capacity` distinct names.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(Names {
                paths: fx_hash_map_with_capacity(capacity),
                entries: 0,
            }),
        }
    }

    /// Appends `path` to the list for `name`, creating the list if absent.
    ///
    /// The name is only copied when it is new to the store.
    pub fn insert(&self, name: &str, path: Utf8PathBuf) {
        let mut names = self.inner.write();
        if let Some(list) = names.paths.get_mut(name) {
            list.push(path);
        } else {
            names.paths.insert(name.to_owned(), smallvec![path]);
        }
        names.entries += 1;
    }

    /// Appends a discovered entry, reusing its name allocation.
    pub fn insert_entry(&self, entry: Entry) {
        let (name, path) = entry.into_parts();
        let mut names = self.inner.write();
        names.paths.entry(name).or_default().push(path);
        names.entries += 1;
    }

    /// Returns a copy of the paths stored under `name`.
    #[must_use]
    pub fn paths_for(&self, name: &str) -> Vec<Utf8PathBuf> {
        self.inner
            .read()
            .paths
            .get(name)
            .map(|list| list.to_vec())
            .unwrap_or_default()
    }

    /// Returns `true` if at least one path is stored under `name`.
    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        self.inner.read().paths.contains_key(name)
    }

    /// Returns a copy of every name in the store, in no particular order.
    #[must_use]
    pub fn snapshot_keys(&self) -> Vec<String> {
        self.inner.read().paths.keys().cloned().collect()
    }

    /// Returns a copy of every name with its paths, in no particular order.
    #[must_use]
    pub fn all_entries(&self) -> Vec<(String, Vec<Utf8PathBuf>)> {
        self.inner
            .read()
            .paths
            .iter()
            .map(|(name, list)| (name.clone(), list.to_vec()))
            .collect()
    }

    /// Returns the number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().paths.len()
    }

    /// Returns the total number of (name, path) pairs.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.inner.read().entries
    }

    /// Returns `true` if nothing has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().paths.is_empty()
    }

    /// Takes the read lock and returns a view of the whole map.
    ///
    /// Inserts block until the view is dropped, so keep it short-lived and
    /// never call back into the store while holding it.
    #[must_use]
    pub fn read(&self) -> IndexView<'_> {
        IndexView {
            guard: self.inner.read(),
        }
    }
}

/// A consistent read-only view of an [`IndexStore`], holding its read lock.
pub struct IndexView<'a> {
    guard: RwLockReadGuard<'a, Names>,
}

impl IndexView<'_> {
    /// Iterates over every name and its paths, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Utf8PathBuf])> {
        self.guard
            .paths
            .iter()
            .map(|(name, list)| (name.as_str(), list.as_slice()))
    }

    /// Returns the number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.guard.paths.len()
    }

    /// Returns `true` if the view holds no names.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guard.paths.is_empty()
    }

    /// Returns the total number of (name, path) pairs.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.guard.entries
    }
}

impl std::fmt::Debug for IndexView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexView")
            .field("names", &self.len())
            .field("entries", &self.entry_count())
            .finish()
    }
}
