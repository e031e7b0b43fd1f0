//! Filesystem entries discovered during a walk.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// One filesystem object (file or directory) reached by the walker.
///
/// An entry is immutable once created: the name is always the final
/// component of the path it was built from.
///
/// # Examples
///
/// ```
/// use bs_core::Entry;
/// use camino::Utf8PathBuf;
///
/// let entry = Entry::from_path(Utf8PathBuf::from("/data/sub/b.txt")).unwrap();
/// assert_eq!(entry.name(), "b.txt");
/// assert_eq!(entry.path(), "/data/sub/b.txt");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    name: String,
    path: Utf8PathBuf,
}

impl Entry {
    /// Builds an entry from a full path.
    ///
    /// Returns `None` when the path has no final component (`/`, or a path
    /// ending in `..`).
    #[must_use]
    pub fn from_path(path: Utf8PathBuf) -> Option<Self> {
        let name = path.file_name()?.to_owned();
        Some(Self { name, path })
    }

    /// The final path component.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full path of the entry.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Splits the entry into its name and path.
    #[inline]
    #[must_use]
    pub fn into_parts(self) -> (String, Utf8PathBuf) {
        (self.name, self.path)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}
