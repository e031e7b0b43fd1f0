//! Keyword search over an [`IndexStore`].
//!
//! [`SearchEngine::search`] is the plain contract: every filename containing
//! the keyword as a case-sensitive substring contributes all of its paths.
//! [`SearchEngine::search_query`] adds whole-word matching, case folding,
//! extension categories and a result limit.
//!
//! # Ordering
//!
//! Matching names are visited in lexicographic byte order; the paths under
//! one name keep discovery order. The same index and query therefore always
//! produce the same result.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use bs_index::{IndexStore, SearchEngine};
//! use camino::Utf8PathBuf;
//!
//! let store = Arc::new(IndexStore::new());
//! store.insert("a_copy.txt", Utf8PathBuf::from("/root/sub/a_copy.txt"));
//! store.insert("a.txt", Utf8PathBuf::from("/root/a.txt"));
//! store.insert("b.txt", Utf8PathBuf::from("/root/sub/b.txt"));
//!
//! let engine = SearchEngine::new(store);
//! assert_eq!(
//!     engine.search("a"),
//!     vec![
//!         Utf8PathBuf::from("/root/a.txt"),
//!         Utf8PathBuf::from("/root/sub/a_copy.txt"),
//!     ]
//! );
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use bs_core::{MatchMode, SearchQuery};
use camino::Utf8PathBuf;

use crate::store::IndexStore;

/// Answers keyword queries against a shared [`IndexStore`].
///
/// Cloning is cheap; clones search the same store.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    store: Arc<IndexStore>,
}

impl SearchEngine {
    /// Creates an engine over `store`.
    #[must_use]
    pub const fn new(store: Arc<IndexStore>) -> Self {
        Self { store }
    }

    /// Returns the store this engine searches.
    #[must_use]
    pub fn store(&self) -> &Arc<IndexStore> {
        &self.store
    }

    /// Returns every path whose filename contains `keyword`.
    ///
    /// Matching is case-sensitive. An empty keyword matches every name, and
    /// no match yields an empty vector.
    #[must_use]
    pub fn search(&self, keyword: &str) -> Vec<Utf8PathBuf> {
        self.search_query(&SearchQuery::new(keyword))
    }

    /// Returns every path whose filename satisfies `query`.
    ///
    /// The whole key scan runs under one read lock, so the result reflects
    /// the index at a single point in time even while a build is inserting.
    #[must_use]
    pub fn search_query(&self, query: &SearchQuery) -> Vec<Utf8PathBuf> {
        let matcher = NameMatcher::new(query);
        let view = self.store.read();

        let mut hits: Vec<(&str, &[Utf8PathBuf])> = view
            .iter()
            .filter(|(name, _)| query.category.matches(name) && matcher.is_match(name))
            .collect();
        hits.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let paths = hits.into_iter().flat_map(|(_, paths)| paths.iter().cloned());
        match query.limit {
            Some(limit) => paths.take(limit).collect(),
            None => paths.collect(),
        }
    }
}

/// A keyword prepared for repeated comparison against filenames.
#[derive(Debug)]
struct NameMatcher {
    /// The keyword, lowercased when matching ignores case.
    needle: String,
    mode: MatchMode,
    case_sensitive: bool,
}

impl NameMatcher {
    fn new(query: &SearchQuery) -> Self {
        let needle = if query.case_sensitive {
            query.keyword.clone()
        } else {
            query.keyword.to_lowercase()
        };
        Self {
            needle,
            mode: query.mode,
            case_sensitive: query.case_sensitive,
        }
    }

    fn is_match(&self, name: &str) -> bool {
        if self.needle.is_empty() {
            return true;
        }

        let haystack = if self.case_sensitive {
            Cow::Borrowed(name)
        } else {
            Cow::Owned(name.to_lowercase())
        };

        match self.mode {
            MatchMode::WholeWord => contains_word(&haystack, &self.needle),
            _ => haystack.contains(self.needle.as_str()),
        }
    }
}

/// Returns `true` if `needle` occurs in `haystack` with a word boundary on
/// both sides, in the sense of the regex `\b`.
///
/// Occurrences may overlap, so every start position is tried.
fn contains_word(haystack: &str, needle: &str) -> bool {
    let (Some(first), Some(last)) = (needle.chars().next(), needle.chars().next_back()) else {
        return true;
    };

    let mut from = 0;
    while let Some(offset) = haystack[from..].find(needle) {
        let start = from + offset;
        let end = start + needle.len();

        let before = haystack[..start].chars().next_back();
        let after = haystack[end..].chars().next();

        if is_boundary(before, first) && is_boundary(after, last) {
            return true;
        }

        from = start + first.len_utf8();
    }
    false
}

/// A boundary lies between `outside` and `inside` when exactly one of them
/// is a word character. The edge of the name counts as a non-word character.
fn is_boundary(outside: Option<char>, inside: char) -> bool {
    outside.is_some_and(is_word_char) != is_word_char(inside)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use bs_core::Category;

    fn paths(list: &[&str]) -> Vec<Utf8PathBuf> {
        list.iter().map(Utf8PathBuf::from).collect()
    }

    /// The tree `/root/{a.txt, sub/b.txt, sub/a_copy.txt}` in discovery order.
    fn example_engine() -> SearchEngine {
        let store = Arc::new(IndexStore::new());
        store.insert("a.txt", "/root/a.txt".into());
        store.insert("sub", "/root/sub".into());
        store.insert("b.txt", "/root/sub/b.txt".into());
        store.insert("a_copy.txt", "/root/sub/a_copy.txt".into());
        SearchEngine::new(store)
    }

    #[test]
    fn test_search_example_tree() {
        let engine = example_engine();
        assert_eq!(
            engine.search("a"),
            paths(&["/root/a.txt", "/root/sub/a_copy.txt"])
        );
    }

    #[test]
    fn test_search_empty_keyword_returns_everything() {
        let engine = example_engine();
        assert_eq!(
            engine.search(""),
            paths(&[
                "/root/a.txt",
                "/root/sub/a_copy.txt",
                "/root/sub/b.txt",
                "/root/sub",
            ])
        );
    }

    #[test]
    fn test_search_no_match() {
        assert!(example_engine().search("zzz").is_empty());
    }

    #[test]
    fn test_search_is_case_sensitive() {
        let engine = example_engine();
        assert!(engine.search("A").is_empty());
        assert_eq!(engine.search("copy"), paths(&["/root/sub/a_copy.txt"]));
    }

    #[test]
    fn test_search_keeps_discovery_order_within_name() {
        let store = Arc::new(IndexStore::new());
        store.insert("notes.md", "/r/z/notes.md".into());
        store.insert("notes.md", "/r/a/notes.md".into());
        let engine = SearchEngine::new(store);

        assert_eq!(
            engine.search("notes"),
            paths(&["/r/z/notes.md", "/r/a/notes.md"])
        );
    }

    #[test]
    fn test_search_on_empty_store() {
        let engine = SearchEngine::new(Arc::new(IndexStore::new()));
        assert!(engine.search("").is_empty());
    }

    #[test]
    fn test_ignore_case() {
        let store = Arc::new(IndexStore::new());
        store.insert("README.md", "/r/README.md".into());
        store.insert("readme.txt", "/r/readme.txt".into());
        let engine = SearchEngine::new(store);

        let query = SearchQuery::new("ReadMe").with_case_sensitive(false);
        assert_eq!(
            engine.search_query(&query),
            paths(&["/r/README.md", "/r/readme.txt"])
        );
    }

    #[test]
    fn test_whole_word() {
        let store = Arc::new(IndexStore::new());
        store.insert("report.pdf", "/r/report.pdf".into());
        store.insert("reports.pdf", "/r/reports.pdf".into());
        store.insert("my-report-2024.doc", "/r/my-report-2024.doc".into());
        store.insert("report_final.doc", "/r/report_final.doc".into());
        let engine = SearchEngine::new(store);

        let query = SearchQuery::new("report").with_mode(MatchMode::WholeWord);
        assert_eq!(
            engine.search_query(&query),
            paths(&["/r/my-report-2024.doc", "/r/report.pdf"])
        );
    }

    #[test]
    fn test_limit_and_category() {
        let engine = example_engine();

        let limited = SearchQuery::new("").with_limit(Some(2));
        assert_eq!(
            engine.search_query(&limited),
            paths(&["/root/a.txt", "/root/sub/a_copy.txt"])
        );

        let docs = SearchQuery::new("").with_category(Category::Documents);
        assert_eq!(
            engine.search_query(&docs),
            paths(&["/root/a.txt", "/root/sub/a_copy.txt", "/root/sub/b.txt"])
        );

        assert!(
            engine
                .search_query(&SearchQuery::new("a").with_category(Category::Video))
                .is_empty()
        );
    }

    #[test]
    fn test_contains_word_boundaries() {
        assert!(contains_word("a b", "a"));
        assert!(contains_word("x.a", "a"));
        assert!(!contains_word("ab", "a"));
        assert!(!contains_word("ba", "a"));
        assert!(!contains_word("_a_", "a"));
        // The second occurrence is bounded even though the first is not.
        assert!(contains_word("aa a", "a"));
        // Overlapping occurrences.
        assert!(contains_word("aba-ba", "ba"));
        assert!(!contains_word("ababa", "aba"));
    }

    #[test]
    fn test_contains_word_non_word_keyword() {
        // Like `\b.\b`: the dot needs word characters on both sides.
        assert!(contains_word("a.txt", "."));
        assert!(!contains_word(".hidden", "."));
        assert!(contains_word("a-b", "-"));
    }

    #[test]
    fn test_contains_word_unicode() {
        assert!(contains_word("café menu", "café"));
        assert!(!contains_word("cafés", "café"));
    }
}
