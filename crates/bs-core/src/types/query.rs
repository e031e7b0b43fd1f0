//! Search query description.

use serde::{Deserialize, Serialize};

use super::category::Category;
use crate::config::SearchConfig;

/// How a keyword is compared against a filename.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum MatchMode {
    /// The filename contains the keyword as a contiguous substring.
    #[default]
    Substring,
    /// The keyword occurs in the filename bounded by non-word characters
    /// (or the start/end of the name). Word characters are alphanumerics
    /// and `_`.
    WholeWord,
}

/// A keyword plus the options controlling how it is matched.
///
/// # Examples
///
/// ```
/// use bs_core::{Category, MatchMode, SearchQuery};
///
/// let query = SearchQuery::new("report")
///     .with_mode(MatchMode::WholeWord)
///     .with_case_sensitive(false)
///     .with_category(Category::Documents)
///     .with_limit(Some(20));
///
/// assert_eq!(query.keyword, "report");
/// assert!(!query.case_sensitive);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// The keyword to look for.
    pub keyword: String,
    /// How the keyword is matched.
    pub mode: MatchMode,
    /// Whether matching distinguishes case.
    pub case_sensitive: bool,
    /// Restricts results to one extension category.
    pub category: Category,
    /// Maximum number of results.
    pub limit: Option<usize>,
}

impl SearchQuery {
    /// Creates a case-sensitive substring query with no filter or limit.
    #[must_use]
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            mode: MatchMode::Substring,
            case_sensitive: true,
            category: Category::All,
            limit: None,
        }
    }

    /// Creates a query using the defaults from a [`SearchConfig`].
    #[must_use]
    pub fn from_config(keyword: impl Into<String>, config: &SearchConfig) -> Self {
        Self {
            keyword: keyword.into(),
            mode: config.mode,
            case_sensitive: config.case_sensitive,
            category: Category::All,
            limit: config.limit,
        }
    }

    /// Sets the match mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets case sensitivity.
    #[must_use]
    pub const fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Restricts results to a category.
    #[must_use]
    pub const fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Caps the number of results.
    #[must_use]
    pub const fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults() {
        let query = SearchQuery::new("a");
        assert!(query.case_sensitive);
        assert!(query.limit.is_none());
        assert_eq!(query.mode, MatchMode::Substring);
        assert_eq!(query.category, Category::All);
    }

    #[test]
    fn test_builders() {
        let query = SearchQuery::new("a")
            .with_limit(Some(1))
            .with_case_sensitive(false)
            .with_mode(MatchMode::WholeWord)
            .with_category(Category::Video);
        assert_eq!(query.limit, Some(1));
        assert!(!query.case_sensitive);
        assert_eq!(query.mode, MatchMode::WholeWord);
        assert_eq!(query.category, Category::Video);
    }

    #[test]
    fn test_from_config() {
        let config = SearchConfig {
            mode: MatchMode::WholeWord,
            case_sensitive: false,
            limit: Some(5),
        };
        let query = SearchQuery::from_config("x", &config);
        assert_eq!(query.mode, MatchMode::WholeWord);
        assert!(!query.case_sensitive);
        assert_eq!(query.limit, Some(5));
        assert_eq!(query.category, Category::All);
    }

    #[test]
    fn test_match_mode_serialization() {
        assert_eq!(
            serde_json::to_string(&MatchMode::WholeWord).unwrap(),
            r#""whole_word""#
        );
        assert_eq!(
            serde_json::to_string(&MatchMode::Substring).unwrap(),
            r#""substring""#
        );
    }
}
