//! Configuration structures for better-search.
//!
//! - [`IndexConfig`] - Walker and indexing-service settings
//! - [`SearchConfig`] - Default query options used by the CLI
//! - [`Config`] - Root configuration combining both
//!
//! All configuration types implement [`Default`] and deserialize with
//! `#[serde(default)]`, so a JSON file only needs the keys it overrides.

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::MatchMode;

/// Default number of indexed entries between progress updates.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1000;

/// Configuration for one indexing pass.
///
/// # Examples
///
/// ```
/// use bs_core::IndexConfig;
///
/// let config = IndexConfig::default();
/// assert_eq!(config.threads, 1);
/// assert!(config.include_hidden);
/// assert!(!config.follow_links);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Whether to follow symbolic links while walking.
    pub follow_links: bool,

    /// Whether hidden files and directories are indexed.
    pub include_hidden: bool,

    /// Whether `.gitignore` / `.ignore` rules prune the walk.
    pub respect_ignore_files: bool,

    /// Directory names that are never descended into.
    pub skip_dirs: Vec<String>,

    /// Maximum traversal depth below the root. `None` means unlimited.
    pub max_depth: Option<usize>,

    /// Number of walker threads. `1` walks sequentially on the indexing worker.
    pub threads: usize,

    /// Number of indexed entries between streamed progress updates.
    pub progress_interval: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            follow_links: false,
            include_hidden: true,
            respect_ignore_files: false,
            skip_dirs: Vec::new(),
            max_depth: None,
            threads: 1,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl IndexConfig {
    /// Checks option values that deserialization cannot rule out.
    ///
    /// # Examples
    ///
    /// ```
    /// use bs_core::IndexConfig;
    ///
    /// let mut config = IndexConfig::default();
    /// assert!(config.validate().is_ok());
    ///
    /// config.threads = 0;
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads == 0 {
            return Err(ConfigError::invalid_option("threads", "must be at least 1"));
        }
        if self.progress_interval == 0 {
            return Err(ConfigError::invalid_option(
                "progress_interval",
                "must be at least 1",
            ));
        }
        if self.skip_dirs.iter().any(String::is_empty) {
            return Err(ConfigError::invalid_option(
                "skip_dirs",
                "directory names must not be empty",
            ));
        }
        Ok(())
    }
}

/// Default options applied to queries that don't override them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// How the keyword is matched against filenames.
    pub mode: MatchMode,

    /// Whether matching distinguishes upper and lower case.
    pub case_sensitive: bool,

    /// Maximum number of results to return. `None` returns everything.
    pub limit: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: MatchMode::Substring,
            case_sensitive: true,
            limit: None,
        }
    }
}

/// Root configuration for better-search.
///
/// # Examples
///
/// ```
/// use bs_core::Config;
///
/// let config: Config = serde_json::from_str(r#"{"index": {"threads": 4}}"#).unwrap();
/// assert_eq!(config.index.threads, 4);
/// assert!(config.search.case_sensitive);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Indexing configuration.
    pub index: IndexConfig,

    /// Search configuration.
    pub search: SearchConfig,
}

impl Config {
    /// Loads a configuration from a JSON file and validates it.
    ///
    /// Missing keys fall back to their defaults.
    pub fn from_json_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.index.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_config_defaults() {
        let config = IndexConfig::default();
        assert!(!config.follow_links);
        assert!(config.include_hidden);
        assert!(!config.respect_ignore_files);
        assert!(config.skip_dirs.is_empty());
        assert_eq!(config.max_depth, None);
        assert_eq!(config.threads, 1);
        assert_eq!(config.progress_interval, DEFAULT_PROGRESS_INTERVAL);
    }

    #[test]
    fn test_index_config_snapshot() {
        insta::assert_json_snapshot!(IndexConfig::default(), @r#"
        {
          "follow_links": false,
          "include_hidden": true,
          "respect_ignore_files": false,
          "skip_dirs": [],
          "max_depth": null,
          "threads": 1,
          "progress_interval": 1000
        }
        "#);
    }

    #[test]
    fn test_search_config_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.mode, MatchMode::Substring);
        assert!(config.case_sensitive);
        assert_eq!(config.limit, None);
    }

    #[test]
    fn test_validate_rejects_zero_threads() {
        let config = IndexConfig {
            threads: 0,
            ..IndexConfig::default()
        };
        let err = config.validate().err();
        assert!(matches!(
            err,
            Some(ConfigError::InvalidOption { ref option, .. }) if option == "threads"
        ));
    }

    #[test]
    fn test_validate_rejects_zero_progress_interval() {
        let config = IndexConfig {
            progress_interval: 0,
            ..IndexConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_skip_dir() {
        let config = IndexConfig {
            skip_dirs: vec!["target".to_owned(), String::new()],
            ..IndexConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_config_deserialize_with_missing_fields() {
        let json = r#"{"index": {"skip_dirs": ["node_modules"]}, "search": {"mode": "whole_word"}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.index.skip_dirs, vec!["node_modules"]);
        assert_eq!(config.index.threads, 1);
        assert_eq!(config.search.mode, MatchMode::WholeWord);
        assert!(config.search.case_sensitive);
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bsearch.json");
        std::fs::write(&path, r#"{"index": {"threads": 3, "follow_links": true}}"#).unwrap();

        let path = camino::Utf8PathBuf::try_from(path).unwrap();
        let config = Config::from_json_file(&path).unwrap();
        assert_eq!(config.index.threads, 3);
        assert!(config.index.follow_links);
    }

    #[test]
    fn test_from_json_file_missing() {
        let result = Config::from_json_file(Utf8Path::new("/nonexistent/bsearch.json"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_from_json_file_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bsearch.json");
        std::fs::write(&path, r#"{"index": {"threads": 0}}"#).unwrap();

        let path = camino::Utf8PathBuf::try_from(path).unwrap();
        let result = Config::from_json_file(&path);
        assert!(matches!(result, Err(ConfigError::InvalidOption { .. })));
    }
}
