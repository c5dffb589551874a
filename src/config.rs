//! Searcher configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default upper bound on the number of clauses a rewritten query may hold.
pub const DEFAULT_MAX_CLAUSE_COUNT: usize = 1024;

/// Default field used when a query names no field.
pub const DEFAULT_FIELD: &str = "contents";

/// Configuration for a [`Searcher`](crate::search::searcher::Searcher).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of clauses a rewritten boolean query may contain.
    /// Wildcard patterns that expand past this are rejected.
    pub max_clause_count: usize,

    /// Field searched when none is given explicitly.
    pub default_field: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_clause_count: DEFAULT_MAX_CLAUSE_COUNT,
            default_field: DEFAULT_FIELD.to_string(),
        }
    }
}

impl SearchConfig {
    /// Parse a configuration from a JSON document. Missing keys keep their
    /// defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Set the maximum clause count.
    pub fn with_max_clause_count(mut self, max_clause_count: usize) -> Self {
        self.max_clause_count = max_clause_count;
        self
    }

    /// Set the default field.
    pub fn with_default_field<S: Into<String>>(mut self, field: S) -> Self {
        self.default_field = field.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.max_clause_count, 1024);
        assert_eq!(config.default_field, "contents");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SearchConfig::from_json_str(r#"{"max_clause_count": 8}"#).unwrap();
        assert_eq!(config.max_clause_count, 8);
        assert_eq!(config.default_field, "contents");
    }

    #[test]
    fn test_invalid_json() {
        assert!(SearchConfig::from_json_str("{not json").is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("search.json");
        fs::write(&path, r#"{"default_field": "body"}"#).unwrap();

        let config = SearchConfig::from_file(&path).unwrap();
        assert_eq!(config.default_field, "body");
        assert_eq!(config.max_clause_count, DEFAULT_MAX_CLAUSE_COUNT);
    }
}
