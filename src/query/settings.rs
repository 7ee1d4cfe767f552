//! Query settings controlling how directives are applied.

use serde::{Deserialize, Serialize};

/// Default maximum page size
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Query application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySettings {
    /// Maximum rows returned by one collection fetch (default: 100)
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Append the key as a final sort key when paging (default: true)
    #[serde(default = "default_stable_ordering")]
    pub ensure_stable_ordering: bool,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_stable_ordering() -> bool {
    true
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            ensure_stable_ordering: default_stable_ordering(),
        }
    }
}

impl QuerySettings {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size,
            ..Default::default()
        }
    }

    /// Number of rows a request for `requested` rows may actually return
    pub fn clamp_top(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(top) => top.min(self.page_size),
            None => self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = QuerySettings::default();
        assert_eq!(settings.page_size, 100);
        assert!(settings.ensure_stable_ordering);
    }

    #[test]
    fn test_clamp_top() {
        let settings = QuerySettings::with_page_size(100);
        assert_eq!(settings.clamp_top(Some(1000)), 100);
        assert_eq!(settings.clamp_top(Some(7)), 7);
        assert_eq!(settings.clamp_top(None), 100);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: QuerySettings = serde_json::from_str(r#"{"page_size": 25}"#).unwrap();
        assert_eq!(settings.page_size, 25);
        assert!(settings.ensure_stable_ordering);
    }
}
