//! Configuration for content extraction.

use serde::{Deserialize, Serialize};

/// Configuration for reducing markup to plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Elements detached before any text is read.
    #[serde(default = "default_remove_selectors")]
    pub remove_selectors: Vec<String>,
    /// Content containers tried in order; the first match of each counts.
    #[serde(default = "default_content_selectors")]
    pub content_selectors: Vec<String>,
    /// A container wins when its trimmed text is longer than this.
    #[serde(default = "default_min_selector_chars")]
    pub min_selector_chars: usize,
    /// Cleaned text shorter than this is rejected.
    #[serde(default = "default_min_content_chars")]
    pub min_content_chars: usize,
}

fn default_remove_selectors() -> Vec<String> {
    [
        "script",
        "style",
        "nav",
        "header",
        "footer",
        ".navigation",
        ".nav",
        ".menu",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

fn default_content_selectors() -> Vec<String> {
    [
        "article",
        "main",
        "[role='main']",
        ".content",
        ".main-content",
        ".terms-content",
        ".legal-content",
        "#content",
        "#main",
        ".container .content",
        "body",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

fn default_min_selector_chars() -> usize {
    100
}

fn default_min_content_chars() -> usize {
    50
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            remove_selectors: default_remove_selectors(),
            content_selectors: default_content_selectors(),
            min_selector_chars: default_min_selector_chars(),
            min_content_chars: default_min_content_chars(),
        }
    }
}

impl ExtractionConfig {
    /// Creates a new extraction configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the content selector list.
    #[must_use]
    pub fn with_content_selectors<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content_selectors = selectors.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a selector to the denylist.
    #[must_use]
    pub fn with_remove_selector(mut self, selector: impl Into<String>) -> Self {
        self.remove_selectors.push(selector.into());
        self
    }

    /// Sets both length thresholds.
    #[must_use]
    pub fn with_thresholds(mut self, min_selector_chars: usize, min_content_chars: usize) -> Self {
        self.min_selector_chars = min_selector_chars;
        self.min_content_chars = min_content_chars;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_config_defaults() {
        let config = ExtractionConfig::default();
        assert_eq!(config.content_selectors.first().map(String::as_str), Some("article"));
        assert_eq!(config.content_selectors.last().map(String::as_str), Some("body"));
        assert_eq!(config.content_selectors.len(), 11);
        assert_eq!(config.remove_selectors.len(), 8);
        assert_eq!(config.min_selector_chars, 100);
        assert_eq!(config.min_content_chars, 50);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ExtractionConfig = serde_json::from_str(r#"{"min_content_chars": 10}"#).unwrap();
        assert_eq!(config.min_content_chars, 10);
        assert_eq!(config.min_selector_chars, 100);
        assert!(config.remove_selectors.contains(&".menu".to_string()));
    }

    #[test]
    fn test_builders() {
        let config = ExtractionConfig::new()
            .with_content_selectors(["#legal", "body"])
            .with_remove_selector("aside")
            .with_thresholds(20, 10);
        assert_eq!(config.content_selectors, vec!["#legal", "body"]);
        assert!(config.remove_selectors.contains(&"aside".to_string()));
        assert_eq!((config.min_selector_chars, config.min_content_chars), (20, 10));
    }
}
