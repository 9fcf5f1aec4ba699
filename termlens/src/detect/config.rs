//! Configuration for link detection.

use serde::{Deserialize, Serialize};

/// Configuration for the link classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Keywords matched against anchor text, in priority order.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    /// Whether anchors with non-HTTP schemes (mailto:, javascript:) are kept.
    #[serde(default)]
    pub allow_non_http: bool,
}

fn default_keywords() -> Vec<String> {
    vec!["terms".to_string(), "privacy policy".to_string()]
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            allow_non_http: false,
        }
    }
}

impl DetectionConfig {
    /// Creates a new detection configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the keyword list.
    #[must_use]
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Appends a keyword with the lowest priority.
    #[must_use]
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.push(keyword.into());
        self
    }
}
