//! Data models for link detection.

use serde::{Deserialize, Serialize};

/// An anchor element read from a scanned page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    /// Position among the page's `a[href]` elements, in document order.
    pub index: usize,
    /// Visible text of the anchor.
    pub text: String,
    /// Absolute target URL.
    pub href: String,
}

impl Anchor {
    /// Creates a new anchor.
    #[must_use]
    pub fn new(index: usize, text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            href: href.into(),
        }
    }
}

/// An anchor whose visible text matched a configured keyword.
///
/// `element_index` refers back to the anchor on the scanned page. The page
/// owns the element; the pipeline only carries the index, so a candidate is
/// meaningless once the page navigates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateLink {
    /// Position of the anchor among the page's `a[href]` elements.
    pub element_index: usize,
    /// Trimmed visible text, used as the document title downstream.
    pub display_text: String,
    /// Absolute URL of the linked document.
    pub url: String,
    /// The first keyword (in keyword-list order) that matched.
    pub matched_keyword: String,
}

impl CandidateLink {
    /// Creates a new candidate link.
    #[must_use]
    pub fn new(
        element_index: usize,
        display_text: impl Into<String>,
        url: impl Into<String>,
        matched_keyword: impl Into<String>,
    ) -> Self {
        Self {
            element_index,
            display_text: display_text.into(),
            url: url.into(),
            matched_keyword: matched_keyword.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_serialization() {
        let link = CandidateLink::new(2, "Privacy Policy", "https://example.com/privacy", "privacy policy");
        let json = serde_json::to_value(&link).unwrap();

        assert_eq!(json["element_index"], 2);
        assert_eq!(json["matched_keyword"], "privacy policy");
    }
}
