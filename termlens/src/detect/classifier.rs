//! Keyword-based classification of anchor elements.

use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use super::config::DetectionConfig;
use super::models::{Anchor, CandidateLink};
use crate::errors::TermlensError;

const ANCHOR_SELECTOR: &str = "a[href]";

/// Flags anchors whose visible text names a legal document.
///
/// Keywords match as whole words, case-insensitively: "Terms of Service"
/// matches `terms`, "algorithms" and "terminology" do not.
#[derive(Debug, Clone)]
pub struct LinkClassifier {
    config: DetectionConfig,
    patterns: Vec<(String, Regex)>,
}

impl LinkClassifier {
    /// Creates a classifier from configuration.
    #[must_use]
    pub fn new(config: DetectionConfig) -> Self {
        let patterns = config
            .keywords
            .iter()
            .filter_map(|keyword| match keyword_pattern(keyword) {
                Some(Ok(re)) => Some((keyword.to_lowercase(), re)),
                Some(Err(e)) => {
                    warn!(keyword = %keyword, error = %e, "Skipping keyword that does not compile");
                    None
                }
                None => None,
            })
            .collect();

        Self { config, patterns }
    }

    /// Gets the configuration.
    #[must_use]
    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Returns the first keyword matching `text`, in keyword-list order.
    #[must_use]
    pub fn matching_keyword(&self, text: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|(_, re)| re.is_match(text))
            .map(|(keyword, _)| keyword.as_str())
    }

    /// Classifies anchors, preserving their order.
    ///
    /// Each anchor yields at most one candidate. An empty slice yields an
    /// empty result.
    #[must_use]
    pub fn classify(&self, anchors: &[Anchor]) -> Vec<CandidateLink> {
        let candidates: Vec<CandidateLink> = anchors
            .iter()
            .filter_map(|anchor| {
                let text = anchor.text.trim();
                self.matching_keyword(text).map(|keyword| {
                    debug!(
                        index = anchor.index,
                        text = %text,
                        keyword = %keyword,
                        "Legal document link found"
                    );
                    CandidateLink::new(anchor.index, text, anchor.href.clone(), keyword)
                })
            })
            .collect();

        debug!(
            anchors = anchors.len(),
            candidates = candidates.len(),
            "Link classification completed"
        );
        candidates
    }

    /// Parses a page and classifies its anchors.
    pub fn scan_document(
        &self,
        html: &str,
        page_url: &str,
    ) -> Result<Vec<CandidateLink>, TermlensError> {
        let base = Url::parse(page_url).map_err(|e| TermlensError::invalid_url(page_url, e))?;
        let anchors = collect_anchors(html, &base, self.config.allow_non_http);
        Ok(self.classify(&anchors))
    }
}

impl Default for LinkClassifier {
    fn default() -> Self {
        Self::new(DetectionConfig::default())
    }
}

/// Builds a whole-word pattern. Words inside a phrase may be separated by
/// any run of whitespace.
fn keyword_pattern(keyword: &str) -> Option<Result<Regex, regex::Error>> {
    let words: Vec<String> = keyword.split_whitespace().map(regex::escape).collect();
    if words.is_empty() {
        return None;
    }
    Some(Regex::new(&format!(r"(?i)\b{}\b", words.join(r"\s+"))))
}

/// Collects the `a[href]` anchors of a page with absolute hrefs.
///
/// Anchors keep their position among all `a[href]` elements even when
/// unresolvable ones are skipped, so indices stay aligned with the page.
#[must_use]
pub fn collect_anchors(html: &str, base: &Url, allow_non_http: bool) -> Vec<Anchor> {
    let selector = match Selector::parse(ANCHOR_SELECTOR) {
        Ok(selector) => selector,
        Err(e) => {
            warn!(error = %e, "Anchor selector failed to parse");
            return Vec::new();
        }
    };

    let document = Html::parse_document(html);
    document
        .select(&selector)
        .enumerate()
        .filter_map(|(index, element)| {
            let href = element.value().attr("href")?;
            let resolved = match base.join(href.trim()) {
                Ok(url) => url,
                Err(e) => {
                    debug!(href = %href, error = %e, "Skipping unresolvable anchor");
                    return None;
                }
            };
            if !allow_non_http && !matches!(resolved.scheme(), "http" | "https") {
                return None;
            }

            let text: String = element.text().collect();
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            Some(Anchor::new(index, text, resolved.to_string()))
        })
        .collect()
}
