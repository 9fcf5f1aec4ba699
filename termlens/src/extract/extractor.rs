//! HTML to plain-text reduction with selector fallbacks.

use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, warn};

use super::config::ExtractionConfig;
use crate::errors::ExtractError;

/// Guards the recursive text walk against pathological nesting.
const MAX_DEPTH: usize = 512;

/// Elements that end a line of text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption",
    "figure", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "pre",
    "section", "table", "td", "th", "tr", "ul",
];

/// Elements whose text is never rendered.
const HIDDEN_TAGS: &[&str] = &["noscript", "template"];

/// Protocol for reducing raw markup to plain text.
pub trait ContentExtractor: Send + Sync {
    /// Extracts the readable text of a document.
    fn extract(&self, html: &str, source_url: &str) -> Result<String, ExtractError>;

    /// Gets the configuration.
    fn config(&self) -> &ExtractionConfig;
}

/// Selector-driven extractor backed by `scraper`.
///
/// Selectors are compiled once. Entries that fail to parse are logged and
/// skipped so extraction itself never fails on configuration.
#[derive(Debug, Clone)]
pub struct HtmlExtractor {
    config: ExtractionConfig,
    body: Option<Selector>,
    remove: Vec<Selector>,
    content: Vec<(String, Selector)>,
}

impl HtmlExtractor {
    /// Creates an extractor from configuration.
    #[must_use]
    pub fn new(config: ExtractionConfig) -> Self {
        let remove = config
            .remove_selectors
            .iter()
            .map(String::as_str)
            .filter_map(compile)
            .collect();
        let content = config
            .content_selectors
            .iter()
            .filter_map(|s| compile(s).map(|sel| (s.clone(), sel)))
            .collect();

        Self {
            body: compile("body"),
            remove,
            content,
            config,
        }
    }

    fn strip_denylisted(&self, document: &mut Html) {
        for selector in &self.remove {
            let ids: Vec<_> = document.select(selector).map(|el| el.id()).collect();
            for id in ids {
                if let Some(mut node) = document.tree.get_mut(id) {
                    node.detach();
                }
            }
        }
    }
}

impl Default for HtmlExtractor {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}

impl ContentExtractor for HtmlExtractor {
    fn extract(&self, html: &str, source_url: &str) -> Result<String, ExtractError> {
        let mut document = Html::parse_document(html);

        let has_body = self
            .body
            .as_ref()
            .is_some_and(|body| document.select(body).next().is_some());
        if !has_body {
            debug!(url = %source_url, "Document has no body element");
            return Err(ExtractError::MalformedDocument);
        }

        self.strip_denylisted(&mut document);

        let mut best_chars = 0;
        let mut winner = None;
        for (name, selector) in &self.content {
            let Some(element) = document.select(selector).next() else {
                continue;
            };
            let text = visible_text(element);
            let chars = text.trim().chars().count();
            best_chars = best_chars.max(chars);
            if chars > self.config.min_selector_chars {
                winner = Some((name.as_str(), text));
                break;
            }
        }

        let Some((selector, text)) = winner else {
            debug!(url = %source_url, best_chars, "No content container was long enough");
            return Err(ExtractError::InsufficientContent { chars: best_chars });
        };

        let content = normalize_whitespace(&text);
        let chars = content.chars().count();
        if chars < self.config.min_content_chars {
            debug!(url = %source_url, selector, chars, "Cleaned content too short");
            return Err(ExtractError::InsufficientContent { chars });
        }

        debug!(url = %source_url, selector, chars, "Content extracted");
        Ok(content)
    }

    fn config(&self) -> &ExtractionConfig {
        &self.config
    }
}

fn compile(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(compiled) => Some(compiled),
        Err(e) => {
            warn!(selector = %selector, error = %e, "Skipping selector that does not parse");
            None
        }
    }
}

/// Collects the text under an element, breaking lines at block elements.
fn visible_text(element: ElementRef<'_>) -> String {
    let mut buf = String::new();
    collect_text(element, &mut buf, 0);
    buf
}

fn collect_text(element: ElementRef<'_>, buf: &mut String, depth: usize) {
    if depth > MAX_DEPTH {
        return;
    }
    for child in element.children() {
        match child.value() {
            Node::Text(text) => buf.push_str(text),
            Node::Element(el) => {
                let tag = el.name();
                if HIDDEN_TAGS.contains(&tag) {
                    continue;
                }
                let block = BLOCK_TAGS.contains(&tag);
                if block || tag == "br" {
                    buf.push('\n');
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, buf, depth + 1);
                }
                if block {
                    buf.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Collapses horizontal whitespace to single spaces, trims every line and
/// reduces runs of blank lines to one.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_pending = false;

    for line in text.lines() {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            blank_pending = !out.is_empty();
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
            if blank_pending {
                out.push('\n');
            }
        }
        blank_pending = false;
        out.push_str(&words.join(" "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use pretty_assertions::assert_eq;

    const URL: &str = "https://example.com/terms";

    fn long_sentence() -> String {
        "These terms govern your use of the service and describe your rights. ".repeat(3)
    }

    #[test]
    fn test_short_page_is_insufficient_content() {
        let extractor = HtmlExtractor::default();
        let err = extractor
            .extract("<html><body><p>Too short.</p></body></html>", URL)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InsufficientContent);
        assert!(err.to_string().contains("meaningful content"));
    }

    #[test]
    fn test_frameset_document_is_malformed() {
        let extractor = HtmlExtractor::default();
        let html = r#"<html><head><title>x</title></head><frameset><frame src="a.html"></frameset></html>"#;
        assert_eq!(extractor.extract(html, URL), Err(ExtractError::MalformedDocument));
    }

    #[test]
    fn test_article_wins_over_body() {
        let extractor = HtmlExtractor::default();
        let html = format!(
            "<html><body><div>Sidebar chatter</div><article><h1>Terms</h1><p>{}</p></article></body></html>",
            long_sentence()
        );

        let content = extractor.extract(&html, URL).unwrap();
        assert!(content.starts_with("Terms\n\nThese terms govern"));
        assert!(!content.contains("Sidebar"));
    }

    #[test]
    fn test_short_container_falls_back_to_body() {
        let extractor = HtmlExtractor::default();
        let html = format!(
            "<html><body><main>Tiny</main><div class=\"legal\">{}</div></body></html>",
            long_sentence()
        );

        let content = extractor.extract(&html, URL).unwrap();
        assert!(content.starts_with("Tiny"));
        assert!(content.contains("These terms govern"));
    }

    #[test]
    fn test_denylisted_elements_are_removed() {
        let extractor = HtmlExtractor::default();
        let html = format!(
            r#"<html><head><style>.x {{ color: red }}</style></head><body>
               <header>Site header</header>
               <nav>Home | Blog</nav>
               <ul class="menu"><li>Menu item</li></ul>
               <div class="content"><script>var tracking = 1;</script><p>{}</p></div>
               <footer>Copyright</footer>
               </body></html>"#,
            long_sentence()
        );

        let content = extractor.extract(&html, URL).unwrap();
        for noise in ["Site header", "Home | Blog", "Menu item", "tracking", "Copyright", "color"] {
            assert!(!content.contains(noise), "found {noise:?} in {content:?}");
        }
    }

    #[test]
    fn test_padded_container_that_collapses_is_rejected() {
        let extractor = HtmlExtractor::default();
        let padded = format!("a{}b", " ".repeat(120));
        let html = format!(
            "<html><body><article>{padded}</article><p>{}</p></body></html>",
            long_sentence()
        );

        let err = extractor.extract(&html, URL).unwrap_err();
        assert_eq!(err, ExtractError::InsufficientContent { chars: 3 });
    }

    #[test]
    fn test_paragraphs_are_separated_by_one_blank_line() {
        let extractor = HtmlExtractor::default();
        let html = format!(
            "<html><body><article><p>First   paragraph\there.</p>\n\n\n<p>{}</p></article></body></html>",
            long_sentence()
        );

        let content = extractor.extract(&html, URL).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("First paragraph here."));
        assert_eq!(lines.next(), Some(""));
        assert!(!content.contains("\n\n\n"));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let extractor = HtmlExtractor::default();
        let html = format!(
            "<html><body><main><h2>Privacy</h2><p>{}</p><ul><li>one</li><li>two</li></ul></main></body></html>",
            long_sentence()
        );

        let first = extractor.extract(&html, URL).unwrap();
        let second = extractor.extract(&html, URL).unwrap();
        assert_eq!(first, second);
        assert_eq!(normalize_whitespace(&first), first);
    }

    #[test]
    fn test_invalid_selector_is_skipped() {
        let config = ExtractionConfig::new().with_content_selectors(["[[broken", "body"]);
        let extractor = HtmlExtractor::new(config);
        let html = format!("<html><body><p>{}</p></body></html>", long_sentence());
        assert!(extractor.extract(&html, URL).is_ok());
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \t b  \n\n\n\n  c  \n"), "a b\n\nc");
        assert_eq!(normalize_whitespace("\n\n"), "");
        assert_eq!(normalize_whitespace("one\ntwo"), "one\ntwo");
    }
}
