//! Pages, links and wiring helpers for tests.

use std::sync::Arc;

use super::fakes::{ScriptedFetcher, ScriptedSummarizer};
use crate::detect::CandidateLink;
use crate::fetch::{FetchBroker, DEFAULT_BROKER_CAPACITY};
use crate::pipeline::Orchestrator;
use crate::settings::{Settings, StaticSettingsStore};

const LEGAL_PARAGRAPH: &str = "By accessing or using the service you agree to be bound by these \
terms. We may update these terms at any time and continued use constitutes acceptance.";

/// A page whose `<article>` holds enough legal text to extract.
#[must_use]
pub fn legal_page(title: &str) -> String {
    format!(
        "<html><head><title>{title}</title></head><body>\
         <nav>Home | About</nav>\
         <article><h1>{title}</h1><p>{LEGAL_PARAGRAPH}</p><p>{LEGAL_PARAGRAPH}</p></article>\
         <footer>Copyright</footer></body></html>"
    )
}

/// A page containing one anchor per `(text, href)` pair.
#[must_use]
pub fn page_with_links(links: &[(&str, &str)]) -> String {
    let anchors: String = links
        .iter()
        .map(|(text, href)| format!("<li><a href=\"{href}\">{text}</a></li>"))
        .collect();
    format!("<html><body><ul>{anchors}</ul></body></html>")
}

/// `chars` characters of filler text.
#[must_use]
pub fn long_text(chars: usize) -> String {
    "lorem ipsum ".chars().cycle().take(chars).collect()
}

/// A candidate link as the classifier would produce it.
#[must_use]
pub fn candidate(index: usize, text: &str, url: &str) -> CandidateLink {
    CandidateLink::new(index, text, url, text.to_lowercase())
}

/// Settings with a valid key for `model`.
#[must_use]
pub fn test_settings(model: &str) -> Settings {
    Settings::new("sk-test", model)
}

/// An orchestrator wired to scripted collaborators through a real broker.
///
/// Must be called inside a Tokio runtime.
#[must_use]
pub fn scripted_orchestrator(
    fetcher: Arc<ScriptedFetcher>,
    summarizer: Arc<ScriptedSummarizer>,
    settings: Settings,
) -> Orchestrator {
    let (client, _handle) = FetchBroker::spawn(fetcher, DEFAULT_BROKER_CAPACITY);
    Orchestrator::new(client, summarizer, Arc::new(StaticSettingsStore::new(settings)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_text_length() {
        assert_eq!(long_text(25).chars().count(), 25);
    }

    #[test]
    fn test_page_with_links() {
        let html = page_with_links(&[("Terms", "/terms")]);
        assert!(html.contains("<a href=\"/terms\">Terms</a>"));
    }
}
