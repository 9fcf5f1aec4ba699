//! Selection state for one scanned page.

use tracing::debug;

use crate::detect::CandidateLink;
use crate::pipeline::{ErrorDisplay, Orchestrator, EMPTY_SELECTION_MESSAGE};

/// The candidate links found on a page and which of them are selected.
///
/// Every link starts selected. [`summarize`](Self::summarize) takes the
/// session mutably, so a session runs at most one summary at a time.
#[derive(Debug, Clone)]
pub struct SummarizeSession {
    links: Vec<CandidateLink>,
    selected: Vec<bool>,
    last_outcome: Option<Result<String, ErrorDisplay>>,
}

impl SummarizeSession {
    /// Creates a session with every link selected.
    #[must_use]
    pub fn new(links: Vec<CandidateLink>) -> Self {
        let selected = vec![true; links.len()];
        Self {
            links,
            selected,
            last_outcome: None,
        }
    }

    /// All candidate links, in page order.
    #[must_use]
    pub fn links(&self) -> &[CandidateLink] {
        &self.links
    }

    /// Number of candidate links.
    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether the page had no candidate links.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Whether the link at `index` is selected.
    #[must_use]
    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.get(index).copied().unwrap_or(false)
    }

    /// Flips the selection of one link and returns its new state.
    /// Out-of-range indices are ignored.
    pub fn toggle(&mut self, index: usize) -> bool {
        match self.selected.get_mut(index) {
            Some(flag) => {
                *flag = !*flag;
                *flag
            }
            None => false,
        }
    }

    /// Sets the selection of one link. Out-of-range indices are ignored.
    pub fn set_selected(&mut self, index: usize, selected: bool) {
        if let Some(flag) = self.selected.get_mut(index) {
            *flag = selected;
        }
    }

    /// Selects every link.
    pub fn select_all(&mut self) {
        self.selected.fill(true);
    }

    /// Clears the selection.
    pub fn select_none(&mut self) {
        self.selected.fill(false);
    }

    /// Number of selected links.
    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.selected.iter().filter(|s| **s).count()
    }

    /// The selected links, in page order.
    #[must_use]
    pub fn selected_links(&self) -> Vec<CandidateLink> {
        self.links
            .iter()
            .zip(&self.selected)
            .filter(|(_, selected)| **selected)
            .map(|(link, _)| link.clone())
            .collect()
    }

    /// The outcome of the last summarize call.
    #[must_use]
    pub fn last_outcome(&self) -> Option<&Result<String, ErrorDisplay>> {
        self.last_outcome.as_ref()
    }

    /// Summarizes the selected links.
    pub async fn summarize(&mut self, orchestrator: &Orchestrator) -> Result<String, ErrorDisplay> {
        let selected = self.selected_links();
        debug!(selected = selected.len(), total = self.links.len(), "Summarize requested");

        let outcome = if selected.is_empty() {
            Err(ErrorDisplay::new(EMPTY_SELECTION_MESSAGE))
        } else {
            orchestrator.summarize(&selected).await
        };
        self.last_outcome = Some(outcome.clone());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        candidate, legal_page, scripted_orchestrator, test_settings, ScriptedFetcher,
        ScriptedSummarizer,
    };
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn session() -> SummarizeSession {
        SummarizeSession::new(vec![
            candidate(0, "Terms", "https://a.test/terms"),
            candidate(3, "Privacy Policy", "https://a.test/privacy"),
            candidate(7, "Cookie Terms", "https://a.test/cookies"),
        ])
    }

    #[test]
    fn test_all_links_start_selected() {
        let session = session();
        assert_eq!(session.len(), 3);
        assert_eq!(session.selected_count(), 3);
    }

    #[test]
    fn test_toggle_and_bulk_selection() {
        let mut session = session();

        assert!(!session.toggle(1));
        let titles: Vec<String> = session.selected_links().into_iter().map(|l| l.display_text).collect();
        assert_eq!(titles, vec!["Terms", "Cookie Terms"]);

        session.select_none();
        assert_eq!(session.selected_count(), 0);
        assert!(session.toggle(2));
        assert_eq!(session.selected_links()[0].element_index, 7);

        session.select_all();
        assert_eq!(session.selected_count(), 3);

        session.set_selected(0, false);
        assert!(!session.is_selected(0));
        assert!(!session.toggle(99));
        assert!(!session.is_selected(99));
    }

    #[tokio::test]
    async fn test_empty_selection_is_rejected() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let orchestrator = scripted_orchestrator(
            Arc::clone(&fetcher),
            Arc::new(ScriptedSummarizer::replying("unused")),
            test_settings("gpt-4o"),
        );

        let mut session = session();
        session.select_none();
        let err = session.summarize(&orchestrator).await.unwrap_err();

        assert_eq!(err.message, "Please select at least one terms document to summarize.");
        assert!(fetcher.calls().is_empty());
        assert!(session.last_outcome().unwrap().is_err());
    }

    #[tokio::test]
    async fn test_summarize_uses_selection() {
        let fetcher = Arc::new(
            ScriptedFetcher::new().with_page("https://a.test/privacy", legal_page("Privacy")),
        );
        let orchestrator = scripted_orchestrator(
            Arc::clone(&fetcher),
            Arc::new(ScriptedSummarizer::replying("- Privacy summary")),
            test_settings("gpt-4o"),
        );

        let mut session = session();
        session.select_none();
        session.set_selected(1, true);

        let summary = session.summarize(&orchestrator).await.unwrap();
        assert_eq!(summary, "- Privacy summary");
        assert_eq!(fetcher.calls(), vec!["https://a.test/privacy".to_string()]);
        assert_eq!(session.last_outcome(), Some(&Ok("- Privacy summary".to_string())));
    }
}
