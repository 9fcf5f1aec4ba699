//! Data models flowing through the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::notes::{aggregate_failure_detail, partial_note, AGGREGATE_FAILURE_HEADLINE};
use crate::budget::{apply_budget, BudgetedContent};
use crate::errors::ErrorKind;
use crate::summarize::{join_documents, TermsContent};

/// Outcome of fetching and extracting one selected link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Link text, used as the document title.
    pub title: String,
    /// Extracted text, present on success.
    pub content: Option<String>,
    /// Failure classification.
    pub error_kind: Option<ErrorKind>,
    /// User-facing failure message.
    pub error_message: Option<String>,
    /// Low-level failure text.
    pub technical_detail: Option<String>,
    /// HTTP status when the fetch got a response.
    pub http_status: Option<u16>,
    /// The link's URL.
    pub source_url: String,
}

impl ExtractionResult {
    /// Creates a successful result.
    #[must_use]
    pub fn success(
        title: impl Into<String>,
        source_url: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: Some(content.into()),
            error_kind: None,
            error_message: None,
            technical_detail: None,
            http_status: None,
            source_url: source_url.into(),
        }
    }

    /// Creates a failed result.
    #[must_use]
    pub fn failure(
        title: impl Into<String>,
        source_url: impl Into<String>,
        kind: ErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: None,
            error_kind: Some(kind),
            error_message: Some(message.into()),
            technical_detail: None,
            http_status: None,
            source_url: source_url.into(),
        }
    }

    /// Sets the low-level failure text.
    #[must_use]
    pub fn with_technical_detail(mut self, detail: impl Into<String>) -> Self {
        self.technical_detail = Some(detail.into());
        self
    }

    /// Sets the HTTP status.
    #[must_use]
    pub fn with_http_status(mut self, status: Option<u16>) -> Self {
        self.http_status = status;
        self
    }

    /// Whether non-empty content was extracted.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.is_empty())
    }

    /// The reason shown for a skipped document.
    #[must_use]
    pub fn failure_reason(&self) -> &str {
        self.error_message.as_deref().unwrap_or("No content could be extracted")
    }
}

/// Splits results into successes and failures, keeping input order in each.
#[must_use]
pub fn partition(results: Vec<ExtractionResult>) -> (Vec<ExtractionResult>, Vec<ExtractionResult>) {
    results.into_iter().partition(ExtractionResult::is_success)
}

/// A document left out of the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDocument {
    /// Document title.
    pub title: String,
    /// Why it was skipped.
    pub reason: String,
}

impl SkippedDocument {
    /// Creates a skipped entry.
    #[must_use]
    pub fn new(title: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            reason: reason.into(),
        }
    }

    fn from_result(result: &ExtractionResult) -> Self {
        Self::new(result.title.clone(), result.failure_reason())
    }
}

/// The documents sent for summarization.
///
/// Built only from successful results, so every item has non-empty content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryPayload {
    items: Vec<TermsContent>,
    /// Sum of the content lengths in characters.
    pub total_chars: usize,
}

impl SummaryPayload {
    /// Builds a payload from results, dropping anything without content.
    #[must_use]
    pub fn from_successes(results: &[ExtractionResult]) -> Self {
        let items: Vec<TermsContent> = results
            .iter()
            .filter_map(|r| match &r.content {
                Some(content) if !content.is_empty() => {
                    Some(TermsContent::new(r.title.clone(), content.clone()))
                }
                _ => None,
            })
            .collect();
        let total_chars = items.iter().map(|i| i.content.chars().count()).sum();
        Self { items, total_chars }
    }

    /// The documents, in selection order.
    #[must_use]
    pub fn items(&self) -> &[TermsContent] {
        &self.items
    }

    /// Whether there is nothing to summarize.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Joins the documents as `## {title}` blocks.
    #[must_use]
    pub fn join(&self) -> String {
        join_documents(&self.items)
    }

    /// Joins and budgets the documents for `model`.
    #[must_use]
    pub fn budgeted(&self, model: &str) -> BudgetedContent {
        apply_budget(self.join(), model)
    }
}

/// A batch with at least one success, ready for summarization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedBatch {
    /// The documents to summarize.
    pub payload: SummaryPayload,
    /// Documents that failed, in selection order.
    pub skipped: Vec<SkippedDocument>,
}

impl PreparedBatch {
    /// Creates a batch from the payload and the failed results.
    #[must_use]
    pub fn new(payload: SummaryPayload, failed: &[ExtractionResult]) -> Self {
        Self {
            payload,
            skipped: failed.iter().map(SkippedDocument::from_result).collect(),
        }
    }

    /// The note appended to the summary when documents were skipped.
    #[must_use]
    pub fn partial_note(&self) -> Option<String> {
        if self.skipped.is_empty() {
            None
        } else {
            Some(partial_note(&self.skipped, self.payload.items().len()))
        }
    }

    /// Appends the partial note, if any, to a summary.
    #[must_use]
    pub fn render(&self, summary: &str) -> String {
        match self.partial_note() {
            Some(note) => format!("{summary}{note}"),
            None => summary.to_string(),
        }
    }
}

/// Every selected document failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateFailure {
    /// Per-link failures, in selection order.
    pub failures: Vec<SkippedDocument>,
}

impl AggregateFailure {
    /// Builds the failure from failed results.
    #[must_use]
    pub fn from_failures(results: &[ExtractionResult]) -> Self {
        Self {
            failures: results.iter().map(SkippedDocument::from_result).collect(),
        }
    }

    /// Always [`ErrorKind::AggregateFailure`].
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::AggregateFailure
    }

    /// Renders the failure for display.
    #[must_use]
    pub fn to_display(&self) -> ErrorDisplay {
        ErrorDisplay::new(AGGREGATE_FAILURE_HEADLINE)
            .with_technical_detail(aggregate_failure_detail(&self.failures))
    }
}

/// A failure as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDisplay {
    /// Headline message.
    pub message: String,
    /// Expandable detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_detail: Option<String>,
}

impl ErrorDisplay {
    /// Creates a display with only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            technical_detail: None,
        }
    }

    /// Sets the technical detail.
    #[must_use]
    pub fn with_technical_detail(mut self, detail: impl Into<String>) -> Self {
        self.technical_detail = Some(detail.into());
        self
    }
}

impl fmt::Display for ErrorDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(detail) = &self.technical_detail {
            write!(f, "\n\n{detail}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorDisplay {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ok(title: &str, content: &str) -> ExtractionResult {
        ExtractionResult::success(title, format!("https://example.com/{title}"), content)
    }

    fn failed(title: &str, message: &str) -> ExtractionResult {
        ExtractionResult::failure(
            title,
            format!("https://example.com/{title}"),
            ErrorKind::NetworkError,
            message,
        )
    }

    #[test]
    fn test_partition_keeps_order() {
        let (successes, failures) = partition(vec![
            failed("a", "down"),
            ok("b", "text b"),
            ExtractionResult::success("c", "https://example.com/c", ""),
            ok("d", "text d"),
        ]);

        let titles: Vec<&str> = successes.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "d"]);
        let titles: Vec<&str> = failures.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "c"]);
    }

    #[test]
    fn test_payload_join_and_total() {
        let payload = SummaryPayload::from_successes(&[ok("Terms", "abc"), ok("Privacy", "de")]);
        assert_eq!(payload.total_chars, 5);
        assert_eq!(payload.join(), "## Terms\n\nabc\n\n---\n\n## Privacy\n\nde");
    }

    #[test]
    fn test_budget_larger_than_join_is_identity() {
        let payload = SummaryPayload::from_successes(&[ok("Terms", "abc"), ok("Privacy", "de")]);
        let budgeted = payload.budgeted("gpt-4o");
        assert!(!budgeted.truncated);
        assert_eq!(budgeted.content, payload.join());
    }

    #[test]
    fn test_render_without_skips_is_unchanged() {
        let batch = PreparedBatch::new(SummaryPayload::from_successes(&[ok("Terms", "abc")]), &[]);
        assert_eq!(batch.partial_note(), None);
        assert_eq!(batch.render("- summary"), "- summary");
    }

    #[test]
    fn test_error_display_json() {
        let display = ErrorDisplay::new("Boom").with_technical_detail("trace");
        let json = serde_json::to_value(&display).unwrap();
        assert_eq!(json["technicalDetail"], "trace");
        assert_eq!(display.to_string(), "Boom\n\ntrace");
    }
}
