//! Typed messages exchanged with the summarization collaborator.

use serde::{Deserialize, Serialize};

use crate::budget::apply_budget;

/// Action name for summarize requests.
pub const SUMMARIZE_TERMS_ACTION: &str = "summarizeTerms";

/// Separator placed between documents in the combined content.
pub const DOCUMENT_SEPARATOR: &str = "\n\n---\n\n";

/// One extracted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermsContent {
    /// Document title, taken from the link text.
    pub title: String,
    /// Extracted plain text.
    pub content: String,
}

impl TermsContent {
    /// Creates a new document.
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Joins documents as `## {title}` blocks in order.
#[must_use]
pub fn join_documents(documents: &[TermsContent]) -> String {
    documents
        .iter()
        .map(|doc| format!("## {}\n\n{}", doc.title, doc.content))
        .collect::<Vec<_>>()
        .join(DOCUMENT_SEPARATOR)
}

/// Request sent to the summarization collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest {
    /// Always [`SUMMARIZE_TERMS_ACTION`] for well-formed requests.
    pub action: String,
    /// The successfully extracted documents.
    pub terms_contents: Vec<TermsContent>,
    /// Joined and budgeted content.
    #[serde(default)]
    pub prepared_content: String,
    /// Model identifier.
    pub model: String,
}

impl SummarizeRequest {
    /// Creates a summarize request.
    #[must_use]
    pub fn new(
        terms_contents: Vec<TermsContent>,
        prepared_content: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            action: SUMMARIZE_TERMS_ACTION.to_string(),
            terms_contents,
            prepared_content: prepared_content.into(),
            model: model.into(),
        }
    }

    /// Returns the text to send to the model.
    ///
    /// Requests built without prepared content are joined and budgeted here.
    #[must_use]
    pub fn content_for_model(&self) -> String {
        if self.prepared_content.is_empty() {
            apply_budget(join_documents(&self.terms_contents), &self.model).content
        } else {
            self.prepared_content.clone()
        }
    }
}

/// Response returned by the summarization collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizeResponse {
    /// Whether a summary was produced.
    pub success: bool,
    /// The markdown summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SummarizeResponse {
    /// Creates a successful response.
    #[must_use]
    pub fn ok(summary: impl Into<String>) -> Self {
        Self {
            success: true,
            summary: Some(summary.into()),
            error: None,
        }
    }

    /// Creates a failed response.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            summary: None,
            error: Some(error.into()),
        }
    }

    /// Converts into the summary text or the failure message.
    pub fn into_result(self) -> Result<String, String> {
        match (self.success, self.summary) {
            (true, Some(summary)) => Ok(summary),
            _ => Err(self
                .error
                .unwrap_or_else(|| "No summary received from the model".to_string())),
        }
    }
}
