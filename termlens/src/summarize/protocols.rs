//! The summarizer protocol and its message handler.

use async_trait::async_trait;
use tracing::{info, warn};

use super::messages::{SummarizeRequest, SummarizeResponse, SUMMARIZE_TERMS_ACTION};
use crate::errors::SummarizeError;
use crate::settings::Settings;

/// Produces a summary of extracted legal documents.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarizes the request's content with the given settings.
    async fn summarize(
        &self,
        request: &SummarizeRequest,
        settings: &Settings,
    ) -> Result<String, SummarizeError>;
}

/// Serves one summarize message, turning every failure into a response.
pub async fn handle_summarize_request(
    summarizer: &dyn Summarizer,
    request: SummarizeRequest,
    settings: &Settings,
) -> SummarizeResponse {
    if request.action != SUMMARIZE_TERMS_ACTION {
        warn!(action = %request.action, "Rejecting unknown summarizer action");
        return SummarizeResponse::failure(
            SummarizeError::UnknownAction(request.action).to_string(),
        );
    }

    match summarizer.summarize(&request, settings).await {
        Ok(summary) => {
            info!(
                documents = request.terms_contents.len(),
                summary_chars = summary.chars().count(),
                "Summary generated"
            );
            SummarizeResponse::ok(summary)
        }
        Err(e) => {
            warn!(error = %e, "Summarization failed");
            SummarizeResponse::failure(e.to_string())
        }
    }
}
