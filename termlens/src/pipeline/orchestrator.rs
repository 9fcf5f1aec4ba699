//! Runs fetch and extraction for a selection and drives summarization.

use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::models::{
    partition, AggregateFailure, ErrorDisplay, ExtractionResult, PreparedBatch, SummaryPayload,
};
use super::notes::{
    processing_error_message, summarization_error_message, unreadable_content_message,
    EMPTY_SELECTION_MESSAGE,
};
use crate::budget::BudgetedContent;
use crate::detect::CandidateLink;
use crate::errors::{ErrorKind, ExtractError};
use crate::extract::{ContentExtractor, HtmlExtractor};
use crate::fetch::{user_facing_message, FetchClient, FetchContentRequest};
use crate::observability::{PipelineObserver, TracingObserver};
use crate::settings::{Settings, SettingsStore};
use crate::summarize::{handle_summarize_request, SummarizeRequest, Summarizer};

/// What would be sent to the summarizer, without calling it.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryPreview {
    /// The prepared batch.
    pub batch: PreparedBatch,
    /// Joined and budgeted content.
    pub budgeted: BudgetedContent,
    /// Model the budget was computed for.
    pub model: String,
}

/// Coordinates the per-link pipeline and the summarization call.
///
/// Links are processed concurrently on the caller's task; the fetch broker
/// is the only place where work leaves it.
pub struct Orchestrator {
    fetch_client: FetchClient,
    extractor: Arc<dyn ContentExtractor>,
    summarizer: Arc<dyn Summarizer>,
    settings: Arc<dyn SettingsStore>,
    observer: Arc<dyn PipelineObserver>,
}

impl Orchestrator {
    /// Creates an orchestrator with the default extractor and a tracing
    /// observer.
    #[must_use]
    pub fn new(
        fetch_client: FetchClient,
        summarizer: Arc<dyn Summarizer>,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        Self {
            fetch_client,
            extractor: Arc::new(HtmlExtractor::default()),
            summarizer,
            settings,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Sets the extractor.
    #[must_use]
    pub fn with_extractor(mut self, extractor: Arc<dyn ContentExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Sets the observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Fetches and extracts one link. Never fails: every outcome is a
    /// result tagged with its error kind.
    pub async fn extract_link(&self, link: &CandidateLink) -> ExtractionResult {
        let title = link.display_text.as_str();
        let url = link.url.as_str();
        let request = FetchContentRequest::new(url);
        let request_id = request.request_id.to_string();

        self.observer.on_fetch_start(url, &request_id);
        let started = Instant::now();
        let response = self.fetch_client.request(request).await;
        let fetch_ms = elapsed_ms(started);
        let status = response.status;

        if !response.success {
            let kind = response.error_kind.unwrap_or(ErrorKind::NetworkError);
            let technical = response
                .technical_error
                .unwrap_or_else(|| "Unknown fetch failure".to_string());
            let message = response
                .error
                .unwrap_or_else(|| user_facing_message(kind, &technical, url));
            self.observer.on_fetch_error(url, &request_id, kind, &technical);
            return ExtractionResult::failure(title, url, kind, message)
                .with_technical_detail(technical)
                .with_http_status(status);
        }

        let Some(html) = response.html.filter(|html| !html.trim().is_empty()) else {
            let kind = ErrorKind::EmptyResponse;
            let technical = "Fetch succeeded without a body".to_string();
            self.observer.on_fetch_error(url, &request_id, kind, &technical);
            return ExtractionResult::failure(title, url, kind, user_facing_message(kind, &technical, url))
                .with_technical_detail(technical)
                .with_http_status(status);
        };
        self.observer.on_fetch_complete(url, &request_id, fetch_ms, status);

        let started = Instant::now();
        match self.extractor.extract(&html, url) {
            Ok(content) => {
                self.observer
                    .on_extract_complete(url, &request_id, elapsed_ms(started), content.chars().count());
                ExtractionResult::success(title, url, content).with_http_status(status)
            }
            Err(e) => {
                let technical = e.to_string();
                let message = match &e {
                    ExtractError::InsufficientContent { .. } => unreadable_content_message(url),
                    ExtractError::MalformedDocument => processing_error_message(url, &technical),
                };
                self.observer.on_extract_error(url, &request_id, e.kind(), &technical);
                ExtractionResult::failure(title, url, e.kind(), message)
                    .with_technical_detail(technical)
                    .with_http_status(status)
            }
        }
    }

    /// Processes every link concurrently, returning results in input order.
    ///
    /// One link failing never cancels the others.
    pub async fn extract_all(&self, selected: &[CandidateLink]) -> Vec<ExtractionResult> {
        let results = join_all(selected.iter().map(|link| self.extract_link(link))).await;

        let succeeded = results.iter().filter(|r| r.is_success()).count();
        info!(
            selected = selected.len(),
            succeeded,
            failed = results.len() - succeeded,
            "Extraction batch completed"
        );
        results
    }

    /// Splits results into a batch to summarize, or an aggregate failure
    /// when nothing succeeded.
    pub fn prepare(results: Vec<ExtractionResult>) -> Result<PreparedBatch, AggregateFailure> {
        let (successes, failures) = partition(results);
        if successes.is_empty() {
            warn!(failed = failures.len(), "Every selected document failed");
            return Err(AggregateFailure::from_failures(&failures));
        }
        if !failures.is_empty() {
            warn!(
                succeeded = successes.len(),
                failed = failures.len(),
                "Proceeding with a partial batch"
            );
        }
        Ok(PreparedBatch::new(SummaryPayload::from_successes(&successes), &failures))
    }

    /// Extracts and prepares a selection.
    pub async fn prepare_selected(
        &self,
        selected: &[CandidateLink],
    ) -> Result<PreparedBatch, ErrorDisplay> {
        if selected.is_empty() {
            return Err(ErrorDisplay::new(EMPTY_SELECTION_MESSAGE));
        }
        let results = self.extract_all(selected).await;
        Self::prepare(results).map_err(|failure| failure.to_display())
    }

    /// Prepares a selection and budgets it without calling the summarizer.
    pub async fn preview(&self, selected: &[CandidateLink]) -> Result<SummaryPreview, ErrorDisplay> {
        let batch = self.prepare_selected(selected).await?;
        let settings = self.load_settings()?;
        let budgeted = batch.payload.budgeted(&settings.model);
        Ok(SummaryPreview {
            batch,
            budgeted,
            model: settings.model,
        })
    }

    /// Runs the whole flow for a selection and returns the rendered
    /// summary, with a note listing skipped documents when some failed.
    pub async fn summarize(&self, selected: &[CandidateLink]) -> Result<String, ErrorDisplay> {
        let batch = self.prepare_selected(selected).await?;
        let settings = self.load_settings()?;

        let budgeted = batch.payload.budgeted(&settings.model);
        info!(
            model = %settings.model,
            documents = batch.payload.items().len(),
            original_chars = budgeted.original_chars,
            truncated = budgeted.truncated,
            "Sending batch for summarization"
        );

        let request = SummarizeRequest::new(
            batch.payload.items().to_vec(),
            budgeted.content,
            settings.model.clone(),
        );
        let response = handle_summarize_request(self.summarizer.as_ref(), request, &settings).await;

        match response.into_result() {
            Ok(summary) => Ok(batch.render(&summary)),
            Err(detail) => Err(ErrorDisplay::new(summarization_error_message(&detail))),
        }
    }

    fn load_settings(&self) -> Result<Settings, ErrorDisplay> {
        self.settings.load().map_err(|e| {
            warn!(error = %e, "Settings could not be loaded");
            ErrorDisplay::new(summarization_error_message(&e.to_string()))
        })
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
