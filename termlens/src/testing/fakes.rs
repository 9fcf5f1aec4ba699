//! Scripted collaborators that record how they were called.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::errors::{ErrorKind, SummarizeError};
use crate::fetch::{ContentFetcher, FetchResult};
use crate::observability::PipelineObserver;
use crate::settings::Settings;
use crate::summarize::{SummarizeRequest, Summarizer};

/// Fetcher answering from a URL map. Unknown URLs fail as connection
/// errors.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    responses: Mutex<HashMap<String, FetchResult>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    /// Creates a fetcher with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `html` with status 200 for `url`.
    #[must_use]
    pub fn with_page(self, url: &str, html: impl Into<String>) -> Self {
        self.with_result(FetchResult::success(url, 200, html))
    }

    /// Serves a prepared result for its URL.
    #[must_use]
    pub fn with_result(self, result: FetchResult) -> Self {
        self.responses.lock().insert(result.url.clone(), result);
        self
    }

    /// URLs fetched so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ContentFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        self.calls.lock().push(url.to_string());
        self.responses.lock().get(url).cloned().unwrap_or_else(|| {
            FetchResult::network_error(url, "Connection failed: no scripted response")
        })
    }
}

/// Summarizer returning a fixed reply and recording requests.
#[derive(Debug)]
pub struct ScriptedSummarizer {
    reply: Result<String, String>,
    requests: Mutex<Vec<SummarizeRequest>>,
}

impl ScriptedSummarizer {
    /// Replies with `summary`.
    #[must_use]
    pub fn replying(summary: impl Into<String>) -> Self {
        Self {
            reply: Ok(summary.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fails with an API error carrying `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<SummarizeRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Summarizer for ScriptedSummarizer {
    async fn summarize(
        &self,
        request: &SummarizeRequest,
        settings: &Settings,
    ) -> Result<String, SummarizeError> {
        settings.api_key()?;
        self.requests.lock().push(request.clone());
        self.reply.clone().map_err(|message| SummarizeError::Api {
            status: 500,
            message,
        })
    }
}

/// Observer that records events as `"{event}:{url}"` strings.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    fn record(&self, event: &str, url: &str) {
        self.events.lock().push(format!("{event}:{url}"));
    }
}

impl PipelineObserver for RecordingObserver {
    fn on_fetch_start(&self, url: &str, _request_id: &str) {
        self.record("fetch_start", url);
    }

    fn on_fetch_complete(&self, url: &str, _request_id: &str, _duration_ms: f64, _status: Option<u16>) {
        self.record("fetch_complete", url);
    }

    fn on_fetch_error(&self, url: &str, _request_id: &str, kind: ErrorKind, _error: &str) {
        self.record(&format!("fetch_error[{kind}]"), url);
    }

    fn on_extract_complete(&self, url: &str, _request_id: &str, _duration_ms: f64, _chars: usize) {
        self.record("extract_complete", url);
    }

    fn on_extract_error(&self, url: &str, _request_id: &str, kind: ErrorKind, _error: &str) {
        self.record(&format!("extract_error[{kind}]"), url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_fetcher() {
        let fetcher = ScriptedFetcher::new().with_page("https://a.test/terms", "<html></html>");

        assert!(fetcher.fetch("https://a.test/terms").await.is_success());
        let missing = fetcher.fetch("https://a.test/other").await;
        assert_eq!(missing.error_kind, Some(ErrorKind::NetworkError));
        assert_eq!(fetcher.calls().len(), 2);
    }
}
