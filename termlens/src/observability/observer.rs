//! Observer hooks for fetch and extraction events.

use tracing::{debug, info, warn};

use crate::errors::ErrorKind;

/// Observability callbacks for one summarize batch.
///
/// Every method has an empty default so implementations only override what
/// they need. Callbacks run inline on the orchestrator's task and must not
/// block.
pub trait PipelineObserver: Send + Sync {
    /// Called before a link is fetched.
    fn on_fetch_start(&self, _url: &str, _request_id: &str) {}

    /// Called when a fetch returned markup.
    fn on_fetch_complete(&self, _url: &str, _request_id: &str, _duration_ms: f64, _status: Option<u16>) {}

    /// Called when a fetch failed.
    fn on_fetch_error(&self, _url: &str, _request_id: &str, _kind: ErrorKind, _error: &str) {}

    /// Called when text was extracted.
    fn on_extract_complete(&self, _url: &str, _request_id: &str, _duration_ms: f64, _chars: usize) {}

    /// Called when extraction failed.
    fn on_extract_error(&self, _url: &str, _request_id: &str, _kind: ErrorKind, _error: &str) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl PipelineObserver for NoOpObserver {}

/// Observer that forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_fetch_start(&self, url: &str, request_id: &str) {
        debug!(url = %url, request_id = %request_id, "Fetch started");
    }

    fn on_fetch_complete(&self, url: &str, request_id: &str, duration_ms: f64, status: Option<u16>) {
        info!(url = %url, request_id = %request_id, duration_ms, status = ?status, "Fetch completed");
    }

    fn on_fetch_error(&self, url: &str, request_id: &str, kind: ErrorKind, error: &str) {
        warn!(url = %url, request_id = %request_id, kind = %kind, error = %error, "Fetch failed");
    }

    fn on_extract_complete(&self, url: &str, request_id: &str, duration_ms: f64, chars: usize) {
        info!(url = %url, request_id = %request_id, duration_ms, chars, "Extraction completed");
    }

    fn on_extract_error(&self, url: &str, request_id: &str, kind: ErrorKind, error: &str) {
        warn!(url = %url, request_id = %request_id, kind = %kind, error = %error, "Extraction failed");
    }
}
