//! Fetch result type and the fetcher protocol.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ErrorKind;

/// Outcome of one fetch attempt.
///
/// Always a value, never an error: failures are tagged with an
/// [`ErrorKind`] and a low-level detail string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResult {
    /// Whether the fetch produced a usable body.
    pub ok: bool,
    /// The requested URL.
    pub url: String,
    /// Response body, present on success.
    pub raw_html: Option<String>,
    /// HTTP status code when a response was received.
    pub http_status: Option<u16>,
    /// Failure classification.
    pub error_kind: Option<ErrorKind>,
    /// Low-level failure text.
    pub error_detail: Option<String>,
    /// Time taken to fetch in milliseconds.
    #[serde(default)]
    pub duration_ms: f64,
}

impl FetchResult {
    /// Creates a successful result.
    #[must_use]
    pub fn success(url: impl Into<String>, status: u16, html: impl Into<String>) -> Self {
        Self {
            ok: true,
            url: url.into(),
            raw_html: Some(html.into()),
            http_status: Some(status),
            error_kind: None,
            error_detail: None,
            duration_ms: 0.0,
        }
    }

    /// Creates a result for a non-2xx status.
    #[must_use]
    pub fn http_error(url: impl Into<String>, status: u16, reason: &str) -> Self {
        Self::failure(
            url,
            Some(status),
            ErrorKind::HttpError,
            format!("HTTP {status}: {reason}"),
        )
    }

    /// Creates a result for a 2xx response with no usable body.
    #[must_use]
    pub fn empty_response(url: impl Into<String>, status: u16) -> Self {
        Self::failure(
            url,
            Some(status),
            ErrorKind::EmptyResponse,
            format!("HTTP {status} with an empty body"),
        )
    }

    /// Creates a result for a transport failure.
    #[must_use]
    pub fn network_error(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::failure(url, None, ErrorKind::NetworkError, detail.into())
    }

    fn failure(
        url: impl Into<String>,
        status: Option<u16>,
        kind: ErrorKind,
        detail: String,
    ) -> Self {
        Self {
            ok: false,
            url: url.into(),
            raw_html: None,
            http_status: status,
            error_kind: Some(kind),
            error_detail: Some(detail),
            duration_ms: 0.0,
        }
    }

    /// Sets the fetch duration.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Whether the fetch was successful.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.ok
    }
}

/// Protocol for retrieving raw markup.
///
/// Implementations run in the privileged context (see
/// [`FetchBroker`](super::FetchBroker)) and must never panic or return
/// early with an error: every outcome is a [`FetchResult`].
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetches a URL.
    async fn fetch(&self, url: &str) -> FetchResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_carries_status() {
        let result = FetchResult::http_error("https://example.com/terms", 404, "Not Found");

        assert!(!result.is_success());
        assert_eq!(result.http_status, Some(404));
        assert_eq!(result.error_kind, Some(ErrorKind::HttpError));
        assert_eq!(result.error_detail.as_deref(), Some("HTTP 404: Not Found"));
        assert!(result.raw_html.is_none());
    }

    #[test]
    fn test_success_and_empty() {
        let ok = FetchResult::success("https://example.com", 200, "<html></html>").with_duration_ms(12.5);
        assert!(ok.is_success());
        assert_eq!(ok.duration_ms, 12.5);
        assert!(ok.error_kind.is_none());

        let empty = FetchResult::empty_response("https://example.com", 200);
        assert_eq!(empty.error_kind, Some(ErrorKind::EmptyResponse));
        assert_eq!(empty.http_status, Some(200));
    }

    #[test]
    fn test_network_error_has_no_status() {
        let result = FetchResult::network_error("https://example.com", "dns error");
        assert_eq!(result.error_kind, Some(ErrorKind::NetworkError));
        assert!(result.http_status.is_none());
    }
}
