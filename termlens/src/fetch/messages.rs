//! Typed messages exchanged with the privileged fetch broker.
//!
//! The wire shape mirrors the `fetchContent` action: a request names the
//! URL, the response carries either the markup or a user-facing error plus
//! the low-level text behind it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::protocols::FetchResult;
use crate::errors::ErrorKind;

/// Action name for fetch requests.
pub const FETCH_CONTENT_ACTION: &str = "fetchContent";

/// Request sent from the scanning side to the fetch broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchContentRequest {
    /// Always [`FETCH_CONTENT_ACTION`] for well-formed requests.
    pub action: String,
    /// Correlates log lines across the two sides.
    pub request_id: Uuid,
    /// Absolute URL to fetch.
    pub url: String,
}

impl FetchContentRequest {
    /// Creates a fetch request for a URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            action: FETCH_CONTENT_ACTION.to_string(),
            request_id: Uuid::new_v4(),
            url: url.into(),
        }
    }
}

/// Response returned by the fetch broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchContentResponse {
    /// Whether markup was retrieved.
    pub success: bool,
    /// Retrieved markup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    /// User-facing failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Low-level failure text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_error: Option<String>,
    /// The requested URL.
    pub url: String,
    /// Failure classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    /// HTTP status when a response was received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl FetchContentResponse {
    /// Builds a response from a fetch result, attaching a user-facing
    /// message to failures.
    #[must_use]
    pub fn from_fetch_result(result: FetchResult) -> Self {
        if result.ok {
            return Self {
                success: true,
                html: result.raw_html,
                error: None,
                technical_error: None,
                url: result.url,
                error_kind: None,
                status: result.http_status,
            };
        }

        let kind = result.error_kind.unwrap_or(ErrorKind::NetworkError);
        let technical = result
            .error_detail
            .unwrap_or_else(|| "Unknown fetch failure".to_string());
        Self {
            success: false,
            html: None,
            error: Some(user_facing_message(kind, &technical, &result.url)),
            technical_error: Some(technical),
            url: result.url,
            error_kind: Some(kind),
            status: result.http_status,
        }
    }

    /// Response used when the broker cannot be reached.
    #[must_use]
    pub fn channel_failure(url: impl Into<String>, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self {
            success: false,
            html: None,
            error: Some(format!("Failed to communicate with the fetch service: {detail}")),
            technical_error: Some(detail),
            url: url.into(),
            error_kind: Some(ErrorKind::NetworkError),
            status: None,
        }
    }
}

/// Picks the message shown to the user for a fetch failure.
///
/// The low-level text decides the template: 403/forbidden reads as the host
/// blocking automated access, 404/not found as a missing page, and common
/// transport hints get their own wording. Anything else falls back to a
/// generic message that repeats the detail.
#[must_use]
pub fn user_facing_message(kind: ErrorKind, technical: &str, url: &str) -> String {
    let host = host_of(url);
    let lower = technical.to_lowercase();

    if kind == ErrorKind::EmptyResponse {
        return format!("{host} returned an empty page.");
    }
    if lower.contains("403") || lower.contains("forbidden") {
        return format!(
            "Access to {host} was blocked (HTTP 403). The site may be blocking automated access."
        );
    }
    if lower.contains("404") || lower.contains("not found") {
        return format!("The page at {host} was not found (HTTP 404).");
    }
    if lower.contains("dns") || lower.contains("lookup") || lower.contains("resolve") {
        return format!("Could not resolve {host}. Check the address or your connection.");
    }
    if lower.contains("certificate") || lower.contains("tls") || lower.contains("ssl") {
        return format!("A secure connection to {host} could not be established.");
    }
    if lower.contains("timed out") || lower.contains("timeout") {
        return format!("The request to {host} timed out.");
    }
    if lower.contains("connect") {
        return format!("Could not connect to {host}.");
    }
    format!("Failed to fetch content from {host}: {technical}")
}

/// Host part of a URL for user-facing text, falling back to the full URL.
#[must_use]
pub fn host_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(String::from))
        .unwrap_or_else(|| url.to_string())
}
