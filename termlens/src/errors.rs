//! Error types for the termlens pipeline.
//!
//! Leaf failures (fetching, extraction) never cross into the orchestrator as
//! `Err` values. They are converted into tagged results carrying an
//! [`ErrorKind`]. The error enums below cover the fallible surfaces that do
//! propagate: configuration, settings and the summarization collaborator.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failure taxonomy shared by every stage of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// DNS, TLS, connection or body-read failure.
    NetworkError,
    /// Non-2xx HTTP status.
    HttpError,
    /// 2xx status with an empty or whitespace-only body.
    EmptyResponse,
    /// The markup has no body element.
    MalformedDocument,
    /// No content container produced enough text.
    InsufficientContent,
    /// Every selected document failed.
    AggregateFailure,
}

impl ErrorKind {
    /// Returns the wire name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "network_error",
            Self::HttpError => "http_error",
            Self::EmptyResponse => "empty_response",
            Self::MalformedDocument => "malformed_document",
            Self::InsufficientContent => "insufficient_content",
            Self::AggregateFailure => "aggregate_failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced while reducing markup to plain text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The parsed document has no body element.
    #[error("Invalid HTML document - no body element found")]
    MalformedDocument,

    /// No selector yielded enough text after cleanup.
    #[error(
        "Could not extract meaningful content from the page ({chars} characters found). \
         The page may be empty, require JavaScript, or be protected against scraping."
    )]
    InsufficientContent {
        /// Characters found in the best candidate after cleanup.
        chars: usize,
    },
}

impl ExtractError {
    /// Maps the error onto the shared taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedDocument => ErrorKind::MalformedDocument,
            Self::InsufficientContent { .. } => ErrorKind::InsufficientContent,
        }
    }
}

/// Errors raised while loading or validating persisted settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// No API credential is stored.
    #[error("API key not configured. Please set it in the settings.")]
    MissingApiKey,

    /// The stored credential does not look like an API key.
    #[error("Invalid API key format")]
    InvalidApiKey,

    /// Reading or writing the settings file failed.
    #[error("Failed to access settings at {}: {source}", path.display())]
    Io {
        /// The settings file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid JSON.
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised by the summarization collaborator.
#[derive(Debug, Error)]
pub enum SummarizeError {
    /// Settings were missing or invalid.
    #[error("{0}")]
    Settings(#[from] SettingsError),

    /// The completion endpoint answered with an error status.
    #[error("API error: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message reported by the endpoint.
        message: String,
    },

    /// The endpoint answered without any summary text.
    #[error("No summary received from the model")]
    EmptySummary,

    /// The request could not be sent or decoded.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request named an action the collaborator does not handle.
    #[error("Unknown action: {0}")]
    UnknownAction(String),
}

/// The main error type for termlens operations.
#[derive(Debug, Error)]
pub enum TermlensError {
    /// Settings error.
    #[error("{0}")]
    Settings(#[from] SettingsError),

    /// Summarization error.
    #[error("{0}")]
    Summarize(#[from] SummarizeError),

    /// Extraction error.
    #[error("{0}")]
    Extract(#[from] ExtractError),

    /// A URL could not be parsed or resolved.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A configuration value was rejected.
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client construction failed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TermlensError {
    /// Creates an invalid URL error.
    #[must_use]
    pub fn invalid_url(url: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let kind = match self {
            Self::Settings(_) => "Settings",
            Self::Summarize(_) => "Summarize",
            Self::Extract(_) => "Extract",
            Self::InvalidUrl { .. } => "InvalidUrl",
            Self::Config(_) => "Config",
            Self::Http(_) => "Http",
            Self::Serialization(_) => "Serialization",
            Self::Io(_) => "Io",
        };

        let mut map = HashMap::new();
        map.insert("type".to_string(), serde_json::json!(kind));
        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        if let Self::Extract(err) = self {
            map.insert("kind".to_string(), serde_json::json!(err.kind()));
        }
        map
    }
}
