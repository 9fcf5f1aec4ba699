//! # Termlens
//!
//! Finds the legal documents a web page links to (terms of use, privacy
//! policies), pulls their readable text and prepares a length-bounded
//! payload for a language-model summary.
//!
//! The pipeline, leaf first:
//!
//! - **Detection**: whole-word keyword matching over a page's anchors
//! - **Fetching**: HTTP retrieval behind a message-passing broker
//! - **Extraction**: selector fallbacks reduce markup to plain text
//! - **Budgeting**: per-model character limits with a truncation marker
//! - **Orchestration**: concurrent fetch and extract, result partitioning,
//!   partial-failure notes and the summarization call
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use termlens::prelude::*;
//!
//! let links = LinkClassifier::default().scan_document(&page_html, page_url)?;
//!
//! let fetcher = Arc::new(HttpFetcher::new(FetchConfig::default())?);
//! let (client, _broker) = FetchBroker::spawn(fetcher, DEFAULT_BROKER_CAPACITY);
//! let summarizer = Arc::new(ChatCompletionSummarizer::new(SummarizerConfig::default())?);
//! let settings = Arc::new(StaticSettingsStore::new(Settings::new("sk-...", "gpt-4.1-nano")));
//! let orchestrator = Orchestrator::new(client, summarizer, settings);
//!
//! let mut session = SummarizeSession::new(links);
//! let summary = session.summarize(&orchestrator).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod budget;
pub mod config;
pub mod detect;
pub mod errors;
pub mod extract;
pub mod fetch;
pub mod observability;
pub mod pipeline;
pub mod session;
pub mod settings;
pub mod summarize;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::budget::{apply_budget, max_content_chars, BudgetedContent, TRUNCATION_MARKER};
    pub use crate::config::TermlensConfig;
    pub use crate::detect::{CandidateLink, DetectionConfig, LinkClassifier};
    pub use crate::errors::{
        ErrorKind, ExtractError, SettingsError, SummarizeError, TermlensError,
    };
    pub use crate::extract::{ContentExtractor, ExtractionConfig, HtmlExtractor};
    pub use crate::fetch::{
        ContentFetcher, FetchBroker, FetchClient, FetchConfig, FetchResult, HttpFetcher,
        DEFAULT_BROKER_CAPACITY,
    };
    pub use crate::observability::{NoOpObserver, PipelineObserver, TracingObserver};
    pub use crate::pipeline::{ErrorDisplay, ExtractionResult, Orchestrator, PreparedBatch};
    pub use crate::session::SummarizeSession;
    pub use crate::settings::{JsonSettingsStore, Settings, SettingsStore, StaticSettingsStore};
    pub use crate::summarize::{ChatCompletionSummarizer, Summarizer, SummarizerConfig};
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn prelude_exposes_pipeline() {
        assert_eq!(max_content_chars("gpt-4o"), 128_000);
        assert_eq!(ErrorKind::AggregateFailure.to_string(), "aggregate_failure");
    }
}
