//! Test support: page fixtures and scripted collaborators.
//!
//! Public so integration tests and downstream crates can drive the
//! pipeline without network access.

mod fakes;
mod fixtures;

pub use fakes::{RecordingObserver, ScriptedFetcher, ScriptedSummarizer};
pub use fixtures::{
    candidate, legal_page, long_text, page_with_links, scripted_orchestrator, test_settings,
};
