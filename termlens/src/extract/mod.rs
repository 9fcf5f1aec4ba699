//! Reduction of raw markup to readable plain text.

mod config;
mod extractor;

pub use config::ExtractionConfig;
pub use extractor::{normalize_whitespace, ContentExtractor, HtmlExtractor};
