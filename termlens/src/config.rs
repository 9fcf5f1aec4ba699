//! Top-level configuration combining every component's settings.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::detect::DetectionConfig;
use crate::errors::TermlensError;
use crate::extract::ExtractionConfig;
use crate::fetch::{FetchConfig, DEFAULT_BROKER_CAPACITY};
use crate::summarize::SummarizerConfig;

/// Configuration for a termlens run. Every section is optional in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermlensConfig {
    /// Link detection.
    #[serde(default)]
    pub detection: DetectionConfig,
    /// HTTP fetching.
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Text extraction.
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Chat-completion endpoint.
    #[serde(default)]
    pub summarizer: SummarizerConfig,
    /// Fetch broker request queue size.
    #[serde(default = "default_broker_capacity")]
    pub broker_capacity: usize,
}

fn default_broker_capacity() -> usize {
    DEFAULT_BROKER_CAPACITY
}

impl Default for TermlensConfig {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            fetch: FetchConfig::default(),
            extraction: ExtractionConfig::default(),
            summarizer: SummarizerConfig::default(),
            broker_capacity: default_broker_capacity(),
        }
    }
}

impl TermlensConfig {
    /// Parses configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, TermlensError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TermlensError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    /// Rejects values no component can work with.
    pub fn validate(&self) -> Result<(), TermlensError> {
        if self.extraction.content_selectors.is_empty() {
            return Err(TermlensError::Config(
                "extraction.content_selectors must not be empty".to_string(),
            ));
        }
        if self.broker_capacity == 0 {
            return Err(TermlensError::Config("broker_capacity must be positive".to_string()));
        }
        if self.detection.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(TermlensError::Config(
                "detection.keywords must contain a keyword".to_string(),
            ));
        }
        Ok(())
    }
}
