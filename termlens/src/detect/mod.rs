//! Legal-document link detection.
//!
//! This module provides:
//! - Data models for scanned anchors and candidate links
//! - Keyword configuration for the classifier
//! - Whole-word, case-insensitive link classification

mod classifier;
mod config;
mod models;

pub use classifier::{collect_anchors, LinkClassifier};
pub use config::DetectionConfig;
pub use models::{Anchor, CandidateLink};
