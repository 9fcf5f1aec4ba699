//! The extraction pipeline: per-link fetch and extraction, result
//! partitioning and payload preparation.

mod models;
mod notes;
mod orchestrator;


pub use models::{
    partition, AggregateFailure, ErrorDisplay, ExtractionResult, PreparedBatch, SkippedDocument,
    SummaryPayload,
};
pub use notes::{
    aggregate_failure_detail, partial_note, AGGREGATE_FAILURE_HEADLINE, EMPTY_SELECTION_MESSAGE,
};
pub use orchestrator::{Orchestrator, SummaryPreview};
