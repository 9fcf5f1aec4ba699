//! Observability hooks for the extraction pipeline.

mod observer;

pub use observer::{NoOpObserver, PipelineObserver, TracingObserver};
