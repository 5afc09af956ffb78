//! ProfileScout core orchestration.
//!
//! Composes the pipeline stages (ingest, enrich, score, report) with plain
//! sequential control flow. See [`pipeline::run_screening`].

pub mod pipeline;

pub use pipeline::{ProgressReporter, ScreeningResult, SilentProgress, run_screening};
