//! End-to-end screening pipeline: CSV text → ingest → enrich → score → rank.
//!
//! Every external call is a sequential suspension point: enrichment chunks
//! and scoring calls are issued one at a time, in order, to respect the
//! unknown rate limits of both upstream services. Nothing here is shared
//! across invocations; concurrent triggers must each get their own run.

use std::time::Instant;

use chrono::Utc;
use tracing::{info, instrument};

use profilescout_enrich::{ChunkProgress, EnrichmentClient};
use profilescout_report::RankedReport;
use profilescout_scoring::{Oracle, RatingOptions, ScoringProgress};
use profilescout_shared::{PipelineConfig, ReportMeta, Result, RunId};

/// Result of a completed screening run.
#[derive(Debug)]
pub struct ScreeningResult {
    /// Identifier of this run.
    pub run_id: RunId,
    /// The ranked report.
    pub report: RankedReport,
    /// Top-N summary text.
    pub summary: String,
    /// Number of profiles attempted.
    pub candidate_count: usize,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before each enrichment chunk request.
    fn chunk_started(&self, index: usize, total: usize, size: usize);
    /// Called at scoring progress checkpoints.
    fn scoring_progress(&self, completed: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &ScreeningResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn chunk_started(&self, _index: usize, _total: usize, _size: usize) {}
    fn scoring_progress(&self, _completed: usize, _total: usize) {}
    fn done(&self, _result: &ScreeningResult) {}
}

/// Run the full screening pipeline over raw CSV text.
///
/// 1. Ingest: extract ordered unique profile URLs
/// 2. Enrich: sequential chunked calls, fatal on any chunk failure
/// 3. Score: sequential per-profile calls, failures isolated per item
/// 4. Rank: stable sort + CSV report + summary
///
/// How the CSV arrives and where the report goes is the caller's concern.
#[instrument(skip_all, fields(run_id = tracing::field::Empty))]
pub async fn run_screening<O: Oracle>(
    raw_table: &str,
    enricher: &EnrichmentClient,
    oracle: &O,
    config: &PipelineConfig,
    progress: &dyn ProgressReporter,
) -> Result<ScreeningResult> {
    config.validate()?;

    let start = Instant::now();
    let run_id = RunId::new();
    tracing::Span::current().record("run_id", tracing::field::display(&run_id));

    info!(model = %config.model, "starting screening run");

    // --- Phase 1: Ingest ---
    progress.phase("Reading candidate table");
    let profile_urls = profilescout_ingest::extract_profile_urls(raw_table)?;
    info!(candidates = profile_urls.len(), "candidates extracted");

    // --- Phase 2: Enrich ---
    progress.phase("Enriching profiles");
    let chunk_progress = PipelineChunkProgress { inner: progress };
    let records = enricher.enrich_all(&profile_urls, &chunk_progress).await?;

    // Guaranteed per chunk by the client; pairing below relies on it.
    debug_assert_eq!(records.len(), profile_urls.len());

    // --- Phase 3: Score ---
    progress.phase("Scoring profiles");
    let pairs: Vec<(String, serde_json::Value)> =
        profile_urls.into_iter().zip(records).collect();
    let candidate_count = pairs.len();

    let options = RatingOptions {
        max_profile_chars: config.max_profile_chars,
        max_reasoning_chars: config.max_reasoning_chars,
        progress_batch: config.progress_batch,
    };
    let scoring_progress = PipelineScoringProgress { inner: progress };
    let outcomes =
        profilescout_scoring::rate_all(oracle, &pairs, &options, &scoring_progress).await;

    // --- Phase 4: Rank ---
    progress.phase("Assembling ranked report");
    let meta = ReportMeta {
        run_id: run_id.clone(),
        model: config.model.clone(),
        generated_at: Utc::now(),
        candidate_count,
    };
    let report = RankedReport::from_outcomes(outcomes, meta);
    let summary = report.summary(config.top_n);

    let result = ScreeningResult {
        run_id,
        report,
        summary,
        candidate_count,
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        run_id = %result.run_id,
        candidates = result.candidate_count,
        elapsed_ms = result.elapsed.as_millis(),
        "screening run complete"
    );

    Ok(result)
}

// ---------------------------------------------------------------------------
// Progress adapters
// ---------------------------------------------------------------------------

/// Adapts a `ProgressReporter` to the enrichment `ChunkProgress` interface.
struct PipelineChunkProgress<'a> {
    inner: &'a dyn ProgressReporter,
}

impl ChunkProgress for PipelineChunkProgress<'_> {
    fn chunk_started(&self, index: usize, total: usize, size: usize) {
        self.inner.chunk_started(index, total, size);
    }
}

/// Adapts a `ProgressReporter` to the `ScoringProgress` interface.
struct PipelineScoringProgress<'a> {
    inner: &'a dyn ProgressReporter,
}

impl ScoringProgress for PipelineScoringProgress<'_> {
    fn checkpoint(&self, completed: usize, total: usize) {
        self.inner.scoring_progress(completed, total);
    }
}
