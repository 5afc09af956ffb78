//! Core domain types for ProfileScout screening runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lowest legitimate score the oracle may assign.
pub const MIN_SCORE: u8 = 1;

/// Highest legitimate score the oracle may assign.
pub const MAX_SCORE: u8 = 10;

/// Sentinel score emitted at the serialization boundary for profiles whose
/// scoring call failed. Never produced by a successful oracle call.
pub const FAILED_SCORE: u8 = 0;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying a single screening run (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Rating
// ---------------------------------------------------------------------------

/// A scored candidate profile: one row of the final report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    /// The profile URL the score applies to.
    pub profile_url: String,
    /// Score in `[MIN_SCORE, MAX_SCORE]`, or `FAILED_SCORE` for a
    /// sentinel row written at the serialization boundary.
    pub score: u8,
    /// Short assessment from the oracle, or the failure description
    /// for a sentinel row.
    pub reasoning: String,
}

// ---------------------------------------------------------------------------
// ScoreOutcome
// ---------------------------------------------------------------------------

/// Outcome of one scoring call.
///
/// Keeps failed items distinct from genuine low scores inside the pipeline;
/// only the report writer collapses `Failed` into a sentinel row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreOutcome {
    /// The oracle returned a well-formed rating.
    Scored(Rating),
    /// The scoring call failed for this profile only.
    Failed {
        /// The profile URL the failure applies to.
        profile_url: String,
        /// Human-readable failure description.
        reason: String,
    },
}

impl ScoreOutcome {
    /// The profile URL this outcome belongs to.
    pub fn profile_url(&self) -> &str {
        match self {
            Self::Scored(rating) => &rating.profile_url,
            Self::Failed { profile_url, .. } => profile_url,
        }
    }

    /// Effective score used for ranking: sentinel 0 for failures.
    pub fn score(&self) -> u8 {
        match self {
            Self::Scored(rating) => rating.score,
            Self::Failed { .. } => FAILED_SCORE,
        }
    }
}

// ---------------------------------------------------------------------------
// ReportMeta
// ---------------------------------------------------------------------------

/// Metadata attached to a finished screening run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// Identifier of the run that produced the report.
    pub run_id: RunId,
    /// Scoring model used.
    pub model: String,
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
    /// Number of profiles attempted (scored + failed).
    pub candidate_count: usize,
}
