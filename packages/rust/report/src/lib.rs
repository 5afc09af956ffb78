//! Ranked report assembly.
//!
//! Takes scoring outcomes in pipeline order, produces the stably ranked
//! CSV artifact and a short top-N summary. This is the only place where
//! failed outcomes collapse into sentinel rows (score 0, failure text as
//! reasoning).

use std::path::Path;

use tracing::{info, instrument};

use profilescout_shared::types::FAILED_SCORE;
use profilescout_shared::{Rating, ReportMeta, Result, ScoreOutcome, ScoutError};

// ---------------------------------------------------------------------------
// RankedReport
// ---------------------------------------------------------------------------

/// The final, score-sorted report for one screening run.
#[derive(Debug, Clone)]
pub struct RankedReport {
    /// Ratings sorted descending by score; ties keep arrival order.
    pub ratings: Vec<Rating>,
    /// Run metadata.
    pub meta: ReportMeta,
}

impl RankedReport {
    /// Build a report from outcomes in pipeline order.
    ///
    /// Sorting is stable: profiles with equal scores keep the relative
    /// order they were ingested and enriched in.
    #[instrument(skip_all, fields(outcomes = outcomes.len()))]
    pub fn from_outcomes(mut outcomes: Vec<ScoreOutcome>, meta: ReportMeta) -> Self {
        outcomes.sort_by(|a, b| b.score().cmp(&a.score()));

        let ratings = outcomes.into_iter().map(into_row).collect();
        Self { ratings, meta }
    }

    /// Serialize the report to CSV text (`profile_url,score,reasoning`).
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        for rating in &self.ratings {
            writer
                .serialize(rating)
                .map_err(|e| ScoutError::Output(format!("CSV serialization failed: {e}")))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ScoutError::Output(format!("CSV flush failed: {e}")))?;
        String::from_utf8(bytes).map_err(|e| ScoutError::Output(format!("CSV is not UTF-8: {e}")))
    }

    /// Write the CSV artifact to disk.
    ///
    /// A partially written file is removed before the error propagates.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let content = self.to_csv()?;

        if let Err(e) = std::fs::write(path, &content) {
            let _ = std::fs::remove_file(path);
            return Err(ScoutError::Output(format!(
                "failed to write report to {}: {e}",
                path.display()
            )));
        }

        info!(path = %path.display(), rows = self.ratings.len(), "report written");
        Ok(())
    }

    /// Short human-readable summary naming the top `top_n` profiles.
    pub fn summary(&self, top_n: usize) -> String {
        let shown = self.ratings.len().min(top_n);
        let failed = self
            .ratings
            .iter()
            .filter(|r| r.score == FAILED_SCORE)
            .count();

        let mut lines = vec![format!(
            "Screened {} profiles with {} (top {shown} shown):",
            self.ratings.len(),
            self.meta.model
        )];

        for (i, rating) in self.ratings.iter().take(shown).enumerate() {
            lines.push(format!(
                "  {}. {} - {}/10",
                i + 1,
                rating.profile_url,
                rating.score
            ));
        }

        if failed > 0 {
            lines.push(format!("  ({failed} profiles could not be scored)"));
        }

        lines.join("\n")
    }
}

/// Collapse an outcome to its report row; failures become sentinel rows.
fn into_row(outcome: ScoreOutcome) -> Rating {
    match outcome {
        ScoreOutcome::Scored(rating) => rating,
        ScoreOutcome::Failed {
            profile_url,
            reason,
        } => Rating {
            profile_url,
            score: FAILED_SCORE,
            reasoning: reason,
        },
    }
}

/// Parse a report CSV back into ratings (round-trip and tooling support).
pub fn read_csv(content: &str) -> Result<Vec<Rating>> {
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let mut ratings = Vec::new();

    for record in reader.deserialize() {
        let rating: Rating =
            record.map_err(|e| ScoutError::Output(format!("malformed report row: {e}")))?;
        ratings.push(rating);
    }

    Ok(ratings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use profilescout_shared::RunId;

    fn meta(count: usize) -> ReportMeta {
        ReportMeta {
            run_id: RunId::new(),
            model: "test/model".into(),
            generated_at: Utc::now(),
            candidate_count: count,
        }
    }

    fn scored(url: &str, score: u8) -> ScoreOutcome {
        ScoreOutcome::Scored(Rating {
            profile_url: url.into(),
            score,
            reasoning: format!("reasoning for {url}"),
        })
    }

    #[test]
    fn ranking_is_stable_descending() {
        let outcomes = vec![
            scored("https://linkedin.com/in/first-five", 5),
            scored("https://linkedin.com/in/eight", 8),
            scored("https://linkedin.com/in/second-five", 5),
            scored("https://linkedin.com/in/three", 3),
        ];

        let report = RankedReport::from_outcomes(outcomes, meta(4));
        let scores: Vec<u8> = report.ratings.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![8, 5, 5, 3]);

        // The two 5-scored profiles keep their arrival order.
        assert_eq!(report.ratings[1].profile_url, "https://linkedin.com/in/first-five");
        assert_eq!(report.ratings[2].profile_url, "https://linkedin.com/in/second-five");
    }

    #[test]
    fn failed_outcomes_become_sentinel_rows() {
        let outcomes = vec![
            scored("https://linkedin.com/in/ok", 6),
            ScoreOutcome::Failed {
                profile_url: "https://linkedin.com/in/broken".into(),
                reason: "oracle timeout".into(),
            },
        ];

        let report = RankedReport::from_outcomes(outcomes, meta(2));
        let sentinel = &report.ratings[1];
        assert_eq!(sentinel.score, 0);
        assert_eq!(sentinel.reasoning, "oracle timeout");
    }

    #[test]
    fn csv_round_trip() {
        let outcomes = vec![
            scored("https://linkedin.com/in/a", 9),
            scored("https://linkedin.com/in/b, inc", 4), // comma forces quoting
            ScoreOutcome::Failed {
                profile_url: "https://linkedin.com/in/c".into(),
                reason: "HTTP 500".into(),
            },
        ];

        let report = RankedReport::from_outcomes(outcomes, meta(3));
        let csv_text = report.to_csv().unwrap();
        assert!(csv_text.starts_with("profile_url,score,reasoning"));

        let parsed = read_csv(&csv_text).unwrap();
        assert_eq!(parsed, report.ratings);
    }

    #[test]
    fn write_csv_creates_the_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranked_report.csv");

        let report = RankedReport::from_outcomes(
            vec![scored("https://linkedin.com/in/a", 7)],
            meta(1),
        );
        report.write_csv(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed = read_csv(&content).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].score, 7);
    }

    #[test]
    fn summary_names_top_five() {
        let outcomes: Vec<ScoreOutcome> = (1..=8)
            .map(|i| scored(&format!("https://linkedin.com/in/c{i}"), i))
            .collect();

        let report = RankedReport::from_outcomes(outcomes, meta(8));
        let summary = report.summary(5);

        assert!(summary.contains("top 5"));
        assert!(summary.contains("https://linkedin.com/in/c8 - 8/10"));
        assert!(summary.contains("5. https://linkedin.com/in/c4"));
        assert!(!summary.contains("https://linkedin.com/in/c3 —"));
    }

    #[test]
    fn summary_with_fewer_than_top_n() {
        let report = RankedReport::from_outcomes(
            vec![scored("https://linkedin.com/in/only", 2)],
            meta(1),
        );
        let summary = report.summary(5);
        assert!(summary.contains("top 1 shown"));
        assert!(summary.contains("https://linkedin.com/in/only"));
    }

    #[test]
    fn summary_counts_failures() {
        let outcomes = vec![
            scored("https://linkedin.com/in/a", 5),
            ScoreOutcome::Failed {
                profile_url: "https://linkedin.com/in/b".into(),
                reason: "boom".into(),
            },
        ];
        let report = RankedReport::from_outcomes(outcomes, meta(2));
        assert!(report.summary(5).contains("1 profiles could not be scored"));
    }
}
