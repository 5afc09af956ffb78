//! Profile rating engine.
//!
//! Scores enriched profiles one at a time against an LLM oracle. A failed
//! call never aborts the run: the profile gets a `Failed` outcome and the
//! engine moves on to the next pair. Batching exists only for progress
//! checkpoints; execution stays strictly sequential.

pub mod openrouter;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use profilescout_shared::types::{MAX_SCORE, MIN_SCORE};
use profilescout_shared::{Rating, ScoreOutcome};

pub use openrouter::OpenRouterOracle;

/// Evaluation instructions sent with every profile.
const EVALUATION_PROMPT: &str = "\
You are screening LinkedIn profiles for an early-stage startup incubator.\n\
Evaluate the candidate's founder and incubation potential: entrepreneurial \
track record, technical depth, career trajectory, and evidence of building \
things from scratch.\n\
\n\
Respond with a single JSON object and nothing else:\n\
{\"score\": <integer from 1 to 10>, \"reasoning\": \"<one or two short sentences>\"}\n\
\n\
Profile data:\n";

/// Marker appended when a serialized profile exceeds the length limit.
const TRUNCATION_MARKER: &str = "\n[... profile truncated ...]";

// ---------------------------------------------------------------------------
// Oracle seam
// ---------------------------------------------------------------------------

/// A scoring oracle: takes the full prompt text, returns the model's raw
/// reply. Implemented by [`OpenRouterOracle`] in production and by stubs
/// in tests.
#[allow(async_fn_in_trait)] // callers never spawn the future, so no Send bound needed
pub trait Oracle {
    /// Submit one prompt and return the raw reply text.
    ///
    /// Transport-level failures are reported as a plain description; the
    /// engine turns them into per-item `Failed` outcomes.
    async fn complete(&self, prompt: &str) -> std::result::Result<String, String>;
}

// ---------------------------------------------------------------------------
// Engine options
// ---------------------------------------------------------------------------

/// Tunables for the rating engine.
#[derive(Debug, Clone)]
pub struct RatingOptions {
    /// Maximum serialized profile length sent to the oracle.
    pub max_profile_chars: usize,
    /// Maximum reasoning length kept from a reply.
    pub max_reasoning_chars: usize,
    /// Progress checkpoint interval (items).
    pub progress_batch: usize,
}

impl Default for RatingOptions {
    fn default() -> Self {
        Self {
            max_profile_chars: 12_000,
            max_reasoning_chars: 400,
            progress_batch: 30,
        }
    }
}

/// Progress callback for scoring operations.
pub trait ScoringProgress: Send + Sync {
    /// Called at every batch boundary with items completed so far.
    fn checkpoint(&self, completed: usize, total: usize);
}

/// No-op scoring progress.
pub struct SilentScoringProgress;

impl ScoringProgress for SilentScoringProgress {
    fn checkpoint(&self, _completed: usize, _total: usize) {}
}

// ---------------------------------------------------------------------------
// Rating engine
// ---------------------------------------------------------------------------

/// Score every (profile URL, enriched record) pair, strictly in order.
///
/// Returns exactly one outcome per input pair. A failure in pair *k*
/// affects only pair *k*'s outcome.
#[instrument(skip_all, fields(pairs = pairs.len()))]
pub async fn rate_all<O: Oracle>(
    oracle: &O,
    pairs: &[(String, Value)],
    options: &RatingOptions,
    progress: &dyn ScoringProgress,
) -> Vec<ScoreOutcome> {
    let total = pairs.len();
    let mut outcomes: Vec<ScoreOutcome> = Vec::with_capacity(total);

    info!(total, batch = options.progress_batch, "starting scoring");

    for (index, (profile_url, record)) in pairs.iter().enumerate() {
        if index % options.progress_batch == 0 {
            progress.checkpoint(index, total);
        }

        let outcome = score_one(oracle, profile_url, record, options).await;
        if let ScoreOutcome::Failed { reason, .. } = &outcome {
            warn!(%profile_url, %reason, "scoring failed, continuing");
        } else {
            debug!(%profile_url, score = outcome.score(), "profile scored");
        }
        outcomes.push(outcome);
    }

    progress.checkpoint(total, total);

    let failed = outcomes
        .iter()
        .filter(|o| matches!(o, ScoreOutcome::Failed { .. }))
        .count();
    info!(total, failed, "scoring complete");

    outcomes
}

/// Score a single pair. Every failure path collapses to `Failed`.
async fn score_one<O: Oracle>(
    oracle: &O,
    profile_url: &str,
    record: &Value,
    options: &RatingOptions,
) -> ScoreOutcome {
    let failed = |reason: String| ScoreOutcome::Failed {
        profile_url: profile_url.to_string(),
        reason,
    };

    let profile_json = match serde_json::to_string_pretty(record) {
        Ok(json) => json,
        Err(e) => return failed(format!("profile serialization failed: {e}")),
    };

    let prompt = format!(
        "{EVALUATION_PROMPT}{}",
        truncate_profile(&profile_json, options.max_profile_chars)
    );

    let raw = match oracle.complete(&prompt).await {
        Ok(raw) => raw,
        Err(reason) => return failed(reason),
    };

    match parse_reply(&raw, options.max_reasoning_chars) {
        Ok((score, reasoning)) => ScoreOutcome::Scored(Rating {
            profile_url: profile_url.to_string(),
            score,
            reasoning,
        }),
        Err(reason) => failed(reason),
    }
}

// ---------------------------------------------------------------------------
// Reply parsing
// ---------------------------------------------------------------------------

/// Shape the oracle is instructed to reply with.
#[derive(Debug, Deserialize)]
struct OracleReply {
    score: Value,
    reasoning: Value,
}

/// Parse and strictly validate an oracle reply.
///
/// Accepts the two-field JSON object, optionally wrapped in a Markdown
/// code fence. Missing fields, wrong types, or an out-of-range score are
/// all rejected; overlong reasoning is clipped rather than rejected.
fn parse_reply(raw: &str, max_reasoning_chars: usize) -> std::result::Result<(u8, String), String> {
    let body = strip_code_fence(raw.trim());

    let reply: OracleReply = serde_json::from_str(body)
        .map_err(|e| format!("unparsable oracle reply: {e}"))?;

    let score = reply
        .score
        .as_u64()
        .ok_or_else(|| format!("score is not an integer: {}", reply.score))?;

    if !(MIN_SCORE as u64..=MAX_SCORE as u64).contains(&score) {
        return Err(format!("score {score} outside [{MIN_SCORE},{MAX_SCORE}]"));
    }

    let reasoning = reply
        .reasoning
        .as_str()
        .ok_or_else(|| "reasoning is not a string".to_string())?;

    let mut reasoning = reasoning.trim().to_string();
    if reasoning.chars().count() > max_reasoning_chars {
        reasoning = reasoning.chars().take(max_reasoning_chars).collect();
    }

    Ok((score as u8, reasoning))
}

/// Strip a surrounding ``` or ```json fence if present.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim_start_matches(['\r', '\n'])
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}

/// Truncate a serialized profile to `max_chars`, marking the cut.
fn truncate_profile(profile_json: &str, max_chars: usize) -> String {
    if profile_json.len() <= max_chars {
        return profile_json.to_string();
    }
    let mut cut = max_chars;
    while !profile_json.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}{TRUNCATION_MARKER}", &profile_json[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Oracle stub replaying canned replies and recording prompts.
    struct StubOracle {
        replies: Mutex<Vec<std::result::Result<String, String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubOracle {
        fn new(replies: Vec<std::result::Result<String, String>>) -> Self {
            let mut replies = replies;
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl Oracle for StubOracle {
        async fn complete(&self, prompt: &str) -> std::result::Result<String, String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .expect("stub oracle ran out of replies")
        }
    }

    fn reply(score: u8) -> std::result::Result<String, String> {
        Ok(format!(
            r#"{{"score": {score}, "reasoning": "assessment {score}"}}"#
        ))
    }

    fn pairs(n: usize) -> Vec<(String, Value)> {
        (0..n)
            .map(|i| {
                (
                    format!("https://linkedin.com/in/candidate-{i}"),
                    json!({ "full_name": format!("Candidate {i}") }),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn pairs_are_scored_positionally() {
        let oracle = StubOracle::new(vec![reply(3), reply(7), reply(9)]);
        let pairs = pairs(3);

        let outcomes = rate_all(
            &oracle,
            &pairs,
            &RatingOptions::default(),
            &SilentScoringProgress,
        )
        .await;

        assert_eq!(outcomes.len(), 3);
        for (i, outcome) in outcomes.iter().enumerate() {
            assert_eq!(outcome.profile_url(), pairs[i].0);
        }
        assert_eq!(outcomes[0].score(), 3);
        assert_eq!(outcomes[2].score(), 9);

        // Prompt i carries record i's serialized content.
        let prompts = oracle.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 3);
        for (i, prompt) in prompts.iter().enumerate() {
            assert!(prompt.contains(&format!("Candidate {i}")));
        }
    }

    #[tokio::test]
    async fn one_failure_does_not_affect_neighbors() {
        let oracle = StubOracle::new(vec![
            reply(8),
            Err("oracle timeout".into()),
            reply(5),
        ]);
        let pairs = pairs(3);

        let outcomes = rate_all(
            &oracle,
            &pairs,
            &RatingOptions::default(),
            &SilentScoringProgress,
        )
        .await;

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].score(), 8);
        assert!(matches!(
            &outcomes[1],
            ScoreOutcome::Failed { reason, .. } if reason.contains("timeout")
        ));
        assert_eq!(outcomes[2].score(), 5);
    }

    #[tokio::test]
    async fn malformed_reply_is_an_item_failure() {
        let oracle = StubOracle::new(vec![Ok("I would rate this an 8".into()), reply(6)]);
        let pairs = pairs(2);

        let outcomes = rate_all(
            &oracle,
            &pairs,
            &RatingOptions::default(),
            &SilentScoringProgress,
        )
        .await;

        assert!(matches!(outcomes[0], ScoreOutcome::Failed { .. }));
        assert_eq!(outcomes[1].score(), 6);
    }

    #[tokio::test]
    async fn progress_checkpoints_fire_per_batch() {
        struct Recorder(Mutex<Vec<usize>>);
        impl ScoringProgress for Recorder {
            fn checkpoint(&self, completed: usize, _total: usize) {
                self.0.lock().unwrap().push(completed);
            }
        }

        let oracle = StubOracle::new((0..5).map(|_| reply(5)).collect());
        let pairs = pairs(5);
        let options = RatingOptions {
            progress_batch: 2,
            ..RatingOptions::default()
        };
        let recorder = Recorder(Mutex::new(Vec::new()));

        let outcomes = rate_all(&oracle, &pairs, &options, &recorder).await;

        assert_eq!(outcomes.len(), 5);
        assert_eq!(*recorder.0.lock().unwrap(), vec![0, 2, 4, 5]);
    }

    #[test]
    fn parse_reply_accepts_fenced_json() {
        let raw = "```json\n{\"score\": 7, \"reasoning\": \"solid\"}\n```";
        let (score, reasoning) = parse_reply(raw, 400).unwrap();
        assert_eq!(score, 7);
        assert_eq!(reasoning, "solid");
    }

    #[test]
    fn parse_reply_rejects_non_integer_score() {
        assert!(parse_reply(r#"{"score": "high", "reasoning": "x"}"#, 400).is_err());
        assert!(parse_reply(r#"{"score": 7.5, "reasoning": "x"}"#, 400).is_err());
    }

    #[test]
    fn parse_reply_rejects_out_of_range_score() {
        assert!(parse_reply(r#"{"score": 0, "reasoning": "x"}"#, 400).is_err());
        assert!(parse_reply(r#"{"score": 11, "reasoning": "x"}"#, 400).is_err());
    }

    #[test]
    fn parse_reply_rejects_missing_fields() {
        assert!(parse_reply(r#"{"score": 5}"#, 400).is_err());
        assert!(parse_reply(r#"{"reasoning": "x"}"#, 400).is_err());
    }

    #[test]
    fn parse_reply_rejects_non_string_reasoning() {
        assert!(parse_reply(r#"{"score": 5, "reasoning": 42}"#, 400).is_err());
    }

    #[test]
    fn overlong_reasoning_is_clipped_not_rejected() {
        let raw = format!(r#"{{"score": 5, "reasoning": "{}"}}"#, "x".repeat(1000));
        let (_, reasoning) = parse_reply(&raw, 100).unwrap();
        assert_eq!(reasoning.chars().count(), 100);
    }

    #[test]
    fn short_profile_is_untouched() {
        assert_eq!(truncate_profile("{\"a\":1}", 100), "{\"a\":1}");
    }

    #[test]
    fn long_profile_is_truncated_with_marker() {
        let long = "a".repeat(200);
        let result = truncate_profile(&long, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.ends_with("[... profile truncated ...]"));
    }
}
