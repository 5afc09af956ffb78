//! Candidate table ingestion.
//!
//! Parses a delimited candidate table (one header row, arbitrary columns),
//! locates the column holding LinkedIn profile URLs, and produces the
//! ordered, deduplicated URL list the rest of the pipeline operates on.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use profilescout_shared::{Result, ScoutError};

/// Matches a LinkedIn profile URL anywhere in a cell value.
static PROFILE_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)linkedin\.com/(?:in|pub)/").expect("profile marker regex")
});

/// Parse raw CSV text into an ordered list of unique profile URLs.
///
/// The identifier column is the leftmost column in which at least one row's
/// value contains a LinkedIn profile URL. Values from that column are
/// trimmed, empties dropped, and duplicates removed preserving first-seen
/// order.
pub fn extract_profile_urls(raw: &str) -> Result<Vec<String>> {
    if raw.trim().is_empty() {
        return Err(ScoutError::input("empty source"));
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ScoutError::input(format!("malformed header row: {e}")))?
        .clone();

    let mut rows: Vec<csv::StringRecord> = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| ScoutError::input(format!("malformed row: {e}")))?;
        rows.push(record);
    }

    if rows.is_empty() {
        return Err(ScoutError::input("no rows"));
    }

    let column = detect_profile_column(&headers, &rows)
        .ok_or_else(|| ScoutError::input("no identifier column"))?;

    debug!(
        column,
        header = headers.get(column).unwrap_or(""),
        "profile URL column detected"
    );

    let mut seen: HashSet<String> = HashSet::new();
    let mut urls: Vec<String> = Vec::new();

    for row in &rows {
        let Some(value) = row.get(column) else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        if seen.insert(value.to_string()) {
            urls.push(value.to_string());
        }
    }

    if urls.is_empty() {
        return Err(ScoutError::input("no valid identifiers"));
    }

    info!(
        rows = rows.len(),
        unique_urls = urls.len(),
        "candidate table ingested"
    );

    Ok(urls)
}

/// Find the leftmost column in which at least one value looks like a
/// profile URL.
fn detect_profile_column(headers: &csv::StringRecord, rows: &[csv::StringRecord]) -> Option<usize> {
    let width = headers
        .len()
        .max(rows.iter().map(|r| r.len()).max().unwrap_or(0));

    (0..width).find(|&col| {
        rows.iter()
            .filter_map(|row| row.get(col))
            .any(|value| PROFILE_MARKER_RE.is_match(value))
    })
}
