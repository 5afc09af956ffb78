//! Profile enrichment client.
//!
//! Expands profile URLs into structured profile documents by calling the
//! external enrichment service in bounded, strictly sequential chunks.
//! The service returns records correlated to the request purely by
//! position, so any dropped or duplicated record would silently misalign
//! every later pairing — the client therefore fails the run loudly when a
//! chunk's record count does not match its request count.

pub mod chunk;

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument};
use url::Url;

use profilescout_shared::{Result, ScoutError};

pub use chunk::chunks;

/// User-Agent string for enrichment requests.
const USER_AGENT: &str = concat!("ProfileScout/", env!("CARGO_PKG_VERSION"));

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 3;

/// Object keys under which the service may wrap its record list.
const WRAPPER_KEYS: [&str; 3] = ["results", "data", "output"];

/// Request body for one enrichment chunk.
#[derive(Debug, Serialize)]
struct EnrichRequest<'a> {
    profile_urls: &'a [String],
}

/// Per-chunk progress callback.
///
/// Informational only: implementations must not affect enrichment behavior.
pub trait ChunkProgress: Send + Sync {
    /// Called before each chunk request is issued.
    fn chunk_started(&self, index: usize, total: usize, size: usize);
}

/// No-op chunk progress for headless/test usage.
pub struct SilentChunkProgress;

impl ChunkProgress for SilentChunkProgress {
    fn chunk_started(&self, _index: usize, _total: usize, _size: usize) {}
}

// ---------------------------------------------------------------------------
// EnrichmentClient
// ---------------------------------------------------------------------------

/// HTTP client for the profile enrichment service.
#[derive(Debug)]
pub struct EnrichmentClient {
    client: Client,
    endpoint: Url,
    chunk_size: usize,
}

impl EnrichmentClient {
    /// Create a client for the given endpoint.
    pub fn new(endpoint: &str, chunk_size: usize, timeout_secs: u64) -> Result<Self> {
        if chunk_size == 0 {
            return Err(ScoutError::config("chunk_size must be at least 1"));
        }

        let endpoint = Url::parse(endpoint).map_err(|e| {
            ScoutError::config(format!("invalid enrichment endpoint {endpoint}: {e}"))
        })?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ScoutError::Upstream(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            chunk_size,
        })
    }

    /// Enrich every profile URL, preserving input order.
    ///
    /// Chunks are requested one at a time; each response is validated
    /// before the next request is issued. Any chunk failure aborts the
    /// run and discards results accumulated so far.
    #[instrument(skip_all, fields(urls = profile_urls.len(), chunk_size = self.chunk_size))]
    pub async fn enrich_all(
        &self,
        profile_urls: &[String],
        progress: &dyn ChunkProgress,
    ) -> Result<Vec<Value>> {
        let batches = chunks(profile_urls, self.chunk_size);
        let total = batches.len();
        let mut records: Vec<Value> = Vec::with_capacity(profile_urls.len());

        info!(chunks = total, "starting enrichment");

        for (index, batch) in batches.iter().enumerate() {
            progress.chunk_started(index, total, batch.len());
            debug!(chunk = index + 1, total, size = batch.len(), "requesting chunk");

            let mut chunk_records = self.enrich_chunk(batch).await.map_err(|e| {
                ScoutError::Upstream(format!("chunk {}/{total}: {e}", index + 1))
            })?;

            if chunk_records.len() != batch.len() {
                return Err(ScoutError::Upstream(format!(
                    "chunk {}/{total}: requested {} profiles but received {} records; \
                     positional correspondence lost",
                    index + 1,
                    batch.len(),
                    chunk_records.len()
                )));
            }

            records.append(&mut chunk_records);
        }

        info!(records = records.len(), "enrichment complete");
        Ok(records)
    }

    /// Issue one chunk request and normalize the response to a record list.
    async fn enrich_chunk(&self, batch: &[String]) -> std::result::Result<Vec<Value>, String> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&EnrichRequest {
                profile_urls: batch,
            })
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {status}"));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| format!("unparsable response body: {e}"))?;

        normalize_records(body).ok_or_else(|| "response carries no record list".to_string())
    }
}

/// Accept either a bare record list or an object wrapping one under a
/// known key.
fn normalize_records(body: Value) -> Option<Vec<Value>> {
    match body {
        Value::Array(records) => Some(records),
        Value::Object(mut map) => WRAPPER_KEYS.iter().find_map(|key| {
            match map.remove(*key) {
                Some(Value::Array(records)) => Some(records),
                _ => None,
            }
        }),
        _ => None,
    }
}
