//! OpenRouter-backed scoring oracle.
//!
//! Thin chat-completions client: one prompt in, the model's raw reply text
//! out. Reply validation lives in the engine so stub oracles exercise the
//! same path.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use profilescout_shared::{Result, ScoutError};

use crate::Oracle;

/// Default OpenRouter API root.
const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// User-Agent string for oracle requests.
const USER_AGENT: &str = concat!("ProfileScout/", env!("CARGO_PKG_VERSION"));

/// Low temperature for reproducible scoring.
const TEMPERATURE: f32 = 0.2;

/// Generous cap for a two-field JSON reply.
const MAX_TOKENS: u32 = 300;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    content: String,
}

// ---------------------------------------------------------------------------
// OpenRouterOracle
// ---------------------------------------------------------------------------

/// Scoring oracle backed by the OpenRouter chat-completions API.
pub struct OpenRouterOracle {
    client: Client,
    base_url: Url,
    api_key: String,
    model: String,
}

impl OpenRouterOracle {
    /// Create an oracle for the given model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ScoutError::config(format!("failed to build HTTP client: {e}")))?;

        let base_url = Url::parse(DEFAULT_BASE_URL).expect("default base URL");

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Override the API root (mock servers in tests).
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = Url::parse(base_url)
            .map_err(|e| ScoutError::config(format!("invalid oracle base URL {base_url}: {e}")))?;
        Ok(self)
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.as_str().trim_end_matches('/'))
    }
}

impl Oracle for OpenRouterOracle {
    async fn complete(&self, prompt: &str) -> std::result::Result<String, String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("oracle request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("oracle returned HTTP {status}"));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| format!("unparsable oracle response: {e}"))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| "oracle response has no choices".to_string())?;

        debug!(model = %self.model, chars = content.len(), "oracle replied");
        Ok(content)
    }
}
