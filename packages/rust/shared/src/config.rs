//! Application configuration for ProfileScout.
//!
//! User config lives at `~/.profilescout/profilescout.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoutError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "profilescout.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".profilescout";

// ---------------------------------------------------------------------------
// Config structs (matching profilescout.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Profile enrichment service settings.
    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    /// OpenRouter settings for the scoring oracle.
    #[serde(default)]
    pub openrouter: OpenRouterConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default report output directory.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Number of top candidates named in the summary.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            top_n: default_top_n(),
        }
    }
}

fn default_output_dir() -> String {
    ".".into()
}
fn default_top_n() -> usize {
    5
}

/// `[enrichment]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Name of the env var holding the enrichment endpoint URL
    /// (the endpoint embeds an API token, so it is never stored here).
    #[serde(default = "default_api_url_env")]
    pub api_url_env: String,

    /// Maximum profile URLs per enrichment request.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Per-chunk request timeout in seconds.
    #[serde(default = "default_enrich_timeout")]
    pub timeout_secs: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            api_url_env: default_api_url_env(),
            chunk_size: default_chunk_size(),
            timeout_secs: default_enrich_timeout(),
        }
    }
}

fn default_api_url_env() -> String {
    "RELEVANCE_API_URL".into()
}
fn default_chunk_size() -> usize {
    50
}
fn default_enrich_timeout() -> u64 {
    120
}

/// `[openrouter]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Default model to use for scoring.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Per-call request timeout in seconds.
    #[serde(default = "default_oracle_timeout")]
    pub timeout_secs: u64,

    /// Maximum serialized profile length sent to the oracle.
    #[serde(default = "default_max_profile_chars")]
    pub max_profile_chars: usize,

    /// Maximum reasoning length kept from an oracle response.
    #[serde(default = "default_max_reasoning_chars")]
    pub max_reasoning_chars: usize,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            default_model: default_model(),
            timeout_secs: default_oracle_timeout(),
            max_profile_chars: default_max_profile_chars(),
            max_reasoning_chars: default_max_reasoning_chars(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".into()
}
fn default_model() -> String {
    "moonshotai/kimi-k2.5".into()
}
fn default_oracle_timeout() -> u64 {
    60
}
fn default_max_profile_chars() -> usize {
    12_000
}
fn default_max_reasoning_chars() -> usize {
    400
}

// ---------------------------------------------------------------------------
// Pipeline config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime pipeline configuration — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum profile URLs per enrichment request.
    pub chunk_size: usize,
    /// Per-chunk enrichment timeout in seconds.
    pub enrich_timeout_secs: u64,
    /// Per-call oracle timeout in seconds.
    pub oracle_timeout_secs: u64,
    /// Maximum serialized profile length sent to the oracle.
    pub max_profile_chars: usize,
    /// Maximum reasoning length kept from an oracle response.
    pub max_reasoning_chars: usize,
    /// Scoring progress checkpoint interval (items).
    pub progress_batch: usize,
    /// Number of top candidates named in the summary.
    pub top_n: usize,
    /// Scoring model ID.
    pub model: String,
}

impl From<&AppConfig> for PipelineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            chunk_size: config.enrichment.chunk_size,
            enrich_timeout_secs: config.enrichment.timeout_secs,
            oracle_timeout_secs: config.openrouter.timeout_secs,
            max_profile_chars: config.openrouter.max_profile_chars,
            max_reasoning_chars: config.openrouter.max_reasoning_chars,
            progress_batch: 30,
            top_n: config.defaults.top_n,
            model: config.openrouter.default_model.clone(),
        }
    }
}

impl PipelineConfig {
    /// Reject values that would make the pipeline misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ScoutError::config("chunk_size must be at least 1"));
        }
        if self.progress_batch == 0 {
            return Err(ScoutError::config("progress_batch must be at least 1"));
        }
        if self.model.trim().is_empty() {
            return Err(ScoutError::config("scoring model must not be empty"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.profilescout/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ScoutError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.profilescout/profilescout.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ScoutError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| ScoutError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ScoutError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ScoutError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ScoutError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the OpenRouter API key env var is set and non-empty.
pub fn validate_api_key(config: &AppConfig) -> Result<()> {
    let var_name = &config.openrouter.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(()),
        _ => Err(ScoutError::config(format!(
            "OpenRouter API key not found. Set the {var_name} environment variable.\n\
             Get a key at https://openrouter.ai/keys"
        ))),
    }
}

/// Resolve the enrichment endpoint URL from the env var named in config.
pub fn resolve_enrichment_url(config: &AppConfig) -> Result<String> {
    let var_name = &config.enrichment.api_url_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(ScoutError::config(format!(
            "enrichment endpoint not found. Set the {var_name} environment variable."
        ))),
    }
}
