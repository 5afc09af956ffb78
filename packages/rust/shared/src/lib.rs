//! Shared types, error model, and configuration for ProfileScout.
//!
//! This crate is the foundation depended on by all other ProfileScout crates.
//! It provides:
//! - [`ScoutError`] — the unified error type
//! - Domain types ([`Rating`], [`ScoreOutcome`], [`RunId`])
//! - Configuration ([`AppConfig`], [`PipelineConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, EnrichmentConfig, OpenRouterConfig, PipelineConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, resolve_enrichment_url,
    validate_api_key,
};
pub use error::{Result, ScoutError};
pub use types::{Rating, ReportMeta, RunId, ScoreOutcome};
