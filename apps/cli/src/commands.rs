//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use profilescout_core::pipeline::{ProgressReporter, ScreeningResult, run_screening};
use profilescout_enrich::EnrichmentClient;
use profilescout_scoring::OpenRouterOracle;
use profilescout_shared::{
    PipelineConfig, ScoutError, init_config, load_config, resolve_enrichment_url,
    validate_api_key,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// ProfileScout — rank candidate LinkedIn profiles for founder potential.
#[derive(Parser)]
#[command(
    name = "profilescout",
    version,
    about = "Screen a CSV of candidate profiles and produce a ranked report.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Screen a candidate table and write the ranked report.
    Screen {
        /// Path to the candidate CSV (header row + candidate rows).
        input: PathBuf,

        /// Output path for the ranked report (defaults to ./ranked_report.csv).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Scoring model ID (overrides config).
        #[arg(short, long)]
        model: Option<String>,

        /// Profile URLs per enrichment request (overrides config).
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Number of top candidates named in the summary.
        #[arg(long)]
        top: Option<usize>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "profilescout=info",
        1 => "profilescout=debug",
        _ => "profilescout=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Screen {
            input,
            out,
            model,
            chunk_size,
            top,
        } => cmd_screen(&input, out, model, chunk_size, top).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Screen command
// ---------------------------------------------------------------------------

async fn cmd_screen(
    input: &PathBuf,
    out: Option<PathBuf>,
    model: Option<String>,
    chunk_size: Option<usize>,
    top: Option<usize>,
) -> Result<()> {
    // Validate config and credentials before touching the input
    let config = load_config()?;
    validate_api_key(&config)?;
    let enrichment_url = resolve_enrichment_url(&config)?;

    let mut pipeline = PipelineConfig::from(&config);
    if let Some(model) = model {
        pipeline.model = model;
    }
    if let Some(chunk_size) = chunk_size {
        pipeline.chunk_size = chunk_size;
    }
    if let Some(top) = top {
        pipeline.top_n = top;
    }
    pipeline.validate()?;

    let raw_table = std::fs::read_to_string(input)
        .map_err(|e| eyre!("cannot read candidate table '{}': {e}", input.display()))?;

    let out_path = out.unwrap_or_else(|| {
        PathBuf::from(&config.defaults.output_dir).join("ranked_report.csv")
    });

    let enricher = EnrichmentClient::new(
        &enrichment_url,
        pipeline.chunk_size,
        pipeline.enrich_timeout_secs,
    )?;

    let api_key = std::env::var(&config.openrouter.api_key_env)
        .map_err(|_| ScoutError::config("OpenRouter API key env var not set"))?;
    let oracle =
        OpenRouterOracle::new(api_key, pipeline.model.clone(), pipeline.oracle_timeout_secs)?;

    info!(
        input = %input.display(),
        out = %out_path.display(),
        model = %pipeline.model,
        "starting screening"
    );

    let reporter = CliProgress::new();
    let result = run_screening(&raw_table, &enricher, &oracle, &pipeline, &reporter).await?;

    result.report.write_csv(&out_path)?;

    println!();
    println!("{}", result.summary);
    println!();
    println!("  Run:        {}", result.run_id);
    println!("  Candidates: {}", result.candidate_count);
    println!("  Report:     {}", out_path.display());
    println!("  Time:       {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// Config commands
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("created {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let rendered = toml::to_string_pretty(&config)
        .map_err(|e| eyre!("cannot render config: {e}"))?;
    println!("{rendered}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn chunk_started(&self, index: usize, total: usize, size: usize) {
        self.spinner.set_message(format!(
            "Enriching chunk [{}/{total}] ({size} profiles)",
            index + 1
        ));
    }

    fn scoring_progress(&self, completed: usize, total: usize) {
        self.spinner
            .set_message(format!("Scoring profiles [{completed}/{total}]"));
    }

    fn done(&self, _result: &ScreeningResult) {
        self.spinner.finish_and_clear();
    }
}
