//! Authority CLI.
//!
//! `gate` runs the deterministic gate offline on a council report file;
//! `decide` runs the full pipeline against the Gemini API; `check`
//! verifies configuration without making a model call.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use authority_core::CouncilReport;
use authority_runtime::{DecisionPipeline, GeminiProvider, LlmProvider, PipelineError, RuntimeConfig};

#[derive(Parser)]
#[command(name = "authority", about = "Deterministic decision gate with LLM sensors", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run the deterministic gate on a council report JSON file
    Gate {
        /// Path to the council report
        report: PathBuf,
    },

    /// Run the full decision pipeline on a free-text message
    Decide {
        /// The decision to analyze
        message: String,

        /// Caller identifier used for rate limiting
        #[arg(long, default_value = "cli")]
        caller: String,

        /// Model override
        #[arg(long)]
        model: Option<String>,

        /// Path to a runtime configuration JSON file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Verify configuration without calling the model
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Gate { report } => gate(&report, cli.pretty),
        Command::Decide {
            message,
            caller,
            model,
            config,
        } => decide(&message, &caller, model, config, cli.pretty).await,
        Command::Check => check().await,
    }
}

fn gate(path: &PathBuf, pretty: bool) -> Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read report {}", path.display()))?;

    let report = CouncilReport::from_json(&json).context("invalid council report")?;
    let card = authority_core::decide(&report)?;

    print_json(&card, pretty)
}

async fn decide(
    message: &str,
    caller: &str,
    model: Option<String>,
    config_path: Option<PathBuf>,
    pretty: bool,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str::<RuntimeConfig>(&raw).context("invalid runtime config")?
        }
        None => RuntimeConfig::default(),
    };
    if let Some(model) = model {
        config.model = model;
    }

    let provider = GeminiProvider::from_env().context("Gemini provider not configured")?;
    tracing::info!(key = %provider.masked_key(), model = %config.model, "pipeline starting");

    let pipeline = DecisionPipeline::builder()
        .provider(Arc::new(provider))
        .config(config)
        .build()?;

    match pipeline.decide(message, caller).await {
        Ok(outcome) => print_json(&outcome, pretty),
        Err(PipelineError::BiasRejected { screen }) => {
            eprintln!(
                "Rejected: input too emotionally charged (score {}%).",
                screen.score
            );
            if let Some(suggestion) = &screen.suggestion {
                eprintln!("Suggestion: {}", suggestion);
            }
            print_json(&screen, pretty)?;
            std::process::exit(1);
        }
        Err(PipelineError::Incomplete {
            missing_field,
            question,
            ..
        }) => {
            eprintln!("Incomplete decision: missing '{}'.", missing_field);
            eprintln!("{}", question);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

async fn check() -> Result<()> {
    match GeminiProvider::from_env() {
        Ok(provider) => {
            let healthy = provider.health_check().await;
            println!("provider: {}", provider.name());
            println!("api key: {}", provider.masked_key());
            println!("status: {}", if healthy { "operational" } else { "unhealthy" });
            Ok(())
        }
        Err(e) => {
            eprintln!("not configured: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", rendered);
    Ok(())
}
