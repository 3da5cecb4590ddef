//! Sourced CLI
//!
//! Main entry point for the `sourced` command-line tool.
//! Answers questions from live web sources with citations.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, CheckCommand};
use sourced_core::{
    config::AppConfig,
    logging::{self, LogFormat},
    AppResult,
};
use std::path::PathBuf;

/// Sourced - cited answers from live web sources
#[derive(Parser, Debug)]
#[command(name = "sourced")]
#[command(about = "Cited answers from live web sources", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "SOURCED_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider (openai, ollama)
    #[arg(short, long, global = true, env = "SOURCED_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "SOURCED_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a question from web sources
    Ask(AskCommand),

    /// Screen a query for prompt injection without answering it
    Check(CheckCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Credentials may live in a local .env file
    let _ = dotenvy::dotenv();

    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from file and environment
    let config = AppConfig::load(cli.config.as_deref())?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    let log_format = LogFormat::parse(&config.log_format).unwrap_or_default();
    logging::init_logging(config.log_level.as_deref(), config.no_color, log_format)?;

    tracing::info!("Sourced starting");
    tracing::debug!("Config file: {:?}", config.config_file);
    tracing::debug!("Provider: {}", config.llm.provider);
    tracing::debug!("Model: {}", config.llm.model);

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Check(_) => "check",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Check(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
