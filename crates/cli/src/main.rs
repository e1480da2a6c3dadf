//! PRIS CLI
//!
//! Command-line front end for the PRIS nuclear energy analysis engine:
//! country statistics, guided multi-question reports and free-form Q&A
//! grounded in policy documents.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AnalyzeCommand, AskCommand, ChatCommand, CountriesCommand, StatsCommand, TopicsCommand};
use pris_core::{config::AppConfig, logging, logging::LogFormat, AppResult};
use std::path::PathBuf;

/// PRIS analysis CLI - reactor statistics and policy-grounded reports
#[derive(Parser, Debug)]
#[command(name = "pris")]
#[command(about = "Nuclear power program analysis from PRIS statistics and CNPP policy documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "PRIS_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "PRIS_CONFIG")]
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

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// LLM provider (ollama, openai)
    #[arg(short, long, global = true, env = "PRIS_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "PRIS_MODEL")]
    model: Option<String>,

    /// Reactor dataset CSV
    #[arg(long, global = true, env = "PRIS_DATASET")]
    dataset: Option<PathBuf>,

    /// Pre-built passage index
    #[arg(long, global = true, env = "PRIS_INDEX")]
    index: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List countries with guided questions
    Countries(CountriesCommand),

    /// List guided topics and questions for a country
    Topics(TopicsCommand),

    /// Show reactor statistics for a country
    Stats(StatsCommand),

    /// Generate an analytical report for up to three questions
    Analyze(AnalyzeCommand),

    /// Ask a single question
    Ask(AskCommand),

    /// Interactive Q&A session
    Chat(ChatCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_from(cli.workspace.clone(), cli.config.clone())?.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.dataset,
        cli.index,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );
    if cli.log_json {
        config.log_format = LogFormat::Json;
    }

    // Logs go to stderr; stdout carries command output only
    logging::init_logging(config.log_level.as_deref(), config.no_color, config.log_format)?;

    tracing::info!("PRIS CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    let command_name = match &cli.command {
        Commands::Countries(_) => "countries",
        Commands::Topics(_) => "topics",
        Commands::Stats(_) => "stats",
        Commands::Analyze(_) => "analyze",
        Commands::Ask(_) => "ask",
        Commands::Chat(_) => "chat",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Countries(cmd) => cmd.execute(&config),
        Commands::Topics(cmd) => cmd.execute(&config),
        Commands::Stats(cmd) => cmd.execute(&config),
        Commands::Analyze(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
