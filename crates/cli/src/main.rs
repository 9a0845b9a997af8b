//! taxrag CLI
//!
//! Main entry point for the tax regulation assistant.
//! Answers questions from a local index of tax documents, citing the file and
//! page each piece of evidence came from.

mod commands;

use clap::{Parser, Subcommand};
use commands::{
    AskCommand, BuildCommand, ChatCommand, IngestCommand, PromptsCommand, StatsCommand,
};
use std::path::PathBuf;
use taxrag_core::{config::Settings, logging, AppResult};

/// taxrag - question answering over tax regulation documents
#[derive(Parser, Debug)]
#[command(name = "taxrag")]
#[command(about = "Question answering over tax regulation documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "TAXRAG_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to settings file
    #[arg(short, long, global = true, env = "TAXRAG_CONFIG")]
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

    /// Generation model identifier
    #[arg(short, long, global = true, env = "TAXRAG_MODEL")]
    model: Option<String>,

    /// Prompt template used for answering
    #[arg(short, long, global = true)]
    prompt_type: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show what a build would index (dry run)
    Ingest(IngestCommand),

    /// Build or rebuild the vector index
    Build(BuildCommand),

    /// Ask a single question
    Ask(AskCommand),

    /// Interactive question loop
    Chat(ChatCommand),

    /// Show configuration and index size
    Stats(StatsCommand),

    /// List prompt templates
    Prompts(PromptsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    let settings = Settings::load_with(cli.workspace, cli.config)?.with_overrides(
        cli.model,
        cli.prompt_type,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(settings.log_level.as_deref(), settings.no_color)?;

    tracing::info!("taxrag starting");
    tracing::debug!("Workspace: {:?}", settings.workspace);
    tracing::debug!("Model: {}", settings.model);
    tracing::debug!("Prompt type: {}", settings.prompt_type);

    let command_name = match &cli.command {
        Commands::Ingest(_) => "ingest",
        Commands::Build(_) => "build",
        Commands::Ask(_) => "ask",
        Commands::Chat(_) => "chat",
        Commands::Stats(_) => "stats",
        Commands::Prompts(_) => "prompts",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ingest(cmd) => cmd.execute(&settings).await,
        Commands::Build(cmd) => cmd.execute(&settings).await,
        Commands::Ask(cmd) => cmd.execute(&settings).await,
        Commands::Chat(cmd) => cmd.execute(&settings).await,
        Commands::Stats(cmd) => cmd.execute(&settings).await,
        Commands::Prompts(cmd) => cmd.execute(&settings).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
