//! Clearance CLI
//!
//! Main entry point for the clearance command-line tool.
//! Ingests department documents and answers questions within a role's clearance.

mod commands;

use clap::{Parser, Subcommand};
use clearance_core::{config::AppConfig, logging, AppResult};
use commands::{AskCommand, IngestCommand, RolesCommand, StatusCommand};
use std::path::PathBuf;

/// Clearance - role-scoped question answering over department documents
#[derive(Parser, Debug)]
#[command(name = "clearance")]
#[command(about = "Role-scoped question answering over department documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "CLEARANCE_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "CLEARANCE_CONFIG")]
    config: Option<PathBuf>,

    /// Base directory with one subdirectory per department
    #[arg(long, global = true, env = "CLEARANCE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Answer generator provider (ollama)
    #[arg(short, long, global = true, env = "CLEARANCE_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "CLEARANCE_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rebuild the index from the department folders
    Ingest(IngestCommand),

    /// Ask a question as a role
    Ask(AskCommand),

    /// Show the role-access table
    Roles(RolesCommand),

    /// Show index readiness
    Status(StatusCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    let config = AppConfig::load()?;

    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.data_dir,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    let format = if cli.log_json {
        logging::LogFormat::Json
    } else {
        logging::LogFormat::Pretty
    };
    logging::init_logging(config.log_level.as_deref(), config.no_color, format)?;

    tracing::info!("Clearance CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Data directory: {:?}", config.data_dir);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    config.validate()?;
    config.ensure_clearance_dir()?;

    let command_name = match &cli.command {
        Commands::Ingest(_) => "ingest",
        Commands::Ask(_) => "ask",
        Commands::Roles(_) => "roles",
        Commands::Status(_) => "status",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ingest(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Roles(cmd) => cmd.execute(&config),
        Commands::Status(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
