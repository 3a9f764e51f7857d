//! studyplan CLI: the main entry point.
//!
//! Commands:
//! - `plan`      Generate the exercises for one study session
//! - `preview`   Show a session's templates, topics and difficulties
//! - `evaluate`  Grade a response to a generated exercise
//! - `config`    Show, validate or initialize configuration
//! - `doctor`    Diagnose configuration and provider health

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::config_cmd::ConfigAction;
use commands::plan::SessionArgs;

#[derive(Parser)]
#[command(
    name = "studyplan",
    about = "studyplan: adaptive study-session planner",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Config file to use instead of ~/.studyplan/config.toml
    #[arg(short, long, global = true, env = "STUDYPLAN_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the exercises for one study session (JSON on stdout)
    Plan(SessionArgs),

    /// Show what a session would contain without generating content
    Preview {
        #[command(flatten)]
        session: SessionArgs,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Grade a learner response to a generated exercise
    Evaluate {
        /// Exercise JSON, as printed by `plan` ("-" for stdin)
        #[arg(short, long)]
        exercise: PathBuf,

        /// Response JSON, e.g. {"kind":"choice","index":0} ("-" for stdin)
        #[arg(short, long)]
        response: PathBuf,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },

    /// Diagnose configuration and provider health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing; logs go to stderr so stdout stays machine-readable
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Plan(session) => commands::plan::run(config, &session).await?,
        Commands::Preview { session, json } => commands::plan::preview(config, &session, json)?,
        Commands::Evaluate { exercise, response } => {
            commands::evaluate::run(config, &exercise, &response).await?
        }
        Commands::Config { action } => commands::config_cmd::run(config, action)?,
        Commands::Doctor => commands::doctor::run(config).await?,
    }

    Ok(())
}
