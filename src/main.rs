mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// CLI Types
// ============================================================================

/// Mino - a CLI framework for running LLM-backed social media agents
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the agents available in the agents directory
    ListAgents {
        /// Path to configuration file
        #[arg(short, long, default_value = "mino.yaml")]
        config: String,

        /// Agents directory (overrides config file). If relative, it is
        /// resolved relative to the config file directory.
        #[arg(long)]
        agents_dir: Option<PathBuf>,
    },

    /// Load an agent and print its validated profile
    LoadAgent {
        /// Name of the agent to load
        name: String,

        /// Path to configuration file
        #[arg(short, long, default_value = "mino.yaml")]
        config: String,

        /// Agents directory (overrides config file)
        #[arg(long)]
        agents_dir: Option<PathBuf>,
    },

    /// Store credentials for a connection
    ConfigureConnection {
        /// Connection to configure (twitter, openai, anthropic)
        name: String,

        /// Path to configuration file
        #[arg(short, long, default_value = "mino.yaml")]
        config: String,
    },

    /// Run an agent's autonomous loop until interrupted
    Start {
        /// Name of the agent to run
        #[arg(short, long)]
        agent: String,

        /// Path to configuration file
        #[arg(short, long, default_value = "mino.yaml")]
        config: String,

        /// Agents directory (overrides config file)
        #[arg(long)]
        agents_dir: Option<PathBuf>,

        /// Fixed seed for deterministic task selection
        #[arg(long)]
        seed: Option<u64>,
    },
}

// ============================================================================
// Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> std::process::ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::ListAgents { config, agents_dir } => {
            commands::list::run(&config, agents_dir.as_deref())
        }
        Commands::LoadAgent {
            name,
            config,
            agents_dir,
        } => commands::load::run(&name, &config, agents_dir.as_deref()),
        Commands::ConfigureConnection { name, config } => commands::configure::run(&name, &config),
        Commands::Start {
            agent,
            config,
            agents_dir,
            seed,
        } => commands::start::run(&agent, &config, agents_dir.as_deref(), seed).await,
    }
}

// ============================================================================
// Initialization
// ============================================================================

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
