//! recall - inspect and maintain local agent memory
//!
//! Operates directly on the JSON files written by recall-core; no server
//! or agent needs to be running.

use anyhow::Result;
use clap::Parser;
use recall_core::RecallConfig;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("recall=info".parse()?))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = RecallConfig::load_with(&RecallConfig::config_path(), cli.data_dir)?;
    debug!("Using data directory {:?}", config.data_dir);

    // Execute command
    match cli.command {
        Commands::Memory(cmd) => commands::memory::execute(cmd, &config),
        Commands::Project(cmd) => commands::project::execute(cmd, &config),
        Commands::Conversation(cmd) => commands::conversation::execute(cmd, &config),
        Commands::Config => commands::show_config(&config),
        Commands::Version => {
            println!("recall {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
