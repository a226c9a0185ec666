//! Command implementations.

pub mod conversation;
pub mod memory;
pub mod project;

use anyhow::{Context, Result};
use colored::Colorize;
use recall_core::RecallConfig;

/// Print the effective configuration as TOML.
pub fn show_config(config: &RecallConfig) -> Result<()> {
    println!("{} {}", "Config file:".bold(), RecallConfig::config_path().display());
    println!();
    let rendered = config.to_toml().context("Failed to render configuration")?;
    print!("{}", rendered);
    Ok(())
}
