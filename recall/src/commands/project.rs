//! Project knowledge commands.

use anyhow::{Context, Result};
use colored::Colorize;
use recall_core::{ProjectMemory, RecallConfig};

use crate::cli::{ProjectAction, ProjectCommand};

/// Execute project command.
pub fn execute(cmd: ProjectCommand, config: &RecallConfig) -> Result<()> {
    let mut memory = ProjectMemory::open(config, &cmd.project)
        .context("Failed to resolve project knowledge file")?;

    match cmd.action {
        ProjectAction::Pattern {
            pattern,
            description,
        } => {
            memory.learn_pattern(pattern, description);
            println!("{} Learned pattern for {}", "✓".green(), project_label(&memory));
        }

        ProjectAction::Convention { convention } => {
            if memory.learn_convention(convention) {
                println!("{} Learned convention for {}", "✓".green(), project_label(&memory));
            } else {
                println!("{} Convention already known", "•".dimmed());
            }
        }

        ProjectAction::Import { import } => {
            if memory.add_common_import(import) {
                println!("{} Recorded import for {}", "✓".green(), project_label(&memory));
            } else {
                println!("{} Import already known", "•".dimmed());
            }
        }

        ProjectAction::Summary => {
            println!("{}", project_label(&memory).bold());
            println!("{}", memory.get_context_summary());
            return Ok(());
        }
    }

    if let Some(err) = memory.last_save_error() {
        eprintln!("{} Knowledge not saved: {}", "⚠".yellow(), err);
    }
    Ok(())
}

fn project_label(memory: &ProjectMemory) -> String {
    memory.project_root().display().to_string()
}
