//! Conversation snapshot commands.

use anyhow::{Context, Result};
use colored::Colorize;
use recall_core::{ConversationMemory, ConversationSnapshot, RecallConfig};
use std::fs;

use crate::cli::{ConversationAction, ConversationCommand};

/// Execute conversation command.
pub fn execute(cmd: ConversationCommand, config: &RecallConfig) -> Result<()> {
    match cmd.action {
        ConversationAction::Window { file, max_tokens } => {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let snapshot: ConversationSnapshot =
                serde_json::from_str(&content).context("Failed to parse conversation snapshot")?;

            let mut conversation =
                ConversationMemory::with_max_messages(config.conversation.max_messages);
            conversation.restore(snapshot);

            let budget = max_tokens.unwrap_or(config.conversation.context_tokens);
            let window = conversation.get_context_window(budget);

            println!(
                "{} {} of {} messages fit in {} tokens",
                "Context window:".bold(),
                window.len(),
                conversation.len(),
                budget
            );
            if let Some(summary) = conversation.summary() {
                println!("{} {}", "Summary:".bold(), summary);
            }
            for message in &window {
                println!("{} {}", format!("{}:", message.role).cyan(), message.content);
            }
            Ok(())
        }
    }
}
