//! CLI definitions using clap derive.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "recall")]
#[command(about = "Inspect and maintain local agent memory", long_about = None)]
pub struct Cli {
    /// Base directory for memory files (overrides config)
    #[arg(long, global = true, env = "RECALL_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Agent memories (add, search, prune)
    Memory(MemoryCommand),

    /// Per-project knowledge (conventions, patterns)
    Project(ProjectCommand),

    /// Conversation snapshots
    Conversation(ConversationCommand),

    /// Show effective configuration
    Config,

    /// Show version information
    Version,
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct MemoryCommand {
    #[command(subcommand)]
    pub action: MemoryAction,
}

#[derive(Subcommand, Debug)]
pub enum MemoryAction {
    /// Remember a fact
    Add {
        /// Content to remember
        content: String,

        /// Importance, conventionally 1-10 (default from config)
        #[arg(short, long, allow_negative_numbers = true)]
        importance: Option<i64>,

        /// Tags for categorization
        #[arg(short = 'T', long = "tag", action = clap::ArgAction::Append)]
        tags: Vec<String>,

        /// Context metadata as key=value
        #[arg(short = 'C', long = "context", value_parser = parse_key_val, action = clap::ArgAction::Append)]
        context: Vec<(String, String)>,
    },

    /// Search memories ranked by importance and recency
    Search {
        /// Substring to look for (case-insensitive)
        query: Option<String>,

        /// Only memories with any of these tags
        #[arg(short = 'T', long = "tag", action = clap::ArgAction::Append)]
        tags: Vec<String>,

        /// Minimum importance
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        min_importance: i64,

        /// Maximum results (default from config)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Most recent memories
    Recent {
        /// Maximum results
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Memories whose context has key=value
    Context {
        /// Context entry as key=value
        #[arg(value_parser = parse_key_val)]
        entry: (String, String),

        /// Maximum results
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Show memory statistics
    Stats,

    /// Drop memories that are both old and unimportant
    Prune {
        /// Age threshold in days (default from config)
        #[arg(long)]
        max_age_days: Option<u32>,

        /// Importance floor (default from config)
        #[arg(long, allow_negative_numbers = true)]
        min_importance: Option<i64>,
    },

    /// Delete every memory
    Clear {
        /// Skip the confirmation guard
        #[arg(long)]
        yes: bool,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Project Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct ProjectCommand {
    /// Project root (default: current directory)
    #[arg(short, long, global = true, default_value = ".")]
    pub project: PathBuf,

    #[command(subcommand)]
    pub action: ProjectAction,
}

#[derive(Subcommand, Debug)]
pub enum ProjectAction {
    /// Record a learned pattern
    Pattern {
        /// Pattern name
        pattern: String,
        /// What the pattern means
        description: String,
    },

    /// Record a coding convention
    Convention {
        /// Convention text
        convention: String,
    },

    /// Record a commonly used import
    Import {
        /// Import statement or path
        import: String,
    },

    /// Print the knowledge summary
    Summary,
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversation Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct ConversationCommand {
    #[command(subcommand)]
    pub action: ConversationAction,
}

#[derive(Subcommand, Debug)]
pub enum ConversationAction {
    /// Print the context window of an exported conversation
    Window {
        /// Snapshot JSON file ({messages, summary})
        file: PathBuf,

        /// Token budget (default from config)
        #[arg(short, long)]
        max_tokens: Option<usize>,
    },
}

/// Parse a `key=value` pair
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", s)),
    }
}
