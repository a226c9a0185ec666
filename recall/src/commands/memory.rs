//! Memory commands for the agent-wide memory store.
//!
//! Reads and rewrites `<data dir>/agent_memory.json` directly.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use recall_core::storage::LoadOutcome;
use recall_core::{AgentMemoryStore, ContextValue, MemoryEntry, MemoryQuery, NewMemory, RecallConfig};

use crate::cli::{MemoryAction, MemoryCommand};

/// Execute memory command.
pub fn execute(cmd: MemoryCommand, config: &RecallConfig) -> Result<()> {
    let mut store = open_store(config)?;

    match cmd.action {
        MemoryAction::Add {
            content,
            importance,
            tags,
            context,
        } => add(&mut store, content, importance, tags, context, config),

        MemoryAction::Search {
            query,
            tags,
            min_importance,
            limit,
        } => search(&store, query, tags, min_importance, limit, config),

        MemoryAction::Recent { limit } => {
            print_entries(&store.get_recent(limit));
            Ok(())
        }

        MemoryAction::Context { entry, limit } => {
            let (key, value) = entry;
            print_entries(&store.get_by_context(&key, &parse_context_value(&value), limit));
            Ok(())
        }

        MemoryAction::Stats => stats(&store),

        MemoryAction::Prune {
            max_age_days,
            min_importance,
        } => {
            let max_age_days = max_age_days.unwrap_or(config.memory.prune_max_age_days);
            let min_importance = min_importance.unwrap_or(config.memory.prune_min_importance);
            let removed = store.prune(max_age_days, min_importance);
            println!(
                "{} Pruned {} memories ({} remaining)",
                "✓".green(),
                removed,
                store.len()
            );
            report_save(&store);
            Ok(())
        }

        MemoryAction::Clear { yes } => {
            if !yes {
                bail!("Refusing to clear {} memories without --yes", store.len());
            }
            let removed = store.clear();
            println!("{} Cleared {} memories", "✓".green(), removed);
            report_save(&store);
            Ok(())
        }
    }
}

fn open_store(config: &RecallConfig) -> Result<AgentMemoryStore> {
    let store = AgentMemoryStore::from_root(config).context("Failed to resolve memory file")?;
    if let LoadOutcome::Recovered { reason } = store.last_load() {
        eprintln!(
            "{} {} was unreadable and is treated as empty: {}",
            "⚠".yellow(),
            store.path().display(),
            reason
        );
    }
    Ok(store)
}

fn add(
    store: &mut AgentMemoryStore,
    content: String,
    importance: Option<i64>,
    tags: Vec<String>,
    context: Vec<(String, String)>,
    config: &RecallConfig,
) -> Result<()> {
    let mut input = NewMemory::new(content)
        .with_importance(importance.unwrap_or(config.memory.default_importance))
        .with_tags(tags);
    for (key, value) in context {
        input = input.context_entry(key, parse_context_value(&value));
    }

    let entry = store.add(input);
    println!("{} Remembered", "✓".green());
    println!("  ID: {}", entry.id);
    println!("  Importance: {}", entry.importance);
    if !entry.tags.is_empty() {
        println!("  Tags: {}", entry.tags.join(", "));
    }
    report_save(store);
    Ok(())
}

fn search(
    store: &AgentMemoryStore,
    query: Option<String>,
    tags: Vec<String>,
    min_importance: i64,
    limit: Option<usize>,
    config: &RecallConfig,
) -> Result<()> {
    let query = MemoryQuery {
        query,
        tags: if tags.is_empty() { None } else { Some(tags) },
        min_importance,
        limit: limit.unwrap_or(config.memory.search_limit),
    };
    print_entries(&store.search(&query));
    Ok(())
}

fn stats(store: &AgentMemoryStore) -> Result<()> {
    let stats = store.get_stats();
    println!("{}", "Memory Statistics".bold());
    println!("  File: {}", store.path().display());
    println!("  Total: {}", stats.total);
    println!("  Oldest: {}", stats.oldest.as_deref().unwrap_or("-"));
    println!("  Newest: {}", stats.newest.as_deref().unwrap_or("-"));
    println!("  Avg importance: {:.2}", stats.avg_importance);
    if !stats.tags.is_empty() {
        let tags: Vec<&str> = stats.tags.iter().map(String::as_str).collect();
        println!("  Tags: {}", tags.join(", "));
    }
    Ok(())
}

/// Interpret a CLI value as bool, integer, float or string, in that order
fn parse_context_value(raw: &str) -> ContextValue {
    if let Ok(b) = raw.parse::<bool>() {
        return b.into();
    }
    if let Ok(n) = raw.parse::<i64>() {
        return n.into();
    }
    if let Ok(f) = raw.parse::<f64>() {
        if f.is_finite() {
            return f.into();
        }
    }
    raw.into()
}

fn report_save(store: &AgentMemoryStore) {
    if let Some(err) = store.last_save_error() {
        eprintln!("{} Changes kept in memory but not saved: {}", "⚠".yellow(), err);
    }
}

fn print_entries(entries: &[MemoryEntry]) {
    if entries.is_empty() {
        println!("{}", "No memories found".dimmed());
        return;
    }

    for entry in entries {
        let importance = format!("[{}]", entry.importance);
        let importance = if entry.importance >= 8 {
            importance.red()
        } else if entry.importance >= 5 {
            importance.yellow()
        } else {
            importance.normal()
        };
        println!("{} {}", importance, entry.content);

        let id_short = entry.id.get(..8).unwrap_or(&entry.id);
        let mut meta = vec![id_short.dimmed().to_string()];
        if !entry.tags.is_empty() {
            meta.push(format!("#{}", entry.tags.join(" #")).cyan().to_string());
        }
        for (key, value) in &entry.context {
            meta.push(format!("{}={}", key, value).dimmed().to_string());
        }
        println!("    {}", meta.join("  "));
    }
}
