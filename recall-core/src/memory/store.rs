//! Memory Store Implementation
//!
//! JSON-file storage for agent memories. The whole file is read on open and
//! rewritten on every mutation.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::types::*;
use crate::error::Result;
use crate::storage::{read_json_file, write_json_file, LoadOutcome, StorageRoot};
use crate::types::ContextValue;
use crate::utils::{format_timestamp, now_timestamp, SECONDS_PER_DAY};

/// Default age threshold for [`AgentMemoryStore::prune`]
pub const DEFAULT_PRUNE_MAX_AGE_DAYS: u32 = 30;

/// Default importance floor for [`AgentMemoryStore::prune`]
pub const DEFAULT_PRUNE_MIN_IMPORTANCE: i64 = 3;

/// Persistent store of [`MemoryEntry`] values, in insertion order.
#[derive(Debug)]
pub struct AgentMemoryStore {
    path: PathBuf,
    entries: Vec<MemoryEntry>,
    last_load: LoadOutcome,
    last_save_error: Option<String>,
}

impl AgentMemoryStore {
    /// Open the store backed by `path`, loading whatever is there.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut store = Self {
            path: path.into(),
            entries: Vec::new(),
            last_load: LoadOutcome::Missing,
            last_save_error: None,
        };
        store.load();
        store
    }

    /// Open the agent-wide store beneath a storage root.
    pub fn from_root(root: &impl StorageRoot) -> Result<Self> {
        Ok(Self::open(root.agent_memory_path()?))
    }

    /// Reload from disk.
    ///
    /// A missing, unreadable or malformed file leaves the store empty;
    /// the returned outcome says which case occurred.
    pub fn load(&mut self) -> LoadOutcome {
        let outcome = match read_json_file::<Vec<MemoryEntry>>(&self.path) {
            Ok(Some(entries)) => {
                let count = entries.len();
                self.entries = entries;
                debug!("Loaded {} memories from {:?}", count, self.path);
                LoadOutcome::Loaded { count }
            }
            Ok(None) => {
                self.entries.clear();
                LoadOutcome::Missing
            }
            Err(e) => {
                warn!("Error loading agent memory from {:?}: {}", self.path, e);
                self.entries.clear();
                LoadOutcome::Recovered {
                    reason: e.to_string(),
                }
            }
        };
        self.last_load = outcome.clone();
        outcome
    }

    /// Write every entry to disk.
    pub fn save(&self) -> Result<()> {
        write_json_file(&self.path, &self.entries)
    }

    /// Save, logging instead of failing.
    fn persist(&mut self) {
        match self.save() {
            Ok(()) => self.last_save_error = None,
            Err(e) => {
                warn!("Error saving agent memory to {:?}: {}", self.path, e);
                self.last_save_error = Some(e.to_string());
            }
        }
    }

    /// Add a new memory and persist the store.
    ///
    /// The entry is returned even when writing the file failed; check
    /// [`last_save_error`](Self::last_save_error) for durability.
    pub fn add(&mut self, input: NewMemory) -> MemoryEntry {
        let entry = MemoryEntry::create(input);
        self.entries.push(entry.clone());
        self.persist();
        entry
    }

    /// Filter and rank memories.
    ///
    /// Filters apply in order: tags (any match), importance floor,
    /// case-insensitive substring. Results are sorted by importance, then
    /// timestamp, both descending, and cut to `limit`.
    pub fn search(&self, query: &MemoryQuery) -> Vec<MemoryEntry> {
        let needle = query.query.as_ref().map(|q| q.to_lowercase());

        let mut results: Vec<&MemoryEntry> = self
            .entries
            .iter()
            .filter(|m| query.tags.as_ref().is_none_or(|tags| m.has_any_tag(tags)))
            .filter(|m| m.importance >= query.min_importance)
            .filter(|m| {
                needle
                    .as_ref()
                    .is_none_or(|n| m.content.to_lowercase().contains(n.as_str()))
            })
            .collect();

        results.sort_by(|a, b| {
            b.importance
                .cmp(&a.importance)
                .then_with(|| b.timestamp.partial_cmp(&a.timestamp).unwrap_or(Ordering::Equal))
        });

        results.into_iter().take(query.limit).cloned().collect()
    }

    /// Newest memories first.
    pub fn get_recent(&self, limit: usize) -> Vec<MemoryEntry> {
        let mut sorted: Vec<&MemoryEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.timestamp.partial_cmp(&a.timestamp).unwrap_or(Ordering::Equal));
        sorted.into_iter().take(limit).cloned().collect()
    }

    /// Memories whose context maps `key` to exactly `value`, in insertion order.
    pub fn get_by_context(&self, key: &str, value: &ContextValue, limit: usize) -> Vec<MemoryEntry> {
        self.entries
            .iter()
            .filter(|m| m.context.get(key) == Some(value))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Look up a memory by id
    pub fn get(&self, id: &str) -> Option<&MemoryEntry> {
        self.entries.iter().find(|m| m.id == id)
    }

    /// Remove every memory and persist the empty store. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.persist();
        info!("Cleared {} memories", removed);
        removed
    }

    /// Drop memories that are older than `max_age_days` and less important
    /// than `min_importance`. Either condition alone keeps an entry.
    ///
    /// Returns the number of removed entries.
    pub fn prune(&mut self, max_age_days: u32, min_importance: i64) -> usize {
        self.prune_at(now_timestamp(), max_age_days, min_importance)
    }

    pub(crate) fn prune_at(&mut self, now: f64, max_age_days: u32, min_importance: i64) -> usize {
        let max_age_secs = f64::from(max_age_days) * SECONDS_PER_DAY;
        let before = self.entries.len();

        self.entries
            .retain(|m| m.age_secs(now) < max_age_secs || m.importance >= min_importance);

        let removed = before - self.entries.len();
        self.persist();
        info!(
            "Pruned {} memories (max_age_days={}, min_importance={})",
            removed, max_age_days, min_importance
        );
        removed
    }

    /// Counts, time range, mean importance and tag set.
    pub fn get_stats(&self) -> MemoryStats {
        if self.entries.is_empty() {
            return MemoryStats::default();
        }

        let timestamps = self.entries.iter().map(|m| m.timestamp);
        let oldest = timestamps.clone().fold(f64::INFINITY, f64::min);
        let newest = timestamps.fold(f64::NEG_INFINITY, f64::max);

        let importance_sum: f64 = self.entries.iter().map(|m| m.importance as f64).sum();

        let tags: BTreeSet<String> = self
            .entries
            .iter()
            .flat_map(|m| m.tags.iter().cloned())
            .collect();

        MemoryStats {
            total: self.entries.len(),
            oldest: format_timestamp(oldest),
            newest: format_timestamp(newest),
            avg_importance: importance_sum / self.entries.len() as f64,
            tags,
        }
    }

    /// All memories in insertion order
    pub fn entries(&self) -> &[MemoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Outcome of the most recent load
    pub fn last_load(&self) -> &LoadOutcome {
        &self.last_load
    }

    /// Error from the most recent failed save, cleared by the next success
    pub fn last_save_error(&self) -> Option<&str> {
        self.last_save_error.as_deref()
    }
}
