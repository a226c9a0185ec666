//! Memory Type Definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::{null_as_empty_context, Context, ContextValue};
use crate::utils::{memory_id, now_timestamp};

/// Importance assigned when the caller does not pick one
pub const DEFAULT_IMPORTANCE: i64 = 5;

/// A single remembered fact.
///
/// Created once through [`AgentMemoryStore::add`](super::AgentMemoryStore::add)
/// and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub id: String,
    pub content: String,
    /// Seconds since the Unix epoch
    pub timestamp: f64,
    #[serde(default, deserialize_with = "null_as_empty_context")]
    pub context: Context,
    /// Conceptually 1-10, not validated
    #[serde(default = "default_importance")]
    pub importance: i64,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_importance() -> i64 {
    DEFAULT_IMPORTANCE
}

impl MemoryEntry {
    /// Build an entry stamped with the current time and a fresh id
    pub(crate) fn create(input: NewMemory) -> Self {
        let timestamp = now_timestamp();
        Self {
            id: memory_id(&input.content, timestamp),
            content: input.content,
            timestamp,
            context: input.context,
            importance: input.importance,
            tags: input.tags,
        }
    }

    /// Whether any of `tags` is attached to this entry (exact, case-sensitive)
    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        tags.iter().any(|t| self.tags.contains(t))
    }

    /// Age in seconds relative to `now`
    pub fn age_secs(&self, now: f64) -> f64 {
        now - self.timestamp
    }
}

/// Input for [`AgentMemoryStore::add`](super::AgentMemoryStore::add)
#[derive(Debug, Clone, PartialEq)]
pub struct NewMemory {
    pub content: String,
    pub context: Context,
    pub importance: i64,
    pub tags: Vec<String>,
}

impl NewMemory {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            context: Context::new(),
            importance: DEFAULT_IMPORTANCE,
            tags: Vec::new(),
        }
    }

    /// Replace the whole context map
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Add one context key
    pub fn context_entry(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn with_importance(mut self, importance: i64) -> Self {
        self.importance = importance;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Filters for [`AgentMemoryStore::search`](super::AgentMemoryStore::search)
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryQuery {
    /// Case-insensitive substring of `content`
    pub query: Option<String>,
    /// Keep entries sharing at least one of these tags
    pub tags: Option<Vec<String>>,
    pub min_importance: i64,
    pub limit: usize,
}

impl Default for MemoryQuery {
    fn default() -> Self {
        Self {
            query: None,
            tags: None,
            min_importance: 0,
            limit: 10,
        }
    }
}

impl MemoryQuery {
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Default::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_min_importance(mut self, min_importance: i64) -> Self {
        self.min_importance = min_importance;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Summary of an [`AgentMemoryStore`](super::AgentMemoryStore)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total: usize,
    /// RFC 3339 time of the oldest entry, `None` when empty
    pub oldest: Option<String>,
    pub newest: Option<String>,
    /// Mean importance, 0 when empty
    pub avg_importance: f64,
    pub tags: BTreeSet<String>,
}
