//! Agent Memory
//!
//! A durable list of timestamped, tagged facts. Queries are full scans:
//! - `search`: tag, importance and substring filters, ranked by importance then recency
//! - `get_recent`: newest first
//! - `get_by_context`: exact match on one context key, insertion order
//!
//! `prune` drops entries that are both old and unimportant.

mod store;
mod types;

pub use store::{AgentMemoryStore, DEFAULT_PRUNE_MAX_AGE_DAYS, DEFAULT_PRUNE_MIN_IMPORTANCE};
pub use types::{MemoryEntry, MemoryQuery, MemoryStats, NewMemory, DEFAULT_IMPORTANCE};
