//! recall-core - Local memory layer for coding agents
//!
//! This crate gives an agent persistence across sessions without any server:
//!
//! - **memory**: Timestamped, tagged memory entries with ranked search and pruning
//! - **conversation**: Bounded conversation buffer with token-budgeted windows
//! - **project**: Per-project knowledge (conventions, learned patterns, structure)
//! - **global**: Process-wide shared memory store
//! - **storage**: Storage root resolution and JSON file persistence
//! - **config**: Configuration loaded from TOML and environment
//!
//! Every store loads its JSON file on construction and rewrites it in full
//! on each mutation. Persistence failures are logged and never surfaced
//! through the mutating operations themselves.

pub mod config;
pub mod conversation;
pub mod error;
pub mod global;
pub mod memory;
pub mod project;
pub mod storage;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::RecallConfig;
pub use conversation::{ConversationMemory, ConversationSnapshot, Message};
pub use error::{Error, Result};
pub use global::{global_store, init_global_store, SharedMemoryStore};
pub use memory::{AgentMemoryStore, MemoryEntry, MemoryQuery, MemoryStats, NewMemory};
pub use project::{LearnedPattern, ProjectKnowledge, ProjectMemory};
pub use storage::{DefaultRoot, FixedRoot, LoadOutcome, StorageRoot};
pub use types::{Context, ContextValue};
