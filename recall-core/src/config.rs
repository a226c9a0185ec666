//! Configuration for recall.
//!
//! Configuration is loaded from multiple sources with precedence:
//! 1. Environment variables (`RECALL_DATA_DIR`)
//! 2. Config file (`RECALL_CONFIG`, or `<data dir>/config.toml`)
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::conversation::{DEFAULT_CONTEXT_TOKENS, DEFAULT_MAX_MESSAGES};
use crate::error::{Error, Result};
use crate::memory::{DEFAULT_IMPORTANCE, DEFAULT_PRUNE_MAX_AGE_DAYS, DEFAULT_PRUNE_MIN_IMPORTANCE};
use crate::storage::{default_data_dir, StorageRoot};

/// Overrides the config file location
pub const CONFIG_PATH_ENV: &str = "RECALL_CONFIG";

/// Overrides the storage base directory
pub const DATA_DIR_ENV: &str = "RECALL_DATA_DIR";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecallConfig {
    /// Base directory for all stores
    #[serde(default = "fallback_data_dir")]
    pub data_dir: PathBuf,

    /// Agent memory settings
    #[serde(default)]
    pub memory: MemorySettings,

    /// Conversation buffer settings
    #[serde(default)]
    pub conversation: ConversationSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySettings {
    /// Importance for memories added without one (default: 5)
    #[serde(default = "default_importance")]
    pub default_importance: i64,

    /// Default number of search results (default: 10)
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Prune age threshold in days (default: 30)
    #[serde(default = "default_prune_max_age_days")]
    pub prune_max_age_days: u32,

    /// Prune importance floor (default: 3)
    #[serde(default = "default_prune_min_importance")]
    pub prune_min_importance: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSettings {
    /// Messages retained before the oldest are dropped (default: 50)
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,

    /// Token budget for context windows (default: 2000)
    #[serde(default = "default_context_tokens")]
    pub context_tokens: usize,
}

// Default value functions
fn fallback_data_dir() -> PathBuf {
    default_data_dir().unwrap_or_else(|| PathBuf::from(".recall"))
}

fn default_importance() -> i64 {
    DEFAULT_IMPORTANCE
}

fn default_search_limit() -> usize {
    10
}

fn default_prune_max_age_days() -> u32 {
    DEFAULT_PRUNE_MAX_AGE_DAYS
}

fn default_prune_min_importance() -> i64 {
    DEFAULT_PRUNE_MIN_IMPORTANCE
}

fn default_max_messages() -> usize {
    DEFAULT_MAX_MESSAGES
}

fn default_context_tokens() -> usize {
    DEFAULT_CONTEXT_TOKENS
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            default_importance: default_importance(),
            search_limit: default_search_limit(),
            prune_max_age_days: default_prune_max_age_days(),
            prune_min_importance: default_prune_min_importance(),
        }
    }
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            max_messages: default_max_messages(),
            context_tokens: default_context_tokens(),
        }
    }
}

impl Default for RecallConfig {
    fn default() -> Self {
        Self {
            data_dir: fallback_data_dir(),
            memory: MemorySettings::default(),
            conversation: ConversationSettings::default(),
        }
    }
}

impl RecallConfig {
    /// Load configuration from file and environment.
    pub fn load() -> Result<Self> {
        let data_dir = std::env::var_os(DATA_DIR_ENV).map(PathBuf::from);
        Self::load_with(&Self::config_path(), data_dir)
    }

    /// Load from `config_path`, then apply a data directory override.
    ///
    /// A missing file yields defaults; a malformed one is an error.
    pub fn load_with(config_path: &Path, data_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        if let Some(dir) = data_dir {
            config.data_dir = dir;
        }

        config.validate()?;
        debug!("Loaded config (data_dir={:?})", config.data_dir);
        Ok(config)
    }

    /// Get the config file path.
    pub fn config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            PathBuf::from(path)
        } else {
            fallback_data_dir().join("config.toml")
        }
    }

    /// Set the data directory
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Set memory settings
    pub fn with_memory(mut self, memory: MemorySettings) -> Self {
        self.memory = memory;
        self
    }

    /// Set conversation settings
    pub fn with_conversation(mut self, conversation: ConversationSettings) -> Self {
        self.conversation = conversation;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.conversation.max_messages == 0 {
            return Err(Error::config(
                "conversation.max_messages",
                "must be greater than 0",
            ));
        }

        if self.conversation.context_tokens == 0 {
            return Err(Error::config(
                "conversation.context_tokens",
                "must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl StorageRoot for RecallConfig {
    fn base_dir(&self) -> Result<PathBuf> {
        Ok(self.data_dir.clone())
    }
}
