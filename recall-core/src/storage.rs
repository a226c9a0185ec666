//! Storage root resolution and JSON file persistence.
//!
//! The host supplies a writable base directory through [`StorageRoot`];
//! everything beneath it is laid out here:
//!
//! ```text
//! <base>/agent_memory.json
//! <base>/projects/<md5 of project root>.json
//! ```

use crate::error::{Error, Result};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the agent-wide memory store
pub const AGENT_MEMORY_FILE: &str = "agent_memory.json";

/// Directory holding one knowledge file per project
pub const PROJECTS_DIR: &str = "projects";

/// Extension of project knowledge files
pub const PROJECT_FILE_EXTENSION: &str = "json";

/// Resolves the writable base directory for all stores.
pub trait StorageRoot {
    fn base_dir(&self) -> Result<PathBuf>;

    /// Path of the agent-wide memory file
    fn agent_memory_path(&self) -> Result<PathBuf> {
        Ok(self.base_dir()?.join(AGENT_MEMORY_FILE))
    }

    /// Directory holding project knowledge files
    fn projects_dir(&self) -> Result<PathBuf> {
        Ok(self.base_dir()?.join(PROJECTS_DIR))
    }
}

/// A base directory chosen by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedRoot(pub PathBuf);

impl FixedRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }
}

impl StorageRoot for FixedRoot {
    fn base_dir(&self) -> Result<PathBuf> {
        Ok(self.0.clone())
    }
}

/// The platform data directory.
///
/// Resolves to the `directories` data dir for `dev.recall.recall`, falling
/// back to `~/.recall`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRoot;

impl StorageRoot for DefaultRoot {
    fn base_dir(&self) -> Result<PathBuf> {
        default_data_dir().ok_or_else(|| Error::storage_root("no data or home directory available"))
    }
}

/// Platform data directory, if one can be determined.
pub fn default_data_dir() -> Option<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("dev", "recall", "recall") {
        Some(proj_dirs.data_dir().to_path_buf())
    } else {
        dirs::home_dir().map(|home| home.join(".recall"))
    }
}

/// Result of loading a store from disk.
///
/// Loading never fails from the caller's point of view; this records
/// which path was taken so callers and tests can tell them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// File parsed successfully
    Loaded { count: usize },
    /// No file yet; started from the default state
    Missing,
    /// File unreadable or malformed; reset to the default state
    Recovered { reason: String },
}

impl LoadOutcome {
    pub fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered { .. })
    }
}

/// Read and parse a JSON file. `Ok(None)` when the file does not exist.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&content)?))
}

/// Serialize `value` as pretty JSON and replace `path` with it.
///
/// The document is written to a sibling temp file first and renamed into
/// place, so a crash mid-write leaves the previous file intact.
pub fn write_json_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let content = serde_json::to_string_pretty(value)?;
    let temp_path = temp_path_for(path);
    fs::write(&temp_path, content)?;
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    debug!("Wrote {:?}", path);
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
