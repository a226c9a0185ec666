//! Project knowledge accumulated across sessions.
//!
//! One JSON document per project root, stored at
//! `<base>/projects/<md5 of the absolute root>.json`. The same root always
//! maps to the same file.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::Result;
use crate::storage::{read_json_file, write_json_file, LoadOutcome, StorageRoot, PROJECT_FILE_EXTENSION};
use crate::utils::{now_timestamp, path_key};

/// Returned by [`ProjectMemory::get_context_summary`] when nothing has been learned
pub const NO_KNOWLEDGE_SUMMARY: &str = "No learned patterns yet";

/// How many conventions / patterns the summary lists
const SUMMARY_ITEMS: usize = 5;

/// A pattern observed in the project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnedPattern {
    pub pattern: String,
    pub description: String,
    pub timestamp: f64,
}

/// The per-project knowledge document.
///
/// Keys this version does not know about are kept in `extra` and written
/// back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectKnowledge {
    #[serde(default)]
    pub file_patterns: BTreeMap<String, Value>,
    #[serde(default)]
    pub coding_conventions: Vec<String>,
    #[serde(default)]
    pub common_imports: Vec<String>,
    #[serde(default)]
    pub project_structure: BTreeMap<String, Value>,
    #[serde(default)]
    pub learned_patterns: Vec<LearnedPattern>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectKnowledge {
    pub fn is_empty(&self) -> bool {
        self.coding_conventions.is_empty() && self.learned_patterns.is_empty()
    }
}

/// Knowledge store for a single project.
#[derive(Debug)]
pub struct ProjectMemory {
    project_root: PathBuf,
    storage_path: PathBuf,
    knowledge: ProjectKnowledge,
    last_load: LoadOutcome,
    last_save_error: Option<String>,
}

impl ProjectMemory {
    /// Open the knowledge document for `project_root` beneath a storage root.
    pub fn open(root: &impl StorageRoot, project_root: impl AsRef<Path>) -> Result<Self> {
        let project_root = absolute_root(project_root.as_ref());
        let storage_path = Self::storage_path_in(&root.projects_dir()?, &project_root);

        let mut memory = Self {
            project_root,
            storage_path,
            knowledge: ProjectKnowledge::default(),
            last_load: LoadOutcome::Missing,
            last_save_error: None,
        };
        memory.load();
        Ok(memory)
    }

    /// File holding the document for `project_root` inside `projects_dir`
    pub fn storage_path_in(projects_dir: &Path, project_root: &Path) -> PathBuf {
        projects_dir
            .join(path_key(project_root))
            .with_extension(PROJECT_FILE_EXTENSION)
    }

    /// Reload from disk, falling back to an empty document.
    pub fn load(&mut self) -> LoadOutcome {
        let outcome = match read_json_file::<ProjectKnowledge>(&self.storage_path) {
            Ok(Some(knowledge)) => {
                let count = knowledge.coding_conventions.len() + knowledge.learned_patterns.len();
                self.knowledge = knowledge;
                debug!("Loaded project knowledge for {:?}", self.project_root);
                LoadOutcome::Loaded { count }
            }
            Ok(None) => {
                self.knowledge = ProjectKnowledge::default();
                LoadOutcome::Missing
            }
            Err(e) => {
                warn!("Error loading project memory from {:?}: {}", self.storage_path, e);
                self.knowledge = ProjectKnowledge::default();
                LoadOutcome::Recovered {
                    reason: e.to_string(),
                }
            }
        };
        self.last_load = outcome.clone();
        outcome
    }

    /// Write the document to disk.
    pub fn save(&self) -> Result<()> {
        write_json_file(&self.storage_path, &self.knowledge)
    }

    fn persist(&mut self) {
        match self.save() {
            Ok(()) => self.last_save_error = None,
            Err(e) => {
                warn!("Error saving project memory to {:?}: {}", self.storage_path, e);
                self.last_save_error = Some(e.to_string());
            }
        }
    }

    /// Record a pattern. Patterns are not deduplicated.
    pub fn learn_pattern(
        &mut self,
        pattern: impl Into<String>,
        description: impl Into<String>,
    ) -> LearnedPattern {
        let learned = LearnedPattern {
            pattern: pattern.into(),
            description: description.into(),
            timestamp: now_timestamp(),
        };
        self.knowledge.learned_patterns.push(learned.clone());
        self.persist();
        learned
    }

    /// Record a coding convention unless it is already known.
    ///
    /// Returns `true` if the convention was new (and the file was rewritten).
    pub fn learn_convention(&mut self, convention: impl Into<String>) -> bool {
        let convention = convention.into();
        if self.knowledge.coding_conventions.contains(&convention) {
            return false;
        }
        self.knowledge.coding_conventions.push(convention);
        self.persist();
        true
    }

    /// Record an import the project uses often. Same dedup rule as conventions.
    pub fn add_common_import(&mut self, import: impl Into<String>) -> bool {
        let import = import.into();
        if self.knowledge.common_imports.contains(&import) {
            return false;
        }
        self.knowledge.common_imports.push(import);
        self.persist();
        true
    }

    /// Set the pattern associated with a file kind (e.g. `"controller"`).
    pub fn record_file_pattern(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.knowledge.file_patterns.insert(key.into(), value.into());
        self.persist();
    }

    /// Set one entry of the project structure map (e.g. `"models_dir"`).
    pub fn set_structure(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.knowledge.project_structure.insert(key.into(), value.into());
        self.persist();
    }

    /// Human-readable digest for prompt injection.
    ///
    /// Lists the first five conventions and the five most recent patterns.
    pub fn get_context_summary(&self) -> String {
        let mut parts = Vec::new();

        if !self.knowledge.coding_conventions.is_empty() {
            let lines: Vec<String> = self
                .knowledge
                .coding_conventions
                .iter()
                .take(SUMMARY_ITEMS)
                .map(|c| format!("- {}", c))
                .collect();
            parts.push(format!("Coding conventions:\n{}", lines.join("\n")));
        }

        let patterns = &self.knowledge.learned_patterns;
        if !patterns.is_empty() {
            let lines: Vec<String> = patterns[patterns.len().saturating_sub(SUMMARY_ITEMS)..]
                .iter()
                .map(|p| format!("- {}", p.description))
                .collect();
            parts.push(format!("Common patterns:\n{}", lines.join("\n")));
        }

        if parts.is_empty() {
            NO_KNOWLEDGE_SUMMARY.to_string()
        } else {
            parts.join("\n\n")
        }
    }

    pub fn knowledge(&self) -> &ProjectKnowledge {
        &self.knowledge
    }

    pub fn conventions(&self) -> &[String] {
        &self.knowledge.coding_conventions
    }

    pub fn patterns(&self) -> &[LearnedPattern] {
        &self.knowledge.learned_patterns
    }

    pub fn common_imports(&self) -> &[String] {
        &self.knowledge.common_imports
    }

    /// Absolute project root this document belongs to
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    pub fn last_load(&self) -> &LoadOutcome {
        &self.last_load
    }

    pub fn last_save_error(&self) -> Option<&str> {
        self.last_save_error.as_deref()
    }
}

fn absolute_root(project_root: &Path) -> PathBuf {
    std::path::absolute(project_root).unwrap_or_else(|_| project_root.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FixedRoot;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_same_root_same_file() {
        let dir = tempdir().unwrap();
        let root = FixedRoot::new(dir.path());

        let a = ProjectMemory::open(&root, "/work/shop").unwrap();
        let b = ProjectMemory::open(&root, "/work/shop").unwrap();
        let c = ProjectMemory::open(&root, "/work/blog").unwrap();

        assert_eq!(a.storage_path(), b.storage_path());
        assert_ne!(a.storage_path(), c.storage_path());
        assert!(a.storage_path().starts_with(dir.path().join("projects")));
        assert_eq!(a.storage_path().extension().unwrap(), "json");
    }

    #[test]
    fn test_learn_convention_dedups() {
        let dir = tempdir().unwrap();
        let root = FixedRoot::new(dir.path());
        let mut memory = ProjectMemory::open(&root, "/work/shop").unwrap();

        assert!(memory.learn_convention("Use strict types"));
        assert!(!memory.learn_convention("Use strict types"));
        assert!(memory.learn_convention("PSR-12 formatting"));

        assert_eq!(memory.conventions(), &["Use strict types", "PSR-12 formatting"]);

        let reloaded = ProjectMemory::open(&root, "/work/shop").unwrap();
        assert_eq!(reloaded.conventions(), memory.conventions());
    }

    #[test]
    fn test_duplicate_convention_skips_write() {
        let dir = tempdir().unwrap();
        let root = FixedRoot::new(dir.path());
        let mut memory = ProjectMemory::open(&root, "/work/shop").unwrap();
        memory.learn_convention("Use strict types");

        fs::remove_file(memory.storage_path()).unwrap();
        assert!(!memory.learn_convention("Use strict types"));
        assert!(!memory.storage_path().exists());
    }

    #[test]
    fn test_learn_pattern_keeps_duplicates() {
        let dir = tempdir().unwrap();
        let root = FixedRoot::new(dir.path());
        let mut memory = ProjectMemory::open(&root, "/work/shop").unwrap();

        memory.learn_pattern("Repository", "Repositories wrap Eloquent queries");
        memory.learn_pattern("Repository", "Repositories wrap Eloquent queries");
        assert_eq!(memory.patterns().len(), 2);

        let reloaded = ProjectMemory::open(&root, "/work/shop").unwrap();
        assert_eq!(reloaded.patterns(), memory.patterns());
    }

    #[test]
    fn test_summary_sentinel_when_empty() {
        let dir = tempdir().unwrap();
        let memory = ProjectMemory::open(&FixedRoot::new(dir.path()), "/work/empty").unwrap();
        assert_eq!(memory.get_context_summary(), NO_KNOWLEDGE_SUMMARY);
    }

    #[test]
    fn test_summary_limits_and_order() {
        let dir = tempdir().unwrap();
        let mut memory = ProjectMemory::open(&FixedRoot::new(dir.path()), "/work/shop").unwrap();

        for i in 1..=7 {
            memory.learn_convention(format!("convention {i}"));
            memory.learn_pattern(format!("p{i}"), format!("pattern {i}"));
        }

        let summary = memory.get_context_summary();
        let expected = "Coding conventions:\n\
            - convention 1\n- convention 2\n- convention 3\n- convention 4\n- convention 5\n\
            \n\
            Common patterns:\n\
            - pattern 3\n- pattern 4\n- pattern 5\n- pattern 6\n- pattern 7";
        assert_eq!(summary, expected);
    }

    #[test]
    fn test_summary_patterns_only() {
        let dir = tempdir().unwrap();
        let mut memory = ProjectMemory::open(&FixedRoot::new(dir.path()), "/work/shop").unwrap();
        memory.learn_pattern("Service", "Services hold business logic");

        assert_eq!(
            memory.get_context_summary(),
            "Common patterns:\n- Services hold business logic"
        );
    }

    #[test]
    fn test_unknown_fields_roundtrip() {
        let dir = tempdir().unwrap();
        let root = FixedRoot::new(dir.path());
        let path = ProjectMemory::storage_path_in(
            &root.projects_dir().unwrap(),
            Path::new("/work/shop"),
        );
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            json!({
                "coding_conventions": ["tabs"],
                "framework_version": "10.x",
            })
            .to_string(),
        )
        .unwrap();

        let mut memory = ProjectMemory::open(&root, "/work/shop").unwrap();
        assert_eq!(memory.last_load(), &LoadOutcome::Loaded { count: 1 });
        assert_eq!(memory.knowledge().extra["framework_version"], json!("10.x"));

        memory.learn_convention("spaces in YAML");

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["framework_version"], json!("10.x"));
        assert_eq!(raw["coding_conventions"], json!(["tabs", "spaces in YAML"]));
        assert_eq!(raw["learned_patterns"], json!([]));
    }

    #[test]
    fn test_corrupt_file_yields_default() {
        let dir = tempdir().unwrap();
        let root = FixedRoot::new(dir.path());
        let path = ProjectMemory::storage_path_in(
            &root.projects_dir().unwrap(),
            Path::new("/work/shop"),
        );
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "garbage").unwrap();

        let memory = ProjectMemory::open(&root, "/work/shop").unwrap();
        assert!(memory.last_load().is_recovered());
        assert!(memory.knowledge().is_empty());
        assert_eq!(memory.knowledge(), &ProjectKnowledge::default());
    }

    #[test]
    fn test_structure_imports_and_file_patterns() {
        let dir = tempdir().unwrap();
        let root = FixedRoot::new(dir.path());
        let mut memory = ProjectMemory::open(&root, "/work/shop").unwrap();

        assert!(memory.add_common_import("Illuminate\\Support\\Facades\\DB"));
        assert!(!memory.add_common_import("Illuminate\\Support\\Facades\\DB"));
        memory.record_file_pattern("controller", "app/Http/Controllers/*Controller.php");
        memory.set_structure("models_dir", "app/Models");
        memory.set_structure("has_tests", true);

        let reloaded = ProjectMemory::open(&root, "/work/shop").unwrap();
        let knowledge = reloaded.knowledge();
        assert_eq!(knowledge.common_imports.len(), 1);
        assert_eq!(
            knowledge.file_patterns["controller"],
            json!("app/Http/Controllers/*Controller.php")
        );
        assert_eq!(knowledge.project_structure["has_tests"], json!(true));
    }

    #[test]
    fn test_save_failure_keeps_state() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file").unwrap();

        let mut memory = ProjectMemory::open(&FixedRoot::new(&blocker), "/work/shop").unwrap();
        memory.learn_pattern("X", "still kept in memory");

        assert_eq!(memory.patterns().len(), 1);
        assert!(memory.last_save_error().is_some());
    }
}
