//! Per-rule record of links already notified.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::Result;

/// File extension of seen-set files.
const SEEN_SET_EXTENSION: &str = "cache";

/// Persistent seen-sets, one per rule.
///
/// `save` replaces the previous contents; it never merges.
pub trait SeenSetStore: Send + Sync {
    /// Links stored for a rule, empty if none were ever saved.
    fn load(&self, rule_name: &str) -> Result<HashSet<String>>;

    /// Replace the links stored for a rule.
    fn save(&self, rule_name: &str, links: &[String]) -> Result<()>;
}

/// Seen-sets kept as `<dir>/<rule>.cache`, one link per line.
#[derive(Debug, Clone)]
pub struct FileSeenSetStore {
    dir: PathBuf,
}

impl FileSeenSetStore {
    /// Store seen-sets under `dir`, created on first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the seen-set files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file for a rule.
    #[must_use]
    pub fn path_for(&self, rule_name: &str) -> PathBuf {
        self.dir.join(format!("{rule_name}.{SEEN_SET_EXTENSION}"))
    }
}

impl SeenSetStore for FileSeenSetStore {
    fn load(&self, rule_name: &str) -> Result<HashSet<String>> {
        let path = self.path_for(rule_name);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(rule = rule_name, path = %path.display(), "No seen-set yet");
                return Ok(HashSet::new());
            }
            Err(e) => return Err(e.into()),
        };

        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToString::to_string)
            .collect())
    }

    fn save(&self, rule_name: &str, links: &[String]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;

        let mut content = String::new();
        for link in links {
            content.push_str(link);
            content.push('\n');
        }

        let path = self.path_for(rule_name);
        std::fs::write(&path, content)?;
        tracing::debug!(rule = rule_name, count = links.len(), path = %path.display(), "Saved seen-set");
        Ok(())
    }
}

/// In-memory seen-sets.
#[derive(Debug, Default)]
pub struct MemorySeenSetStore {
    sets: Mutex<HashMap<String, Vec<String>>>,
}

impl MemorySeenSetStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Links last saved for a rule, in save order.
    #[must_use]
    pub fn saved(&self, rule_name: &str) -> Option<Vec<String>> {
        self.sets
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(rule_name)
            .cloned()
    }
}

impl SeenSetStore for MemorySeenSetStore {
    fn load(&self, rule_name: &str) -> Result<HashSet<String>> {
        Ok(self
            .saved(rule_name)
            .map(|links| links.into_iter().collect())
            .unwrap_or_default())
    }

    fn save(&self, rule_name: &str, links: &[String]) -> Result<()> {
        self.sets
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(rule_name.to_string(), links.to_vec());
        Ok(())
    }
}
