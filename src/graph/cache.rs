//! Persistent diagram cache capability and adapters.
//!
//! The core depends on the [`DiagramCache`] trait, not on any particular
//! storage. The file-backed adapter gives cache entries a lifetime beyond
//! one session, which is what makes the offline fallback useful after a
//! restart.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Lookup/store capability for raw diagram payloads, keyed by request URL.
pub trait DiagramCache {
    /// Return the cached payload for a key, if any.
    fn lookup(&self, key: &str) -> Option<String>;

    /// Store a payload under a key, replacing any previous entry.
    fn store(&mut self, key: &str, payload: &str);
}

/// Purely in-memory cache. No persistence; mostly useful when a cache file
/// is not wanted.
#[derive(Debug, Default)]
pub struct MemoryDiagramCache {
    entries: HashMap<String, String>,
}

impl DiagramCache for MemoryDiagramCache {
    fn lookup(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn store(&mut self, key: &str, payload: &str) {
        self.entries.insert(key.to_string(), payload.to_string());
    }
}

/// File-backed cache: a JSON object mapping request URLs to payloads,
/// written through on every store.
///
/// A missing or unreadable file yields an empty cache rather than an
/// error; persistence failures are logged and otherwise ignored, since the
/// cache is a fallback and never required for correct operation.
#[derive(Debug)]
pub struct FileDiagramCache {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileDiagramCache {
    /// Open a cache file, loading any existing entries.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::load(&path);
        Self { path, entries }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> HashMap<String, String> {
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring corrupt cache file");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        }
    }

    fn persist(&self) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!(path = %self.path.display(), error = %e, "cannot create cache directory");
                return;
            }
        }
        match serde_json::to_string(&self.entries) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.path, json) {
                    warn!(path = %self.path.display(), error = %e, "cache write failed");
                }
            }
            Err(e) => warn!(error = %e, "cache serialization failed"),
        }
    }
}

impl DiagramCache for FileDiagramCache {
    fn lookup(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn store(&mut self, key: &str, payload: &str) {
        self.entries.insert(key.to_string(), payload.to_string());
        self.persist();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_cache_lookup_and_store() {
        let mut cache = MemoryDiagramCache::default();
        assert!(cache.lookup("http://x/api/mermaid/skills").is_none());

        cache.store("http://x/api/mermaid/skills", "{\"graph_syntax\":\"graph TD\"}");
        assert_eq!(
            cache.lookup("http://x/api/mermaid/skills").as_deref(),
            Some("{\"graph_syntax\":\"graph TD\"}")
        );
    }

    #[test]
    fn test_file_cache_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diagrams.json");

        let mut cache = FileDiagramCache::open(&path);
        cache.store("http://x/api/mermaid/swarms", "{\"graph_syntax\":\"graph LR\"}");
        drop(cache);

        let reopened = FileDiagramCache::open(&path);
        assert_eq!(
            reopened.lookup("http://x/api/mermaid/swarms").as_deref(),
            Some("{\"graph_syntax\":\"graph LR\"}")
        );
    }

    #[test]
    fn test_file_cache_tolerates_missing_and_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();

        let cache = FileDiagramCache::open(dir.path().join("absent.json"));
        assert!(cache.lookup("anything").is_none());

        let corrupt = dir.path().join("corrupt.json");
        fs::write(&corrupt, "not json at all").unwrap();
        let cache = FileDiagramCache::open(&corrupt);
        assert!(cache.lookup("anything").is_none());
    }

    #[test]
    fn test_file_cache_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/diagrams.json");

        let mut cache = FileDiagramCache::open(&nested);
        cache.store("key", "payload");
        assert!(nested.exists());
    }
}
