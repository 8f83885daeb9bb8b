use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::app_dirs::AppDirs;

/// Key under which the zone remembers that this machine already counted as a visitor
pub const HAS_VISITED_KEY: &str = "hasVisited";
/// Prefix of the last good profile stats blob, one entry per handle
pub const PROFILE_STATS_KEY: &str = "profileStats";

/// Cache key for one handle's stats. GitHub logins are case-insensitive.
pub fn profile_stats_key(handle: &str) -> String {
    format!("{PROFILE_STATS_KEY}:{}", handle.to_lowercase())
}

/// Small client-side key/value storage, the terminal stand-in for a browser's
/// local storage. Callers treat every failure as "nothing stored".
pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
}

/// JSON object on disk, one entry per key
#[derive(Debug)]
pub struct FileLocalStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileLocalStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self::with_path(AppDirs::local_store_path())
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    fn read_all(&self) -> HashMap<String, String> {
        fs::read(&self.path)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .unwrap_or_default()
    }
}

impl Default for FileLocalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalStore for FileLocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut entries = self.read_all();
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(&entries)?;
        fs::write(&self.path, data)
    }
}

/// Process-local store for headless runs and tests
#[derive(Debug, Default)]
pub struct MemoryLocalStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryLocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_store_roundtrips_values() {
        let dir = tempdir().unwrap();
        let store = FileLocalStore::with_path(dir.path().join("state").join("local.json"));

        assert_eq!(store.get(HAS_VISITED_KEY), None);
        store.set(HAS_VISITED_KEY, "true").unwrap();
        store.set(PROFILE_STATS_KEY, "{}").unwrap();

        assert_eq!(store.get(HAS_VISITED_KEY).as_deref(), Some("true"));
        assert_eq!(store.get(PROFILE_STATS_KEY).as_deref(), Some("{}"));
    }

    #[test]
    fn file_store_overwrites_existing_key() {
        let dir = tempdir().unwrap();
        let store = FileLocalStore::with_path(dir.path().join("local.json"));

        store.set(PROFILE_STATS_KEY, "old").unwrap();
        store.set(PROFILE_STATS_KEY, "new").unwrap();

        assert_eq!(store.get(PROFILE_STATS_KEY).as_deref(), Some("new"));
    }

    #[test]
    fn profile_key_is_per_handle() {
        assert_eq!(profile_stats_key("zidanXcode"), "profileStats:zidanxcode");
        assert_eq!(profile_stats_key("ZIDANXCODE"), profile_stats_key("zidanxcode"));
        assert_ne!(profile_stats_key("octocat"), profile_stats_key("zidanXcode"));
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("local.json");
        fs::write(&path, b"not json").unwrap();
        let store = FileLocalStore::with_path(&path);

        assert_eq!(store.get(HAS_VISITED_KEY), None);
        store.set(HAS_VISITED_KEY, "true").unwrap();
        assert_eq!(store.get(HAS_VISITED_KEY).as_deref(), Some("true"));
    }

    #[test]
    fn unwritable_path_reports_error() {
        let dir = tempdir().unwrap();
        // a regular file where the parent directory should be
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();
        let store = FileLocalStore::with_path(blocker.join("local.json"));

        assert!(store.set(HAS_VISITED_KEY, "true").is_err());
        assert_eq!(store.get(HAS_VISITED_KEY), None);
    }

    #[test]
    fn memory_store_roundtrips_values() {
        let store = MemoryLocalStore::new();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));
        assert_eq!(store.get("missing"), None);
    }
}
