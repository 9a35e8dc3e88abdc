use crate::error::{OnboardError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// SnapshotStore
// ---------------------------------------------------------------------------

/// Key-value persistence for session snapshots. Callers treat writes as
/// best-effort; ordering across keys is not relied upon.
pub trait SnapshotStore {
    fn save_snapshot(&mut self, key: &str, value: &Value) -> Result<()>;
    fn load_snapshot(&self, key: &str) -> Result<Option<Value>>;
    fn remove_snapshot(&mut self, key: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// One pretty-printed JSON file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SnapshotStore for FileStore {
    fn save_snapshot(&mut self, key: &str, value: &Value) -> Result<()> {
        let data = serde_json::to_string_pretty(value)?;
        crate::io::atomic_write(&self.key_path(key), data.as_bytes())
    }

    fn load_snapshot(&self, key: &str) -> Result<Option<Value>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&data)?))
    }

    fn remove_snapshot(&mut self, key: &str) -> Result<()> {
        crate::io::remove_if_present(&self.key_path(key))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Value>,
    fail_writes: bool,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent save fail, as a full or unavailable disk would.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Number of successful saves.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }
}

impl SnapshotStore for MemoryStore {
    fn save_snapshot(&mut self, key: &str, value: &Value) -> Result<()> {
        if self.fail_writes {
            return Err(OnboardError::Io(std::io::Error::other(format!(
                "snapshot store unavailable for '{key}'"
            ))));
        }
        self.entries.insert(key.to_string(), value.clone());
        self.writes += 1;
        Ok(())
    }

    fn load_snapshot(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.get(key).cloned())
    }

    fn remove_snapshot(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
