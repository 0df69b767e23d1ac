//! File-backed [`KeyValueStore`].
//!
//! The whole store is one JSON object (`{"key": "value", ...}`) kept in
//! memory and written back to disk after every `set`/`remove`. Writes go to
//! a `.tmp` sibling first and are renamed into place. A missing file is an
//! empty store. An unreadable file is moved aside to a `.corrupt` sibling
//! and the store starts empty, so the client still starts and the old bytes
//! are kept.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::KeyValueStore;
use crate::logging::log_event;

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`, loading existing entries if the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path);
        Self { path, entries }
    }

    /// Default location: `~/.mindful/storage.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".mindful").join("storage.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json =
            serde_json::to_string_pretty(&self.entries).context("failed to encode storage")?;
        let tmp = sibling(&self.path, "tmp");
        fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))
    }
}

fn load_entries(path: &Path) -> BTreeMap<String, String> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            log_event(&format!("storage read failed path={}: {e}", path.display()));
            return BTreeMap::new();
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(entries) => entries,
        Err(e) => {
            let aside = sibling(path, "corrupt");
            match fs::rename(path, &aside) {
                Ok(()) => log_event(&format!(
                    "storage file unreadable ({e}); moved to {}",
                    aside.display()
                )),
                Err(rename_err) => log_event(&format!(
                    "storage file unreadable ({e}); could not move aside: {rename_err}"
                )),
            }
            BTreeMap::new()
        }
    }
}

/// `storage.json` -> `storage.json.<suffix>` in the same directory.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nope.json"));
        assert_eq!(store.get("anything"), None);
    }

    #[test]
    fn writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let mut store = FileStore::open(&path);
        store.set("mindfulChatDraft", "\"hello\"").unwrap();
        store.set("other", "1").unwrap();
        store.remove("other").unwrap();

        let reopened = FileStore::open(&path);
        assert_eq!(
            reopened.get("mindfulChatDraft").as_deref(),
            Some("\"hello\"")
        );
        assert_eq!(reopened.get("other"), None);
    }

    #[test]
    fn malformed_file_is_moved_aside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json").unwrap();

        let mut store = FileStore::open(&path);
        assert_eq!(store.get("x"), None);
        let aside = dir.path().join("storage.json.corrupt");
        assert_eq!(fs::read_to_string(&aside).unwrap(), "{not json");

        store.set("x", "1").unwrap();
        assert_eq!(FileStore::open(&path).get("x").as_deref(), Some("1"));
        assert_eq!(fs::read_to_string(&aside).unwrap(), "{not json");
    }

    #[test]
    fn flush_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let mut store = FileStore::open(&path);
        store.set("k", "v").unwrap();

        assert!(path.exists());
        assert!(!dir.path().join("storage.json.tmp").exists());
    }
}
