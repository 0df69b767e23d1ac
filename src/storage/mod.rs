//! Key-value storage port for persisted client state.
//!
//! Everything the chat client remembers between runs (settings, history,
//! the in-progress draft) goes through [`KeyValueStore`]. Values are
//! JSON-encoded strings and a missing key is a normal state, not an error.
//!
//! Two implementations ship with the crate:
//!
//! - [`MemoryStore`]: process-local map, used by tests and `--ephemeral`.
//! - [`FileStore`]: a single JSON object on disk (`~/.mindful/storage.json`
//!   by default), rewritten on every mutation.

use std::collections::BTreeMap;

use anyhow::Result;

mod file;

pub use file::FileStore;

/// Storage key for the settings object.
pub const SETTINGS_KEY: &str = "mindfulChatSettings";

/// Storage key for the exchange history array.
pub const HISTORY_KEY: &str = "mindfulChatHistory";

/// Storage key for the unsent input draft.
pub const DRAFT_KEY: &str = "mindfulChatDraft";

/// String key-value storage, last write wins.
pub trait KeyValueStore {
    /// Return the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Removing an absent key succeeds.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory [`KeyValueStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &mut T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_set_get_remove() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("a"), None);

        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").as_deref(), Some("2"));
        assert_eq!(store.len(), 1);

        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn mutable_reference_is_a_store() {
        fn put<S: KeyValueStore>(mut store: S) {
            store.set("k", "v").unwrap();
        }

        let mut store = MemoryStore::new();
        put(&mut store);
        assert_eq!(store.get("k").as_deref(), Some("v"));
    }
}
