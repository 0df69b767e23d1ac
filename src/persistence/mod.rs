//! Persisted chat state: settings, history, and draft.
//!
//! [`Persistence`] is the one service object that owns the key-value store.
//! It is built once at startup and handed to the chat controller; nothing
//! else touches the store. Storage stays the source of truth: every read
//! goes to the store and every mutation is written through immediately.
//!
//! Write failures are logged and otherwise ignored. Persistence is a
//! convenience for a single local user and must never break a conversation.

pub mod draft;
pub mod history;
pub mod settings;

use crate::logging;
use crate::storage::KeyValueStore;

pub use history::{Exchange, MAX_HISTORY};
pub use settings::{FontSize, Settings, SettingsUpdate, Theme};

pub struct Persistence<S> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    fn write(&mut self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            logging::log_event(&format!("storage write failed key={key}: {e:#}"));
        }
    }

    fn delete(&mut self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            logging::log_event(&format!("storage delete failed key={key}: {e:#}"));
        }
    }
}
