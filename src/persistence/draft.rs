//! Draft store: the unsent input text, kept across restarts.

use super::Persistence;
use crate::storage::{DRAFT_KEY, KeyValueStore};

impl<S: KeyValueStore> Persistence<S> {
    /// Save the current input. Whitespace-only input deletes the draft.
    /// No-op when history is disabled.
    pub fn save_draft(&mut self, text: &str) {
        if !self.save_history_enabled() {
            return;
        }

        if text.trim().is_empty() {
            self.delete(DRAFT_KEY);
        } else {
            let encoded = serde_json::Value::from(text).to_string();
            self.write(DRAFT_KEY, &encoded);
        }
    }

    /// The saved draft, if any. `None` when history is disabled.
    pub fn load_draft(&self) -> Option<String> {
        if !self.save_history_enabled() {
            return None;
        }
        let raw = self.store().get(DRAFT_KEY)?;
        // Accept bare strings written by older clients.
        let draft = serde_json::from_str::<String>(&raw).unwrap_or(raw);
        (!draft.trim().is_empty()).then_some(draft)
    }
}
