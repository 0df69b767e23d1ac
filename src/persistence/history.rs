//! History store: the saved user/ai exchanges.
//!
//! Stored under [`HISTORY_KEY`] as a JSON array, oldest first. Only the
//! most recent [`MAX_HISTORY`] exchanges are kept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Persistence;
use crate::storage::{HISTORY_KEY, KeyValueStore};

/// Maximum number of exchanges kept in storage.
pub const MAX_HISTORY: usize = 50;

/// One completed user message / ai reply pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    #[serde(rename = "user")]
    pub user_message: String,
    #[serde(rename = "ai")]
    pub ai_message: String,
    pub timestamp: DateTime<Utc>,
}

impl Exchange {
    pub fn new(user_message: impl Into<String>, ai_message: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            ai_message: ai_message.into(),
            timestamp: Utc::now(),
        }
    }
}

impl<S: KeyValueStore> Persistence<S> {
    /// Saved exchanges, oldest first. Empty when history is disabled.
    pub fn load_history(&self) -> Vec<Exchange> {
        if !self.save_history_enabled() {
            return Vec::new();
        }
        self.stored_history()
    }

    /// The last `n` saved exchanges, oldest first.
    pub fn recent_history(&self, n: usize) -> Vec<Exchange> {
        let mut all = self.load_history();
        let skip = all.len().saturating_sub(n);
        all.drain(..skip);
        all
    }

    /// Append an exchange, evicting the oldest beyond [`MAX_HISTORY`].
    /// No-op when history is disabled.
    pub fn append_exchange(&mut self, exchange: Exchange) {
        if !self.save_history_enabled() {
            return;
        }

        let mut history = self.stored_history();
        history.push(exchange);
        if history.len() > MAX_HISTORY {
            let overflow = history.len() - MAX_HISTORY;
            history.drain(..overflow);
        }

        match serde_json::to_string(&history) {
            Ok(encoded) => self.write(HISTORY_KEY, &encoded),
            Err(e) => crate::logging::log_event(&format!("history encode failed: {e}")),
        }
    }

    fn stored_history(&self) -> Vec<Exchange> {
        self.store()
            .get(HISTORY_KEY)
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn append_keeps_insertion_order() {
        let mut p = Persistence::new(MemoryStore::new());
        p.append_exchange(Exchange::new("hi", "hello"));
        p.append_exchange(Exchange::new("again", "welcome back"));

        let history = p.load_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].user_message, "hi");
        assert_eq!(history[1].ai_message, "welcome back");
    }

    #[test]
    fn append_evicts_oldest_beyond_limit() {
        let mut p = Persistence::new(MemoryStore::new());
        for i in 0..(MAX_HISTORY + 7) {
            p.append_exchange(Exchange::new(format!("u{i}"), format!("a{i}")));
        }

        let history = p.load_history();
        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history[0].user_message, "u7");
        assert_eq!(
            history.last().unwrap().user_message,
            format!("u{}", MAX_HISTORY + 6)
        );
    }

    #[test]
    fn disabled_history_is_neither_read_nor_written() {
        let mut p = Persistence::new(MemoryStore::new());
        p.append_exchange(Exchange::new("kept", "yes"));
        p.set_save_history(false);

        p.append_exchange(Exchange::new("dropped", "no"));
        assert!(p.load_history().is_empty());
        assert_eq!(p.store().get(HISTORY_KEY), None);

        p.set_save_history(true);
        assert!(p.load_history().is_empty());
    }

    #[test]
    fn recent_history_takes_tail() {
        let mut p = Persistence::new(MemoryStore::new());
        for i in 0..5 {
            p.append_exchange(Exchange::new(format!("u{i}"), "a"));
        }
        let recent = p.recent_history(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].user_message, "u3");
        assert_eq!(recent[1].user_message, "u4");
        assert_eq!(p.recent_history(10).len(), 5);
    }

    #[test]
    fn serialized_layout_uses_user_and_ai_keys() {
        let mut p = Persistence::new(MemoryStore::new());
        p.append_exchange(Exchange::new("q", "r"));
        let raw: serde_json::Value =
            serde_json::from_str(&p.store().get(HISTORY_KEY).unwrap()).unwrap();
        assert_eq!(raw[0]["user"], "q");
        assert_eq!(raw[0]["ai"], "r");
        assert!(raw[0]["timestamp"].is_string());
    }

    #[test]
    fn malformed_history_reads_as_empty() {
        let mut store = MemoryStore::new();
        store.set(HISTORY_KEY, "{oops").unwrap();
        let mut p = Persistence::new(store);
        assert!(p.load_history().is_empty());

        p.append_exchange(Exchange::new("fresh", "start"));
        assert_eq!(p.load_history().len(), 1);
    }
}
