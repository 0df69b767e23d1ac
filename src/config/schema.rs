//! Configuration schema and defaults for mindful.
//!
//! Defines the TOML-serializable configuration structure with the sections
//! `[server]`, `[chat]`, `[storage]` and `[logging]`. Every field has a
//! built-in default; users only set what they want to change.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level mindful configuration.
///
/// Maps directly to `~/.mindful/config.toml` and `.mindful.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MindfulConfig {
    pub server: ServerConfig,
    pub chat: ChatConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

/// Where the chat and recommend endpoints live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL; `/api/chat` and `/api/recommend` are appended.
    pub base_url: String,
    /// Per-request timeout (milliseconds).
    pub timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_ms: 15_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [chat]
// ---------------------------------------------------------------------------

/// What the chat client shows when the remote call fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Fixed apology; the exchange is not saved to history.
    #[default]
    Apologize,
    /// Keyword-matched local reply; the exchange is saved to history.
    LocalFallback,
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Apologize => write!(f, "apologize"),
            Self::LocalFallback => write!(f, "local-fallback"),
        }
    }
}

/// Chat controller behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub failure_policy: FailurePolicy,
    /// Scan outgoing messages for crisis keywords before sending.
    pub local_crisis_check: bool,
    /// Delay before the crisis resources panel opens (milliseconds).
    pub crisis_modal_delay_ms: u64,
    /// Delay before the local crisis message is shown (milliseconds).
    pub crisis_message_delay_ms: u64,
    /// Number of saved exchanges replayed into the transcript at startup.
    pub replay_exchanges: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::default(),
            local_crisis_check: true,
            crisis_modal_delay_ms: 1_000,
            crisis_message_delay_ms: 2_000,
            replay_exchanges: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// [storage]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage file; defaults to `~/.mindful/storage.json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    /// Log file; defaults to `~/.mindful/mindful.log`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Annotated default file
// ---------------------------------------------------------------------------

impl MindfulConfig {
    /// The annotated config written by `mindful config init`.
    pub fn default_toml() -> String {
        r#"# mindful configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (MINDFUL_*)
#   2. Project config (.mindful.toml in current directory)
#   3. User global config (~/.mindful/config.toml)
#   4. Built-in defaults

[server]
base_url = "http://127.0.0.1:5000"
timeout_ms = 15000

[chat]
failure_policy = "apologize"      # apologize | local-fallback
local_crisis_check = true
crisis_modal_delay_ms = 1000
crisis_message_delay_ms = 2000
replay_exchanges = 10

[storage]
# path = "~/.mindful/storage.json"

[logging]
enabled = true
# path = "~/.mindful/mindful.log"
"#
        .to_string()
    }
}
