//! Crisis keyword detection and server crisis levels.
//!
//! The local detector is a plain case-insensitive substring scan over a
//! fixed phrase list. It runs independently of the server's own crisis
//! flag; either one can open the crisis resources panel.

use serde::{Deserialize, Serialize};

/// Phrases that trigger the local crisis response, matched as lowercase
/// substrings of the message.
const CRISIS_KEYWORDS: &[&str] = &[
    "suicide",
    "kill myself",
    "end it all",
    "not worth living",
    "better off dead",
    "want to die",
    "hurt myself",
    "self harm",
    "self-harm",
];

/// Supportive message shown after a local crisis match.
pub const CRISIS_RESPONSE: &str = "I'm really concerned about what you've shared. Your life has value, and there are people who want to help you. Please reach out to a crisis helpline or emergency services right away. You don't have to face this alone.";

/// Whether `message` contains any crisis phrase.
pub fn detect_crisis(message: &str) -> bool {
    let lower = message.to_lowercase();
    CRISIS_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Crisis level reported by the chat server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CrisisLevel {
    Low,
    Medium,
    High,
    Critical,
    /// Any value this client does not recognise.
    Other(String),
}

impl CrisisLevel {
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Critical)
    }
}

impl From<String> for CrisisLevel {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            "critical" => Self::Critical,
            _ => Self::Other(raw),
        }
    }
}

impl From<CrisisLevel> for String {
    fn from(level: CrisisLevel) -> Self {
        match level {
            CrisisLevel::Low => "low".into(),
            CrisisLevel::Medium => "medium".into(),
            CrisisLevel::High => "high".into(),
            CrisisLevel::Critical => "critical".into(),
            CrisisLevel::Other(raw) => raw,
        }
    }
}
