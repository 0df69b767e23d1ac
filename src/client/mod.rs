//! Remote endpoints the client talks to.
//!
//! Both endpoints are owned by the server. The controllers only see the
//! [`ChatBackend`] and [`RecommendBackend`] traits, so transport failures,
//! non-2xx statuses, and malformed bodies all arrive as a single `Err`.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::safety::CrisisLevel;

mod http;

pub use http::HttpClient;

// ---------------------------------------------------------------------------
// /api/chat
// ---------------------------------------------------------------------------

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

/// Response body from `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: String,
    #[serde(default)]
    pub crisis_detected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crisis_level: Option<CrisisLevel>,
}

impl ChatReply {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            crisis_detected: false,
            crisis_level: None,
        }
    }

    pub fn with_crisis(mut self, level: CrisisLevel) -> Self {
        self.crisis_detected = true;
        self.crisis_level = Some(level);
        self
    }

    /// The server flagged this exchange at the critical level.
    pub fn is_critical(&self) -> bool {
        self.crisis_detected && self.crisis_level.as_ref().is_some_and(CrisisLevel::is_critical)
    }
}

/// Sends one chat message and waits for the reply.
pub trait ChatBackend {
    fn send(&mut self, message: &str) -> Result<ChatReply>;
}

impl<T: ChatBackend + ?Sized> ChatBackend for &mut T {
    fn send(&mut self, message: &str) -> Result<ChatReply> {
        (**self).send(message)
    }
}

// ---------------------------------------------------------------------------
// /api/health
// ---------------------------------------------------------------------------

/// Response body from `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

// ---------------------------------------------------------------------------
// /api/recommend
// ---------------------------------------------------------------------------

/// Hardware description posted to `POST /api/recommend`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecRequest {
    pub cpu: String,
    pub gpu: String,
    pub ram: String,
}

/// Minimum or recommended requirements of a game. The server decides the
/// value types, so they are kept as raw JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecTriple {
    pub cpu: serde_json::Value,
    pub gpu: serde_json::Value,
    pub ram: serde_json::Value,
}

/// The server's scoring of the submitted hardware.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSpecs {
    pub cpu_score: serde_json::Value,
    pub gpu_score: serde_json::Value,
    pub ram_gb: serde_json::Value,
}

/// One scored game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameResult {
    pub title: String,
    pub genre: Option<String>,
    pub score: f64,
    pub minimum_specs: SpecTriple,
    pub recommended_specs: SpecTriple,
}

/// Response body from `POST /api/recommend`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendResponse {
    pub user_specs: Option<UserSpecs>,
    pub results: Vec<GameResult>,
    pub error: Option<String>,
}

/// Posts hardware specs and returns the server's ranking.
pub trait RecommendBackend {
    fn recommend(&mut self, specs: &SpecRequest) -> Result<RecommendResponse>;
}
