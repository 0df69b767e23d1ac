//! HTTP client for the chat and recommend endpoints.
//!
//! Uses the synchronous `ureq` client. A blocking call is the one place
//! the chat controller waits; nothing else in the client does I/O over the
//! network.

use std::time::Duration;

use anyhow::{Context, Result};

use super::{
    ChatBackend, ChatReply, ChatRequest, HealthStatus, RecommendBackend, RecommendResponse,
    SpecRequest,
};
use crate::config::schema::ServerConfig;

#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    timeout: Duration,
}

impl HttpClient {
    /// Build a client from the resolved `[server]` config.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(&config.base_url, Duration::from_millis(config.timeout_ms))
    }

    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /api/health`. Uses a short timeout so `mindful health` doesn't
    /// stall when the server is down.
    pub fn health(&self) -> Result<HealthStatus> {
        let timeout = self.timeout.min(Duration::from_secs(3));
        ureq::get(&self.url("/api/health"))
            .timeout(timeout)
            .call()
            .context("health request failed")?
            .into_json()
            .context("failed to parse health response")
    }
}

impl ChatBackend for HttpClient {
    /// `POST /api/chat`. Non-2xx statuses surface as errors from `ureq`.
    fn send(&mut self, message: &str) -> Result<ChatReply> {
        let resp = ureq::post(&self.url("/api/chat"))
            .timeout(self.timeout)
            .send_json(ChatRequest { message })
            .context("chat request failed")?;

        let reply: ChatReply = resp
            .into_json()
            .context("failed to parse chat response")?;

        if reply.message.trim().is_empty() {
            anyhow::bail!("chat server returned an empty message");
        }

        Ok(reply)
    }
}

impl RecommendBackend for HttpClient {
    /// `POST /api/recommend`.
    ///
    /// The server reports bad input as a non-2xx response carrying an
    /// `error` field; that body is returned as a normal response so the
    /// message can be shown verbatim.
    fn recommend(&mut self, specs: &SpecRequest) -> Result<RecommendResponse> {
        let resp = match ureq::post(&self.url("/api/recommend"))
            .timeout(self.timeout)
            .send_json(specs)
        {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, resp)) => {
                return match resp.into_json::<RecommendResponse>() {
                    Ok(body) if body.error.is_some() => Ok(body),
                    _ => Err(anyhow::anyhow!("recommend request failed with status {code}")),
                };
            }
            Err(e) => return Err(e).context("recommend request failed"),
        };

        resp.into_json()
            .context("failed to parse recommend response")
    }
}
