//! Browser-automation proxy client.
//!
//! This module speaks the FlareSolverr v2 wire protocol: a single HTTP
//! endpoint accepting a JSON command object and returning a JSON envelope
//! with the rendered page (after client-side scripts have executed) or a
//! session-management acknowledgement.
//!
//! The rest of the core depends only on the [`SolverTransport`] trait, so
//! tests substitute a scripted double and never touch the network.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_USER_AGENT, ProxyConfig};
use crate::error_handling::ScrapeError;
use crate::initialization::init_proxy_client;

/// One command sent to the automation proxy.
///
/// Only the fields relevant to the command type are set; the proxy
/// ignores absent fields.
#[derive(Debug, Clone, Serialize)]
pub struct SolverCommand {
    /// Command name: `request.get`, `sessions.create`, `sessions.destroy`
    /// or `sessions.list`.
    pub cmd: String,
    /// Target URL (for `request.get`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Session handle to use or act on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    /// Maximum render time in milliseconds (for `request.get`).
    #[serde(rename = "maxTimeout", skip_serializing_if = "Option::is_none")]
    pub max_timeout: Option<u64>,
    /// Post-navigation settle time in seconds.
    #[serde(rename = "waitInSeconds", skip_serializing_if = "Option::is_none")]
    pub wait_seconds: Option<u64>,
    /// Proxy-side session TTL in minutes (for `sessions.create`).
    #[serde(
        rename = "sessionTtlMinutes",
        skip_serializing_if = "Option::is_none"
    )]
    pub session_ttl_minutes: Option<u64>,
    /// User agent the proxy's browser should present (for `request.get`).
    #[serde(rename = "userAgent", skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl SolverCommand {
    /// Builds a `sessions.create` command for the given session name.
    pub fn create_session(name: &str, ttl_minutes: u64) -> Self {
        SolverCommand {
            cmd: "sessions.create".to_string(),
            url: None,
            session: Some(name.to_string()),
            max_timeout: None,
            wait_seconds: None,
            session_ttl_minutes: Some(ttl_minutes),
            user_agent: None,
        }
    }

    /// Builds a `sessions.destroy` command for the given session handle.
    pub fn destroy_session(session_id: &str) -> Self {
        SolverCommand {
            cmd: "sessions.destroy".to_string(),
            url: None,
            session: Some(session_id.to_string()),
            max_timeout: None,
            wait_seconds: None,
            session_ttl_minutes: None,
            user_agent: None,
        }
    }

    /// Builds a `sessions.list` command.
    pub fn list_sessions() -> Self {
        SolverCommand {
            cmd: "sessions.list".to_string(),
            url: None,
            session: None,
            max_timeout: None,
            wait_seconds: None,
            session_ttl_minutes: None,
            user_agent: None,
        }
    }

    /// Builds a `request.get` command for the given URL through the given
    /// session.
    pub fn request_get(
        url: &str,
        session_id: &str,
        max_timeout_ms: u64,
        wait_seconds: u64,
    ) -> Self {
        SolverCommand {
            cmd: "request.get".to_string(),
            url: Some(url.to_string()),
            session: Some(session_id.to_string()),
            max_timeout: Some(max_timeout_ms),
            wait_seconds: Some(wait_seconds),
            session_ttl_minutes: None,
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
        }
    }
}

/// The `solution` object inside a successful `request.get` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SolverSolution {
    /// Final URL after any redirects performed by the browser.
    #[serde(default)]
    pub url: String,
    /// HTTP status returned by the target site.
    #[serde(default)]
    pub status: u16,
    /// Rendered page HTML after client-side scripts executed.
    #[serde(default)]
    pub response: String,
    /// User-agent string the browser presented to the target site.
    #[serde(rename = "userAgent", default)]
    pub user_agent: String,
}

/// Response envelope returned by the automation proxy for any command.
#[derive(Debug, Clone, Deserialize)]
pub struct SolverResponse {
    /// `"ok"` on success, `"error"` otherwise.
    #[serde(default)]
    pub status: String,
    /// Human-readable detail, mostly useful on error.
    #[serde(default)]
    pub message: String,
    /// Session handle (for `sessions.create`).
    #[serde(default)]
    pub session: Option<String>,
    /// Known session handles (for `sessions.list`).
    #[serde(default)]
    pub sessions: Option<Vec<String>>,
    /// Rendered page payload (for `request.get`).
    #[serde(default)]
    pub solution: Option<SolverSolution>,
}

impl SolverResponse {
    /// Whether the proxy reported success for this command.
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Transport seam over the automation proxy.
///
/// Exactly one implementation talks HTTP ([`FlareClient`]); tests use
/// scripted doubles to drive the session and retry protocols without a
/// network.
#[async_trait]
pub trait SolverTransport: Send + Sync {
    /// Sends one command and returns the proxy's response envelope.
    ///
    /// # Errors
    ///
    /// Returns `ScrapeError::ProxyUnavailable` only on transport-level
    /// failure to the proxy itself. A proxy that answers with
    /// `status: "error"` still yields `Ok`; semantic mapping is the
    /// caller's concern.
    async fn send(&self, command: SolverCommand) -> Result<SolverResponse, ScrapeError>;
}

/// HTTP client for a FlareSolverr-compatible proxy endpoint.
pub struct FlareClient {
    config: ProxyConfig,
    client: reqwest::Client,
}

impl FlareClient {
    /// Creates a client for the given proxy configuration.
    ///
    /// # Errors
    ///
    /// Returns `ScrapeError::ProxyUnavailable` if the underlying HTTP
    /// client cannot be constructed.
    pub fn new(config: ProxyConfig) -> Result<Self, ScrapeError> {
        let client = init_proxy_client(config.transport_timeout)?;
        Ok(FlareClient { config, client })
    }
}

#[async_trait]
impl SolverTransport for FlareClient {
    async fn send(&self, command: SolverCommand) -> Result<SolverResponse, ScrapeError> {
        log::debug!(
            "proxy command {} (url: {:?}, session: {:?})",
            command.cmd,
            command.url,
            command.session
        );
        let response = self
            .client
            .post(self.config.endpoint.clone())
            .json(&command)
            .send()
            .await?;
        let envelope: SolverResponse = response.json().await?;
        if !envelope.is_ok() {
            log::debug!("proxy answered error for {}: {}", command.cmd, envelope.message);
        }
        Ok(envelope)
    }
}
