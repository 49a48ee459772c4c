//! Browser-session lifecycle management.
//!
//! Each logical scraping task exclusively owns at most one live proxy
//! session at a time. Sessions are deliberately short-lived: anti-bot
//! services frequently taint a session permanently once flagged, so the
//! orchestrator tears the session down and recreates it between attempts
//! (destroy-before-create) rather than reusing a possibly-tainted one.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::SESSION_TTL_MINUTES;
use crate::error_handling::ScrapeError;
use crate::proxy::{SolverCommand, SolverTransport};

/// Lifecycle state of a proxy session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Requested but not yet acknowledged by the proxy.
    Uninitialized,
    /// Live and usable for fetches.
    Active,
    /// Torn down; the handle must not be used again.
    Destroyed,
}

/// A live anti-bot-bypass browser context held at the proxy.
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque session handle issued by the proxy.
    pub id: String,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session last served a successful fetch.
    pub last_used_at: DateTime<Utc>,
    /// Current lifecycle state.
    pub state: SessionState,
}

/// Manages the session lifecycle for one logical scraping task.
///
/// Exclusively owned by the calling task; never shared across concurrent
/// tasks. Holds at most one `Active` session: `ensure_session` is
/// idempotent, and a new session is only created after the prior one was
/// destroyed.
pub struct SessionManager {
    transport: Arc<dyn SolverTransport>,
    task: String,
    serial: u64,
    session: Option<Session>,
}

impl SessionManager {
    /// Creates a manager for the given task name.
    ///
    /// The task name prefixes generated session handles so that sessions
    /// from concurrent tasks are distinguishable in proxy logs.
    pub fn new(transport: Arc<dyn SolverTransport>, task: &str) -> Self {
        SessionManager {
            transport,
            task: task.to_string(),
            serial: 0,
            session: None,
        }
    }

    /// Returns the handle of the current `Active` session, if any.
    pub fn current_session_id(&self) -> Option<&str> {
        self.session
            .as_ref()
            .filter(|session| session.state == SessionState::Active)
            .map(|session| session.id.as_str())
    }

    /// Returns an `Active` session handle, creating a session if none
    /// exists.
    ///
    /// Idempotent: calling twice without an intervening destroy returns
    /// the same handle without touching the proxy.
    ///
    /// # Errors
    ///
    /// Returns `ScrapeError::SessionCreation` if the proxy refuses the
    /// session, or `ScrapeError::ProxyUnavailable` on transport failure.
    pub async fn ensure_session(&mut self) -> Result<String, ScrapeError> {
        if let Some(id) = self.current_session_id() {
            return Ok(id.to_string());
        }

        self.serial += 1;
        let name = format!("{}-{}", self.task, self.serial);
        let now = Utc::now();
        self.session = Some(Session {
            id: name.clone(),
            created_at: now,
            last_used_at: now,
            state: SessionState::Uninitialized,
        });

        let response = self
            .transport
            .send(SolverCommand::create_session(&name, SESSION_TTL_MINUTES))
            .await?;
        if !response.is_ok() {
            self.session = None;
            return Err(ScrapeError::SessionCreation(response.message));
        }

        // Some proxies rename the session on creation; trust their handle.
        let id = response.session.unwrap_or(name);
        if let Some(session) = self.session.as_mut() {
            session.id = id.clone();
            session.state = SessionState::Active;
        }
        log::debug!("session {} created for task {}", id, self.task);
        Ok(id)
    }

    /// Destroys the current session, if any.
    ///
    /// Safe to call when no session exists (no-op, no proxy round trip).
    /// A proxy-side destroy failure is logged and swallowed: the session
    /// is considered gone either way, and the proxy's TTL reaper will
    /// collect stragglers.
    pub async fn destroy_session(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        session.state = SessionState::Destroyed;
        match self
            .transport
            .send(SolverCommand::destroy_session(&session.id))
            .await
        {
            Ok(response) if !response.is_ok() => {
                log::warn!(
                    "proxy refused to destroy session {}: {}",
                    session.id,
                    response.message
                );
            }
            Err(error) => {
                log::warn!("failed to destroy session {}: {}", session.id, error);
            }
            Ok(_) => {
                log::debug!("session {} destroyed", session.id);
            }
        }
    }

    /// Records a successful fetch on the current session.
    pub fn touch(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.last_used_at = Utc::now();
        }
    }

    /// Checks whether the current session is still known to the proxy.
    ///
    /// Uses `sessions.list`; a transport failure is reported as not alive.
    pub async fn is_alive(&self) -> bool {
        let Some(id) = self.current_session_id() else {
            return false;
        };
        match self.transport.send(SolverCommand::list_sessions()).await {
            Ok(response) => response
                .sessions
                .unwrap_or_default()
                .iter()
                .any(|known| known == id),
            Err(_) => false,
        }
    }
}
