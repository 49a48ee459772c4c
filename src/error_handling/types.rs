//! Error type definitions.
//!
//! This module defines the error taxonomy used throughout the scraping core.
//! Every per-attempt error is caught inside the retry orchestrator and
//! converted into backoff-and-retry or a final `RetriesExhausted`; nothing
//! else escapes the orchestrator uncaught.

use std::time::Duration;

use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Errors raised by the scraping core.
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// The automation proxy could not establish a browser session.
    #[error("session creation failed: {0}")]
    SessionCreation(String),

    /// Transport failure talking to the automation proxy itself.
    ///
    /// Distinct from target-site failures: anti-bot interstitials are
    /// successful HTTP responses from the proxy's point of view and never
    /// produce this error.
    #[error("automation proxy unavailable: {0}")]
    ProxyUnavailable(String),

    /// A single fetch exceeded its timeout.
    #[error("fetch timed out after {0:?}")]
    FetchTimeout(Duration),

    /// A challenge was detected and the solve sequence failed or was
    /// unavailable.
    #[error("challenge unresolved: {0}")]
    ChallengeUnresolved(String),

    /// The target page was classified as not found.
    ///
    /// Still retried up to the attempt limit: anti-bot systems sometimes
    /// serve a false "not found" to unsolved-challenge traffic.
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    /// A page classified as clean yielded zero usable records or fields.
    ///
    /// More likely a markup-drift maintenance signal than a transient
    /// fault, but still retried since transient rendering glitches exist.
    #[error("extraction produced no usable data: {0}")]
    Extraction(String),

    /// All attempts failed; wraps the last underlying cause.
    #[error("retries exhausted after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Number of attempts made before giving up.
        attempts: u32,
        /// The last per-attempt error observed.
        #[source]
        source: Box<ScrapeError>,
    },
}

impl ScrapeError {
    /// Returns the coarse category of this error, for stats and logging.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScrapeError::SessionCreation(_) => ErrorKind::SessionCreation,
            ScrapeError::ProxyUnavailable(_) => ErrorKind::ProxyUnavailable,
            ScrapeError::FetchTimeout(_) => ErrorKind::FetchTimeout,
            ScrapeError::ChallengeUnresolved(_) => ErrorKind::ChallengeUnresolved,
            ScrapeError::ResourceNotFound(_) => ErrorKind::ResourceNotFound,
            ScrapeError::Extraction(_) => ErrorKind::Extraction,
            ScrapeError::RetriesExhausted { .. } => ErrorKind::RetriesExhausted,
        }
    }

    /// Whether another attempt may succeed after this error.
    ///
    /// Every per-attempt error in the taxonomy is retryable, including
    /// `ResourceNotFound` (anti-bot systems serve false not-founds to
    /// unsolved traffic) and `Extraction` (transient rendering glitches).
    /// Only the terminal `RetriesExhausted` is not.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ScrapeError::RetriesExhausted { .. })
    }
}

impl From<reqwest::Error> for ScrapeError {
    fn from(error: reqwest::Error) -> Self {
        // Any reqwest-level failure is a failure to reach the proxy; the
        // target site is only ever reached through the proxy.
        ScrapeError::ProxyUnavailable(error.to_string())
    }
}

/// Coarse error categories, used for statistics and distinct logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorKind {
    /// Session establishment failed at the proxy.
    SessionCreation,
    /// Transport failure to the proxy itself.
    ProxyUnavailable,
    /// A fetch exceeded its timeout.
    FetchTimeout,
    /// A challenge could not be passed.
    ChallengeUnresolved,
    /// Target page classified as not found.
    ResourceNotFound,
    /// Clean page yielded zero usable output.
    Extraction,
    /// Attempt limit reached.
    RetriesExhausted,
}

impl ErrorKind {
    /// Returns a human-readable string representation of the error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::SessionCreation => "Session creation error",
            ErrorKind::ProxyUnavailable => "Proxy unavailable",
            ErrorKind::FetchTimeout => "Fetch timeout",
            ErrorKind::ChallengeUnresolved => "Challenge unresolved",
            ErrorKind::ResourceNotFound => "Resource not found",
            ErrorKind::Extraction => "Extraction error",
            ErrorKind::RetriesExhausted => "Retries exhausted",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
