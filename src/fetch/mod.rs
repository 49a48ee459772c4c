//! Resilient page fetching through the automation proxy.
//!
//! A fetch here is one logical `request.get` command: the proxy navigates
//! its browser to the target URL, waits for client-side scripts to settle,
//! and returns the rendered HTML. Target-site HTTP failures are data, not
//! errors: anti-bot interstitials are successful HTTP responses from the
//! proxy's point of view, so they must reach the challenge classifier
//! rather than short-circuit as transport failures.

use std::sync::Arc;
use std::time::Instant;

use tokio::time::timeout;

use crate::config::{FetchOptions, MIN_USABLE_BODY_LEN};
use crate::error_handling::ScrapeError;
use crate::proxy::{SolverCommand, SolverTransport};

/// Outcome of one fetch through a session.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// Raw rendered page text. May be empty on soft failure; callers must
    /// treat an empty or too-short body as a failure signal, never as
    /// valid-but-empty content.
    pub body: String,
    /// Whether the target site answered with a 2xx/3xx status.
    pub status_ok: bool,
    /// Wall-clock time the fetch took, in milliseconds.
    pub elapsed_ms: u64,
}

impl FetchResult {
    /// Whether the body is too short to be real page content.
    pub fn looks_empty(&self) -> bool {
        self.body.trim().len() < MIN_USABLE_BODY_LEN
    }
}

/// Issues single logical HTTP requests through a proxy session.
#[derive(Clone)]
pub struct ProxyFetcher {
    transport: Arc<dyn SolverTransport>,
}

impl ProxyFetcher {
    /// Creates a fetcher over the given transport.
    pub fn new(transport: Arc<dyn SolverTransport>) -> Self {
        ProxyFetcher { transport }
    }

    /// Fetches one page through the given session.
    ///
    /// The proxy is asked to wait `options.wait_seconds` after navigation
    /// so challenge scripts can run; the whole operation is bounded by
    /// `options.timeout`.
    ///
    /// A proxy envelope of `status: "error"` (render failure, expired
    /// session) degrades to an empty-body `FetchResult` rather than an
    /// error: the caller's classification step decides what an unusable
    /// body means for the attempt.
    ///
    /// # Errors
    ///
    /// * `ScrapeError::FetchTimeout` if `options.timeout` is exceeded
    /// * `ScrapeError::ProxyUnavailable` on transport failure to the proxy
    pub async fn fetch(
        &self,
        url: &str,
        session_id: &str,
        options: &FetchOptions,
    ) -> Result<FetchResult, ScrapeError> {
        let started = Instant::now();
        let command = SolverCommand::request_get(
            url,
            session_id,
            options.timeout.as_millis() as u64,
            options.wait_seconds,
        );

        let response = timeout(options.timeout, self.transport.send(command))
            .await
            .map_err(|_| ScrapeError::FetchTimeout(options.timeout))??;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        if !response.is_ok() {
            log::warn!(
                "proxy reported fetch failure for {} after {}ms: {}",
                url,
                elapsed_ms,
                response.message
            );
            return Ok(FetchResult {
                body: String::new(),
                status_ok: false,
                elapsed_ms,
            });
        }

        let solution = response.solution.unwrap_or_default();
        let status_ok = (200..400).contains(&solution.status);
        log::debug!(
            "fetched {} in {}ms (target status {}, {} bytes)",
            url,
            elapsed_ms,
            solution.status,
            solution.response.len()
        );
        Ok(FetchResult {
            body: solution.response,
            status_ok,
            elapsed_ms,
        })
    }
}
