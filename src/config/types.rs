//! Configuration types.
//!
//! Option types passed by callers into the scraping core: where the
//! automation proxy lives, how long individual fetches may take, and
//! per-call overrides exposed to route handlers.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use super::{DEFAULT_MAX_ATTEMPTS, DEFAULT_PROXY_ENDPOINT, DEFAULT_WAIT_SECONDS, FETCH_TIMEOUT};
use crate::error_handling::ScrapeError;

/// Connection settings for the FlareSolverr-compatible automation proxy.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Endpoint URL of the proxy (e.g. `http://localhost:8191/v1`).
    pub endpoint: Url,
    /// Transport-level timeout for talking to the proxy itself.
    ///
    /// This bounds the HTTP round trip to the proxy, not the page render
    /// time (page render time is bounded per fetch via `FetchOptions`).
    pub transport_timeout: Duration,
}

impl ProxyConfig {
    /// Builds a config pointing at the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns `ScrapeError::ProxyUnavailable` if the endpoint is not a
    /// valid URL.
    pub fn new(endpoint: &str) -> Result<Self, ScrapeError> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            ScrapeError::ProxyUnavailable(format!("invalid proxy endpoint '{endpoint}': {e}"))
        })?;
        Ok(ProxyConfig {
            endpoint,
            // Transport timeout must exceed the largest per-fetch render
            // budget, otherwise reqwest would cut off a solve in progress.
            transport_timeout: Duration::from_secs(90),
        })
    }

    /// Builds a config from the `FLARESOLVERR_URL` environment variable,
    /// falling back to the default local endpoint.
    pub fn from_env() -> Result<Self, ScrapeError> {
        let endpoint = std::env::var("FLARESOLVERR_URL")
            .unwrap_or_else(|_| DEFAULT_PROXY_ENDPOINT.to_string());
        Self::new(&endpoint)
    }
}

/// Options for a single fetch through the automation proxy.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Post-navigation settle time in seconds, so client-side challenge
    /// scripts can run before the rendered HTML is captured.
    pub wait_seconds: u64,
    /// Overall timeout for this fetch, including page render time.
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        FetchOptions {
            wait_seconds: DEFAULT_WAIT_SECONDS,
            timeout: FETCH_TIMEOUT,
        }
    }
}

impl FetchOptions {
    /// Returns a copy with the given settle time.
    pub fn with_wait_seconds(mut self, wait_seconds: u64) -> Self {
        self.wait_seconds = wait_seconds;
        self
    }

    /// Returns a copy with the given timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Per-call overrides exposed to route handlers.
///
/// All fields are optional; `None` means use the library default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallOptions {
    /// Maximum attempts for this call (default `DEFAULT_MAX_ATTEMPTS`).
    pub retries: Option<u32>,
    /// Preferred content language (e.g. "fr", "en").
    pub lang: Option<String>,
    /// Post-navigation settle time override in seconds.
    pub wait_seconds: Option<u64>,
}

impl CallOptions {
    /// Effective attempt limit for this call.
    pub fn max_attempts(&self) -> u32 {
        self.retries.unwrap_or(DEFAULT_MAX_ATTEMPTS).max(1)
    }

    /// Effective content language for this call.
    pub fn lang(&self) -> &str {
        self.lang.as_deref().unwrap_or("fr")
    }

    /// Fetch options derived from these overrides.
    pub fn fetch_options(&self) -> FetchOptions {
        let mut options = FetchOptions::default();
        if let Some(wait) = self.wait_seconds {
            options.wait_seconds = wait;
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_config_rejects_invalid_endpoint() {
        assert!(ProxyConfig::new("not a url").is_err());
    }

    #[test]
    fn test_call_options_defaults() {
        let options = CallOptions::default();
        assert_eq!(options.max_attempts(), DEFAULT_MAX_ATTEMPTS);
        assert_eq!(options.lang(), "fr");
        assert_eq!(options.fetch_options().wait_seconds, DEFAULT_WAIT_SECONDS);
    }

    #[test]
    fn test_call_options_zero_retries_clamped_to_one() {
        let options = CallOptions {
            retries: Some(0),
            ..Default::default()
        };
        assert_eq!(options.max_attempts(), 1);
    }

    #[test]
    fn test_call_options_wait_override() {
        let options = CallOptions {
            wait_seconds: Some(11),
            ..Default::default()
        };
        assert_eq!(options.fetch_options().wait_seconds, 11);
    }
}
