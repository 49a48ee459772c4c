//! HTTP client initialization.
//!
//! This module provides the function to initialize the HTTP client used to
//! talk to the browser-automation proxy.

use std::time::Duration;

use reqwest::ClientBuilder;

use crate::error_handling::ScrapeError;

/// Initializes the HTTP client for proxy communication.
///
/// Creates a `reqwest::Client` configured with:
/// - The given transport timeout (must exceed the proxy's largest render
///   budget, otherwise in-flight challenge solves would be cut off)
/// - No redirect following: the proxy endpoint is a fixed URL and the
///   browser inside the proxy handles target-site redirects itself
///
/// # Arguments
///
/// * `timeout` - Transport-level timeout for proxy round trips
///
/// # Errors
///
/// Returns `ScrapeError::ProxyUnavailable` if client creation fails.
pub fn init_proxy_client(timeout: Duration) -> Result<reqwest::Client, ScrapeError> {
    ClientBuilder::new()
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(ScrapeError::from)
}
