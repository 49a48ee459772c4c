//! Configuration constants.
//!
//! This module defines all configuration constants used throughout the library,
//! including timeouts, retry parameters, and extraction heuristics.

use std::time::Duration;

/// Default endpoint for the FlareSolverr-compatible automation proxy.
///
/// Overridable via the `FLARESOLVERR_URL` environment variable (see
/// `ProxyConfig::from_env`).
pub const DEFAULT_PROXY_ENDPOINT: &str = "http://localhost:8191/v1";

/// Default maximum number of attempts for one logical scraping call.
///
/// Callers can override per call via `CallOptions::retries`.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Base backoff delay between retry attempts.
///
/// The delay before attempt N+1 is `RETRY_BASE_DELAY * N`, so with the
/// default of 2s the schedule is 2s, 4s, 6s, ...
pub const RETRY_BASE_DELAY: Duration = Duration::from_secs(2);

/// Timeout for a plain page fetch through the automation proxy.
///
/// The proxy renders the page in a real browser, so this is much larger
/// than a direct HTTP timeout would be.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(40);

/// Timeout for a fetch that is expected to solve a challenge.
///
/// Challenge interstitials run client-side scripts for several seconds
/// before the real content is served, so solving gets a larger budget
/// than a simple fetch.
pub const CHALLENGE_SOLVE_TIMEOUT: Duration = Duration::from_secs(75);

/// User agent asked of the proxy's browser for `request.get` commands.
///
/// A current mainstream desktop profile; anti-bot scoring penalizes
/// stale or headless-looking agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Default post-navigation settle time in seconds.
///
/// Passed to the proxy so client-side challenge scripts have time to run
/// before the rendered HTML is captured.
pub const DEFAULT_WAIT_SECONDS: u64 = 5;

/// Settle time in seconds used while actively solving a challenge.
pub const SOLVE_WAIT_SECONDS: u64 = 12;

/// Minimum rendered-HTML length below which a detail page is classified
/// as not found.
///
/// This is a heuristic, not a structural signal: real detail pages on the
/// supported sites are consistently several kilobytes, while the "not
/// found" interstitials are short. Approximate by design; providers may
/// override it per page type, and legitimately short pages should use a
/// lower threshold (or zero) at the call site.
pub const NOT_FOUND_MIN_HTML_LEN: usize = 3000;

/// Minimum body length below which a fetch is treated as a soft failure.
///
/// The proxy occasionally returns an empty or truncated body on transient
/// rendering glitches; such bodies must never be parsed as valid content.
pub const MIN_USABLE_BODY_LEN: usize = 64;

/// Maximum number of members a single range token may expand to.
///
/// Guards against pathological input like "1 à 999999999" exhausting
/// memory. Tokens whose span exceeds this are dropped.
pub const MAX_RANGE_SPAN: i64 = 10_000;

/// Default TTL for entries in the in-memory result cache.
pub const CACHE_DEFAULT_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// Proxy-side session TTL in minutes, sent with `sessions.create`.
///
/// Sessions are short-lived by contract (destroy-before-create between
/// attempts); the TTL is a safety net so the proxy reaps sessions leaked
/// by a crashed task.
pub const SESSION_TTL_MINUTES: u64 = 10;
