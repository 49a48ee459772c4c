//! Configuration module.
//!
//! Contains operational constants (timeouts, backoff, heuristics) and the
//! option types passed into the scraping core by callers.

mod constants;
mod types;

pub use constants::*;
pub use types::{CallOptions, FetchOptions, ProxyConfig};
