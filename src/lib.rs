//! collecta library: resilient HTML-scraping core for metadata aggregation
//!
//! This library provides the scraping-resilience layer used to aggregate
//! collectibles/media metadata from anti-bot-protected websites. It drives a
//! FlareSolverr-compatible browser-automation proxy through a bounded retry
//! protocol (session lifecycle, challenge detection and solving, exponential
//! backoff) and recovers structured records from inconsistently-formatted
//! markup (search result cards, detail-page field tables, breadcrumb trails,
//! free-text checklist enumerations).
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use collecta::{CallOptions, MemoryCache, ProxyConfig, Scraper};
//! use collecta::providers::ColekaProvider;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ProxyConfig::from_env()?;
//! let scraper = Scraper::new(config)?;
//! let cache = Arc::new(MemoryCache::with_default_ttl());
//! let provider = ColekaProvider::new(scraper, cache);
//!
//! let records = provider.search("optimus prime", &CallOptions::default()).await?;
//! println!("{} results", records.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime and a reachable FlareSolverr-compatible
//! proxy endpoint (`FLARESOLVERR_URL`, default `http://localhost:8191/v1`).

#![warn(missing_docs)]

mod cache;
mod challenge;
pub mod config;
mod enumeration;
mod error_handling;
mod extract;
mod fetch;
pub mod initialization;
mod orchestrate;
pub mod providers;
mod proxy;
mod retry;
mod session;
mod utils;

// Re-export public API
pub use cache::{MemoryCache, ResultCache};
pub use challenge::{classify_with, ChallengeState, ChallengeStrategy, MarkerRules};
pub use config::{CallOptions, FetchOptions, ProxyConfig};
pub use enumeration::{
    parse_alpha_enumeration, parse_mixed_enumeration, parse_numeric_enumeration, EnumItem,
    Enumeration,
};
pub use error_handling::{ErrorKind, ScrapeError, ScrapeStats};
pub use extract::{
    extract_breadcrumbs, extract_detail_fields, extract_records, BreadcrumbRules, DetailRules,
    ExtractedRecord, FieldRule, PairShape, RecordRules,
};
pub use fetch::{FetchResult, ProxyFetcher};
pub use orchestrate::{PageKind, ScrapeTarget, Scraper};
pub use proxy::{FlareClient, SolverCommand, SolverResponse, SolverSolution, SolverTransport};
pub use retry::{run_with_retry, RetryPolicy, Sleeper, TokioSleeper};
pub use session::{Session, SessionManager, SessionState};
