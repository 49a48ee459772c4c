//! Error handling module.
//!
//! Defines the typed error taxonomy surfaced by the scraping core and the
//! thread-safe statistics tracker used to observe failure patterns across
//! calls.

mod stats;
mod types;

pub use stats::ScrapeStats;
pub use types::{ErrorKind, ScrapeError};
