//! Scrape statistics tracking.
//!
//! Thread-safe counters for errors observed across scraping calls, keyed
//! by `ErrorKind`. Shared across tasks via `Arc`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::ErrorKind;

/// Thread-safe error statistics tracker.
///
/// Tracks per-kind error counts using atomic counters so that concurrent
/// scraping tasks can record failures without locking. All kinds are
/// initialized to zero on creation.
pub struct ScrapeStats {
    errors: HashMap<ErrorKind, AtomicUsize>,
}

impl ScrapeStats {
    /// Creates a tracker with all counters at zero.
    pub fn new() -> Self {
        let mut errors = HashMap::new();
        for kind in ErrorKind::iter() {
            errors.insert(kind, AtomicUsize::new(0));
        }
        ScrapeStats { errors }
    }

    /// Increments the counter for the given error kind.
    pub fn increment(&self, kind: ErrorKind) {
        if let Some(counter) = self.errors.get(&kind) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment counter for {:?} which is not in the map. \
                 This indicates a bug in ScrapeStats initialization.",
                kind
            );
        }
    }

    /// Returns the current count for the given error kind.
    pub fn count(&self, kind: ErrorKind) -> usize {
        self.errors
            .get(&kind)
            .map(|counter| counter.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Returns the total number of errors recorded across all kinds.
    pub fn total(&self) -> usize {
        self.errors
            .values()
            .map(|counter| counter.load(Ordering::Relaxed))
            .sum()
    }

    /// Logs a per-kind breakdown of recorded errors at info level.
    ///
    /// Kinds with zero occurrences are skipped.
    pub fn log_summary(&self) {
        for kind in ErrorKind::iter() {
            let count = self.count(kind);
            if count > 0 {
                log::info!("{}: {}", kind.as_str(), count);
            }
        }
    }
}

impl Default for ScrapeStats {
    fn default() -> Self {
        Self::new()
    }
}
