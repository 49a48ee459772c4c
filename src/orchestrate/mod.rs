//! Scrape orchestration.
//!
//! Wraps the full multi-step scraping pipeline (visit home, detect
//! challenge, solve, fetch target, classify target, parse) in the bounded
//! retry loop, with a full session teardown and recreation between
//! attempts. Anti-bot services frequently taint a session permanently once
//! flagged, so reusing a session after a failed attempt is unproductive
//! and increases ban risk.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::challenge::{ChallengeState, ChallengeStrategy};
use crate::config::{FetchOptions, ProxyConfig};
use crate::error_handling::{ScrapeError, ScrapeStats};
use crate::fetch::ProxyFetcher;
use crate::proxy::{FlareClient, SolverTransport};
use crate::retry::{run_with_retry, RetryPolicy, Sleeper, TokioSleeper};
use crate::session::SessionManager;

/// Which classification profile applies to the target page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Listing/search page; legitimately short when there are no results.
    Listing,
    /// Detail page; always substantial when real, so the stricter
    /// length heuristic applies.
    Detail,
}

/// One logical scraping call: where to go and how to treat what comes back.
pub struct ScrapeTarget<'a> {
    /// Task name, used to label proxy sessions.
    pub task: &'a str,
    /// Optional warm-up URL (typically the site home page) visited first so
    /// the challenge is detected and solved before the real fetch.
    pub home_url: Option<&'a str>,
    /// The page actually being scraped.
    pub target_url: &'a str,
    /// Preferred content language passed to the solve sequence.
    pub lang: &'a str,
    /// Provider-specific challenge mechanics.
    pub strategy: &'a dyn ChallengeStrategy,
    /// Classification profile for the target page.
    pub kind: PageKind,
    /// Fetch options for the warm-up visit.
    pub home_options: FetchOptions,
    /// Fetch options for the target fetch.
    pub target_options: FetchOptions,
    /// Attempt limit for this call.
    pub max_attempts: u32,
}

impl<'a> ScrapeTarget<'a> {
    /// Creates a target with default options and no warm-up visit.
    pub fn new(task: &'a str, target_url: &'a str, strategy: &'a dyn ChallengeStrategy) -> Self {
        ScrapeTarget {
            task,
            home_url: None,
            target_url,
            lang: "fr",
            strategy,
            kind: PageKind::Listing,
            home_options: FetchOptions::default(),
            target_options: FetchOptions::default(),
            max_attempts: RetryPolicy::default().max_attempts,
        }
    }
}

/// Drives scraping calls through the automation proxy.
///
/// Cheap to clone; clones share the transport and statistics. Each call
/// owns an independent session, so concurrent calls never contend beyond
/// the proxy's own browser pool.
#[derive(Clone)]
pub struct Scraper {
    transport: Arc<dyn SolverTransport>,
    fetcher: ProxyFetcher,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    stats: Arc<ScrapeStats>,
}

impl Scraper {
    /// Creates a scraper talking to the configured proxy endpoint.
    ///
    /// # Errors
    ///
    /// Returns `ScrapeError::ProxyUnavailable` if the HTTP client cannot
    /// be constructed.
    pub fn new(config: ProxyConfig) -> Result<Self, ScrapeError> {
        Ok(Self::with_transport(Arc::new(FlareClient::new(config)?)))
    }

    /// Creates a scraper over an arbitrary transport (tests use doubles).
    pub fn with_transport(transport: Arc<dyn SolverTransport>) -> Self {
        let fetcher = ProxyFetcher::new(Arc::clone(&transport));
        Scraper {
            transport,
            fetcher,
            policy: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
            stats: Arc::new(ScrapeStats::new()),
        }
    }

    /// Replaces the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the sleeper (tests inject a fake clock).
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Error statistics accumulated across calls on this scraper.
    pub fn stats(&self) -> &ScrapeStats {
        &self.stats
    }

    /// Runs one scraping call to completion, failure, or retry exhaustion.
    ///
    /// `parse` is synchronous CPU work over the trusted HTML payload; it
    /// only runs on a page that classified clean. A parse that succeeds
    /// with an empty collection is a success: empty-result and fetch
    /// failure are distinct outcomes and the loop never retries the
    /// former.
    ///
    /// # Errors
    ///
    /// Returns `ScrapeError::RetriesExhausted` wrapping the last
    /// per-attempt cause once the attempt limit is reached. No other
    /// error escapes the loop.
    pub async fn scrape<T, P>(
        &self,
        target: &ScrapeTarget<'_>,
        parse: P,
    ) -> Result<T, ScrapeError>
    where
        P: Fn(&str) -> Result<T, ScrapeError>,
    {
        let manager = Mutex::new(SessionManager::new(Arc::clone(&self.transport), target.task));
        let policy = self.policy.with_attempts(target.max_attempts);

        let result = run_with_retry(&policy, self.sleeper.as_ref(), |attempt| {
            let manager = &manager;
            let parse = &parse;
            async move {
                let mut manager = manager.lock().await;
                // Destroy-before-create: clear any leftover session first.
                manager.destroy_session().await;
                let outcome = self.run_attempt(&mut manager, target, parse, attempt).await;
                // The session is torn down on success and failure alike; a
                // completed task has no further use for it.
                manager.destroy_session().await;
                if let Err(error) = &outcome {
                    self.stats.increment(error.kind());
                }
                outcome
            }
        })
        .await;

        if let Err(error) = &result {
            self.stats.increment(error.kind());
            log::warn!("scrape of {} gave up: {}", target.target_url, error);
        }
        result
    }

    /// Executes the strictly-ordered steps of one attempt.
    async fn run_attempt<T, P>(
        &self,
        manager: &mut SessionManager,
        target: &ScrapeTarget<'_>,
        parse: &P,
        attempt: u32,
    ) -> Result<T, ScrapeError>
    where
        P: Fn(&str) -> Result<T, ScrapeError>,
    {
        log::debug!(
            "attempt {} for {} (task {})",
            attempt,
            target.target_url,
            target.task
        );
        let session_id = manager.ensure_session().await?;

        if let Some(home_url) = target.home_url {
            let home = self
                .fetcher
                .fetch(home_url, &session_id, &target.home_options)
                .await?;
            match target.strategy.classify(&home.body) {
                ChallengeState::Clean | ChallengeState::NotFound => {}
                ChallengeState::ChallengePresent => {
                    log::info!("challenge detected on {}, running solve sequence", home_url);
                    let passed = target
                        .strategy
                        .solve(&self.fetcher, &session_id, target.lang)
                        .await?;
                    if !passed {
                        return Err(ScrapeError::ChallengeUnresolved(format!(
                            "solve sequence did not clear the interstitial on {home_url}"
                        )));
                    }
                }
                ChallengeState::Blocked => {
                    return Err(ScrapeError::ChallengeUnresolved(format!(
                        "blocked at {home_url}"
                    )));
                }
            }
        }

        let page = self
            .fetcher
            .fetch(target.target_url, &session_id, &target.target_options)
            .await?;
        if page.looks_empty() {
            return Err(ScrapeError::Extraction(format!(
                "proxy returned an unusably short body for {}",
                target.target_url
            )));
        }

        let state = match target.kind {
            PageKind::Listing => target.strategy.classify(&page.body),
            PageKind::Detail => target.strategy.classify_detail(&page.body),
        };
        match state {
            ChallengeState::Clean => {}
            ChallengeState::ChallengePresent | ChallengeState::Blocked => {
                return Err(ScrapeError::ChallengeUnresolved(format!(
                    "target page {} still challenged",
                    target.target_url
                )));
            }
            ChallengeState::NotFound => {
                return Err(ScrapeError::ResourceNotFound(target.target_url.to_string()));
            }
        }

        manager.touch();
        // Parsing is synchronous CPU work; it never runs on a page that has
        // not classified clean.
        parse(&page.body)
    }
}
