//! Challenge detection and solving.
//!
//! Classification is cheap pattern matching on the rendered page and runs
//! after every fetch; solving is expensive (multiple proxy round trips)
//! and only runs when classification reports a challenge. Each supported
//! site embeds different challenge mechanics, so solving is pluggable per
//! provider behind the [`ChallengeStrategy`] trait; the retry orchestrator
//! depends only on the trait.

use async_trait::async_trait;

use crate::config::{FetchOptions, CHALLENGE_SOLVE_TIMEOUT, SOLVE_WAIT_SECONDS};
use crate::error_handling::ScrapeError;
use crate::fetch::ProxyFetcher;

/// Classification of a fetched page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeState {
    /// Real content.
    Clean,
    /// Anti-bot interstitial detected; a solve attempt may clear it.
    ChallengePresent,
    /// Target resource absent.
    NotFound,
    /// Terminal anti-bot failure (explicit block page).
    Blocked,
}

/// Marker phrases and length heuristics for classifying one page type.
///
/// All marker matching is case-insensitive substring search against the
/// raw page text. The length heuristic is approximate: real pages on the
/// supported sites are consistently longer than error interstitials, but
/// a legitimately short page would be misclassified, so the threshold is
/// a per-page-type tunable rather than a contract (zero disables it).
#[derive(Debug, Clone, Copy)]
pub struct MarkerRules {
    /// Phrases identifying an anti-bot interstitial.
    pub challenge_markers: &'static [&'static str],
    /// Phrases identifying a terminal block page.
    pub blocked_markers: &'static [&'static str],
    /// Phrases identifying a not-found page.
    pub not_found_markers: &'static [&'static str],
    /// Pages shorter than this are classified not found (0 disables).
    pub min_page_len: usize,
}

/// Classifies a page against the given marker rules.
///
/// Pure function; precedence is challenge > blocked > not-found > clean,
/// because an interstitial can embed arbitrary other text and a false
/// "not found" on challenged traffic must stay retryable as a challenge.
pub fn classify_with(rules: &MarkerRules, html: &str) -> ChallengeState {
    let haystack = html.to_lowercase();

    if contains_any(&haystack, rules.challenge_markers) {
        return ChallengeState::ChallengePresent;
    }
    if contains_any(&haystack, rules.blocked_markers) {
        return ChallengeState::Blocked;
    }
    if contains_any(&haystack, rules.not_found_markers) {
        return ChallengeState::NotFound;
    }
    if rules.min_page_len > 0 && haystack.trim().len() < rules.min_page_len {
        log::debug!(
            "page of {} chars below threshold {}, classifying as not found",
            haystack.trim().len(),
            rules.min_page_len
        );
        return ChallengeState::NotFound;
    }
    ChallengeState::Clean
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Per-provider challenge mechanics.
///
/// `classify` runs after every fetch; `solve` only on `ChallengePresent`.
#[async_trait]
pub trait ChallengeStrategy: Send + Sync {
    /// Classifies a rendered page for this provider.
    fn classify(&self, html: &str) -> ChallengeState;

    /// Classifies a rendered detail page for this provider.
    ///
    /// Detail pages carry a stricter length heuristic than listing pages
    /// (empty search results are legitimately short). Defaults to the
    /// plain `classify`.
    fn classify_detail(&self, html: &str) -> ChallengeState {
        self.classify(html)
    }

    /// Drives this provider's solve sequence through the given session.
    ///
    /// Returns whether the challenge was passed.
    ///
    /// # Errors
    ///
    /// Propagates fetch-level errors (`FetchTimeout`, `ProxyUnavailable`).
    async fn solve(
        &self,
        fetcher: &ProxyFetcher,
        session_id: &str,
        lang: &str,
    ) -> Result<bool, ScrapeError>;
}

/// Solve sequence shared by providers whose interstitial clears itself
/// once the challenge scripts are given enough time to run.
///
/// Re-visits `url` through the session with an extended settle time and a
/// solve-sized timeout, then classifies the result. The proxy session
/// keeps the clearance cookies for subsequent fetches.
///
/// # Errors
///
/// Propagates fetch-level errors (`FetchTimeout`, `ProxyUnavailable`).
pub async fn solve_by_revisit(
    fetcher: &ProxyFetcher,
    session_id: &str,
    url: &str,
    rules: &MarkerRules,
) -> Result<bool, ScrapeError> {
    let options = FetchOptions::default()
        .with_wait_seconds(SOLVE_WAIT_SECONDS)
        .with_timeout(CHALLENGE_SOLVE_TIMEOUT);
    let result = fetcher.fetch(url, session_id, &options).await?;
    let state = classify_with(rules, &result.body);
    log::debug!("solve revisit of {} classified {:?}", url, state);
    Ok(state == ChallengeState::Clean)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: MarkerRules = MarkerRules {
        challenge_markers: &["just a moment", "cf-chl"],
        blocked_markers: &["you have been blocked"],
        not_found_markers: &["page introuvable"],
        min_page_len: 100,
    };

    #[test]
    fn test_challenge_marker_detected_case_insensitive() {
        let html = "<html><title>Just a Moment...</title>".to_string() + &"x".repeat(200);
        assert_eq!(
            classify_with(&RULES, &html),
            ChallengeState::ChallengePresent
        );
    }

    #[test]
    fn test_challenge_takes_precedence_over_not_found() {
        // Challenged traffic sometimes gets a fake not-found; the challenge
        // marker must win so the attempt stays solvable.
        let html = "just a moment... page introuvable".to_string() + &"x".repeat(200);
        assert_eq!(
            classify_with(&RULES, &html),
            ChallengeState::ChallengePresent
        );
    }

    #[test]
    fn test_blocked_marker() {
        let html = "Sorry, you have been blocked".to_string() + &"x".repeat(200);
        assert_eq!(classify_with(&RULES, &html), ChallengeState::Blocked);
    }

    #[test]
    fn test_not_found_marker() {
        let html = "Erreur : page introuvable".to_string() + &"x".repeat(200);
        assert_eq!(classify_with(&RULES, &html), ChallengeState::NotFound);
    }

    #[test]
    fn test_short_page_classified_not_found() {
        assert_eq!(
            classify_with(&RULES, "<html>tiny</html>"),
            ChallengeState::NotFound
        );
    }

    #[test]
    fn test_zero_threshold_disables_length_heuristic() {
        let rules = MarkerRules {
            min_page_len: 0,
            ..RULES
        };
        assert_eq!(classify_with(&rules, "<html></html>"), ChallengeState::Clean);
    }

    #[test]
    fn test_clean_page() {
        let html = "<html><body>Optimus Prime figure listing</body></html>".to_string()
            + &"x".repeat(200);
        assert_eq!(classify_with(&RULES, &html), ChallengeState::Clean);
    }
}
