//! End-to-end tests for the retry protocol: backoff schedule, session
//! lifecycle alternation, challenge handling and failure classification,
//! all driven through a scripted transport with no network or sleeping.

use std::sync::Arc;
use std::time::Duration;

use collecta::{PageKind, ScrapeError, ScrapeTarget, Scraper};

#[path = "helpers.rs"]
mod helpers;

use helpers::{page, MarkerStrategy, RecordingSleeper, ScriptStep, ScriptedTransport};

fn scraper_with(
    transport: &Arc<ScriptedTransport>,
    sleeper: &Arc<RecordingSleeper>,
) -> Scraper {
    Scraper::with_transport(Arc::clone(transport) as Arc<_>)
        .with_sleeper(Arc::clone(sleeper) as Arc<_>)
}

#[tokio::test]
async fn test_persistent_challenge_exhausts_attempts_with_backoff() {
    // Every attempt renders the interstitial; the solve step is skipped
    // because there is no warm-up visit, so the target classification
    // fails all three attempts.
    let transport = Arc::new(ScriptedTransport::new(vec![
        ScriptStep::Page(page("just a moment... checking your browser")),
        ScriptStep::Page(page("just a moment... checking your browser")),
        ScriptStep::Page(page("just a moment... checking your browser")),
    ]));
    let sleeper = Arc::new(RecordingSleeper::new());
    let scraper = scraper_with(&transport, &sleeper);

    let strategy = MarkerStrategy { solve_passes: true };
    let target = ScrapeTarget::new("exhaust", "https://site.example/list", &strategy);

    let result: Result<Vec<String>, _> = scraper.scrape(&target, |_| Ok(Vec::new())).await;

    match result.unwrap_err() {
        ScrapeError::RetriesExhausted { attempts, source } => {
            assert_eq!(attempts, 3);
            assert!(matches!(*source, ScrapeError::ChallengeUnresolved(_)));
        }
        other => panic!("expected RetriesExhausted, got {other}"),
    }
    // Backoff grows as a linear multiple of the base delay, and the loop
    // never sleeps after the final attempt.
    assert_eq!(
        sleeper.recorded(),
        vec![Duration::from_millis(2000), Duration::from_millis(4000)]
    );
    assert_eq!(transport.fetch_count(), 3);
}

#[tokio::test]
async fn test_sessions_alternate_create_destroy_across_attempts() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        ScriptStep::ProxyError,
        ScriptStep::ProxyError,
        ScriptStep::ProxyError,
    ]));
    let sleeper = Arc::new(RecordingSleeper::new());
    let scraper = scraper_with(&transport, &sleeper);

    let strategy = MarkerStrategy { solve_passes: true };
    let target = ScrapeTarget::new("lifecycle", "https://site.example/list", &strategy);

    let result: Result<(), _> = scraper
        .scrape(&target, |_| {
            panic!("parse must not run on an unusable body");
        })
        .await;
    assert!(result.is_err());

    // Strict alternation: each attempt creates one fresh session and tears
    // it down, never reusing a possibly-tainted one.
    let session_commands = transport.session_commands();
    let names: Vec<&str> = session_commands.iter().map(|(cmd, _)| cmd.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "sessions.create",
            "sessions.destroy",
            "sessions.create",
            "sessions.destroy",
            "sessions.create",
            "sessions.destroy",
        ]
    );
    // Each create/destroy pair acts on the same handle, and handles are
    // unique across attempts.
    assert_eq!(session_commands[0].1, session_commands[1].1);
    assert_eq!(session_commands[2].1, session_commands[3].1);
    assert_eq!(session_commands[4].1, session_commands[5].1);
    assert_ne!(session_commands[0].1, session_commands[2].1);
    assert_ne!(session_commands[2].1, session_commands[4].1);
}

#[tokio::test]
async fn test_challenge_on_home_solved_within_first_attempt() {
    // The warm-up visit hits the interstitial, the solve sequence passes,
    // and the target fetch then renders clean content: success with no
    // retry and exactly one session.
    let transport = Arc::new(ScriptedTransport::new(vec![
        ScriptStep::Page(page("just a moment... checking your browser")),
        ScriptStep::Page(page("<div class=\"results\">real content here</div>")),
    ]));
    let sleeper = Arc::new(RecordingSleeper::new());
    let scraper = scraper_with(&transport, &sleeper);

    let strategy = MarkerStrategy { solve_passes: true };
    let mut target = ScrapeTarget::new("warmup", "https://site.example/list", &strategy);
    target.home_url = Some("https://site.example");

    let body = scraper
        .scrape(&target, |html| Ok(html.to_string()))
        .await
        .unwrap();
    assert!(body.contains("real content"));
    assert!(sleeper.recorded().is_empty());
    assert_eq!(
        transport
            .session_commands()
            .iter()
            .map(|(cmd, _)| cmd.as_str())
            .collect::<Vec<_>>(),
        vec!["sessions.create", "sessions.destroy"]
    );
}

#[tokio::test]
async fn test_failed_solve_burns_attempt_then_recovers() {
    // Attempt 1: home shows the interstitial and the solve sequence does
    // not clear it. Attempt 2: clean all the way through.
    let transport = Arc::new(ScriptedTransport::new(vec![
        ScriptStep::Page(page("just a moment... checking your browser")),
        ScriptStep::Page(page("<p>welcome</p>")),
        ScriptStep::Page(page("<div class=\"results\">second try content</div>")),
    ]));
    let sleeper = Arc::new(RecordingSleeper::new());

    let failing = MarkerStrategy {
        solve_passes: false,
    };
    let scraper = scraper_with(&transport, &sleeper);
    let mut target = ScrapeTarget::new("solve-fail", "https://site.example/list", &failing);
    target.home_url = Some("https://site.example");

    let body = scraper
        .scrape(&target, |html| Ok(html.to_string()))
        .await
        .unwrap();
    assert!(body.contains("second try content"));
    assert_eq!(sleeper.recorded(), vec![Duration::from_millis(2000)]);
}

#[tokio::test]
async fn test_proxy_soft_failure_retries_then_succeeds() {
    // A proxy render failure degrades to an empty body, which counts as a
    // failed attempt, not a hard error.
    let transport = Arc::new(ScriptedTransport::new(vec![
        ScriptStep::ProxyError,
        ScriptStep::Page(page("<div>recovered content</div>")),
    ]));
    let sleeper = Arc::new(RecordingSleeper::new());
    let scraper = scraper_with(&transport, &sleeper);

    let strategy = MarkerStrategy { solve_passes: true };
    let target = ScrapeTarget::new("soft-fail", "https://site.example/list", &strategy);

    let body = scraper
        .scrape(&target, |html| Ok(html.to_string()))
        .await
        .unwrap();
    assert!(body.contains("recovered content"));
    assert_eq!(sleeper.recorded(), vec![Duration::from_millis(2000)]);
    assert_eq!(transport.fetch_count(), 2);
}

#[tokio::test]
async fn test_empty_parse_result_is_success_not_retry() {
    // A clean page whose parse yields zero items completes on the first
    // attempt: empty result and fetch failure are distinct outcomes.
    let transport = Arc::new(ScriptedTransport::new(vec![ScriptStep::Page(page(
        "<div class=\"results\"></div> no matches for this query",
    ))]));
    let sleeper = Arc::new(RecordingSleeper::new());
    let scraper = scraper_with(&transport, &sleeper);

    let strategy = MarkerStrategy { solve_passes: true };
    let target = ScrapeTarget::new("empty-ok", "https://site.example/list?q=zzz", &strategy);

    let records: Vec<String> = scraper.scrape(&target, |_| Ok(Vec::new())).await.unwrap();
    assert!(records.is_empty());
    assert!(sleeper.recorded().is_empty());
    assert_eq!(transport.fetch_count(), 1);
}

#[tokio::test]
async fn test_not_found_page_surfaces_resource_not_found() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        ScriptStep::Page(page("page introuvable")),
        ScriptStep::Page(page("page introuvable")),
        ScriptStep::Page(page("page introuvable")),
    ]));
    let sleeper = Arc::new(RecordingSleeper::new());
    let scraper = scraper_with(&transport, &sleeper);

    let strategy = MarkerStrategy { solve_passes: true };
    let mut target = ScrapeTarget::new("missing", "https://site.example/item/999", &strategy);
    target.kind = PageKind::Detail;

    let result: Result<String, _> = scraper.scrape(&target, |html| Ok(html.to_string())).await;
    match result.unwrap_err() {
        ScrapeError::RetriesExhausted { source, .. } => {
            assert!(matches!(*source, ScrapeError::ResourceNotFound(_)));
        }
        other => panic!("expected RetriesExhausted, got {other}"),
    }
}
