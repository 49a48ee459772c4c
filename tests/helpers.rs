// Shared test helpers: scripted transport and fake clock doubles.
//
// These let integration tests drive the full orchestration pipeline
// (session lifecycle, challenge handling, retry/backoff) without a
// running proxy or any real sleeping.

#![allow(dead_code)] // Each test binary uses a subset of these helpers.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use collecta::{
    classify_with, ChallengeState, ChallengeStrategy, MarkerRules, ProxyFetcher, ScrapeError,
    Sleeper, SolverCommand, SolverResponse, SolverSolution, SolverTransport,
};

/// One scripted answer to a `request.get` command.
pub enum ScriptStep {
    /// Successful render with the given body (target status 200).
    Page(String),
    /// Proxy envelope error (render failure, expired session).
    ProxyError,
}

/// Transport double that acknowledges session commands, answers
/// `request.get` from a script, and records every command it saw.
pub struct ScriptedTransport {
    commands: Mutex<Vec<SolverCommand>>,
    script: Mutex<VecDeque<ScriptStep>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<ScriptStep>) -> Self {
        ScriptedTransport {
            commands: Mutex::new(Vec::new()),
            script: Mutex::new(script.into()),
        }
    }

    /// Command names in the order they were sent.
    pub fn command_names(&self) -> Vec<String> {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .map(|command| command.cmd.clone())
            .collect()
    }

    /// Session-lifecycle commands only, as `(name, session)` pairs.
    pub fn session_commands(&self) -> Vec<(String, String)> {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .filter(|command| command.cmd.starts_with("sessions."))
            .map(|command| {
                (
                    command.cmd.clone(),
                    command.session.clone().unwrap_or_default(),
                )
            })
            .collect()
    }

    pub fn fetch_count(&self) -> usize {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .filter(|command| command.cmd == "request.get")
            .count()
    }
}

#[async_trait]
impl SolverTransport for ScriptedTransport {
    async fn send(&self, command: SolverCommand) -> Result<SolverResponse, ScrapeError> {
        self.commands.lock().unwrap().push(command.clone());
        match command.cmd.as_str() {
            "request.get" => match self.script.lock().unwrap().pop_front() {
                Some(ScriptStep::Page(body)) => Ok(SolverResponse {
                    status: "ok".to_string(),
                    message: String::new(),
                    session: None,
                    sessions: None,
                    solution: Some(SolverSolution {
                        url: command.url.unwrap_or_default(),
                        status: 200,
                        response: body,
                        user_agent: "test-agent".to_string(),
                    }),
                }),
                Some(ScriptStep::ProxyError) => Ok(SolverResponse {
                    status: "error".to_string(),
                    message: "browser render failed".to_string(),
                    session: None,
                    sessions: None,
                    solution: None,
                }),
                None => panic!("script exhausted: unexpected request.get"),
            },
            _ => Ok(SolverResponse {
                status: "ok".to_string(),
                message: String::new(),
                session: command.session.clone(),
                sessions: Some(command.session.into_iter().collect()),
                solution: None,
            }),
        }
    }
}

/// Fake clock that records requested backoff delays without sleeping.
pub struct RecordingSleeper {
    pub delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        RecordingSleeper {
            delays: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

pub const TEST_MARKERS: MarkerRules = MarkerRules {
    challenge_markers: &["just a moment", "cf-chl"],
    blocked_markers: &["you have been blocked"],
    not_found_markers: &["page introuvable"],
    min_page_len: 0,
};

/// Marker-table strategy whose solve outcome is fixed up front.
pub struct MarkerStrategy {
    pub solve_passes: bool,
}

#[async_trait]
impl ChallengeStrategy for MarkerStrategy {
    fn classify(&self, html: &str) -> ChallengeState {
        classify_with(&TEST_MARKERS, html)
    }

    async fn solve(
        &self,
        _fetcher: &ProxyFetcher,
        _session_id: &str,
        _lang: &str,
    ) -> Result<bool, ScrapeError> {
        Ok(self.solve_passes)
    }
}

/// Pads content out to a body long enough to pass the usable-length check.
pub fn page(content: &str) -> String {
    format!(
        "<html><head><title>fixture</title></head><body>{content}</body>\
         <!-- padding padding padding padding padding --></html>"
    )
}
