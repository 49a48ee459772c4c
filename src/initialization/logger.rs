//! Logger initialization.
//!
//! This module provides a helper to initialize the logger with sensible
//! module-level filtering for the crates this library pulls in.

use log::LevelFilter;

/// Initializes the logger with the specified level.
///
/// Configures `env_logger` reading from the `RUST_LOG` environment variable
/// first, then overriding with the provided level. Noisy lower layers
/// (html5ever, selectors, reqwest, hyper) are clamped so that debug-level
/// scraping logs stay readable.
///
/// Safe to call once per process; subsequent calls return an error from
/// `env_logger`, which is reported as `Err` here so callers embedding this
/// library next to their own logger can ignore it deliberately.
///
/// # Arguments
///
/// * `level` - Minimum log level to display (overrides `RUST_LOG` if set)
///
/// # Errors
///
/// Returns the underlying `log::SetLoggerError` if a logger is already
/// installed.
pub fn init_logger_with(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    builder.filter_module("html5ever", LevelFilter::Error);
    builder.filter_module("selectors", LevelFilter::Warn);
    builder.filter_module("reqwest", LevelFilter::Info);
    builder.filter_module("hyper", LevelFilter::Info);
    builder.filter_module("collecta", level);

    builder.try_init()
}
