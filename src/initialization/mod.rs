//! Initialization module.
//!
//! Provides logger and HTTP client setup helpers. Consumers of the library
//! (route handlers) are expected to call `init_logger_with` once at startup;
//! client construction happens internally when a `Scraper` is built.

mod client;
mod logger;

pub use client::init_proxy_client;
pub use logger::init_logger_with;
