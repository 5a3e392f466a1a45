//! Tracing conventions for circsearch.
//!
//! Span names used across the crates, plus level parsing helpers.
//! Subscriber installation lives in the `circsearch` facade; library crates
//! only emit events.

use tracing::Level;

/// Target prefix used by all circsearch tracing spans and events.
///
/// ```text
/// RUST_LOG=circsearch=debug
/// ```
pub const TARGET_PREFIX: &str = "circsearch";

/// Standard tracing span names used across the pipeline.
pub mod span_names {
    /// Root span for one `build_from_file` run.
    pub const INGEST: &str = "circsearch::ingest";
    /// Building documents from one record unit.
    pub const ASSEMBLE: &str = "circsearch::assemble";
    /// Final index commit.
    pub const COMMIT: &str = "circsearch::commit";
}

/// Parse a log level string (case-insensitive).
///
/// Recognized values: `trace`, `debug`, `info`, `warn`, `error`.
#[must_use]
pub fn parse_level(s: &str) -> Option<Level> {
    match s.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Checks `CIRCSEARCH_LOG_LEVEL`, falling back to `default`.
#[must_use]
pub fn level_from_env(default: Level) -> Level {
    std::env::var("CIRCSEARCH_LOG_LEVEL")
        .ok()
        .and_then(|s| parse_level(&s))
        .unwrap_or(default)
}
