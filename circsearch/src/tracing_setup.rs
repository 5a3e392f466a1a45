//! Tracing subscriber initialization for programs embedding circsearch.
//!
//! Builds one `tracing-subscriber` stack writing to stderr.
//!
//! # Filter priority (highest to lowest)
//!
//! 1. `CIRCSEARCH_LOG` (directives, e.g. `circsearch=debug,warn`)
//! 2. `RUST_LOG`
//! 3. `CIRCSEARCH_LOG_LEVEL` (a bare level)
//! 4. The [`Verbosity`] default

use circsearch_core::error::{IngestError, IngestResult};
use circsearch_core::tracing_config;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// How chatty the log output is when no filter is set in the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Warnings and above, which includes skipped records.
    #[default]
    Normal,
    /// Debug output from the circsearch crates.
    Verbose,
}

impl Verbosity {
    #[must_use]
    pub const fn from_flags(verbose: bool, quiet: bool) -> Self {
        if verbose {
            Self::Verbose
        } else if quiet {
            Self::Quiet
        } else {
            Self::Normal
        }
    }

    #[must_use]
    pub const fn default_level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::DEBUG,
        }
    }
}

/// Install the global subscriber.
///
/// `no_color` suppresses ANSI codes even on a terminal.
///
/// # Errors
///
/// Returns `IngestError::SubsystemError` if a global subscriber is already set.
pub fn init_subscriber(verbosity: Verbosity, no_color: bool) -> IngestResult<()> {
    let filter = build_env_filter(verbosity);
    let use_ansi = !no_color && std::io::IsTerminal::is_terminal(&std::io::stderr());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(use_ansi)
        .with_target(true)
        .with_level(true);

    let installed = if verbosity == Verbosity::Verbose {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.with_timer(fmt::time::uptime()))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.without_time().compact())
            .try_init()
    };

    installed.map_err(|e| IngestError::SubsystemError {
        subsystem: "tracing",
        source: Box::new(e),
    })
}

/// `CIRCSEARCH_LOG` > `RUST_LOG` > `CIRCSEARCH_LOG_LEVEL` > verbosity.
/// Unparseable directives fall through to the next source.
fn build_env_filter(verbosity: Verbosity) -> EnvFilter {
    if let Ok(directives) = std::env::var("CIRCSEARCH_LOG")
        && let Ok(filter) = EnvFilter::try_new(&directives)
    {
        return filter;
    }

    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    EnvFilter::new(fallback_directive(verbosity))
}

fn fallback_directive(verbosity: Verbosity) -> String {
    let level = tracing_config::level_from_env(verbosity.default_level());
    if verbosity == Verbosity::Verbose {
        format!("{level},{prefix}=debug", prefix = tracing_config::TARGET_PREFIX)
    } else {
        level.to_string()
    }
}
