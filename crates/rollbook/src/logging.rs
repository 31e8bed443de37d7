//! Diagnostic logging.
//!
//! Log lines go to stderr so they never interleave with menu output on
//! stdout. `RUST_LOG`, when set, replaces the filter chosen from the
//! command-line flags.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How much the binary reports about its own work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only (`-q`).
    Quiet,
    /// Warnings, such as a data file that failed to load or save.
    #[default]
    Normal,
    /// Store and request tracing (`-v`).
    Verbose,
    /// Everything, including per-write detail (`-vv`).
    Trace,
}

impl Verbosity {
    /// The most detailed level shown at this verbosity.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    fn directive(self) -> String {
        format!("rollbook={}", self.to_level_filter())
    }
}

/// Install the global subscriber. Later calls are no-ops.
///
/// ```no_run
/// use rollbook::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

/// Route warnings raised during tests through the test writer.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_shows_load_warnings() {
        assert_eq!(Verbosity::default(), Verbosity::Normal);
        assert_eq!(Verbosity::Normal.to_level_filter(), Level::WARN);
    }

    #[test]
    fn test_directive_scopes_to_crate() {
        assert_eq!(Verbosity::Quiet.directive(), "rollbook=ERROR");
        assert_eq!(Verbosity::Verbose.directive(), "rollbook=DEBUG");
        assert_eq!(Verbosity::Trace.directive(), "rollbook=TRACE");
    }
}
