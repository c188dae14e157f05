//! Logging setup: a global `tracing` subscriber writing to stderr.
//!
//! `RUST_LOG` takes precedence; otherwise the level is `info`, or `debug`
//! when verbose output was requested.

use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(Box<dyn std::error::Error + Send + Sync + 'static>),
}

pub fn init(verbose: bool) -> Result<(), LoggingError> {
    let filter = build_env_filter(verbose);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(LoggingError::SetGlobal)
}

fn default_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

fn build_env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level(verbose)))
}
