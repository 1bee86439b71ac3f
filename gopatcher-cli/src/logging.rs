//! Log subscriber setup.
//!
//! Logs go to stderr: stdout carries nothing but the manifest path, so the
//! binary can be used as `go build -overlay=$(gopatcher)`.

use tracing_subscriber::EnvFilter;

use crate::error::CliError;

/// Default filter for a `-v` count, used when `RUST_LOG` is not set.
pub fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.
pub fn init(verbose: u8) -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))
}
