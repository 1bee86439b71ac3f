//! CLI error type.

use gopatcher::OverlayError;
use thiserror::Error;

/// Errors surfaced to the user by the `gopatcher` binary.
///
/// All of them end the process with exit status 1.
#[derive(Debug, Error)]
pub enum CliError {
    /// The log subscriber could not be installed.
    #[error("failed to initialise logging: {0}")]
    Logging(String),

    /// Overlay generation failed.
    #[error("could not generate overlay")]
    Overlay(#[from] OverlayError),
}
