//! Error kinds shared across the chart core.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the chart core.
///
/// All of these are local to the command or slice they affect; none of them
/// terminates the engine loop.
#[derive(Error, Debug)]
pub enum ChartError {
    /// The decoder reported unusable audio (no samples, zero sample rate,
    /// or an unreadable file).
    #[error("invalid audio data in '{}': {reason}", path.display())]
    InvalidAudioData { path: PathBuf, reason: String },

    /// A text-protocol command line could not be parsed.
    #[error("malformed command '{input}': {reason}")]
    MalformedCommand { input: String, reason: String },

    /// The renderer could not materialize geometry.
    #[error("failed to create {what} geometry")]
    ResourceCreationFailure { what: String },
}

impl ChartError {
    /// Shorthand for decode/metadata failures.
    pub fn invalid_audio(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ChartError::InvalidAudioData {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for command parse failures.
    pub fn malformed(input: impl Into<String>, reason: impl Into<String>) -> Self {
        ChartError::MalformedCommand {
            input: input.into(),
            reason: reason.into(),
        }
    }
}
