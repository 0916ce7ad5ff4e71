//! Error types for media-dl
//!
//! Every failure the orchestration layer can run into is one of these variants.
//! The orchestrator never returns them to its caller; it renders them into the
//! event stream instead. The controller and the history store return them
//! directly.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for media-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for media-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "history.path")
        key: Option<String>,
    },

    /// MP3 conversion was requested but no converter binary could be found
    #[error(
        "FFmpeg is required for MP3 conversion but was not found. \
         Install FFmpeg (e.g. 'brew install ffmpeg' on macOS) or \
         place ffmpeg binaries in {bundled_dir}."
    )]
    MissingConverter {
        /// Directory that was checked for a bundled converter
        bundled_dir: String,
    },

    /// The requested save directory does not exist
    #[error("Save folder does not exist: {}", .0.display())]
    SaveDirMissing(PathBuf),

    /// The submitted URL is empty or cannot be parsed
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The rejected URL as submitted
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// A download is already in flight
    #[error("a download is already in progress")]
    Busy,

    /// The media engine reported a failure (network, format, conversion)
    ///
    /// The message is the engine's own text, surfaced verbatim.
    #[error("{0}")]
    Engine(String),

    /// The user asked for the in-flight download to stop
    #[error("download cancelled")]
    Cancelled,

    /// External tool could not be executed or talked to (yt-dlp, ffmpeg)
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// Operation not supported (missing binary, not implemented, etc.)
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Record not found
    #[error("not found: {0}")]
    NotFound(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error is the cancellation outcome rather than a real failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Whether this error was detected before the engine was invoked
    ///
    /// These are recoverable by fixing the environment and retrying.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Config { .. }
                | Error::MissingConverter { .. }
                | Error::SaveDirMissing(_)
                | Error::InvalidUrl { .. }
        )
    }
}
