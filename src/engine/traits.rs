//! Traits and types for the media-fetch engine seam

use async_trait::async_trait;
use std::path::PathBuf;

/// Status reported by the engine with each progress notification
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgressStatus {
    /// Bytes are being transferred
    Downloading,
    /// The transfer of one file completed
    Finished,
    /// The transfer failed
    Error,
    /// Any status this crate does not interpret
    Other(String),
}

impl ProgressStatus {
    /// Map the engine's raw status string
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim() {
            "downloading" => Self::Downloading,
            "finished" => Self::Finished,
            "error" => Self::Error,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Native progress callback payload
///
/// Every numeric field is optional; engines leave out what they do not know.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressNotification {
    /// Current status
    pub status: ProgressStatus,
    /// Bytes downloaded so far
    pub downloaded_bytes: Option<u64>,
    /// Exact total size
    pub total_bytes: Option<u64>,
    /// Estimated total size, used when the exact size is unknown
    pub total_bytes_estimate: Option<u64>,
    /// Transfer speed in bytes per second
    pub speed: Option<f64>,
    /// Estimated seconds remaining
    pub eta: Option<f64>,
    /// File the engine is writing
    pub filename: Option<String>,
}

impl ProgressNotification {
    /// A notification carrying only a status
    pub fn new(status: ProgressStatus) -> Self {
        Self {
            status,
            downloaded_bytes: None,
            total_bytes: None,
            total_bytes_estimate: None,
            speed: None,
            eta: None,
            filename: None,
        }
    }

    /// A `downloading` notification with byte counts
    pub fn downloading(downloaded_bytes: u64, total_bytes: Option<u64>) -> Self {
        Self {
            downloaded_bytes: Some(downloaded_bytes),
            total_bytes,
            ..Self::new(ProgressStatus::Downloading)
        }
    }

    /// A `finished` notification for `filename`
    pub fn finished(filename: Option<String>) -> Self {
        Self {
            filename,
            ..Self::new(ProgressStatus::Finished)
        }
    }
}

/// Severity of an engine log line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineLogLevel {
    /// Engine internals, never shown to the user
    Debug,
    /// Informational output
    Info,
    /// Recoverable problem
    Warning,
    /// Failure description
    Error,
}

/// Post-processing step the engine runs after the transfer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PostProcessor {
    /// Extract the audio track and convert it
    ExtractAudio {
        /// Target codec (e.g. "mp3")
        codec: String,
        /// Target quality (e.g. "192" kbps)
        quality: String,
    },
}

/// Options handed to the engine for a single download
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineOptions {
    /// Output path template, `%(title)s.%(ext)s` style
    pub output_template: String,
    /// Download only the single item even when the URL names a playlist
    pub no_playlist: bool,
    /// Format selector
    pub format: String,
    /// Container to merge separate video and audio streams into
    pub merge_output_format: Option<String>,
    /// Steps to run after the transfer
    pub post_processors: Vec<PostProcessor>,
    /// Suppress the engine's own console output
    pub quiet: bool,
    /// Suppress engine warnings
    pub no_warnings: bool,
    /// Directory containing the converter binaries
    pub converter_location: Option<PathBuf>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            output_template: "%(title)s.%(ext)s".into(),
            no_playlist: true,
            format: "best".into(),
            merge_output_format: None,
            post_processors: Vec::new(),
            quiet: true,
            no_warnings: true,
            converter_location: None,
        }
    }
}

/// Callbacks an engine invokes while it works
///
/// Implemented by the orchestrator's progress bridge. Returning an error from
/// [`EngineHooks::on_progress`] asks the engine to stop; the engine must abandon
/// the download and return that error from [`MediaEngine::download`].
pub trait EngineHooks: Send {
    /// Progress notification from the transfer loop
    fn on_progress(&mut self, notification: &ProgressNotification) -> crate::Result<()>;

    /// A line of engine log output
    fn on_log(&mut self, level: EngineLogLevel, message: &str);
}

/// Trait for the external media-fetch engine
///
/// The engine resolves the URL, selects formats, transfers bytes, merges
/// streams and runs post-processors. This crate only configures it and
/// listens to its callbacks.
///
/// # Examples
///
/// ```no_run
/// use media_dl::engine::{
///     EngineHooks, EngineLogLevel, EngineOptions, MediaEngine, ProgressNotification, YtDlpEngine,
/// };
///
/// struct Print;
///
/// impl EngineHooks for Print {
///     fn on_progress(&mut self, n: &ProgressNotification) -> media_dl::Result<()> {
///         println!("{:?}", n.downloaded_bytes);
///         Ok(())
///     }
///     fn on_log(&mut self, _level: EngineLogLevel, message: &str) {
///         println!("{message}");
///     }
/// }
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = YtDlpEngine::from_path().expect("yt-dlp not found in PATH");
/// engine
///     .download("https://example.com/watch?v=x", &EngineOptions::default(), &mut Print)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Download `url` with `options`, reporting through `hooks`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The engine cannot be started ([`crate::Error::ExternalTool`])
    /// - The engine reports a failure ([`crate::Error::Engine`], message verbatim)
    /// - A hook asked to stop (the hook's own error, e.g. [`crate::Error::Cancelled`])
    /// - No engine is available ([`crate::Error::NotSupported`])
    async fn download(
        &self,
        url: &str,
        options: &EngineOptions,
        hooks: &mut dyn EngineHooks,
    ) -> crate::Result<()>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
