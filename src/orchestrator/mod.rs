//! Download orchestration
//!
//! [`Orchestrator::run`] is the unit of work a worker task executes for one
//! [`DownloadRequest`]:
//!
//! 1. check preconditions (converter for MP3 output, existing save folder)
//! 2. build the engine options for the requested mode
//! 3. drive the engine, translating its callbacks into [`DownloadEvent`]s
//! 4. push exactly one terminal [`DownloadEvent::Done`]
//!
//! Nothing escapes `run` as an error: every failure, including cancellation,
//! becomes an `"Error: ..."` log followed by `Done { ok: false }`.

mod bridge;


pub use bridge::CancelPredicate;

use crate::config::{Config, ToolsConfig};
use crate::engine::{EngineOptions, MediaEngine, NoOpEngine, PostProcessor, YtDlpEngine};
use crate::error::{Error, Result};
use crate::queue::EventSink;
use crate::tools::locate_converter;
use crate::types::{DownloadEvent, DownloadRequest, Mode};
use bridge::{CancelPoller, ProgressBridge};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Format selector for [`Mode::VideoMp4`]
pub const VIDEO_FORMAT: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best";

/// Format selector for [`Mode::AudioMp3`]
pub const AUDIO_FORMAT: &str = "bestaudio/best";

/// MP3 bitrate in kbps
pub const AUDIO_QUALITY: &str = "192";

/// File name template appended to the save folder
pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Default minimum time between two cancellation checks
pub const DEFAULT_CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Runs single downloads against a media engine
#[derive(Clone)]
pub struct Orchestrator {
    engine: Arc<dyn MediaEngine>,
    tools: ToolsConfig,
    cancel_poll_interval: Duration,
}

impl Orchestrator {
    /// Create an orchestrator for `engine`, locating the converter through `tools`
    pub fn new(engine: Arc<dyn MediaEngine>, tools: ToolsConfig) -> Self {
        Self {
            engine,
            tools,
            cancel_poll_interval: DEFAULT_CANCEL_POLL_INTERVAL,
        }
    }

    /// Override how often the cancellation predicate may be consulted
    pub fn with_cancel_poll_interval(mut self, interval: Duration) -> Self {
        self.cancel_poll_interval = interval;
        self
    }

    /// Build an orchestrator from configuration, selecting the engine
    ///
    /// An explicit `tools.ytdlp_path` wins; otherwise PATH is searched when
    /// `tools.search_path` is set; otherwise downloads fail with a
    /// not-supported error.
    pub fn from_config(config: &Config) -> Self {
        let engine: Arc<dyn MediaEngine> = if let Some(ref path) = config.tools.ytdlp_path {
            Arc::new(YtDlpEngine::new(path.clone()))
        } else if config.tools.search_path {
            YtDlpEngine::from_path()
                .map(|e| Arc::new(e) as Arc<dyn MediaEngine>)
                .unwrap_or_else(|| Arc::new(NoOpEngine))
        } else {
            Arc::new(NoOpEngine)
        };

        tracing::info!(engine = engine.name(), "Media engine initialized");

        Self::new(engine, config.tools.clone())
            .with_cancel_poll_interval(config.timing.cancel_poll_interval)
    }

    /// Name of the engine in use
    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Run one download to completion, reporting through `sink`
    ///
    /// `cancel` is consulted from the progress path at most once per cancel
    /// poll interval; once it returns `true` the engine is stopped. Returns the
    /// `ok` value of the terminal event, which is always the last event pushed.
    pub async fn run(
        &self,
        request: DownloadRequest,
        sink: &dyn EventSink,
        cancel: Option<&CancelPredicate<'_>>,
    ) -> bool {
        tracing::info!(
            url = %request.url,
            mode = %request.mode,
            engine = self.engine.name(),
            "Starting download"
        );

        match self.try_run(&request, sink, cancel).await {
            Ok(()) => {
                tracing::info!(url = %request.url, "Download finished");
                sink.push(DownloadEvent::log("Finished!"));
                sink.push(DownloadEvent::Done { ok: true });
                true
            }
            Err(e) => {
                if e.is_cancelled() {
                    tracing::info!(url = %request.url, "Download cancelled");
                } else if e.is_configuration() {
                    tracing::info!(url = %request.url, error = %e, "Download rejected");
                } else {
                    tracing::warn!(url = %request.url, error = %e, "Download failed");
                }
                sink.push(DownloadEvent::log(format!("Error: {}", e)));
                sink.push(DownloadEvent::Done { ok: false });
                false
            }
        }
    }

    async fn try_run(
        &self,
        request: &DownloadRequest,
        sink: &dyn EventSink,
        cancel: Option<&CancelPredicate<'_>>,
    ) -> Result<()> {
        let converter = locate_converter(&self.tools);
        if request.mode.requires_converter() && converter.is_none() {
            return Err(Error::MissingConverter {
                bundled_dir: self.tools.ffmpeg_dir.display().to_string(),
            });
        }

        if !request.save_dir.is_dir() {
            return Err(Error::SaveDirMissing(request.save_dir.clone()));
        }

        sink.push(DownloadEvent::log("Starting download..."));
        sink.push(DownloadEvent::log(format!("Mode: {}", request.mode.label())));

        let options = build_engine_options(request, converter);
        let mut bridge =
            ProgressBridge::new(sink, CancelPoller::new(cancel, self.cancel_poll_interval));
        self.engine.download(&request.url, &options, &mut bridge).await
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("engine", &self.engine.name())
            .field("tools", &self.tools)
            .field("cancel_poll_interval", &self.cancel_poll_interval)
            .finish()
    }
}

/// Engine options for `request`
///
/// `converter_location` is the directory holding ffmpeg, passed through as a
/// hint in every mode when known.
pub fn build_engine_options(
    request: &DownloadRequest,
    converter_location: Option<PathBuf>,
) -> EngineOptions {
    let output_template = request
        .save_dir
        .join(OUTPUT_TEMPLATE)
        .to_string_lossy()
        .into_owned();

    let (format, merge_output_format, post_processors) = match request.mode {
        Mode::VideoMp4 => (VIDEO_FORMAT, Some("mp4".to_string()), Vec::new()),
        Mode::AudioMp3 => (
            AUDIO_FORMAT,
            None,
            vec![PostProcessor::ExtractAudio {
                codec: "mp3".into(),
                quality: AUDIO_QUALITY.into(),
            }],
        ),
    };

    EngineOptions {
        output_template,
        no_playlist: true,
        format: format.to_string(),
        merge_output_format,
        post_processors,
        quiet: true,
        no_warnings: true,
        converter_location,
    }
}
