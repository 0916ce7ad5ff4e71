//! No-op engine for graceful degradation

use super::traits::{EngineHooks, EngineOptions, MediaEngine};
use async_trait::async_trait;

/// Engine used when no yt-dlp binary is available or configured
///
/// Every download fails with `Error::NotSupported`, which the orchestrator
/// renders as an error log followed by `Done { ok: false }`.
///
/// # Examples
///
/// ```
/// use media_dl::engine::{EngineOptions, MediaEngine, NoOpEngine};
/// # use media_dl::engine::{EngineHooks, EngineLogLevel, ProgressNotification};
/// # struct Ignore;
/// # impl EngineHooks for Ignore {
/// #     fn on_progress(&mut self, _n: &ProgressNotification) -> media_dl::Result<()> { Ok(()) }
/// #     fn on_log(&mut self, _l: EngineLogLevel, _m: &str) {}
/// # }
///
/// # #[tokio::main]
/// # async fn main() {
/// let result = NoOpEngine
///     .download("https://example.com/v", &EngineOptions::default(), &mut Ignore)
///     .await;
/// assert!(result.is_err());
/// # }
/// ```
pub struct NoOpEngine;

#[async_trait]
impl MediaEngine for NoOpEngine {
    async fn download(
        &self,
        _url: &str,
        _options: &EngineOptions,
        _hooks: &mut dyn EngineHooks,
    ) -> crate::Result<()> {
        Err(crate::Error::NotSupported(
            "Downloading requires the external yt-dlp binary. \
             Configure tools.ytdlp_path in config or ensure yt-dlp is in PATH."
                .into(),
        ))
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
