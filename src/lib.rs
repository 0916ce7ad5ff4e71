//! # media-dl
//!
//! Download orchestration and progress event pipeline around an external
//! media-fetch engine (yt-dlp).
//!
//! ## Design Philosophy
//!
//! media-dl is designed to be:
//! - **Engine-agnostic** - The engine sits behind the [`engine::MediaEngine`] trait
//! - **Poll-driven** - Workers push events into a queue; the consumer drains it on a timer
//! - **Cooperative** - Cancellation is a predicate checked from the progress path
//! - **Forgiving** - A corrupt or unwritable history journal never breaks a download
//!
//! ## Quick Start
//!
//! ```no_run
//! use media_dl::{Config, DownloadController, DownloadEvent, DownloadRequest, Mode};
//! use media_dl::format::format_status_line;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let mut controller =
//!         DownloadController::from_config(&config, tokio::runtime::Handle::current())?;
//!
//!     controller.submit(DownloadRequest::new(
//!         "https://www.youtube.com/watch?v=jNQXAC9IVRw",
//!         "/tmp",
//!         Mode::AudioMp3,
//!     ))?;
//!
//!     let mut ticker = tokio::time::interval(config.timing.poll_interval);
//!     while controller.is_busy() {
//!         ticker.tick().await;
//!         for event in controller.poll() {
//!             match event {
//!                 DownloadEvent::Log { message } => println!("{message}"),
//!                 DownloadEvent::Progress(update) => println!("{}", format_status_line(&update)),
//!                 DownloadEvent::Done { ok } => println!("done: {ok}"),
//!             }
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Consumer-side controller: busy gating, worker spawn, history capture
pub mod controller;
/// Media-fetch engine seam and implementations
pub mod engine;
/// Error types
pub mod error;
/// Display formatting for progress
pub mod format;
/// Capped JSON download history
pub mod history;
/// Single-download orchestration
pub mod orchestrator;
/// Event queue between workers and the consumer
pub mod queue;
/// Converter discovery
pub mod tools;
/// Core types and events
pub mod types;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use config::Config;
pub use controller::DownloadController;
pub use engine::{EngineOptions, MediaEngine, NoOpEngine, YtDlpEngine};
pub use error::{Error, Result};
pub use history::HistoryStore;
pub use orchestrator::{CancelPredicate, Orchestrator};
pub use queue::{EventQueue, EventSender, EventSink};
pub use types::{
    DownloadEvent, DownloadRecord, DownloadRequest, Mode, ProgressUpdate, RecordStatus,
};

/// Wait for a termination request (Ctrl+C, and SIGTERM on Unix)
///
/// Consumers use this to trigger [`DownloadController::cancel`].
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
#[cfg(unix)]
pub async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register signal handlers, using ctrl_c fallback");
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
            }
        }
    }
}

/// Wait for a termination request (Ctrl+C)
///
/// Consumers use this to trigger [`DownloadController::cancel`].
#[cfg(not(unix))]
pub async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
