//! Translation of engine callbacks into download events

use crate::engine::{EngineHooks, EngineLogLevel, ProgressNotification, ProgressStatus};
use crate::error::{Error, Result};
use crate::queue::EventSink;
use crate::types::{DownloadEvent, ProgressUpdate};
use std::time::Duration;
use tokio::time::Instant;

/// Cancellation predicate polled from the progress path
///
/// The predicate may borrow caller state for the duration of a run.
pub type CancelPredicate<'a> = dyn Fn() -> bool + Send + Sync + 'a;

/// Rate-limited access to a cancellation predicate
///
/// The first check always consults the predicate; later checks do so only once
/// `interval` has elapsed since the previous consultation.
pub(crate) struct CancelPoller<'a> {
    predicate: Option<&'a CancelPredicate<'a>>,
    interval: Duration,
    last_poll: Option<Instant>,
}

impl<'a> CancelPoller<'a> {
    pub(crate) fn new(predicate: Option<&'a CancelPredicate<'a>>, interval: Duration) -> Self {
        Self {
            predicate,
            interval,
            last_poll: None,
        }
    }

    pub(crate) fn should_cancel(&mut self) -> bool {
        let Some(predicate) = self.predicate else {
            return false;
        };

        let now = Instant::now();
        if let Some(last) = self.last_poll
            && now.duration_since(last) < self.interval
        {
            return false;
        }
        self.last_poll = Some(now);
        predicate()
    }
}

/// Engine hooks that feed an [`EventSink`]
///
/// Holds the per-download context explicitly: where events go and how to ask
/// whether the user wants to stop.
pub(crate) struct ProgressBridge<'a> {
    sink: &'a dyn EventSink,
    cancel: CancelPoller<'a>,
}

impl<'a> ProgressBridge<'a> {
    pub(crate) fn new(sink: &'a dyn EventSink, cancel: CancelPoller<'a>) -> Self {
        Self { sink, cancel }
    }
}

impl EngineHooks for ProgressBridge<'_> {
    fn on_progress(&mut self, notification: &ProgressNotification) -> Result<()> {
        if self.cancel.should_cancel() {
            tracing::info!("Cancellation requested, stopping engine");
            return Err(Error::Cancelled);
        }

        let downloaded = notification.downloaded_bytes.unwrap_or(0);
        let total = notification
            .total_bytes
            .filter(|t| *t > 0)
            .or(notification.total_bytes_estimate)
            .unwrap_or(0);

        match &notification.status {
            ProgressStatus::Downloading => {
                self.sink.push(DownloadEvent::Progress(ProgressUpdate::from_bytes(
                    downloaded,
                    total,
                    notification.speed,
                    notification.eta,
                )));
            }
            ProgressStatus::Finished => {
                self.sink
                    .push(DownloadEvent::Progress(ProgressUpdate::complete(downloaded, total)));
                if let Some(filename) = notification.filename.as_deref().filter(|f| !f.is_empty())
                {
                    self.sink.push(DownloadEvent::log(format!("Downloaded: {}", filename)));
                }
                self.sink.push(DownloadEvent::log("Finalizing..."));
            }
            ProgressStatus::Error | ProgressStatus::Other(_) => {}
        }
        Ok(())
    }

    fn on_log(&mut self, level: EngineLogLevel, message: &str) {
        let text = match level {
            EngineLogLevel::Debug => return,
            EngineLogLevel::Info => message.to_string(),
            EngineLogLevel::Warning => format!("Warning: {}", message),
            EngineLogLevel::Error => format!("Error: {}", message),
        };
        self.sink.push(DownloadEvent::log(text));
    }
}
