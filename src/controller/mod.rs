//! Consumer side of the download pipeline
//!
//! [`DownloadController`] owns the event queue, allows one download at a time,
//! spawns the orchestrator on a worker task and turns a successful `Done` into
//! a history record. It is driven by polling: call [`DownloadController::poll`]
//! on a fixed cadence (100 ms by default, see
//! [`TimingConfig::poll_interval`](crate::config::TimingConfig)).


use crate::config::Config;
use crate::error::{Error, Result};
use crate::history::HistoryStore;
use crate::orchestrator::Orchestrator;
use crate::queue::{EventQueue, EventSender};
use crate::types::{DownloadEvent, DownloadRecord, DownloadRequest};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct ActiveDownload {
    request: DownloadRequest,
    cancel: CancellationToken,
    task: JoinHandle<bool>,
}

/// Single-download controller with history capture
pub struct DownloadController {
    orchestrator: Arc<Orchestrator>,
    history: HistoryStore,
    runtime: Handle,
    sender: EventSender,
    queue: EventQueue,
    active: Option<ActiveDownload>,
}

impl DownloadController {
    /// Create a controller that spawns download work on `runtime`
    pub fn new(orchestrator: Orchestrator, history: HistoryStore, runtime: Handle) -> Self {
        let (sender, queue) = EventQueue::channel();
        Self {
            orchestrator: Arc::new(orchestrator),
            history,
            runtime,
            sender,
            queue,
            active: None,
        }
    }

    /// Build a controller from configuration
    ///
    /// Selects the engine (see [`Orchestrator::from_config`]) and opens the
    /// history journal at the configured or per-user location.
    pub fn from_config(config: &Config, runtime: Handle) -> Result<Self> {
        config.validate()?;
        let history =
            HistoryStore::with_capacity(config.history.resolved_path(), config.history.capacity);
        tracing::debug!(path = %history.path().display(), "History journal");
        Ok(Self::new(Orchestrator::from_config(config), history, runtime))
    }

    /// Whether a download is in flight
    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    /// The request currently in flight
    pub fn current_request(&self) -> Option<&DownloadRequest> {
        self.active.as_ref().map(|a| &a.request)
    }

    /// The history journal this controller writes to
    pub fn history_store(&self) -> &HistoryStore {
        &self.history
    }

    /// Start a download
    ///
    /// # Errors
    ///
    /// - [`Error::Busy`] while another download is in flight
    /// - [`Error::InvalidUrl`] for an empty or unparsable URL
    /// - [`Error::SaveDirMissing`] when the save folder does not exist
    pub fn submit(&mut self, request: DownloadRequest) -> Result<()> {
        if self.is_busy() {
            return Err(Error::Busy);
        }

        let url = request.url.trim();
        if url.is_empty() {
            return Err(Error::InvalidUrl {
                url: request.url.clone(),
                reason: "please paste a URL".into(),
            });
        }
        url::Url::parse(url).map_err(|e| Error::InvalidUrl {
            url: request.url.clone(),
            reason: e.to_string(),
        })?;

        if !request.save_dir.is_dir() {
            return Err(Error::SaveDirMissing(request.save_dir.clone()));
        }

        let request = DownloadRequest {
            url: url.to_string(),
            ..request
        };
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let orchestrator = Arc::clone(&self.orchestrator);
        let sender = self.sender.clone();
        let job = request.clone();

        tracing::info!(url = %request.url, mode = %request.mode, "Submitting download");
        let task = self.runtime.spawn(async move {
            let predicate = move || token.is_cancelled();
            orchestrator.run(job, &sender, Some(&predicate)).await
        });

        self.active = Some(ActiveDownload {
            request,
            cancel,
            task,
        });
        Ok(())
    }

    /// Ask the in-flight download to stop
    ///
    /// Cooperative: takes effect at the engine's next progress callback.
    /// Returns `false` when nothing is running.
    pub fn cancel(&self) -> bool {
        match &self.active {
            Some(active) => {
                tracing::info!(url = %active.request.url, "Cancellation requested");
                active.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Drain every pending event without blocking
    ///
    /// A `Done` clears the busy state; a successful one also records the
    /// newest file in the save folder in history. A history failure is
    /// reported as an extra `"Warning: ..."` log at the end of the batch.
    pub fn poll(&mut self) -> Vec<DownloadEvent> {
        let mut events = self.queue.drain_nonblocking();

        if let Some(active) = &self.active
            && active.task.is_finished()
            && !events.iter().any(DownloadEvent::is_done)
        {
            // The worker has exited, so everything it pushed is queued by now
            events.extend(self.queue.drain_nonblocking());
            if !events.iter().any(DownloadEvent::is_done) {
                tracing::error!(
                    url = %active.request.url,
                    "Download task ended without a result"
                );
                events.push(DownloadEvent::log("Error: download task ended unexpectedly"));
                events.push(DownloadEvent::Done { ok: false });
            }
        }

        let mut extra = Vec::new();
        for event in &events {
            if let DownloadEvent::Done { ok } = event
                && let Some(active) = self.active.take()
                && *ok
            {
                match self.capture_history(&active.request) {
                    Ok(Some(record)) => {
                        tracing::info!(
                            id = %record.id,
                            title = %record.title,
                            "Recorded download in history"
                        );
                    }
                    Ok(None) => {
                        tracing::debug!(
                            dir = %active.request.save_dir.display(),
                            "No file to record in history"
                        );
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Could not save to history");
                        extra.push(DownloadEvent::log(format!(
                            "Warning: Could not save to history: {}",
                            e
                        )));
                    }
                }
            }
        }
        events.extend(extra);
        events
    }

    fn capture_history(&self, request: &DownloadRequest) -> Result<Option<DownloadRecord>> {
        let Some(latest) = newest_file(&request.save_dir)? else {
            return Ok(None);
        };

        let title = latest
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let size = std::fs::metadata(&latest)?.len();
        let record = DownloadRecord::success(&request.url, title, latest, request.mode, size);

        self.history.try_add(record.clone())?;
        Ok(Some(record))
    }

    /// Stored history, oldest first
    pub fn history(&self) -> Vec<DownloadRecord> {
        self.history.load()
    }

    /// Remove a history record, leaving the file alone
    ///
    /// Returns whether a record was removed.
    pub fn delete_history(&self, id: &str) -> bool {
        self.history.delete(id)
    }

    /// Delete the downloaded file, then its history record
    ///
    /// Returns whether the file was still present on disk. The record is
    /// removed either way.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if no record has this id
    /// - [`Error::Io`] if the file exists but cannot be removed; the record
    ///   is kept in that case
    pub fn delete_file(&self, id: &str) -> Result<bool> {
        let record = self
            .history
            .find(id)
            .ok_or_else(|| Error::NotFound(format!("history record {}", id)))?;

        let existed = record.filepath.is_file();
        if existed {
            std::fs::remove_file(&record.filepath)?;
            tracing::info!(path = %record.filepath.display(), "Deleted downloaded file");
        } else {
            tracing::info!(path = %record.filepath.display(), "Downloaded file already gone");
        }

        self.history.delete(id);
        Ok(existed)
    }
}

/// Most recently modified regular file directly inside `dir`
fn newest_file(dir: &Path) -> Result<Option<PathBuf>> {
    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified()?;
        if newest.as_ref().is_none_or(|(best, _)| modified >= *best) {
            newest = Some((modified, entry.path()));
        }
    }
    Ok(newest.map(|(_, path)| path))
}
