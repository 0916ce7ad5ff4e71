//! Shared test helpers: a scripted engine and converter fixtures.

use crate::config::ToolsConfig;
use crate::engine::{
    EngineHooks, EngineLogLevel, EngineOptions, MediaEngine, ProgressNotification,
};
use crate::error::{Error, Result};
use crate::tools::converter_binary_name;
use crate::types::DownloadEvent;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// One scripted engine action
#[derive(Clone, Debug)]
pub(crate) enum Step {
    Progress(ProgressNotification),
    Log(EngineLogLevel, String),
    Sleep(Duration),
    /// Create `name` in the directory of the output template
    WriteFile(String, Vec<u8>),
    Fail(String),
}

/// Engine that replays a fixed script of callbacks
pub(crate) struct ScriptedEngine {
    steps: Vec<Step>,
    invocations: AtomicUsize,
    last_options: Mutex<Option<EngineOptions>>,
}

impl ScriptedEngine {
    pub(crate) fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            invocations: AtomicUsize::new(0),
            last_options: Mutex::new(None),
        }
    }

    pub(crate) fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    pub(crate) fn last_options(&self) -> Option<EngineOptions> {
        self.last_options.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaEngine for ScriptedEngine {
    async fn download(
        &self,
        _url: &str,
        options: &EngineOptions,
        hooks: &mut dyn EngineHooks,
    ) -> Result<()> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        *self.last_options.lock().unwrap() = Some(options.clone());

        for step in &self.steps {
            match step {
                Step::Progress(notification) => hooks.on_progress(notification)?,
                Step::Log(level, message) => hooks.on_log(*level, message),
                Step::Sleep(duration) => tokio::time::sleep(*duration).await,
                Step::WriteFile(name, contents) => {
                    let dir = Path::new(&options.output_template)
                        .parent()
                        .map(Path::to_path_buf)
                        .unwrap_or_default();
                    std::fs::write(dir.join(name), contents)?;
                }
                Step::Fail(message) => return Err(Error::Engine(message.clone())),
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Tools config whose bundled directory holds a fake converter
pub(crate) fn tools_with_converter(dir: &Path) -> ToolsConfig {
    std::fs::write(dir.join(converter_binary_name()), b"").unwrap();
    ToolsConfig {
        ytdlp_path: None,
        ffmpeg_dir: dir.to_path_buf(),
        search_path: false,
    }
}

/// Tools config that can never find a converter
pub(crate) fn tools_without_converter(dir: &Path) -> ToolsConfig {
    ToolsConfig {
        ytdlp_path: None,
        ffmpeg_dir: PathBuf::from(dir).join("no-ffmpeg-here"),
        search_path: false,
    }
}

/// Snapshot of a collecting sink
pub(crate) fn collected(sink: &Mutex<Vec<DownloadEvent>>) -> Vec<DownloadEvent> {
    sink.lock().unwrap().clone()
}

/// Only the log messages, in order
pub(crate) fn log_messages(events: &[DownloadEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            DownloadEvent::Log { message } => Some(message.clone()),
            _ => None,
        })
        .collect()
}
