//! yt-dlp engine driven as an external process

use super::parser::{OutputLine, parse_line, progress_template};
use super::traits::{EngineHooks, EngineLogLevel, EngineOptions, MediaEngine, PostProcessor};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};

/// Media engine backed by the `yt-dlp` executable
///
/// Each download spawns one `yt-dlp` process. Progress is requested through a
/// machine-readable `--progress-template` and both output streams are read line
/// by line, so hooks fire while the transfer runs.
///
/// # Examples
///
/// ```no_run
/// use media_dl::engine::{MediaEngine, YtDlpEngine};
/// use std::path::PathBuf;
///
/// // Create with explicit path
/// let engine = YtDlpEngine::new(PathBuf::from("/usr/local/bin/yt-dlp"));
///
/// // Or auto-discover from PATH
/// let engine = YtDlpEngine::from_path().expect("yt-dlp not found in PATH");
/// assert_eq!(engine.name(), "yt-dlp");
/// ```
#[derive(Debug, Clone)]
pub struct YtDlpEngine {
    binary_path: PathBuf,
}

impl YtDlpEngine {
    /// Create a new engine with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Attempt to find yt-dlp in PATH
    ///
    /// Returns `None` if the binary is not found.
    pub fn from_path() -> Option<Self> {
        which::which("yt-dlp").ok().map(Self::new)
    }

    /// Path of the executable this engine runs
    pub fn binary_path(&self) -> &PathBuf {
        &self.binary_path
    }

    async fn stop(child: &mut Child) {
        if let Err(e) = child.kill().await {
            tracing::debug!(error = %e, "yt-dlp already exited before kill");
        }
    }
}

/// Translate engine options into yt-dlp command-line arguments
pub(crate) fn build_args(url: &str, options: &EngineOptions) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "--newline".into(),
        "--progress".into(),
        "--progress-template".into(),
        progress_template().into(),
    ];

    if options.quiet {
        args.push("--quiet".into());
    }
    if options.no_warnings {
        args.push("--no-warnings".into());
    }
    if options.no_playlist {
        args.push("--no-playlist".into());
    }

    args.push("-f".into());
    args.push(options.format.clone().into());

    if let Some(container) = &options.merge_output_format {
        args.push("--merge-output-format".into());
        args.push(container.clone().into());
    }

    for post_processor in &options.post_processors {
        match post_processor {
            PostProcessor::ExtractAudio { codec, quality } => {
                args.push("--extract-audio".into());
                args.push("--audio-format".into());
                args.push(codec.clone().into());
                args.push("--audio-quality".into());
                args.push(quality.clone().into());
            }
        }
    }

    if let Some(location) = &options.converter_location {
        args.push("--ffmpeg-location".into());
        args.push(location.clone().into_os_string());
    }

    args.push("-o".into());
    args.push(options.output_template.clone().into());
    // Terminate option parsing so a URL starting with '-' is never read as a flag
    args.push("--".into());
    args.push(url.into());
    args
}

#[async_trait]
impl MediaEngine for YtDlpEngine {
    async fn download(
        &self,
        url: &str,
        options: &EngineOptions,
        hooks: &mut dyn EngineHooks,
    ) -> Result<()> {
        let args = build_args(url, options);
        tracing::debug!(binary = %self.binary_path.display(), ?args, "Spawning yt-dlp");

        let mut child = Command::new(&self.binary_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::ExternalTool(format!("Failed to execute yt-dlp: {}", e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::ExternalTool("Failed to capture yt-dlp stdout".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::ExternalTool("Failed to capture yt-dlp stderr".into()))?;

        let mut stdout = BufReader::new(stdout).lines();
        let mut stderr = BufReader::new(stderr).lines();
        let mut stdout_open = true;
        let mut stderr_open = true;
        let mut last_error: Option<String> = None;

        while stdout_open || stderr_open {
            // next_line is cancel safe, so losing the race drops no data
            let read = tokio::select! {
                line = stdout.next_line(), if stdout_open => (line, true),
                line = stderr.next_line(), if stderr_open => (line, false),
            };

            let line = match read {
                (Ok(Some(line)), _) => line,
                (Ok(None), true) => {
                    stdout_open = false;
                    continue;
                }
                (Ok(None), false) => {
                    stderr_open = false;
                    continue;
                }
                (Err(e), _) => {
                    Self::stop(&mut child).await;
                    return Err(Error::ExternalTool(format!(
                        "Failed to read yt-dlp output: {}",
                        e
                    )));
                }
            };

            match parse_line(&line) {
                Some(OutputLine::Progress(notification)) => {
                    if let Err(e) = hooks.on_progress(&notification) {
                        tracing::debug!(error = %e, "Progress hook stopped yt-dlp");
                        Self::stop(&mut child).await;
                        return Err(e);
                    }
                }
                Some(OutputLine::Log(level, message)) => {
                    if level == EngineLogLevel::Error {
                        last_error = Some(message.clone());
                    }
                    hooks.on_log(level, &message);
                }
                None => {}
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| Error::ExternalTool(format!("Failed while waiting for yt-dlp: {}", e)))?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::Engine(last_error.unwrap_or_else(|| {
                format!("yt-dlp exited with {}", status)
            })))
        }
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}
