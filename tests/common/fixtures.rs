//! Engines, scripts and configs for integration tests

use async_trait::async_trait;
use media_dl::Config;
use media_dl::config::{HistoryConfig, TimingConfig, ToolsConfig};
use media_dl::engine::{
    EngineHooks, EngineLogLevel, EngineOptions, MediaEngine, ProgressNotification,
};
use media_dl::tools::converter_binary_name;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-process engine that reports a fixed number of progress ticks
pub struct TickingEngine {
    pub ticks: u64,
    pub tick_interval: Duration,
    pub total_bytes: u64,
    pub calls: AtomicUsize,
}

impl TickingEngine {
    pub fn new(ticks: u64, tick_interval: Duration) -> Self {
        Self {
            ticks,
            tick_interval,
            total_bytes: ticks * 1024,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MediaEngine for TickingEngine {
    async fn download(
        &self,
        url: &str,
        options: &EngineOptions,
        hooks: &mut dyn EngineHooks,
    ) -> media_dl::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        hooks.on_log(EngineLogLevel::Debug, "[debug] starting");
        hooks.on_log(EngineLogLevel::Info, &format!("[generic] {url}: Downloading"));

        for i in 1..=self.ticks {
            let mut n = ProgressNotification::downloading(i * 1024, Some(self.total_bytes));
            n.speed = Some(2048.0);
            n.eta = Some(((self.ticks - i) as f64) * self.tick_interval.as_secs_f64());
            hooks.on_progress(&n)?;
            tokio::time::sleep(self.tick_interval).await;
        }

        let file = Path::new(&options.output_template).with_file_name("Ticking Clip.mp4");
        std::fs::write(&file, vec![0u8; self.total_bytes as usize])?;
        let mut done = ProgressNotification::finished(Some(file.to_string_lossy().into_owned()));
        done.downloaded_bytes = Some(self.total_bytes);
        done.total_bytes = Some(self.total_bytes);
        hooks.on_progress(&done)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ticking"
    }
}

/// Directory holding a fake (empty) ffmpeg binary
pub fn fake_converter_dir(root: &Path) -> PathBuf {
    let dir = root.join("ffmpeg");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(converter_binary_name()), b"").unwrap();
    dir
}

/// Config isolated under `root`, with an optional yt-dlp path
pub fn test_config(root: &Path, ytdlp_path: Option<PathBuf>) -> Config {
    Config {
        tools: ToolsConfig {
            ytdlp_path,
            ffmpeg_dir: fake_converter_dir(root),
            search_path: false,
        },
        history: HistoryConfig {
            path: Some(root.join("state").join("history.json")),
            capacity: 50,
        },
        timing: TimingConfig {
            poll_interval: Duration::from_millis(20),
            cancel_poll_interval: Duration::from_millis(50),
        },
    }
}

/// Write an executable shell script standing in for yt-dlp
#[cfg(unix)]
pub fn write_fake_ytdlp(root: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = root.join("yt-dlp");
    let script = format!(
        "#!/bin/sh\n\
         tmpl=\"\"\n\
         prev=\"\"\n\
         for arg in \"$@\"; do\n\
         \x20 if [ \"$prev\" = \"-o\" ]; then tmpl=\"$arg\"; fi\n\
         \x20 prev=\"$arg\"\n\
         done\n\
         dir=$(dirname \"$tmpl\")\n\
         {body}\n"
    );
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
