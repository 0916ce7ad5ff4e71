//! Configuration types for media-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory name used under the per-user data location
pub const APP_DIR_NAME: &str = "YouTubeToFile";

/// History journal file name
pub const HISTORY_FILE_NAME: &str = "history.json";

/// Maximum number of records the history journal keeps
pub const HISTORY_CAPACITY: usize = 50;

/// External tool paths (yt-dlp, ffmpeg)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to the yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Directory holding bundled ffmpeg binaries, checked before PATH
    /// (default: "assets/ffmpeg")
    #[serde(default = "default_ffmpeg_dir")]
    pub ffmpeg_dir: PathBuf,

    /// Whether to search PATH for external binaries if explicit paths not set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            ffmpeg_dir: default_ffmpeg_dir(),
            search_path: true,
        }
    }
}

/// History journal settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Journal path (auto-resolved if None, see [`default_history_path`])
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Maximum records kept (default: 50)
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: None,
            capacity: HISTORY_CAPACITY,
        }
    }
}

impl HistoryConfig {
    /// The configured journal path, or the per-user default
    pub fn resolved_path(&self) -> PathBuf {
        match &self.path {
            Some(path) => path.clone(),
            None => default_history_path(),
        }
    }
}

/// Polling cadences
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimingConfig {
    /// How often a consumer drains the event queue (default: 100ms)
    #[serde(
        default = "default_poll_interval",
        rename = "poll_interval_ms",
        with = "duration_ms_serde"
    )]
    pub poll_interval: Duration,

    /// Minimum time between two cancellation checks inside the progress path
    /// (default: 500ms)
    #[serde(
        default = "default_cancel_poll_interval",
        rename = "cancel_poll_interval_ms",
        with = "duration_ms_serde"
    )]
    pub cancel_poll_interval: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            cancel_poll_interval: default_cancel_poll_interval(),
        }
    }
}

/// Main configuration
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// External tool paths
    #[serde(default)]
    pub tools: ToolsConfig,

    /// History journal settings
    #[serde(default)]
    pub history: HistoryConfig,

    /// Polling cadences
    #[serde(default)]
    pub timing: TimingConfig,
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("cannot read {}: {}", path.display(), e),
            key: None,
        })?;
        let config: Config = serde_json::from_str(&raw).map_err(|e| Error::Config {
            message: format!("invalid config {}: {}", path.display(), e),
            key: None,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.history.capacity == 0 {
            return Err(Error::Config {
                message: "history capacity must be at least 1".into(),
                key: Some("history.capacity".into()),
            });
        }
        if self.timing.poll_interval.is_zero() {
            return Err(Error::Config {
                message: "poll interval must be greater than zero".into(),
                key: Some("timing.poll_interval_ms".into()),
            });
        }
        Ok(())
    }
}

/// Resolve the per-user history journal path
///
/// `%APPDATA%\YouTubeToFile\history.json` on Windows,
/// `~/.config/YouTubeToFile/history.json` elsewhere. When that directory cannot be
/// created the journal lives under the system temporary directory instead.
pub fn default_history_path() -> PathBuf {
    history_path_in(&user_data_base())
}

/// Resolve the journal path under `base`, falling back to the temp directory
pub fn history_path_in(base: &Path) -> PathBuf {
    let data_dir = base.join(APP_DIR_NAME);
    match std::fs::create_dir_all(&data_dir) {
        Ok(()) => data_dir.join(HISTORY_FILE_NAME),
        Err(e) => {
            let temp_dir = std::env::temp_dir().join(APP_DIR_NAME);
            tracing::warn!(
                error = %e,
                data_dir = %data_dir.display(),
                fallback = %temp_dir.display(),
                "Cannot create data directory, using temp directory for history"
            );
            if let Err(e) = std::fs::create_dir_all(&temp_dir) {
                tracing::warn!(error = %e, "Cannot create temp history directory");
            }
            temp_dir.join(HISTORY_FILE_NAME)
        }
    }
}

fn user_data_base() -> PathBuf {
    let home_var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    let home = std::env::var_os(home_var)
        .map(PathBuf::from)
        .unwrap_or_default();
    if cfg!(windows) {
        std::env::var_os("APPDATA").map(PathBuf::from).unwrap_or(home)
    } else {
        home.join(".config")
    }
}

fn default_ffmpeg_dir() -> PathBuf {
    PathBuf::from("assets").join("ffmpeg")
}

fn default_true() -> bool {
    true
}

fn default_history_capacity() -> usize {
    HISTORY_CAPACITY
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(100)
}

fn default_cancel_poll_interval() -> Duration {
    Duration::from_millis(500)
}

// Duration serialization helper (milliseconds)
mod duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
