//! Core types for media-dl

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Requested output kind
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Best available video, merged to an MP4 container
    #[default]
    #[serde(rename = "Best Video (MP4)")]
    VideoMp4,
    /// Best available audio, converted to MP3
    #[serde(rename = "Audio Only (MP3)")]
    AudioMp3,
}

impl Mode {
    /// Human-readable label, also used as the persisted value
    pub fn label(&self) -> &'static str {
        match self {
            Mode::VideoMp4 => "Best Video (MP4)",
            Mode::AudioMp3 => "Audio Only (MP3)",
        }
    }

    /// Whether this mode needs the external audio converter
    pub fn requires_converter(&self) -> bool {
        matches!(self, Mode::AudioMp3)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single user request to fetch one URL
///
/// Owned by the orchestration call that consumes it; never mutated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Media URL as submitted
    pub url: String,
    /// Directory the output is written into (must exist at submission)
    pub save_dir: PathBuf,
    /// Requested output kind
    pub mode: Mode,
}

impl DownloadRequest {
    /// Create a new request
    pub fn new(url: impl Into<String>, save_dir: impl Into<PathBuf>, mode: Mode) -> Self {
        Self {
            url: url.into(),
            save_dir: save_dir.into(),
            mode,
        }
    }
}

/// Raw progress numbers carried by a [`DownloadEvent::Progress`]
///
/// Values are not pre-formatted; see [`crate::format::format_status_line`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Completed fraction, always within `[0.0, 1.0]`
    pub fraction: f64,
    /// Bytes downloaded so far (0 when unknown)
    pub downloaded_bytes: u64,
    /// Total bytes, exact or estimated (0 when unknown)
    pub total_bytes: u64,
    /// Current transfer speed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_bytes_per_sec: Option<f64>,
    /// Estimated seconds remaining
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta_seconds: Option<f64>,
}

impl ProgressUpdate {
    /// Progress for a download whose byte counts are known
    ///
    /// The fraction is `downloaded / total` when `total > 0`, else `0.0`, and is
    /// clamped to `[0.0, 1.0]` so a momentary `downloaded > total` never leaks out.
    pub fn from_bytes(
        downloaded_bytes: u64,
        total_bytes: u64,
        speed_bytes_per_sec: Option<f64>,
        eta_seconds: Option<f64>,
    ) -> Self {
        let fraction = if total_bytes > 0 {
            downloaded_bytes as f64 / total_bytes as f64
        } else {
            0.0
        };
        Self {
            fraction: clamp_fraction(fraction),
            downloaded_bytes,
            total_bytes,
            speed_bytes_per_sec,
            eta_seconds,
        }
    }

    /// Progress pinned at 100%
    pub fn complete(downloaded_bytes: u64, total_bytes: u64) -> Self {
        Self {
            fraction: 1.0,
            downloaded_bytes,
            total_bytes,
            speed_bytes_per_sec: None,
            eta_seconds: None,
        }
    }
}

/// Clamp a progress fraction to `[0.0, 1.0]`; NaN becomes `0.0`
pub fn clamp_fraction(fraction: f64) -> f64 {
    if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    }
}

/// Event emitted by the orchestrator during a download
///
/// Exactly one [`DownloadEvent::Done`] is emitted per run and it is always last.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DownloadEvent {
    /// Informational or diagnostic text
    Log {
        /// Message text, ready for display
        message: String,
    },

    /// Download progress update
    Progress(ProgressUpdate),

    /// Terminal event
    Done {
        /// Whether the download (and any conversion) succeeded
        ok: bool,
    },
}

impl DownloadEvent {
    /// Convenience constructor for [`DownloadEvent::Log`]
    pub fn log(message: impl Into<String>) -> Self {
        DownloadEvent::Log {
            message: message.into(),
        }
    }

    /// Whether this is the terminal event
    pub fn is_done(&self) -> bool {
        matches!(self, DownloadEvent::Done { .. })
    }
}

/// Outcome recorded in history
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Download finished and the output file exists
    #[default]
    Success,
    /// Download failed
    Failed,
}

/// A persisted entry describing one download attempt
///
/// Every field has a default so journals written with fewer keys still load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DownloadRecord {
    /// Unique identifier (UUID v4)
    #[serde(default = "new_record_id")]
    pub id: String,
    /// Creation time, ISO-8601
    #[serde(default = "Local::now", with = "iso_timestamp")]
    pub timestamp: DateTime<Local>,
    /// Source URL
    #[serde(default)]
    pub url: String,
    /// Media title
    #[serde(default)]
    pub title: String,
    /// Output file name
    #[serde(default)]
    pub filename: String,
    /// Full output path
    #[serde(default)]
    pub filepath: PathBuf,
    /// Requested output kind
    #[serde(default)]
    pub mode: Mode,
    /// Output size in bytes
    #[serde(default, rename = "file_size")]
    pub file_size_bytes: u64,
    /// Outcome
    #[serde(default)]
    pub status: RecordStatus,
    /// Error text for failed attempts
    #[serde(default)]
    pub error_message: Option<String>,
}

fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl DownloadRecord {
    /// Create a successful record with a fresh id and the current time
    pub fn success(
        url: impl Into<String>,
        title: impl Into<String>,
        filepath: impl Into<PathBuf>,
        mode: Mode,
        file_size_bytes: u64,
    ) -> Self {
        let filepath = filepath.into();
        let filename = filepath
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            id: new_record_id(),
            timestamp: Local::now(),
            url: url.into(),
            title: title.into(),
            filename,
            filepath,
            mode,
            file_size_bytes,
            status: RecordStatus::Success,
            error_message: None,
        }
    }

    /// Create a failed record with a fresh id and the current time
    pub fn failed(url: impl Into<String>, mode: Mode, error: impl Into<String>) -> Self {
        Self {
            id: new_record_id(),
            timestamp: Local::now(),
            url: url.into(),
            title: String::new(),
            filename: String::new(),
            filepath: PathBuf::new(),
            mode,
            file_size_bytes: 0,
            status: RecordStatus::Failed,
            error_message: Some(error.into()),
        }
    }
}

/// ISO-8601 timestamps, tolerating journals written without a UTC offset
mod iso_timestamp {
    use chrono::{DateTime, Local, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub fn serialize<S>(ts: &DateTime<Local>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Local>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(ts.with_timezone(&Local));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .and_then(|naive| naive.and_local_timezone(Local).earliest())
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}")))
    }
}
