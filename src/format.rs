//! Display formatting for progress numbers
//!
//! Pure functions with no shared state. Units step by 1024.

use crate::types::ProgressUpdate;

/// Placeholder shown when a value is unknown
pub const UNKNOWN: &str = "—";

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// A byte quantity accepted by [`format_bytes`]
///
/// Built from whole byte counts (`u64`, or an integer literal) as well as
/// fractional rates (`f64`, `Option<f64>`).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ByteCount(Option<f64>);

impl From<u64> for ByteCount {
    fn from(bytes: u64) -> Self {
        Self(Some(bytes as f64))
    }
}

impl From<i32> for ByteCount {
    fn from(bytes: i32) -> Self {
        Self(Some(f64::from(bytes)))
    }
}

impl From<f64> for ByteCount {
    fn from(bytes: f64) -> Self {
        Self(Some(bytes))
    }
}

impl From<Option<f64>> for ByteCount {
    fn from(bytes: Option<f64>) -> Self {
        Self(bytes)
    }
}

/// Format a byte count as a human-readable size
///
/// `None`, zero and negative values render as `"—"`.
///
/// # Examples
///
/// ```
/// use media_dl::format::format_bytes;
///
/// assert_eq!(format_bytes(500), "500 B");
/// assert_eq!(format_bytes(1536), "1.50 KB");
/// assert_eq!(format_bytes(2048.0), "2.00 KB");
/// assert_eq!(format_bytes(None), "—");
/// ```
pub fn format_bytes(num: impl Into<ByteCount>) -> String {
    let n = match num.into().0 {
        Some(n) if n.is_finite() && n > 0.0 => n,
        _ => return UNKNOWN.to_string(),
    };

    let mut value = n;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", value.trunc() as u64, UNITS[unit])
    } else {
        format!("{:.2} {}", value, UNITS[unit])
    }
}

/// Format remaining seconds as `M:SS`, or `H:MM:SS` from one hour up
///
/// Fractional seconds are truncated. `None` and negative values render as `"—"`.
///
/// # Examples
///
/// ```
/// use media_dl::format::format_eta;
///
/// assert_eq!(format_eta(125.0), "2:05");
/// assert_eq!(format_eta(3725.0), "1:02:05");
/// assert_eq!(format_eta(None), "—");
/// ```
pub fn format_eta(seconds: impl Into<Option<f64>>) -> String {
    let seconds = match seconds.into() {
        Some(s) if s.is_finite() && s >= 0.0 => s.trunc() as u64,
        _ => return UNKNOWN.to_string(),
    };

    let (minutes, secs) = (seconds / 60, seconds % 60);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

/// Render a progress update as a single status line
///
/// Layout: `" 42%  1.50 MB / 3.00 MB    512.00 KB/s  •  ETA 0:03"`. The total is
/// omitted when unknown; the speed/ETA segment is omitted when neither is known.
/// The percentage rounds half to even.
pub fn format_status_line(progress: &ProgressUpdate) -> String {
    let pct = (progress.fraction * 100.0)
        .round_ties_even()
        .clamp(0.0, 100.0) as u8;

    let mut left = format!("{:>3}%  {}", pct, format_bytes(progress.downloaded_bytes));
    if progress.total_bytes > 0 {
        left.push_str(" / ");
        left.push_str(&format_bytes(progress.total_bytes));
    }

    let mut right = Vec::with_capacity(2);
    if let Some(speed) = progress.speed_bytes_per_sec
        && speed > 0.0
    {
        right.push(format!("{}/s", format_bytes(speed)));
    }
    if let Some(eta) = progress.eta_seconds {
        right.push(format!("ETA {}", format_eta(eta)));
    }

    if right.is_empty() {
        left
    } else {
        format!("{left}    {}", right.join("  •  "))
    }
}
