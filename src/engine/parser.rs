//! Parser for yt-dlp console output

use super::traits::{EngineLogLevel, ProgressNotification, ProgressStatus};

/// Marker that starts every progress line requested through `--progress-template`
pub const PROGRESS_PREFIX: &str = "[media-dl]";

/// Value yt-dlp prints for a template field it has no value for
const NOT_AVAILABLE: &str = "NA";

/// Progress template passed to `--progress-template`
///
/// Fields are `|`-separated in the order [`parse_line`] expects them. The
/// filename comes last because it may itself contain `|`.
pub fn progress_template() -> String {
    format!(
        "download:{PROGRESS_PREFIX}|%(progress.status)s|%(progress.downloaded_bytes)s|\
         %(progress.total_bytes)s|%(progress.total_bytes_estimate)s|%(progress.speed)s|\
         %(progress.eta)s|%(progress.filename)s"
    )
}

/// One classified line of engine output
#[derive(Debug, Clone, PartialEq)]
pub enum OutputLine {
    /// A progress notification
    Progress(ProgressNotification),
    /// A log line with its severity
    Log(EngineLogLevel, String),
}

/// Classify a single line of yt-dlp stdout or stderr
///
/// Returns `None` for blank lines.
pub fn parse_line(line: &str) -> Option<OutputLine> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return None;
    }

    if let Some(rest) = line.strip_prefix(PROGRESS_PREFIX)
        && let Some(notification) = parse_progress(rest)
    {
        return Some(OutputLine::Progress(notification));
    }

    let (level, message) = if let Some(rest) = line.strip_prefix("ERROR:") {
        (EngineLogLevel::Error, rest.trim_start())
    } else if let Some(rest) = line.strip_prefix("WARNING:") {
        (EngineLogLevel::Warning, rest.trim_start())
    } else if line.starts_with("[debug]") {
        (EngineLogLevel::Debug, line)
    } else {
        (EngineLogLevel::Info, line)
    };

    Some(OutputLine::Log(level, message.to_string()))
}

fn parse_progress(rest: &str) -> Option<ProgressNotification> {
    let mut fields = rest.strip_prefix('|')?.splitn(7, '|');
    let status = ProgressStatus::from_raw(fields.next()?);
    let downloaded_bytes = parse_bytes(fields.next()?);
    let total_bytes = parse_bytes(fields.next()?);
    let total_bytes_estimate = parse_bytes(fields.next()?);
    let speed = parse_float(fields.next()?);
    let eta = parse_float(fields.next()?);
    let filename = fields
        .next()
        .map(str::trim)
        .filter(|f| !f.is_empty() && *f != NOT_AVAILABLE)
        .map(str::to_string);

    Some(ProgressNotification {
        status,
        downloaded_bytes,
        total_bytes,
        total_bytes_estimate,
        speed,
        eta,
        filename,
    })
}

fn parse_float(field: &str) -> Option<f64> {
    let field = field.trim();
    if field.is_empty() || field == NOT_AVAILABLE {
        return None;
    }
    field.parse::<f64>().ok().filter(|v| v.is_finite())
}

// yt-dlp prints estimates as floats ("1048576.0")
fn parse_bytes(field: &str) -> Option<u64> {
    parse_float(field)
        .filter(|v| *v >= 0.0)
        .map(|v| v.round() as u64)
}
