//! Converter (ffmpeg) discovery
//!
//! MP3 output needs ffmpeg. The bundled directory from [`ToolsConfig::ffmpeg_dir`]
//! is checked first; when it holds no binary and PATH search is enabled, the
//! system PATH is searched instead. Callers get back the *directory* holding the
//! binary, which is what the engine's converter location hint expects.

use crate::config::ToolsConfig;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// File name of the converter executable on this platform
pub fn converter_binary_name() -> &'static str {
    if cfg!(windows) { "ffmpeg.exe" } else { "ffmpeg" }
}

/// Find the directory holding the converter, using the process PATH
pub fn locate_converter(tools: &ToolsConfig) -> Option<PathBuf> {
    locate_converter_with(tools, std::env::var_os("PATH"))
}

/// Find the directory holding the converter, searching `path_var` instead of PATH
pub fn locate_converter_with(tools: &ToolsConfig, path_var: Option<OsString>) -> Option<PathBuf> {
    if let Some(dir) = bundled_converter_dir(&tools.ffmpeg_dir) {
        tracing::debug!(dir = %dir.display(), "Using bundled ffmpeg");
        return Some(dir);
    }

    if !tools.search_path {
        return None;
    }

    let cwd = std::env::current_dir().unwrap_or_default();
    match which::which_in(converter_binary_name(), path_var, cwd) {
        Ok(binary) => {
            let dir = binary.parent().map(Path::to_path_buf);
            tracing::debug!(binary = %binary.display(), "Using ffmpeg from PATH");
            dir
        }
        Err(_) => None,
    }
}

fn bundled_converter_dir(dir: &Path) -> Option<PathBuf> {
    dir.join(converter_binary_name())
        .is_file()
        .then(|| dir.to_path_buf())
}
