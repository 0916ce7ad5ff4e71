//! Media-fetch engine seam
//!
//! The engine does the real work: URL resolution, format selection, transfer,
//! stream merging and audio conversion. This module defines the narrow contract
//! the orchestrator drives it through, plus the implementations:
//!
//! - [`YtDlpEngine`]: runs the external `yt-dlp` executable
//! - [`NoOpEngine`]: stand-in when no engine is available
//!
//! ## Usage
//!
//! ```no_run
//! use media_dl::engine::{MediaEngine, NoOpEngine, YtDlpEngine};
//! use std::sync::Arc;
//!
//! let engine: Arc<dyn MediaEngine> = match YtDlpEngine::from_path() {
//!     Some(engine) => Arc::new(engine),
//!     None => Arc::new(NoOpEngine),
//! };
//! println!("using {}", engine.name());
//! ```

mod cli;
mod noop;
pub mod parser;
mod traits;

pub use cli::YtDlpEngine;
pub use noop::NoOpEngine;
pub use traits::{
    EngineHooks, EngineLogLevel, EngineOptions, MediaEngine, PostProcessor,
    ProgressNotification, ProgressStatus,
};
