//! Terminal front end for media-dl

use clap::{Parser, Subcommand};
use media_dl::format::{format_bytes, format_status_line};
use media_dl::{Config, DownloadController, DownloadEvent, DownloadRequest, Mode};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Download video (MP4) or audio (MP3) from a media URL
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download a single URL
    Download {
        /// Media URL
        url: String,

        /// Folder to save into (default: current directory)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Extract audio as MP3 instead of downloading MP4 video
        #[arg(short, long)]
        audio: bool,
    },

    /// List recorded downloads, newest first
    History,

    /// Remove a history record
    Delete {
        /// Record id as shown by `history`
        id: String,

        /// Also delete the downloaded file
        #[arg(long)]
        with_file: bool,
    },
}

fn setup_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> media_dl::Result<bool> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let mut controller =
        DownloadController::from_config(&config, tokio::runtime::Handle::current())?;

    match cli.command {
        Commands::Download { url, dir, audio } => {
            let save_dir = match dir {
                Some(dir) => dir,
                None => std::env::current_dir()?,
            };
            let mode = if audio { Mode::AudioMp3 } else { Mode::VideoMp4 };
            controller.submit(DownloadRequest::new(url, save_dir, mode))?;
            Ok(watch(&mut controller, &config).await)
        }
        Commands::History => {
            let records = controller.history();
            if records.is_empty() {
                println!("No downloads yet");
            }
            for record in records.iter().rev() {
                println!(
                    "{}  {}  {:<16}  {:>10}  {}",
                    record.id,
                    record.timestamp.format("%Y-%m-%d %H:%M"),
                    record.mode.label(),
                    format_bytes(record.file_size_bytes),
                    record.title,
                );
            }
            Ok(true)
        }
        Commands::Delete { id, with_file } => {
            if with_file {
                let existed = controller.delete_file(&id)?;
                if !existed {
                    println!("File not found, record removed");
                }
                Ok(true)
            } else if controller.delete_history(&id) {
                Ok(true)
            } else {
                eprintln!("No history record with id {id}");
                Ok(false)
            }
        }
    }
}

/// Drain the controller every poll interval until the download ends
async fn watch(controller: &mut DownloadController, config: &Config) -> bool {
    let mut ticker = tokio::time::interval(config.timing.poll_interval);
    let signal = media_dl::wait_for_signal();
    tokio::pin!(signal);
    let mut cancel_sent = false;
    let mut status_shown = false;
    let mut outcome = None;

    while outcome.is_none() {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut signal, if !cancel_sent => {
                cancel_sent = controller.cancel();
                continue;
            }
        }

        for event in controller.poll() {
            match event {
                DownloadEvent::Log { message } => {
                    let message = message.trim();
                    if message.is_empty() {
                        continue;
                    }
                    if status_shown {
                        println!();
                        status_shown = false;
                    }
                    println!("{message}");
                }
                DownloadEvent::Progress(update) => {
                    print!("\r{:<72}", format_status_line(&update));
                    let _ = std::io::stdout().flush();
                    status_shown = true;
                }
                DownloadEvent::Done { ok } => {
                    if status_shown {
                        println!();
                        status_shown = false;
                    }
                    // History warnings may still follow in this batch
                    outcome = Some(ok);
                }
            }
        }
    }
    outcome.unwrap_or(false)
}
