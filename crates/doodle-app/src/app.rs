//! Application shell: loads a script, replays it and stores the result.

use crate::script::SessionScript;
use clap::Parser;
use doodle_core::{
    ArtifactRecord, ArtifactStore, FileArtifactStore, ServiceError, SessionError,
};
use std::path::PathBuf;
use thiserror::Error;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid script: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Store(#[from] ServiceError),
    #[error("Unknown palette color: {0}")]
    UnknownSwatch(String),
    #[error("Step {index} failed: {source}")]
    Step {
        index: usize,
        #[source]
        source: Box<AppError>,
    },
}

/// Command-line arguments for the doodle driver.
#[derive(Debug, Clone, Parser)]
#[command(name = "doodle")]
#[command(about = "Replay a scripted doodle session and save the finished PNG")]
#[command(version)]
pub struct CliArgs {
    /// Session script (JSON)
    #[arg(long, env = "DOODLE_SCRIPT")]
    pub script: PathBuf,

    /// Directory the finished doodle is written to (defaults to the user data dir)
    #[arg(long, env = "DOODLE_OUT_DIR")]
    pub out_dir: Option<PathBuf>,

    /// Doodle title, overriding the one in the script
    #[arg(long)]
    pub title: Option<String>,

    /// Log a summary of the session when done
    #[arg(long)]
    pub log_summary: bool,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub script: PathBuf,
    pub out_dir: Option<PathBuf>,
    pub title: Option<String>,
    pub log_summary: bool,
}

impl From<CliArgs> for AppConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            script: args.script,
            out_dir: args.out_dir,
            title: args.title,
            log_summary: args.log_summary,
        }
    }
}

/// What a run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub record: ArtifactRecord,
    /// Where the PNG was written.
    pub path: PathBuf,
    pub steps: usize,
    pub history_len: usize,
    pub painted_pixels: usize,
}

/// The headless doodle application.
pub struct App {
    config: AppConfig,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Replay the script, complete the doodle and save it.
    pub async fn run(&self) -> Result<RunSummary, AppError> {
        let script = SessionScript::from_path(&self.config.script)?;
        log::info!(
            "Loaded script {} ({} steps)",
            self.config.script.display(),
            script.steps.len()
        );

        let mut session = script.replay()?;
        if let Some(title) = &self.config.title {
            session.set_title(title.clone());
        }
        let doodle = session.complete()?;

        let store = match &self.config.out_dir {
            Some(dir) => FileArtifactStore::new(dir.clone())?,
            None => FileArtifactStore::default_location()?,
        };
        let record = store.save(&doodle.title, &doodle.image).await?;
        let path = store.image_path(&record);

        let summary = RunSummary {
            record,
            path,
            steps: script.steps.len(),
            history_len: session.history().len(),
            painted_pixels: session.surface().painted_pixel_count(),
        };
        if self.config.log_summary {
            log::info!(
                "\"{}\": {}x{} px, {} steps, {} history entries ({} KiB), {} painted pixels",
                summary.record.title,
                summary.record.width,
                summary.record.height,
                summary.steps,
                summary.history_len,
                session.history().memory_usage() / 1024,
                summary.painted_pixels
            );
        }
        Ok(summary)
    }
}
