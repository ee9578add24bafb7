//! Doodle Application
//!
//! Headless shell around the doodle engine: replays scripted sessions
//! (toolbar actions and pointer events) and stores the finished PNG.

mod app;
pub mod script;

pub use app::{App, AppConfig, AppError, CliArgs, RunSummary};
pub use script::{SessionScript, Step};
