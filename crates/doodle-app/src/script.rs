//! Scripted doodle sessions.
//!
//! A script is a JSON document with an optional session `config`, an optional
//! `title` and a list of `steps`. Steps mirror the toolbar actions and raw
//! pointer events of the interactive page.

use crate::app::AppError;
use doodle_core::color::swatch;
use doodle_core::{BrushMode, DoodleSession, PointerEvent, Rgba, Sample, SessionConfig, Shadow};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Change brush color.
    SelectColor { color: Rgba },
    /// Pick a palette swatch by label ("Red", "Purple", ...).
    SelectSwatch { label: String },
    /// Change brush mode (applies the mode's presets).
    SelectBrush { mode: BrushMode },
    SelectWidth { width: f64 },
    SelectOpacity { opacity: f64 },
    SelectShadow {
        #[serde(default)]
        shadow: Option<Shadow>,
    },
    SetCycleHue { enabled: bool },
    SetTitle { title: String },
    /// Move the surface in client coordinates.
    SetBounds { bounds: Rect },
    /// Deliver a raw pointer event.
    Pointer { event: PointerEvent },
    /// Draw a whole stroke through the given logical points.
    Stroke { points: Vec<Point> },
    Undo,
    Clear,
}

/// A full scripted session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionScript {
    #[serde(default)]
    pub config: SessionConfig,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl SessionScript {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let json = std::fs::read_to_string(path).map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Open a session from the script config and replay every step.
    pub fn replay(&self) -> Result<DoodleSession, AppError> {
        let mut session = DoodleSession::new(self.config.clone())?;
        if let Some(title) = &self.title {
            session.set_title(title.clone());
        }
        for (index, step) in self.steps.iter().enumerate() {
            apply(&mut session, step).map_err(|source| AppError::Step {
                index,
                source: Box::new(source),
            })?;
        }
        log::debug!("Replayed {} steps", self.steps.len());
        Ok(session)
    }
}

/// Apply one step to a session.
pub fn apply(session: &mut DoodleSession, step: &Step) -> Result<(), AppError> {
    match step {
        Step::SelectColor { color } => session.select_color(*color),
        Step::SelectSwatch { label } => {
            let color = swatch(label).ok_or_else(|| AppError::UnknownSwatch(label.clone()))?;
            session.select_color(color);
        }
        Step::SelectBrush { mode } => session.select_brush(*mode),
        Step::SelectWidth { width } => session.select_width(*width)?,
        Step::SelectOpacity { opacity } => session.select_opacity(*opacity)?,
        Step::SelectShadow { shadow } => session.select_shadow(*shadow),
        Step::SetCycleHue { enabled } => session.set_cycle_hue(*enabled),
        Step::SetTitle { title } => session.set_title(title.clone()),
        Step::SetBounds { bounds } => session.set_bounds(*bounds),
        Step::Pointer { event } => session.handle_input(event),
        Step::Stroke { points } => {
            let Some((first, rest)) = points.split_first() else {
                log::warn!("Skipping stroke with no points");
                return Ok(());
            };
            session.stroke_start(Sample::new(first.x, first.y));
            for p in rest {
                session.stroke_move(Sample::new(p.x, p.y));
            }
            session.stroke_end();
        }
        Step::Undo => {
            if !session.undo() {
                log::warn!("Nothing to undo");
            }
        }
        Step::Clear => session.clear(),
    }
    Ok(())
}
