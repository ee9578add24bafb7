//! Doodle session: the state machine that drives one canvas.
//!
//! A session owns the surface, its undo history, the brush engine and the
//! input unifier. Toolbar actions and pointer events go through here.

use crate::brush::{BrushEngine, BrushMode, BrushStyle, MAX_WIDTH, Shadow};
use crate::color::Rgba;
use crate::history::{History, HistoryConfig};
use crate::input::{InputUnifier, PointerEvent, Sample, StrokeEvent};
use crate::surface::{DEFAULT_BACKGROUND, ExportedImage, Surface, SurfaceError};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Session errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error("Please name your doodle first")]
    MissingTitle,
    #[error("Invalid brush width: {0}")]
    InvalidWidth(f64),
    #[error("Invalid opacity: {0}")]
    InvalidOpacity(f64),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Logical canvas width.
    pub width: f64,
    /// Logical canvas height.
    pub height: f64,
    /// Device pixels per logical pixel.
    pub pixel_ratio: f64,
    pub background: Rgba,
    /// Brush style selected when the session opens.
    pub style: BrushStyle,
    pub history: HistoryConfig,
    /// Seed for the spray brush; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            pixel_ratio: 1.0,
            background: DEFAULT_BACKGROUND,
            style: BrushStyle::default(),
            history: HistoryConfig::default(),
            seed: None,
        }
    }
}

/// Whether a stroke is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    StrokeActive {
        /// Style captured when the stroke started.
        style: BrushStyle,
        last_sample: Sample,
    },
}

/// A finished doodle handed to whoever stores or transforms it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedDoodle {
    pub title: String,
    pub image: ExportedImage,
}

/// Receives completed doodles.
pub trait CompletionSink {
    fn complete(&self, doodle: CompletedDoodle);
}

impl<F> CompletionSink for F
where
    F: Fn(CompletedDoodle),
{
    fn complete(&self, doodle: CompletedDoodle) {
        self(doodle)
    }
}

/// One doodle canvas and everything needed to paint on it.
#[derive(Debug)]
pub struct DoodleSession {
    surface: Surface,
    history: History,
    engine: BrushEngine,
    input: InputUnifier,
    /// Style for the next stroke.
    style: BrushStyle,
    state: SessionState,
    title: String,
}

impl DoodleSession {
    pub fn new(config: SessionConfig) -> SessionResult<Self> {
        validate_width(config.style.width)?;
        validate_opacity(config.style.opacity)?;

        let surface = Surface::with_background(
            config.width,
            config.height,
            config.pixel_ratio,
            config.background,
        )?;
        let history = History::with_config(&surface, config.history);
        let engine = match config.seed {
            Some(seed) => BrushEngine::with_seed(seed),
            None => BrushEngine::new(),
        };
        let input = InputUnifier::new(Rect::from_origin_size(
            Point::ZERO,
            surface.logical_size(),
        ));

        log::info!(
            "Opened {}x{} doodle session",
            surface.width(),
            surface.height()
        );

        Ok(Self {
            surface,
            history,
            engine,
            input,
            style: config.style,
            state: SessionState::Idle,
            title: String::new(),
        })
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Style the next stroke will use.
    pub fn style(&self) -> &BrushStyle {
        &self.style
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, SessionState::StrokeActive { .. })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Current hue of the rainbow brushes, in degrees.
    pub fn hue(&self) -> f64 {
        self.engine.hue()
    }

    /// Whether the Undo button should be enabled.
    pub fn can_undo(&self) -> bool {
        !self.is_drawing() && self.history.can_undo()
    }

    pub fn can_clear(&self) -> bool {
        self.history.can_clear()
    }

    /// Update where the surface sits in client coordinates.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.input.set_bounds(bounds);
    }

    pub fn select_color(&mut self, color: Rgba) {
        self.style.color = color;
    }

    /// Select a brush mode, applying its opacity and shadow presets.
    pub fn select_brush(&mut self, mode: BrushMode) {
        self.style = self.style.with_mode_defaults(mode);
    }

    pub fn select_width(&mut self, width: f64) -> SessionResult<()> {
        validate_width(width)?;
        self.style.width = width;
        Ok(())
    }

    pub fn select_opacity(&mut self, opacity: f64) -> SessionResult<()> {
        validate_opacity(opacity)?;
        self.style.opacity = opacity;
        Ok(())
    }

    pub fn select_shadow(&mut self, shadow: Option<Shadow>) {
        self.style.shadow = shadow;
    }

    pub fn set_cycle_hue(&mut self, cycle_hue: bool) {
        self.style.cycle_hue = cycle_hue;
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Feed one platform pointer event through the input unifier.
    ///
    /// Unsupported or malformed input is logged and dropped.
    pub fn handle_input(&mut self, event: &PointerEvent) {
        match self.input.handle(event) {
            Ok(Some(StrokeEvent::Start(sample))) => self.stroke_start(sample),
            Ok(Some(StrokeEvent::Move(sample))) => self.stroke_move(sample),
            Ok(Some(StrokeEvent::End)) => self.stroke_end(),
            Ok(None) => {}
            Err(e) => log::warn!("Dropped {} event: {}", event.kind(), e),
        }
    }

    /// Begin a stroke with the currently selected style.
    pub fn stroke_start(&mut self, sample: Sample) {
        if !is_finite(sample) {
            log::warn!("Ignoring stroke start at non-finite sample");
            return;
        }
        if self.is_drawing() {
            log::debug!("Stroke started while another was active, committing it first");
            self.stroke_end();
        }

        let style = self.style;
        self.engine.stroke_start(&mut self.surface, &style, sample);
        self.state = SessionState::StrokeActive {
            style,
            last_sample: sample,
        };
        log::debug!(
            "Stroke started ({:?}) at ({:.1}, {:.1})",
            style.mode,
            sample.position.x,
            sample.position.y
        );
    }

    /// Extend the active stroke. Ignored when idle.
    pub fn stroke_move(&mut self, sample: Sample) {
        let SessionState::StrokeActive { style, last_sample } = &mut self.state else {
            return;
        };
        if !is_finite(sample) {
            log::warn!("Skipping non-finite stroke sample");
            return;
        }
        self.engine
            .stroke_move(&mut self.surface, style, sample, *last_sample);
        *last_sample = sample;
    }

    /// Finish the active stroke and commit it to history.
    pub fn stroke_end(&mut self) {
        if !self.is_drawing() {
            return;
        }
        self.state = SessionState::Idle;
        self.history.commit(&self.surface);
        log::debug!(
            "Stroke committed (history {}/{})",
            self.history.current_index() + 1,
            self.history.len()
        );
    }

    /// Undo the last committed change. Refused while a stroke is active.
    pub fn undo(&mut self) -> bool {
        if self.is_drawing() {
            log::warn!("Undo refused while a stroke is active");
            return false;
        }
        self.history.undo(&mut self.surface)
    }

    /// Wipe the canvas to the background. The wipe itself is undoable.
    ///
    /// A stroke in progress is discarded without its own history entry.
    pub fn clear(&mut self) {
        if self.is_drawing() {
            log::debug!("Discarding in-flight stroke on clear");
            self.input.reset();
        }
        self.state = SessionState::Idle;
        self.surface.fill_background();
        self.history.commit(&self.surface);
        log::info!("Canvas cleared");
    }

    /// Encode the current canvas as PNG.
    pub fn export(&self) -> SessionResult<ExportedImage> {
        Ok(self.surface.export()?)
    }

    /// Package the titled canvas as a finished doodle.
    pub fn complete(&self) -> SessionResult<CompletedDoodle> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(SessionError::MissingTitle);
        }
        let image = self.export()?;
        log::info!(
            "Completed doodle \"{}\" ({}x{}, {} bytes)",
            title,
            image.width(),
            image.height(),
            image.bytes().len()
        );
        Ok(CompletedDoodle {
            title: title.to_string(),
            image,
        })
    }

    /// Export the canvas and hand it to `sink`. History is left untouched.
    pub fn export_and_complete(&self, sink: &dyn CompletionSink) -> SessionResult<()> {
        let doodle = self.complete()?;
        sink.complete(doodle);
        Ok(())
    }
}

fn validate_width(width: f64) -> SessionResult<()> {
    if width > 0.0 && width <= MAX_WIDTH {
        Ok(())
    } else {
        Err(SessionError::InvalidWidth(width))
    }
}

fn validate_opacity(opacity: f64) -> SessionResult<()> {
    if (0.0..=1.0).contains(&opacity) {
        Ok(())
    } else {
        Err(SessionError::InvalidOpacity(opacity))
    }
}

fn is_finite(sample: Sample) -> bool {
    sample.position.x.is_finite() && sample.position.y.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MouseButton;
    use std::cell::RefCell;

    fn session() -> DoodleSession {
        DoodleSession::new(SessionConfig {
            width: 40.0,
            height: 40.0,
            seed: Some(1),
            ..SessionConfig::default()
        })
        .unwrap()
    }

    fn line(session: &mut DoodleSession, from: (f64, f64), to: (f64, f64)) {
        session.stroke_start(Sample::new(from.0, from.1));
        session.stroke_move(Sample::new(to.0, to.1));
        session.stroke_end();
    }

    #[test]
    fn test_new_session_is_idle_and_blank() {
        let session = session();
        assert_eq!(*session.state(), SessionState::Idle);
        assert!(session.surface().is_blank());
        assert_eq!(session.history().len(), 1);
        assert!(!session.can_undo());
        assert!(session.can_clear());
    }

    #[test]
    fn test_invalid_config() {
        let err = DoodleSession::new(SessionConfig {
            width: 0.0,
            ..SessionConfig::default()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Surface(SurfaceError::InvalidDimensions { .. })
        ));

        let mut config = SessionConfig::default();
        config.style.width = -1.0;
        assert_eq!(
            DoodleSession::new(config).unwrap_err(),
            SessionError::InvalidWidth(-1.0)
        );
    }

    #[test]
    fn test_stroke_commits_on_end() {
        let mut session = session();
        session.stroke_start(Sample::new(5.0, 5.0));
        assert!(session.is_drawing());
        assert_eq!(session.history().len(), 1);

        session.stroke_move(Sample::new(30.0, 5.0));
        session.stroke_end();
        assert!(!session.is_drawing());
        assert_eq!(session.history().len(), 2);
        assert!(session.can_undo());
    }

    #[test]
    fn test_zero_length_stroke_commits() {
        let mut session = session();
        session.stroke_start(Sample::new(10.0, 10.0));
        session.stroke_end();
        assert_eq!(session.history().len(), 2);
        assert!(!session.surface().is_blank());
    }

    #[test]
    fn test_move_and_end_while_idle_are_ignored() {
        let mut session = session();
        session.stroke_move(Sample::new(10.0, 10.0));
        session.stroke_end();
        assert!(session.surface().is_blank());
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_selection_does_not_change_active_stroke() {
        let mut session = session();
        let red = Rgba::rgb(255, 0, 0);

        session.stroke_start(Sample::new(5.0, 10.0));
        session.select_color(red);
        session.stroke_move(Sample::new(30.0, 10.0));
        session.stroke_end();
        assert_eq!(session.surface().pixel(20, 10), Some(Rgba::BLACK));

        line(&mut session, (5.0, 30.0), (30.0, 30.0));
        assert_eq!(session.surface().pixel(20, 30), Some(red));
    }

    #[test]
    fn test_undo_refused_while_drawing() {
        let mut session = session();
        line(&mut session, (5.0, 5.0), (30.0, 5.0));

        session.stroke_start(Sample::new(5.0, 20.0));
        assert!(!session.can_undo());
        assert!(!session.undo());
        assert!(session.is_drawing());

        session.stroke_end();
        assert!(session.undo());
        assert_eq!(session.history().current_index(), 1);
    }

    #[test]
    fn test_clear_discards_in_flight_stroke() {
        let mut session = session();
        line(&mut session, (5.0, 5.0), (30.0, 5.0));

        session.stroke_start(Sample::new(5.0, 20.0));
        session.clear();
        assert!(!session.is_drawing());
        assert!(session.surface().is_blank());
        // Stroke, then the clear; the discarded stroke has no entry.
        assert_eq!(session.history().len(), 3);

        session.stroke_move(Sample::new(30.0, 20.0));
        assert!(session.surface().is_blank());

        assert!(session.undo());
        assert_eq!(session.surface().pixel(20, 5), Some(Rgba::BLACK));
    }

    #[test]
    fn test_width_is_capped() {
        let mut session = session();
        assert!(session.select_width(MAX_WIDTH).is_ok());
        assert_eq!(
            session.select_width(5.0e7),
            Err(SessionError::InvalidWidth(5.0e7))
        );
        assert!(session.select_width(MAX_WIDTH + 0.5).is_err());
        assert_eq!(session.style().width, MAX_WIDTH);

        let mut config = SessionConfig::default();
        config.style.width = 1.0e9;
        assert_eq!(
            DoodleSession::new(config).unwrap_err(),
            SessionError::InvalidWidth(1.0e9)
        );
    }

    #[test]
    fn test_select_width_and_opacity_validation() {
        let mut session = session();
        assert!(session.select_width(10.0).is_ok());
        assert_eq!(session.style().width, 10.0);
        assert_eq!(
            session.select_width(0.0),
            Err(SessionError::InvalidWidth(0.0))
        );
        assert!(session.select_width(f64::INFINITY).is_err());
        assert!(session.select_width(f64::NAN).is_err());
        assert_eq!(session.style().width, 10.0);

        assert!(session.select_opacity(0.25).is_ok());
        assert!(session.select_opacity(1.5).is_err());
        assert!(session.select_opacity(f64::NAN).is_err());
        assert_eq!(session.style().opacity, 0.25);
    }

    #[test]
    fn test_select_brush_applies_presets() {
        let mut session = session();
        session.select_color(Rgba::rgb(0, 0, 255));
        session.select_brush(BrushMode::Textured);
        assert_eq!(session.style().opacity, 0.6);
        assert!(session.style().shadow.is_some());
        assert_eq!(session.style().color, Rgba::rgb(0, 0, 255));

        session.select_brush(BrushMode::Normal);
        assert_eq!(session.style().opacity, 1.0);
        assert!(session.style().shadow.is_none());
    }

    #[test]
    fn test_handle_input_mouse_flow() {
        let mut session = session();
        session.set_bounds(Rect::new(100.0, 100.0, 140.0, 140.0));

        session.handle_input(&PointerEvent::MouseDown {
            client: Point::new(105.0, 110.0),
            button: MouseButton::Left,
        });
        session.handle_input(&PointerEvent::MouseMove {
            client: Point::new(130.0, 110.0),
        });
        // Malformed move is dropped; the stroke continues.
        session.handle_input(&PointerEvent::MouseMove {
            client: Point::new(f64::NAN, 110.0),
        });
        assert!(session.is_drawing());
        session.handle_input(&PointerEvent::MouseLeave);

        assert!(!session.is_drawing());
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.surface().pixel(20, 10), Some(Rgba::BLACK));
    }

    #[test]
    fn test_unsupported_input_is_dropped() {
        let mut session = session();
        session.handle_input(&PointerEvent::MouseDown {
            client: Point::new(10.0, 10.0),
            button: MouseButton::Middle,
        });
        assert!(!session.is_drawing());
        assert!(session.surface().is_blank());
    }

    #[test]
    fn test_complete_requires_title() {
        let mut session = session();
        line(&mut session, (5.0, 5.0), (30.0, 5.0));

        let received = RefCell::new(Vec::new());
        let sink = |doodle: CompletedDoodle| received.borrow_mut().push(doodle);

        assert_eq!(
            session.export_and_complete(&sink),
            Err(SessionError::MissingTitle)
        );
        session.set_title("   ");
        assert_eq!(
            session.export_and_complete(&sink),
            Err(SessionError::MissingTitle)
        );
        assert!(received.borrow().is_empty());

        session.set_title("  My Cat ");
        session.export_and_complete(&sink).unwrap();
        let received = received.into_inner();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].title, "My Cat");
        assert_eq!(received[0].image.width(), 40);
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn test_config_from_json() {
        let config: SessionConfig = serde_json::from_str(
            r##"{"width": 320, "height": 240, "pixel_ratio": 2, "style": {"color": "#ff00ff"}, "history": {"max_entries": 20}}"##,
        )
        .unwrap();
        assert_eq!(config.width, 320.0);
        assert_eq!(config.pixel_ratio, 2.0);
        assert_eq!(config.style.color, Rgba::rgb(255, 0, 255));
        assert_eq!(config.style.width, 5.0);
        assert_eq!(config.history.max_entries, Some(20));
        assert_eq!(config.background, Rgba::WHITE);
    }
}
