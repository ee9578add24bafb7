//! Brush engine: style types and the per-mode rendering strategies.
//!
//! Each mode is a [`Brush`] that paints straight onto the [`Surface`]. Input
//! arrives in logical coordinates; strategies translate positions and widths
//! to device pixels before rasterizing.

mod rainbow;
mod scatter;
mod solid;
mod textured;

pub use rainbow::{HUE_STEP, HueCursor};
pub use scatter::{DENSITY_PER_WIDTH, DOT_SIZE, MAX_DENSITY, RADIUS_PER_WIDTH};

use crate::color::Rgba;
use crate::input::Sample;
use crate::surface::{Falloff, Surface};
use kurbo::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Default brush width in logical pixels.
pub const DEFAULT_WIDTH: f64 = 5.0;

/// Widest brush a session accepts, in logical pixels.
pub const MAX_WIDTH: f64 = 100.0;

/// Opacity preset applied when the textured mode is selected.
pub const TEXTURED_OPACITY: f64 = 0.6;

/// Shadow blur preset applied when the textured mode is selected.
pub const TEXTURED_SHADOW_BLUR: f64 = 3.0;

/// Rendering algorithm of a brush.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrushMode {
    /// Solid round-capped line.
    #[default]
    Normal,
    /// Solid line whose hue advances with every segment.
    ColorCycle,
    /// Translucent line over a blurred drop shadow.
    Textured,
    /// Random dots sprayed around each sample.
    StochasticScatter,
    /// Line with a feathered edge.
    Soft,
    /// Paints the surface background back.
    Erase,
}

impl BrushMode {
    pub const ALL: [BrushMode; 6] = [
        BrushMode::Normal,
        BrushMode::ColorCycle,
        BrushMode::Textured,
        BrushMode::StochasticScatter,
        BrushMode::Soft,
        BrushMode::Erase,
    ];

    /// Display name for the toolbar.
    pub fn name(&self) -> &'static str {
        match self {
            BrushMode::Normal => "Normal",
            BrushMode::ColorCycle => "Rainbow",
            BrushMode::Textured => "Textured",
            BrushMode::StochasticScatter => "Spray",
            BrushMode::Soft => "Soft",
            BrushMode::Erase => "Eraser",
        }
    }

    /// Cycle to the next brush mode.
    pub fn next(self) -> Self {
        match self {
            BrushMode::Normal => BrushMode::ColorCycle,
            BrushMode::ColorCycle => BrushMode::Textured,
            BrushMode::Textured => BrushMode::StochasticScatter,
            BrushMode::StochasticScatter => BrushMode::Soft,
            BrushMode::Soft => BrushMode::Erase,
            BrushMode::Erase => BrushMode::Normal,
        }
    }
}

/// Drop shadow drawn under textured strokes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    /// Blur width in logical pixels.
    pub blur: f64,
    /// Offset from the stroke in logical pixels.
    #[serde(default)]
    pub offset: Vec2,
    /// Shadow color; `None` uses the stroke color.
    #[serde(default)]
    pub color: Option<Rgba>,
}

impl Shadow {
    /// The shadow preset of the textured mode.
    pub fn textured() -> Self {
        Self {
            blur: TEXTURED_SHADOW_BLUR,
            offset: Vec2::ZERO,
            color: None,
        }
    }
}

/// Everything that determines how a stroke looks.
///
/// Captured when a stroke starts; later selection changes apply to the next stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushStyle {
    pub mode: BrushMode,
    pub color: Rgba,
    /// Line width (or spray size) in logical pixels.
    pub width: f64,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    pub shadow: Option<Shadow>,
    /// Scatter dots take their color from the hue cursor ("rainbow spray").
    pub cycle_hue: bool,
}

impl Default for BrushStyle {
    fn default() -> Self {
        Self {
            mode: BrushMode::Normal,
            color: Rgba::BLACK,
            width: DEFAULT_WIDTH,
            opacity: 1.0,
            shadow: None,
            cycle_hue: false,
        }
    }
}

impl BrushStyle {
    /// Switch mode and apply that mode's opacity and shadow presets.
    pub fn with_mode_defaults(mut self, mode: BrushMode) -> Self {
        self.mode = mode;
        match mode {
            BrushMode::Textured => {
                self.opacity = TEXTURED_OPACITY;
                self.shadow = Some(Shadow::textured());
            }
            _ => {
                self.opacity = 1.0;
                self.shadow = None;
            }
        }
        self
    }
}

/// A toolbar brush size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushSize {
    pub label: &'static str,
    pub width: f64,
}

/// Brush sizes offered by the toolbar.
pub const BRUSH_SIZES: &[BrushSize] = &[
    BrushSize {
        label: "Small",
        width: 2.0,
    },
    BrushSize {
        label: "Medium",
        width: 5.0,
    },
    BrushSize {
        label: "Large",
        width: 10.0,
    },
    BrushSize {
        label: "Extra Large",
        width: 20.0,
    },
];

/// Mutable state shared by all strategies for the life of a session.
#[derive(Debug, Clone)]
pub struct BrushState {
    pub hue: HueCursor,
    pub rng: StdRng,
}

/// A brush rendering strategy.
pub trait Brush {
    /// Paint the first sample of a stroke.
    ///
    /// Defaults to a zero-length segment, so a tap leaves a dot.
    fn stroke_start(
        &self,
        surface: &mut Surface,
        style: &BrushStyle,
        sample: Sample,
        state: &mut BrushState,
    ) {
        self.stroke_move(surface, style, sample, sample, state);
    }

    /// Paint from `previous` to `sample`.
    fn stroke_move(
        &self,
        surface: &mut Surface,
        style: &BrushStyle,
        sample: Sample,
        previous: Sample,
        state: &mut BrushState,
    );
}

/// Look up the strategy for a mode.
fn strategy(mode: BrushMode) -> &'static dyn Brush {
    match mode {
        BrushMode::Normal => &solid::Normal,
        BrushMode::ColorCycle => &rainbow::ColorCycle,
        BrushMode::Textured => &textured::Textured,
        BrushMode::StochasticScatter => &scatter::Scatter,
        BrushMode::Soft => &solid::Soft,
        BrushMode::Erase => &solid::Erase,
    }
}

/// Paint one logical-space segment with the given falloff.
fn paint_segment(
    surface: &mut Surface,
    from: Sample,
    to: Sample,
    width: f64,
    color: Rgba,
    opacity: f64,
    falloff: Falloff,
) {
    let a = surface.to_device(from.position);
    let b = surface.to_device(to.position);
    let radius = surface.to_device_length(width) / 2.0;
    surface.fill_segment(a, b, radius, color, opacity, falloff);
}

/// Dispatches stroke samples to the strategy of the active style.
#[derive(Debug, Clone)]
pub struct BrushEngine {
    state: BrushState,
}

impl Default for BrushEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl BrushEngine {
    /// Engine with an entropy-seeded scatter RNG.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Engine with a fixed scatter seed, for reproducible output.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            state: BrushState {
                hue: HueCursor::default(),
                rng,
            },
        }
    }

    /// Current hue cursor angle in degrees.
    pub fn hue(&self) -> f64 {
        self.state.hue.degrees()
    }

    pub fn stroke_start(&mut self, surface: &mut Surface, style: &BrushStyle, sample: Sample) {
        strategy(style.mode).stroke_start(surface, style, sample, &mut self.state);
    }

    pub fn stroke_move(
        &mut self,
        surface: &mut Surface,
        style: &BrushStyle,
        sample: Sample,
        previous: Sample,
    ) {
        strategy(style.mode).stroke_move(surface, style, sample, previous, &mut self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> Surface {
        Surface::new(40.0, 40.0, 1.0).unwrap()
    }

    fn style(mode: BrushMode) -> BrushStyle {
        BrushStyle::default().with_mode_defaults(mode)
    }

    #[test]
    fn test_mode_cycle_visits_all() {
        let mut mode = BrushMode::Normal;
        for expected in BrushMode::ALL.iter().skip(1) {
            mode = mode.next();
            assert_eq!(mode, *expected);
        }
        assert_eq!(mode.next(), BrushMode::Normal);
    }

    #[test]
    fn test_mode_serde_names() {
        let json = serde_json::to_string(&BrushMode::StochasticScatter).unwrap();
        assert_eq!(json, "\"stochastic_scatter\"");
        let mode: BrushMode = serde_json::from_str("\"color_cycle\"").unwrap();
        assert_eq!(mode, BrushMode::ColorCycle);
    }

    #[test]
    fn test_textured_presets() {
        let textured = style(BrushMode::Textured);
        assert_eq!(textured.opacity, TEXTURED_OPACITY);
        assert_eq!(textured.shadow, Some(Shadow::textured()));

        let back = textured.with_mode_defaults(BrushMode::Normal);
        assert_eq!(back.opacity, 1.0);
        assert_eq!(back.shadow, None);
        assert_eq!(back.color, textured.color);
        assert_eq!(back.width, textured.width);
    }

    #[test]
    fn test_style_defaults() {
        let style = BrushStyle::default();
        assert_eq!(style.mode, BrushMode::Normal);
        assert_eq!(style.color, Rgba::BLACK);
        assert_eq!(style.width, 5.0);
        assert_eq!(BRUSH_SIZES.len(), 4);
        assert_eq!(BRUSH_SIZES[3].width, 20.0);
    }

    #[test]
    fn test_style_deserializes_partial() {
        let style: BrushStyle =
            serde_json::from_str(r##"{"mode":"soft","color":"#ff0000"}"##).unwrap();
        assert_eq!(style.mode, BrushMode::Soft);
        assert_eq!(style.color, Rgba::rgb(255, 0, 0));
        assert_eq!(style.width, DEFAULT_WIDTH);
    }

    #[test]
    fn test_single_tap_marks_every_mode() {
        for ratio in [1.0, 2.0, 3.0] {
            for width in [0.5, 1.0, 2.0, 5.0, 20.0] {
                for mode in BrushMode::ALL {
                    if mode == BrushMode::Erase {
                        continue;
                    }
                    let mut s = Surface::new(60.0, 60.0, ratio).unwrap();
                    let mut engine = BrushEngine::with_seed(7);
                    let style = BrushStyle {
                        width,
                        ..style(mode)
                    };
                    engine.stroke_start(&mut s, &style, Sample::new(30.0, 30.0));
                    assert!(
                        !s.is_blank(),
                        "{mode:?} tap of width {width} at {ratio}x left no mark"
                    );
                }
            }
        }
    }

    #[test]
    fn test_widest_spray_stays_bounded() {
        let mut s = surface();
        let mut engine = BrushEngine::with_seed(3);
        let style = BrushStyle {
            width: 5.0e8,
            ..style(BrushMode::StochasticScatter)
        };
        let at = Sample::new(20.0, 20.0);
        engine.stroke_start(&mut s, &style, at);
        engine.stroke_move(&mut s, &style, at, at);
        assert!(s.painted_pixel_count() <= 2 * MAX_DENSITY);
    }

    #[test]
    fn test_erase_on_background_is_invisible() {
        let mut s = surface();
        let mut engine = BrushEngine::with_seed(7);
        engine.stroke_start(&mut s, &style(BrushMode::Erase), Sample::new(20.0, 20.0));
        assert!(s.is_blank());
    }

    #[test]
    fn test_erase_restores_background() {
        let mut s = surface();
        let mut engine = BrushEngine::with_seed(7);
        let at = Sample::new(20.0, 20.0);
        engine.stroke_start(&mut s, &style(BrushMode::Normal), at);
        assert_eq!(s.pixel(20, 20), Some(Rgba::BLACK));

        engine.stroke_start(&mut s, &style(BrushMode::Erase), at);
        assert_eq!(s.pixel(20, 20), Some(Rgba::WHITE));
    }

    #[test]
    fn test_width_scales_with_pixel_ratio() {
        let mut s = Surface::new(40.0, 80.0, 2.0).unwrap();
        let mut engine = BrushEngine::with_seed(1);
        let red = Rgba::rgb(255, 0, 0);
        let style = BrushStyle {
            color: red,
            ..BrushStyle::default()
        };
        engine.stroke_start(&mut s, &style, Sample::new(10.0, 10.0));
        engine.stroke_move(&mut s, &style, Sample::new(10.0, 50.0), Sample::new(10.0, 10.0));

        assert_eq!(s.pixel(19, 60), Some(red));
        assert_eq!(s.pixel(23, 60), Some(red));
        assert_eq!(s.pixel(26, 60), Some(Rgba::WHITE));
        assert_eq!(s.pixel(20, 130), Some(Rgba::WHITE));
    }
}
