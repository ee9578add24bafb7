//! Hue cursor and the color-cycling strategy.

use super::{Brush, BrushState, BrushStyle, paint_segment};
use crate::color::Rgba;
use crate::input::Sample;
use crate::surface::{Falloff, Surface};

/// Degrees the hue cursor advances per painted segment.
pub const HUE_STEP: f64 = 4.0;

/// A hue angle in `[0, 360)` that only moves forward.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HueCursor {
    degrees: f64,
}

impl HueCursor {
    pub fn degrees(&self) -> f64 {
        self.degrees
    }

    /// Step forward by [`HUE_STEP`] and return the new angle.
    pub fn advance(&mut self) -> f64 {
        self.degrees = (self.degrees + HUE_STEP).rem_euclid(360.0);
        self.degrees
    }

    /// Step forward and return the color at the new angle.
    pub fn next_color(&mut self) -> Rgba {
        Rgba::from_hue(self.advance())
    }
}

pub(super) struct ColorCycle;

impl Brush for ColorCycle {
    fn stroke_move(
        &self,
        surface: &mut Surface,
        style: &BrushStyle,
        sample: Sample,
        previous: Sample,
        state: &mut BrushState,
    ) {
        let color = state.hue.next_color();
        paint_segment(
            surface,
            previous,
            sample,
            style.width,
            color,
            style.opacity,
            Falloff::Antialiased,
        );
    }
}
