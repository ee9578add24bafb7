//! Spray-paint strategy.
//!
//! Each sample draws `ceil(width * DENSITY_PER_WIDTH)` offsets, capped at
//! [`MAX_DENSITY`], uniformly from the square `[-r, r]²` with
//! `r = width * RADIUS_PER_WIDTH` and keeps only those inside the disc of
//! radius `r`. Rejected draws place nothing, so the
//! number of dots per sample varies.

use super::{Brush, BrushState, BrushStyle, MAX_WIDTH};
use crate::color::Rgba;
use crate::input::Sample;
use crate::surface::Surface;
use kurbo::Vec2;
use rand::Rng;

/// Draws per sample, per logical pixel of width.
pub const DENSITY_PER_WIDTH: f64 = 2.0;

/// Most draws a single sample makes, reached at [`MAX_WIDTH`].
pub const MAX_DENSITY: usize = (MAX_WIDTH * DENSITY_PER_WIDTH) as usize;

/// Spray radius, per logical pixel of width.
pub const RADIUS_PER_WIDTH: f64 = 1.5;

/// Side of one spray dot in logical pixels.
pub const DOT_SIZE: f64 = 1.0;

pub(super) struct Scatter;

impl Scatter {
    /// Spray around one sample and return how many dots landed.
    fn spray(
        &self,
        surface: &mut Surface,
        style: &BrushStyle,
        sample: Sample,
        state: &mut BrushState,
    ) -> usize {
        let color = if style.cycle_hue {
            state.hue.next_color()
        } else {
            style.color
        };
        let width = style.width.max(0.0);
        let density = ((width * DENSITY_PER_WIDTH).ceil() as usize).min(MAX_DENSITY);
        let radius = width * RADIUS_PER_WIDTH;
        let dot = surface.to_device_length(DOT_SIZE);

        let mut placed = 0;
        for _ in 0..density {
            let dx = state.rng.gen_range(-radius..=radius);
            let dy = state.rng.gen_range(-radius..=radius);
            if dx * dx + dy * dy > radius * radius {
                continue;
            }
            let center = surface.to_device(sample.position + Vec2::new(dx, dy));
            surface.fill_dot(center, dot, color, style.opacity);
            placed += 1;
        }
        placed
    }
}

impl Brush for Scatter {
    fn stroke_start(
        &self,
        surface: &mut Surface,
        style: &BrushStyle,
        sample: Sample,
        state: &mut BrushState,
    ) {
        if self.spray(surface, style, sample, state) == 0 {
            let color = if style.cycle_hue {
                Rgba::from_hue(state.hue.degrees())
            } else {
                style.color
            };
            let center = surface.to_device(sample.position);
            let dot = surface.to_device_length(DOT_SIZE);
            surface.fill_dot(center, dot, color, style.opacity);
        }
    }

    fn stroke_move(
        &self,
        surface: &mut Surface,
        style: &BrushStyle,
        sample: Sample,
        _previous: Sample,
        state: &mut BrushState,
    ) {
        self.spray(surface, style, sample, state);
    }
}
