//! Solid line strategies: normal, soft and erase.

use super::{Brush, BrushState, BrushStyle, paint_segment};
use crate::input::Sample;
use crate::surface::{Falloff, Surface};

/// Fraction of the radius that stays fully opaque in a soft stroke.
const SOFT_CORE: f64 = 0.35;

pub(super) struct Normal;

impl Brush for Normal {
    fn stroke_move(
        &self,
        surface: &mut Surface,
        style: &BrushStyle,
        sample: Sample,
        previous: Sample,
        _state: &mut BrushState,
    ) {
        paint_segment(
            surface,
            previous,
            sample,
            style.width,
            style.color,
            style.opacity,
            Falloff::Antialiased,
        );
    }
}

pub(super) struct Soft;

impl Brush for Soft {
    fn stroke_move(
        &self,
        surface: &mut Surface,
        style: &BrushStyle,
        sample: Sample,
        previous: Sample,
        _state: &mut BrushState,
    ) {
        paint_segment(
            surface,
            previous,
            sample,
            style.width,
            style.color,
            style.opacity,
            Falloff::Feathered { core: SOFT_CORE },
        );
    }
}

/// Paints the background color at full opacity, whatever the style says.
pub(super) struct Erase;

impl Brush for Erase {
    fn stroke_move(
        &self,
        surface: &mut Surface,
        style: &BrushStyle,
        sample: Sample,
        previous: Sample,
        _state: &mut BrushState,
    ) {
        let background = surface.background();
        paint_segment(
            surface,
            previous,
            sample,
            style.width,
            background,
            1.0,
            Falloff::Antialiased,
        );
    }
}
