//! Textured strategy: a blurred drop shadow under a translucent line.

use super::{Brush, BrushState, BrushStyle, paint_segment};
use crate::input::Sample;
use crate::surface::{Falloff, Surface};

pub(super) struct Textured;

impl Brush for Textured {
    fn stroke_move(
        &self,
        surface: &mut Surface,
        style: &BrushStyle,
        sample: Sample,
        previous: Sample,
        _state: &mut BrushState,
    ) {
        if let Some(shadow) = style.shadow {
            let shift = |s: Sample| Sample {
                position: s.position + shadow.offset,
                ..s
            };
            let blur = surface.to_device_length(shadow.blur);
            paint_segment(
                surface,
                shift(previous),
                shift(sample),
                style.width,
                shadow.color.unwrap_or(style.color),
                style.opacity,
                Falloff::Blurred { blur },
            );
        }

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
