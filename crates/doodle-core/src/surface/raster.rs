//! Drawing primitives on top of tiny-skia.
//!
//! All coordinates here are device pixels. Shapes are anti-aliased and blended
//! source-over into the premultiplied pixmap.

use super::Surface;
use super::blur::gaussian_blur;
use crate::color::Rgba;
use kurbo::Point;
use tiny_skia::{
    FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke, Transform,
};

/// Smallest radius a segment is drawn with, so hairline widths still leave a mark.
const MIN_RADIUS: f32 = 0.5;

/// Blurs narrower than this are drawn as plain anti-aliased shapes.
const MIN_SIGMA: f32 = 0.5;

/// How the edge of a filled segment fades out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Falloff {
    /// Hard anti-aliased edge.
    Antialiased,
    /// Solid up to `core * radius`, then a gaussian fade out to the radius.
    Feathered { core: f64 },
    /// Gaussian blur of `blur` device pixels around the edge (drop shadows).
    Blurred { blur: f64 },
}

impl Falloff {
    /// Radius of the solid shape to draw and the blur sigma applied to it.
    fn shape(self, radius: f32) -> (f32, f32) {
        let (shape_radius, sigma) = match self {
            Falloff::Antialiased => (radius, 0.0),
            Falloff::Feathered { core } => {
                let fade = radius * (1.0 - core.clamp(0.0, 1.0) as f32);
                (radius - fade / 2.0, fade / 4.0)
            }
            Falloff::Blurred { blur } => (radius, blur.max(0.0) as f32 / 2.0),
        };
        (shape_radius.max(MIN_RADIUS), sigma)
    }
}

fn device_point(p: Point) -> Option<(f32, f32)> {
    let (x, y) = (p.x as f32, p.y as f32);
    (x.is_finite() && y.is_finite()).then_some((x, y))
}

fn solid_paint(color: Rgba, opacity: f64) -> Paint<'static> {
    let mut paint = Paint::default();
    let alpha = (color.a as f64 * opacity.clamp(0.0, 1.0)).round() as u8;
    paint.set_color_rgba8(color.r, color.g, color.b, alpha);
    paint.anti_alias = true;
    paint
}

/// Round-capped segment; a zero-length one is a filled disc.
fn draw_capsule(
    pixmap: &mut Pixmap,
    from: (f32, f32),
    to: (f32, f32),
    radius: f32,
    paint: &Paint,
    transform: Transform,
) {
    if from == to {
        if let Some(path) = PathBuilder::from_circle(from.0, from.1, radius) {
            pixmap.fill_path(&path, paint, FillRule::Winding, transform, None);
        }
        return;
    }

    let mut pb = PathBuilder::new();
    pb.move_to(from.0, from.1);
    pb.line_to(to.0, to.1);
    let Some(path) = pb.finish() else {
        return;
    };
    let stroke = Stroke {
        width: radius * 2.0,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, paint, &stroke, transform, None);
}

impl Surface {
    /// Fill a round-capped segment (a capsule) from `from` to `to`.
    ///
    /// A zero-length segment fills a disc, so single taps still leave a dot.
    pub(crate) fn fill_segment(
        &mut self,
        from: Point,
        to: Point,
        radius: f64,
        color: Rgba,
        opacity: f64,
        falloff: Falloff,
    ) {
        let (Some(a), Some(b)) = (device_point(from), device_point(to)) else {
            return;
        };
        let radius = (radius as f32).max(MIN_RADIUS);
        if !radius.is_finite() {
            return;
        }
        let (radius, sigma) = falloff.shape(radius);

        if sigma < MIN_SIGMA {
            let paint = solid_paint(color, opacity);
            draw_capsule(&mut self.pixmap, a, b, radius, &paint, Transform::identity());
        } else {
            self.fill_blurred(a, b, radius, sigma, color, opacity);
        }
    }

    /// Draw the capsule into a scratch layer, blur it and composite it back.
    fn fill_blurred(
        &mut self,
        from: (f32, f32),
        to: (f32, f32),
        radius: f32,
        sigma: f32,
        color: Rgba,
        opacity: f64,
    ) {
        let margin = radius + sigma * 3.0 + 1.0;
        let left = (from.0.min(to.0) - margin).floor().max(0.0);
        let top = (from.1.min(to.1) - margin).floor().max(0.0);
        let right = (from.0.max(to.0) + margin).ceil().min(self.width() as f32);
        let bottom = (from.1.max(to.1) + margin).ceil().min(self.height() as f32);
        if left >= right || top >= bottom {
            return;
        }
        let Some(mut layer) = Pixmap::new((right - left) as u32, (bottom - top) as u32) else {
            return;
        };

        draw_capsule(
            &mut layer,
            from,
            to,
            radius,
            &solid_paint(color, 1.0),
            Transform::from_translate(-left, -top),
        );
        gaussian_blur(&mut layer, sigma);

        let mut paint = PixmapPaint::default();
        paint.opacity = opacity.clamp(0.0, 1.0) as f32;
        self.pixmap.draw_pixmap(
            left as i32,
            top as i32,
            layer.as_ref(),
            &paint,
            Transform::identity(),
            None,
        );
    }

    /// Fill a square dot of side `size` centred on `center`; at least one pixel.
    pub(crate) fn fill_dot(&mut self, center: Point, size: f64, color: Rgba, opacity: f64) {
        let side = size.round().max(1.0);
        let left = (center.x - side / 2.0).floor();
        let top = (center.y - side / 2.0).floor();
        let Some(rect) = Rect::from_xywh(left as f32, top as f32, side as f32, side as f32) else {
            return;
        };
        let mut paint = solid_paint(color, opacity);
        // Pixel aligned already.
        paint.anti_alias = false;
        self.pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(size: f64) -> Surface {
        Surface::new(size, size, 1.0).unwrap()
    }

    fn tap(surface: &mut Surface, at: (f64, f64), radius: f64, falloff: Falloff) {
        let p = Point::new(at.0, at.1);
        surface.fill_segment(p, p, radius, Rgba::BLACK, 1.0, falloff);
    }

    #[test]
    fn test_segment_core_is_solid() {
        let mut surface = blank(40.0);
        let red = Rgba::rgb(255, 0, 0);
        surface.fill_segment(
            Point::new(10.0, 10.0),
            Point::new(30.0, 10.0),
            3.0,
            red,
            1.0,
            Falloff::Antialiased,
        );
        assert_eq!(surface.pixel(20, 9), Some(red));
        assert_eq!(surface.pixel(20, 10), Some(red));
        // Round cap extends past the end point.
        assert_eq!(surface.pixel(31, 9), Some(red));
        // Well outside the stroke.
        assert_eq!(surface.pixel(20, 20), Some(Rgba::WHITE));
    }

    #[test]
    fn test_zero_length_segment_is_a_dot() {
        let mut surface = blank(20.0);
        tap(&mut surface, (10.0, 10.0), 2.0, Falloff::Antialiased);
        assert_eq!(surface.pixel(10, 10), Some(Rgba::BLACK));
        assert!(surface.painted_pixel_count() >= 4);
    }

    #[test]
    fn test_hairline_still_marks() {
        for at in [(5.5, 5.5), (5.0, 5.0)] {
            let mut surface = blank(20.0);
            tap(&mut surface, at, 0.0, Falloff::Antialiased);
            assert!(!surface.is_blank(), "no mark at {at:?}");
        }
    }

    #[test]
    fn test_opacity_blends_with_background() {
        let mut surface = blank(10.0);
        surface.fill_dot(Point::new(5.0, 5.0), 1.0, Rgba::BLACK, 0.5);
        let px = surface.pixel(4, 4).unwrap();
        assert!(px.r > 120 && px.r < 135);
        assert_eq!(px.a, 255);
    }

    #[test]
    fn test_feathered_edge_is_softer() {
        let mut hard = blank(40.0);
        let mut soft = blank(40.0);
        tap(&mut hard, (20.0, 20.0), 8.0, Falloff::Antialiased);
        tap(&mut soft, (20.0, 20.0), 8.0, Falloff::Feathered { core: 0.35 });

        // Centre is (nearly) fully covered in both, the rim only in the hard one.
        assert!(soft.pixel(20, 20).unwrap().r < 32);
        let rim_hard = hard.pixel(26, 20).unwrap();
        let rim_soft = soft.pixel(26, 20).unwrap();
        assert_eq!(rim_hard, Rgba::BLACK);
        assert!(rim_soft.r > rim_hard.r);
    }

    #[test]
    fn test_narrow_feathered_taps_on_pixel_corners_mark() {
        // Integer coordinates sit on pixel corners, the hardest case for coverage.
        for radius in [0.25, 0.5, 0.7, 1.0] {
            let mut surface = blank(40.0);
            tap(&mut surface, (20.0, 20.0), radius, Falloff::Feathered { core: 0.35 });
            assert!(!surface.is_blank(), "radius {radius} left no mark");
        }
    }

    #[test]
    fn test_narrow_feathered_line_on_pixel_edge_marks() {
        let mut surface = blank(40.0);
        surface.fill_segment(
            Point::new(5.0, 20.0),
            Point::new(35.0, 20.0),
            0.5,
            Rgba::BLACK,
            1.0,
            Falloff::Feathered { core: 0.35 },
        );
        for x in 10..30 {
            let above = surface.pixel(x, 19).unwrap();
            let below = surface.pixel(x, 20).unwrap();
            assert!(above.r < 255 || below.r < 255, "gap at x = {x}");
        }
    }

    #[test]
    fn test_blurred_reaches_past_radius() {
        let mut surface = blank(40.0);
        tap(&mut surface, (20.0, 20.0), 4.0, Falloff::Blurred { blur: 6.0 });
        // Pixel 25 is 5.5 from the centre, past the radius but inside the blur.
        let px = surface.pixel(25, 20).unwrap();
        assert!(px.r < 255);
        assert_eq!(surface.pixel(0, 0), Some(Rgba::WHITE));
    }

    #[test]
    fn test_blurred_near_edge_is_clipped() {
        let mut surface = blank(20.0);
        tap(&mut surface, (1.0, 1.0), 3.0, Falloff::Blurred { blur: 4.0 });
        assert!(!surface.is_blank());
        tap(&mut surface, (-80.0, -80.0), 3.0, Falloff::Blurred { blur: 4.0 });
    }

    #[test]
    fn test_clipping_off_surface() {
        let mut surface = blank(10.0);
        surface.fill_segment(
            Point::new(-50.0, -50.0),
            Point::new(-40.0, -40.0),
            2.0,
            Rgba::BLACK,
            1.0,
            Falloff::Antialiased,
        );
        surface.fill_dot(Point::new(100.0, 100.0), 3.0, Rgba::BLACK, 1.0);
        assert!(surface.is_blank());

        // Partially visible segments are clipped, not dropped.
        surface.fill_segment(
            Point::new(-5.0, 5.0),
            Point::new(5.0, 5.0),
            1.0,
            Rgba::BLACK,
            1.0,
            Falloff::Antialiased,
        );
        assert_eq!(surface.pixel(0, 4).map(|p| p.r < 128), Some(true));
    }

    #[test]
    fn test_non_finite_points_are_skipped() {
        let mut surface = blank(10.0);
        surface.fill_segment(
            Point::new(f64::NAN, 5.0),
            Point::new(5.0, 5.0),
            2.0,
            Rgba::BLACK,
            1.0,
            Falloff::Antialiased,
        );
        assert!(surface.is_blank());
    }

    #[test]
    fn test_transparent_color_is_noop() {
        let mut surface = blank(10.0);
        surface.fill_dot(Point::new(5.0, 5.0), 4.0, Rgba::TRANSPARENT, 1.0);
        assert!(surface.is_blank());
    }
}
