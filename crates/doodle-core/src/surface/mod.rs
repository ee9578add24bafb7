//! Backing raster for the doodle canvas.
//!
//! The surface is addressed in device pixels. Callers work in logical (CSS)
//! coordinates and go through [`Surface::to_device`] before touching pixels;
//! the pixel ratio is fixed when the surface is created.

mod blur;
mod export;
pub(crate) mod raster;

pub use export::ExportedImage;
pub(crate) use raster::Falloff;

use crate::color::Rgba;
use crate::history::HistoryEntry;
use kurbo::{Point, Size};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tiny_skia::{ColorU8, Pixmap, PremultipliedColorU8};

/// Background fill of a fresh surface.
pub const DEFAULT_BACKGROUND: Rgba = Rgba::WHITE;

/// Surface errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurfaceError {
    #[error("Invalid surface dimensions: {width}x{height}")]
    InvalidDimensions { width: f64, height: f64 },
    #[error("Invalid pixel ratio: {0}")]
    InvalidPixelRatio(f64),
    #[error("Snapshot is {found_width}x{found_height}, surface is {width}x{height}")]
    SurfaceMismatch {
        width: u32,
        height: u32,
        found_width: u32,
        found_height: u32,
    },
    #[error("Export failed: {0}")]
    ExportFailure(String),
}

/// Result type for surface operations.
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// A fixed-size RGBA8 pixmap plus the logical-to-device scale.
#[derive(Clone)]
pub struct Surface {
    /// Size in logical (CSS) units, as requested at creation.
    logical_size: Size,
    /// Device pixels per logical unit.
    pixel_ratio: f64,
    /// Color the surface is filled with when created or cleared.
    background: Rgba,
    pixmap: Pixmap,
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("logical_size", &self.logical_size)
            .field("pixel_ratio", &self.pixel_ratio)
            .field("background", &self.background)
            .finish_non_exhaustive()
    }
}

impl Surface {
    /// Allocate a `width*ratio x height*ratio` raster filled with white.
    pub fn new(logical_width: f64, logical_height: f64, pixel_ratio: f64) -> SurfaceResult<Self> {
        Self::with_background(logical_width, logical_height, pixel_ratio, DEFAULT_BACKGROUND)
    }

    /// Allocate a raster filled with the given background color.
    pub fn with_background(
        logical_width: f64,
        logical_height: f64,
        pixel_ratio: f64,
        background: Rgba,
    ) -> SurfaceResult<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(logical_width) || !valid(logical_height) {
            return Err(SurfaceError::InvalidDimensions {
                width: logical_width,
                height: logical_height,
            });
        }
        if !valid(pixel_ratio) {
            return Err(SurfaceError::InvalidPixelRatio(pixel_ratio));
        }

        let width = device_extent(logical_width, pixel_ratio);
        let height = device_extent(logical_height, pixel_ratio);
        let pixmap = Pixmap::new(width, height).ok_or(SurfaceError::InvalidDimensions {
            width: logical_width,
            height: logical_height,
        })?;

        log::debug!(
            "Created {}x{} surface ({}x{} logical @ {}x)",
            width,
            height,
            logical_width,
            logical_height,
            pixel_ratio
        );

        let mut surface = Self {
            logical_size: Size::new(logical_width, logical_height),
            pixel_ratio,
            background,
            pixmap,
        };
        surface.fill_background();
        Ok(surface)
    }

    /// Width in device pixels.
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Height in device pixels.
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn logical_size(&self) -> Size {
        self.logical_size
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn background(&self) -> Rgba {
        self.background
    }

    /// Raw premultiplied RGBA bytes, row-major.
    ///
    /// Equal to straight RGBA wherever the surface is opaque.
    pub fn pixels(&self) -> &[u8] {
        self.pixmap.data()
    }

    /// Translate a logical point to device-pixel space.
    pub fn to_device(&self, logical: Point) -> Point {
        Point::new(logical.x * self.pixel_ratio, logical.y * self.pixel_ratio)
    }

    /// Scale a logical length (brush width, radius) to device pixels.
    pub fn to_device_length(&self, length: f64) -> f64 {
        length * self.pixel_ratio
    }

    /// Color of the device pixel at `(x, y)`, if inside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        Some(self.pixmap.pixel(x, y)?.demultiply().into())
    }

    /// Repaint every pixel with the background color.
    pub fn fill_background(&mut self) {
        let bg = self.premultiplied_background();
        self.pixmap.pixels_mut().fill(bg);
    }

    /// Number of pixels that differ from the background color.
    pub fn painted_pixel_count(&self) -> usize {
        let bg = self.premultiplied_background();
        self.pixmap.pixels().iter().filter(|px| **px != bg).count()
    }

    /// True when every pixel is the background color.
    pub fn is_blank(&self) -> bool {
        let bg = self.premultiplied_background();
        self.pixmap.pixels().iter().all(|px| *px == bg)
    }

    /// Copy the current pixmap into an immutable history entry.
    pub fn snapshot(&self) -> HistoryEntry {
        HistoryEntry::new(self.width(), self.height(), Arc::from(self.pixmap.data()))
    }

    /// Overwrite the raster with a previously taken snapshot.
    ///
    /// A snapshot of a different size is rejected and the surface is left untouched.
    pub fn restore(&mut self, entry: &HistoryEntry) -> SurfaceResult<()> {
        if entry.width() != self.width() || entry.height() != self.height() {
            return Err(SurfaceError::SurfaceMismatch {
                width: self.width(),
                height: self.height(),
                found_width: entry.width(),
                found_height: entry.height(),
            });
        }
        self.pixmap.data_mut().copy_from_slice(entry.pixels());
        Ok(())
    }

    /// Encode the current pixmap as PNG.
    pub fn export(&self) -> SurfaceResult<ExportedImage> {
        ExportedImage::encode(&self.pixmap)
    }

    fn premultiplied_background(&self) -> PremultipliedColorU8 {
        ColorU8::from(self.background).premultiply()
    }
}

/// Device extent of a logical length; never less than one pixel.
fn device_extent(logical: f64, ratio: f64) -> u32 {
    (logical * ratio).floor().clamp(1.0, u32::MAX as f64) as u32
}
