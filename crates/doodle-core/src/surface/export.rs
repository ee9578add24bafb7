//! PNG export of the surface raster.

use super::{SurfaceError, SurfaceResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tiny_skia::Pixmap;

/// An encoded PNG copy of the surface, detached from the live raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    width: u32,
    height: u32,
    png: Vec<u8>,
}

impl ExportedImage {
    pub const MIME_TYPE: &'static str = "image/png";

    /// Encode a pixmap to PNG, demultiplying on the way out.
    pub(crate) fn encode(pixmap: &Pixmap) -> SurfaceResult<Self> {
        let png = pixmap
            .encode_png()
            .map_err(|e| SurfaceError::ExportFailure(format!("PNG encoding failed: {e}")))?;

        log::debug!(
            "Encoded {}x{} PNG ({} bytes)",
            pixmap.width(),
            pixmap.height(),
            png.len()
        );
        Ok(Self {
            width: pixmap.width(),
            height: pixmap.height(),
            png,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The encoded PNG bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.png
    }

    /// `data:image/png;base64,...` form, as handed to web collaborators.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", Self::MIME_TYPE, STANDARD.encode(&self.png))
    }
}
