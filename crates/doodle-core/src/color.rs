//! Colors, hue rotation and the doodle palette.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tiny_skia::ColorU8;

/// Color parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("Invalid hex color: {0}")]
    InvalidHex(String),
}

/// Straight-alpha RGBA8 color.
///
/// Serialized as a hex string (`#rrggbb`, or `#rrggbbaa` when not opaque) so
/// session scripts can write colors the way the toolbar names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (the leading `#` is optional).
    pub fn from_hex(input: &str) -> Result<Self, ColorError> {
        let invalid = || ColorError::InvalidHex(input.to_string());
        let hex = input.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };

        match hex.len() {
            3 => {
                // #rgb -> #rrggbb
                let r = channel(0..1)? * 17;
                let g = channel(1..2)? * 17;
                let b = channel(2..3)? * 17;
                Ok(Self::rgb(r, g, b))
            }
            6 => Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Ok(Self::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => Err(invalid()),
        }
    }

    /// Lowercase hex form; alpha is only written when the color is not opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Fully saturated color at the given hue, i.e. `hsl(h, 100%, 50%)`.
    pub fn from_hue(degrees: f64) -> Self {
        let h = degrees.rem_euclid(360.0) / 60.0;
        let x = 1.0 - ((h % 2.0) - 1.0).abs();
        let (r, g, b) = match h as u32 {
            0 => (1.0, x, 0.0),
            1 => (x, 1.0, 0.0),
            2 => (0.0, 1.0, x),
            3 => (0.0, x, 1.0),
            4 => (x, 0.0, 1.0),
            _ => (1.0, 0.0, x),
        };
        let to_u8 = |v: f64| (v * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::rgb(to_u8(r), to_u8(g), to_u8(b))
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::BLACK
    }
}

impl TryFrom<String> for Rgba {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Rgba> for String {
    fn from(color: Rgba) -> Self {
        color.to_hex()
    }
}

impl std::str::FromStr for Rgba {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<ColorU8> for Rgba {
    fn from(color: ColorU8) -> Self {
        Self::new(color.red(), color.green(), color.blue(), color.alpha())
    }
}

impl From<Rgba> for ColorU8 {
    fn from(color: Rgba) -> Self {
        ColorU8::from_rgba(color.r, color.g, color.b, color.a)
    }
}

/// A named color swatch in the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swatch {
    pub label: &'static str,
    pub color: Rgba,
}

/// The doodle toolbar palette, in display order.
pub const PALETTE: &[Swatch] = &[
    Swatch { label: "Black", color: Rgba::rgb(0x00, 0x00, 0x00) },
    Swatch { label: "Red", color: Rgba::rgb(0xff, 0x00, 0x00) },
    Swatch { label: "Blue", color: Rgba::rgb(0x00, 0x00, 0xff) },
    Swatch { label: "Green", color: Rgba::rgb(0x00, 0xff, 0x00) },
    Swatch { label: "Yellow", color: Rgba::rgb(0xff, 0xff, 0x00) },
    Swatch { label: "Pink", color: Rgba::rgb(0xff, 0x00, 0xff) },
    Swatch { label: "Orange", color: Rgba::rgb(0xff, 0x80, 0x00) },
    Swatch { label: "Purple", color: Rgba::rgb(0x80, 0x00, 0xff) },
];

/// Look up a palette swatch by label (case-insensitive).
pub fn swatch(label: &str) -> Option<Rgba> {
    PALETTE
        .iter()
        .find(|s| s.label.eq_ignore_ascii_case(label))
        .map(|s| s.color)
}
