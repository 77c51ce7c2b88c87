//! RGB colors for the 2D renderers
use std::fmt;
use std::str::FromStr;

/// An RGB color with components in the range 0 to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);
    /// Light gray, the default color of a model.
    pub const LIGHT_GRAY: Rgb = Rgb::from_u32(0xE6E6E6);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Split a `0xRRGGBB` value. Bits above the lowest 24 are ignored.
    pub const fn from_u32(color: u32) -> Self {
        Self {
            r: ((color >> 16) & 0xFF) as f32 / 255.0,
            g: ((color >> 8) & 0xFF) as f32 / 255.0,
            b: (color & 0xFF) as f32 / 255.0,
        }
    }

    /// The color at the given brightness.
    pub fn shade(&self, intensity: f32) -> Self {
        Self::new(self.r * intensity, self.g * intensity, self.b * intensity)
    }

    pub fn is_white(&self) -> bool {
        self.r >= 1.0 && self.g >= 1.0 && self.b >= 1.0
    }
}

/// Error for a color that is not six hexadecimal digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(String);

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a 6-digit hexadecimal RGB color", self.0)
    }
}

impl std::error::Error for ParseColorError {}

impl FromStr for Rgb {
    type Err = ParseColorError;

    /// Parse `RRGGBB`, optionally prefixed by `#` or `0x`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .trim()
            .trim_start_matches('#')
            .trim_start_matches("0x")
            .trim_start_matches("0X");
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseColorError(s.to_string()));
        }
        u32::from_str_radix(digits, 16)
            .map(Rgb::from_u32)
            .map_err(|_| ParseColorError(s.to_string()))
    }
}
