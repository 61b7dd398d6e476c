//! RGBA colour type used for clears, fills and tints.
//!
//! Stored as four `f32` values (0.0 – 1.0).  The frame buffer works in
//! packed `0x00RRGGBB` pixels; [`Color::to_pixel`] and [`Color::from_pixel`]
//! convert between the two.  Config files spell colours as a palette name
//! (`"white"`, `"sky-blue"`) or `#RRGGBB` / `#RRGGBBAA`.
//!
//! # Example
//! ```rust
//! use fastgame_core::Color;
//!
//! let sky = Color::from_hex(0x87CEEBFF);
//! assert_eq!(Color::parse("#87ceeb").unwrap().to_pixel(), sky.to_pixel());
//! assert_eq!(Color::WHITE.to_pixel(), 0x00FF_FFFF);
//! ```

use serde::{Deserialize, Serialize};

/// RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    // ── Constructors ────────────────────────────────────────────────────────

    /// Opaque colour from red, green, blue components.
    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Colour from all four components.
    #[inline]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Construct from a packed `0xRRGGBBAA` hexadecimal value.
    ///
    /// ```rust,ignore
    /// let coral = Color::from_hex(0xFF6B6BFF);
    /// ```
    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 24) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let b = ((hex >> 8)  & 0xFF) as f32 / 255.0;
        let a = ((hex)        & 0xFF) as f32 / 255.0;
        Self { r, g, b, a }
    }

    /// Construct from 8-bit components.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    // ── Conversions ─────────────────────────────────────────────────────────

    /// 8-bit components `[r, g, b, a]`, rounded and clamped.
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Packs into a `0x00RRGGBB` frame-buffer pixel (alpha discarded).
    pub fn to_pixel(self) -> u32 {
        let [r, g, b, _] = self.to_rgba8();
        ((r as u32) << 16) | ((g as u32) << 8) | b as u32
    }

    /// Unpacks a `0x00RRGGBB` pixel as an opaque colour.
    pub fn from_pixel(px: u32) -> Self {
        Self::from_rgb8((px >> 16) as u8, (px >> 8) as u8, px as u8)
    }

    /// `#RRGGBBAA` text form.
    pub fn to_hex_string(self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
    }

    /// Parses a palette name or a `#RRGGBB` / `#RRGGBBAA` literal.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(hex) = text.strip_prefix('#') {
            let value = u32::from_str_radix(hex, 16).ok()?;
            return match hex.len() {
                6 => Some(Self::from_hex((value << 8) | 0xFF)),
                8 => Some(Self::from_hex(value)),
                _ => None,
            };
        }
        let name = text.to_ascii_lowercase().replace(['_', ' '], "-");
        PALETTE
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, c)| *c)
    }

    // ── Palette ─────────────────────────────────────────────────────────────

    pub const WHITE:       Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK:       Self = Self::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    pub const RED:         Self = Self::rgb(1.0, 0.0, 0.0);
    pub const GREEN:       Self = Self::rgb(0.0, 1.0, 0.0);
    pub const BLUE:        Self = Self::rgb(0.0, 0.0, 1.0);

    pub const YELLOW:      Self = Self::rgb(1.0, 1.0, 0.0);
    pub const CYAN:        Self = Self::rgb(0.0, 1.0, 1.0);
    pub const MAGENTA:     Self = Self::rgb(1.0, 0.0, 1.0);

    pub const ORANGE:      Self = Self::rgb(1.0, 0.5, 0.0);
    pub const PURPLE:      Self = Self::rgb(0.5, 0.0, 0.5);
    pub const PINK:        Self = Self::rgb(1.0, 0.41, 0.71);

    pub const DARK_GRAY:   Self = Self::rgb(0.25, 0.25, 0.25);
    pub const GRAY:        Self = Self::rgb(0.5, 0.5, 0.5);
    pub const LIGHT_GRAY:  Self = Self::rgb(0.75, 0.75, 0.75);

    pub const SKY_BLUE:    Self = Self::rgb(0.53, 0.81, 0.92);
    pub const LIME:        Self = Self::rgb(0.0, 0.8, 0.0);
    pub const TEAL:        Self = Self::rgb(0.0, 0.5, 0.5);
    pub const NAVY:        Self = Self::rgb(0.0, 0.0, 0.5);
    pub const BEIGE:       Self = Self::rgb(0.96, 0.96, 0.86);
    pub const BROWN:       Self = Self::rgb(0.55, 0.27, 0.07);
}

const PALETTE: &[(&str, Color)] = &[
    ("white", Color::WHITE),
    ("black", Color::BLACK),
    ("transparent", Color::TRANSPARENT),
    ("red", Color::RED),
    ("green", Color::GREEN),
    ("blue", Color::BLUE),
    ("yellow", Color::YELLOW),
    ("cyan", Color::CYAN),
    ("magenta", Color::MAGENTA),
    ("orange", Color::ORANGE),
    ("purple", Color::PURPLE),
    ("pink", Color::PINK),
    ("dark-gray", Color::DARK_GRAY),
    ("gray", Color::GRAY),
    ("light-gray", Color::LIGHT_GRAY),
    ("sky-blue", Color::SKY_BLUE),
    ("lime", Color::LIME),
    ("teal", Color::TEAL),
    ("navy", Color::NAVY),
    ("beige", Color::BEIGE),
    ("brown", Color::BROWN),
];

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Color::parse(&text).ok_or_else(|| format!("unknown colour `{text}`"))
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let c = Color::from_hex(0xFF8000FF);
        assert!((c.r - 1.0).abs() < 0.01);
        assert!((c.g - 0.502).abs() < 0.01);
        assert!((c.b - 0.0).abs() < 0.01);
        assert!((c.a - 1.0).abs() < 0.01);
    }

    #[test]
    fn pixel_packing() {
        assert_eq!(Color::RED.to_pixel(), 0x00FF_0000);
        assert_eq!(Color::from_pixel(0x0000_FF00), Color::from_rgb8(0, 255, 0));
    }

    #[test]
    fn parse_names_and_hex() {
        assert_eq!(Color::parse("White"), Some(Color::WHITE));
        assert_eq!(Color::parse("sky_blue"), Some(Color::SKY_BLUE));
        assert_eq!(Color::parse("#FF000080").map(|c| c.to_rgba8()), Some([255, 0, 0, 128]));
        assert_eq!(Color::parse("#12"), None);
        assert_eq!(Color::parse("chartreuse-ish"), None);
        let back: String = Color::BLUE.into();
        assert_eq!(back, "#0000FFFF");
    }
}
