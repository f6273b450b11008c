//! Hex color parsing and formatting
//!
//! Color strings travel through the options unvalidated and are resolved here
//! at the point of use. A string that does not resolve falls back to a
//! stage-specific default (white for the transparency substitute, black for
//! the canvas background, white for unset glyph foregrounds).

use std::fmt;

/// An opaque 8-bit sRGB color
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0, 0, 0]);
    pub const WHITE: Rgb = Rgb([255, 255, 255]);

    pub fn r(self) -> u8 {
        self.0[0]
    }

    pub fn g(self) -> u8 {
        self.0[1]
    }

    pub fn b(self) -> u8 {
        self.0[2]
    }
}

/// Lowercase `#rrggbb`
impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0[0], self.0[1], self.0[2])
    }
}

/// Resolve a hex color string.
///
/// Accepts 3 or 6 hex digits with an optional leading `#`; 3-digit forms are
/// expanded per digit (`#abc` -> `#aabbcc`). Anything else yields `None`.
pub fn resolve_color(value: &str) -> Option<Rgb> {
    let hex = value.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);

    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let nibble = |b: u8| -> u8 {
        match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            _ => b - b'A' + 10,
        }
    };

    let bytes = hex.as_bytes();
    match bytes.len() {
        3 => Some(Rgb([
            nibble(bytes[0]) * 17,
            nibble(bytes[1]) * 17,
            nibble(bytes[2]) * 17,
        ])),
        6 => Some(Rgb([
            nibble(bytes[0]) << 4 | nibble(bytes[1]),
            nibble(bytes[2]) << 4 | nibble(bytes[3]),
            nibble(bytes[4]) << 4 | nibble(bytes[5]),
        ])),
        _ => None,
    }
}
