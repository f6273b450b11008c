//! Glyph lookup table
//!
//! Glyphs are ordered by ink density so that luminance maps monotonically onto
//! the ramp: dark regions get sparse glyphs, bright regions dense ones.

/// Density-ordered glyph ramp, darkest (space) to brightest (@)
pub const GLYPH_RAMP: [char; 15] = [
    ' ', // 0: darkest
    '.', ',', ':', ';', 'i', '1', 't', 'f', 'L', 'C', 'G', '0', '8',
    '@', // 14: brightest
];

/// Blank glyph; carries no foreground color
pub const BLANK: char = ' ';

/// Get the glyph for a luminance value
///
/// # Arguments
/// * `luminance` - Normalized luminance value [0.0, 1.0]
///
/// # Returns
/// The glyph at `floor(luminance * ramp length)`, clamped to the last entry
pub fn glyph_for_luminance(luminance: f32) -> char {
    let lum = if luminance.is_nan() {
        0.0
    } else {
        luminance.clamp(0.0, 1.0)
    };

    let index = (lum * GLYPH_RAMP.len() as f32).floor() as usize;
    GLYPH_RAMP[index.min(GLYPH_RAMP.len() - 1)]
}
