use crate::error::{Error, Result};
use log::{debug, warn};

/// Largest accepted encoded image, in bytes (50 MiB)
pub const MAX_IMAGE_SIZE: usize = 50 * 1024 * 1024;
/// Largest SVG document the pipeline will return, in bytes (10 MiB)
pub const MAX_OUTPUT_SIZE: usize = 10 * 1024 * 1024;
/// Largest serialized cell stream, in bytes
pub const MAX_ASCII_CHARS: usize = 5_000_000;
/// Largest glyph grid extent on either axis
pub const MAX_ASCII_DIMENSION: u32 = 500;
/// Largest number of styled runs extracted from a cell stream
pub const MAX_STYLED_ELEMENTS: usize = 100_000;
/// Largest Gaussian sigma used for sharpening; larger requests are clamped
pub const MAX_SHARPEN_SIGMA: f64 = 50.0;

pub const DEFAULT_BACKGROUND_COLOR: &str = "#000000";
pub const DEFAULT_TRANSPARENCY_COLOR: &str = "#FFFFFF";

/// Conversion request as received from a host, before validation
#[derive(Debug, Clone)]
pub struct RawOptions {
    pub target_width: i64,     // glyph columns, must be > 0
    pub brightness: f64,       // percent shift, 0 = no-op
    pub contrast: f64,         // percent around midpoint, 0 = no-op
    pub sharpen: f64,          // unsharp-mask sigma, 0 = no-op
    pub background_color: String,
    pub transparency_color: String,
    pub transparency_threshold: f64, // clamped to [0, 1]
}

impl Default for RawOptions {
    fn default() -> Self {
        Self {
            target_width: 100,

            // Photometric adjustments
            brightness: 0.0,
            contrast: 0.0,
            sharpen: 0.0,

            // Colors (empty = default)
            background_color: String::new(),
            transparency_color: String::new(),
            transparency_threshold: 0.0,
        }
    }
}

impl RawOptions {
    /// Validates the request and fills in defaults
    ///
    /// Color strings are only defaulted when empty; malformed values pass
    /// through and are resolved (with a fallback) where they are used.
    pub fn normalize(self) -> Result<ProcessingOptions> {
        if self.target_width <= 0 {
            return Err(Error::InvalidOption {
                name: "target_width",
                reason: format!("must be positive, got {}", self.target_width),
            });
        }
        let target_width = u32::try_from(self.target_width).map_err(|_| Error::InvalidOption {
            name: "target_width",
            reason: format!("out of range, got {}", self.target_width),
        })?;

        for (name, value) in [
            ("brightness", self.brightness),
            ("contrast", self.contrast),
            ("sharpen", self.sharpen),
        ] {
            if !value.is_finite() {
                return Err(Error::InvalidOption {
                    name,
                    reason: format!("must be finite, got {}", value),
                });
            }
        }

        if self.sharpen > MAX_SHARPEN_SIGMA {
            warn!(
                "Sharpen sigma {} exceeds {}, clamping",
                self.sharpen, MAX_SHARPEN_SIGMA
            );
        }

        let threshold = if self.transparency_threshold.is_nan() {
            0.0
        } else {
            self.transparency_threshold.clamp(0.0, 1.0)
        };

        let options = ProcessingOptions {
            target_width,
            brightness: self.brightness,
            contrast: self.contrast,
            sharpen: self.sharpen.min(MAX_SHARPEN_SIGMA),
            background_color: or_default(self.background_color, DEFAULT_BACKGROUND_COLOR),
            transparency_color: or_default(self.transparency_color, DEFAULT_TRANSPARENCY_COLOR),
            transparency_threshold: threshold,
        };
        debug!("Normalized options: {:?}", options);
        Ok(options)
    }
}

fn or_default(value: String, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value
    }
}

/// Validated, immutable options for one conversion
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingOptions {
    target_width: u32,
    brightness: f64,
    contrast: f64,
    sharpen: f64,
    background_color: String,
    transparency_color: String,
    transparency_threshold: f64,
}

impl ProcessingOptions {
    pub fn target_width(&self) -> u32 {
        self.target_width
    }

    pub fn brightness(&self) -> f64 {
        self.brightness
    }

    pub fn contrast(&self) -> f64 {
        self.contrast
    }

    pub fn sharpen(&self) -> f64 {
        self.sharpen
    }

    pub fn background_color(&self) -> &str {
        &self.background_color
    }

    pub fn transparency_color(&self) -> &str {
        &self.transparency_color
    }

    pub fn transparency_threshold(&self) -> f64 {
        self.transparency_threshold
    }
}
