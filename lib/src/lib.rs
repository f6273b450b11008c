//! ASCII SVG - image to colored ASCII art as a vector document
//!
//! This library decodes a raster image, adjusts it, samples it into a grid of
//! colored glyphs and renders the result as a self-contained SVG where every
//! run of same-colored glyphs is one `<text>` element.
//!
//! # Example
//! ```no_run
//! use ascii_svg::{process_image_to_svg, RawOptions};
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let svg = process_image_to_svg(&bytes, RawOptions::default()).unwrap();
//! std::fs::write("ascii_art.svg", svg).unwrap();
//! ```

pub mod ansi;
pub mod ascii;
pub mod codec;
pub mod color;
pub mod config;
pub mod error;
pub mod filters;
pub mod lut;
pub mod pool;
pub mod processor;
pub mod svg;

// Re-export main types for convenience
pub use color::{Rgb, resolve_color};
pub use config::{ProcessingOptions, RawOptions};
pub use error::{Error, Result};
pub use processor::{process_image_to_svg, process_with_options};
