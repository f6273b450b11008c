use crate::ansi::extract_lines;
use crate::ascii::convert_to_ascii;
use crate::codec::decode;
use crate::color::{Rgb, resolve_color};
use crate::config::{ProcessingOptions, RawOptions};
use crate::error::Result;
use crate::filters::{
    Rgba16Image, adjust_brightness, adjust_contrast, composite_transparency, sharpen,
};
use crate::svg::SvgRenderer;
use image::{DynamicImage, RgbaImage, imageops};
use log::{debug, info, warn};

/// Images larger than this on either axis are downsampled before filtering
pub const MAX_PROCESS_DIMENSION: u32 = 1024;

/// Shrink an image so that neither axis exceeds `MAX_PROCESS_DIMENSION`
///
/// Aspect ratio is preserved (each axis scaled by the same factor, floored,
/// at least 1 pixel). Images already within bounds are returned unchanged.
///
/// # Returns
/// A tuple of (image, was_resized)
fn downsample(input: Rgba16Image) -> (Rgba16Image, bool) {
    let (width, height) = input.dimensions();
    if width <= MAX_PROCESS_DIMENSION && height <= MAX_PROCESS_DIMENSION {
        return (input, false);
    }

    let scale = MAX_PROCESS_DIMENSION as f64 / width.max(height) as f64;
    let new_width = ((width as f64 * scale) as u32).max(1);
    let new_height = ((height as f64 * scale) as u32).max(1);
    info!(
        "Resizing to: {}x{} (scale: {:.2})",
        new_width, new_height, scale
    );

    // Resize using Lanczos3 filter for high quality
    let resized = imageops::resize(
        &input,
        new_width,
        new_height,
        imageops::FilterType::Lanczos3,
    );
    (resized, true)
}

/// Applies the geometric and photometric adjustments to a decoded image
///
/// This implements the transformer stage:
/// 1. Widen to 16-bit channels
/// 2. Downsample oversized images
/// 3. Brightness, contrast and sharpen (each only when non-zero, in that order)
/// 4. Composite transparency against the substitute color
///
/// # Returns
/// A fully opaque 8-bit image
pub fn transform(image: DynamicImage, options: &ProcessingOptions) -> RgbaImage {
    debug!(
        "Original image dimensions: {}x{}",
        image.width(),
        image.height()
    );

    let (mut working, _was_resized) = downsample(image.into_rgba16());

    if options.brightness() != 0.0 {
        working = adjust_brightness(&working, options.brightness());
    }
    if options.contrast() != 0.0 {
        working = adjust_contrast(&working, options.contrast());
    }
    if options.sharpen() != 0.0 {
        working = sharpen(&working, options.sharpen());
    }

    let substitute = resolve_color(options.transparency_color()).unwrap_or_else(|| {
        warn!(
            "Unparseable transparency color {:?}, using white",
            options.transparency_color()
        );
        Rgb::WHITE
    });
    composite_transparency(&working, substitute, options.transparency_threshold())
}

/// Converts encoded image bytes into a colored ASCII-art SVG document
///
/// This is the single entry point for hosts. The full pipeline:
/// 1. Normalize options
/// 2. Decode (size-checked before decoding)
/// 3. Transform (downsample, adjust, composite)
/// 4. Sample glyph cells into the color-coded cell stream
/// 5. Extract styled runs, grouped into lines
/// 6. Render and serialize the SVG
///
/// # Example
/// ```no_run
/// use ascii_svg::{RawOptions, process_image_to_svg};
///
/// let bytes = std::fs::read("photo.png").unwrap();
/// let options = RawOptions {
///     target_width: 80,
///     ..Default::default()
/// };
/// let svg = process_image_to_svg(&bytes, options).unwrap();
/// std::fs::write("photo.svg", svg).unwrap();
/// ```
pub fn process_image_to_svg(data: &[u8], options: RawOptions) -> Result<String> {
    let options = options.normalize()?;
    process_with_options(data, &options)
}

/// Same as [`process_image_to_svg`] for options that are already normalized
pub fn process_with_options(data: &[u8], options: &ProcessingOptions) -> Result<String> {
    let decoded = decode(data)?;
    let processed = transform(decoded.image, options);
    let stream = convert_to_ascii(&processed, options.target_width())?;
    let lines = extract_lines(&stream)?;
    SvgRenderer::new().render_to_svg(Some(lines.as_slice()), options.background_color())
}
