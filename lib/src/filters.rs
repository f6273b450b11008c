use crate::color::Rgb;
use crate::config::MAX_SHARPEN_SIGMA;
use image::{ImageBuffer, Rgba, RgbaImage};
use rayon::prelude::*;

/// Working image inside the transformer: 16-bit channels, straight alpha
pub type Rgba16Image = ImageBuffer<Rgba<u16>, Vec<u16>>;

const MAX16: f64 = u16::MAX as f64;

/// Relative luminance of an RGB triple in [0.0, 1.0]
///
/// Formula: L = 0.2126*R + 0.7152*G + 0.0722*B
pub fn luminance(r: f32, g: f32, b: f32) -> f32 {
    (0.2126 * r + 0.7152 * g + 0.0722 * b).clamp(0.0, 1.0)
}

/// Map every color channel through `f`, leaving alpha untouched
fn map_color_channels(img: &Rgba16Image, f: impl Fn(u16) -> u16) -> Rgba16Image {
    ImageBuffer::from_fn(img.width(), img.height(), |x, y| {
        let Rgba([r, g, b, a]) = *img.get_pixel(x, y);
        Rgba([f(r), f(g), f(b), a])
    })
}

fn clamp16(value: f64) -> u16 {
    value.round().clamp(0.0, MAX16) as u16
}

/// Shift brightness by `percentage` (-100..=100) of the full channel range
pub fn adjust_brightness(img: &Rgba16Image, percentage: f64) -> Rgba16Image {
    let shift = MAX16 * percentage.clamp(-100.0, 100.0) / 100.0;
    map_color_channels(img, |v| clamp16(v as f64 + shift))
}

/// Scale contrast around the channel midpoint by `percentage` (-100..=100)
///
/// -100 collapses every channel to mid-gray, 0 is the identity.
pub fn adjust_contrast(img: &Rgba16Image, percentage: f64) -> Rgba16Image {
    let factor = (100.0 + percentage.clamp(-100.0, 100.0)) / 100.0;
    map_color_channels(img, |v| {
        clamp16(((v as f64 / MAX16 - 0.5) * factor + 0.5) * MAX16)
    })
}

/// Unsharp mask: `2 * original - gaussian(original, sigma)` on color channels
///
/// Non-positive sigma leaves the image unchanged; sigma is capped at
/// `MAX_SHARPEN_SIGMA` to keep the blur kernel bounded.
pub fn sharpen(img: &Rgba16Image, sigma: f64) -> Rgba16Image {
    if sigma <= 0.0 || sigma.is_nan() {
        return img.clone();
    }
    let sigma = sigma.min(MAX_SHARPEN_SIGMA);
    let blurred = imageproc::filter::gaussian_blur_f32(img, sigma as f32);

    ImageBuffer::from_fn(img.width(), img.height(), |x, y| {
        let Rgba([r, g, b, a]) = *img.get_pixel(x, y);
        let Rgba([br, bg, bb, _]) = *blurred.get_pixel(x, y);
        let unsharp = |v: u16, blur: u16| clamp16(2.0 * v as f64 - blur as f64);
        Rgba([unsharp(r, br), unsharp(g, bg), unsharp(b, bb), a])
    })
}

/// Flatten alpha against a substitute color
///
/// With `T = floor(threshold * 65535)`:
/// - alpha below `T` becomes the opaque substitute
/// - alpha in `[T, 65535)` is blended linearly with the substitute
/// - fully opaque pixels pass through
///
/// The result is 8-bit and fully opaque everywhere.
pub fn composite_transparency(img: &Rgba16Image, substitute: Rgb, threshold: f64) -> RgbaImage {
    let (width, height) = img.dimensions();
    let alpha_threshold = (threshold * MAX16).floor() as u32;
    let mut output = RgbaImage::new(width, height);
    let row_len = width as usize * 4;

    // Parallelize over rows
    output
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, out) in row.chunks_exact_mut(4).enumerate() {
                let px = img.get_pixel(x as u32, y as u32);
                out.copy_from_slice(&composite_pixel(*px, substitute, alpha_threshold).0);
            }
        });

    output
}

fn composite_pixel(px: Rgba<u16>, substitute: Rgb, alpha_threshold: u32) -> Rgba<u8> {
    let Rgba([r, g, b, a]) = px;
    let a32 = a as u32;

    if a32 < alpha_threshold {
        Rgba([substitute.r(), substitute.g(), substitute.b(), 255])
    } else if a < u16::MAX {
        let alpha = a as f64 / MAX16;
        let blend = |v: u16, t: u8| -> u8 {
            let mixed = (v as f64 / MAX16) * alpha + (t as f64 / 255.0) * (1.0 - alpha);
            (mixed * 255.0) as u8
        };
        Rgba([
            blend(r, substitute.r()),
            blend(g, substitute.g()),
            blend(b, substitute.b()),
            255,
        ])
    } else {
        Rgba([(r >> 8) as u8, (g >> 8) as u8, (b >> 8) as u8, 255])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(px: [u16; 4]) -> Rgba16Image {
        Rgba16Image::from_pixel(8, 8, Rgba(px))
    }

    #[test]
    fn test_luminance_extremes() {
        assert_eq!(luminance(0.0, 0.0, 0.0), 0.0);
        assert!((luminance(1.0, 1.0, 1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_luminance_weights_green() {
        assert!(luminance(0.0, 1.0, 0.0) > luminance(1.0, 0.0, 0.0));
        assert!(luminance(1.0, 0.0, 0.0) > luminance(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_brightness_shifts_and_clamps() {
        let img = solid([30_000, 0, 65_535, 1234]);
        let out = adjust_brightness(&img, 10.0);
        let Rgba([r, g, b, a]) = *out.get_pixel(0, 0);
        assert_eq!(r, 30_000 + 6554);
        assert_eq!(g, 6554);
        assert_eq!(b, 65_535);
        assert_eq!(a, 1234); // alpha untouched

        let out = adjust_brightness(&img, -500.0);
        assert_eq!(out.get_pixel(0, 0).0[..3], [0, 0, 0]);
    }

    #[test]
    fn test_contrast_full_negative_is_gray() {
        let img = solid([0, 20_000, 65_535, 65_535]);
        let out = adjust_contrast(&img, -100.0);
        for &v in &out.get_pixel(3, 3).0[..3] {
            assert_eq!(v, 32_768);
        }
    }

    #[test]
    fn test_contrast_positive_spreads_from_midpoint() {
        let img = solid([20_000, 50_000, 32_768, 65_535]);
        let out = adjust_contrast(&img, 50.0);
        let Rgba([r, g, b, _]) = *out.get_pixel(0, 0);
        assert!(r < 20_000);
        assert!(g > 50_000);
        assert!((b as i32 - 32_768).abs() <= 1);
    }

    #[test]
    fn test_sharpen_uniform_image_unchanged() {
        let img = solid([12_345, 40_000, 0, 65_535]);
        let out = sharpen(&img, 1.5);
        for (a, b) in img.pixels().zip(out.pixels()) {
            for c in 0..3 {
                assert!((a.0[c] as i32 - b.0[c] as i32).abs() <= 1);
            }
        }
    }

    #[test]
    fn test_sharpen_non_positive_sigma_is_noop() {
        let img = solid([1, 2, 3, 4]);
        assert_eq!(sharpen(&img, -2.0), img);
    }

    #[test]
    fn test_sharpen_huge_sigma_is_capped() {
        let img = solid([12_345, 40_000, 0, 65_535]);
        for sigma in [1e7, 1e30, f64::MAX] {
            let out = sharpen(&img, sigma);
            assert_eq!(out.dimensions(), img.dimensions());
            for (a, b) in img.pixels().zip(out.pixels()) {
                for c in 0..3 {
                    assert!((a.0[c] as i32 - b.0[c] as i32).abs() <= 1);
                }
            }
        }
    }

    #[test]
    fn test_composite_below_threshold_is_substitute() {
        let img = solid([65_535, 0, 0, 1000]);
        let out = composite_transparency(&img, Rgb([0, 128, 255]), 0.5);
        assert_eq!(out.get_pixel(0, 0), &Rgba([0, 128, 255, 255]));
    }

    #[test]
    fn test_composite_opaque_passes_through() {
        let img = solid([0xABFF, 0x1200, 0xFFFF, 0xFFFF]);
        let out = composite_transparency(&img, Rgb::WHITE, 1.0);
        assert_eq!(out.get_pixel(5, 5), &Rgba([0xAB, 0x12, 0xFF, 255]));
    }

    #[test]
    fn test_composite_partial_alpha_blends() {
        // Half-transparent black over white with threshold 0 -> mid gray
        let img = solid([0, 0, 0, 32_768]);
        let out = composite_transparency(&img, Rgb::WHITE, 0.0);
        let Rgba([r, g, b, a]) = *out.get_pixel(0, 0);
        assert_eq!(a, 255);
        assert_eq!((r, g, b), (127, 127, 127));
    }

    #[test]
    fn test_composite_threshold_one_replaces_all_translucent() {
        let img = solid([0, 0, 0, 65_534]);
        let out = composite_transparency(&img, Rgb([9, 9, 9]), 1.0);
        assert_eq!(out.get_pixel(0, 0), &Rgba([9, 9, 9, 255]));
    }

    #[test]
    fn test_composite_leaves_no_partial_alpha() {
        let img = Rgba16Image::from_fn(16, 16, |x, y| {
            Rgba([1000, 2000, 3000, ((x * 16 + y) * 256) as u16])
        });
        let out = composite_transparency(&img, Rgb::WHITE, 0.3);
        assert!(out.pixels().all(|p| p.0[3] == 255));
    }
}
