//! Raster decoding with cheap up-front rejection

use crate::config::MAX_IMAGE_SIZE;
use crate::error::{Error, Result};
use image::{DynamicImage, ImageFormat, ImageReader, Limits};
use log::info;
use std::io::Cursor;

/// Largest decoded extent accepted on either axis
const MAX_DECODE_DIMENSION: u32 = 32_768;
/// Upper bound on decoder allocations
const MAX_DECODE_ALLOC: u64 = 512 * 1024 * 1024;

/// A decoded image together with the format detected from its magic bytes
#[derive(Debug)]
pub struct DecodedImage {
    pub image: DynamicImage,
    pub format: ImageFormat,
}

/// Decode an encoded raster into pixels
///
/// Size checks run before the decoder is touched. Multi-frame formats yield
/// their first frame.
pub fn decode(data: &[u8]) -> Result<DecodedImage> {
    if data.is_empty() {
        return Err(Error::EmptyInput("image data"));
    }
    if data.len() > MAX_IMAGE_SIZE {
        return Err(Error::InputTooLarge {
            size: data.len(),
            limit: MAX_IMAGE_SIZE,
        });
    }

    let mut reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|err| Error::Decode(err.to_string()))?;
    let format = reader
        .format()
        .ok_or_else(|| Error::Decode("unrecognized image format".to_string()))?;

    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_DECODE_DIMENSION);
    limits.max_image_height = Some(MAX_DECODE_DIMENSION);
    limits.max_alloc = Some(MAX_DECODE_ALLOC);
    reader.limits(limits);

    let image = reader
        .decode()
        .map_err(|err| Error::Decode(err.to_string()))?;

    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions { width, height });
    }

    info!("Image decoded successfully. Format: {:?}, {}x{}", format, width, height);
    Ok(DecodedImage { image, format })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png_bytes(img: &RgbaImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_png() {
        let img = RgbaImage::from_pixel(12, 7, Rgba([10, 20, 30, 255]));
        let decoded = decode(&png_bytes(&img)).unwrap();
        assert_eq!(decoded.format, ImageFormat::Png);
        assert_eq!((decoded.image.width(), decoded.image.height()), (12, 7));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(decode(&[]), Err(Error::EmptyInput(_))));
    }

    #[test]
    fn test_oversized_input_rejected_before_decode() {
        // Not an image at all: a decode attempt would fail differently.
        let data = vec![0u8; 60 * 1024 * 1024];
        match decode(&data) {
            Err(Error::InputTooLarge { size, limit }) => {
                assert_eq!(size, data.len());
                assert_eq!(limit, MAX_IMAGE_SIZE);
            }
            other => panic!("expected InputTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let data = b"definitely not an image".to_vec();
        assert!(matches!(decode(&data), Err(Error::Decode(_))));
    }

    #[test]
    fn test_truncated_png_is_decode_error() {
        let img = RgbaImage::from_pixel(32, 32, Rgba([200, 0, 0, 255]));
        let bytes = png_bytes(&img);
        let truncated = &bytes[..bytes.len() / 2];
        assert!(matches!(decode(truncated), Err(Error::Decode(_))));
    }
}
