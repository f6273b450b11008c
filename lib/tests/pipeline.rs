use ascii_svg::{Error, RawOptions, process_image_to_svg};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

fn png_bytes(img: &RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// Extract the numeric value of `name="..."` from the root `<svg>` element
fn root_attr(svg: &str, name: &str) -> u32 {
    let root = svg.lines().find(|l| l.starts_with("<svg")).unwrap();
    let key = format!(" {}=\"", name);
    let start = root.find(&key).unwrap() + key.len();
    let end = start + root[start..].find('"').unwrap();
    root[start..end].parse().unwrap()
}

fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
            255,
        ])
    })
}

#[test]
fn test_red_square_scenario() {
    let img = RgbaImage::from_pixel(64, 64, Rgba([255, 0, 0, 255]));
    let options = RawOptions {
        target_width: 10,
        ..Default::default()
    };
    let svg = process_image_to_svg(&png_bytes(&img), options).unwrap();

    assert!(!svg.is_empty());
    assert!(svg.contains(r#"style="fill:#000000""#));
    // 10 glyph columns * 16 + 1 - 6
    assert!(root_attr(&svg, "width") >= 10 * 16 + 1 - 6);
    assert_eq!(root_attr(&svg, "height"), 10 * 16);
    // One color, one run per row
    assert_eq!(svg.matches("<text ").count(), 10);
    assert!(svg.contains("fill:#ff0000"));
}

#[test]
fn test_pipeline_is_deterministic() {
    let bytes = png_bytes(&gradient(300, 200));
    let options = RawOptions {
        target_width: 60,
        brightness: 5.0,
        contrast: 10.0,
        sharpen: 0.8,
        transparency_threshold: 0.5,
        ..Default::default()
    };
    let first = process_image_to_svg(&bytes, options.clone()).unwrap();
    let second = process_image_to_svg(&bytes, options).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_extreme_sharpen_completes() {
    let bytes = png_bytes(&gradient(8, 8));
    for sharpen in [1e7, 1e30] {
        let svg = process_image_to_svg(
            &bytes,
            RawOptions {
                target_width: 4,
                sharpen,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(root_attr(&svg, "height"), 4 * 16);
    }
}

#[test]
fn test_empty_input() {
    assert!(matches!(
        process_image_to_svg(&[], RawOptions::default()),
        Err(Error::EmptyInput(_))
    ));
}

#[test]
fn test_oversized_input() {
    let bytes = vec![0xFFu8; 60 * 1024 * 1024];
    assert!(matches!(
        process_image_to_svg(&bytes, RawOptions::default()),
        Err(Error::InputTooLarge { .. })
    ));
}

#[test]
fn test_invalid_width_rejected_before_decode() {
    let options = RawOptions {
        target_width: 0,
        ..Default::default()
    };
    assert!(matches!(
        process_image_to_svg(b"not an image", options),
        Err(Error::InvalidOption { .. })
    ));
}

#[test]
fn test_undecodable_input() {
    assert!(matches!(
        process_image_to_svg(b"GIF89a but not really", RawOptions::default()),
        Err(Error::Decode(_))
    ));
}

#[test]
fn test_background_color_resolution() {
    let bytes = png_bytes(&gradient(32, 32));

    let svg = process_image_to_svg(
        &bytes,
        RawOptions {
            target_width: 8,
            background_color: "#abc".into(),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(svg.contains(r#"style="fill:#aabbcc""#));

    let svg = process_image_to_svg(
        &bytes,
        RawOptions {
            target_width: 8,
            background_color: "bogus".into(),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(svg.contains(r#"style="fill:#000000""#));
}

#[test]
fn test_fully_transparent_image_uses_substitute() {
    let img = RgbaImage::from_pixel(40, 20, Rgba([0, 0, 0, 0]));
    let svg = process_image_to_svg(
        &png_bytes(&img),
        RawOptions {
            target_width: 20,
            transparency_color: "#00ff00".into(),
            transparency_threshold: 0.5,
            ..Default::default()
        },
    )
    .unwrap();
    assert!(svg.contains("fill:#00ff00"));
    assert_eq!(svg.matches("<text ").count(), 10);
}

#[test]
fn test_wide_target_is_capped() {
    let bytes = png_bytes(&gradient(64, 32));
    let svg = process_image_to_svg(
        &bytes,
        RawOptions {
            target_width: 1000,
            ..Default::default()
        },
    )
    .unwrap();
    // 500 columns x 250 rows
    assert_eq!(root_attr(&svg, "width"), 500 * 16 + 1 - 6);
    assert_eq!(root_attr(&svg, "height"), 250 * 16);
}

#[test]
fn test_large_image_is_downsampled_not_rejected() {
    let img = RgbaImage::from_pixel(2500, 1200, Rgba([200, 200, 200, 255]));
    let svg = process_image_to_svg(
        &png_bytes(&img),
        RawOptions {
            target_width: 25,
            ..Default::default()
        },
    )
    .unwrap();
    // 25 x round(25 * 491 / 1024) = 12 rows after downsampling to 1024x491
    assert_eq!(root_attr(&svg, "height"), 12 * 16);
}
