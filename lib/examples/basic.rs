/// Basic example: Convert a simple test image to an ASCII-art SVG
///
/// This creates a test image with some basic shapes, encodes it as PNG and
/// runs it through the full pipeline
use ascii_svg::{RawOptions, process_image_to_svg};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

fn main() {
    println!("ASCII SVG - Basic Example");
    println!("=========================\n");

    let width = 160;
    let height = 160;
    let mut img = RgbaImage::new(width, height);

    // Fill with a dark blue background
    for y in 0..height {
        for x in 0..width {
            img.put_pixel(x, y, Rgba([20, 30, 90, 255]));
        }
    }

    // Draw a yellow circle in the center, fading out at the rim
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;
    let radius = 50.0;

    for y in 0..height {
        for x in 0..width {
            let dx = x as f32 - center_x;
            let dy = y as f32 - center_y;
            let dist = (dx * dx + dy * dy).sqrt();

            if dist < radius {
                img.put_pixel(x, y, Rgba([255, 220, 40, 255]));
            } else if dist < radius + 10.0 {
                let alpha = (255.0 * (1.0 - (dist - radius) / 10.0)) as u8;
                img.put_pixel(x, y, Rgba([255, 220, 40, alpha]));
            }
        }
    }

    println!("Created test image: {}x{}", width, height);

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .expect("Failed to encode input");

    let options = RawOptions {
        target_width: 40,
        contrast: 15.0,
        background_color: "#101010".into(),
        transparency_color: "#1e2d5a".into(),
        transparency_threshold: 0.1,
        ..Default::default()
    };

    println!("Processing with options:");
    println!("  - Target width: {}", options.target_width);
    println!("  - Contrast: {}", options.contrast);
    println!("  - Background: {}", options.background_color);
    println!();

    let svg = process_image_to_svg(&png, options).expect("Conversion failed");

    img.save("basic_input.png").expect("Failed to save input");
    std::fs::write("basic_output.svg", &svg).expect("Failed to save output");

    println!("✓ Saved input to:  basic_input.png");
    println!("✓ Saved output to: basic_output.svg ({} bytes)", svg.len());
    println!("\nASCII conversion complete!");
}
