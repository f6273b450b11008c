use anyhow::{Context, Result};
use ascii_svg::{RawOptions, process_image_to_svg};
use clap::Parser;
use log::info;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

/// Convert an image into colored ASCII art rendered as SVG
#[derive(Parser, Debug)]
#[command(name = "ascii-svg", version, about, long_about = None)]
struct Args {
    /// Input image (PNG, JPEG, GIF, BMP, WebP, ...)
    input: PathBuf,

    /// Output SVG file (writes to stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of glyph columns
    #[arg(short, long, default_value_t = RawOptions::default().target_width)]
    width: i64,

    /// Brightness shift in percent (-100..100)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    brightness: f64,

    /// Contrast change in percent (-100..100)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    contrast: f64,

    /// Sharpening strength (Gaussian sigma)
    #[arg(long, default_value_t = 0.0)]
    sharpen: f64,

    /// Canvas color, e.g. "#000" or "#1e1e1e" (default black)
    #[arg(long, default_value = "")]
    background: String,

    /// Color substituted for transparent pixels (default white)
    #[arg(long, default_value = "")]
    transparency_color: String,

    /// Alpha below which pixels are fully replaced, 0.0..1.0
    #[arg(long, default_value_t = RawOptions::default().transparency_threshold)]
    transparency_threshold: f64,
}

fn main() -> Result<()> {
    // Configure logging
    env_logger::init();

    let args = Args::parse();

    let data = std::fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let options = RawOptions {
        target_width: args.width,
        brightness: args.brightness,
        contrast: args.contrast,
        sharpen: args.sharpen,
        background_color: args.background,
        transparency_color: args.transparency_color,
        transparency_threshold: args.transparency_threshold,
    };
    info!(
        "Processing image: width={}, brightness={:.2}, contrast={:.2}, sharpen={:.2}, bg_color={}, transparency_color={}, threshold={:.2}",
        options.target_width,
        options.brightness,
        options.contrast,
        options.sharpen,
        options.background_color,
        options.transparency_color,
        options.transparency_threshold
    );

    let start = Instant::now();
    let svg = process_image_to_svg(&data, options)
        .with_context(|| format!("error processing {}", args.input.display()))?;
    info!(
        "Image processed successfully in {:.1} ms ({} bytes)",
        start.elapsed().as_secs_f64() * 1000.0,
        svg.len()
    );

    match &args.output {
        Some(path) => std::fs::write(path, &svg)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => std::io::stdout()
            .lock()
            .write_all(svg.as_bytes())
            .context("failed to write to stdout")?,
    }

    Ok(())
}
