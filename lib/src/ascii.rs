use crate::color::Rgb;
use crate::config::{MAX_ASCII_CHARS, MAX_ASCII_DIMENSION};
use crate::error::{Error, Result, group_digits};
use crate::filters::luminance;
use crate::lut::{BLANK, glyph_for_luminance};
use image::RgbaImage;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::fmt::Write as _;

/// Stream length above which a large-output notice is logged
const LARGE_STREAM_CHARS: usize = 1_000_000;
/// Stream length above which a warning is logged
const VERY_LARGE_STREAM_CHARS: usize = 3_000_000;

/// One character of the ASCII-art grid
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GlyphCell {
    pub glyph: char,
    /// `None` for blank glyphs, which take whatever color is current
    pub foreground: Option<Rgb>,
}

/// Row-major grid of glyph cells
#[derive(Debug, Clone)]
pub struct GlyphGrid {
    columns: u32,
    rows: u32,
    cells: Vec<GlyphCell>,
}

impl GlyphGrid {
    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cells(&self) -> &[GlyphCell] {
        &self.cells
    }

    /// Serialize the grid into the color-coded cell stream
    ///
    /// Each row ends with `\n`. A truecolor SGR (`ESC[38;2;R;G;Bm`) is written
    /// only when a colored cell differs from the current foreground, so equal
    /// neighbours share one run downstream. The stream ends with a reset.
    pub fn encode(&self) -> Result<String> {
        let mut stream = String::with_capacity(self.cells.len() * 2);
        let mut current: Option<Rgb> = None;

        for row in self.cells.chunks(self.columns as usize) {
            for cell in row {
                match cell.foreground {
                    Some(fg) if current != Some(fg) => {
                        write!(stream, "\x1b[38;2;{};{};{}m", fg.r(), fg.g(), fg.b()).map_err(
                            |_| Error::ConversionFailed("failed to format cell stream".to_string()),
                        )?;
                        current = Some(fg);
                    }
                    _ => {}
                }
                stream.push(cell.glyph);
            }
            stream.push('\n');
        }
        stream.push_str("\x1b[0m");

        Ok(stream)
    }
}

/// Compute the glyph grid size for an image
///
/// Rows follow the image aspect ratio (`round(target_width * h / w)`, at
/// least 1). When either axis exceeds the dimension cap, the larger one is set
/// to the cap and the other scaled by the same ratio.
pub fn grid_dimensions(width: u32, height: u32, target_width: u32) -> (u32, u32) {
    let cap = MAX_ASCII_DIMENSION as f64;
    let columns = target_width.max(1) as f64;
    let rows = (columns * height as f64 / width.max(1) as f64)
        .round()
        .max(1.0);

    let (columns, rows) = if columns.max(rows) > cap {
        if columns >= rows {
            (cap, (rows * cap / columns).floor().max(1.0))
        } else {
            ((columns * cap / rows).floor().max(1.0), cap)
        }
    } else {
        (columns, rows)
    };

    (columns as u32, rows as u32)
}

/// Sample an opaque image into a `columns` x `rows` glyph grid
///
/// Each cell averages the pixels of its region; the average's luminance picks
/// the glyph and the average itself becomes the foreground.
pub fn sample_cells(img: &RgbaImage, columns: u32, rows: u32) -> Result<GlyphGrid> {
    let (width, height) = img.dimensions();
    if columns == 0 || rows == 0 || width == 0 || height == 0 {
        return Err(Error::ConversionFailed(format!(
            "empty glyph grid ({}x{} cells from {}x{} pixels)",
            columns, rows, width, height
        )));
    }

    // Parallelize row sampling
    let cells: Vec<GlyphCell> = (0..rows)
        .into_par_iter()
        .flat_map_iter(|row| {
            let (y0, y1) = span(row, rows, height);
            (0..columns).map(move |col| {
                let (x0, x1) = span(col, columns, width);
                sample_region(img, x0, x1, y0, y1)
            })
        })
        .collect();

    if cells.is_empty() {
        return Err(Error::ConversionFailed("no glyph cells produced".to_string()));
    }

    Ok(GlyphGrid {
        columns,
        rows,
        cells,
    })
}

/// Pixel range `[start, end)` covered by cell `index` of `count` over `extent`
fn span(index: u32, count: u32, extent: u32) -> (u32, u32) {
    let start = (index as u64 * extent as u64 / count as u64) as u32;
    let end = ((index as u64 + 1) * extent as u64 / count as u64) as u32;
    let start = start.min(extent - 1);
    (start, end.clamp(start + 1, extent))
}

fn sample_region(img: &RgbaImage, x0: u32, x1: u32, y0: u32, y1: u32) -> GlyphCell {
    let mut sum = [0u64; 3];
    for y in y0..y1 {
        for x in x0..x1 {
            let px = img.get_pixel(x, y);
            sum[0] += px[0] as u64;
            sum[1] += px[1] as u64;
            sum[2] += px[2] as u64;
        }
    }

    let count = ((x1 - x0) as u64 * (y1 - y0) as u64).max(1);
    let avg = Rgb([
        (sum[0] / count) as u8,
        (sum[1] / count) as u8,
        (sum[2] / count) as u8,
    ]);

    let glyph = glyph_for_luminance(luminance(
        avg.r() as f32 / 255.0,
        avg.g() as f32 / 255.0,
        avg.b() as f32 / 255.0,
    ));
    let foreground = if glyph == BLANK { None } else { Some(avg) };

    GlyphCell { glyph, foreground }
}

/// Convert a transformed image into the color-coded cell stream
///
/// Fails when the stream would exceed the character ceiling; crossing the
/// informational thresholds only logs.
pub fn convert_to_ascii(img: &RgbaImage, target_width: u32) -> Result<String> {
    let (width, height) = img.dimensions();
    let (columns, rows) = grid_dimensions(width, height, target_width);
    debug!(
        "Original: {}x{}, ASCII: {}x{}, Ratio: {:.2}",
        width,
        height,
        columns,
        rows,
        height as f64 / width.max(1) as f64
    );

    let stream = sample_cells(img, columns, rows)?.encode()?;
    let len = stream.len();

    if len > MAX_ASCII_CHARS {
        return Err(Error::OutputTooLarge {
            what: "ASCII output",
            size: len,
            limit: MAX_ASCII_CHARS,
        });
    }
    if len > VERY_LARGE_STREAM_CHARS {
        warn!(
            "Very large ASCII output: {} characters. Processing may take time.",
            group_digits(&len)
        );
    } else if len > LARGE_STREAM_CHARS {
        info!("Large ASCII output: {} characters.", group_digits(&len));
    }

    Ok(stream)
}
