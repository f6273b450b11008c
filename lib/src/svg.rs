//! SVG synthesis from styled lines
//!
//! Every line is laid out on a fixed monospace grid: one `char_width` step per
//! character and one `line_height` step per line. Each drawable run becomes a
//! single `<text>` element at its cursor position, so the document grows with
//! the run count rather than the character count.

use crate::ansi::Line;
use crate::color::{Rgb, resolve_color};
use crate::config::MAX_OUTPUT_SIZE;
use crate::error::{Error, Result};
use crate::pool::BufferPool;
use log::{debug, warn};
use std::fmt::{self, Write as _};

/// Glyph grid geometry and font settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub line_height: i32,
    pub char_width: i32,
    pub font_size: u32,
    pub font_family: &'static str,
    pub padding_top: i32,
    pub padding_bottom: i32,
    pub padding_left: i32,
    pub padding_right: i32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            line_height: 16,
            char_width: 16,
            font_size: 16,
            font_family: "monospace",

            // Tuned so glyph boxes sit flush with the canvas edges
            padding_top: -2,
            padding_bottom: 2,
            padding_left: 1,
            padding_right: -6,
        }
    }
}

/// Canvas-filling background rectangle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rect {
    pub width: u32,
    pub height: u32,
    pub fill: Rgb,
}

/// One positioned run of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPrimitive {
    pub x: i64,
    pub y: i64,
    pub content: String,
    pub fill: Rgb,
    pub font_family: &'static str,
    pub font_size: u32,
    pub bold: bool,
}

/// Renderer output: canvas, background and text in paint order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorDocument {
    pub width: u32,
    pub height: u32,
    pub background: Rect,
    pub texts: Vec<TextPrimitive>,
}

impl VectorDocument {
    /// Serialize as a standalone SVG document
    pub fn write_svg(&self, out: &mut String) -> fmt::Result {
        writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" xml:space="preserve">"#,
            w = self.width,
            h = self.height
        )?;
        writeln!(
            out,
            r#"<rect x="0" y="0" width="{}" height="{}" style="fill:{}"/>"#,
            self.background.width, self.background.height, self.background.fill
        )?;

        for text in &self.texts {
            write!(
                out,
                r#"<text x="{}" y="{}" style="fill:{}; font-family:{}; font-size:{}px; dominant-baseline:text-before-edge"#,
                text.x, text.y, text.fill, text.font_family, text.font_size
            )?;
            if text.bold {
                out.push_str("; font-weight:bold");
            }
            out.push_str("\">");
            escape_xml_into(&text.content, out);
            out.push_str("</text>\n");
        }

        out.push_str("</svg>\n");
        Ok(())
    }
}

fn escape_xml_into(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

/// Lays out styled lines and produces SVG documents
#[derive(Debug, Clone, Default)]
pub struct SvgRenderer {
    layout: Layout,
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(layout: Layout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Canvas size for a set of lines
    ///
    /// Width follows the longest line in characters, height the line count.
    /// A non-positive result falls back to a single glyph cell plus padding.
    pub fn canvas_size(&self, lines: &[Line]) -> (u32, u32) {
        let l = &self.layout;
        let max_len = lines.iter().map(Line::char_len).max().unwrap_or(0) as i64;
        let horizontal_padding = l.padding_left as i64 + l.padding_right as i64;
        let vertical_padding = l.padding_top as i64 + l.padding_bottom as i64;

        let mut width = max_len * l.char_width as i64 + horizontal_padding;
        if width <= 0 {
            width = l.char_width as i64 + horizontal_padding;
        }
        let mut height = lines.len() as i64 * l.line_height as i64 + vertical_padding;
        if height <= 0 {
            height = l.line_height as i64 + vertical_padding;
        }

        (to_extent(width), to_extent(height))
    }

    /// Lay out `lines` over a background
    ///
    /// `None` means the caller never produced lines and is an error; an empty
    /// slice is valid and yields the minimal canvas.
    pub fn render(&self, lines: Option<&[Line]>, background: &str) -> Result<VectorDocument> {
        let lines = lines.ok_or(Error::NilInput("styled lines"))?;
        let l = &self.layout;

        let (width, height) = self.canvas_size(lines);
        debug!(
            "SVG dimensions: {}x{} (based on {} lines)",
            width,
            height,
            lines.len()
        );

        let fill = resolve_color(background).unwrap_or_else(|| {
            warn!("Unparseable background color {:?}, using black", background);
            Rgb::BLACK
        });

        let mut texts = Vec::new();
        let mut y = l.padding_top as i64;
        for line in lines {
            let mut x = l.padding_left as i64;
            for run in line.runs() {
                if run.text.is_empty() {
                    continue;
                }
                let advance = run.char_len() as i64 * l.char_width as i64;
                if run.text.chars().all(|c| c == ' ') {
                    x += advance;
                    continue;
                }

                texts.push(TextPrimitive {
                    x,
                    y,
                    content: run.text.clone(),
                    fill: run.attributes.foreground.unwrap_or(Rgb::WHITE),
                    font_family: l.font_family,
                    font_size: l.font_size,
                    bold: run.attributes.bold,
                });
                x += advance;
            }
            y += l.line_height as i64;
        }

        Ok(VectorDocument {
            width,
            height,
            background: Rect {
                width,
                height,
                fill,
            },
            texts,
        })
    }

    /// Render and serialize, enforcing the output size ceiling
    pub fn render_to_svg(&self, lines: Option<&[Line]>, background: &str) -> Result<String> {
        let document = self.render(lines, background)?;

        let mut buffer = BufferPool::global().acquire();
        document
            .write_svg(&mut buffer)
            .map_err(|_| Error::ConversionFailed("failed to serialize SVG".to_string()))?;

        if buffer.len() > MAX_OUTPUT_SIZE {
            return Err(Error::OutputTooLarge {
                what: "output SVG",
                size: buffer.len(),
                limit: MAX_OUTPUT_SIZE,
            });
        }

        Ok(buffer.as_str().to_owned())
    }
}

fn to_extent(value: i64) -> u32 {
    value.clamp(1, u32::MAX as i64) as u32
}
