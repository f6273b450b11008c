//! Run extraction from the color-coded cell stream
//!
//! The stream is plain text interleaved with SGR escape sequences
//! (`ESC [ params m`). A small two-state machine walks it: while `Scanning`
//! there is no pending text, while `InRun` text accumulates into a fragment.
//! Every escape sequence closes the pending fragment and updates the current
//! attributes, so each attribute change starts a new run. Runs are then split
//! on newlines into lines.

use crate::color::Rgb;
use crate::config::MAX_STYLED_ELEMENTS;
use crate::error::{Error, Result};
use log::warn;

/// Run count above which a warning is logged
const MANY_STYLED_ELEMENTS: usize = 30_000;

const ESC: u8 = 0x1b;

/// Rendering attributes in effect for a run
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    pub foreground: Option<Rgb>,
    pub background: Option<Rgb>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

/// Contiguous text sharing one set of attributes
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyledRun {
    pub text: String,
    pub attributes: Attributes,
}

impl StyledRun {
    pub fn new(text: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            text: text.into(),
            attributes,
        }
    }

    /// Number of characters (not bytes) in the run
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Foreground as `#rrggbb`, if one is set
    pub fn foreground_hex(&self) -> Option<String> {
        self.attributes.foreground.map(|c| c.to_string())
    }
}

/// One row of output, runs in reading order; may be empty
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Line {
    runs: Vec<StyledRun>,
}

impl Line {
    pub fn new(runs: Vec<StyledRun>) -> Self {
        Self { runs }
    }

    pub fn runs(&self) -> &[StyledRun] {
        &self.runs
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Sum of the character counts of every run
    pub fn char_len(&self) -> usize {
        self.runs.iter().map(StyledRun::char_len).sum()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    Scanning,
    InRun { start: usize },
}

/// Parse a cell stream into attribute blocks (which may contain newlines)
pub fn parse(stream: &str) -> Result<Vec<StyledRun>> {
    if stream.is_empty() {
        return Err(Error::EmptyInput("cell stream"));
    }

    let bytes = stream.as_bytes();
    let mut blocks = Vec::new();
    let mut attributes = Attributes::default();
    let mut state = State::Scanning;
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] != ESC {
            if state == State::Scanning {
                state = State::InRun { start: pos };
            }
            pos += 1;
            continue;
        }

        if let State::InRun { start } = state {
            blocks.push(StyledRun::new(&stream[start..pos], attributes));
            if blocks.len() > MAX_STYLED_ELEMENTS {
                return Err(Error::TooManyElements {
                    count: blocks.len(),
                    limit: MAX_STYLED_ELEMENTS,
                });
            }
        }
        state = State::Scanning;

        let (params, next) = read_sgr(bytes, pos)?;
        apply_sgr(&mut attributes, &params, pos)?;
        pos = next;
    }

    if let State::InRun { start } = state {
        blocks.push(StyledRun::new(&stream[start..], attributes));
    }

    Ok(blocks)
}

/// Read the SGR sequence starting at `start` (the ESC byte)
///
/// Returns the numeric parameters and the offset just past the final byte.
fn read_sgr(bytes: &[u8], start: usize) -> Result<(Vec<u16>, usize)> {
    let malformed = |reason| Error::Parse {
        offset: start,
        reason,
    };

    if bytes.get(start + 1) != Some(&b'[') {
        return Err(malformed("escape not followed by `[`"));
    }

    let body_start = start + 2;
    let mut end = body_start;
    loop {
        match bytes.get(end) {
            None => return Err(malformed("unterminated escape sequence")),
            Some(b'0'..=b'9' | b';') => end += 1,
            Some(b'm') => break,
            Some(0x40..=0x7e) => return Err(malformed("unsupported control sequence")),
            Some(_) => return Err(malformed("invalid parameter byte")),
        }
    }

    let body = &bytes[body_start..end];
    let params = if body.is_empty() {
        vec![0]
    } else {
        body.split(|&b| b == b';')
            .map(|param| {
                if param.is_empty() {
                    return Ok(0);
                }
                std::str::from_utf8(param)
                    .ok()
                    .and_then(|s| s.parse::<u16>().ok())
                    .ok_or_else(|| malformed("parameter out of range"))
            })
            .collect::<Result<Vec<_>>>()?
    };

    Ok((params, end + 1))
}

fn apply_sgr(attributes: &mut Attributes, params: &[u16], offset: usize) -> Result<()> {
    let malformed = |reason| Error::Parse { offset, reason };
    let mut iter = params.iter().copied();

    while let Some(code) = iter.next() {
        match code {
            0 => *attributes = Attributes::default(),
            1 => attributes.bold = true,
            3 => attributes.italic = true,
            4 => attributes.underline = true,
            22 => attributes.bold = false,
            23 => attributes.italic = false,
            24 => attributes.underline = false,
            30..=37 => attributes.foreground = Some(palette(code - 30)),
            90..=97 => attributes.foreground = Some(palette(code - 90 + 8)),
            39 => attributes.foreground = None,
            40..=47 => attributes.background = Some(palette(code - 40)),
            100..=107 => attributes.background = Some(palette(code - 100 + 8)),
            49 => attributes.background = None,
            38 | 48 => {
                let color = match iter.next() {
                    Some(5) => {
                        let index = iter
                            .next()
                            .ok_or_else(|| malformed("incomplete extended color"))?;
                        let index =
                            channel(index).ok_or_else(|| malformed("color index out of range"))?;
                        palette(index as u16)
                    }
                    Some(2) => {
                        let mut rgb = [0u8; 3];
                        for slot in &mut rgb {
                            let value = iter
                                .next()
                                .ok_or_else(|| malformed("incomplete extended color"))?;
                            *slot = channel(value)
                                .ok_or_else(|| malformed("color component out of range"))?;
                        }
                        Rgb(rgb)
                    }
                    Some(_) => return Err(malformed("unknown extended color mode")),
                    None => return Err(malformed("incomplete extended color")),
                };
                if code == 38 {
                    attributes.foreground = Some(color);
                } else {
                    attributes.background = Some(color);
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn channel(value: u16) -> Option<u8> {
    u8::try_from(value).ok()
}

/// xterm 256-color palette entry
fn palette(index: u16) -> Rgb {
    const BASE: [[u8; 3]; 16] = [
        [0x00, 0x00, 0x00],
        [0xcd, 0x00, 0x00],
        [0x00, 0xcd, 0x00],
        [0xcd, 0xcd, 0x00],
        [0x00, 0x00, 0xee],
        [0xcd, 0x00, 0xcd],
        [0x00, 0xcd, 0xcd],
        [0xe5, 0xe5, 0xe5],
        [0x7f, 0x7f, 0x7f],
        [0xff, 0x00, 0x00],
        [0x00, 0xff, 0x00],
        [0xff, 0xff, 0x00],
        [0x5c, 0x5c, 0xff],
        [0xff, 0x00, 0xff],
        [0x00, 0xff, 0xff],
        [0xff, 0xff, 0xff],
    ];
    const CUBE: [u8; 6] = [0, 95, 135, 175, 215, 255];

    match index {
        0..=15 => Rgb(BASE[index as usize]),
        16..=231 => {
            let i = index - 16;
            Rgb([
                CUBE[(i / 36) as usize],
                CUBE[(i / 6 % 6) as usize],
                CUBE[(i % 6) as usize],
            ])
        }
        _ => {
            let level = (8 + 10 * (index.min(255) - 232)) as u8;
            Rgb([level, level, level])
        }
    }
}

/// Split attribute blocks into lines at embedded newlines
///
/// Zero-length pieces are dropped; consecutive newlines yield empty lines,
/// which are kept as blank rows. A trailing line without a newline is kept
/// when non-empty.
pub fn split_lines(blocks: Vec<StyledRun>) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current = Vec::new();

    for block in blocks {
        let mut parts = block.text.split('\n').peekable();
        while let Some(part) = parts.next() {
            if !part.is_empty() {
                current.push(StyledRun::new(part, block.attributes));
            }
            if parts.peek().is_some() {
                lines.push(Line::new(std::mem::take(&mut current)));
            }
        }
    }
    if !current.is_empty() {
        lines.push(Line::new(current));
    }

    lines
}

/// Parse a cell stream and group it into lines of styled runs
pub fn extract_lines(stream: &str) -> Result<Vec<Line>> {
    let lines = split_lines(parse(stream)?);

    let count: usize = lines.iter().map(|line| line.runs().len()).sum();
    if count > MAX_STYLED_ELEMENTS {
        return Err(Error::TooManyElements {
            count,
            limit: MAX_STYLED_ELEMENTS,
        });
    }
    if count > MANY_STYLED_ELEMENTS {
        warn!(
            "Large number of styled text elements: {}. Processing may be slower.",
            count
        );
    }

    Ok(lines)
}
