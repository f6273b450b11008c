//! Error type shared by every pipeline stage

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Terminal failure of a conversion request.
///
/// Every stage checks its own preconditions and returns the first violation;
/// there is no partial output.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid option `{name}`: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    #[error("{0} is empty")]
    EmptyInput(&'static str),

    #[error(
        "image data is too large: {} bytes (max: {})",
        group_digits(.size),
        group_digits(.limit)
    )]
    InputTooLarge { size: usize, limit: usize },

    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("failed to convert image to ASCII: {0}")]
    ConversionFailed(String),

    #[error("{what} is too large: {} (max: {})", group_digits(.size), group_digits(.limit))]
    OutputTooLarge {
        what: &'static str,
        size: usize,
        limit: usize,
    },

    #[error("malformed cell stream at byte {offset}: {reason}")]
    Parse { offset: usize, reason: &'static str },

    #[error(
        "too many styled text elements: {} (max: {})",
        group_digits(.count),
        group_digits(.limit)
    )]
    TooManyElements { count: usize, limit: usize },

    #[error("{0} is missing")]
    NilInput(&'static str),
}

/// Format a count with thousands separators, e.g. `5000000` -> `5,000,000`.
pub(crate) fn group_digits(n: &usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
