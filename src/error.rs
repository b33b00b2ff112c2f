use thiserror::Error;

/// Errors raised by the editor core.
///
/// Probing pixels outside the tile set is not an error: those accessors
/// return `None`/`false` instead.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("{operation}: no {missing} configured")]
    MissingCollaborator {
        operation: &'static str,
        missing: &'static str,
    },

    #[error("{what} index {index} out of range (length {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("{what} must be between {min} and {max}, got {value}")]
    OutOfRange {
        what: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("colour index must be between 0 and 15, got {0}")]
    InvalidColourIndex(i64),

    #[error("system must be either \"ms\" or \"gg\", got \"{0}\"")]
    InvalidSystem(String),

    #[error("invalid hex colour \"{0}\"")]
    InvalidHex(String),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("PNG encoding error: {0}")]
    PngEncode(#[from] png::EncodingError),

    #[error("PNG decoding error: {0}")]
    PngDecode(#[from] png::DecodingError),

    #[error("unsupported image: {0}")]
    UnsupportedImage(&'static str),
}

pub type Result<T> = std::result::Result<T, EditorError>;

pub(crate) fn check_colour_index(value: u8) -> Result<u8> {
    if value > 15 {
        return Err(EditorError::InvalidColourIndex(value as i64));
    }
    Ok(value)
}
