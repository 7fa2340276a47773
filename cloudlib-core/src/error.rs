//! Error types for cloudlib

use thiserror::Error;

/// Main error type for cloudlib operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The operation requires a different cloud layout (e.g. an organized grid)
    #[error("Unsupported layout: {0}")]
    UnsupportedLayout(String),

    #[error("Index {index} out of range for cloud of {len} points")]
    IndexOutOfRange { index: usize, len: usize },

    /// A binary stream ended before the declared content was read
    #[error("Truncated stream: expected {expected} more bytes, found {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("Malformed stream: {0}")]
    Malformed(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type alias for cloudlib operations
pub type Result<T> = std::result::Result<T, Error>;
