//! Error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A specialized `Result` type for crate operations that can fail.
pub type Result<T> = std::result::Result<T, Error>;

/// Invalid reflow configuration. Raised before any text is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("indent width {0} is out of range, expecting 1 to 16")]
    IndentOutOfRange(i64),

    #[error("{field} must not be negative, got {value}")]
    NegativeWidth { field: &'static str, value: i64 },

    #[error("{field} entry {name:?} is not a valid tag name")]
    InvalidTagName { field: &'static str, name: String },

    #[error("ignore_with must be a non-empty string without whitespace")]
    InvalidIgnoreToken,

    #[error("malformed configuration: {0}")]
    Malformed(String),
}

/// Crate-level error.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to parse configuration file '{}': {message}", path.display())]
    ConfigParse { path: PathBuf, message: String },

    #[error("offset {offset} is past the end of a {len}-byte document")]
    InvalidOffset { offset: usize, len: usize },
}
