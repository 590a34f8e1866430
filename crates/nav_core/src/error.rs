//! Error types for the navigation core.

use std::path::PathBuf;

use thiserror::Error;

use crate::cache::MapId;

/// Result type alias using [`NavError`].
pub type Result<T> = std::result::Result<T, NavError>;

/// Top-level error type for all navigation errors.
#[derive(Debug, Error)]
pub enum NavError {
    /// Serialized grid bytes do not match the declared layout.
    #[error("Malformed grid data: {0}")]
    MalformedGridData(String),

    /// No grid resource exists for the map identifier.
    #[error("No navigation grid for map '{0}'")]
    GridNotFound(MapId),

    /// Filesystem access failed.
    #[error("Failed to access '{path}': {source}")]
    Io {
        /// Path that could not be read or written.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    /// Configuration values are out of range.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Controller snapshot encoding or decoding failed.
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// ASCII map contains a character with no cell meaning.
    #[error("Invalid map character '{ch}' at line {line}, column {column}")]
    InvalidAscii {
        /// 1-based line number.
        line: usize,
        /// 1-based column number.
        column: usize,
        /// Offending character.
        ch: char,
    },
}
