//! # Navigation Development Tools
//!
//! Command-line tools for working with navigation grids:
//! - Grid baker (ASCII art to `.nav`)
//! - Grid validator
//! - Path preview

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

use std::path::PathBuf;

use nav_core::error::NavError;
use thiserror::Error;

pub mod bake;
pub mod route;
pub mod validate;

/// Errors raised by the tools.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Grid parsing or decoding failed.
    #[error(transparent)]
    Nav(#[from] NavError),

    /// A file could not be read or written.
    #[error("Failed to access '{path}': {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A command-line value is out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for tool operations.
pub type Result<T> = std::result::Result<T, ToolError>;

pub(crate) fn read_file(path: &std::path::Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })
}
