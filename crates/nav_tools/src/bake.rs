//! Grid baking: ASCII art to the binary `.nav` format.

use std::path::Path;

use nav_core::ascii::parse_ascii_grid;
use nav_core::grid::{Connectivity, NavGrid};
use nav_core::math::{Fixed, Vec2Fixed};

use crate::validate::GridSummary;
use crate::{Result, ToolError};

/// Options applied to a baked grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BakeOptions {
    /// World units per cell. Must be positive.
    pub cell_size: Fixed,
    /// World position of cell (0, 0).
    pub origin: Vec2Fixed,
    /// Adjacency rule stored in the header.
    pub connectivity: Connectivity,
}

impl Default for BakeOptions {
    fn default() -> Self {
        Self {
            cell_size: Fixed::ONE,
            origin: Vec2Fixed::ZERO,
            connectivity: Connectivity::Four,
        }
    }
}

/// Build a grid from ASCII art.
///
/// # Errors
///
/// Returns an error if the cell size is not positive or the art is invalid.
pub fn bake_ascii(text: &str, options: &BakeOptions) -> Result<NavGrid> {
    if options.cell_size <= Fixed::ZERO {
        return Err(ToolError::InvalidArgument(format!(
            "cell size must be positive, got {}",
            options.cell_size
        )));
    }
    Ok(parse_ascii_grid(text, options.cell_size)?
        .with_origin(options.origin)
        .with_connectivity(options.connectivity))
}

/// Bake the ASCII map at `input` into a `.nav` file at `output`.
///
/// # Errors
///
/// Returns an error if either file cannot be accessed or the map is invalid.
pub fn bake_file(input: &Path, output: &Path, options: &BakeOptions) -> Result<GridSummary> {
    let text = std::fs::read_to_string(input).map_err(|source| ToolError::Io {
        path: input.to_path_buf(),
        source,
    })?;
    let grid = bake_ascii(&text, options)?;
    std::fs::write(output, grid.encode()).map_err(|source| ToolError::Io {
        path: output.to_path_buf(),
        source,
    })?;
    tracing::debug!(input = %input.display(), output = %output.display(), "baked grid");
    Ok(GridSummary::of(&grid))
}
