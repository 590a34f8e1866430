//! Path preview for grids on disk.

use std::path::Path;

use nav_core::ascii::{parse_ascii_grid, render_ascii};
use nav_core::cache::GRID_EXTENSION;
use nav_core::grid::{GridCell, NavGrid};
use nav_core::math::Fixed;
use nav_core::pathfinding::{find_path, Path as NavPath};

use crate::{read_file, Result, ToolError};

/// Outcome of a path search, ready for printing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePreview {
    /// Found path, if the goal is reachable.
    pub path: Option<NavPath>,
    /// Cost of walking the path.
    pub cost: Option<Fixed>,
    /// The grid with the path drawn on it.
    pub picture: String,
}

/// Load a grid for previewing.
///
/// `.nav` files are decoded; anything else is read as ASCII art with unit
/// cells.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_grid(path: &Path) -> Result<NavGrid> {
    let bytes = read_file(path)?;
    if path.extension().is_some_and(|ext| ext == GRID_EXTENSION) {
        return Ok(NavGrid::load(&bytes)?);
    }
    let text = String::from_utf8(bytes).map_err(|e| {
        ToolError::InvalidArgument(format!("{} is not UTF-8: {e}", path.display()))
    })?;
    Ok(parse_ascii_grid(&text, Fixed::ONE)?)
}

/// Search from `start` to `goal` and draw the result.
///
/// # Errors
///
/// Returns [`ToolError::InvalidArgument`] if either cell is off the grid.
pub fn preview(grid: &mut NavGrid, start: GridCell, goal: GridCell) -> Result<RoutePreview> {
    for (name, cell) in [("start", start), ("goal", goal)] {
        if !grid.in_bounds(cell) {
            return Err(ToolError::InvalidArgument(format!(
                "{name} {cell} is outside the {}x{} grid",
                grid.width(),
                grid.height()
            )));
        }
    }

    let path = find_path(grid, start, goal);
    let cost = path.as_ref().and_then(|p| p.cost_from(grid, start));
    let picture = render_ascii(grid, Some(start), path.as_ref());
    Ok(RoutePreview {
        path,
        cost,
        picture,
    })
}
