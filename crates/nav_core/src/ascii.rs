//! Plain-text grid maps.
//!
//! | Char | Cell                          |
//! |------|-------------------------------|
//! | `.`  | [`CellType::Walkable`]        |
//! | `~`  | [`CellType::SlowTerrain`]     |
//! | `#`  | [`CellType::Blocked`]         |
//!
//! Rows are read top to bottom as `y = 0, 1, ...`. Blank lines are skipped
//! and whitespace around each row is ignored, so maps can be indented.

use crate::error::{NavError, Result};
use crate::grid::{CellType, GridCell, NavGrid};
use crate::math::Fixed;
use crate::pathfinding::Path;

/// Map character of a cell type.
#[must_use]
pub const fn cell_char(cell_type: CellType) -> char {
    match cell_type {
        CellType::Walkable => '.',
        CellType::SlowTerrain => '~',
        CellType::Blocked => '#',
    }
}

/// Cell type of a map character.
#[must_use]
pub const fn cell_from_char(ch: char) -> Option<CellType> {
    match ch {
        '.' => Some(CellType::Walkable),
        '~' => Some(CellType::SlowTerrain),
        '#' => Some(CellType::Blocked),
        _ => None,
    }
}

/// Parse an ASCII map into a grid with its origin at zero.
///
/// # Errors
///
/// Returns [`NavError::InvalidAscii`] for unknown characters and
/// [`NavError::MalformedGridData`] when rows differ in length.
///
/// # Example
///
/// ```
/// use nav_core::ascii::parse_ascii_grid;
/// use nav_core::math::Fixed;
///
/// let grid = parse_ascii_grid("..#\n~..", Fixed::ONE).unwrap();
/// assert_eq!((grid.width(), grid.height()), (3, 2));
/// ```
pub fn parse_ascii_grid(text: &str, cell_size: Fixed) -> Result<NavGrid> {
    let rows: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .collect();

    let width = rows.first().map_or(0, |(_, row)| row.chars().count());
    let mut cells = Vec::with_capacity(width * rows.len());
    for &(line, row) in &rows {
        let len = row.chars().count();
        if len != width {
            return Err(NavError::MalformedGridData(format!(
                "line {line} has {len} cells, expected {width}"
            )));
        }
        for (i, ch) in row.chars().enumerate() {
            let cell_type = cell_from_char(ch).ok_or(NavError::InvalidAscii {
                line,
                column: i + 1,
                ch,
            })?;
            cells.push(cell_type);
        }
    }

    let width = u32::try_from(width)
        .map_err(|_| NavError::MalformedGridData("map too wide".into()))?;
    let height = u32::try_from(rows.len())
        .map_err(|_| NavError::MalformedGridData("map too tall".into()))?;

    let mut grid = NavGrid::new(width, height, cell_size);
    for (y, row) in (0..).zip(cells.chunks(width.max(1) as usize)) {
        for (x, &cell_type) in (0..).zip(row) {
            grid.set_cell(GridCell::new(x, y), cell_type);
        }
    }
    Ok(grid)
}

/// Render a grid, overlaying a path.
///
/// Path cells are drawn as `*`, the goal as `G` and `start` as `S`.
#[must_use]
pub fn render_ascii(grid: &NavGrid, start: Option<GridCell>, path: Option<&Path>) -> String {
    let width = grid.width() as usize;
    let mut canvas: Vec<char> = (0..grid.cell_count())
        .map(|index| {
            let cell = grid.cell_at(index);
            grid.cell_type(cell).map_or('?', cell_char)
        })
        .collect();

    let mut mark = |cell: GridCell, ch: char| {
        if let Some(slot) = grid.index_of(cell).and_then(|i| canvas.get_mut(i)) {
            *slot = ch;
        }
    };
    if let Some(path) = path {
        for &cell in path {
            mark(cell, '*');
        }
        if let Some(goal) = path.goal() {
            mark(goal, 'G');
        }
    }
    if let Some(start) = start {
        mark(start, 'S');
    }

    let mut out = String::with_capacity(canvas.len() + grid.height() as usize);
    for row in canvas.chunks(width.max(1)) {
        out.extend(row);
        out.push('\n');
    }
    out
}
