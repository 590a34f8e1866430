//! Grid validation utilities.

use std::fmt;
use std::path::{Path, PathBuf};

use nav_core::cache::GRID_EXTENSION;
use nav_core::grid::{CellType, Connectivity, GridCell, NavGrid};
use nav_core::math::{Fixed, Vec2Fixed};

use crate::{read_file, Result, ToolError};

/// Shape and terrain counts of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSummary {
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
    /// World units per cell.
    pub cell_size: Fixed,
    /// World position of cell (0, 0).
    pub origin: Vec2Fixed,
    /// Adjacency rule.
    pub connectivity: Connectivity,
    /// Cells an agent may enter, slow terrain included.
    pub walkable: usize,
    /// Slow terrain cells.
    pub slow: usize,
    /// Blocked cells.
    pub blocked: usize,
}

impl GridSummary {
    /// Summarize `grid`.
    #[must_use]
    pub fn of(grid: &NavGrid) -> Self {
        let slow = (0..grid.height())
            .flat_map(|y| (0..grid.width()).map(move |x| GridCell::new(x, y)))
            .filter(|&cell| grid.cell_type(cell) == Some(CellType::SlowTerrain))
            .count();
        let walkable = grid.walkable_count();
        Self {
            width: grid.width(),
            height: grid.height(),
            cell_size: grid.cell_size(),
            origin: grid.origin(),
            connectivity: grid.connectivity(),
            walkable,
            slow,
            blocked: grid.cell_count() - walkable,
        }
    }

    /// True if no agent could stand anywhere on the grid.
    #[must_use]
    pub fn is_unusable(&self) -> bool {
        self.walkable == 0
    }
}

impl fmt::Display for GridSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} cells of {} at {}, {:?}-connected: {} walkable ({} slow), {} blocked",
            self.width,
            self.height,
            self.cell_size,
            self.origin,
            self.connectivity,
            self.walkable,
            self.slow,
            self.blocked
        )
    }
}

/// Decode a baked grid payload.
///
/// # Errors
///
/// Returns an error if the payload is malformed.
pub fn validate_bytes(bytes: &[u8]) -> Result<GridSummary> {
    Ok(GridSummary::of(&NavGrid::load(bytes)?))
}

/// Validate one `.nav` file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is malformed.
pub fn validate_file(path: &Path) -> Result<GridSummary> {
    validate_bytes(&read_file(path)?)
}

/// Validate every `.nav` file in `dir`, sorted by file name.
///
/// Each file gets its own result so one bad grid does not hide the others.
///
/// # Errors
///
/// Returns an error only if the directory itself cannot be listed.
pub fn validate_directory(dir: &Path) -> Result<Vec<(PathBuf, Result<GridSummary>)>> {
    let io_error = |source| ToolError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.extension().is_some_and(|ext| ext == GRID_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files
        .into_iter()
        .map(|path| {
            let result = validate_file(&path);
            (path, result)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nav_core::error::NavError;
    use nav_test_utils::fixtures::walled_grid;

    #[test]
    fn test_summary_counts() {
        let summary = GridSummary::of(&walled_grid());
        assert_eq!((summary.width, summary.height), (5, 5));
        assert_eq!(summary.blocked, 4);
        assert_eq!(summary.walkable, 21);
        assert!(!summary.is_unusable());
        assert!(summary.to_string().starts_with("5x5 cells"));
    }

    #[test]
    fn test_truncated_payload_rejected() {
        let bytes = walled_grid().encode();
        assert!(matches!(
            validate_bytes(&bytes[..bytes.len() - 1]),
            Err(ToolError::Nav(NavError::MalformedGridData(_)))
        ));
    }

    #[test]
    fn test_directory_reports_each_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.nav"), walled_grid().encode()).unwrap();
        std::fs::write(dir.path().join("b.nav"), b"NAVG").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let results = validate_directory(dir.path()).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].0.ends_with("a.nav"));
        assert!(results[0].1.is_ok());
        assert!(results[1].1.is_err());
    }
}
