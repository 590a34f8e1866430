//! Navigation grid: the discretized world searched by [`crate::pathfinding`].
//!
//! A [`NavGrid`] is loaded once per map from a baked binary payload and is
//! immutable afterwards, apart from the per-cell bookkeeping that a search
//! writes into it. That bookkeeping is cleared in bulk by [`NavGrid::reset`].
//!
//! # Binary layout
//!
//! All integers are little-endian. Fixed-point fields store the raw bits of
//! an [`I32F32`](fixed::types::I32F32).
//!
//! ```text
//! 0   magic        b"NAVG"
//! 4   version      u16 (1)
//! 6   connectivity u8  (4 or 8)
//! 7   reserved     u8
//! 8   width        u32
//! 12  height       u32
//! 16  cell_size    i64
//! 24  origin_x     i64
//! 32  origin_y     i64
//! 40  cells        width * height bytes, row-major
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{NavError, Result};
use crate::math::{Fixed, Vec2Fixed, SQRT_2};

/// Magic bytes opening every baked grid.
pub const GRID_MAGIC: [u8; 4] = *b"NAVG";

/// Current grid format version.
pub const GRID_VERSION: u16 = 1;

/// Size of the fixed header preceding the cell payload.
pub const HEADER_LEN: usize = 40;

/// Cell types for navigation grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellType {
    /// Normal walkable terrain (cost: 1).
    #[default]
    Walkable,
    /// Impassable terrain.
    Blocked,
    /// Slow terrain with 2x movement cost.
    SlowTerrain,
}

impl CellType {
    /// Returns the movement cost for this cell type.
    /// Returns `None` for blocked cells.
    #[must_use]
    pub const fn movement_cost(self) -> Option<Fixed> {
        match self {
            Self::Walkable => Some(Fixed::ONE),
            Self::Blocked => None,
            Self::SlowTerrain => Some(Fixed::const_from_int(2)),
        }
    }

    /// Returns true if this cell is walkable.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        !matches!(self, Self::Blocked)
    }

    /// Byte code used in the baked grid payload.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Blocked => 0,
            Self::Walkable => 1,
            Self::SlowTerrain => 2,
        }
    }

    /// Decode a payload byte.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Blocked),
            1 => Some(Self::Walkable),
            2 => Some(Self::SlowTerrain),
            _ => None,
        }
    }
}

/// Adjacency rule of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Connectivity {
    /// Orthogonal neighbors only.
    #[default]
    Four,
    /// Orthogonal and diagonal neighbors, without corner cutting.
    Eight,
}

impl Connectivity {
    /// Byte code used in the baked grid header.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Four => 4,
            Self::Eight => 8,
        }
    }

    /// Decode a header byte.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            4 => Some(Self::Four),
            8 => Some(Self::Eight),
            _ => None,
        }
    }

    fn directions(self) -> &'static [(i32, i32)] {
        match self {
            Self::Four => &DIRECTIONS[..4],
            Self::Eight => &DIRECTIONS,
        }
    }
}

/// Direction offsets, orthogonal first so 4-connectivity is a prefix.
const DIRECTIONS: [(i32, i32); 8] = [
    (1, 0),   // East
    (0, 1),   // South
    (-1, 0),  // West
    (0, -1),  // North
    (1, 1),   // Southeast
    (-1, 1),  // Southwest
    (-1, -1), // Northwest
    (1, -1),  // Northeast
];

/// A node of the grid, addressed by column and row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct GridCell {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl GridCell {
    /// Create a cell reference.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// True if `other` differs by one step on each axis at most.
    #[must_use]
    pub fn touches(self, other: Self) -> bool {
        self != other && self.x.abs_diff(other.x) <= 1 && self.y.abs_diff(other.y) <= 1
    }

    /// True if `other` is an orthogonal neighbor.
    #[must_use]
    pub fn is_orthogonal_to(self, other: Self) -> bool {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) == 1
    }
}

impl std::fmt::Display for GridCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One traversable edge out of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Destination cell.
    pub cell: GridCell,
    /// Cost of entering `cell` from the origin of the step.
    pub cost: Fixed,
}

/// Fixed-capacity list of outgoing steps, in direction order.
#[derive(Debug, Clone)]
pub struct Steps {
    items: [Option<Step>; 8],
    next: usize,
}

impl Iterator for Steps {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        while self.next < self.items.len() {
            let item = self.items[self.next];
            self.next += 1;
            if item.is_some() {
                return item;
            }
        }
        None
    }
}

/// Per-cell search bookkeeping, owned by the grid between resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SearchNode {
    pub(crate) g_score: Fixed,
    pub(crate) came_from: Option<usize>,
    pub(crate) closed: bool,
}

impl Default for SearchNode {
    fn default() -> Self {
        Self {
            g_score: Fixed::MAX,
            came_from: None,
            closed: false,
        }
    }
}

/// Navigation grid for pathfinding.
#[derive(Debug, Clone)]
pub struct NavGrid {
    /// Grid width in cells.
    width: u32,
    /// Grid height in cells.
    height: u32,
    /// Size of each cell in world units.
    cell_size: Fixed,
    /// World position of cell (0, 0).
    origin: Vec2Fixed,
    /// Adjacency rule used by searches.
    connectivity: Connectivity,
    /// Cell data stored in row-major order.
    cells: Vec<CellType>,
    /// Transient search state, one entry per cell.
    pub(crate) search: Vec<SearchNode>,
    /// Set once a search has written into `search`.
    pub(crate) searched: bool,
}

impl NavGrid {
    /// Create a new navigation grid with all cells walkable.
    ///
    /// # Panics
    ///
    /// Panics if `cell_size` is not positive.
    #[must_use]
    pub fn new(width: u32, height: u32, cell_size: Fixed) -> Self {
        assert!(
            cell_size > Fixed::ZERO,
            "NavGrid cell_size must be positive"
        );

        let cell_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            cell_size,
            origin: Vec2Fixed::ZERO,
            connectivity: Connectivity::Four,
            cells: vec![CellType::Walkable; cell_count],
            search: vec![SearchNode::default(); cell_count],
            searched: false,
        }
    }

    /// Set the world position of cell (0, 0).
    #[must_use]
    pub fn with_origin(mut self, origin: Vec2Fixed) -> Self {
        self.origin = origin;
        self
    }

    /// Set the adjacency rule.
    #[must_use]
    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Replace the adjacency rule of a loaded grid.
    pub fn set_connectivity(&mut self, connectivity: Connectivity) {
        self.connectivity = connectivity;
    }

    /// Parse a baked grid payload.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::MalformedGridData`] if the header is invalid or the
    /// payload length does not match the declared dimensions.
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let header = bytes.get(..HEADER_LEN).ok_or_else(|| {
            NavError::MalformedGridData(format!(
                "expected at least {HEADER_LEN} header bytes, got {}",
                bytes.len()
            ))
        })?;

        if header[0..4] != GRID_MAGIC {
            return Err(NavError::MalformedGridData("bad magic".into()));
        }

        let version = u16::from_le_bytes([header[4], header[5]]);
        if version != GRID_VERSION {
            return Err(NavError::MalformedGridData(format!(
                "unsupported version {version}"
            )));
        }

        let connectivity = Connectivity::from_code(header[6]).ok_or_else(|| {
            NavError::MalformedGridData(format!("unknown connectivity {}", header[6]))
        })?;

        let width = read_u32(header, 8);
        let height = read_u32(header, 12);
        let cell_size = Fixed::from_bits(read_i64(header, 16));
        let origin = Vec2Fixed::new(
            Fixed::from_bits(read_i64(header, 24)),
            Fixed::from_bits(read_i64(header, 32)),
        );

        if cell_size <= Fixed::ZERO {
            return Err(NavError::MalformedGridData(format!(
                "cell size must be positive, got {cell_size}"
            )));
        }

        for (axis, origin, len) in [("x", origin.x, width), ("y", origin.y, height)] {
            if far_edge(origin, len, cell_size).is_none() {
                return Err(NavError::MalformedGridData(format!(
                    "{axis} extent of {len} cells of {cell_size} from {origin} overflows"
                )));
            }
        }

        let expected = (width as u64) * (height as u64);
        let payload = &bytes[HEADER_LEN..];
        if payload.len() as u64 != expected {
            return Err(NavError::MalformedGridData(format!(
                "{width}x{height} grid needs {expected} cell bytes, got {}",
                payload.len()
            )));
        }

        let cells = payload
            .iter()
            .enumerate()
            .map(|(i, &code)| {
                CellType::from_code(code).ok_or_else(|| {
                    NavError::MalformedGridData(format!("unknown cell code {code} at index {i}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            width,
            height,
            cell_size,
            origin,
            connectivity,
            search: vec![SearchNode::default(); cells.len()],
            cells,
            searched: false,
        })
    }

    /// Serialize into the baked payload accepted by [`NavGrid::load`].
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.cells.len());
        bytes.extend_from_slice(&GRID_MAGIC);
        bytes.extend_from_slice(&GRID_VERSION.to_le_bytes());
        bytes.push(self.connectivity.code());
        bytes.push(0);
        bytes.extend_from_slice(&self.width.to_le_bytes());
        bytes.extend_from_slice(&self.height.to_le_bytes());
        bytes.extend_from_slice(&self.cell_size.to_bits().to_le_bytes());
        bytes.extend_from_slice(&self.origin.x.to_bits().to_le_bytes());
        bytes.extend_from_slice(&self.origin.y.to_bits().to_le_bytes());
        bytes.extend(self.cells.iter().map(|c| c.code()));
        bytes
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Cell size in world units.
    #[must_use]
    pub const fn cell_size(&self) -> Fixed {
        self.cell_size
    }

    /// World position of cell (0, 0).
    #[must_use]
    pub const fn origin(&self) -> Vec2Fixed {
        self.origin
    }

    /// Adjacency rule used by searches.
    #[must_use]
    pub const fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Total number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// True if the grid has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of walkable cells.
    #[must_use]
    pub fn walkable_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_walkable()).count()
    }

    /// Check if a cell lies within grid bounds.
    #[must_use]
    pub fn in_bounds(&self, cell: GridCell) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    /// Row-major index of an in-bounds cell.
    #[inline]
    #[must_use]
    pub fn index_of(&self, cell: GridCell) -> Option<usize> {
        self.in_bounds(cell)
            .then(|| (cell.y as usize) * (self.width as usize) + (cell.x as usize))
    }

    /// Cell at a row-major index.
    #[inline]
    pub(crate) fn cell_at(&self, index: usize) -> GridCell {
        let width = self.width as usize;
        GridCell::new((index % width) as u32, (index / width) as u32)
    }

    /// Get cell type at coordinates.
    /// Returns `None` if out of bounds.
    #[must_use]
    pub fn cell_type(&self, cell: GridCell) -> Option<CellType> {
        self.index_of(cell).map(|i| self.cells[i])
    }

    /// Set cell type at coordinates.
    /// Returns `false` if out of bounds.
    pub fn set_cell(&mut self, cell: GridCell, cell_type: CellType) -> bool {
        match self.index_of(cell) {
            Some(index) => {
                self.cells[index] = cell_type;
                true
            }
            None => false,
        }
    }

    /// Check if a cell is walkable.
    #[must_use]
    pub fn is_walkable(&self, cell: GridCell) -> bool {
        self.cell_type(cell).is_some_and(CellType::is_walkable)
    }

    /// Get movement cost for a cell.
    /// Returns `None` for blocked or out-of-bounds cells.
    #[must_use]
    pub fn movement_cost(&self, cell: GridCell) -> Option<Fixed> {
        self.cell_type(cell).and_then(CellType::movement_cost)
    }

    /// Map a world position to the nearest in-bounds cell.
    ///
    /// Positions outside the grid clamp to the border. Returns `None` only
    /// for an empty grid.
    #[must_use]
    pub fn nearest_cell(&self, pos: Vec2Fixed) -> Option<GridCell> {
        if self.is_empty() {
            return None;
        }

        let axis = |value: Fixed, origin: Fixed, len: u32| -> u32 {
            let steps = value
                .saturating_sub(origin)
                .saturating_div(self.cell_size)
                .saturating_round()
                .saturating_to_num::<i64>();
            steps.clamp(0, i64::from(len) - 1) as u32
        };

        Some(GridCell::new(
            axis(pos.x, self.origin.x, self.width),
            axis(pos.y, self.origin.y, self.height),
        ))
    }

    /// World position of a cell: `origin + cell * cell_size`.
    ///
    /// Saturates for grids built in memory whose far edge lies beyond the
    /// fixed-point range; [`NavGrid::load`] rejects such grids.
    #[must_use]
    pub fn world_position(&self, cell: GridCell) -> Vec2Fixed {
        let axis = |origin: Fixed, index: u32| {
            origin.saturating_add(Fixed::saturating_from_num(index).saturating_mul(self.cell_size))
        };
        Vec2Fixed::new(axis(self.origin.x, cell.x), axis(self.origin.y, cell.y))
    }

    /// Traversable steps out of `cell` under the grid's connectivity.
    ///
    /// Diagonal steps are skipped when either adjacent orthogonal cell is
    /// blocked, so paths never cut corners.
    #[must_use]
    pub fn steps(&self, cell: GridCell) -> Steps {
        let mut items = [None; 8];

        for (slot, &(dx, dy)) in items.iter_mut().zip(self.connectivity.directions()) {
            let Some(next) = self.offset(cell, dx, dy) else {
                continue;
            };
            let Some(cell_cost) = self.movement_cost(next) else {
                continue;
            };

            let diagonal = dx != 0 && dy != 0;
            if diagonal
                && !(self.is_walkable(GridCell::new(next.x, cell.y))
                    && self.is_walkable(GridCell::new(cell.x, next.y)))
            {
                continue;
            }

            let cost = if diagonal { cell_cost * SQRT_2 } else { cell_cost };
            *slot = Some(Step { cell: next, cost });
        }

        Steps { items, next: 0 }
    }

    /// Walkable neighbors of `cell`, in direction order.
    #[must_use]
    pub fn neighbors(&self, cell: GridCell) -> Vec<GridCell> {
        self.steps(cell).map(|step| step.cell).collect()
    }

    /// True if `b` is reachable from `a` in a single step.
    #[must_use]
    pub fn are_adjacent(&self, a: GridCell, b: GridCell) -> bool {
        match self.connectivity {
            Connectivity::Four => a.is_orthogonal_to(b),
            Connectivity::Eight => a.touches(b),
        }
    }

    fn offset(&self, cell: GridCell, dx: i32, dy: i32) -> Option<GridCell> {
        let x = cell.x.checked_add_signed(dx)?;
        let y = cell.y.checked_add_signed(dy)?;
        let next = GridCell::new(x, y);
        self.in_bounds(next).then_some(next)
    }

    /// Clear per-cell search bookkeeping left by a previous search.
    pub fn reset(&mut self) {
        self.search.clear();
        self.search.resize(self.cells.len(), SearchNode::default());
        self.searched = false;
    }
}

/// World coordinate of the last cell along one axis, if representable.
fn far_edge(origin: Fixed, len: u32, cell_size: Fixed) -> Option<Fixed> {
    let last = len.saturating_sub(1);
    Fixed::checked_from_num(last)?
        .checked_mul(cell_size)?
        .checked_add(origin)
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(buf)
}

fn read_i64(bytes: &[u8], at: usize) -> i64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[at..at + 8]);
    i64::from_le_bytes(buf)
}
