//! Grid-based pathfinding using A* algorithm.
//!
//! The search writes its bookkeeping into the grid itself (see
//! [`NavGrid::reset`]), so repeated searches over one grid reuse the same
//! buffers instead of allocating hash maps per call.
//!
//! All costs use fixed-point math, and frontier ties are broken by
//! discovery order, so a given grid and start/goal pair always yields the
//! same path.

use std::cmp::Ordering;
use std::collections::{vec_deque, BinaryHeap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::grid::{Connectivity, GridCell, NavGrid};
use crate::math::{Fixed, Vec2Fixed, SQRT_2};

/// Ordered cells from (excluding) the start to (including) the goal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    cells: VecDeque<GridCell>,
}

impl Path {
    /// Build a path from cells in travel order.
    #[must_use]
    pub fn new(cells: impl IntoIterator<Item = GridCell>) -> Self {
        Self {
            cells: cells.into_iter().collect(),
        }
    }

    /// Number of remaining cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True once every cell has been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Next cell to visit.
    #[must_use]
    pub fn front(&self) -> Option<GridCell> {
        self.cells.front().copied()
    }

    /// Final cell of the path.
    #[must_use]
    pub fn goal(&self) -> Option<GridCell> {
        self.cells.back().copied()
    }

    /// Remove and return the next cell to visit.
    pub fn pop_front(&mut self) -> Option<GridCell> {
        self.cells.pop_front()
    }

    /// Iterate remaining cells in travel order.
    pub fn iter(&self) -> vec_deque::Iter<'_, GridCell> {
        self.cells.iter()
    }

    /// Remaining cells as a vector.
    #[must_use]
    pub fn cells(&self) -> Vec<GridCell> {
        self.cells.iter().copied().collect()
    }

    /// Remaining cells converted to world positions.
    #[must_use]
    pub fn to_world(&self, grid: &NavGrid) -> Vec<Vec2Fixed> {
        self.cells.iter().map(|&c| grid.world_position(c)).collect()
    }

    /// Total traversal cost when walked from `start`.
    ///
    /// Returns `None` if any step is not a legal move on `grid`.
    #[must_use]
    pub fn cost_from(&self, grid: &NavGrid, start: GridCell) -> Option<Fixed> {
        let mut total = Fixed::ZERO;
        let mut previous = start;
        for &cell in &self.cells {
            let step = grid.steps(previous).find(|s| s.cell == cell)?;
            total = total.saturating_add(step.cost);
            previous = cell;
        }
        Some(total)
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a GridCell;
    type IntoIter = vec_deque::Iter<'a, GridCell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

/// A node in the A* open set priority queue.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct AStarNode {
    /// Row-major cell index.
    index: usize,
    /// f_score = g_score + heuristic.
    f_score: Fixed,
    /// Discovery order; later discoveries win ties.
    sequence: u64,
}

impl Ord for AStarNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: lower f_score must compare greater.
        match other.f_score.cmp(&self.f_score) {
            Ordering::Equal => self.sequence.cmp(&other.sequence),
            ord => ord,
        }
    }
}

impl PartialOrd for AStarNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Admissible distance estimate for the grid's connectivity.
///
/// Manhattan for 4-connected grids, octile for 8-connected grids.
#[inline]
#[must_use]
pub fn heuristic(connectivity: Connectivity, from: GridCell, to: GridCell) -> Fixed {
    let dx = from.x.abs_diff(to.x);
    let dy = from.y.abs_diff(to.y);
    match connectivity {
        Connectivity::Four => Fixed::saturating_from_num(dx).saturating_add(Fixed::saturating_from_num(dy)),
        Connectivity::Eight => {
            let diagonal = Fixed::saturating_from_num(dx.min(dy));
            let straight = Fixed::saturating_from_num(dx.max(dy) - dx.min(dy));
            straight.saturating_add(diagonal.saturating_mul(SQRT_2))
        }
    }
}

/// Find a minimal-cost path from `start` to `goal`.
///
/// Returns `Some` with an empty path when `start == goal`, and `None` when
/// the goal cannot be reached (blocked, out of bounds, or disconnected).
/// The start cell itself may be blocked; the agent is assumed to stand on
/// it already.
///
/// The search leaves bookkeeping in `grid`. Callers normally
/// [`reset`](NavGrid::reset) before searching; a grid that still carries a
/// previous search is reset here.
pub fn find_path(grid: &mut NavGrid, start: GridCell, goal: GridCell) -> Option<Path> {
    let start_index = grid.index_of(start)?;
    let goal_index = grid.index_of(goal)?;

    if start == goal {
        return Some(Path::default());
    }
    if !grid.is_walkable(goal) {
        return None;
    }

    if grid.searched {
        grid.reset();
    }
    grid.searched = true;

    let connectivity = grid.connectivity();
    let mut open_set: BinaryHeap<AStarNode> = BinaryHeap::new();
    let mut sequence: u64 = 0;
    let mut expanded: usize = 0;

    grid.search[start_index].g_score = Fixed::ZERO;
    open_set.push(AStarNode {
        index: start_index,
        f_score: heuristic(connectivity, start, goal),
        sequence,
    });

    while let Some(current) = open_set.pop() {
        if grid.search[current.index].closed {
            // Superseded by a cheaper entry for the same cell.
            continue;
        }

        if current.index == goal_index {
            tracing::trace!(%start, %goal, expanded, "path found");
            return Some(reconstruct_path(grid, start_index, goal_index));
        }

        grid.search[current.index].closed = true;
        expanded += 1;

        let current_g = grid.search[current.index].g_score;
        let cell = grid.cell_at(current.index);

        for step in grid.steps(cell) {
            let Some(next_index) = grid.index_of(step.cell) else {
                continue;
            };

            let node = &mut grid.search[next_index];
            if node.closed {
                continue;
            }

            let tentative_g = current_g.saturating_add(step.cost);
            if tentative_g < node.g_score {
                node.g_score = tentative_g;
                node.came_from = Some(current.index);

                sequence += 1;
                open_set.push(AStarNode {
                    index: next_index,
                    f_score: tentative_g.saturating_add(heuristic(connectivity, step.cell, goal)),
                    sequence,
                });
            }
        }
    }

    tracing::trace!(%start, %goal, expanded, "goal unreachable");
    None
}

/// Walk predecessor links back from the goal, excluding the start.
fn reconstruct_path(grid: &NavGrid, start_index: usize, goal_index: usize) -> Path {
    let mut cells = VecDeque::new();
    let mut current = goal_index;

    while current != start_index {
        cells.push_front(grid.cell_at(current));
        match grid.search[current].came_from {
            Some(previous) => current = previous,
            None => break,
        }
    }

    Path { cells }
}
