//! Property tests for path search.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use nav_core::prelude::*;
use nav_test_utils::determinism::strategies::{arb_position, arb_search};
use nav_test_utils::fixtures::open_grid;
use nav_test_utils::proptest::prelude::*;

/// Cheapest cost from `start` to every cell, by exhaustive Dijkstra.
fn dijkstra_cost(grid: &NavGrid, start: GridCell, goal: GridCell) -> Option<Fixed> {
    let mut best = vec![None::<Fixed>; grid.cell_count()];
    let mut open = BinaryHeap::new();
    best[grid.index_of(start)?] = Some(Fixed::ZERO);
    open.push(Reverse((Fixed::ZERO, start)));

    while let Some(Reverse((cost, cell))) = open.pop() {
        if cell == goal {
            return Some(cost);
        }
        if best[grid.index_of(cell)?].is_some_and(|b| b < cost) {
            continue;
        }
        for step in grid.steps(cell) {
            let next = cost + step.cost;
            let slot = &mut best[grid.index_of(step.cell)?];
            if slot.map_or(true, |b| next < b) {
                *slot = Some(next);
                open.push(Reverse((next, step.cell)));
            }
        }
    }
    None
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn found_paths_are_walkable_chains((mut grid, start, goal) in arb_search(12)) {
        if let Some(path) = find_path(&mut grid, start, goal) {
            if start == goal {
                prop_assert!(path.is_empty());
            } else {
                prop_assert_eq!(path.goal(), Some(goal));
                let mut previous = start;
                for &cell in &path {
                    prop_assert!(grid.is_walkable(cell));
                    prop_assert!(grid.are_adjacent(previous, cell));
                    previous = cell;
                }
            }
        }
    }

    #[test]
    fn search_cost_matches_dijkstra((mut grid, start, goal) in arb_search(10)) {
        let found = find_path(&mut grid, start, goal);
        let expected = if start == goal {
            Some(Fixed::ZERO)
        } else if grid.is_walkable(goal) {
            dijkstra_cost(&grid, start, goal)
        } else {
            None
        };
        prop_assert_eq!(found.and_then(|p| p.cost_from(&grid, start)), expected);
    }

    #[test]
    fn repeated_searches_agree((mut grid, start, goal) in arb_search(12)) {
        let first = find_path(&mut grid, start, goal);
        grid.reset();
        let second = find_path(&mut grid, start, goal);
        // No reset: the search clears stale bookkeeping itself.
        let third = find_path(&mut grid, start, goal);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &third);
    }

    #[test]
    fn nearest_cell_is_always_in_bounds(pos in arb_position(), w in 1u32..16, h in 1u32..16) {
        let grid = open_grid(w, h);
        let cell = grid.nearest_cell(pos);
        prop_assert!(cell.is_some_and(|c| grid.in_bounds(c)));
    }

    #[test]
    fn world_position_inverts(x in 0u32..16, y in 0u32..16, ox in -50i32..50, oy in -50i32..50) {
        let grid = NavGrid::new(16, 16, Fixed::from_num(3))
            .with_origin(Vec2Fixed::from_ints(ox, oy));
        let cell = GridCell::new(x, y);
        prop_assert_eq!(grid.nearest_cell(grid.world_position(cell)), Some(cell));
    }
}
