//! Determinism testing utilities.
//!
//! Provides a harness for verifying that searches and controllers produce
//! identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Navigation must be reproducible so that scripted runs, replays and
//! snapshots agree bit for bit. Sources of non-determinism include:
//!
//! - **Floating-point math**: we use fixed-point arithmetic via
//!   [`nav_core::math::Fixed`] for positions, costs and velocities.
//!
//! - **HashMap iteration order**: the search frontier is ordered by score and
//!   discovery sequence only, never by hash order.
//!
//! - **Stale search state**: a grid reused across searches must give the
//!   same answer as a fresh one.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use nav_core::prelude::*;

use crate::fixtures::{Harness, ScriptStep};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic run).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run agreed, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Navigation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a setup multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `ticks` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one tick
/// * `hash` - Function to compute the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Play `script` several times from the same start and compare controller
/// hashes, including the full notification log.
pub fn verify_script_determinism(
    runs: usize,
    grid: &NavGrid,
    config: &NavConfig,
    agent: Vec2Fixed,
    script: &[ScriptStep],
) -> DeterminismResult {
    let ticks = script
        .iter()
        .map(|step| match step {
            ScriptStep::Tick(n) => *n,
            _ => 0,
        })
        .sum();

    let result = verify_determinism(
        runs,
        1,
        || Harness::new(grid, config.clone(), agent),
        |harness| harness.apply_all(script),
        harness_hash,
    );
    DeterminismResult { ticks, ..result }
}

/// Hash of controller state, agent position and notification log.
#[must_use]
pub fn harness_hash(harness: &Harness) -> u64 {
    let mut hasher = DefaultHasher::new();
    harness.controller.state_hash().hash(&mut hasher);
    harness.world.agent.hash(&mut hasher);
    for entry in harness.log().entries() {
        format!("{entry:?}").hash(&mut hasher);
    }
    hasher.finish()
}

/// Compare two harnesses tick by tick, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs agree, `Some(tick)` if they diverge at that tick.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Harness,
{
    let mut a = setup_fn();
    let mut b = setup_fn();

    if harness_hash(&a) != harness_hash(&b) {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        a.tick();
        b.tick();

        if harness_hash(&a) != harness_hash(&b) {
            return Some(tick);
        }
    }

    None
}

/// Verify that a snapshot round trip preserves controller state exactly.
pub fn verify_snapshot_determinism(harness: &Harness) -> bool {
    let hash_before = harness.controller.state_hash();

    let Ok(bytes) = harness.controller.snapshot() else {
        return false;
    };

    let mut restored = crate::fixtures::fixture_controller(
        &NavGrid::new(1, 1, Fixed::ONE),
        harness.controller.config().clone(),
    );
    if restored.restore(&bytes).is_err() {
        return false;
    }

    restored.state_hash() == hash_before
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for grids and search endpoints.
pub mod strategies {
    use nav_core::prelude::*;
    use proptest::prelude::*;

    /// Any cell type, mostly walkable.
    pub fn arb_cell_type() -> impl Strategy<Value = CellType> {
        prop_oneof![
            6 => Just(CellType::Walkable),
            1 => Just(CellType::SlowTerrain),
            3 => Just(CellType::Blocked),
        ]
    }

    /// Either adjacency rule.
    pub fn arb_connectivity() -> impl Strategy<Value = Connectivity> {
        prop_oneof![Just(Connectivity::Four), Just(Connectivity::Eight)]
    }

    /// Grid of up to `max_side` × `max_side` unit cells with random terrain.
    pub fn arb_grid(max_side: u32) -> impl Strategy<Value = NavGrid> {
        (1..=max_side, 1..=max_side, arb_connectivity()).prop_flat_map(
            |(width, height, connectivity)| {
                let count = (width * height) as usize;
                proptest::collection::vec(arb_cell_type(), count).prop_map(move |cells| {
                    let mut grid =
                        NavGrid::new(width, height, Fixed::ONE).with_connectivity(connectivity);
                    for (index, cell_type) in (0u32..).zip(cells) {
                        grid.set_cell(GridCell::new(index % width, index / width), cell_type);
                    }
                    grid
                })
            },
        )
    }

    /// A grid with an in-bounds start and goal.
    pub fn arb_search(max_side: u32) -> impl Strategy<Value = (NavGrid, GridCell, GridCell)> {
        arb_grid(max_side).prop_flat_map(|grid| {
            let (w, h) = (grid.width(), grid.height());
            (Just(grid), 0..w, 0..h, 0..w, 0..h).prop_map(|(grid, sx, sy, gx, gy)| {
                (grid, GridCell::new(sx, sy), GridCell::new(gx, gy))
            })
        })
    }

    /// Generate a fixed-point number in a range around a small map.
    pub fn arb_fixed_position() -> impl Strategy<Value = Fixed> {
        (-64i32..64i32).prop_map(Fixed::from_num)
    }

    /// Generate a world position around a small map.
    pub fn arb_position() -> impl Strategy<Value = Vec2Fixed> {
        (arb_fixed_position(), arb_fixed_position()).prop_map(|(x, y)| Vec2Fixed::new(x, y))
    }
}
