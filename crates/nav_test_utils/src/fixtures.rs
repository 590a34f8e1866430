//! Test fixtures and helpers.
//!
//! Pre-built grids, controllers wired to an in-memory world, and a small
//! scripting format for driving them.

use fixed::types::I32F32;
use nav_core::prelude::*;
use serde::{Deserialize, Serialize};

/// Map identifier every fixture grid is registered under.
pub const FIXTURE_MAP: &str = "fixture";

/// Controller type used by fixtures.
pub type FixtureController = MovementController<MemorySource, EventLog>;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real navigation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a vector from integer components.
#[must_use]
pub fn vec2(x: i32, y: i32) -> Vec2Fixed {
    Vec2Fixed::from_ints(x, y)
}

/// Parse an ASCII map with unit cells.
///
/// # Panics
///
/// Panics if the map is invalid.
#[must_use]
pub fn ascii_grid(map: &str) -> NavGrid {
    parse_ascii_grid(map, Fixed::ONE).expect("fixture map must parse")
}

/// Open grid with unit cells.
#[must_use]
pub fn open_grid(width: u32, height: u32) -> NavGrid {
    NavGrid::new(width, height, Fixed::ONE)
}

/// 5×5 grid with column 2 blocked on rows 0-3.
#[must_use]
pub fn walled_grid() -> NavGrid {
    ascii_grid(
        "..#..
         ..#..
         ..#..
         ..#..
         .....",
    )
}

/// Config acting on every tick with periodic recalculation off.
#[must_use]
pub fn every_tick_config() -> NavConfig {
    NavConfig {
        move_interval: 1,
        recalc_interval: 0,
        ..NavConfig::default()
    }
}

/// Controller whose only grid is `grid` under [`FIXTURE_MAP`].
#[must_use]
pub fn fixture_controller(grid: &NavGrid, config: NavConfig) -> FixtureController {
    MovementController::new(
        config,
        MemorySource::new().with_grid(FIXTURE_MAP, grid),
        EventLog::new(),
    )
}

/// One step of a scripted run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptStep {
    /// Head for a world position.
    Go(i32, i32),
    /// Head for a grid cell.
    GoCell(u32, u32),
    /// Head for an entity.
    GoEntity(EntityId),
    /// Follow an entity.
    Follow(EntityId),
    /// Stop following.
    Unfollow,
    /// Abandon the destination.
    Stop,
    /// Suppress moves.
    Pause,
    /// Resume moves.
    Start,
    /// Force a recalculation.
    Recalculate,
    /// Place or move another entity.
    MoveEntity(EntityId, i32, i32),
    /// Remove another entity.
    Despawn(EntityId),
    /// Advance the clock.
    Tick(u64),
    /// Toggle move rejection.
    RejectMoves(bool),
}

/// Parse a RON list of [`ScriptStep`]s.
///
/// # Errors
///
/// Returns the RON parse error.
pub fn parse_script(
    ron: &str,
) -> std::result::Result<Vec<ScriptStep>, ron::error::SpannedError> {
    ron::from_str(ron)
}

/// A controller plus the world it acts on.
///
/// Accepted move intents teleport the agent onto their target, standing in
/// for a real actuator.
#[derive(Debug)]
pub struct Harness {
    /// The controller under test.
    pub controller: FixtureController,
    /// The world it observes.
    pub world: WorldSnapshot,
    grid: NavGrid,
}

impl Harness {
    /// Agent on `grid` at world position `agent`.
    #[must_use]
    pub fn new(grid: &NavGrid, config: NavConfig, agent: Vec2Fixed) -> Self {
        Self {
            controller: fixture_controller(grid, config),
            world: WorldSnapshot::new(FIXTURE_MAP).with_agent(agent),
            grid: grid.clone(),
        }
    }

    /// Agent standing on `cell`.
    #[must_use]
    pub fn at_cell(grid: &NavGrid, config: NavConfig, cell: GridCell) -> Self {
        Self::new(grid, config, grid.world_position(cell))
    }

    /// Recorded notifications.
    #[must_use]
    pub fn log(&self) -> &EventLog {
        self.controller.listener()
    }

    /// Cell the agent is nearest to.
    #[must_use]
    pub fn agent_cell(&self) -> Option<GridCell> {
        self.world
            .agent
            .and_then(|pos| self.grid.nearest_cell(pos))
    }

    /// Advance one tick and carry out accepted moves.
    pub fn tick(&mut self) {
        let seen = self.log().entries().len();
        self.controller.tick(&self.world);
        let moved_to = self.log().entries()[seen..]
            .iter()
            .filter_map(|entry| match entry {
                LoggedEvent::Move {
                    intent,
                    response: MoveResponse::Accept,
                } => Some(intent.target),
                _ => None,
            })
            .last();
        if let Some(target) = moved_to {
            self.world.agent = Some(target);
        }
    }

    /// Advance `ticks` ticks.
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Tick until the controller is idle. Returns `false` if `limit` ticks
    /// were not enough.
    pub fn run_until_idle(&mut self, limit: u64) -> bool {
        for _ in 0..limit {
            if self.controller.nav_state() == NavState::Idle {
                return true;
            }
            self.tick();
        }
        self.controller.nav_state() == NavState::Idle
    }

    /// Move another entity and notify the controller.
    pub fn move_entity(&mut self, entity: EntityId, position: Vec2Fixed) {
        self.world.entities.insert(entity, position);
        self.controller.on_entity_moved(entity, position);
    }

    /// Remove another entity and notify the controller.
    pub fn despawn(&mut self, entity: EntityId) {
        if self.world.entities.remove(&entity).is_some() {
            self.controller.on_entity_departed(entity);
        }
    }

    /// Apply one scripted step.
    pub fn apply(&mut self, step: &ScriptStep) {
        tracing::trace!(?step, "script step");
        match *step {
            ScriptStep::Go(x, y) => self.controller.go(vec2(x, y)),
            ScriptStep::GoCell(x, y) => self.controller.go(GridCell::new(x, y)),
            ScriptStep::GoEntity(entity) => self.controller.go_entity(entity),
            ScriptStep::Follow(entity) => self.controller.follow(entity),
            ScriptStep::Unfollow => self.controller.unfollow(),
            ScriptStep::Stop => self.controller.stop(),
            ScriptStep::Pause => self.controller.pause(),
            ScriptStep::Start => self.controller.start(),
            ScriptStep::Recalculate => {
                self.controller.recalculate(&self.world);
            }
            ScriptStep::MoveEntity(entity, x, y) => self.move_entity(entity, vec2(x, y)),
            ScriptStep::Despawn(entity) => self.despawn(entity),
            ScriptStep::Tick(n) => self.run(n),
            ScriptStep::RejectMoves(reject) => {
                self.controller.listener_mut().set_reject_moves(reject);
            }
        }
    }

    /// Apply every step of a script.
    pub fn apply_all(&mut self, script: &[ScriptStep]) {
        for step in script {
            self.apply(step);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walled_grid_layout() {
        let grid = walled_grid();
        assert_eq!((grid.width(), grid.height()), (5, 5));
        assert!(!grid.is_walkable(GridCell::new(2, 3)));
        assert!(grid.is_walkable(GridCell::new(2, 4)));
    }

    #[test]
    fn test_harness_walks_to_goal() {
        let mut harness = Harness::at_cell(&open_grid(4, 4), every_tick_config(), GridCell::new(0, 0));
        harness.controller.go(GridCell::new(3, 2));
        assert!(harness.run_until_idle(20));
        assert_eq!(harness.agent_cell(), Some(GridCell::new(3, 2)));
        assert_eq!(harness.log().end_count(), 1);
    }

    #[test]
    fn test_script_parses() {
        let script = parse_script("[GoCell(3, 3), Tick(4), Pause, MoveEntity(2, 1, 1), RejectMoves(true)]")
            .unwrap();
        assert_eq!(script.len(), 5);
        assert_eq!(script[1], ScriptStep::Tick(4));
        assert_eq!(script[3], ScriptStep::MoveEntity(2, 1, 1));
    }
}
