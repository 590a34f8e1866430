//! The tick-driven movement controller.
//!
//! A [`MovementController`] owns the destination, the active path and the
//! pause/follow flags of one agent. The embedding client calls
//! [`MovementController::tick`] once per simulation tick; every
//! `move_interval`-th tick is an *acting* tick on which the controller may
//! search for a new path and offers the next step to its listener as a
//! [`MoveIntent`].
//!
//! All transitions happen synchronously inside the call that caused them,
//! and all notifications reach the listener before that call returns.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::cache::{GridCache, GridSource};
use crate::config::NavConfig;
use crate::error::{NavError, Result};
use crate::events::{Destination, EntityId, MoveIntent, NavEvent, NavigationListener};
use crate::grid::{GridCell, NavGrid};
use crate::math::Vec2Fixed;
use crate::pathfinding::{find_path, Path};
use crate::world::WorldView;

/// Coarse controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavState {
    /// No destination.
    Idle,
    /// Heading to a destination.
    Seeking,
    /// Destination held, move intents suppressed.
    Paused,
}

/// Everything the controller remembers between ticks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NavigationState {
    /// Ticks seen so far.
    pub tick: u64,
    /// Current destination.
    pub destination: Option<Destination>,
    /// Remaining cells, front first. An empty path means the last search
    /// found the goal unreachable.
    pub path: Option<Path>,
    /// Entity whose movement overwrites the destination.
    pub followed: Option<EntityId>,
    /// Move intents are suppressed while set.
    pub paused: bool,
    /// The next acting tick must recalculate.
    pub moved: bool,
}

impl NavigationState {
    /// Coarse state derived from the flags.
    #[must_use]
    pub fn nav_state(&self) -> NavState {
        match (self.destination.is_some(), self.paused) {
            (false, _) => NavState::Idle,
            (true, false) => NavState::Seeking,
            (true, true) => NavState::Paused,
        }
    }
}

/// Drives one agent along grid paths in lock-step with a simulation clock.
#[derive(Debug)]
pub struct MovementController<S, L> {
    config: NavConfig,
    grids: GridCache<S>,
    listener: L,
    state: NavigationState,
}

impl<S: GridSource, L: NavigationListener> MovementController<S, L> {
    /// Create an idle controller loading grids from `source`.
    pub fn new(config: NavConfig, source: S, listener: L) -> Self {
        Self::with_cache(config, GridCache::new(source), listener)
    }

    /// Create an idle controller over an existing cache.
    pub fn with_cache(config: NavConfig, grids: GridCache<S>, listener: L) -> Self {
        Self {
            config,
            grids,
            listener,
            state: NavigationState::default(),
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    /// Full controller state.
    #[must_use]
    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    /// Coarse controller state.
    #[must_use]
    pub fn nav_state(&self) -> NavState {
        self.state.nav_state()
    }

    /// Ticks seen so far.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.state.tick
    }

    /// Current destination.
    #[must_use]
    pub fn destination(&self) -> Option<Destination> {
        self.state.destination
    }

    /// Remaining path, if one is held.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.state.path.as_ref()
    }

    /// Entity being followed.
    #[must_use]
    pub fn followed(&self) -> Option<EntityId> {
        self.state.followed
    }

    /// True while an entity is being followed.
    #[must_use]
    pub fn is_following(&self) -> bool {
        self.state.followed.is_some()
    }

    /// True while move intents are suppressed.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    /// The listener receiving notifications.
    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// Mutable access to the listener.
    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    /// Grids loaded so far.
    pub fn grids(&self) -> &GridCache<S> {
        &self.grids
    }

    /// Mutable access to the grid cache.
    pub fn grids_mut(&mut self) -> &mut GridCache<S> {
        &mut self.grids
    }

    /// Head for `destination`.
    ///
    /// The path is computed on the next acting tick.
    pub fn go(&mut self, destination: impl Into<Destination>) {
        let destination = destination.into();
        self.state.destination = Some(destination);
        self.state.moved = true;
        self.listener.on_event(&NavEvent::Start {
            destination: Some(destination),
        });
    }

    /// Head for wherever `entity` is, re-resolved on every acting tick.
    pub fn go_entity(&mut self, entity: EntityId) {
        self.go(Destination::Entity(entity));
    }

    /// Mirror the movement of `entity`.
    ///
    /// Only records the reference; the destination changes once the entity
    /// is reported to move.
    pub fn follow(&mut self, entity: EntityId) {
        self.state.followed = Some(entity);
    }

    /// Stop mirroring the followed entity. The destination is kept.
    pub fn unfollow(&mut self) {
        self.state.followed = None;
    }

    /// Abandon the destination.
    pub fn stop(&mut self) {
        self.state.destination = None;
        self.state.path = None;
        self.state.moved = true;
        debug!(tick = self.state.tick, "navigation stopped");
        self.listener.on_event(&NavEvent::Stop { reached: false });
    }

    /// Suppress move intents. Paths are still recalculated.
    pub fn pause(&mut self) {
        self.state.paused = true;
        self.listener.on_event(&NavEvent::Pause);
    }

    /// Resume move intents.
    pub fn start(&mut self) {
        self.state.paused = false;
        self.listener.on_event(&NavEvent::Start {
            destination: self.state.destination,
        });
    }

    /// A world entity moved. Ignored unless it is the followed one.
    pub fn on_entity_moved(&mut self, entity: EntityId, position: Vec2Fixed) {
        if self.state.followed != Some(entity) {
            return;
        }
        self.state.destination = Some(Destination::Position(position));
        self.state.moved = true;
    }

    /// A world entity left. Ignored unless it is the followed one.
    pub fn on_entity_departed(&mut self, entity: EntityId) {
        if self.state.followed != Some(entity) {
            return;
        }
        self.stop();
        self.state.followed = None;
    }

    /// Force a recalculation on the next acting tick, e.g. after the agent
    /// was moved by something other than a move intent.
    pub fn invalidate(&mut self) {
        self.state.moved = true;
    }

    /// Recalculate the path right away, outside the tick cadence.
    ///
    /// Returns `true` if a search ran. No move intent is issued.
    pub fn recalculate(&mut self, world: &impl WorldView) -> bool {
        self.act(world, true, false)
    }

    /// Advance the controller by one simulation tick.
    ///
    /// Never fails: missing inputs turn the tick into a no-op, and grid load
    /// failures are logged and retried on the next acting tick.
    pub fn tick(&mut self, world: &impl WorldView) {
        self.state.tick += 1;
        let tick = self.state.tick;
        if tick % self.config.move_interval.max(1) != 0 {
            return;
        }
        let periodic = self.config.recalc_interval > 0 && tick % self.config.recalc_interval == 0;
        self.act(world, periodic, true);
    }

    fn act(&mut self, world: &impl WorldView, force: bool, consume: bool) -> bool {
        let Self {
            config,
            grids,
            listener,
            state,
        } = self;

        let Some(destination) = state.destination else {
            return false;
        };
        let Some(map) = world.map_id() else {
            trace!(tick = state.tick, "no map, skipping tick");
            return false;
        };
        let grid = match grids.get_or_load(map) {
            Ok(grid) => grid,
            Err(err) => {
                warn!(%map, error = %err, "navigation grid unavailable");
                return false;
            }
        };
        if let Some(connectivity) = config.connectivity {
            grid.set_connectivity(connectivity);
        }

        let Some(position) = world.agent_position() else {
            trace!(tick = state.tick, "agent not placed, skipping tick");
            return false;
        };
        let Some(start) = grid.nearest_cell(position) else {
            return false;
        };
        let Some(goal) = resolve_goal(grid, world, destination) else {
            trace!(tick = state.tick, "destination unresolved, skipping tick");
            return false;
        };

        let stale = state.path.as_ref().map_or(true, Path::is_empty);
        let recalculated = force || state.moved || stale;
        if recalculated {
            grid.reset();
            let found = find_path(grid, start, goal);
            state.moved = false;

            let reachable = found.is_some();
            let path = found.unwrap_or_default();
            debug!(
                tick = state.tick,
                %start,
                %goal,
                len = path.len(),
                reachable,
                "path recalculated"
            );
            listener.on_event(&NavEvent::Recalculate {
                path: path.to_world(grid),
                reachable,
            });

            let arrived = reachable && path.is_empty();
            state.path = Some(path);
            if arrived {
                arrive(state, listener);
                return true;
            }
        }

        if consume && !state.paused {
            advance(config, state, listener, grid, position);
        }
        recalculated
    }

    /// Encode the controller state.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn snapshot(&self) -> Result<Vec<u8>> {
        bincode::serialize(&self.state)
            .map_err(|e| NavError::Snapshot(format!("Failed to serialize controller: {e}")))
    }

    /// Replace the controller state with a decoded snapshot.
    ///
    /// Loaded grids and the listener are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid snapshot.
    pub fn restore(&mut self, bytes: &[u8]) -> Result<()> {
        self.state = bincode::deserialize(bytes)
            .map_err(|e| NavError::Snapshot(format!("Failed to deserialize controller: {e}")))?;
        Ok(())
    }

    /// Hash of the controller state.
    ///
    /// Two controllers fed identical inputs produce identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.state.hash(&mut hasher);
        hasher.finish()
    }
}

fn resolve_goal(
    grid: &NavGrid,
    world: &impl WorldView,
    destination: Destination,
) -> Option<GridCell> {
    match destination {
        Destination::Position(pos) => grid.nearest_cell(pos),
        // Out-of-bounds cells are kept so the search reports them unreachable.
        Destination::Cell(cell) => Some(cell),
        Destination::Entity(entity) => world
            .entity_position(entity)
            .and_then(|pos| grid.nearest_cell(pos)),
    }
}

/// Pop the next cell and offer it as a move intent.
fn advance<L: NavigationListener>(
    config: &NavConfig,
    state: &mut NavigationState,
    listener: &mut L,
    grid: &NavGrid,
    position: Vec2Fixed,
) {
    let Some(path) = state.path.as_mut() else {
        return;
    };
    let Some(cell) = path.pop_front() else {
        return;
    };
    let remaining = path.len();

    let target = grid.world_position(cell);
    let distance = position.distance(target);
    let velocity = config.speed.scale(distance);
    let intent = MoveIntent {
        cell,
        target,
        distance,
        velocity,
    };
    if !listener.on_move(&intent).is_accepted() {
        debug!(tick = state.tick, %cell, "move rejected");
    }

    if remaining == 0 {
        arrive(state, listener);
    }
}

fn arrive<L: NavigationListener>(state: &mut NavigationState, listener: &mut L) {
    state.destination = None;
    state.path = None;
    debug!(tick = state.tick, "destination reached");
    listener.on_event(&NavEvent::Stop { reached: true });
    listener.on_event(&NavEvent::End);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemorySource;
    use crate::events::{EventLog, LoggedEvent, MoveResponse};
    use crate::grid::CellType;
    use crate::math::Fixed;
    use crate::world::WorldSnapshot;

    type TestController = MovementController<MemorySource, EventLog>;

    fn config() -> NavConfig {
        NavConfig {
            move_interval: 1,
            recalc_interval: 0,
            ..NavConfig::default()
        }
    }

    fn controller_over(grid: &NavGrid, config: NavConfig) -> TestController {
        MovementController::new(
            config,
            MemorySource::new().with_grid("field", grid),
            EventLog::new(),
        )
    }

    fn open_grid() -> NavGrid {
        NavGrid::new(5, 5, Fixed::ONE)
    }

    fn world_at(x: i32, y: i32) -> WorldSnapshot {
        WorldSnapshot::new("field").with_agent(Vec2Fixed::from_ints(x, y))
    }

    /// Tick until idle, moving the agent onto every accepted target.
    fn run_to_idle(controller: &mut TestController, world: &mut WorldSnapshot, limit: usize) {
        for _ in 0..limit {
            if controller.nav_state() == NavState::Idle {
                return;
            }
            let seen = controller.listener().entries().len();
            controller.tick(&*world);
            for entry in &controller.listener().entries()[seen..] {
                if let LoggedEvent::Move {
                    intent,
                    response: MoveResponse::Accept,
                } = entry
                {
                    world.agent = Some(intent.target);
                }
            }
        }
    }

    #[test]
    fn test_go_emits_start_and_marks_moved() {
        let mut controller = controller_over(&open_grid(), config());
        assert_eq!(controller.nav_state(), NavState::Idle);

        controller.go(GridCell::new(2, 2));
        assert_eq!(controller.nav_state(), NavState::Seeking);
        assert!(controller.state().moved);
        assert!(controller.path().is_none());
        assert_eq!(
            controller.listener().events().next(),
            Some(&NavEvent::Start {
                destination: Some(Destination::Cell(GridCell::new(2, 2)))
            })
        );
    }

    #[test]
    fn test_only_acting_ticks_do_work() {
        let mut controller = controller_over(&open_grid(), NavConfig::default());
        let world = world_at(0, 0);
        controller.go(GridCell::new(4, 0));

        for _ in 0..5 {
            controller.tick(&world);
        }
        assert!(controller.path().is_none());
        assert_eq!(controller.listener().moves().count(), 0);

        controller.tick(&world);
        assert_eq!(controller.tick_count(), 6);
        assert_eq!(controller.listener().moves().count(), 1);
        assert_eq!(controller.path().map(Path::len), Some(3));
    }

    #[test]
    fn test_arrival_emits_stop_then_end() {
        let mut controller = controller_over(&open_grid(), config());
        let mut world = world_at(0, 0);
        controller.go(Vec2Fixed::from_ints(4, 4));

        run_to_idle(&mut controller, &mut world, 50);

        let log = controller.listener();
        assert_eq!(log.moves().count(), 8);
        assert_eq!(log.stop_count(true), 1);
        assert_eq!(log.end_count(), 1);
        assert!(matches!(
            &log.entries()[log.entries().len() - 2..],
            [
                LoggedEvent::Event(NavEvent::Stop { reached: true }),
                LoggedEvent::Event(NavEvent::End)
            ]
        ));
        assert!(controller.destination().is_none());
        assert!(controller.path().is_none());
        assert_eq!(world.agent, Some(Vec2Fixed::from_ints(4, 4)));
    }

    #[test]
    fn test_goal_at_agent_arrives_immediately() {
        let mut controller = controller_over(&open_grid(), config());
        controller.go(GridCell::new(1, 1));
        controller.tick(&world_at(1, 1));

        let log = controller.listener();
        assert_eq!(log.moves().count(), 0);
        assert_eq!(log.stop_count(true), 1);
        assert_eq!(log.end_count(), 1);
        assert_eq!(controller.nav_state(), NavState::Idle);
    }

    #[test]
    fn test_move_intent_geometry() {
        let grid = open_grid().with_origin(Vec2Fixed::from_ints(10, 20));
        let config = NavConfig {
            speed: Vec2Fixed::from_ints(3, 2),
            ..config()
        };
        let mut controller = controller_over(&grid, config);
        controller.go(GridCell::new(0, 3));
        controller.tick(&world_at(10, 20));

        let (intent, response) = controller.listener().moves().next().unwrap();
        assert_eq!(response, MoveResponse::Accept);
        assert_eq!(intent.cell, GridCell::new(0, 1));
        assert_eq!(intent.target, Vec2Fixed::from_ints(10, 21));
        assert_eq!(intent.distance, Fixed::ONE);
        assert_eq!(intent.velocity, Vec2Fixed::from_ints(3, 2));
    }

    #[test]
    fn test_move_velocity_scales_with_distance() {
        let grid = NavGrid::new(5, 5, Fixed::from_num(10));
        let config = NavConfig {
            speed: Vec2Fixed::from_ints(3, 2),
            ..config()
        };
        let mut controller = controller_over(&grid, config);
        controller.go(GridCell::new(4, 0));
        controller.tick(&world_at(0, 0));

        let (intent, _) = controller.listener().moves().next().unwrap();
        assert_eq!(intent.target, Vec2Fixed::from_ints(10, 0));
        assert_eq!(intent.distance, Fixed::from_num(10));
        assert_eq!(intent.velocity, Vec2Fixed::from_ints(30, 20));
    }

    #[test]
    fn test_far_off_agent_does_not_panic() {
        let mut controller = controller_over(&open_grid(), config());
        controller.go(GridCell::new(2, 0));
        let world = WorldSnapshot::new("field").with_agent(Vec2Fixed::from_f64(-1e12, 0.0));
        controller.tick(&world);

        let (intent, _) = controller.listener().moves().next().unwrap();
        assert_eq!(intent.cell, GridCell::new(1, 0));
        assert!(intent.distance > Fixed::from_num(1000));
        assert_eq!(controller.nav_state(), NavState::Seeking);
    }

    #[test]
    fn test_stop_clears_and_later_go_recalculates() {
        let mut controller = controller_over(&open_grid(), config());
        let world = world_at(0, 0);
        controller.go(GridCell::new(4, 0));
        controller.tick(&world);

        controller.stop();
        assert_eq!(controller.listener().stop_count(false), 1);
        assert!(controller.destination().is_none());
        assert!(controller.path().is_none());
        assert!(controller.state().moved);

        controller.tick(&world);
        assert_eq!(controller.listener().moves().count(), 1);

        controller.listener_mut().clear();
        controller.go(GridCell::new(0, 4));
        controller.tick(&world);
        assert!(matches!(
            controller.listener().events().nth(1),
            Some(NavEvent::Recalculate {
                reachable: true,
                ..
            })
        ));
        assert_eq!(controller.path().map(Path::len), Some(3));
    }

    #[test]
    fn test_pause_suppresses_moves_but_not_recalculation() {
        let config = NavConfig {
            move_interval: 1,
            recalc_interval: 3,
            ..NavConfig::default()
        };
        let mut controller = controller_over(&open_grid(), config);
        let world = world_at(0, 0);
        controller.go(GridCell::new(4, 4));
        controller.pause();
        assert_eq!(controller.nav_state(), NavState::Paused);
        assert!(controller.is_paused());

        for _ in 0..6 {
            controller.tick(&world);
        }
        let log = controller.listener();
        assert_eq!(log.moves().count(), 0);
        let recalcs = log
            .events()
            .filter(|e| matches!(e, NavEvent::Recalculate { .. }))
            .count();
        // First acting tick (moved), then ticks 3 and 6.
        assert_eq!(recalcs, 3);

        controller.start();
        assert_eq!(
            controller.listener().events().last(),
            Some(&NavEvent::Start {
                destination: Some(Destination::Cell(GridCell::new(4, 4)))
            })
        );
        controller.tick(&world);
        assert_eq!(controller.listener().moves().count(), 1);
    }

    #[test]
    fn test_rejected_move_still_consumes_cell() {
        let mut controller = controller_over(&open_grid(), config());
        controller.listener_mut().set_reject_moves(true);
        let world = world_at(0, 0);
        controller.go(GridCell::new(3, 0));

        controller.tick(&world);
        assert_eq!(controller.path().map(Path::len), Some(2));
        controller.tick(&world);
        assert_eq!(controller.path().map(Path::len), Some(1));

        let responses: Vec<_> = controller.listener().moves().map(|(_, r)| r).collect();
        assert_eq!(responses, vec![MoveResponse::Reject, MoveResponse::Reject]);
    }

    #[test]
    fn test_unreachable_holds_empty_path_and_retries() {
        let mut grid = open_grid();
        for y in 0..5 {
            grid.set_cell(GridCell::new(2, y), CellType::Blocked);
        }
        let mut controller = controller_over(&grid, config());
        let world = world_at(0, 0);
        controller.go(GridCell::new(4, 0));

        controller.tick(&world);
        controller.tick(&world);

        let log = controller.listener();
        let unreachable = log
            .events()
            .filter(|e| matches!(e, NavEvent::Recalculate { reachable: false, path } if path.is_empty()))
            .count();
        assert_eq!(unreachable, 2);
        assert_eq!(log.moves().count(), 0);
        assert_eq!(controller.path().map(Path::is_empty), Some(true));
        assert_eq!(controller.nav_state(), NavState::Seeking);
    }

    #[test]
    fn test_follow_only_records_reference() {
        let mut controller = controller_over(&open_grid(), config());
        controller.follow(7);
        assert!(controller.is_following());
        assert!(controller.destination().is_none());
        assert!(controller.listener().entries().is_empty());

        controller.on_entity_moved(8, Vec2Fixed::from_ints(3, 3));
        assert!(controller.destination().is_none());

        controller.on_entity_moved(7, Vec2Fixed::from_ints(3, 3));
        assert_eq!(
            controller.destination(),
            Some(Destination::Position(Vec2Fixed::from_ints(3, 3)))
        );
        assert!(controller.state().moved);

        controller.unfollow();
        controller.on_entity_moved(7, Vec2Fixed::from_ints(1, 1));
        assert_eq!(
            controller.destination(),
            Some(Destination::Position(Vec2Fixed::from_ints(3, 3)))
        );
    }

    #[test]
    fn test_followed_departure_stops() {
        let mut controller = controller_over(&open_grid(), config());
        controller.follow(7);
        controller.on_entity_moved(7, Vec2Fixed::from_ints(3, 3));

        controller.on_entity_departed(9);
        assert!(controller.is_following());

        controller.on_entity_departed(7);
        assert!(!controller.is_following());
        assert!(controller.destination().is_none());
        assert_eq!(controller.listener().stop_count(false), 1);
    }

    #[test]
    fn test_entity_destination_tracks_world() {
        let mut controller = controller_over(&open_grid(), config());
        let mut world = world_at(0, 0).with_entity(3, Vec2Fixed::from_ints(4, 0));
        controller.go_entity(3);

        controller.tick(&world);
        assert_eq!(controller.path().and_then(Path::goal), Some(GridCell::new(4, 0)));

        world.entities.insert(3, Vec2Fixed::from_ints(0, 4));
        assert!(controller.recalculate(&world));
        assert_eq!(controller.path().and_then(Path::goal), Some(GridCell::new(0, 4)));

        world.entities.clear();
        assert!(!controller.recalculate(&world));
    }

    #[test]
    fn test_missing_inputs_are_noops() {
        let mut controller = controller_over(&open_grid(), config());
        controller.go(GridCell::new(2, 2));

        controller.tick(&WorldSnapshot::default());
        controller.tick(&WorldSnapshot::new("field"));
        controller.tick(&WorldSnapshot::new("nowhere").with_agent(Vec2Fixed::ZERO));

        assert_eq!(controller.tick_count(), 3);
        assert!(controller.path().is_none());
        assert!(controller.grids().is_loaded(&"field".into()));
        assert!(!controller.grids().is_loaded(&"nowhere".into()));
    }

    #[test]
    fn test_recalculate_without_destination() {
        let mut controller = controller_over(&open_grid(), config());
        assert!(!controller.recalculate(&world_at(0, 0)));
        assert!(controller.listener().entries().is_empty());
    }

    #[test]
    fn test_connectivity_override() {
        let config = NavConfig {
            connectivity: Some(crate::grid::Connectivity::Eight),
            ..config()
        };
        let mut controller = controller_over(&open_grid(), config);
        controller.go(GridCell::new(4, 4));
        controller.tick(&world_at(0, 0));
        assert_eq!(controller.path().map(Path::len), Some(3));
    }

    #[test]
    fn test_snapshot_restore_round_trip() {
        let mut controller = controller_over(&open_grid(), config());
        controller.follow(2);
        controller.go(GridCell::new(4, 4));
        controller.tick(&world_at(0, 0));
        let bytes = controller.snapshot().unwrap();
        let hash = controller.state_hash();

        let mut other = controller_over(&open_grid(), config());
        assert_ne!(other.state_hash(), hash);
        other.restore(&bytes).unwrap();
        assert_eq!(other.state(), controller.state());
        assert_eq!(other.state_hash(), hash);

        assert!(matches!(other.restore(&[0xFF]), Err(NavError::Snapshot(_))));
    }
}
