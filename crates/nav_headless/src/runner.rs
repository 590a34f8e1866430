//! Headless runner implementation.

use std::io::{self, BufRead, Write};

use nav_core::cache::{GridSource, MapId};
use nav_core::config::NavConfig;
use nav_core::controller::MovementController;
use nav_core::events::{MoveIntent, MoveResponse, NavEvent, NavigationListener};
use nav_core::grid::GridCell;
use nav_core::math::Vec2Fixed;
use nav_core::world::WorldSnapshot;

use crate::protocol::{path_cells, position, Command, EntityOutput, Response, StateOutput};
use crate::scenario::{Scenario, ScenarioError};

/// Listener that turns notifications into protocol lines and plays the
/// actuator for move intents.
#[derive(Debug, Default)]
pub struct ProtocolListener {
    tick: u64,
    reject_moves: bool,
    outbox: Vec<Response>,
    accepted: Option<Vec2Fixed>,
}

impl ProtocolListener {
    /// True while move intents are rejected.
    #[must_use]
    pub fn rejects_moves(&self) -> bool {
        self.reject_moves
    }
}

impl NavigationListener for ProtocolListener {
    fn on_event(&mut self, event: &NavEvent) {
        self.outbox.push(Response::event(self.tick, event));
    }

    fn on_move(&mut self, intent: &MoveIntent) -> MoveResponse {
        let accepted = !self.reject_moves;
        self.outbox
            .push(Response::movement(self.tick, intent, accepted));
        if accepted {
            self.accepted = Some(intent.target);
            MoveResponse::Accept
        } else {
            MoveResponse::Reject
        }
    }
}

/// Controller type driven by the runner.
pub type RunnerController = MovementController<Box<dyn GridSource>, ProtocolListener>;

/// Headless runner for scripted navigation.
pub struct HeadlessRunner {
    controller: RunnerController,
    world: WorldSnapshot,
    finished: bool,
}

impl HeadlessRunner {
    /// Create a runner over `source` with the given starting world.
    pub fn new(config: NavConfig, source: Box<dyn GridSource>, world: WorldSnapshot) -> Self {
        Self {
            controller: MovementController::new(config, source, ProtocolListener::default()),
            world,
            finished: false,
        }
    }

    /// Create a runner from a scenario.
    ///
    /// # Errors
    ///
    /// Returns an error if the scenario's grids cannot be built.
    pub fn from_scenario(scenario: &Scenario) -> Result<Self, ScenarioError> {
        tracing::info!(name = %scenario.name, map = %scenario.map, "loading scenario");
        Ok(Self::new(
            scenario.config.clone(),
            scenario.grid_source()?,
            scenario.world(),
        ))
    }

    /// The world as the runner sees it.
    #[must_use]
    pub fn world(&self) -> &WorldSnapshot {
        &self.world
    }

    /// The controller being driven.
    #[must_use]
    pub fn controller(&self) -> &RunnerController {
        &self.controller
    }

    /// True once `quit` has been handled.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The greeting line.
    #[must_use]
    pub fn ready(&self) -> Response {
        Response::ready(
            self.controller.tick_count(),
            self.world.map.as_ref().map(MapId::as_str),
        )
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> StateOutput {
        StateOutput {
            tick: self.controller.tick_count(),
            nav_state: self.controller.nav_state().into(),
            map: self.world.map.as_ref().map(ToString::to_string),
            agent: self.world.agent.map(position),
            destination: self.controller.destination().map(Into::into),
            path: self.controller.path().map(path_cells),
            following: self.controller.followed(),
            entities: self
                .world
                .entities
                .iter()
                .map(|(&id, &pos)| {
                    let [x, y] = position(pos);
                    EntityOutput { id, x, y }
                })
                .collect(),
            hash: self.controller.state_hash(),
        }
    }

    /// Handle one raw input line.
    pub fn handle_line(&mut self, line: &str) -> Vec<Response> {
        match Command::from_json(line) {
            Ok(cmd) => self.handle(cmd),
            Err(e) => vec![Response::error(format!("Parse error: {e}"), None)],
        }
    }

    /// Handle one command, returning every line it produced.
    ///
    /// Notifications come first, in emission order, followed by the
    /// command's own answer.
    pub fn handle(&mut self, cmd: Command) -> Vec<Response> {
        let cmd_name = cmd.name();
        tracing::debug!(cmd = cmd_name, "handling command");
        let now = self.controller.tick_count();
        self.controller.listener_mut().tick = now;

        let answer = match cmd {
            Command::Tick { count } => {
                for _ in 0..count {
                    self.tick_once();
                }
                Response::ack(cmd_name)
            }
            Command::Go { x, y } => {
                self.controller.go(Vec2Fixed::from_f64(x, y));
                Response::ack(cmd_name)
            }
            Command::GoCell { x, y } => {
                self.controller.go(GridCell::new(x, y));
                Response::ack(cmd_name)
            }
            Command::GoEntity { entity_id } => {
                if self.world.entities.contains_key(&entity_id) {
                    self.controller.go_entity(entity_id);
                    Response::ack(cmd_name)
                } else {
                    Response::error(format!("Entity {entity_id} not found"), Some(cmd_name))
                }
            }
            Command::Follow { entity_id } => {
                if self.world.entities.contains_key(&entity_id) {
                    self.controller.follow(entity_id);
                    Response::ack(cmd_name)
                } else {
                    Response::error(format!("Entity {entity_id} not found"), Some(cmd_name))
                }
            }
            Command::Unfollow => {
                self.controller.unfollow();
                Response::ack(cmd_name)
            }
            Command::Stop => {
                self.controller.stop();
                Response::ack(cmd_name)
            }
            Command::Pause => {
                self.controller.pause();
                Response::ack(cmd_name)
            }
            Command::Start => {
                self.controller.start();
                Response::ack(cmd_name)
            }
            Command::Recalculate => {
                if self.controller.recalculate(&self.world) {
                    Response::ack(cmd_name)
                } else {
                    Response::error("Nothing to recalculate", Some(cmd_name))
                }
            }
            Command::Spawn { entity_id, x, y } => {
                if self.world.entities.contains_key(&entity_id) {
                    Response::error(format!("Entity {entity_id} already exists"), Some(cmd_name))
                } else {
                    self.world
                        .entities
                        .insert(entity_id, Vec2Fixed::from_f64(x, y));
                    Response::ack(cmd_name)
                }
            }
            Command::MoveEntity { entity_id, x, y } => {
                if let Some(pos) = self.world.entities.get_mut(&entity_id) {
                    *pos = Vec2Fixed::from_f64(x, y);
                    let pos = *pos;
                    self.controller.on_entity_moved(entity_id, pos);
                    Response::ack(cmd_name)
                } else {
                    Response::error(format!("Entity {entity_id} not found"), Some(cmd_name))
                }
            }
            Command::Despawn { entity_id } => {
                if self.world.entities.remove(&entity_id).is_some() {
                    self.controller.on_entity_departed(entity_id);
                    Response::ack(cmd_name)
                } else {
                    Response::error(format!("Entity {entity_id} not found"), Some(cmd_name))
                }
            }
            Command::Teleport { x, y } => {
                self.world.agent = Some(Vec2Fixed::from_f64(x, y));
                self.controller.invalidate();
                Response::ack(cmd_name)
            }
            Command::SetMap { map_id } => {
                self.world.map = Some(MapId::new(map_id));
                self.controller.invalidate();
                Response::ack(cmd_name)
            }
            Command::RejectMoves { enabled } => {
                self.controller.listener_mut().reject_moves = enabled;
                Response::ack(cmd_name)
            }
            Command::Query => Response::State(self.state()),
            Command::Hash => Response::StateHash {
                tick: self.controller.tick_count(),
                hash: self.controller.state_hash(),
            },
            Command::Quit => {
                self.finished = true;
                Response::Bye
            }
        };

        let mut responses = std::mem::take(&mut self.controller.listener_mut().outbox);
        responses.push(answer);
        responses
    }

    /// Advance one tick and carry out the accepted move, if any.
    fn tick_once(&mut self) {
        let next = self.controller.tick_count() + 1;
        self.controller.listener_mut().tick = next;
        self.controller.tick(&self.world);
        if let Some(target) = self.controller.listener_mut().accepted.take() {
            self.world.agent = Some(target);
        }
    }

    /// Serve the protocol until `quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        output.write_all(self.ready().to_json_line().as_bytes())?;
        output.flush()?;

        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            for response in self.handle_line(line) {
                output.write_all(response.to_json_line().as_bytes())?;
            }
            output.flush()?;
            if self.finished {
                break;
            }
        }

        if !self.finished {
            self.finished = true;
            output.write_all(Response::Bye.to_json_line().as_bytes())?;
            output.flush()?;
        }
        tracing::info!(tick = self.controller.tick_count(), "runner finished");
        Ok(())
    }
}
