//! JSON protocol for headless navigation.
//!
//! The headless runner communicates via JSON lines (one JSON object per line):
//!
//! **Input (stdin):** Commands from the client
//! **Output (stdout):** Notifications and responses
//!
//! # Protocol Flow
//!
//! 1. Runner starts, outputs `{"type":"ready","version":"1.0",...}`
//! 2. Client sends commands as JSON lines
//! 3. Runner answers each command; ticks also stream `event` and `move`
//!    lines for every notification the controller emitted
//! 4. On `quit` (or end of input) the runner outputs `{"type":"bye"}`
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","tick":0,"map":"corridor"}
//! -> {"cmd":"go_cell","x":6,"y":0}
//! <- {"type":"event","tick":0,"event":{"kind":"start",...}}
//! <- {"type":"ack","cmd":"go_cell"}
//! -> {"cmd":"tick","count":6}
//! <- {"type":"event","tick":6,"event":{"kind":"recalculate",...}}
//! <- {"type":"move","tick":6,"cell":[1,0],"target":[1.0,0.0],...}
//! <- {"type":"ack","cmd":"tick"}
//! -> {"cmd":"query"}
//! <- {"type":"state","tick":6,"nav_state":"seeking",...}
//! ```

use nav_core::controller::NavState;
use nav_core::events::{Destination, EntityId, MoveIntent, NavEvent};
use nav_core::grid::GridCell;
use nav_core::math::Vec2Fixed;
use serde::{Deserialize, Serialize};

/// Protocol version reported in the ready line.
pub const PROTOCOL_VERSION: &str = "1.0";

// ============================================================================
// Input Commands (Client -> Runner)
// ============================================================================

/// Commands that can be sent to the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Advance the clock by N ticks (default: 1).
    Tick {
        #[serde(default = "default_tick_count")]
        count: u32,
    },

    /// Head for a world position.
    Go { x: f64, y: f64 },

    /// Head for a grid cell.
    GoCell { x: u32, y: u32 },

    /// Head for wherever an entity is.
    GoEntity { entity_id: EntityId },

    /// Mirror an entity's movement.
    Follow { entity_id: EntityId },

    /// Stop mirroring.
    Unfollow,

    /// Abandon the destination.
    Stop,

    /// Suppress move intents.
    Pause,

    /// Resume move intents.
    Start,

    /// Recalculate the path now.
    Recalculate,

    /// Add another entity to the world.
    Spawn { entity_id: EntityId, x: f64, y: f64 },

    /// Move another entity.
    MoveEntity { entity_id: EntityId, x: f64, y: f64 },

    /// Remove another entity.
    Despawn { entity_id: EntityId },

    /// Place the agent, bypassing the controller.
    Teleport { x: f64, y: f64 },

    /// Switch the map the agent is on.
    SetMap { map_id: String },

    /// Make the simulated actuator reject (or accept) move intents.
    RejectMoves { enabled: bool },

    /// Query current state without advancing time.
    Query,

    /// Report the state hash (for determinism verification).
    Hash,

    /// Quit the runner.
    Quit,
}

fn default_tick_count() -> u32 {
    1
}

// ============================================================================
// Output Responses (Runner -> Client)
// ============================================================================

/// Responses sent from the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready to accept commands.
    Ready {
        version: String,
        tick: u64,
        map: Option<String>,
    },

    /// Acknowledgment of a command.
    Ack { cmd: String },

    /// Error processing a command.
    Error {
        message: String,
        cmd: Option<String>,
    },

    /// A controller notification.
    Event { tick: u64, event: EventOutput },

    /// A move intent and the actuator's answer.
    Move {
        tick: u64,
        cell: [u32; 2],
        target: [f64; 2],
        distance: f64,
        velocity: [f64; 2],
        accepted: bool,
    },

    /// Current navigation state.
    State(StateOutput),

    /// State hash for determinism verification.
    StateHash { tick: u64, hash: u64 },

    /// Goodbye message before shutdown.
    Bye,
}

// ============================================================================
// State Types
// ============================================================================

/// Controller notification in protocol form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventOutput {
    /// Navigation started or resumed.
    Start {
        destination: Option<DestinationOutput>,
    },
    /// Navigation stopped.
    Stop { reached: bool },
    /// Emitted after an arrival stop.
    End,
    /// Move intents suspended.
    Pause,
    /// A new path was computed.
    Recalculate { path: Vec<[f64; 2]>, reachable: bool },
}

/// Destination in protocol form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DestinationOutput {
    /// A world position.
    Position { x: f64, y: f64 },
    /// A grid cell.
    Cell { x: u32, y: u32 },
    /// An entity.
    Entity { entity_id: EntityId },
}

/// Snapshot of the runner and its controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateOutput {
    pub tick: u64,
    pub nav_state: NavStateOutput,
    pub map: Option<String>,
    pub agent: Option<[f64; 2]>,
    pub destination: Option<DestinationOutput>,
    /// Remaining path cells, front first.
    pub path: Option<Vec<[u32; 2]>>,
    pub following: Option<EntityId>,
    pub entities: Vec<EntityOutput>,
    pub hash: u64,
}

/// Coarse controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavStateOutput {
    Idle,
    Seeking,
    Paused,
}

/// Another entity in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityOutput {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
}

// ============================================================================
// Conversions
// ============================================================================

fn pair(v: Vec2Fixed) -> [f64; 2] {
    let (x, y) = v.to_f64();
    [x, y]
}

fn cell_pair(cell: GridCell) -> [u32; 2] {
    [cell.x, cell.y]
}

impl From<Destination> for DestinationOutput {
    fn from(destination: Destination) -> Self {
        match destination {
            Destination::Position(pos) => {
                let (x, y) = pos.to_f64();
                Self::Position { x, y }
            }
            Destination::Cell(cell) => Self::Cell {
                x: cell.x,
                y: cell.y,
            },
            Destination::Entity(entity_id) => Self::Entity { entity_id },
        }
    }
}

impl From<&NavEvent> for EventOutput {
    fn from(event: &NavEvent) -> Self {
        match event {
            NavEvent::Start { destination } => Self::Start {
                destination: destination.map(DestinationOutput::from),
            },
            NavEvent::Stop { reached } => Self::Stop { reached: *reached },
            NavEvent::End => Self::End,
            NavEvent::Pause => Self::Pause,
            NavEvent::Recalculate { path, reachable } => Self::Recalculate {
                path: path.iter().copied().map(pair).collect(),
                reachable: *reachable,
            },
        }
    }
}

impl From<NavState> for NavStateOutput {
    fn from(state: NavState) -> Self {
        match state {
            NavState::Idle => Self::Idle,
            NavState::Seeking => Self::Seeking,
            NavState::Paused => Self::Paused,
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

impl Response {
    /// Create a ready response.
    pub fn ready(tick: u64, map: Option<&str>) -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            tick,
            map: map.map(String::from),
        }
    }

    /// Create an acknowledgment.
    pub fn ack(cmd: &str) -> Self {
        Self::Ack {
            cmd: cmd.to_string(),
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Create a notification response.
    pub fn event(tick: u64, event: &NavEvent) -> Self {
        Self::Event {
            tick,
            event: event.into(),
        }
    }

    /// Create a move response.
    pub fn movement(tick: u64, intent: &MoveIntent, accepted: bool) -> Self {
        Self::Move {
            tick,
            cell: cell_pair(intent.cell),
            target: pair(intent.target),
            distance: intent.distance.to_num(),
            velocity: pair(intent.velocity),
            accepted,
        }
    }

    /// Serialize to JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Serialization failed: {e}"}}"#)
        });
        json.push('\n');
        json
    }
}

impl Command {
    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get command name for acknowledgment.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tick { .. } => "tick",
            Self::Go { .. } => "go",
            Self::GoCell { .. } => "go_cell",
            Self::GoEntity { .. } => "go_entity",
            Self::Follow { .. } => "follow",
            Self::Unfollow => "unfollow",
            Self::Stop => "stop",
            Self::Pause => "pause",
            Self::Start => "start",
            Self::Recalculate => "recalculate",
            Self::Spawn { .. } => "spawn",
            Self::MoveEntity { .. } => "move_entity",
            Self::Despawn { .. } => "despawn",
            Self::Teleport { .. } => "teleport",
            Self::SetMap { .. } => "set_map",
            Self::RejectMoves { .. } => "reject_moves",
            Self::Query => "query",
            Self::Hash => "hash",
            Self::Quit => "quit",
        }
    }
}

/// Convert cell coordinates of a path for output.
pub(crate) fn path_cells<'a>(cells: impl IntoIterator<Item = &'a GridCell>) -> Vec<[u32; 2]> {
    cells.into_iter().copied().map(cell_pair).collect()
}

/// Convert a position for output.
pub(crate) fn position(v: Vec2Fixed) -> [f64; 2] {
    pair(v)
}
