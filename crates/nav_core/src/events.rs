//! Notifications emitted by the [`MovementController`](crate::controller::MovementController).
//!
//! Listeners see every notification synchronously, inside the call that
//! produced it. Move intents are the only cancelable notification: the
//! listener answers each one with a [`MoveResponse`].

use serde::{Deserialize, Serialize};

use crate::grid::GridCell;
use crate::math::{fixed_serde, Fixed, Vec2Fixed};

/// Identifier of an entity in the external world.
pub type EntityId = u64;

/// Where the controller is heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    /// A world-space position.
    Position(Vec2Fixed),
    /// A specific grid cell.
    Cell(GridCell),
    /// Wherever the entity currently is, resolved on each acting tick.
    Entity(EntityId),
}

impl From<Vec2Fixed> for Destination {
    fn from(pos: Vec2Fixed) -> Self {
        Self::Position(pos)
    }
}

impl From<GridCell> for Destination {
    fn from(cell: GridCell) -> Self {
        Self::Cell(cell)
    }
}

/// Non-cancelable notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NavEvent {
    /// Navigation started or resumed.
    Start {
        /// Destination in effect, if any.
        destination: Option<Destination>,
    },
    /// Navigation stopped.
    Stop {
        /// True when the destination was reached.
        reached: bool,
    },
    /// Emitted after an arrival stop.
    End,
    /// Movement intents are suspended.
    Pause,
    /// A new path was computed.
    Recalculate {
        /// Remaining waypoints in world coordinates.
        path: Vec<Vec2Fixed>,
        /// False when the goal could not be reached.
        reachable: bool,
    },
}

/// A single step the actuator is asked to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveIntent {
    /// Cell being moved to.
    pub cell: GridCell,
    /// World position of `cell`.
    pub target: Vec2Fixed,
    /// Straight-line distance from the agent to `target`.
    #[serde(with = "fixed_serde")]
    pub distance: Fixed,
    /// Velocity: the per-axis speed scaled by `distance`.
    pub velocity: Vec2Fixed,
}

/// Answer to a [`MoveIntent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveResponse {
    /// Perform the move.
    Accept,
    /// Skip the move. The path cell is consumed anyway.
    Reject,
}

impl MoveResponse {
    /// True for [`MoveResponse::Accept`].
    #[must_use]
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accept)
    }
}

/// Consumer of controller notifications.
pub trait NavigationListener {
    /// Receive a non-cancelable notification.
    fn on_event(&mut self, event: &NavEvent);

    /// Decide whether a move intent is carried out.
    fn on_move(&mut self, intent: &MoveIntent) -> MoveResponse;
}

/// One entry of an [`EventLog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoggedEvent {
    /// A plain notification.
    Event(NavEvent),
    /// A move intent with the answer it received.
    Move {
        /// The intent offered.
        intent: MoveIntent,
        /// The answer given.
        response: MoveResponse,
    },
}

/// Listener that records everything it sees.
///
/// Moves are accepted unless [`EventLog::set_reject_moves`] is enabled.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Vec<LoggedEvent>,
    reject_moves: bool,
}

impl EventLog {
    /// Create an empty log that accepts moves.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle rejection of move intents.
    pub fn set_reject_moves(&mut self, reject: bool) {
        self.reject_moves = reject;
    }

    /// All recorded entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[LoggedEvent] {
        &self.entries
    }

    /// Recorded non-cancelable notifications.
    pub fn events(&self) -> impl Iterator<Item = &NavEvent> {
        self.entries.iter().filter_map(|e| match e {
            LoggedEvent::Event(event) => Some(event),
            LoggedEvent::Move { .. } => None,
        })
    }

    /// Recorded move intents and their answers.
    pub fn moves(&self) -> impl Iterator<Item = (&MoveIntent, MoveResponse)> {
        self.entries.iter().filter_map(|e| match e {
            LoggedEvent::Move { intent, response } => Some((intent, *response)),
            LoggedEvent::Event(_) => None,
        })
    }

    /// Number of `Stop` notifications with the given `reached` flag.
    #[must_use]
    pub fn stop_count(&self, reached: bool) -> usize {
        self.events()
            .filter(|e| matches!(e, NavEvent::Stop { reached: r } if *r == reached))
            .count()
    }

    /// Number of `End` notifications.
    #[must_use]
    pub fn end_count(&self) -> usize {
        self.events().filter(|e| matches!(e, NavEvent::End)).count()
    }

    /// Path carried by the most recent `Recalculate` notification.
    #[must_use]
    pub fn last_recalculated_path(&self) -> Option<&[Vec2Fixed]> {
        self.events()
            .filter_map(|e| match e {
                NavEvent::Recalculate { path, .. } => Some(path.as_slice()),
                _ => None,
            })
            .last()
    }

    /// Remove and return all entries.
    pub fn drain(&mut self) -> Vec<LoggedEvent> {
        std::mem::take(&mut self.entries)
    }

    /// Forget all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl NavigationListener for EventLog {
    fn on_event(&mut self, event: &NavEvent) {
        self.entries.push(LoggedEvent::Event(event.clone()));
    }

    fn on_move(&mut self, intent: &MoveIntent) -> MoveResponse {
        let response = if self.reject_moves {
            MoveResponse::Reject
        } else {
            MoveResponse::Accept
        };
        self.entries.push(LoggedEvent::Move {
            intent: *intent,
            response,
        });
        response
    }
}

impl<L: NavigationListener + ?Sized> NavigationListener for &mut L {
    fn on_event(&mut self, event: &NavEvent) {
        (**self).on_event(event);
    }

    fn on_move(&mut self, intent: &MoveIntent) -> MoveResponse {
        (**self).on_move(intent)
    }
}

impl<L: NavigationListener + ?Sized> NavigationListener for Box<L> {
    fn on_event(&mut self, event: &NavEvent) {
        (**self).on_event(event);
    }

    fn on_move(&mut self, intent: &MoveIntent) -> MoveResponse {
        (**self).on_move(intent)
    }
}
