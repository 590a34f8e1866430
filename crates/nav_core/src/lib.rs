//! # Nav Core
//!
//! Grid navigation for a tick-driven agent.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO on the tick path (grids are loaded once per map)
//! - No randomness
//! - No floating-point math in search or movement (uses fixed-point)
//!
//! ## Crate Structure
//!
//! - [`grid`] - Navigation grid, binary format, cell queries
//! - [`pathfinding`] - A* search over a grid
//! - [`controller`] - Movement controller state machine
//! - [`cache`] - Map-keyed lazy grid loading
//! - [`events`] - Listener notifications and move intents
//! - [`world`] - The controller's view of the world
//! - [`ascii`] - Plain-text maps for tooling and tests
//! - [`config`] - Controller tunables
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ascii;
pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod grid;
pub mod math;
pub mod pathfinding;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::ascii::{parse_ascii_grid, render_ascii};
    pub use crate::cache::{DirectorySource, GridCache, GridSource, MapId, MemorySource};
    pub use crate::config::NavConfig;
    pub use crate::controller::{MovementController, NavState, NavigationState};
    pub use crate::error::{NavError, Result};
    pub use crate::events::{
        Destination, EntityId, EventLog, LoggedEvent, MoveIntent, MoveResponse, NavEvent,
        NavigationListener,
    };
    pub use crate::grid::{CellType, Connectivity, GridCell, NavGrid};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::pathfinding::{find_path, Path};
    pub use crate::world::{WorldSnapshot, WorldView};
}
