//! Headless navigation runner for scripted testing.
//!
//! This crate drives a [`nav_core::controller::MovementController`] from JSON
//! commands on stdin, with notifications and state on stdout. A simulated
//! actuator applies every accepted move intent to the agent, so a client can
//! exercise the full navigation loop without a game attached.
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdin**: Commands (tick, go, follow, spawn, etc.)
//! - **stdout**: Notifications and responses (JSON)
//! - **stderr**: Debug logs (human-readable)
//!
//! See [`protocol`] module for the full command/response specification.
//!
//! # Example
//!
//! ```bash
//! # Run a scenario interactively
//! echo '{"cmd":"tick","count":60}' | cargo run -p nav_headless -- --scenario scenarios/corridor.ron
//!
//! # Serve baked grids from a directory
//! cargo run -p nav_headless -- --grids maps/ --map town --agent 4,4
//! ```

pub mod protocol;
pub mod runner;
pub mod scenario;

pub use protocol::{Command, Response};
pub use runner::HeadlessRunner;
pub use scenario::{Scenario, ScenarioError};
