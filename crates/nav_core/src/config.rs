//! Movement controller configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{NavError, Result};
use crate::grid::Connectivity;
use crate::math::Vec2Fixed;

/// Default number of ticks between acting ticks.
pub const DEFAULT_MOVE_INTERVAL: u64 = 6;

/// Default number of ticks between periodic recalculations.
pub const DEFAULT_RECALC_INTERVAL: u64 = 60;

/// Tunables of a [`MovementController`](crate::controller::MovementController).
///
/// # Example
///
/// ```
/// use nav_core::config::NavConfig;
///
/// let config = NavConfig::from_ron_str("(move_interval: 4, recalc_interval: 0)").unwrap();
/// assert_eq!(config.move_interval, 4);
/// assert_eq!(config.recalc_interval, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// The controller acts on every tick that is a multiple of this value.
    pub move_interval: u64,
    /// A path is recomputed on every tick that is a multiple of this
    /// value. Zero disables periodic recalculation.
    pub recalc_interval: u64,
    /// Per-axis speed; a move intent's velocity is this scaled by the
    /// distance to its target.
    #[serde(with = "crate::math::vec2_decimal")]
    pub speed: Vec2Fixed,
    /// Adjacency rule overriding the one baked into the grid.
    pub connectivity: Option<Connectivity>,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            move_interval: DEFAULT_MOVE_INTERVAL,
            recalc_interval: DEFAULT_RECALC_INTERVAL,
            speed: Vec2Fixed::ONE,
            connectivity: None,
        }
    }
}

impl NavConfig {
    /// Load a config from a RON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| NavError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&contents)
    }

    /// Parse a config from a RON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string cannot be parsed or validated.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let config: Self = ron::from_str(ron)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::InvalidConfig`] if `move_interval` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.move_interval == 0 {
            return Err(NavError::InvalidConfig(
                "move_interval must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
