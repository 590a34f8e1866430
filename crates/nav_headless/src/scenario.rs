//! Scenario loading and configuration.
//!
//! Scenarios define the starting point of a headless run: which grids are
//! available, which map the agent starts on, where it and the other
//! entities stand, and how the controller is tuned.

use std::path::{Path, PathBuf};

use nav_core::ascii::parse_ascii_grid;
use nav_core::cache::{DirectorySource, GridSource, MemorySource};
use nav_core::config::NavConfig;
use nav_core::error::NavError;
use nav_core::events::EntityId;
use nav_core::grid::Connectivity;
use nav_core::math::{Fixed, Vec2Fixed};
use nav_core::world::WorldSnapshot;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// An inline map could not be turned into a grid.
    #[error("Invalid map '{id}': {source}")]
    InvalidMap {
        /// Map identifier.
        id: String,
        /// Underlying grid error.
        #[source]
        source: NavError,
    },
    /// Controller configuration is out of range.
    #[error("Invalid controller config: {0}")]
    InvalidConfig(#[source] NavError),
    /// The scenario is inconsistent.
    #[error("Invalid scenario: {0}")]
    Invalid(String),
}

/// A map given as ASCII art inside the scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineMap {
    /// Map identifier.
    pub id: String,
    /// World units per cell.
    #[serde(default = "default_cell_size")]
    pub cell_size: f64,
    /// World position of cell (0, 0).
    #[serde(default)]
    pub origin: (f64, f64),
    /// 8-connected when set.
    #[serde(default)]
    pub diagonal: bool,
    /// Rows of `.`, `~` and `#`.
    pub ascii: String,
}

fn default_cell_size() -> f64 {
    1.0
}

/// Another entity placed at start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityPlacement {
    /// Entity identifier.
    pub id: EntityId,
    /// X position.
    pub x: f64,
    /// Y position.
    pub y: f64,
}

/// A complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Map the agent starts on.
    pub map: String,
    /// Directory of baked `.nav` grids, relative to the scenario file.
    #[serde(default)]
    pub grid_dir: Option<PathBuf>,
    /// Grids defined inline.
    #[serde(default)]
    pub maps: Vec<InlineMap>,
    /// Agent start position.
    pub agent: (f64, f64),
    /// Other entities.
    #[serde(default)]
    pub entities: Vec<EntityPlacement>,
    /// Controller tunables.
    #[serde(default)]
    pub config: NavConfig,
}

impl Scenario {
    /// Load a scenario from a RON file.
    ///
    /// A relative `grid_dir` is resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable or invalid.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let mut scenario = Self::from_ron_str(&contents)?;
        if let (Some(dir), Some(base)) = (scenario.grid_dir.as_mut(), path.parent()) {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid scenario.
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Check that the scenario can be run.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first problem found.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        self.config.validate().map_err(ScenarioError::InvalidConfig)?;
        match (&self.grid_dir, self.maps.is_empty()) {
            (Some(_), false) => Err(ScenarioError::Invalid(
                "grid_dir and inline maps are mutually exclusive".into(),
            )),
            (None, true) => Err(ScenarioError::Invalid(
                "no grids: set grid_dir or add inline maps".into(),
            )),
            (None, false) if !self.maps.iter().any(|m| m.id == self.map) => Err(
                ScenarioError::Invalid(format!("start map '{}' is not defined", self.map)),
            ),
            _ => Ok(()),
        }
    }

    /// Build the grid source the scenario describes.
    ///
    /// # Errors
    ///
    /// Returns an error if an inline map does not parse.
    pub fn grid_source(&self) -> Result<Box<dyn GridSource>, ScenarioError> {
        if let Some(dir) = &self.grid_dir {
            return Ok(Box::new(DirectorySource::new(dir)));
        }

        let mut source = MemorySource::new();
        for map in &self.maps {
            let invalid = |source: NavError| ScenarioError::InvalidMap {
                id: map.id.clone(),
                source,
            };
            let cell_size = Fixed::saturating_from_num(map.cell_size);
            if cell_size <= Fixed::ZERO {
                return Err(invalid(NavError::MalformedGridData(
                    "cell size must be positive".into(),
                )));
            }
            let connectivity = if map.diagonal {
                Connectivity::Eight
            } else {
                Connectivity::Four
            };
            let grid = parse_ascii_grid(&map.ascii, cell_size)
                .map_err(invalid)?
                .with_origin(Vec2Fixed::from_f64(map.origin.0, map.origin.1))
                .with_connectivity(connectivity);
            tracing::debug!(map = %map.id, width = grid.width(), height = grid.height(), "inline map");
            source.insert(map.id.as_str(), grid.encode());
        }
        Ok(Box::new(source))
    }

    /// Starting world.
    #[must_use]
    pub fn world(&self) -> WorldSnapshot {
        self.entities.iter().fold(
            WorldSnapshot::new(self.map.as_str())
                .with_agent(Vec2Fixed::from_f64(self.agent.0, self.agent.1)),
            |world, e| world.with_entity(e.id, Vec2Fixed::from_f64(e.x, e.y)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nav_core::cache::MapId;
    use nav_test_utils::fixtures::fixed_f;

    const CORRIDOR: &str = r#"(
        name: "corridor",
        map: "hall",
        maps: [
            (
                id: "hall",
                cell_size: 2.0,
                ascii: "
                    ......
                    .####.
                    ......
                ",
            ),
        ],
        agent: (0.0, 0.0),
        entities: [(id: 4, x: 10.0, y: 4.0)],
        config: (move_interval: 2),
    )"#;

    #[test]
    fn test_parse_inline_scenario() {
        let scenario = Scenario::from_ron_str(CORRIDOR).unwrap();
        assert_eq!(scenario.name, "corridor");
        assert_eq!(scenario.config.move_interval, 2);
        assert_eq!(scenario.config.recalc_interval, 60);
        assert!(!scenario.maps[0].diagonal);

        let source = scenario.grid_source().unwrap();
        let grid = nav_core::grid::NavGrid::load(&source.grid_bytes(&MapId::from("hall")).unwrap())
            .unwrap();
        assert_eq!((grid.width(), grid.height()), (6, 3));
        assert_eq!(grid.cell_size(), fixed_f(2.0));

        let world = scenario.world();
        assert_eq!(world.map, Some(MapId::from("hall")));
        assert_eq!(world.entities.get(&4), Some(&Vec2Fixed::from_ints(10, 4)));
    }

    #[test]
    fn test_missing_start_map_rejected() {
        let ron = CORRIDOR.replace(r#"map: "hall""#, r#"map: "attic""#);
        assert!(matches!(
            Scenario::from_ron_str(&ron),
            Err(ScenarioError::Invalid(_))
        ));
    }

    #[test]
    fn test_bad_ascii_reported_with_map_id() {
        let ron = CORRIDOR.replace(".####.", ".##x#.");
        let scenario = Scenario::from_ron_str(&ron).unwrap();
        match scenario.grid_source() {
            Err(ScenarioError::InvalidMap { id, .. }) => assert_eq!(id, "hall"),
            Err(other) => panic!("expected InvalidMap, got {other:?}"),
            Ok(_) => panic!("expected InvalidMap, got a grid source"),
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let ron = CORRIDOR.replace("move_interval: 2", "move_interval: 0");
        assert!(matches!(
            Scenario::from_ron_str(&ron),
            Err(ScenarioError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_grid_dir_resolved_against_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.ron");
        std::fs::write(
            &path,
            r#"(name: "d", map: "m", grid_dir: Some("grids"), agent: (1.0, 1.0))"#,
        )
        .unwrap();

        let scenario = Scenario::load(&path).unwrap();
        assert_eq!(scenario.grid_dir, Some(dir.path().join("grids")));
        assert!(matches!(
            Scenario::load(dir.path().join("none.ron")),
            Err(ScenarioError::FileNotFound(_))
        ));
    }
}
