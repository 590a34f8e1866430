//! Lazy, map-keyed grid loading.
//!
//! Grids are baked offline and looked up by map identifier through a
//! [`GridSource`]. A [`GridCache`] loads each map at most once and keeps it
//! for the lifetime of the cache; maps are few and small, so nothing is
//! evicted. Failed loads are not cached and will be retried on next use.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NavError, Result};
use crate::grid::NavGrid;

/// File extension of baked grids.
pub const GRID_EXTENSION: &str = "nav";

/// Identifier of a map (room, level, zone).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapId(String);

impl MapId {
    /// Create a map identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MapId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MapId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for MapId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Resource lookup for baked grid payloads.
pub trait GridSource {
    /// Fetch the baked bytes for `map`.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::GridNotFound`] if the map has no grid, or an IO
    /// error if the resource exists but cannot be read.
    fn grid_bytes(&self, map: &MapId) -> Result<Vec<u8>>;
}

impl<S: GridSource + ?Sized> GridSource for &S {
    fn grid_bytes(&self, map: &MapId) -> Result<Vec<u8>> {
        (**self).grid_bytes(map)
    }
}

impl<S: GridSource + ?Sized> GridSource for Box<S> {
    fn grid_bytes(&self, map: &MapId) -> Result<Vec<u8>> {
        (**self).grid_bytes(map)
    }
}

/// Reads `<root>/<map>.nav` files.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Serve grids from `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory grids are read from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File that holds the grid for `map`.
    ///
    /// Returns `None` for identifiers that would escape the root directory.
    #[must_use]
    pub fn path_for(&self, map: &MapId) -> Option<PathBuf> {
        let id = map.as_str();
        if id.is_empty() || id.contains(['/', '\\']) || id.contains("..") {
            return None;
        }
        Some(self.root.join(format!("{id}.{GRID_EXTENSION}")))
    }
}

impl GridSource for DirectorySource {
    fn grid_bytes(&self, map: &MapId) -> Result<Vec<u8>> {
        let path = self
            .path_for(map)
            .ok_or_else(|| NavError::GridNotFound(map.clone()))?;
        if !path.is_file() {
            return Err(NavError::GridNotFound(map.clone()));
        }
        std::fs::read(&path).map_err(|source| NavError::Io { path, source })
    }
}

/// In-memory grid payloads.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    grids: HashMap<MapId, Vec<u8>>,
}

impl MemorySource {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register raw bytes for a map.
    pub fn insert(&mut self, map: impl Into<MapId>, bytes: Vec<u8>) {
        self.grids.insert(map.into(), bytes);
    }

    /// Register a grid for a map, builder style.
    #[must_use]
    pub fn with_grid(mut self, map: impl Into<MapId>, grid: &NavGrid) -> Self {
        self.insert(map, grid.encode());
        self
    }
}

impl GridSource for MemorySource {
    fn grid_bytes(&self, map: &MapId) -> Result<Vec<u8>> {
        self.grids
            .get(map)
            .cloned()
            .ok_or_else(|| NavError::GridNotFound(map.clone()))
    }
}

/// Loads grids on first use and keeps them.
#[derive(Debug)]
pub struct GridCache<S> {
    source: S,
    grids: HashMap<MapId, NavGrid>,
}

impl<S: GridSource> GridCache<S> {
    /// Create an empty cache over `source`.
    pub fn new(source: S) -> Self {
        Self {
            source,
            grids: HashMap::new(),
        }
    }

    /// Grid for `map`, loading it on first request.
    ///
    /// # Errors
    ///
    /// Propagates lookup and parse errors. Nothing is cached on failure.
    pub fn get_or_load(&mut self, map: &MapId) -> Result<&mut NavGrid> {
        match self.grids.entry(map.clone()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let bytes = self.source.grid_bytes(map)?;
                let grid = NavGrid::load(&bytes)?;
                tracing::info!(
                    %map,
                    width = grid.width(),
                    height = grid.height(),
                    "loaded navigation grid"
                );
                Ok(entry.insert(grid))
            }
        }
    }

    /// Already-loaded grid for `map`.
    #[must_use]
    pub fn get(&self, map: &MapId) -> Option<&NavGrid> {
        self.grids.get(map)
    }

    /// True if `map` has been loaded.
    #[must_use]
    pub fn is_loaded(&self, map: &MapId) -> bool {
        self.grids.contains_key(map)
    }

    /// Install a grid without going through the source.
    pub fn insert(&mut self, map: impl Into<MapId>, grid: NavGrid) {
        self.grids.insert(map.into(), grid);
    }

    /// Number of loaded grids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.grids.len()
    }

    /// True if nothing has been loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    /// The underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }
}
