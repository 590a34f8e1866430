//! The controller's read-only view of the external world.

use std::collections::BTreeMap;

use crate::cache::MapId;
use crate::events::EntityId;
use crate::math::Vec2Fixed;

/// What the controller needs to know about the world on an acting tick.
pub trait WorldView {
    /// Map the agent is currently on.
    fn map_id(&self) -> Option<&MapId>;

    /// Agent position, or `None` before the agent has spawned.
    fn agent_position(&self) -> Option<Vec2Fixed>;

    /// Position of another entity, or `None` if it is not present.
    fn entity_position(&self, entity: EntityId) -> Option<Vec2Fixed>;
}

/// Plain-data [`WorldView`], kept up to date by the embedding client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorldSnapshot {
    /// Current map.
    pub map: Option<MapId>,
    /// Agent position.
    pub agent: Option<Vec2Fixed>,
    /// Other entities by id.
    pub entities: BTreeMap<EntityId, Vec2Fixed>,
}

impl WorldSnapshot {
    /// World on `map` with no agent yet.
    #[must_use]
    pub fn new(map: impl Into<MapId>) -> Self {
        Self {
            map: Some(map.into()),
            ..Self::default()
        }
    }

    /// Place the agent, builder style.
    #[must_use]
    pub fn with_agent(mut self, position: Vec2Fixed) -> Self {
        self.agent = Some(position);
        self
    }

    /// Place another entity, builder style.
    #[must_use]
    pub fn with_entity(mut self, entity: EntityId, position: Vec2Fixed) -> Self {
        self.entities.insert(entity, position);
        self
    }
}

impl WorldView for WorldSnapshot {
    fn map_id(&self) -> Option<&MapId> {
        self.map.as_ref()
    }

    fn agent_position(&self) -> Option<Vec2Fixed> {
        self.agent
    }

    fn entity_position(&self, entity: EntityId) -> Option<Vec2Fixed> {
        self.entities.get(&entity).copied()
    }
}

impl<W: WorldView + ?Sized> WorldView for &W {
    fn map_id(&self) -> Option<&MapId> {
        (**self).map_id()
    }

    fn agent_position(&self) -> Option<Vec2Fixed> {
        (**self).agent_position()
    }

    fn entity_position(&self, entity: EntityId) -> Option<Vec2Fixed> {
        (**self).entity_position(entity)
    }
}
