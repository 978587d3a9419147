use tracing::{debug, warn};

use super::EntityStore;
use crate::entity::{Container, EntityData, EntityId, EntityKind, EntityType};
use crate::error::EntityError;

/// Where a new child goes in its container's list.
#[derive(Debug, Clone, Copy)]
enum Placement {
    Back,
    Front,
    At(usize),
}

impl EntityStore {
    /// Appends a new entity to `container` and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::NotFound`] for a missing container,
    /// [`EntityError::NotAContainer`] for an atomic entity, and
    /// [`EntityError::PolylineChildren`] for a polyline (use the vertex API).
    pub fn add_entity(
        &mut self,
        container: EntityId,
        entity: EntityData,
    ) -> Result<EntityId, EntityError> {
        self.attach(container, entity, Placement::Back)
    }

    /// Same as [`add_entity`](Self::add_entity).
    ///
    /// # Errors
    ///
    /// See [`add_entity`](Self::add_entity).
    pub fn append_entity(
        &mut self,
        container: EntityId,
        entity: EntityData,
    ) -> Result<EntityId, EntityError> {
        self.attach(container, entity, Placement::Back)
    }

    /// Inserts a new entity at the front of `container` (drawn first).
    ///
    /// # Errors
    ///
    /// See [`add_entity`](Self::add_entity).
    pub fn prepend_entity(
        &mut self,
        container: EntityId,
        entity: EntityData,
    ) -> Result<EntityId, EntityError> {
        self.attach(container, entity, Placement::Front)
    }

    /// Inserts a new entity at `index`, clamped to the end of the list.
    ///
    /// # Errors
    ///
    /// See [`add_entity`](Self::add_entity).
    pub fn insert_entity(
        &mut self,
        container: EntityId,
        index: usize,
        entity: EntityData,
    ) -> Result<EntityId, EntityError> {
        self.attach(container, entity, Placement::At(index))
    }

    /// Moves existing children so they sit, in `list` order, before the child
    /// currently at `index` (`0` = front, `>= count` = back).
    ///
    /// Ids that are not children of `container` are ignored. Returns the ids
    /// actually moved.
    ///
    /// # Errors
    ///
    /// See [`add_entity`](Self::add_entity).
    pub fn move_entities(
        &mut self,
        container: EntityId,
        index: usize,
        list: &[EntityId],
    ) -> Result<Vec<EntityId>, EntityError> {
        Ok(self.plain_container_mut(container)?.move_entities(index, list))
    }

    /// Removes `entity` from `container` and deletes its subtree.
    ///
    /// Returns `false` if `entity` is not a child of `container`.
    ///
    /// # Errors
    ///
    /// See [`add_entity`](Self::add_entity).
    pub fn remove_entity(
        &mut self,
        container: EntityId,
        entity: EntityId,
    ) -> Result<bool, EntityError> {
        if !self.plain_container_mut(container)?.remove(entity) {
            return Ok(false);
        }
        let freed = self.free_subtree(entity);
        debug!(?entity, freed, "removed entity");
        self.refresh_bounds(container);
        Ok(true)
    }

    /// Deletes every child of `container`. Returns the number of entities freed.
    ///
    /// Clearing a polyline resets it to the empty state.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::NotFound`] for a missing container and
    /// [`EntityError::NotAContainer`] for an atomic entity.
    pub fn clear(&mut self, container: EntityId) -> Result<usize, EntityError> {
        let children = match &mut self.entity_mut(container)?.kind {
            EntityKind::Container(c) => c.take_all(),
            EntityKind::Polyline(p) => p.reset(),
            EntityKind::Line(_) => return Err(EntityError::NotAContainer(EntityType::Line)),
        };
        let freed = children.into_iter().map(|c| self.free_subtree(c)).sum();
        self.refresh_bounds(container);
        Ok(freed)
    }

    /// Number of direct children.
    #[must_use]
    pub fn count(&self, container: EntityId) -> usize {
        self.children(container).len()
    }

    #[must_use]
    pub fn first(&self, container: EntityId) -> Option<EntityId> {
        self.children(container).first().copied()
    }

    #[must_use]
    pub fn last(&self, container: EntityId) -> Option<EntityId> {
        self.children(container).last().copied()
    }

    /// The child list of a plain container. Polylines are refused so their
    /// segments stay in step with the vertex markers.
    pub(crate) fn plain_container_mut(
        &mut self,
        id: EntityId,
    ) -> Result<&mut Container, EntityError> {
        match &mut self.entity_mut(id)?.kind {
            EntityKind::Container(c) => Ok(c),
            EntityKind::Polyline(_) => {
                warn!(?id, "polyline segments can only be changed through the vertex API");
                Err(EntityError::PolylineChildren)
            }
            kind @ EntityKind::Line(_) => Err(EntityError::NotAContainer(kind.rtti())),
        }
    }

    fn attach(
        &mut self,
        container: EntityId,
        entity: EntityData,
        placement: Placement,
    ) -> Result<EntityId, EntityError> {
        self.plain_container_mut(container)?;
        let id = self.insert_child(container, entity);
        let list = self.plain_container_mut(container)?;
        match placement {
            Placement::Back => list.push(id),
            Placement::Front => list.prepend(id),
            Placement::At(index) => list.insert(index, id),
        }
        self.refresh_bounds(container);
        Ok(id)
    }
}
