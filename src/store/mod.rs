//! Arena owning every entity of a drawing.
//!
//! Containers list their children by [`EntityId`]; each child records its
//! owning container as a plain key. Deleting a container deletes its whole
//! subtree, and a stale key simply resolves to nothing afterwards.

mod container;
mod polyline;
mod query;
mod transform;

use slotmap::SlotMap;
use tracing::debug;

use crate::entity::{EntityData, EntityId, EntityKind, EntityType, Line, Polyline};
use crate::error::EntityError;
use crate::math::{Aabb, Point2};

/// Central arena that owns all entities.
///
/// Entities reference each other via typed IDs (generational indices),
/// avoiding self-referential structures and enabling safe mutation.
#[derive(Debug, Default)]
pub struct EntityStore {
    entities: SlotMap<EntityId, EntityData>,
}

impl EntityStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entities, at every depth.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Inserts an entity with no owning container and returns its ID.
    pub fn insert_root(&mut self, entity: EntityData) -> EntityId {
        let id = self.entities.insert(EntityData {
            parent: None,
            ..entity
        });
        self.calculate_borders(id);
        id
    }

    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EntityData> {
        self.entities.get(id)
    }

    /// Returns the entity data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::NotFound`] if the entity is not in the store.
    pub fn entity(&self, id: EntityId) -> Result<&EntityData, EntityError> {
        self.entities.get(id).ok_or(EntityError::NotFound)
    }

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> Result<&mut EntityData, EntityError> {
        self.entities.get_mut(id).ok_or(EntityError::NotFound)
    }

    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Iterates over every live entity, in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &EntityData)> {
        self.entities.iter()
    }

    #[must_use]
    pub fn rtti(&self, id: EntityId) -> Option<EntityType> {
        self.get(id).map(EntityData::rtti)
    }

    #[must_use]
    pub fn parent(&self, id: EntityId) -> Option<EntityId> {
        self.get(id).and_then(EntityData::parent)
    }

    #[must_use]
    pub fn line(&self, id: EntityId) -> Option<&Line> {
        self.get(id).and_then(|e| e.kind.as_line())
    }

    #[must_use]
    pub fn polyline(&self, id: EntityId) -> Option<&Polyline> {
        self.get(id).and_then(|e| e.kind.as_polyline())
    }

    /// Children in draw order; empty for atomic or missing entities.
    #[must_use]
    pub fn children(&self, id: EntityId) -> &[EntityId] {
        match self.get(id) {
            Some(data) => data.kind.children(),
            None => &[],
        }
    }

    /// Cached bounds of the entity.
    #[must_use]
    pub fn bounds(&self, id: EntityId) -> Option<Aabb> {
        self.get(id).map(EntityData::bounds)
    }

    /// First point of the entity's natural direction.
    #[must_use]
    pub fn start_point(&self, id: EntityId) -> Option<Point2> {
        match &self.get(id)?.kind {
            EntityKind::Line(l) => Some(l.start_point()),
            EntityKind::Polyline(p) => p.start_point(),
            EntityKind::Container(_) => None,
        }
    }

    /// Last point of the entity's natural direction.
    #[must_use]
    pub fn end_point(&self, id: EntityId) -> Option<Point2> {
        match &self.get(id)?.kind {
            EntityKind::Line(l) => Some(l.end_point()),
            EntityKind::Polyline(p) => p.end_point(),
            EntityKind::Container(_) => None,
        }
    }

    /// `false` for invisible and for missing entities.
    #[must_use]
    pub fn is_visible(&self, id: EntityId) -> bool {
        self.get(id).is_some_and(EntityData::is_visible)
    }

    /// Shows or hides the entity and refreshes the cached bounds above it.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::NotFound`] if the entity is not in the store.
    pub fn set_visible(&mut self, id: EntityId, visible: bool) -> Result<(), EntityError> {
        let data = self.entity_mut(id)?;
        data.visible = visible;
        if let Some(parent) = data.parent {
            self.refresh_bounds(parent);
        }
        Ok(())
    }

    #[must_use]
    pub fn is_selected(&self, id: EntityId) -> bool {
        self.get(id).is_some_and(EntityData::is_selected)
    }

    /// Selects or deselects the entity and its whole subtree.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::NotFound`] if the entity is not in the store.
    pub fn set_selected(&mut self, id: EntityId, selected: bool) -> Result<(), EntityError> {
        self.entity(id)?;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(data) = self.entities.get_mut(current) {
                data.selected = selected;
                stack.extend_from_slice(data.kind.children());
            }
        }
        Ok(())
    }

    /// Returns `true` if any ancestor of the entity is selected.
    #[must_use]
    pub fn is_parent_selected(&self, id: EntityId) -> bool {
        let mut current = self.parent(id);
        while let Some(parent) = current {
            if self.is_selected(parent) {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }

    /// Number of selected entities in the subtree, the root included.
    #[must_use]
    pub fn selected_count(&self, id: EntityId) -> usize {
        let mut count = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(data) = self.get(current) {
                if data.selected {
                    count += 1;
                }
                stack.extend_from_slice(data.kind.children());
            }
        }
        count
    }

    /// Detaches the entity from its owning container and deletes it with its
    /// whole subtree. Returns the number of entities freed.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::NotFound`] if the entity is not in the store,
    /// or [`EntityError::PolylineChildren`] for a polyline segment.
    pub fn delete_entity(&mut self, id: EntityId) -> Result<usize, EntityError> {
        let parent = self.entity(id)?.parent;
        if let Some(parent) = parent {
            self.plain_container_mut(parent)?.remove(id);
        }
        let freed = self.free_subtree(id);
        if let Some(parent) = parent {
            self.refresh_bounds(parent);
        }
        Ok(freed)
    }

    /// Removes `id` and every descendant from the arena.
    pub(crate) fn free_subtree(&mut self, id: EntityId) -> usize {
        let mut freed = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(data) = self.entities.remove(current) {
                freed += 1;
                stack.extend_from_slice(data.kind.children());
            }
        }
        debug!(freed, "freed entity subtree");
        freed
    }

    /// Inserts `entity` owned by `parent`, without touching the parent's list.
    pub(crate) fn insert_child(&mut self, parent: EntityId, entity: EntityData) -> EntityId {
        let id = self.entities.insert(EntityData {
            parent: Some(parent),
            ..entity
        });
        self.calculate_borders(id);
        id
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entity::Container;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn root_insert_and_lookup() {
        let mut store = EntityStore::new();
        let id = store.insert_root(EntityData::new(Line::new(p(0.0, 0.0), p(2.0, 1.0))));
        assert_eq!(store.len(), 1);
        assert_eq!(store.rtti(id), Some(EntityType::Line));
        assert_eq!(store.parent(id), None);
        assert_eq!(store.start_point(id), Some(p(0.0, 0.0)));
        assert_eq!(store.end_point(id), Some(p(2.0, 1.0)));
        assert_eq!(store.bounds(id), Some(Aabb::new(p(0.0, 0.0), p(2.0, 1.0))));
        assert!(store.children(id).is_empty());
    }

    #[test]
    fn selection_propagates_to_subtree() {
        let mut store = EntityStore::new();
        let root = store.insert_root(EntityData::new(Container::new()));
        let group = store.add_entity(root, EntityData::new(Container::new())).unwrap();
        let line = store
            .add_entity(group, EntityData::new(Line::new(p(0.0, 0.0), p(1.0, 0.0))))
            .unwrap();

        store.set_selected(group, true).unwrap();
        assert!(store.is_selected(line));
        assert!(store.is_parent_selected(line));
        assert!(!store.is_parent_selected(group));
        assert_eq!(store.selected_count(root), 2);

        store.set_selected(root, false).unwrap();
        assert_eq!(store.selected_count(root), 0);
    }

    #[test]
    fn delete_frees_subtree_and_detaches() {
        let mut store = EntityStore::new();
        let root = store.insert_root(EntityData::new(Container::new()));
        let group = store.add_entity(root, EntityData::new(Container::new())).unwrap();
        for i in 0..3 {
            let x = f64::from(i);
            store
                .add_entity(group, EntityData::new(Line::new(p(x, 0.0), p(x, 1.0))))
                .unwrap();
        }
        assert_eq!(store.len(), 5);

        assert_eq!(store.delete_entity(group).unwrap(), 4);
        assert_eq!(store.len(), 1);
        assert!(store.children(root).is_empty());
        assert_eq!(store.delete_entity(group), Err(EntityError::NotFound));
    }

    #[test]
    fn missing_entity_is_invisible_and_unselected() {
        let mut store = EntityStore::new();
        let id = store.insert_root(EntityData::new(Container::new()));
        store.delete_entity(id).unwrap();
        assert!(!store.is_visible(id));
        assert!(!store.is_selected(id));
        assert_eq!(store.set_visible(id, true), Err(EntityError::NotFound));
    }
}
