//! Non-owning entity lists for interactive previews.
//!
//! A [`Preview`] holds plain ids into an [`EntityStore`]. It never deletes
//! anything; ids whose entity is gone are skipped by every query.

use tracing::debug;

use crate::entity::{EntityId, Hit, Nearest, ResolveLevel};
use crate::math::{Aabb, Point2, MAX_COORD};
use crate::render::Painter;
use crate::store::EntityStore;

/// Preview parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewOptions {
    /// Entities beyond this count are refused.
    pub max_entities: usize,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self { max_entities: 100 }
    }
}

/// A bounded, non-owning list of entities shown as a preview.
#[derive(Debug, Clone, Default)]
pub struct Preview {
    options: PreviewOptions,
    entities: Vec<EntityId>,
}

impl Preview {
    #[must_use]
    pub fn new(options: PreviewOptions) -> Self {
        Self {
            options,
            entities: Vec::new(),
        }
    }

    #[must_use]
    pub fn options(&self) -> &PreviewOptions {
        &self.options
    }

    /// Adds `id` to the preview. Returns `false` if it is already listed or
    /// the preview is full.
    pub fn add(&mut self, id: EntityId) -> bool {
        if self.entities.contains(&id) {
            return false;
        }
        if self.entities.len() >= self.options.max_entities {
            debug!(max = self.options.max_entities, "preview full, entity not added");
            return false;
        }
        self.entities.push(id);
        true
    }

    /// Drops `id` from the list; the entity itself is untouched.
    pub fn remove(&mut self, id: EntityId) -> bool {
        let before = self.entities.len();
        self.entities.retain(|e| *e != id);
        self.entities.len() != before
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Listed ids in insertion order, stale ones included.
    #[must_use]
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// Forgets ids whose entity no longer exists. Returns how many went.
    pub fn retain_live(&mut self, store: &EntityStore) -> usize {
        let before = self.entities.len();
        self.entities.retain(|id| store.contains(*id));
        before - self.entities.len()
    }

    /// Bounds of the live, visible entities; the zero box if there are none.
    #[must_use]
    pub fn bounds(&self, store: &EntityStore) -> Aabb {
        let mut bounds = Aabb::empty();
        for &id in &self.entities {
            if let Some(data) = store.get(id) {
                if data.is_visible() && store.has_extent(id) {
                    bounds.include(&data.bounds());
                }
            }
        }
        bounds.sanitized()
    }

    #[must_use]
    pub fn nearest_endpoint(&self, store: &EntityStore, coord: &Point2) -> Option<Nearest> {
        store.fold_nearest(&self.entities, |id| store.nearest_endpoint(id, coord))
    }

    #[must_use]
    pub fn nearest_point_on_entity(
        &self,
        store: &EntityStore,
        coord: &Point2,
        on_entity: bool,
    ) -> Option<Nearest> {
        store.fold_nearest(&self.entities, |id| {
            store.nearest_point_on_entity(id, coord, on_entity)
        })
    }

    #[must_use]
    pub fn nearest_center(&self, store: &EntityStore, coord: &Point2) -> Option<Nearest> {
        store.fold_nearest(&self.entities, |id| store.nearest_center(id, coord))
    }

    #[must_use]
    pub fn nearest_middle(
        &self,
        store: &EntityStore,
        coord: &Point2,
        middle_points: usize,
    ) -> Option<Nearest> {
        store.fold_nearest(&self.entities, |id| {
            store.nearest_middle(id, coord, middle_points)
        })
    }

    #[must_use]
    pub fn nearest_dist(
        &self,
        store: &EntityStore,
        distance: f64,
        coord: &Point2,
    ) -> Option<Nearest> {
        store.fold_nearest(&self.entities, |id| store.nearest_dist(id, distance, coord))
    }

    #[must_use]
    pub fn nearest_ref(&self, store: &EntityStore, coord: &Point2) -> Option<Nearest> {
        store.fold_nearest(&self.entities, |id| store.nearest_ref(id, coord))
    }

    #[must_use]
    pub fn nearest_selected_ref(&self, store: &EntityStore, coord: &Point2) -> Option<Nearest> {
        store.fold_nearest(&self.entities, |id| store.nearest_selected_ref(id, coord))
    }

    /// The visible preview entity under `coord`; later entries win ties.
    #[must_use]
    pub fn nearest_entity(
        &self,
        store: &EntityStore,
        coord: &Point2,
        level: ResolveLevel,
    ) -> Option<Hit> {
        let hit = store.fold_hits(&self.entities, coord, level, MAX_COORD)?;
        store.is_visible(hit.entity).then_some(hit)
    }

    /// Draws every live entry. Returns the number of lines drawn.
    pub fn draw(&self, store: &EntityStore, painter: &mut impl Painter) -> usize {
        self.entities.iter().map(|id| store.draw(*id, painter)).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entity::{Container, EntityData, Line};

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn setup() -> (EntityStore, EntityId, Vec<EntityId>) {
        let mut store = EntityStore::new();
        let root = store.insert_root(EntityData::new(Container::new()));
        let ids = (0..3)
            .map(|i| {
                let x = f64::from(i) * 10.0;
                store
                    .add_entity(root, EntityData::new(Line::new(p(x, 0.0), p(x + 1.0, 0.0))))
                    .unwrap()
            })
            .collect();
        (store, root, ids)
    }

    #[test]
    fn capacity_and_duplicates() {
        let (_, _, ids) = setup();
        let mut preview = Preview::new(PreviewOptions { max_entities: 2 });
        assert!(preview.add(ids[0]));
        assert!(!preview.add(ids[0]));
        assert!(preview.add(ids[1]));
        assert!(!preview.add(ids[2]));
        assert_eq!(preview.count(), 2);
        assert!(preview.remove(ids[0]));
        assert!(!preview.remove(ids[0]));
        preview.clear();
        assert!(preview.is_empty());
    }

    #[test]
    fn stale_ids_are_skipped() {
        let (mut store, _, ids) = setup();
        let mut preview = Preview::default();
        for id in &ids {
            preview.add(*id);
        }
        store.delete_entity(ids[0]).unwrap();

        let found = preview.nearest_endpoint(&store, &p(0.0, 0.0)).unwrap();
        assert_eq!(found.entity, ids[1]);
        assert_eq!(
            preview.bounds(&store),
            Aabb::new(p(10.0, 0.0), p(21.0, 0.0))
        );
        let hit = preview.nearest_entity(&store, &p(0.0, 0.0), ResolveLevel::None).unwrap();
        assert_eq!(hit.entity, ids[1]);

        assert_eq!(preview.count(), 3);
        assert_eq!(preview.retain_live(&store), 1);
        assert_eq!(preview.entities(), &ids[1..]);
    }

    #[test]
    fn snap_queries_fan_out() {
        let (mut store, _, ids) = setup();
        let mut preview = Preview::default();
        for id in &ids {
            preview.add(*id);
        }
        let coord = p(10.4, 1.0);

        let center = preview.nearest_center(&store, &coord).unwrap();
        assert_eq!(center.entity, ids[1]);
        assert_eq!(center.point, p(10.5, 0.0));

        let middle = preview.nearest_middle(&store, &p(20.8, 0.0), 3).unwrap();
        assert_eq!(middle.entity, ids[2]);
        assert_eq!(middle.point, p(20.75, 0.0));

        let dist = preview.nearest_dist(&store, 0.25, &p(31.0, 0.0)).unwrap();
        assert_eq!(dist.entity, ids[2]);
        assert_eq!(dist.point, p(20.75, 0.0));

        assert!(preview.nearest_selected_ref(&store, &coord).is_none());
        store.set_selected(ids[2], true).unwrap();
        let selected = preview.nearest_selected_ref(&store, &coord).unwrap();
        assert_eq!(selected.entity, ids[2]);
        assert_eq!(selected.point, p(20.0, 0.0));
    }

    #[test]
    fn group_without_visible_lines_adds_no_bounds() {
        let (mut store, root, ids) = setup();
        let group = store.add_entity(root, EntityData::new(Container::new())).unwrap();
        let mut preview = Preview::default();
        preview.add(ids[1]);
        preview.add(group);
        assert_eq!(preview.bounds(&store), Aabb::new(p(10.0, 0.0), p(11.0, 0.0)));
    }

    #[test]
    fn preview_never_deletes() {
        let (store, _, ids) = setup();
        let mut preview = Preview::default();
        preview.add(ids[2]);
        preview.clear();
        assert!(store.contains(ids[2]));
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn empty_preview_answers_nothing() {
        let (store, _, _) = setup();
        let preview = Preview::default();
        assert!(preview.nearest_ref(&store, &p(0.0, 0.0)).is_none());
        assert!(preview.nearest_point_on_entity(&store, &p(0.0, 0.0), true).is_none());
        assert_eq!(preview.bounds(&store), Aabb::zero());
    }
}
