//! The root of a drawing: an entity store, its top-level container and the
//! id counters of the geometry description.

use tracing::debug;

use crate::entity::{Container, EntityData, EntityId, Hit, Line, Polyline, ResolveLevel};
use crate::error::Result;
use crate::geo::{GeoOptions, GeoPoint, GeoWriter, IdAllocator};
use crate::math::{Aabb, Point2};
use crate::store::EntityStore;

/// A drawing document.
#[derive(Debug)]
pub struct Document {
    store: EntityStore,
    root: EntityId,
    points: IdAllocator,
    lines: IdAllocator,
    geo_options: GeoOptions,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::with_geo_options(GeoOptions::default())
    }

    #[must_use]
    pub fn with_geo_options(geo_options: GeoOptions) -> Self {
        let mut store = EntityStore::new();
        let root = store.insert_root(EntityData::new(Container::new()));
        Self {
            store,
            root,
            points: IdAllocator::new(),
            lines: IdAllocator::new(),
            geo_options,
        }
    }

    #[must_use]
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    /// The top-level container.
    #[must_use]
    pub fn root(&self) -> EntityId {
        self.root
    }

    #[must_use]
    pub fn geo_options(&self) -> &GeoOptions {
        &self.geo_options
    }

    /// Appends an entity to the top-level container.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::NotFound`](crate::error::EntityError) if the root
    /// was deleted through [`store_mut`](Self::store_mut).
    pub fn add_entity(&mut self, entity: EntityData) -> Result<EntityId> {
        Ok(self.store.add_entity(self.root, entity)?)
    }

    /// Appends a plain line.
    ///
    /// # Errors
    ///
    /// See [`add_entity`](Self::add_entity).
    pub fn add_line(&mut self, start: Point2, end: Point2) -> Result<EntityId> {
        self.add_entity(EntityData::new(Line::new(start, end)))
    }

    /// Appends a polyline through `vertices`.
    ///
    /// # Errors
    ///
    /// See [`add_entity`](Self::add_entity).
    pub fn add_polyline(&mut self, vertices: &[Point2], closed: bool) -> Result<EntityId> {
        let id = self.add_entity(EntityData::new(Polyline::new(closed)))?;
        let vertices: Vec<_> = vertices.iter().map(|v| (*v, 0.0)).collect();
        self.store.append_vertices(id, &vertices)?;
        Ok(id)
    }

    /// Numbers a new geometry point. Nothing is added to the drawing until a
    /// line uses it.
    pub fn add_geo_point(&mut self, position: Point2) -> GeoPoint {
        GeoPoint::new(self.points.allocate(), position)
    }

    /// Appends a line between two numbered points, with a fresh line id.
    ///
    /// # Errors
    ///
    /// See [`add_entity`](Self::add_entity).
    pub fn add_indexed_line(&mut self, start: &GeoPoint, end: &GeoPoint) -> Result<EntityId> {
        let id = self.lines.allocate();
        self.add_entity(EntityData::new(Line::indexed(id, start, end)))
    }

    /// Removes a top-level entity and deletes it.
    ///
    /// # Errors
    ///
    /// See [`add_entity`](Self::add_entity).
    pub fn remove(&mut self, id: EntityId) -> Result<bool> {
        let removed = self.store.remove_entity(self.root, id)?;
        debug!(?id, removed, "document remove");
        Ok(removed)
    }

    /// Number of top-level entities.
    #[must_use]
    pub fn count(&self) -> usize {
        self.store.count(self.root)
    }

    /// The visible top-level entity under `coord`, resolved per `level`.
    #[must_use]
    pub fn nearest_entity(&self, coord: &Point2, level: ResolveLevel) -> Option<Hit> {
        self.store.nearest_entity(self.root, coord, level)
    }

    /// Recomputes all cached bounds and returns the document's.
    pub fn calculate_borders(&mut self) -> Aabb {
        self.store.calculate_borders(self.root).unwrap_or_else(Aabb::zero)
    }

    /// Cached bounds of the document.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        self.store.bounds(self.root).unwrap_or_else(Aabb::zero)
    }

    /// The whole drawing as geometry-description text, using the document's
    /// export options.
    #[must_use]
    pub fn to_geo_string(&self) -> String {
        self.to_geo_string_with(&self.geo_options)
    }

    /// Same as [`to_geo_string`](Self::to_geo_string) with explicit options.
    ///
    /// Plain lines are numbered from copies of the document's counters, so
    /// exporting twice gives the same text.
    #[must_use]
    pub fn to_geo_string_with(&self, options: &GeoOptions) -> String {
        let mut writer = GeoWriter::new(*options, self.points.clone(), self.lines.clone());
        self.store.write_geo(self.root, &mut writer);
        writer.finish()
    }
}
