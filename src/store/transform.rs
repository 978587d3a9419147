use tracing::debug;

use super::EntityStore;
use crate::entity::{EntityId, EntityKind};
use crate::error::EntityError;
use crate::math::{Aabb, Point2, PointTransform, Vector2, REF_TOLERANCE, TOLERANCE};

impl EntityStore {
    /// Recomputes the cached bounds of `id` and its whole subtree.
    ///
    /// Lines use their endpoints. Containers and polylines fold the bounds of
    /// their visible children, skipping composites with no visible line
    /// below them. Axes that end up inverted or non-finite are reset to
    /// `0..0`. Returns the new bounds, or `None` for a missing entity.
    pub fn calculate_borders(&mut self, id: EntityId) -> Option<Aabb> {
        let children = self.get(id)?.kind.children().to_vec();
        for child in children {
            self.calculate_borders(child);
        }
        let bounds = self.own_bounds(id)?;
        self.entities.get_mut(id)?.bounds = bounds;
        Some(bounds)
    }

    /// Translates the entity and everything below it.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::NotFound`] if the entity is not in the store.
    pub fn move_by(&mut self, id: EntityId, offset: &Vector2) -> Result<(), EntityError> {
        self.transform(id, &|p: &mut Point2| p.move_by(offset))
    }

    /// Rotates the entity by `angle` radians about `center`.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::NotFound`] if the entity is not in the store.
    pub fn rotate(&mut self, id: EntityId, center: &Point2, angle: f64) -> Result<(), EntityError> {
        let angle_vector = Vector2::new(angle.cos(), angle.sin());
        self.transform(id, &|p: &mut Point2| p.rotate_by(center, &angle_vector))
    }

    /// Scales the entity about `center`.
    ///
    /// On a composite, a factor component below `TOLERANCE` in magnitude
    /// leaves everything untouched.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::NotFound`] if the entity is not in the store.
    pub fn scale(&mut self, id: EntityId, center: &Point2, factor: &Vector2) -> Result<(), EntityError> {
        if !self.entity(id)?.kind.is_atomic()
            && (factor.x.abs() < TOLERANCE || factor.y.abs() < TOLERANCE)
        {
            debug!(?id, ?factor, "degenerate scale factor ignored");
            return Ok(());
        }
        self.transform(id, &|p: &mut Point2| p.scale(center, factor))
    }

    /// Mirrors the entity about the axis through `axis1` and `axis2`.
    /// Coincident axis points leave it untouched.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::NotFound`] if the entity is not in the store.
    pub fn mirror(&mut self, id: EntityId, axis1: &Point2, axis2: &Point2) -> Result<(), EntityError> {
        self.transform(id, &|p: &mut Point2| p.mirror(axis1, axis2))
    }

    /// Moves every grip within `REF_TOLERANCE` of `reference` by `offset`.
    ///
    /// Lines follow [`Line::move_ref`](crate::entity::Line::move_ref);
    /// polylines additionally move matching start and end markers.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::NotFound`] if the entity is not in the store.
    pub fn move_ref(
        &mut self,
        id: EntityId,
        reference: &Point2,
        offset: &Vector2,
    ) -> Result<(), EntityError> {
        self.entity(id)?;
        self.move_ref_subtree(id, reference, offset);
        self.calculate_borders(id);
        self.refresh_parent(id);
        Ok(())
    }

    /// [`move_ref`](Self::move_ref) restricted to selected entities.
    ///
    /// The topmost selected entity on each branch moves as a whole; below an
    /// unselected polyline the markers are re-read from the moved segments.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::NotFound`] if the entity is not in the store.
    pub fn move_selected_ref(
        &mut self,
        id: EntityId,
        reference: &Point2,
        offset: &Vector2,
    ) -> Result<(), EntityError> {
        self.entity(id)?;
        self.move_selected_ref_subtree(id, reference, offset);
        self.calculate_borders(id);
        self.refresh_parent(id);
        Ok(())
    }

    /// Reverses the natural direction of the entity.
    ///
    /// Lines swap their endpoints. Composites reverse their child order and
    /// revert each child; a polyline also swaps its markers and keeps its
    /// closing segment last.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::NotFound`] if the entity is not in the store.
    pub fn revert_direction(&mut self, id: EntityId) -> Result<(), EntityError> {
        self.entity(id)?;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(data) = self.entities.get_mut(current) else {
                continue;
            };
            match &mut data.kind {
                EntityKind::Line(line) => line.revert_direction(),
                EntityKind::Container(container) => {
                    container.reverse();
                    stack.extend_from_slice(container.children());
                }
                EntityKind::Polyline(pl) => {
                    pl.segments.reverse();
                    pl.swap_markers();
                    if let Some(closing) = pl.closing {
                        pl.segments.move_to_back(closing);
                    }
                    stack.extend_from_slice(pl.segments.children());
                }
            }
        }
        Ok(())
    }

    /// Offsets a line perpendicular to itself towards `coord`.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::NotFound`] or [`EntityError::NotALine`] for a bad
    /// id, and [`GeometryError::ZeroVector`](crate::error::GeometryError) for
    /// a zero-length line.
    pub fn offset_line(
        &mut self,
        id: EntityId,
        coord: &Point2,
        distance: f64,
    ) -> crate::error::Result<()> {
        match &mut self.entity_mut(id)?.kind {
            EntityKind::Line(line) => line.offset(coord, distance)?,
            _ => return Err(EntityError::NotALine.into()),
        }
        self.calculate_borders(id);
        self.refresh_parent(id);
        Ok(())
    }

    /// Recomputes the bounds of `id` from its own geometry and the cached
    /// bounds of its children, then does the same for every ancestor.
    pub(crate) fn refresh_bounds(&mut self, id: EntityId) {
        let mut current = Some(id);
        while let Some(entity) = current {
            let Some(bounds) = self.own_bounds(entity) else {
                break;
            };
            if let Some(data) = self.entities.get_mut(entity) {
                data.bounds = bounds;
            }
            current = self.parent(entity);
        }
    }

    fn refresh_parent(&mut self, id: EntityId) {
        if let Some(parent) = self.parent(id) {
            self.refresh_bounds(parent);
        }
    }

    /// Bounds from cached child bounds, without recursing.
    fn own_bounds(&self, id: EntityId) -> Option<Aabb> {
        let data = self.get(id)?;
        if let EntityKind::Line(line) = &data.kind {
            return Some(line.bounds());
        }
        let mut bounds = Aabb::empty();
        for &child in data.kind.children() {
            if let Some(child_data) = self.get(child) {
                if child_data.visible && self.has_extent(child) {
                    bounds.include(&child_data.bounds);
                }
            }
        }
        Some(bounds.sanitized())
    }

    /// Whether the entity reaches at least one visible line below it. A
    /// composite without one has a placeholder box that must not be folded
    /// into its parent.
    pub(crate) fn has_extent(&self, id: EntityId) -> bool {
        match self.get(id).map(|d| &d.kind) {
            None => false,
            Some(EntityKind::Line(_)) => true,
            Some(kind) => kind
                .children()
                .iter()
                .any(|c| self.is_visible(*c) && self.has_extent(*c)),
        }
    }

    /// Applies `f` to every stored point of the subtree, then refreshes bounds
    /// from the subtree upwards.
    fn transform(&mut self, id: EntityId, f: &dyn Fn(&mut Point2)) -> Result<(), EntityError> {
        self.entity(id)?;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(data) = self.entities.get_mut(current) {
                data.kind.map_own_points(f);
                stack.extend_from_slice(data.kind.children());
            }
        }
        self.calculate_borders(id);
        self.refresh_parent(id);
        Ok(())
    }

    fn move_ref_subtree(&mut self, id: EntityId, reference: &Point2, offset: &Vector2) {
        let grip = |p: &mut Point2| {
            if (*p - reference).norm() < REF_TOLERANCE {
                p.move_by(offset);
            }
        };
        // Segments of a polyline only have vertex grips.
        let mut stack = vec![(id, false)];
        while let Some((current, in_polyline)) = stack.pop() {
            let Some(data) = self.entities.get_mut(current) else {
                continue;
            };
            match &mut data.kind {
                EntityKind::Line(line) if in_polyline => {
                    line.move_endpoint_refs(reference, offset);
                }
                EntityKind::Line(line) => line.move_ref(reference, offset),
                EntityKind::Polyline(pl) => {
                    pl.map_markers(&grip);
                    stack.extend(pl.segments.children().iter().map(|c| (*c, true)));
                }
                EntityKind::Container(container) => {
                    stack.extend(container.children().iter().map(|c| (*c, in_polyline)));
                }
            }
        }
    }

    fn move_selected_ref_subtree(&mut self, id: EntityId, reference: &Point2, offset: &Vector2) {
        let Some(data) = self.get(id) else {
            return;
        };
        if data.selected {
            self.move_ref_subtree(id, reference, offset);
            return;
        }
        let is_polyline = data.kind.as_polyline().is_some();
        for child in data.kind.children().to_vec() {
            self.move_selected_ref_subtree(child, reference, offset);
        }
        if is_polyline {
            self.sync_markers(id);
        }
    }
}
