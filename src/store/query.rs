use tracing::trace;

use super::EntityStore;
use crate::entity::{EntityId, EntityKind, Hit, Line, Nearest, ResolveLevel};
use crate::math::intersect_2d::segment_segment_intersect_2d;
use crate::math::polygon_2d::point_in_polygon_2d;
use crate::math::{Point2, VectorSolutions, MAX_COORD};

impl EntityStore {
    /// Nearest endpoint of any visible line in the subtree.
    ///
    /// A line's start wins ties against its end; across children the first
    /// one in draw order wins ties.
    #[must_use]
    pub fn nearest_endpoint(&self, id: EntityId, coord: &Point2) -> Option<Nearest> {
        match &self.get(id)?.kind {
            EntityKind::Line(line) => Some(nearest(id, line.nearest_endpoint(coord))),
            kind => self.fold_nearest(kind.children(), |c| self.nearest_endpoint(c, coord)),
        }
    }

    /// Orthogonal projection of `coord` onto the nearest visible line.
    ///
    /// With `on_entity`, projections past a line's ends fall back to the
    /// nearer endpoint.
    #[must_use]
    pub fn nearest_point_on_entity(
        &self,
        id: EntityId,
        coord: &Point2,
        on_entity: bool,
    ) -> Option<Nearest> {
        match &self.get(id)?.kind {
            EntityKind::Line(line) => {
                Some(nearest(id, line.nearest_point_on_entity(coord, on_entity)))
            }
            kind => self.fold_nearest(kind.children(), |c| {
                self.nearest_point_on_entity(c, coord, on_entity)
            }),
        }
    }

    /// Nearest line midpoint.
    #[must_use]
    pub fn nearest_center(&self, id: EntityId, coord: &Point2) -> Option<Nearest> {
        match &self.get(id)?.kind {
            EntityKind::Line(line) => Some(nearest(id, line.nearest_center(coord))),
            kind => self.fold_nearest(kind.children(), |c| self.nearest_center(c, coord)),
        }
    }

    /// Nearest of the `middle_points` interior division points of each line.
    #[must_use]
    pub fn nearest_middle(
        &self,
        id: EntityId,
        coord: &Point2,
        middle_points: usize,
    ) -> Option<Nearest> {
        match &self.get(id)?.kind {
            EntityKind::Line(line) => Some(nearest(id, line.nearest_middle(coord, middle_points))),
            kind => self.fold_nearest(kind.children(), |c| {
                self.nearest_middle(c, coord, middle_points)
            }),
        }
    }

    /// Point `distance` along a line from its endpoint nearer to `coord`.
    #[must_use]
    pub fn nearest_dist(&self, id: EntityId, distance: f64, coord: &Point2) -> Option<Nearest> {
        match &self.get(id)?.kind {
            EntityKind::Line(line) => Some(nearest(id, line.nearest_dist(distance, coord))),
            kind => self.fold_nearest(kind.children(), |c| self.nearest_dist(c, distance, coord)),
        }
    }

    /// Nearest grip point.
    ///
    /// A polyline answers from its own reference points and reports itself.
    #[must_use]
    pub fn nearest_ref(&self, id: EntityId, coord: &Point2) -> Option<Nearest> {
        match &self.get(id)?.kind {
            EntityKind::Line(line) => line.nearest_ref(coord).map(|found| nearest(id, found)),
            EntityKind::Polyline(_) => {
                self.ref_points(id).nearest(coord).map(|found| nearest(id, found))
            }
            EntityKind::Container(container) => {
                self.fold_nearest(container.children(), |c| self.nearest_ref(c, coord))
            }
        }
    }

    /// [`nearest_ref`](Self::nearest_ref) over selected entities only.
    ///
    /// An entity counts when it is selected and no ancestor is; its whole
    /// grip set is then considered.
    #[must_use]
    pub fn nearest_selected_ref(&self, id: EntityId, coord: &Point2) -> Option<Nearest> {
        let data = self.get(id)?;
        if data.selected && !self.is_parent_selected(id) {
            return self.nearest_ref(id, coord);
        }
        self.fold_nearest(data.kind.children(), |c| self.nearest_selected_ref(c, coord))
    }

    /// Grip points of the entity.
    ///
    /// Lines: start, middle, end. Polylines: the start marker, every segment
    /// end in order, then the end marker (which repeats the last segment
    /// end). Containers: their children's points in draw order.
    #[must_use]
    pub fn ref_points(&self, id: EntityId) -> VectorSolutions {
        let mut points = VectorSolutions::new();
        let Some(data) = self.get(id) else {
            return points;
        };
        match &data.kind {
            EntityKind::Line(line) => points = line.ref_points(),
            EntityKind::Polyline(pl) => {
                points.extend(pl.start_point());
                points.extend(pl.segments().iter().filter_map(|s| self.end_point(*s)));
                points.extend(pl.end_point());
            }
            EntityKind::Container(container) => {
                for child in container.children() {
                    points.extend_from(&self.ref_points(*child));
                }
            }
        }
        points
    }

    /// Distance from `coord` to the entity, for picking.
    ///
    /// Visible children are compared with `<=`, so the last one drawn wins a
    /// tie. With [`ResolveLevel::None`] the hit names the direct child, with
    /// [`ResolveLevel::All`] the deepest atomic entity. For a closed polyline
    /// containing `coord`, `solid_dist` caps the distance (pass
    /// [`MAX_COORD`] to ignore fills). Empty
    /// composites give `None`.
    #[must_use]
    pub fn distance_to_point(
        &self,
        id: EntityId,
        coord: &Point2,
        level: ResolveLevel,
        solid_dist: f64,
    ) -> Option<Hit> {
        let data = self.get(id)?;
        let children = match &data.kind {
            EntityKind::Line(line) => {
                return Some(Hit {
                    distance: line.distance_to_point(coord),
                    entity: id,
                });
            }
            kind => kind.children(),
        };

        let mut best = self.fold_hits(children, coord, level, solid_dist);
        trace!(?id, candidates = children.len(), "distance to point");

        if let (Some(hit), EntityKind::Polyline(pl)) = (best, &data.kind) {
            if pl.is_closed()
                && solid_dist < hit.distance
                && point_in_polygon_2d(coord, &self.polyline_vertices(id))
            {
                best = Some(Hit {
                    distance: solid_dist,
                    entity: id,
                });
            }
        }
        best
    }

    /// The visible entity under `coord`, resolved per `level`.
    #[must_use]
    pub fn nearest_entity(&self, id: EntityId, coord: &Point2, level: ResolveLevel) -> Option<Hit> {
        let hit = self.distance_to_point(id, coord, level, MAX_COORD)?;
        self.is_visible(hit.entity).then_some(hit)
    }

    /// Nearest crossing between two visible lines of the subtree.
    ///
    /// Only bounded crossings count; parallel and overlapping lines are
    /// skipped. The reported entity is the earlier line of the pair.
    #[must_use]
    pub fn nearest_intersection(&self, id: EntityId, coord: &Point2) -> Option<Nearest> {
        let mut lines = Vec::new();
        self.collect_visible_lines(id, &mut lines);
        trace!(?id, lines = lines.len(), "intersection candidates");

        let mut best: Option<Nearest> = None;
        for (i, (first_id, first)) in lines.iter().enumerate() {
            for (_, second) in &lines[i + 1..] {
                let Some(point) = segment_segment_intersect_2d(
                    &first.start_point(),
                    &first.end_point(),
                    &second.start_point(),
                    &second.end_point(),
                ) else {
                    continue;
                };
                let distance = (point - coord).norm();
                if best.map_or(true, |b| distance < b.distance) {
                    best = Some(Nearest {
                        point,
                        distance,
                        entity: *first_id,
                    });
                }
            }
        }
        best
    }

    /// Corner points of a polyline: the start marker and every vertex
    /// segment end.
    #[must_use]
    pub fn polyline_vertices(&self, id: EntityId) -> Vec<Point2> {
        let Some(pl) = self.polyline(id) else {
            return Vec::new();
        };
        pl.start_point()
            .into_iter()
            .chain(pl.vertex_segments().filter_map(|s| self.end_point(s)))
            .collect()
    }

    /// Folds a per-child query over `ids`: invisible children are skipped,
    /// a strictly smaller distance replaces the current best.
    pub(crate) fn fold_nearest(
        &self,
        ids: &[EntityId],
        mut query: impl FnMut(EntityId) -> Option<Nearest>,
    ) -> Option<Nearest> {
        let mut best: Option<Nearest> = None;
        for &id in ids {
            if !self.is_visible(id) {
                continue;
            }
            if let Some(candidate) = query(id) {
                if best.map_or(true, |b| candidate.distance < b.distance) {
                    best = Some(candidate);
                }
            }
        }
        best
    }

    /// Folds `distance_to_point` over `ids`: invisible children are skipped,
    /// an equal or smaller distance replaces the current best.
    pub(crate) fn fold_hits(
        &self,
        ids: &[EntityId],
        coord: &Point2,
        level: ResolveLevel,
        solid_dist: f64,
    ) -> Option<Hit> {
        let mut best: Option<Hit> = None;
        for &child in ids {
            if !self.is_visible(child) {
                continue;
            }
            let Some(hit) = self.distance_to_point(child, coord, level, solid_dist) else {
                continue;
            };
            if best.map_or(true, |b| hit.distance <= b.distance) {
                let entity = match level {
                    ResolveLevel::None => child,
                    ResolveLevel::All => hit.entity,
                };
                best = Some(Hit {
                    distance: hit.distance,
                    entity,
                });
            }
        }
        best
    }

    fn collect_visible_lines<'a>(&'a self, id: EntityId, out: &mut Vec<(EntityId, &'a Line)>) {
        let Some(data) = self.get(id) else {
            return;
        };
        if !data.visible {
            return;
        }
        match &data.kind {
            EntityKind::Line(line) => out.push((id, line)),
            kind => {
                for &child in kind.children() {
                    self.collect_visible_lines(child, out);
                }
            }
        }
    }
}

fn nearest(entity: EntityId, (point, distance): (Point2, f64)) -> Nearest {
    Nearest {
        point,
        distance,
        entity,
    }
}
