use tracing::warn;

use super::EntityStore;
use crate::entity::{EntityData, EntityId, EntityKind, Line, Polyline, SegmentShape};
use crate::error::EntityError;
use crate::math::Point2;

impl EntityStore {
    /// Adds a vertex to the polyline.
    ///
    /// The first vertex only sets the start and end markers. Each later vertex
    /// creates a segment from the current end (or, with `prepend`, from the
    /// new point to the current start). `bulge` applies to the segment that
    /// the next vertex will create. While the polyline is closed the closing
    /// segment is rebuilt afterwards.
    ///
    /// Returns the new segment, if one was created.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::NotAPolyline`] if `polyline` is not a polyline,
    /// or [`EntityError::ArcSegmentUnsupported`] for a non-zero bulge.
    pub fn add_vertex(
        &mut self,
        polyline: EntityId,
        point: Point2,
        bulge: f64,
        prepend: bool,
    ) -> Result<Option<EntityId>, EntityError> {
        let segment = self.push_vertex(polyline, point, bulge, prepend)?;
        self.end_polyline(polyline)?;
        Ok(segment)
    }

    /// Appends several vertices, rebuilding the closing segment once at the end.
    ///
    /// Every bulge is checked before anything is added. Returns the number of
    /// segments created.
    ///
    /// # Errors
    ///
    /// See [`add_vertex`](Self::add_vertex).
    pub fn append_vertices(
        &mut self,
        polyline: EntityId,
        vertices: &[(Point2, f64)],
    ) -> Result<usize, EntityError> {
        self.polyline_mut(polyline)?;
        for &(_, bulge) in vertices {
            check_shape(polyline, SegmentShape::from_bulge(bulge))?;
        }
        let mut created = 0;
        for &(point, bulge) in vertices {
            if self.push_vertex(polyline, point, bulge, false)?.is_some() {
                created += 1;
            }
        }
        self.end_polyline(polyline)?;
        Ok(created)
    }

    /// Removes the last vertex segment and moves the end marker back to the
    /// new last segment's end, or to the start when no segment is left.
    ///
    /// Returns `false` if the polyline had no segment to remove.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::NotAPolyline`] if `polyline` is not a polyline,
    /// or [`EntityError::NonAtomicSegment`] if the remaining last segment is
    /// not a line.
    pub fn remove_last_vertex(&mut self, polyline: EntityId) -> Result<bool, EntityError> {
        self.detach_closing(polyline)?;
        let pl = self.polyline_mut(polyline)?;
        let start = pl.start_point;
        let (last, previous) = match pl.segments.children() {
            [] => return Ok(false),
            [.., previous, last] => (*last, Some(*previous)),
            [last] => (*last, None),
        };

        let new_end = match previous {
            Some(previous) => match self.line(previous) {
                Some(line) => Some(line.end_point()),
                None => {
                    warn!(?polyline, segment = ?previous, "polyline segment is not a line");
                    self.end_polyline(polyline)?;
                    return Err(EntityError::NonAtomicSegment);
                }
            },
            None => start,
        };

        let pl = self.polyline_mut(polyline)?;
        pl.segments.remove(last);
        pl.end_point = new_end;
        self.free_subtree(last);
        self.end_polyline(polyline)?;
        Ok(true)
    }

    /// Opens or closes the polyline.
    ///
    /// Closing adds the closing segment (if there is at least one segment);
    /// opening removes it. Both directions are idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::NotAPolyline`] if `polyline` is not a polyline.
    pub fn set_closed(&mut self, polyline: EntityId, closed: bool) -> Result<(), EntityError> {
        self.polyline_mut(polyline)?.closed = closed;
        if closed {
            self.end_polyline(polyline)?;
        } else {
            self.detach_closing(polyline)?;
            self.refresh_bounds(polyline);
        }
        Ok(())
    }

    /// [`set_closed`](Self::set_closed) with a bulge for the closing segment.
    ///
    /// # Errors
    ///
    /// See [`add_vertex`](Self::add_vertex).
    pub fn set_closed_with_bulge(
        &mut self,
        polyline: EntityId,
        closed: bool,
        bulge: f64,
    ) -> Result<(), EntityError> {
        self.polyline_mut(polyline)?;
        check_shape(polyline, SegmentShape::from_bulge(bulge))?;
        self.polyline_mut(polyline)?.next_bulge = bulge;
        self.set_closed(polyline, closed)
    }

    /// Rebuilds the closing segment of a closed polyline and recomputes bounds.
    ///
    /// Any previous closing segment is removed first. Returns the new closing
    /// segment, if one was created.
    ///
    /// # Errors
    ///
    /// See [`add_vertex`](Self::add_vertex).
    pub fn end_polyline(&mut self, polyline: EntityId) -> Result<Option<EntityId>, EntityError> {
        self.detach_closing(polyline)?;
        let pl = self.polyline_mut(polyline)?;
        let ends = match (pl.closed, pl.start_point, pl.end_point) {
            (true, Some(start), Some(end)) if !pl.segments.is_empty() => Some((end, start)),
            _ => None,
        };
        let shape = SegmentShape::from_bulge(pl.next_bulge);

        let closing = match ends {
            Some((from, to)) => {
                let line = segment_between(polyline, shape, from, to)?;
                let segment = self.insert_child(polyline, EntityData::new(line));
                let pl = self.polyline_mut(polyline)?;
                pl.segments.push(segment);
                pl.closing = Some(segment);
                Some(segment)
            }
            None => None,
        };
        self.refresh_bounds(polyline);
        Ok(closing)
    }

    pub(crate) fn polyline_mut(&mut self, id: EntityId) -> Result<&mut Polyline, EntityError> {
        match &mut self.entity_mut(id)?.kind {
            EntityKind::Polyline(p) => Ok(p),
            _ => Err(EntityError::NotAPolyline),
        }
    }

    /// Re-reads the start and end markers from the first and last vertex
    /// segments after their points were moved one by one.
    pub(crate) fn sync_markers(&mut self, polyline: EntityId) {
        let Some(pl) = self.polyline(polyline) else {
            return;
        };
        let start = pl.vertex_segments().next().and_then(|s| self.start_point(s));
        let end = pl.vertex_segments().last().and_then(|s| self.end_point(s));
        if let Ok(pl) = self.polyline_mut(polyline) {
            if start.is_some() {
                pl.start_point = start;
            }
            if end.is_some() {
                pl.end_point = end;
            }
        }
    }

    fn push_vertex(
        &mut self,
        polyline: EntityId,
        point: Point2,
        bulge: f64,
        prepend: bool,
    ) -> Result<Option<EntityId>, EntityError> {
        check_shape(polyline, SegmentShape::from_bulge(bulge))?;
        let pl = self.polyline_mut(polyline)?;
        let (Some(start), Some(end)) = (pl.start_point, pl.end_point) else {
            pl.start_point = Some(point);
            pl.end_point = Some(point);
            pl.next_bulge = bulge;
            return Ok(None);
        };
        let shape = SegmentShape::from_bulge(pl.next_bulge);
        let line = if prepend {
            segment_between(polyline, shape, point, start)?
        } else {
            segment_between(polyline, shape, end, point)?
        };

        let segment = self.insert_child(polyline, EntityData::new(line));
        let pl = self.polyline_mut(polyline)?;
        pl.next_bulge = bulge;
        if prepend {
            pl.segments.prepend(segment);
            pl.start_point = Some(point);
        } else {
            pl.segments.push(segment);
            pl.end_point = Some(point);
        }
        Ok(Some(segment))
    }

    /// Removes and frees the closing segment, if present.
    fn detach_closing(&mut self, polyline: EntityId) -> Result<bool, EntityError> {
        let pl = self.polyline_mut(polyline)?;
        let Some(closing) = pl.closing.take() else {
            return Ok(false);
        };
        pl.segments.remove(closing);
        self.free_subtree(closing);
        Ok(true)
    }
}

fn check_shape(polyline: EntityId, shape: SegmentShape) -> Result<(), EntityError> {
    match shape {
        SegmentShape::Straight => Ok(()),
        SegmentShape::Arc { bulge } => {
            warn!(?polyline, bulge, "arc segments are not supported");
            Err(EntityError::ArcSegmentUnsupported { bulge })
        }
    }
}

fn segment_between(
    polyline: EntityId,
    shape: SegmentShape,
    from: Point2,
    to: Point2,
) -> Result<Line, EntityError> {
    check_shape(polyline, shape)?;
    Ok(Line::new(from, to))
}
