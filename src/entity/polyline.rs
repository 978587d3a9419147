use super::{Container, EntityId};
use crate::math::{Point2, TOLERANCE};

/// Shape of the segment that leaves a polyline vertex.
///
/// Only straight segments can be built today; `Arc` is where bulged
/// segments plug in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentShape {
    /// A straight line to the next vertex.
    Straight,
    /// A circular arc to the next vertex, `bulge = tan(sweep / 4)`.
    Arc { bulge: f64 },
}

impl SegmentShape {
    /// Classifies a bulge factor; magnitudes below `TOLERANCE` are straight.
    #[must_use]
    pub fn from_bulge(bulge: f64) -> Self {
        if bulge.abs() < TOLERANCE {
            Self::Straight
        } else {
            Self::Arc { bulge }
        }
    }
}

/// Lifecycle state of a polyline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolylineState {
    /// No vertex yet.
    Empty,
    /// At least one vertex, no closing segment.
    Open,
    /// Closed: a closing segment joins the last vertex to the first
    /// (once there are at least two vertices).
    Closed,
}

/// A connected chain of line segments with shared endpoints.
///
/// `start_point`/`end_point` always match the first/last non-closing
/// segment. Segments are added and removed only through the vertex API on
/// [`EntityStore`](crate::store::EntityStore), which keeps that invariant.
#[derive(Debug, Default, PartialEq)]
pub struct Polyline {
    pub(crate) start_point: Option<Point2>,
    pub(crate) end_point: Option<Point2>,
    pub(crate) closed: bool,
    pub(crate) next_bulge: f64,
    pub(crate) closing: Option<EntityId>,
    pub(crate) segments: Container,
}

impl Polyline {
    /// Creates an empty polyline; a closed one gets its closing segment once
    /// it has two vertices.
    #[must_use]
    pub fn new(closed: bool) -> Self {
        Self {
            closed,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn start_point(&self) -> Option<Point2> {
        self.start_point
    }

    #[must_use]
    pub fn end_point(&self) -> Option<Point2> {
        self.end_point
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Bulge applied to the next segment created.
    #[must_use]
    pub fn next_bulge(&self) -> f64 {
        self.next_bulge
    }

    /// The synthetic segment closing the loop, if present.
    #[must_use]
    pub fn closing_segment(&self) -> Option<EntityId> {
        self.closing
    }

    /// All segments in order, closing segment included.
    #[must_use]
    pub fn segments(&self) -> &[EntityId] {
        self.segments.children()
    }

    /// Segments excluding the closing one.
    pub fn vertex_segments(&self) -> impl Iterator<Item = EntityId> + '_ {
        let closing = self.closing;
        self.segments
            .children()
            .iter()
            .copied()
            .filter(move |s| Some(*s) != closing)
    }

    #[must_use]
    pub fn state(&self) -> PolylineState {
        match (self.start_point, self.closed) {
            (None, _) => PolylineState::Empty,
            (Some(_), false) => PolylineState::Open,
            (Some(_), true) => PolylineState::Closed,
        }
    }

    pub(crate) fn map_markers(&mut self, f: &dyn Fn(&mut Point2)) {
        if let Some(p) = &mut self.start_point {
            f(p);
        }
        if let Some(p) = &mut self.end_point {
            f(p);
        }
    }

    pub(crate) fn swap_markers(&mut self) {
        std::mem::swap(&mut self.start_point, &mut self.end_point);
    }

    /// Back to [`PolylineState::Empty`], keeping the closed flag. Returns the
    /// former segments for the store to free.
    pub(crate) fn reset(&mut self) -> Vec<EntityId> {
        self.start_point = None;
        self.end_point = None;
        self.next_bulge = 0.0;
        self.closing = None;
        self.segments.take_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bulge_classification() {
        assert_eq!(SegmentShape::from_bulge(0.0), SegmentShape::Straight);
        assert_eq!(SegmentShape::from_bulge(1e-12), SegmentShape::Straight);
        assert_eq!(
            SegmentShape::from_bulge(-0.5),
            SegmentShape::Arc { bulge: -0.5 }
        );
    }

    #[test]
    fn state_follows_markers_and_flag() {
        let mut pl = Polyline::new(true);
        assert_eq!(pl.state(), PolylineState::Empty);
        pl.start_point = Some(Point2::origin());
        pl.end_point = Some(Point2::origin());
        assert_eq!(pl.state(), PolylineState::Closed);
        pl.closed = false;
        assert_eq!(pl.state(), PolylineState::Open);
    }

    #[test]
    fn markers_swap_and_map() {
        let mut pl = Polyline::new(false);
        pl.start_point = Some(Point2::new(1.0, 0.0));
        pl.end_point = Some(Point2::new(2.0, 0.0));
        pl.swap_markers();
        assert_eq!(pl.start_point(), Some(Point2::new(2.0, 0.0)));
        pl.map_markers(&|p: &mut Point2| p.y += 1.0);
        assert_eq!(pl.end_point(), Some(Point2::new(1.0, 1.0)));
    }
}
