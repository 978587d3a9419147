use crate::error::GeometryError;
use crate::geo::{line_record, GeoPoint};
use crate::math::vector::{angle, polar};
use crate::math::{
    Aabb, Point2, PointTransform, Vector2, VectorSolutions, REF_TOLERANCE, TOLERANCE,
    TOLERANCE_SQUARED,
};

/// Geometry-kernel numbering of an indexed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineIndices {
    /// Line id in the exported description.
    pub id: u32,
    /// Index of the start point.
    pub start: u32,
    /// Index of the end point.
    pub end: u32,
}

/// A straight segment between two points.
///
/// Zero-length lines are valid values: queries treat them as their midpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    start: Point2,
    end: Point2,
    indices: Option<LineIndices>,
}

impl Line {
    /// Creates a line from raw coordinates.
    #[must_use]
    pub fn new(start: Point2, end: Point2) -> Self {
        Self {
            start,
            end,
            indices: None,
        }
    }

    /// Creates a line between two numbered geometry points, carrying line `id`.
    #[must_use]
    pub fn indexed(id: u32, start: &GeoPoint, end: &GeoPoint) -> Self {
        Self {
            start: start.position,
            end: end.position,
            indices: Some(LineIndices {
                id,
                start: start.index,
                end: end.index,
            }),
        }
    }

    #[must_use]
    pub fn start_point(&self) -> Point2 {
        self.start
    }

    #[must_use]
    pub fn end_point(&self) -> Point2 {
        self.end
    }

    #[must_use]
    pub fn indices(&self) -> Option<LineIndices> {
        self.indices
    }

    #[must_use]
    pub fn middle_point(&self) -> Point2 {
        nalgebra::center(&self.start, &self.end)
    }

    /// Vector from start to end.
    #[must_use]
    pub fn direction(&self) -> Vector2 {
        self.end - self.start
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.direction().norm()
    }

    /// Direction angle from start to end, in radians.
    #[must_use]
    pub fn angle(&self) -> f64 {
        angle(&self.direction())
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.direction().norm_squared() < TOLERANCE_SQUARED
    }

    /// Bounds of the segment, reset to the origin if not finite.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(&self.start, &self.end).sanitized()
    }

    /// Start, middle and end point.
    #[must_use]
    pub fn ref_points(&self) -> VectorSolutions {
        [self.start, self.middle_point(), self.end]
            .into_iter()
            .collect()
    }

    /// The endpoint closer to `coord`, with its distance. Ties pick the start.
    #[must_use]
    pub fn nearest_endpoint(&self, coord: &Point2) -> (Point2, f64) {
        let d_start = (self.start - coord).norm_squared();
        let d_end = (self.end - coord).norm_squared();
        if d_end < d_start {
            (self.end, d_end.sqrt())
        } else {
            (self.start, d_start.sqrt())
        }
    }

    /// Projects `coord` onto the line.
    ///
    /// With `on_entity`, a projection beyond either end (outside
    /// `[-TOLERANCE, 1 + TOLERANCE]` in segment parameter) falls back to the
    /// nearest endpoint.
    #[must_use]
    pub fn nearest_point_on_entity(&self, coord: &Point2, on_entity: bool) -> (Point2, f64) {
        let direction = self.direction();
        let a = direction.norm_squared();
        let point = if a < TOLERANCE_SQUARED {
            self.middle_point()
        } else {
            let t = (coord - self.start).dot(&direction) / a;
            if on_entity && (t <= -TOLERANCE || t >= 1.0 + TOLERANCE) {
                return self.nearest_endpoint(coord);
            }
            self.start + direction * t
        };
        (point, (point - coord).norm())
    }

    /// The midpoint, with its distance to `coord`.
    #[must_use]
    pub fn nearest_center(&self, coord: &Point2) -> (Point2, f64) {
        let center = self.middle_point();
        (center, (center - coord).norm())
    }

    /// Nearest of the `middle_points` points dividing the line into
    /// `middle_points + 1` equal parts. The endpoints are never returned.
    #[must_use]
    pub fn nearest_middle(&self, coord: &Point2, middle_points: usize) -> (Point2, f64) {
        let length = self.length();
        if length <= TOLERANCE {
            return self.nearest_center(coord);
        }
        let counts = middle_points.max(1).saturating_add(1);
        let (projected, _) = self.nearest_point_on_entity(coord, true);
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let rounded = ((projected - self.start).norm() / length * counts as f64 + 0.5) as usize;
        let index = rounded.clamp(1, counts - 1);
        #[allow(clippy::cast_precision_loss)]
        let point = self.start + self.direction() * (index as f64 / counts as f64);
        (point, (point - coord).norm())
    }

    /// The point `distance` along the line from whichever endpoint is nearer
    /// to `coord`, measured towards the other endpoint.
    #[must_use]
    pub fn nearest_dist(&self, distance: f64, coord: &Point2) -> (Point2, f64) {
        let step = polar(distance, self.angle());
        let point = if (coord - self.start).norm_squared() < (coord - self.end).norm_squared() {
            self.start + step
        } else {
            self.end - step
        };
        (point, (point - coord).norm())
    }

    /// The nearest reference point to `coord`.
    #[must_use]
    pub fn nearest_ref(&self, coord: &Point2) -> Option<(Point2, f64)> {
        self.ref_points().nearest(coord)
    }

    /// Shortest distance from `coord` to the segment.
    #[must_use]
    pub fn distance_to_point(&self, coord: &Point2) -> f64 {
        self.nearest_point_on_entity(coord, true).1
    }

    pub fn move_by(&mut self, offset: &Vector2) {
        self.map_points(&|p: &mut Point2| p.move_by(offset));
    }

    pub fn rotate(&mut self, center: &Point2, angle: f64) {
        let angle_vector = Vector2::new(angle.cos(), angle.sin());
        self.map_points(&|p: &mut Point2| p.rotate_by(center, &angle_vector));
    }

    pub fn scale(&mut self, center: &Point2, factor: &Vector2) {
        self.map_points(&|p: &mut Point2| p.scale(center, factor));
    }

    pub fn mirror(&mut self, axis1: &Point2, axis2: &Point2) {
        self.map_points(&|p: &mut Point2| p.mirror(axis1, axis2));
    }

    /// Moves the grip at `reference` by `offset`.
    ///
    /// The start and end grips move one endpoint; the middle grip moves the
    /// whole line. A reference matching no grip is ignored.
    pub fn move_ref(&mut self, reference: &Point2, offset: &Vector2) {
        if !self.move_endpoint_refs(reference, offset)
            && (reference - self.middle_point()).norm() < REF_TOLERANCE
        {
            self.move_by(offset);
        }
    }

    /// Moves each endpoint within `REF_TOLERANCE` of `reference`. Both move
    /// when both match. Returns whether anything moved.
    pub fn move_endpoint_refs(&mut self, reference: &Point2, offset: &Vector2) -> bool {
        let start = (reference - self.start).norm() < REF_TOLERANCE;
        let end = (reference - self.end).norm() < REF_TOLERANCE;
        if start {
            self.start.move_by(offset);
        }
        if end {
            self.end.move_by(offset);
        }
        start || end
    }

    /// Swaps start and end.
    pub fn revert_direction(&mut self) {
        std::mem::swap(&mut self.start, &mut self.end);
        if let Some(indices) = &mut self.indices {
            std::mem::swap(&mut indices.start, &mut indices.end);
        }
    }

    /// Translates the line perpendicular to itself by `distance`, towards
    /// the side `coord` lies on.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] if the line is degenerate.
    pub fn offset(&mut self, coord: &Point2, distance: f64) -> Result<(), GeometryError> {
        let direction = self.direction();
        let length = direction.norm();
        if length < TOLERANCE {
            return Err(GeometryError::ZeroVector);
        }
        let unit = direction / length;
        let mut normal = Vector2::new(-unit.y, unit.x);
        if normal.dot(&(coord - self.start)) < 0.0 {
            normal = -normal;
        }
        self.move_by(&(normal * distance));
        Ok(())
    }

    /// The `Line (<id>) = {<start>, <end>};` record of an indexed line.
    #[must_use]
    pub fn to_geo_string(&self) -> Option<String> {
        self.indices.map(|ix| line_record(ix.id, ix.start, ix.end))
    }

    pub(crate) fn map_points(&mut self, f: &dyn Fn(&mut Point2)) {
        f(&mut self.start);
        f(&mut self.end);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const TOL: f64 = 1e-10;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn base() -> Line {
        Line::new(p(0.0, 0.0), p(10.0, 0.0))
    }

    fn assert_point(actual: Point2, x: f64, y: f64) {
        assert_abs_diff_eq!(actual.x, x, epsilon = TOL);
        assert_abs_diff_eq!(actual.y, y, epsilon = TOL);
    }

    #[test]
    fn nearest_endpoint_picks_closer_end() {
        let (pt, d) = base().nearest_endpoint(&p(9.0, 1.0));
        assert_point(pt, 10.0, 0.0);
        assert_abs_diff_eq!(d, 2.0_f64.sqrt(), epsilon = TOL);

        let (pt, _) = base().nearest_endpoint(&p(1.0, 1.0));
        assert_point(pt, 0.0, 0.0);

        let (pt, d) = base().nearest_endpoint(&p(11.0, 0.0));
        assert_point(pt, 10.0, 0.0);
        assert_abs_diff_eq!(d, 1.0, epsilon = TOL);
    }

    #[test]
    fn nearest_endpoint_tie_keeps_start() {
        let (pt, _) = base().nearest_endpoint(&p(5.0, 3.0));
        assert_point(pt, 0.0, 0.0);
    }

    #[test]
    fn projection_on_segment() {
        let (pt, d) = base().nearest_point_on_entity(&p(5.0, 3.0), true);
        assert_point(pt, 5.0, 0.0);
        assert_abs_diff_eq!(d, 3.0, epsilon = TOL);
    }

    #[test]
    fn projection_beyond_end_falls_back_to_endpoint() {
        let (pt, d) = base().nearest_point_on_entity(&p(15.0, 0.0), true);
        assert_point(pt, 10.0, 0.0);
        assert_abs_diff_eq!(d, 5.0, epsilon = TOL);

        let (pt, d) = base().nearest_point_on_entity(&p(15.0, 0.0), false);
        assert_point(pt, 15.0, 0.0);
        assert_abs_diff_eq!(d, 0.0, epsilon = TOL);
    }

    #[test]
    fn degenerate_line_uses_midpoint() {
        let line = Line::new(p(2.0, 2.0), p(2.0, 2.0));
        assert!(line.is_degenerate());
        let (pt, d) = line.nearest_point_on_entity(&p(5.0, 6.0), true);
        assert_point(pt, 2.0, 2.0);
        assert_abs_diff_eq!(d, 5.0, epsilon = TOL);
        let (pt, _) = line.nearest_middle(&p(5.0, 6.0), 3);
        assert_point(pt, 2.0, 2.0);
    }

    #[test]
    fn single_middle_point_is_midpoint() {
        let (pt, d) = base().nearest_middle(&p(5.0, 0.0), 1);
        assert_point(pt, 5.0, 0.0);
        assert_abs_diff_eq!(d, 0.0, epsilon = TOL);
    }

    #[test]
    fn middle_points_divide_evenly() {
        let (pt, d) = base().nearest_middle(&p(6.0, 0.0), 3);
        assert_point(pt, 5.0, 0.0);
        assert_abs_diff_eq!(d, 1.0, epsilon = TOL);

        let (pt, _) = base().nearest_middle(&p(7.0, 0.0), 3);
        assert_point(pt, 7.5, 0.0);
    }

    #[test]
    fn middle_points_never_return_endpoints() {
        let (pt, _) = base().nearest_middle(&p(-4.0, 0.0), 3);
        assert_point(pt, 2.5, 0.0);
        let (pt, _) = base().nearest_middle(&p(40.0, 0.0), 3);
        assert_point(pt, 7.5, 0.0);
    }

    #[test]
    fn nearest_dist_measures_from_nearer_end() {
        let (pt, _) = base().nearest_dist(2.0, &p(1.0, 1.0));
        assert_point(pt, 2.0, 0.0);
        let (pt, d) = base().nearest_dist(2.0, &p(9.0, 0.0));
        assert_point(pt, 8.0, 0.0);
        assert_abs_diff_eq!(d, 1.0, epsilon = TOL);
    }

    #[test]
    fn offset_moves_towards_coord() {
        let mut line = base();
        line.offset(&p(3.0, -7.0), 2.0).unwrap();
        assert_point(line.start_point(), 0.0, -2.0);
        assert_point(line.end_point(), 10.0, -2.0);

        let mut line = base();
        line.offset(&p(3.0, 7.0), 2.0).unwrap();
        assert_point(line.start_point(), 0.0, 2.0);
    }

    #[test]
    fn offset_of_degenerate_line_fails() {
        let mut line = Line::new(p(1.0, 1.0), p(1.0, 1.0));
        assert_eq!(line.offset(&p(0.0, 0.0), 1.0), Err(GeometryError::ZeroVector));
        assert_point(line.start_point(), 1.0, 1.0);
    }

    #[test]
    fn move_ref_by_grip() {
        let mut line = base();
        line.move_ref(&p(10.0, 0.0), &Vector2::new(0.0, 5.0));
        assert_point(line.end_point(), 10.0, 5.0);
        assert_point(line.start_point(), 0.0, 0.0);

        let mut line = base();
        line.move_ref(&p(5.0, 0.0), &Vector2::new(1.0, 1.0));
        assert_point(line.start_point(), 1.0, 1.0);
        assert_point(line.end_point(), 11.0, 1.0);

        let mut line = base();
        line.move_ref(&p(3.0, 3.0), &Vector2::new(1.0, 1.0));
        assert_eq!(line, base());
    }

    #[test]
    fn move_ref_on_zero_length_line_moves_both_ends() {
        let mut line = Line::new(p(2.0, 2.0), p(2.0, 2.0));
        line.move_ref(&p(2.0, 2.0), &Vector2::new(1.0, 0.0));
        assert_point(line.start_point(), 3.0, 2.0);
        assert_point(line.end_point(), 3.0, 2.0);
    }

    #[test]
    fn endpoint_refs_ignore_the_middle_grip() {
        let mut line = base();
        assert!(!line.move_endpoint_refs(&p(5.0, 0.0), &Vector2::new(0.0, 1.0)));
        assert_eq!(line, base());
        assert!(line.move_endpoint_refs(&p(0.0, 0.0), &Vector2::new(0.0, 1.0)));
        assert_point(line.start_point(), 0.0, 1.0);
        assert_point(line.end_point(), 10.0, 0.0);
    }

    #[test]
    fn huge_middle_point_count_does_not_overflow() {
        let (pt, _) = base().nearest_middle(&p(4.0, 0.0), usize::MAX);
        assert_abs_diff_eq!(pt.y, 0.0, epsilon = TOL);
        assert!(pt.x > 0.0 && pt.x < 10.0);
    }

    #[test]
    fn transforms() {
        let mut line = base();
        line.rotate(&p(0.0, 0.0), std::f64::consts::FRAC_PI_2);
        assert_point(line.end_point(), 0.0, 10.0);

        let mut line = base();
        line.scale(&p(0.0, 0.0), &Vector2::new(0.5, 1.0));
        assert_point(line.end_point(), 5.0, 0.0);

        let mut line = base();
        line.mirror(&p(0.0, 1.0), &p(1.0, 1.0));
        assert_point(line.start_point(), 0.0, 2.0);
        assert_point(line.end_point(), 10.0, 2.0);
    }

    #[test]
    fn revert_swaps_points_and_indices() {
        let a = GeoPoint::new(1, p(0.0, 0.0));
        let b = GeoPoint::new(2, p(3.0, 0.0));
        let mut line = Line::indexed(7, &a, &b);
        line.revert_direction();
        assert_point(line.start_point(), 3.0, 0.0);
        assert_eq!(line.to_geo_string().as_deref(), Some("Line (7) = {2, 1};"));
        line.revert_direction();
        assert_eq!(line, Line::indexed(7, &a, &b));
    }

    #[test]
    fn plain_line_has_no_geo_record() {
        assert!(base().to_geo_string().is_none());
        assert_eq!(base().ref_points().len(), 3);
        assert_eq!(base().bounds(), Aabb::new(p(0.0, 0.0), p(10.0, 0.0)));
    }
}
