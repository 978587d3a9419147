use super::{Point2, Vector2, TOLERANCE_SQUARED};

/// Component-wise minimum of two points.
///
/// Used to fold bounding boxes; an operand holding the `MAX_COORD`
/// sentinel simply loses every comparison.
#[must_use]
pub fn minimum(a: &Point2, b: &Point2) -> Point2 {
    Point2::new(a.x.min(b.x), a.y.min(b.y))
}

/// Component-wise maximum of two points.
#[must_use]
pub fn maximum(a: &Point2, b: &Point2) -> Point2 {
    Point2::new(a.x.max(b.x), a.y.max(b.y))
}

/// Builds a vector from polar coordinates (`angle` in radians).
#[must_use]
pub fn polar(distance: f64, angle: f64) -> Vector2 {
    Vector2::new(distance * angle.cos(), distance * angle.sin())
}

/// Dot product of two vectors.
#[must_use]
pub fn dot_p(a: &Vector2, b: &Vector2) -> f64 {
    a.dot(b)
}

/// Direction angle of `v` in radians, in `(-π, π]`.
#[must_use]
pub fn angle(v: &Vector2) -> f64 {
    v.y.atan2(v.x)
}

/// In-place affine transforms applied to entity points.
pub trait PointTransform {
    /// Translates the point by `offset`.
    fn move_by(&mut self, offset: &Vector2);

    /// Rotates the point around `center` by `angle` radians (counter-clockwise).
    fn rotate(&mut self, center: &Point2, angle: f64);

    /// Rotates the point around `center` by a precomputed `(cos, sin)` pair.
    fn rotate_by(&mut self, center: &Point2, angle_vector: &Vector2);

    /// Scales the point relative to `center`, per axis.
    fn scale(&mut self, center: &Point2, factor: &Vector2);

    /// Mirrors the point across the axis through `axis1` and `axis2`.
    ///
    /// Leaves the point untouched if the axis points coincide.
    fn mirror(&mut self, axis1: &Point2, axis2: &Point2);
}

impl PointTransform for Point2 {
    fn move_by(&mut self, offset: &Vector2) {
        *self += *offset;
    }

    fn rotate(&mut self, center: &Point2, angle: f64) {
        self.rotate_by(center, &Vector2::new(angle.cos(), angle.sin()));
    }

    fn rotate_by(&mut self, center: &Point2, angle_vector: &Vector2) {
        let v = *self - center;
        let (c, s) = (angle_vector.x, angle_vector.y);
        *self = center + Vector2::new(v.x * c - v.y * s, v.x * s + v.y * c);
    }

    fn scale(&mut self, center: &Point2, factor: &Vector2) {
        *self = center + (*self - center).component_mul(factor);
    }

    fn mirror(&mut self, axis1: &Point2, axis2: &Point2) {
        let direction = axis2 - axis1;
        let a = direction.norm_squared();
        if a < TOLERANCE_SQUARED {
            return;
        }
        let foot = axis1 + direction * ((*self - axis1).dot(&direction) / a);
        *self = foot + (foot - *self);
    }
}

/// Ordered set of reference points of an entity (grip points).
///
/// No uniqueness is enforced; insertion order is display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorSolutions {
    points: Vec<Point2>,
}

impl VectorSolutions {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a point.
    pub fn push(&mut self, point: Point2) {
        self.points.push(point);
    }

    /// Appends every point of `other`, keeping its order.
    pub fn extend_from(&mut self, other: &VectorSolutions) {
        self.points.extend_from_slice(&other.points);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<Point2> {
        self.points.get(index).copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Point2] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point2> {
        self.points.iter()
    }

    /// Returns the point closest to `coord` and its distance.
    ///
    /// Equidistant candidates keep the earliest one.
    #[must_use]
    pub fn nearest(&self, coord: &Point2) -> Option<(Point2, f64)> {
        let mut best: Option<(Point2, f64)> = None;
        for p in &self.points {
            let d2 = (p - coord).norm_squared();
            if best.map_or(true, |(_, b)| d2 < b) {
                best = Some((*p, d2));
            }
        }
        best.map(|(p, d2)| (p, d2.sqrt()))
    }
}

impl FromIterator<Point2> for VectorSolutions {
    fn from_iter<I: IntoIterator<Item = Point2>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl Extend<Point2> for VectorSolutions {
    fn extend<I: IntoIterator<Item = Point2>>(&mut self, iter: I) {
        self.points.extend(iter);
    }
}

impl<'a> IntoIterator for &'a VectorSolutions {
    type Item = &'a Point2;
    type IntoIter = std::slice::Iter<'a, Point2>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::MAX_COORD;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    const TOL: f64 = 1e-10;

    #[test]
    fn minimum_with_sentinel_accumulator() {
        let acc = Point2::new(MAX_COORD, MAX_COORD);
        let p = Point2::new(3.0, -2.0);
        let m = minimum(&acc, &p);
        assert_eq!(m, p);
        let m = maximum(&Point2::new(-MAX_COORD, -MAX_COORD), &p);
        assert_eq!(m, p);
    }

    #[test]
    fn rotate_quarter_turn_about_center() {
        let mut p = Point2::new(2.0, 1.0);
        p.rotate(&Point2::new(1.0, 1.0), FRAC_PI_2);
        assert_abs_diff_eq!(p.x, 1.0, epsilon = TOL);
        assert_abs_diff_eq!(p.y, 2.0, epsilon = TOL);
    }

    #[test]
    fn scale_per_axis() {
        let mut p = Point2::new(3.0, 3.0);
        p.scale(&Point2::new(1.0, 1.0), &Vector2::new(2.0, 0.5));
        assert_abs_diff_eq!(p.x, 5.0, epsilon = TOL);
        assert_abs_diff_eq!(p.y, 2.0, epsilon = TOL);
    }

    #[test]
    fn mirror_across_diagonal() {
        let mut p = Point2::new(2.0, 0.0);
        p.mirror(&Point2::origin(), &Point2::new(1.0, 1.0));
        assert_abs_diff_eq!(p.x, 0.0, epsilon = TOL);
        assert_abs_diff_eq!(p.y, 2.0, epsilon = TOL);
    }

    #[test]
    fn mirror_with_coincident_axis_is_noop() {
        let mut p = Point2::new(2.0, 7.0);
        p.mirror(&Point2::new(1.0, 1.0), &Point2::new(1.0, 1.0));
        assert_eq!(p, Point2::new(2.0, 7.0));
    }

    #[test]
    fn polar_and_angle_agree() {
        let v = polar(2.0, FRAC_PI_2);
        assert_abs_diff_eq!(v.x, 0.0, epsilon = TOL);
        assert_abs_diff_eq!(v.y, 2.0, epsilon = TOL);
        assert_abs_diff_eq!(angle(&v), FRAC_PI_2, epsilon = TOL);
        assert_abs_diff_eq!(dot_p(&v, &Vector2::new(0.0, 1.0)), 2.0, epsilon = TOL);
    }

    #[test]
    fn nearest_keeps_first_on_tie() {
        let set: VectorSolutions = [Point2::new(-1.0, 0.0), Point2::new(1.0, 0.0)]
            .into_iter()
            .collect();
        let (p, d) = set.nearest(&Point2::origin()).unwrap();
        assert_eq!(p, Point2::new(-1.0, 0.0));
        assert_abs_diff_eq!(d, 1.0, epsilon = TOL);
    }

    #[test]
    fn nearest_on_empty_set_is_none() {
        assert!(VectorSolutions::new().nearest(&Point2::origin()).is_none());
    }
}
