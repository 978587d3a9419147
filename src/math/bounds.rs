use super::vector::{maximum, minimum};
use super::{Point2, MAX_COORD, MIN_COORD};

/// An axis-aligned bounding box in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point2,
    /// Maximum corner of the bounding box.
    pub max: Point2,
}

impl Aabb {
    /// Creates a box from its corners, taken as given.
    #[must_use]
    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    /// Empty accumulator: `min` at `+MAX_COORD`, `max` at `-MAX_COORD`.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point2::new(MAX_COORD, MAX_COORD),
            max: Point2::new(MIN_COORD, MIN_COORD),
        }
    }

    /// Degenerate box at the origin, the fallback for unusable bounds.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            min: Point2::origin(),
            max: Point2::origin(),
        }
    }

    /// Smallest box containing both points.
    #[must_use]
    pub fn from_points(a: &Point2, b: &Point2) -> Self {
        Self {
            min: minimum(a, b),
            max: maximum(a, b),
        }
    }

    /// Returns `true` if the box is inverted on either axis (nothing folded in).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Grows the box to contain `point`.
    pub fn include_point(&mut self, point: &Point2) {
        self.min = minimum(&self.min, point);
        self.max = maximum(&self.max, point);
    }

    /// Grows the box to contain `other`.
    pub fn include(&mut self, other: &Aabb) {
        self.min = minimum(&self.min, &other.min);
        self.max = maximum(&self.max, &other.max);
    }

    /// Resets each axis that is inverted or outside the finite range to `0..0`.
    ///
    /// Keeps NaN and infinities from leaking out of a bounds computation.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let mut out = self;
        if !axis_is_sound(out.min.x, out.max.x) {
            out.min.x = 0.0;
            out.max.x = 0.0;
        }
        if !axis_is_sound(out.min.y, out.max.y) {
            out.min.y = 0.0;
            out.max.y = 0.0;
        }
        out
    }

    /// Returns `true` if `other` lies entirely inside this box.
    #[must_use]
    pub fn contains(&self, other: &Aabb) -> bool {
        other.min.x >= self.min.x
            && other.min.y >= self.min.y
            && other.max.x <= self.max.x
            && other.max.y <= self.max.y
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[must_use]
    pub fn center(&self) -> Point2 {
        nalgebra::center(&self.min, &self.max)
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

fn axis_is_sound(min: f64, max: f64) -> bool {
    min.is_finite() && max.is_finite() && min <= max && min > MIN_COORD && max < MAX_COORD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_accumulator_sanitizes_to_zero() {
        assert!(Aabb::empty().is_empty());
        assert_eq!(Aabb::empty().sanitized(), Aabb::zero());
    }

    #[test]
    fn include_folds_from_empty() {
        let mut acc = Aabb::empty();
        acc.include(&Aabb::from_points(
            &Point2::new(2.0, -1.0),
            &Point2::new(-3.0, 4.0),
        ));
        acc.include_point(&Point2::new(5.0, 0.0));
        assert_eq!(acc.min, Point2::new(-3.0, -1.0));
        assert_eq!(acc.max, Point2::new(5.0, 4.0));
        assert_eq!(acc.sanitized(), acc);
    }

    #[test]
    fn sanitize_resets_only_the_bad_axis() {
        let b = Aabb::new(Point2::new(1.0, f64::NAN), Point2::new(2.0, 3.0)).sanitized();
        assert_eq!(b.min.x, 1.0);
        assert_eq!(b.max.x, 2.0);
        assert_eq!(b.min.y, 0.0);
        assert_eq!(b.max.y, 0.0);

        let b = Aabb::new(Point2::new(5.0, 0.0), Point2::new(1.0, f64::INFINITY)).sanitized();
        assert_eq!(b, Aabb::zero());
    }

    #[test]
    fn contains_and_extent() {
        let outer = Aabb::new(Point2::new(0.0, 0.0), Point2::new(10.0, 4.0));
        let inner = Aabb::new(Point2::new(1.0, 1.0), Point2::new(9.0, 4.0));
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert_eq!(outer.width(), 10.0);
        assert_eq!(outer.height(), 4.0);
        assert_eq!(outer.center(), Point2::new(5.0, 2.0));
    }
}
