use super::{Point2, TOLERANCE};

/// Parametric line-line intersection.
///
/// Given lines `p1 + t * (q1 - p1)` and `p2 + u * (q2 - p2)`, returns `(t, u)`
/// if they are not parallel.
#[must_use]
pub fn line_line_intersect_2d(
    p1: &Point2,
    q1: &Point2,
    p2: &Point2,
    q2: &Point2,
) -> Option<(f64, f64)> {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let cross = d1.perp(&d2);
    if cross.abs() < TOLERANCE {
        return None;
    }
    let d = p2 - p1;
    let t = d.perp(&d2) / cross;
    let u = d.perp(&d1) / cross;
    Some((t, u))
}

/// Bounded segment-segment intersection.
///
/// Returns the intersection point if it lies on both segments, endpoints
/// included within `TOLERANCE`. Parallel and overlapping segments yield `None`.
#[must_use]
pub fn segment_segment_intersect_2d(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
) -> Option<Point2> {
    let (t, u) = line_line_intersect_2d(a0, a1, b0, b1)?;
    let eps = TOLERANCE;
    if t >= -eps && t <= 1.0 + eps && u >= -eps && u <= 1.0 + eps {
        let t = t.clamp(0.0, 1.0);
        Some(a0 + (a1 - a0) * t)
    } else {
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn crossing_segments() {
        let p = segment_segment_intersect_2d(
            &Point2::new(0.0, 0.0),
            &Point2::new(4.0, 4.0),
            &Point2::new(0.0, 4.0),
            &Point2::new(4.0, 0.0),
        )
        .unwrap();
        assert_abs_diff_eq!(p.x, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn touching_at_endpoint() {
        let p = segment_segment_intersect_2d(
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 0.0),
            &Point2::new(2.0, 0.0),
            &Point2::new(2.0, 3.0),
        )
        .unwrap();
        assert_abs_diff_eq!(p.x, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn disjoint_and_parallel() {
        assert!(segment_segment_intersect_2d(
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(2.0, -1.0),
            &Point2::new(2.0, 1.0),
        )
        .is_none());
        assert!(line_line_intersect_2d(
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(0.0, 1.0),
            &Point2::new(1.0, 1.0),
        )
        .is_none());
    }
}
