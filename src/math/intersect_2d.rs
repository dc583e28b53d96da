use super::{Point2, TOLERANCE};

/// Intersects the chords `a0 -> a1` and `b0 -> b1`.
///
/// Returns the crossing point with its parameters `t` on the first chord and `u` on the
/// second, both in `[0, 1]`. Contact at an endpoint counts. Parallel chords yield `None`,
/// even when they overlap; [`collinear_overlap_2d`] covers that case.
#[must_use]
pub fn segment_segment_intersect_2d(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
) -> Option<(Point2, f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;
    let denom = da.perp(&db);
    if denom.abs() < TOLERANCE {
        return None;
    }

    let offset = b0 - a0;
    let t = offset.perp(&db) / denom;
    let u = offset.perp(&da) / denom;
    let within = |s: f64| (-TOLERANCE..=1.0 + TOLERANCE).contains(&s);
    if !(within(t) && within(u)) {
        return None;
    }

    let t = t.clamp(0.0, 1.0);
    Some((a0 + da * t, t, u.clamp(0.0, 1.0)))
}

/// Length of the shared stretch of two collinear segments, or `None` if they are not
/// collinear or do not overlap along a positive length.
#[must_use]
pub fn collinear_overlap_2d(a0: &Point2, a1: &Point2, b0: &Point2, b1: &Point2) -> Option<f64> {
    let da = a1 - a0;
    let len_sq = da.norm_squared();
    if len_sq < TOLERANCE * TOLERANCE {
        return None;
    }

    let side = |p: &Point2| da.x * (p.y - a0.y) - da.y * (p.x - a0.x);
    let len = len_sq.sqrt();
    if side(b0).abs() / len > TOLERANCE || side(b1).abs() / len > TOLERANCE {
        return None;
    }

    let project = |p: &Point2| ((p - a0).dot(&da)) / len_sq;
    let (s0, s1) = {
        let (s0, s1) = (project(b0), project(b1));
        if s0 <= s1 {
            (s0, s1)
        } else {
            (s1, s0)
        }
    };
    let lo = s0.max(0.0);
    let hi = s1.min(1.0);
    let overlap = (hi - lo) * len;
    (overlap > TOLERANCE).then_some(overlap)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::near_equal_2d;

    #[test]
    fn diagonals_cross_at_center() {
        let (pt, t, u) = segment_segment_intersect_2d(
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 2.0),
            &Point2::new(0.0, 2.0),
            &Point2::new(2.0, 0.0),
        )
        .unwrap();
        assert!(near_equal_2d(&pt, &Point2::new(1.0, 1.0), TOLERANCE));
        assert!((t - 0.5).abs() < TOLERANCE && (u - 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn parallel_chords_miss() {
        let hit = segment_segment_intersect_2d(
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(0.0, 1.0),
            &Point2::new(1.0, 1.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn short_chords_miss() {
        let hit = segment_segment_intersect_2d(
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 1.0),
            &Point2::new(3.0, 0.0),
            &Point2::new(2.0, 1.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn touching_at_endpoint_is_reported() {
        let a0 = Point2::new(0.0, 0.0);
        let a1 = Point2::new(1.0, 0.0);
        let b0 = Point2::new(1.0, 0.0);
        let b1 = Point2::new(1.0, 1.0);
        let (pt, t, u) = segment_segment_intersect_2d(&a0, &a1, &b0, &b1).unwrap();
        assert!((pt.x - 1.0).abs() < TOLERANCE);
        assert!((t - 1.0).abs() < TOLERANCE);
        assert!(u.abs() < TOLERANCE);
    }

    #[test]
    fn collinear_overlap_length() {
        let a0 = Point2::new(0.0, 0.0);
        let a1 = Point2::new(2.0, 0.0);
        let b0 = Point2::new(3.0, 0.0);
        let b1 = Point2::new(1.0, 0.0);
        let overlap = collinear_overlap_2d(&a0, &a1, &b0, &b1).unwrap();
        assert!((overlap - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn collinear_touching_has_no_overlap() {
        let a0 = Point2::new(0.0, 0.0);
        let a1 = Point2::new(1.0, 0.0);
        let b0 = Point2::new(1.0, 0.0);
        let b1 = Point2::new(2.0, 0.0);
        assert!(collinear_overlap_2d(&a0, &a1, &b0, &b1).is_none());
        assert!(collinear_overlap_2d(&a0, &a1, &Point2::new(0.0, 1.0), &Point2::new(1.0, 1.0)).is_none());
    }
}
