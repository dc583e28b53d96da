/// 2D circular arc math for sketch arcs.
///
/// A sketch arc is stored as a chord (start, end) plus a radius, a flag telling on which
/// side of the chord the center lies, and a winding flag. A non-positive radius marks a
/// full circle centered on the end vertex and passing through the start vertex.
use std::f64::consts::TAU;

use super::{Point2, TOLERANCE};

/// Computes the center of an arc from its chord.
///
/// `center_is_left` places the center to the left of the chord direction `start -> end`.
/// Returns `None` when the chord is degenerate or longer than the diameter.
#[must_use]
pub fn arc_center_from_chord(
    start: &Point2,
    end: &Point2,
    radius: f64,
    center_is_left: bool,
) -> Option<Point2> {
    let chord = end - start;
    let chord_len = chord.norm();
    if chord_len < TOLERANCE || radius < TOLERANCE {
        return None;
    }

    let half = chord_len * 0.5;
    let h_sq = radius * radius - half * half;
    if h_sq < -TOLERANCE {
        return None;
    }
    let h = h_sq.max(0.0).sqrt();

    // Left-hand normal of the chord.
    let nx = -chord.y / chord_len;
    let ny = chord.x / chord_len;
    let sign = if center_is_left { 1.0 } else { -1.0 };

    let mid = Point2::new((start.x + end.x) * 0.5, (start.y + end.y) * 0.5);
    Some(Point2::new(mid.x + sign * h * nx, mid.y + sign * h * ny))
}

/// Signed sweep angle from `start` to `end` around `center`.
///
/// Clockwise arcs yield a negative sweep in `(-2π, 0]`, counter-clockwise arcs a
/// positive sweep in `[0, 2π)`. Coincident start and end give a full turn.
#[must_use]
pub fn arc_sweep(center: &Point2, start: &Point2, end: &Point2, clockwise: bool) -> f64 {
    let a0 = (start.y - center.y).atan2(start.x - center.x);
    let a1 = (end.y - center.y).atan2(end.x - center.x);
    let mut sweep = a1 - a0;

    if clockwise {
        if sweep >= -TOLERANCE {
            sweep -= TAU;
        }
    } else if sweep <= TOLERANCE {
        sweep += TAU;
    }
    sweep
}

/// Evaluates a point on an arc at parameter `t` in `[0, 1]`.
#[must_use]
pub fn arc_point_at(center: &Point2, radius: f64, start_angle: f64, sweep: f64, t: f64) -> Point2 {
    let angle = start_angle + sweep * t;
    Point2::new(
        center.x + radius * angle.cos(),
        center.y + radius * angle.sin(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const TOL: f64 = 1e-10;

    #[test]
    fn center_left_of_horizontal_chord() {
        let c = arc_center_from_chord(&Point2::new(0.0, 0.0), &Point2::new(2.0, 0.0), 1.0, true)
            .unwrap_or_else(|| Point2::new(f64::NAN, f64::NAN));
        assert!((c.x - 1.0).abs() < TOL, "cx={}", c.x);
        assert!(c.y.abs() < TOL, "cy={}", c.y);
    }

    #[test]
    fn center_side_follows_flag() {
        let start = Point2::new(0.0, 0.0);
        let end = Point2::new(2.0, 0.0);
        let radius = 2.0_f64.sqrt();
        let left = arc_center_from_chord(&start, &end, radius, true);
        let right = arc_center_from_chord(&start, &end, radius, false);
        assert!(left.is_some_and(|c| (c.y - 1.0).abs() < TOL));
        assert!(right.is_some_and(|c| (c.y + 1.0).abs() < TOL));
    }

    #[test]
    fn chord_longer_than_diameter_has_no_center() {
        let c = arc_center_from_chord(&Point2::new(0.0, 0.0), &Point2::new(4.0, 0.0), 1.0, true);
        assert!(c.is_none());
    }

    #[test]
    fn sweep_direction() {
        let center = Point2::new(0.0, 0.0);
        let start = Point2::new(1.0, 0.0);
        let end = Point2::new(0.0, 1.0);
        assert!((arc_sweep(&center, &start, &end, false) - PI / 2.0).abs() < TOL);
        assert!((arc_sweep(&center, &start, &end, true) + 1.5 * PI).abs() < TOL);
        assert!((arc_sweep(&center, &start, &start, false) - TAU).abs() < TOL);
    }

    #[test]
    fn point_at_quarter() {
        let p = arc_point_at(&Point2::new(1.0, 1.0), 2.0, 0.0, PI, 0.5);
        assert!((p.x - 1.0).abs() < TOL);
        assert!((p.y - 3.0).abs() < TOL);
    }
}
