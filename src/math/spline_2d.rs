/// Free-form 2D curve evaluation: Bezier (de Casteljau) and NURBS (de Boor).
use super::{Point2, TOLERANCE};

/// Evaluates a Bezier curve at parameter `t` in `[0, 1]` using de Casteljau's algorithm.
///
/// Returns `None` for an empty control polygon.
#[must_use]
pub fn bezier_point_at(control: &[Point2], t: f64) -> Option<Point2> {
    if control.is_empty() {
        return None;
    }
    let mut work: Vec<Point2> = control.to_vec();
    let n = work.len();
    for level in 1..n {
        for i in 0..n - level {
            work[i] = work[i] + (work[i + 1] - work[i]) * t;
        }
    }
    Some(work[0])
}

/// Returns the parameter domain `[knots[order-1], knots[n]]` of a NURBS curve with `n`
/// control points, or `None` if the knot vector does not fit `n + order` entries.
#[must_use]
pub fn nurbs_domain(order: usize, n: usize, knots: &[f64]) -> Option<(f64, f64)> {
    if order < 2 || n < order || knots.len() != n + order {
        return None;
    }
    Some((knots[order - 1], knots[n]))
}

/// Evaluates a (possibly rational) NURBS curve at parameter `t` using de Boor's algorithm
/// in homogeneous coordinates.
///
/// `weights`, when given, must run parallel to `control`. Returns `None` when the curve
/// definition is inconsistent or `t` lies outside the domain.
#[must_use]
pub fn nurbs_point_at(
    order: usize,
    control: &[Point2],
    knots: &[f64],
    weights: Option<&[f64]>,
    t: f64,
) -> Option<Point2> {
    let n = control.len();
    let (t_min, t_max) = nurbs_domain(order, n, knots)?;
    if t < t_min - TOLERANCE || t > t_max + TOLERANCE {
        return None;
    }
    if weights.is_some_and(|w| w.len() != n) {
        return None;
    }
    let t = t.clamp(t_min, t_max);
    let p = order - 1;

    let mut span = p;
    while span + 1 < n && knots[span + 1] <= t {
        span += 1;
    }

    // Homogeneous control points: (w*x, w*y, w).
    let mut d: Vec<[f64; 3]> = (0..=p)
        .map(|j| {
            let idx = j + span - p;
            let w = weights.map_or(1.0, |w| w[idx]);
            [control[idx].x * w, control[idx].y * w, w]
        })
        .collect();

    for r in 1..=p {
        for j in (r..=p).rev() {
            let lo = knots[j + span - p];
            let hi = knots[j + 1 + span - r];
            let denom = hi - lo;
            let alpha = if denom.abs() < TOLERANCE {
                0.0
            } else {
                (t - lo) / denom
            };
            for c in 0..3 {
                d[j][c] = (1.0 - alpha) * d[j - 1][c] + alpha * d[j][c];
            }
        }
    }

    let [x, y, w] = d[p];
    if w.abs() < TOLERANCE {
        return None;
    }
    Some(Point2::new(x / w, y / w))
}
