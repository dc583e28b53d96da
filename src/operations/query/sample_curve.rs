use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};
use crate::geometry::{Bezier, CircularArc, Nurb, Segment};
use crate::math::arc_2d::{arc_center_from_chord, arc_point_at, arc_sweep};
use crate::math::spline_2d::{bezier_point_at, nurbs_domain, nurbs_point_at};
use crate::math::Point2;
use crate::sketch::{VertexIndex, VertexPool};

/// Samples a segment into a polyline in sketch coordinates.
///
/// Lines yield their two endpoints. Curved segments yield `samples + 1` points spread
/// evenly over their parameter domain, first and last included.
pub struct SampleCurve {
    samples: usize,
}

impl SampleCurve {
    /// Creates a new `SampleCurve` query. At least one chord is always produced.
    #[must_use]
    pub fn new(samples: usize) -> Self {
        Self {
            samples: samples.max(1),
        }
    }

    /// Executes the query against the vertex pool the segment references.
    ///
    /// # Errors
    ///
    /// Returns an index error for a dangling vertex reference and a geometry error when
    /// the segment cannot be evaluated.
    pub fn execute(&self, segment: &Segment, pool: &VertexPool) -> Result<Vec<Point2>> {
        match segment {
            Segment::Line(line) => Ok(vec![pool.get(line.start())?, pool.get(line.end())?]),
            Segment::CircularArc(arc) => self.sample_arc(arc, pool),
            Segment::Nurb(nurb) => self.sample_nurb(nurb, pool),
            Segment::Bezier(bezier) => self.sample_bezier(bezier, pool),
        }
    }

    fn params(&self) -> impl Iterator<Item = f64> + '_ {
        #[allow(clippy::cast_precision_loss)]
        let n = self.samples as f64;
        (0..=self.samples).map(move |i| {
            #[allow(clippy::cast_precision_loss)]
            let i = i as f64;
            i / n
        })
    }

    fn sample_arc(&self, arc: &CircularArc, pool: &VertexPool) -> Result<Vec<Point2>> {
        let start = pool.get(arc.start())?;
        let end = pool.get(arc.end())?;

        let (center, sweep) = if arc.is_full_circle() {
            let sweep = if arc.clockwise_oriented() { -TAU } else { TAU };
            (end, sweep)
        } else {
            let center = match arc.center() {
                Some(center) => pool.get(center)?,
                None => arc_center_from_chord(&start, &end, arc.radius(), arc.center_is_left())
                    .ok_or_else(|| {
                        GeometryError::Degenerate(format!(
                            "arc chord from {start} to {end} does not fit radius {}",
                            arc.radius()
                        ))
                    })?,
            };
            (center, arc_sweep(&center, &start, &end, arc.clockwise_oriented()))
        };

        let radius = (start - center).norm();
        let start_angle = (start.y - center.y).atan2(start.x - center.x);
        let mut points: Vec<Point2> = self
            .params()
            .map(|t| arc_point_at(&center, radius, start_angle, sweep, t))
            .collect();
        // Pin the ends to the exact vertices so joints compare equal.
        if let Some(first) = points.first_mut() {
            *first = start;
        }
        if let Some(last) = points.last_mut() {
            *last = if arc.is_full_circle() { start } else { end };
        }
        Ok(points)
    }

    fn sample_nurb(&self, nurb: &Nurb, pool: &VertexPool) -> Result<Vec<Point2>> {
        let control = resolve(nurb.control_points(), pool)?;
        let (t_min, t_max) = nurbs_domain(nurb.order(), control.len(), nurb.knots())
            .ok_or_else(|| GeometryError::Degenerate("nurb knot vector does not fit".to_owned()))?;
        self.params()
            .map(|s| {
                let t = t_min + (t_max - t_min) * s;
                nurbs_point_at(nurb.order(), &control, nurb.knots(), nurb.weights(), t).ok_or_else(
                    || GeometryError::Degenerate(format!("nurb cannot be evaluated at {t}")).into(),
                )
            })
            .collect()
    }

    fn sample_bezier(&self, bezier: &Bezier, pool: &VertexPool) -> Result<Vec<Point2>> {
        let control = resolve(bezier.control_points(), pool)?;
        self.params()
            .map(|t| {
                bezier_point_at(&control, t).ok_or_else(|| {
                    GeometryError::Degenerate("bezier has no control points".to_owned()).into()
                })
            })
            .collect()
    }
}

fn resolve(indices: &[VertexIndex], pool: &VertexPool) -> Result<Vec<Point2>> {
    indices.iter().map(|&index| pool.get(index)).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Line;

    const TOL: f64 = 1e-10;

    fn pool(points: &[(f64, f64)]) -> VertexPool {
        let mut pool = VertexPool::new();
        for &(x, y) in points {
            pool.add_vertex(Point2::new(x, y)).unwrap();
        }
        pool
    }

    #[test]
    fn line_yields_endpoints() {
        let pool = pool(&[(0.0, 0.0), (3.0, 4.0)]);
        let line = Segment::Line(Line::new(VertexIndex::new(0), VertexIndex::new(1)));
        let points = SampleCurve::new(16).execute(&line, &pool).unwrap();
        assert_eq!(points, vec![Point2::new(0.0, 0.0), Point2::new(3.0, 4.0)]);
    }

    #[test]
    fn half_circle_stays_on_radius() {
        let pool = pool(&[(1.0, 0.0), (-1.0, 0.0)]);
        let arc = Segment::CircularArc(CircularArc::new(
            VertexIndex::new(0),
            VertexIndex::new(1),
            1.0,
            true,
            false,
        ));
        let points = SampleCurve::new(8).execute(&arc, &pool).unwrap();
        assert_eq!(points.len(), 9);
        for p in &points {
            assert!((p.coords.norm() - 1.0).abs() < TOL);
        }
        // Counter-clockwise from (1, 0) passes through (0, 1).
        assert!((points[4].y - 1.0).abs() < TOL);
        assert_eq!(points[8], Point2::new(-1.0, 0.0));
    }

    #[test]
    fn full_circle_closes_on_start() {
        let pool = pool(&[(2.0, 0.0), (0.0, 0.0)]);
        let arc = Segment::CircularArc(CircularArc::new(
            VertexIndex::new(0),
            VertexIndex::new(1),
            0.0,
            false,
            false,
        ));
        let points = SampleCurve::new(4).execute(&arc, &pool).unwrap();
        assert_eq!(points.first(), points.last());
        assert!((points[1].y - 2.0).abs() < TOL);
    }

    #[test]
    fn bezier_without_points_fails() {
        let pool = pool(&[(0.0, 0.0)]);
        let bezier = Segment::Bezier(Bezier::new(Vec::new()));
        assert!(SampleCurve::new(4).execute(&bezier, &pool).is_err());
    }

    #[test]
    fn dangling_reference_fails() {
        let pool = pool(&[(0.0, 0.0)]);
        let line = Segment::Line(Line::new(VertexIndex::new(0), VertexIndex::new(5)));
        assert!(SampleCurve::new(4).execute(&line, &pool).is_err());
    }
}
