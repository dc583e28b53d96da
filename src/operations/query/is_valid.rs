use std::collections::BTreeSet;

use thiserror::Error;
use tracing::debug;

use crate::geometry::{Bezier, CircularArc, Line, Nurb, Segment};
use crate::math::intersect_2d::{collinear_overlap_2d, segment_segment_intersect_2d};
use crate::math::{near_equal_2d, Point2, TOLERANCE, VERTEX_TOLERANCE};
use crate::sketch::{Sketch, VertexIndex, VertexPool};

use super::sample_curve::SampleCurve;

/// Tunables for [`IsValid`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationOptions {
    /// Distance under which two points count as coincident.
    pub tolerance: f64,
    /// Number of chords each curved segment is split into for the intersection test.
    pub samples_per_curve: usize,
    /// Whether to look for crossings between segments.
    pub check_self_intersections: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            tolerance: TOLERANCE,
            samples_per_curve: 32,
            check_self_intersections: true,
        }
    }
}

/// One problem found by [`IsValid`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidityIssue {
    #[error("segment {segment} references missing vertex {vertex}")]
    VertexOutOfRange { segment: usize, vertex: VertexIndex },

    #[error("vertices {first} and {second} coincide")]
    DuplicateVertices {
        first: VertexIndex,
        second: VertexIndex,
    },

    #[error("line {segment} has zero length")]
    DegenerateLine { segment: usize },

    #[error("arc {segment} is degenerate: {reason}")]
    DegenerateArc {
        segment: usize,
        reason: &'static str,
    },

    #[error("nurb {segment} is malformed: {reason}")]
    InvalidNurb { segment: usize, reason: String },

    #[error("bezier {segment} needs at least two control points, has {count}")]
    InvalidBezier { segment: usize, count: usize },

    #[error("segments {first} and {second} intersect at {at}")]
    SelfIntersection {
        first: usize,
        second: usize,
        at: Point2,
    },
}

/// Validates the structural and geometric consistency of a sketch.
///
/// Structural checks cover dangling vertex references, coincident pool entries and
/// malformed segment parameters. When they pass, segments are sampled into chords and
/// checked for crossings; segments may only meet at shared endpoints.
#[derive(Debug, Clone, Default)]
pub struct IsValid {
    options: ValidationOptions,
}

impl IsValid {
    /// Creates a new `IsValid` query with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `IsValid` query with the given options.
    #[must_use]
    pub fn with_options(options: ValidationOptions) -> Self {
        Self { options }
    }

    /// Executes the validation, returning `true` if the sketch is valid.
    #[must_use]
    pub fn execute(&self, sketch: &Sketch) -> bool {
        let issues = self.issues(sketch);
        for issue in &issues {
            debug!(%issue, "sketch validation failed");
        }
        issues.is_empty()
    }

    /// Runs every check and returns the problems found, in segment order.
    #[must_use]
    pub fn issues(&self, sketch: &Sketch) -> Vec<ValidityIssue> {
        let pool = sketch.pool();
        let mut issues = duplicate_vertices(pool);

        for (index, segment) in sketch.curve().iter().enumerate() {
            issues.extend(self.check_segment(index, segment, pool));
        }

        if issues.is_empty() && self.options.check_self_intersections {
            issues.extend(self.intersections(sketch));
        }
        issues
    }

    fn check_segment(&self, index: usize, segment: &Segment, pool: &VertexPool) -> Vec<ValidityIssue> {
        let dangling: Vec<ValidityIssue> = segment
            .vertex_refs()
            .into_iter()
            .filter(|&vertex| vertex.get() >= pool.len())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|vertex| ValidityIssue::VertexOutOfRange {
                segment: index,
                vertex,
            })
            .collect();
        if !dangling.is_empty() {
            return dangling;
        }

        let issue = match segment {
            Segment::Line(line) => self.check_line(index, line, pool),
            Segment::CircularArc(arc) => self.check_arc(index, arc, pool),
            Segment::Nurb(nurb) => check_nurb(index, nurb),
            Segment::Bezier(bezier) => check_bezier(index, bezier),
        };
        issue.into_iter().collect()
    }

    fn coincident(&self, pool: &VertexPool, a: VertexIndex, b: VertexIndex) -> bool {
        match (pool.get(a), pool.get(b)) {
            (Ok(pa), Ok(pb)) => (pa - pb).norm() < self.options.tolerance,
            _ => false,
        }
    }

    fn check_line(&self, index: usize, line: &Line, pool: &VertexPool) -> Option<ValidityIssue> {
        self.coincident(pool, line.start(), line.end())
            .then_some(ValidityIssue::DegenerateLine { segment: index })
    }

    fn check_arc(&self, index: usize, arc: &CircularArc, pool: &VertexPool) -> Option<ValidityIssue> {
        let reason = if arc.is_full_circle() {
            self.coincident(pool, arc.start(), arc.end())
                .then_some("full circle has zero radius")
        } else if self.coincident(pool, arc.start(), arc.end()) {
            Some("start and end coincide")
        } else {
            let (Ok(start), Ok(end)) = (pool.get(arc.start()), pool.get(arc.end())) else {
                return None;
            };
            ((end - start).norm() > 2.0 * arc.radius() + self.options.tolerance)
                .then_some("chord is longer than the diameter")
        };
        reason.map(|reason| ValidityIssue::DegenerateArc {
            segment: index,
            reason,
        })
    }

    fn intersections(&self, sketch: &Sketch) -> Vec<ValidityIssue> {
        let sampler = SampleCurve::new(self.options.samples_per_curve);
        let mut chords: Vec<Chord> = Vec::new();
        for (segment, geometry) in sketch.curve().iter().enumerate() {
            let Ok(points) = sampler.execute(geometry, sketch.pool()) else {
                continue;
            };
            let closed = points.len() > 2
                && points
                    .first()
                    .zip(points.last())
                    .is_some_and(|(a, b)| (a - b).norm() < self.options.tolerance);
            let count = points.len().saturating_sub(1);
            for (piece, pair) in points.windows(2).enumerate() {
                chords.push(Chord {
                    segment,
                    piece,
                    last: piece + 1 == count,
                    closed,
                    a: pair[0],
                    b: pair[1],
                });
            }
        }

        let mut seen = BTreeSet::new();
        let mut issues = Vec::new();
        for (i, p) in chords.iter().enumerate() {
            for q in &chords[i + 1..] {
                if p.segment == q.segment && p.neighbours(q) {
                    continue;
                }
                if seen.contains(&(p.segment, q.segment)) {
                    continue;
                }
                if let Some(at) = self.crossing(p, q) {
                    seen.insert((p.segment, q.segment));
                    issues.push(ValidityIssue::SelfIntersection {
                        first: p.segment,
                        second: q.segment,
                        at,
                    });
                }
            }
        }
        issues
    }

    /// Returns where two chords cross, ignoring contact at an endpoint they share.
    fn crossing(&self, p: &Chord, q: &Chord) -> Option<Point2> {
        if collinear_overlap_2d(&p.a, &p.b, &q.a, &q.b).is_some() {
            return Some(p.a);
        }
        let (at, _, _) = segment_segment_intersect_2d(&p.a, &p.b, &q.a, &q.b)?;
        let tol = self.options.tolerance;
        let shared = [p.a, p.b].iter().any(|e| {
            near_equal_2d(e, &at, tol)
                && (near_equal_2d(e, &q.a, tol) || near_equal_2d(e, &q.b, tol))
        });
        (!shared).then_some(at)
    }
}

/// One chord of a sampled segment.
#[derive(Debug, Clone, Copy)]
struct Chord {
    segment: usize,
    piece: usize,
    last: bool,
    closed: bool,
    a: Point2,
    b: Point2,
}

impl Chord {
    /// Whether two chords of the same segment are consecutive along it.
    fn neighbours(&self, other: &Chord) -> bool {
        self.piece.abs_diff(other.piece) == 1
            || (self.closed && ((self.piece == 0 && other.last) || (other.piece == 0 && self.last)))
    }
}

fn duplicate_vertices(pool: &VertexPool) -> Vec<ValidityIssue> {
    let points = pool.points();
    let mut issues = Vec::new();
    for (i, a) in points.iter().enumerate() {
        for (j, b) in points.iter().enumerate().skip(i + 1) {
            if near_equal_2d(a, b, VERTEX_TOLERANCE) {
                issues.push(ValidityIssue::DuplicateVertices {
                    first: VertexIndex::new(i),
                    second: VertexIndex::new(j),
                });
            }
        }
    }
    issues
}

fn check_nurb(index: usize, nurb: &Nurb) -> Option<ValidityIssue> {
    let n = nurb.control_points().len();
    let order = nurb.order();
    let knots = nurb.knots();

    let reason = if order < 2 {
        Some(format!("order {order} is below 2"))
    } else if n < order {
        Some(format!("{n} control points cannot carry order {order}"))
    } else if knots.len() != n + order {
        Some(format!(
            "{} knots given, {} expected",
            knots.len(),
            n + order
        ))
    } else if knots.windows(2).any(|w| w[1] < w[0]) {
        Some("knot vector decreases".to_owned())
    } else if knots[order - 1] >= knots[n] {
        Some("parameter domain is empty".to_owned())
    } else {
        match nurb.weights() {
            Some(w) if w.len() != n => Some(format!("{} weights for {n} control points", w.len())),
            Some(w) if w.iter().any(|&x| x <= 0.0) => Some("weights must be positive".to_owned()),
            _ => None,
        }
    };
    reason.map(|reason| ValidityIssue::InvalidNurb {
        segment: index,
        reason,
    })
}

fn check_bezier(index: usize, bezier: &Bezier) -> Option<ValidityIssue> {
    let count = bezier.control_points().len();
    (count < 2).then_some(ValidityIssue::InvalidBezier {
        segment: index,
        count,
    })
}
