mod arc;
mod bezier;
mod line;
mod nurb;

pub use arc::CircularArc;
pub use bezier::Bezier;
pub use line::Line;
pub use nurb::Nurb;

use std::fmt;

use crate::sketch::VertexIndex;

/// Tag naming the kind of a [`Segment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Line,
    CircularArc,
    Nurb,
    Bezier,
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Line => "line",
            Self::CircularArc => "circular arc",
            Self::Nurb => "nurb",
            Self::Bezier => "bezier",
        };
        f.write_str(name)
    }
}

/// One curve primitive of a sketch.
///
/// Segments only hold indices into the sketch's vertex pool, so an owned `Segment`
/// describes geometry only together with the pool it was taken from.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Line(Line),
    CircularArc(CircularArc),
    Nurb(Nurb),
    Bezier(Bezier),
}

impl Segment {
    /// Creates the zero-initialized segment of the given kind.
    #[must_use]
    pub fn empty(kind: SegmentKind) -> Self {
        match kind {
            SegmentKind::Line => Self::Line(Line::default()),
            SegmentKind::CircularArc => Self::CircularArc(CircularArc::default()),
            SegmentKind::Nurb => Self::Nurb(Nurb::default()),
            SegmentKind::Bezier => Self::Bezier(Bezier::default()),
        }
    }

    /// Returns the kind tag of this segment.
    #[must_use]
    pub fn kind(&self) -> SegmentKind {
        match self {
            Self::Line(_) => SegmentKind::Line,
            Self::CircularArc(_) => SegmentKind::CircularArc,
            Self::Nurb(_) => SegmentKind::Nurb,
            Self::Bezier(_) => SegmentKind::Bezier,
        }
    }

    /// Vertex index of the start point, `None` for a curve without control points.
    #[must_use]
    pub fn start(&self) -> Option<VertexIndex> {
        match self {
            Self::Line(line) => Some(line.start()),
            Self::CircularArc(arc) => Some(arc.start()),
            Self::Nurb(nurb) => nurb.control_points().first().copied(),
            Self::Bezier(bezier) => bezier.control_points().first().copied(),
        }
    }

    /// Vertex index of the end point, `None` for a curve without control points.
    #[must_use]
    pub fn end(&self) -> Option<VertexIndex> {
        match self {
            Self::Line(line) => Some(line.end()),
            Self::CircularArc(arc) => Some(arc.end()),
            Self::Nurb(nurb) => nurb.control_points().last().copied(),
            Self::Bezier(bezier) => bezier.control_points().last().copied(),
        }
    }

    pub(crate) fn start_slot_mut(&mut self) -> Option<&mut VertexIndex> {
        match self {
            Self::Line(line) => Some(&mut line.start),
            Self::CircularArc(arc) => Some(&mut arc.start),
            Self::Nurb(nurb) => nurb.control_points.first_mut(),
            Self::Bezier(bezier) => bezier.control_points.first_mut(),
        }
    }

    pub(crate) fn end_slot_mut(&mut self) -> Option<&mut VertexIndex> {
        match self {
            Self::Line(line) => Some(&mut line.end),
            Self::CircularArc(arc) => Some(&mut arc.end),
            Self::Nurb(nurb) => nurb.control_points.last_mut(),
            Self::Bezier(bezier) => bezier.control_points.last_mut(),
        }
    }

    /// Every vertex reference this segment holds, repeats included.
    #[must_use]
    pub fn vertex_refs(&self) -> Vec<VertexIndex> {
        match self {
            Self::Line(line) => vec![line.start, line.end],
            Self::CircularArc(arc) => {
                let mut refs = vec![arc.start, arc.end];
                refs.extend(arc.center);
                refs
            }
            Self::Nurb(nurb) => nurb.control_points.clone(),
            Self::Bezier(bezier) => bezier.control_points.clone(),
        }
    }

    /// Number of slots in this segment that reference `index`.
    #[must_use]
    pub fn count_refs(&self, index: VertexIndex) -> usize {
        match self {
            Self::Line(line) => usize::from(line.start == index) + usize::from(line.end == index),
            Self::CircularArc(arc) => {
                usize::from(arc.start == index)
                    + usize::from(arc.end == index)
                    + usize::from(arc.center == Some(index))
            }
            Self::Nurb(nurb) => nurb.control_points.iter().filter(|&&i| i == index).count(),
            Self::Bezier(bezier) => bezier.control_points.iter().filter(|&&i| i == index).count(),
        }
    }

    /// Applies `f` to every vertex reference slot.
    pub(crate) fn for_each_ref_mut(&mut self, mut f: impl FnMut(&mut VertexIndex)) {
        match self {
            Self::Line(line) => {
                f(&mut line.start);
                f(&mut line.end);
            }
            Self::CircularArc(arc) => {
                f(&mut arc.start);
                f(&mut arc.end);
                if let Some(center) = arc.center.as_mut() {
                    f(center);
                }
            }
            Self::Nurb(nurb) => nurb.control_points.iter_mut().for_each(f),
            Self::Bezier(bezier) => bezier.control_points.iter_mut().for_each(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_segments_have_expected_refs() {
        let line = Segment::empty(SegmentKind::Line);
        assert_eq!(line.kind(), SegmentKind::Line);
        assert_eq!(line.vertex_refs(), vec![VertexIndex::new(0), VertexIndex::new(0)]);
        assert_eq!(line.count_refs(VertexIndex::new(0)), 2);

        let bezier = Segment::empty(SegmentKind::Bezier);
        assert!(bezier.start().is_none());
        assert!(bezier.vertex_refs().is_empty());
    }

    #[test]
    fn arc_center_counts_as_reference() {
        let mut arc = CircularArc::default();
        arc.center = Some(VertexIndex::new(3));
        let seg = Segment::CircularArc(arc);
        assert_eq!(seg.count_refs(VertexIndex::new(3)), 1);
        assert_eq!(seg.vertex_refs().len(), 3);
    }

    #[test]
    fn for_each_ref_mut_visits_all_slots() {
        let mut seg = Segment::Bezier(Bezier {
            control_points: vec![VertexIndex::new(1), VertexIndex::new(2), VertexIndex::new(1)],
        });
        seg.for_each_ref_mut(|i| *i = VertexIndex::new(i.get() + 10));
        assert_eq!(seg.count_refs(VertexIndex::new(11)), 2);
        assert_eq!(seg.end(), Some(VertexIndex::new(11)));
    }

    #[test]
    fn kind_display() {
        assert_eq!(SegmentKind::CircularArc.to_string(), "circular arc");
    }
}
