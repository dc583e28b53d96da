use slotmap::SlotMap;

use crate::error::{reserve, HandleError, IndexError, Result};
use crate::geometry::{Segment, SegmentKind};

use super::vertex_pool::VertexIndex;

slotmap::new_key_type! {
    /// Generational handle on a segment of a sketch.
    ///
    /// Stays valid while segments are inserted or deleted around it, and is detected as
    /// stale once its own segment is deleted.
    pub struct SegmentId;
}

/// One vertex reference slot of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefSlot {
    Start,
    End,
    /// Explicit center of a circular arc.
    Center,
    /// Control point `i` of a NURBS or Bezier curve.
    ControlPoint(usize),
}

#[derive(Debug, Clone)]
struct SegmentEntry {
    segment: Segment,
    reversed: bool,
}

/// Ordered collection of segments forming the sketch's curve network.
///
/// Segments live in a generational arena; `order` records their sequence. The sequence
/// does not require consecutive segments to share endpoints.
#[derive(Debug, Clone, Default)]
pub struct CurveSequence {
    entries: SlotMap<SegmentId, SegmentEntry>,
    order: Vec<SegmentId>,
}

impl CurveSequence {
    /// Creates an empty sequence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns the handle of the segment at position `index`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Segment`] if `index` is out of range.
    pub fn id_at(&self, index: usize) -> Result<SegmentId> {
        self.order.get(index).copied().ok_or_else(|| {
            IndexError::Segment {
                index,
                count: self.order.len(),
            }
            .into()
        })
    }

    /// Returns the current position of the segment behind `id`.
    ///
    /// # Errors
    ///
    /// Returns [`HandleError::Stale`] if the segment was deleted.
    pub fn position_of(&self, id: SegmentId) -> Result<usize> {
        self.order
            .iter()
            .position(|&other| other == id)
            .ok_or_else(|| HandleError::Stale.into())
    }

    /// Returns the segment at position `index`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Segment`] if `index` is out of range.
    pub fn get(&self, index: usize) -> Result<&Segment> {
        self.by_id(self.id_at(index)?)
    }

    /// Returns the segment behind `id`.
    ///
    /// # Errors
    ///
    /// Returns [`HandleError::Stale`] if the segment was deleted.
    pub fn by_id(&self, id: SegmentId) -> Result<&Segment> {
        self.entries
            .get(id)
            .map(|entry| &entry.segment)
            .ok_or_else(|| HandleError::Stale.into())
    }

    pub(crate) fn by_id_mut(&mut self, id: SegmentId) -> Result<&mut Segment> {
        self.entries
            .get_mut(id)
            .map(|entry| &mut entry.segment)
            .ok_or_else(|| HandleError::Stale.into())
    }

    /// Iterates over the segments in sequence order.
    pub fn iter(&self) -> impl Iterator<Item = &Segment> + '_ {
        self.order
            .iter()
            .filter_map(|&id| self.entries.get(id).map(|entry| &entry.segment))
    }

    /// Returns the orientation flag recorded for the segment at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Segment`] if `index` is out of range.
    pub fn is_reversed(&self, index: usize) -> Result<bool> {
        let id = self.id_at(index)?;
        self.entries
            .get(id)
            .map(|entry| entry.reversed)
            .ok_or_else(|| HandleError::Stale.into())
    }

    /// Sets the orientation flag of the segment at `index`. The flag is carried along but
    /// does not change how the segment's geometry is read.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Segment`] if `index` is out of range.
    pub fn set_reversed(&mut self, index: usize, reversed: bool) -> Result<()> {
        let id = self.id_at(index)?;
        let entry = self.entries.get_mut(id).ok_or(HandleError::Stale)?;
        entry.reversed = reversed;
        Ok(())
    }

    /// Reserves room for one more entry in the position list. The slot map backing the
    /// entries still grows infallibly.
    pub(crate) fn reserve_one(&mut self) -> Result<()> {
        reserve(&mut self.order, 1, "curve sequence")
    }

    /// Appends a segment. Only the position list is grown through `try_reserve`.
    pub(crate) fn push(&mut self, segment: Segment) -> Result<SegmentId> {
        self.reserve_one()?;
        let id = self.entries.insert(SegmentEntry {
            segment,
            reversed: false,
        });
        self.order.push(id);
        Ok(id)
    }

    pub(crate) fn push_with_orientation(&mut self, segment: Segment, reversed: bool) -> Result<SegmentId> {
        let id = self.push(segment)?;
        if let Some(entry) = self.entries.get_mut(id) {
            entry.reversed = reversed;
        }
        Ok(id)
    }

    /// Inserts a segment before the one at position `index`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Insert`] if `index` is not less than the segment count; the
    /// sequence is unchanged then.
    pub(crate) fn insert(&mut self, index: usize, segment: Segment) -> Result<SegmentId> {
        self.check_insert(index)?;
        self.reserve_one()?;
        let id = self.entries.insert(SegmentEntry {
            segment,
            reversed: false,
        });
        self.order.insert(index, id);
        Ok(id)
    }

    pub(crate) fn check_insert(&self, index: usize) -> Result<()> {
        if index < self.order.len() {
            Ok(())
        } else {
            Err(IndexError::Insert {
                index,
                count: self.order.len(),
            }
            .into())
        }
    }

    /// Removes and returns the segment at position `index`, shifting later ones down.
    pub(crate) fn remove(&mut self, index: usize) -> Result<Segment> {
        let id = self.id_at(index)?;
        let entry = self.entries.remove(id).ok_or(HandleError::Stale)?;
        self.order.remove(index);
        Ok(entry.segment)
    }

    /// Counts the slots across all segments that reference `vertex`.
    #[must_use]
    pub fn count_refs(&self, vertex: VertexIndex) -> usize {
        self.entries
            .values()
            .map(|entry| entry.segment.count_refs(vertex))
            .sum()
    }

    pub(crate) fn for_each_ref_mut(&mut self, mut f: impl FnMut(&mut VertexIndex)) {
        for entry in self.entries.values_mut() {
            entry.segment.for_each_ref_mut(&mut f);
        }
    }

    /// Reads one reference slot of the segment behind `id`.
    ///
    /// An unset arc center reads as `None`.
    pub(crate) fn slot(&self, id: SegmentId, slot: RefSlot) -> Result<Option<VertexIndex>> {
        let segment = self.by_id(id)?;
        match (segment, slot) {
            (Segment::CircularArc(arc), RefSlot::Center) => Ok(arc.center),
            (_, RefSlot::Center) => Err(HandleError::KindMismatch {
                expected: SegmentKind::CircularArc,
                found: segment.kind(),
            }
            .into()),
            (_, RefSlot::Start) => segment
                .start()
                .map(Some)
                .ok_or_else(|| empty_control_polygon(0)),
            (_, RefSlot::End) => segment
                .end()
                .map(Some)
                .ok_or_else(|| empty_control_polygon(0)),
            (Segment::Nurb(nurb), RefSlot::ControlPoint(i)) => {
                control_point(&nurb.control_points, i).map(Some)
            }
            (Segment::Bezier(bezier), RefSlot::ControlPoint(i)) => {
                control_point(&bezier.control_points, i).map(Some)
            }
            (_, RefSlot::ControlPoint(_)) => Err(HandleError::KindMismatch {
                expected: SegmentKind::Nurb,
                found: segment.kind(),
            }
            .into()),
        }
    }

    /// Points one reference slot of the segment behind `id` at `vertex`.
    pub(crate) fn set_slot(&mut self, id: SegmentId, slot: RefSlot, vertex: VertexIndex) -> Result<()> {
        // Validates the slot against the segment's shape before writing.
        self.slot(id, slot)?;
        let segment = self.by_id_mut(id)?;
        match (segment, slot) {
            (Segment::CircularArc(arc), RefSlot::Center) => arc.center = Some(vertex),
            (segment, RefSlot::Start) => {
                if let Some(s) = segment.start_slot_mut() {
                    *s = vertex;
                }
            }
            (segment, RefSlot::End) => {
                if let Some(s) = segment.end_slot_mut() {
                    *s = vertex;
                }
            }
            (Segment::Nurb(nurb), RefSlot::ControlPoint(i)) => nurb.control_points[i] = vertex,
            (Segment::Bezier(bezier), RefSlot::ControlPoint(i)) => bezier.control_points[i] = vertex,
            _ => {}
        }
        Ok(())
    }

    /// Copies the sequence, keeping every `SegmentId`.
    ///
    /// Only the position list is copied through `try_reserve`; the entries, including
    /// control point and knot vectors, use the ordinary infallible `Clone`.
    pub(crate) fn try_clone(&self) -> Result<Self> {
        let mut order = Vec::new();
        reserve(&mut order, self.order.len(), "curve sequence")?;
        order.extend_from_slice(&self.order);
        Ok(Self {
            entries: self.entries.clone(),
            order,
        })
    }
}

fn control_point(points: &[VertexIndex], index: usize) -> Result<VertexIndex> {
    points.get(index).copied().ok_or_else(|| {
        IndexError::ControlPoint {
            index,
            count: points.len(),
        }
        .into()
    })
}

fn empty_control_polygon(index: usize) -> crate::error::SketchError {
    IndexError::ControlPoint { index, count: 0 }.into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Bezier, Line};

    fn line(start: usize, end: usize) -> Segment {
        Segment::Line(Line::new(VertexIndex::new(start), VertexIndex::new(end)))
    }

    #[test]
    fn insert_keeps_ids_stable() {
        let mut curve = CurveSequence::new();
        let a = curve.push(line(0, 1)).unwrap();
        let b = curve.insert(0, line(2, 3)).unwrap();
        assert_eq!(curve.len(), 2);
        assert_eq!(curve.position_of(a).unwrap(), 1);
        assert_eq!(curve.position_of(b).unwrap(), 0);
        assert_eq!(curve.get(1).unwrap().start(), Some(VertexIndex::new(0)));
    }

    #[test]
    fn try_clone_keeps_ids_and_payloads() {
        let mut curve = CurveSequence::new();
        let a = curve.push(line(0, 1)).unwrap();
        let b = curve
            .push(Segment::Bezier(Bezier::new(vec![
                VertexIndex::new(1),
                VertexIndex::new(2),
            ])))
            .unwrap();
        curve.set_reversed(1, true).unwrap();

        let copy = curve.try_clone().unwrap();
        assert_eq!(copy.position_of(a).unwrap(), 0);
        assert_eq!(copy.position_of(b).unwrap(), 1);
        assert_eq!(copy.by_id(b).unwrap(), curve.by_id(b).unwrap());
        assert!(copy.is_reversed(1).unwrap());
    }

    #[test]
    fn insert_at_len_is_rejected() {
        let mut curve = CurveSequence::new();
        curve.push(line(0, 1)).unwrap();
        let err = curve.insert(1, line(0, 0)).unwrap_err();
        assert!(matches!(
            err,
            crate::error::SketchError::Index(IndexError::Insert { index: 1, count: 1 })
        ));
        assert_eq!(curve.len(), 1);
    }

    #[test]
    fn removed_id_is_stale() {
        let mut curve = CurveSequence::new();
        let a = curve.push(line(0, 1)).unwrap();
        curve.remove(0).unwrap();
        assert!(curve.by_id(a).is_err());
        assert!(curve.position_of(a).is_err());
        assert!(curve.is_empty());
    }

    #[test]
    fn count_refs_spans_segments() {
        let mut curve = CurveSequence::new();
        curve.push(line(0, 1)).unwrap();
        curve.push(line(1, 1)).unwrap();
        assert_eq!(curve.count_refs(VertexIndex::new(1)), 3);
        assert_eq!(curve.count_refs(VertexIndex::new(2)), 0);
    }

    #[test]
    fn slots_respect_segment_shape() {
        let mut curve = CurveSequence::new();
        let l = curve.push(line(0, 1)).unwrap();
        let b = curve.push(Segment::Bezier(Bezier::default())).unwrap();

        assert!(curve.slot(l, RefSlot::Center).is_err());
        assert!(curve.slot(b, RefSlot::Start).is_err());
        assert!(curve.slot(b, RefSlot::ControlPoint(0)).is_err());

        curve.set_slot(l, RefSlot::End, VertexIndex::new(4)).unwrap();
        assert_eq!(curve.slot(l, RefSlot::End).unwrap(), Some(VertexIndex::new(4)));
    }

    #[test]
    fn reverse_flag_round_trip() {
        let mut curve = CurveSequence::new();
        curve.push(line(0, 1)).unwrap();
        assert!(!curve.is_reversed(0).unwrap());
        curve.set_reversed(0, true).unwrap();
        assert!(curve.is_reversed(0).unwrap());
        assert!(curve.set_reversed(3, true).is_err());
    }
}
