use std::fmt;

use tracing::{debug, trace};

use crate::error::{reserve, IndexError, Result};
use crate::math::{near_equal_2d, Point2, VERTEX_TOLERANCE};

use super::curve::CurveSequence;

/// Position of a vertex in a [`VertexPool`].
///
/// Indices are unstable: retiring a vertex renumbers every vertex after it, and the pool
/// rewrites the references held by the curve sequence in the same step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexIndex(usize);

impl VertexIndex {
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl From<usize> for VertexIndex {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for VertexIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ordered, deduplicated store of sketch vertices.
///
/// No two entries lie within [`VERTEX_TOLERANCE`] of each other. Lookups are linear:
/// a pool holds the handful of vertices of an edited profile, not bulk geometry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexPool {
    points: Vec<Point2>,
}

impl VertexPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the coordinates of the vertex at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Vertex`] if `index` is past the end of the pool.
    pub fn get(&self, index: VertexIndex) -> Result<Point2> {
        self.points
            .get(index.get())
            .copied()
            .ok_or_else(|| self.out_of_range(index).into())
    }

    /// Returns the pool contents in index order.
    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Returns the index of the vertex within tolerance of `point`, if any.
    #[must_use]
    pub fn find(&self, point: &Point2) -> Option<VertexIndex> {
        self.points
            .iter()
            .position(|p| near_equal_2d(p, point, VERTEX_TOLERANCE))
            .map(VertexIndex)
    }

    /// Adds `point` to the pool, reusing an existing vertex within tolerance.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the pool cannot grow; the pool is unchanged then.
    pub fn add_vertex(&mut self, point: Point2) -> Result<VertexIndex> {
        if let Some(index) = self.find(&point) {
            trace!(%index, "vertex reused");
            return Ok(index);
        }
        reserve(&mut self.points, 1, "vertex pool")?;
        self.points.push(point);
        Ok(VertexIndex(self.points.len() - 1))
    }

    /// Appends `point` without deduplication. Used when loading stored sketches, whose
    /// vertex numbering must be kept as written.
    pub(crate) fn push_raw(&mut self, point: Point2) -> Result<VertexIndex> {
        reserve(&mut self.points, 1, "vertex pool")?;
        self.points.push(point);
        Ok(VertexIndex(self.points.len() - 1))
    }

    /// Seeds a `(0, 0)` vertex into an empty pool so default segment references resolve.
    pub(crate) fn ensure_seeded(&mut self) -> Result<()> {
        if self.points.is_empty() {
            self.add_vertex(Point2::origin())?;
        }
        Ok(())
    }

    /// Retires the vertex at `index` if at most one slot in `curve` still references it.
    ///
    /// The single allowed reference is the caller's own slot, which the caller is about to
    /// release. On removal every reference past `index` is shifted down by one.
    /// Returns whether the vertex was removed.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Vertex`] if `index` is past the end of the pool.
    pub fn remove_vertex_if_unused(
        &mut self,
        index: VertexIndex,
        curve: &mut CurveSequence,
    ) -> Result<bool> {
        self.retire(index, curve, 1)
    }

    /// Retires the vertex at `index` if no slot in `curve` references it.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Vertex`] if `index` is past the end of the pool.
    pub fn remove_vertex_if_unreferenced(
        &mut self,
        index: VertexIndex,
        curve: &mut CurveSequence,
    ) -> Result<bool> {
        self.retire(index, curve, 0)
    }

    /// Replaces the vertex one slot refers to.
    ///
    /// If `new_point` is within tolerance of the vertex at `old`, `old` is returned and
    /// nothing changes. Otherwise the old vertex is retired when the caller's slot was its
    /// only reference, `new_point` is added (or reused), and its index is returned. The
    /// caller stores the returned index in its slot; other slots sharing `old` keep it.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Vertex`] for an out-of-range `old`, or a storage error if
    /// the pool cannot grow. In both cases pool and curve are left untouched.
    pub fn swap_vertex(
        &mut self,
        old: VertexIndex,
        new_point: Point2,
        curve: &mut CurveSequence,
    ) -> Result<VertexIndex> {
        let current = self.get(old)?;
        if near_equal_2d(&current, &new_point, VERTEX_TOLERANCE) {
            return Ok(old);
        }

        // Room for the new vertex first, so retiring `old` is never left half done.
        reserve(&mut self.points, 1, "vertex pool")?;
        self.retire(old, curve, 1)?;
        self.add_vertex(new_point)
    }

    fn retire(&mut self, index: VertexIndex, curve: &mut CurveSequence, allowed: usize) -> Result<bool> {
        if index.get() >= self.points.len() {
            return Err(self.out_of_range(index).into());
        }

        let usage = curve.count_refs(index);
        if usage > allowed {
            return Ok(false);
        }

        self.points.remove(index.get());
        curve.for_each_ref_mut(|slot| {
            if slot.0 > index.0 {
                slot.0 -= 1;
            }
        });
        debug!(%index, remaining = self.points.len(), "vertex retired");
        Ok(true)
    }

    /// Copies the pool, reporting allocation failure instead of aborting.
    pub(crate) fn try_clone(&self) -> Result<Self> {
        let mut points = Vec::new();
        reserve(&mut points, self.points.len(), "vertex pool")?;
        points.extend_from_slice(&self.points);
        Ok(Self { points })
    }

    fn out_of_range(&self, index: VertexIndex) -> IndexError {
        IndexError::Vertex {
            index: index.get(),
            count: self.points.len(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Line, Segment};

    fn line(start: usize, end: usize) -> Segment {
        Segment::Line(Line::new(VertexIndex::new(start), VertexIndex::new(end)))
    }

    #[test]
    fn add_vertex_deduplicates() {
        let mut pool = VertexPool::new();
        let a = pool.add_vertex(Point2::new(1.0, 2.0)).unwrap();
        let b = pool.add_vertex(Point2::new(3.0, 4.0)).unwrap();
        let c = pool.add_vertex(Point2::new(1.0, 2.0)).unwrap();
        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn get_out_of_range_is_error() {
        let pool = VertexPool::new();
        let err = pool.get(VertexIndex::new(0)).unwrap_err();
        assert!(err.to_string().contains("vertex index 0"));
    }

    #[test]
    fn remove_shared_vertex_is_refused() {
        let mut pool = VertexPool::new();
        for p in [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)] {
            pool.add_vertex(Point2::new(p.0, p.1)).unwrap();
        }
        let mut curve = CurveSequence::new();
        curve.push(line(0, 1)).unwrap();
        curve.push(line(1, 2)).unwrap();

        assert!(!pool.remove_vertex_if_unused(VertexIndex::new(1), &mut curve).unwrap());
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn remove_renumbers_later_references() {
        let mut pool = VertexPool::new();
        for p in [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)] {
            pool.add_vertex(Point2::new(p.0, p.1)).unwrap();
        }
        let mut curve = CurveSequence::new();
        curve.push(line(1, 2)).unwrap();

        assert!(pool.remove_vertex_if_unreferenced(VertexIndex::new(0), &mut curve).unwrap());
        assert_eq!(pool.len(), 2);
        let seg = curve.get(0).unwrap();
        assert_eq!(seg.start(), Some(VertexIndex::new(0)));
        assert_eq!(seg.end(), Some(VertexIndex::new(1)));
        assert_eq!(pool.get(VertexIndex::new(1)).unwrap(), Point2::new(2.0, 0.0));
    }

    #[test]
    fn swap_same_point_keeps_index() {
        let mut pool = VertexPool::new();
        pool.add_vertex(Point2::new(5.0, 5.0)).unwrap();
        let mut curve = CurveSequence::new();
        curve.push(line(0, 0)).unwrap();

        let idx = pool.swap_vertex(VertexIndex::new(0), Point2::new(5.0, 5.0), &mut curve).unwrap();
        assert_eq!(idx, VertexIndex::new(0));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn swap_sole_reference_retires_old_vertex() {
        let mut pool = VertexPool::new();
        pool.add_vertex(Point2::new(0.0, 0.0)).unwrap();
        pool.add_vertex(Point2::new(1.0, 1.0)).unwrap();
        let mut curve = CurveSequence::new();
        curve.push(line(0, 1)).unwrap();

        let idx = pool.swap_vertex(VertexIndex::new(0), Point2::new(7.0, 7.0), &mut curve).unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(idx, VertexIndex::new(1));
        // The surviving end reference was shifted from #1 to #0.
        assert_eq!(curve.get(0).unwrap().end(), Some(VertexIndex::new(0)));
    }

    #[test]
    fn swap_shared_vertex_keeps_it_for_other_segment() {
        let mut pool = VertexPool::new();
        for p in [(0.0, 0.0), (5.0, 5.0), (10.0, 0.0)] {
            pool.add_vertex(Point2::new(p.0, p.1)).unwrap();
        }
        let mut curve = CurveSequence::new();
        curve.push(line(0, 1)).unwrap();
        curve.push(line(1, 2)).unwrap();
        assert_eq!(curve.count_refs(VertexIndex::new(1)), 2);

        let idx = pool.swap_vertex(VertexIndex::new(1), Point2::new(6.0, 6.0), &mut curve).unwrap();
        assert_eq!(idx, VertexIndex::new(3));
        assert_eq!(pool.len(), 4);
        assert_eq!(pool.get(VertexIndex::new(1)).unwrap(), Point2::new(5.0, 5.0));
        assert_eq!(curve.get(1).unwrap().start(), Some(VertexIndex::new(1)));
    }
}
