mod curve;
mod handle;
mod vertex_pool;

pub use curve::{CurveSequence, RefSlot, SegmentId};
pub use handle::{
    ArcMut, ArcRef, BezierMut, BezierRef, LineMut, LineRef, NurbMut, NurbRef, SegmentAccess,
    SegmentEdit, SegmentMut, SegmentRef,
};
pub use vertex_pool::{VertexIndex, VertexPool};

use tracing::debug;

use crate::error::Result;
use crate::geometry::{Embedding, Segment, SegmentKind};
use crate::math::{Point2, Point3, Vector3};
use crate::operations::query::IsValid;

/// A planar curve network embedded in 3D space.
///
/// The sketch owns a deduplicated vertex pool, the ordered curve sequence whose segments
/// reference that pool by index, and the frame placing the sketch in space. All edits go
/// through the sketch or the borrow-scoped handles it hands out. `Clone` is a deep copy.
#[derive(Debug, Clone, Default)]
pub struct Sketch {
    vertices: VertexPool,
    curve: CurveSequence,
    embedding: Embedding,
}

impl Sketch {
    /// Creates an empty sketch on the world XY plane.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn class_name() -> &'static str {
        "Sketch"
    }

    /// Deep-copies the sketch.
    ///
    /// The vertex pool and the segment order are copied through `try_reserve`. Segment
    /// payloads are cloned normally, so a failure there still aborts.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the pool or order copy cannot be allocated.
    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            vertices: self.vertices.try_clone()?,
            curve: self.curve.try_clone()?,
            embedding: self.embedding,
        })
    }

    /// Replaces this sketch with a deep copy of `other`.
    ///
    /// The copy is built before anything is replaced, so a failure leaves `self` as it was.
    ///
    /// # Errors
    ///
    /// See [`Sketch::try_clone`].
    pub fn assign(&mut self, other: &Sketch) -> Result<()> {
        *self = other.try_clone()?;
        Ok(())
    }

    pub(crate) fn from_parts(vertices: VertexPool, curve: CurveSequence, embedding: Embedding) -> Self {
        Self {
            vertices,
            curve,
            embedding,
        }
    }

    // --- Vertex pool ---

    #[must_use]
    pub fn number_of_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the coordinates of vertex `index`.
    ///
    /// # Errors
    ///
    /// Returns an index error if `index` is out of range.
    pub fn vertex(&self, index: VertexIndex) -> Result<Point2> {
        self.vertices.get(index)
    }

    /// Returns a copy of the vertex pool in index order.
    #[must_use]
    pub fn vertices(&self) -> Vec<Point2> {
        self.vertices.points().to_vec()
    }

    pub(crate) fn pool(&self) -> &VertexPool {
        &self.vertices
    }

    pub(crate) fn curve(&self) -> &CurveSequence {
        &self.curve
    }

    // --- Curve sequence ---

    #[must_use]
    pub fn number_of_segments(&self) -> usize {
        self.curve.len()
    }

    /// Returns the generational id of the segment at `index`.
    ///
    /// # Errors
    ///
    /// Returns an index error if `index` is out of range.
    pub fn segment_id(&self, index: usize) -> Result<SegmentId> {
        self.curve.id_at(index)
    }

    /// Returns the current position of segment `id`.
    ///
    /// # Errors
    ///
    /// Returns a handle error if the segment was deleted.
    pub fn position_of(&self, id: SegmentId) -> Result<usize> {
        self.curve.position_of(id)
    }

    /// Returns an owned copy of the segment at `index`.
    ///
    /// # Errors
    ///
    /// Returns an index error if `index` is out of range.
    pub fn segment(&self, index: usize) -> Result<Segment> {
        self.curve.get(index).cloned()
    }

    /// Calls `f` with a read handle on the segment at `index`.
    ///
    /// # Errors
    ///
    /// Returns an index error if `index` is out of range; `f` is not called then.
    pub fn get<R>(&self, index: usize, f: impl FnOnce(SegmentRef<'_>) -> R) -> Result<R> {
        self.get_by_id(self.curve.id_at(index)?, f)
    }

    /// Calls `f` with a read handle on segment `id`.
    ///
    /// # Errors
    ///
    /// Returns a handle error if the segment was deleted.
    pub fn get_by_id<R>(&self, id: SegmentId, f: impl FnOnce(SegmentRef<'_>) -> R) -> Result<R> {
        let segment = self.curve.by_id(id)?;
        Ok(f(SegmentRef::new(&self.vertices, &self.embedding, id, segment)))
    }

    /// Calls `f` with an edit handle on the segment at `index`.
    ///
    /// # Errors
    ///
    /// Returns an index error if `index` is out of range; `f` is not called then.
    pub fn get_mut<R>(&mut self, index: usize, f: impl FnOnce(SegmentMut<'_>) -> R) -> Result<R> {
        let id = self.curve.id_at(index)?;
        self.get_mut_by_id(id, f)
    }

    /// Calls `f` with an edit handle on segment `id`.
    ///
    /// # Errors
    ///
    /// Returns a handle error if the segment was deleted.
    pub fn get_mut_by_id<R>(
        &mut self,
        id: SegmentId,
        f: impl FnOnce(SegmentMut<'_>) -> R,
    ) -> Result<R> {
        let handle = SegmentMut::new(&mut self.vertices, &mut self.curve, &self.embedding, id)?;
        Ok(f(handle))
    }

    /// Returns the orientation flag of the segment at `index`.
    ///
    /// # Errors
    ///
    /// Returns an index error if `index` is out of range.
    pub fn is_reversed(&self, index: usize) -> Result<bool> {
        self.curve.is_reversed(index)
    }

    /// Records the orientation flag of the segment at `index`.
    ///
    /// # Errors
    ///
    /// Returns an index error if `index` is out of range.
    pub fn set_reversed(&mut self, index: usize, reversed: bool) -> Result<()> {
        self.curve.set_reversed(index, reversed)
    }

    /// Appends a zero-initialized segment of `kind`, seeding the pool with `(0, 0)` when
    /// it is empty so the new segment's references resolve.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the sketch cannot grow; nothing changes then.
    pub fn append(&mut self, kind: SegmentKind) -> Result<SegmentMut<'_>> {
        let id = self.append_empty(kind)?;
        SegmentMut::new(&mut self.vertices, &mut self.curve, &self.embedding, id)
    }

    /// Inserts a zero-initialized segment of `kind` before the segment at `index`.
    ///
    /// # Errors
    ///
    /// Returns an index error if `index` is not less than the segment count, or a storage
    /// error if the sketch cannot grow. The sketch is unchanged in both cases.
    pub fn insert(&mut self, index: usize, kind: SegmentKind) -> Result<SegmentMut<'_>> {
        let id = self.insert_empty(index, kind)?;
        SegmentMut::new(&mut self.vertices, &mut self.curve, &self.embedding, id)
    }

    /// Appends a line; see [`Sketch::append`].
    ///
    /// # Errors
    ///
    /// Returns a storage error if the sketch cannot grow.
    pub fn append_line(&mut self) -> Result<LineMut<'_>> {
        let id = self.append_empty(SegmentKind::Line)?;
        Ok(LineMut::new(&mut self.vertices, &mut self.curve, &self.embedding, id))
    }

    /// Appends a circular arc; see [`Sketch::append`].
    ///
    /// # Errors
    ///
    /// Returns a storage error if the sketch cannot grow.
    pub fn append_arc(&mut self) -> Result<ArcMut<'_>> {
        let id = self.append_empty(SegmentKind::CircularArc)?;
        Ok(ArcMut::new(&mut self.vertices, &mut self.curve, &self.embedding, id))
    }

    /// Appends a NURBS curve without control points; see [`Sketch::append`].
    ///
    /// # Errors
    ///
    /// Returns a storage error if the sketch cannot grow.
    pub fn append_nurb(&mut self) -> Result<NurbMut<'_>> {
        let id = self.append_empty(SegmentKind::Nurb)?;
        Ok(NurbMut::new(&mut self.vertices, &mut self.curve, &self.embedding, id))
    }

    /// Appends a Bezier curve without control points; see [`Sketch::append`].
    ///
    /// # Errors
    ///
    /// Returns a storage error if the sketch cannot grow.
    pub fn append_bezier(&mut self) -> Result<BezierMut<'_>> {
        let id = self.append_empty(SegmentKind::Bezier)?;
        Ok(BezierMut::new(&mut self.vertices, &mut self.curve, &self.embedding, id))
    }

    /// Inserts a line before segment `index`; see [`Sketch::insert`].
    ///
    /// # Errors
    ///
    /// Returns an index error if `index` is not less than the segment count.
    pub fn insert_line(&mut self, index: usize) -> Result<LineMut<'_>> {
        let id = self.insert_empty(index, SegmentKind::Line)?;
        Ok(LineMut::new(&mut self.vertices, &mut self.curve, &self.embedding, id))
    }

    /// Inserts a circular arc before segment `index`; see [`Sketch::insert`].
    ///
    /// # Errors
    ///
    /// Returns an index error if `index` is not less than the segment count.
    pub fn insert_arc(&mut self, index: usize) -> Result<ArcMut<'_>> {
        let id = self.insert_empty(index, SegmentKind::CircularArc)?;
        Ok(ArcMut::new(&mut self.vertices, &mut self.curve, &self.embedding, id))
    }

    /// Inserts a NURBS curve before segment `index`; see [`Sketch::insert`].
    ///
    /// # Errors
    ///
    /// Returns an index error if `index` is not less than the segment count.
    pub fn insert_nurb(&mut self, index: usize) -> Result<NurbMut<'_>> {
        let id = self.insert_empty(index, SegmentKind::Nurb)?;
        Ok(NurbMut::new(&mut self.vertices, &mut self.curve, &self.embedding, id))
    }

    /// Inserts a Bezier curve before segment `index`; see [`Sketch::insert`].
    ///
    /// # Errors
    ///
    /// Returns an index error if `index` is not less than the segment count.
    pub fn insert_bezier(&mut self, index: usize) -> Result<BezierMut<'_>> {
        let id = self.insert_empty(index, SegmentKind::Bezier)?;
        Ok(BezierMut::new(&mut self.vertices, &mut self.curve, &self.embedding, id))
    }

    fn append_empty(&mut self, kind: SegmentKind) -> Result<SegmentId> {
        self.curve.reserve_one()?;
        self.vertices.ensure_seeded()?;
        let id = self.curve.push(Segment::empty(kind))?;
        debug!(%kind, count = self.curve.len(), "segment appended");
        Ok(id)
    }

    fn insert_empty(&mut self, index: usize, kind: SegmentKind) -> Result<SegmentId> {
        self.curve.check_insert(index)?;
        self.curve.reserve_one()?;
        self.vertices.ensure_seeded()?;
        let id = self.curve.insert(index, Segment::empty(kind))?;
        debug!(%kind, index, count = self.curve.len(), "segment inserted");
        Ok(id)
    }

    /// Deletes the segment at `index`.
    ///
    /// Every vertex the segment referenced that no remaining segment references is
    /// retired from the pool, and the remaining references are renumbered.
    ///
    /// # Errors
    ///
    /// Returns an index error if `index` is out of range; the sketch is unchanged then.
    pub fn delete_segment(&mut self, index: usize) -> Result<()> {
        let segment = self.curve.remove(index)?;

        let mut refs = segment.vertex_refs();
        refs.sort_unstable();
        refs.dedup();
        // Highest first, so each retirement leaves the lower indices in `refs` intact.
        let mut retired = 0_usize;
        for vertex in refs.into_iter().rev() {
            if self.vertices.remove_vertex_if_unreferenced(vertex, &mut self.curve)? {
                retired += 1;
            }
        }
        debug!(
            kind = %segment.kind(),
            index,
            retired,
            remaining = self.curve.len(),
            "segment deleted"
        );
        Ok(())
    }

    // --- Embedding ---

    #[must_use]
    pub fn embedding(&self) -> Embedding {
        self.embedding
    }

    pub fn set_embedding(&mut self, embedding: Embedding) {
        self.embedding = embedding;
    }

    #[must_use]
    pub fn embedding_plane_origin(&self) -> Point3 {
        self.embedding.origin()
    }

    pub fn set_embedding_plane_origin(&mut self, origin: Point3) {
        self.embedding.set_origin(origin);
    }

    #[must_use]
    pub fn embedding_plane_x(&self) -> Vector3 {
        self.embedding.plane_x()
    }

    pub fn set_embedding_plane_x(&mut self, plane_x: Vector3) {
        self.embedding.set_plane_x(plane_x);
    }

    #[must_use]
    pub fn embedding_plane_y(&self) -> Vector3 {
        self.embedding.plane_y()
    }

    pub fn set_embedding_plane_y(&mut self, plane_y: Vector3) {
        self.embedding.set_plane_y(plane_y);
    }

    // --- Validation ---

    /// Returns `true` if the curve network passes structural and geometric validation.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        IsValid::new().execute(self)
    }
}
