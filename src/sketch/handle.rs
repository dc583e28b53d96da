//! Borrow-scoped segment handles.
//!
//! A handle pairs a segment with the pool and frame it is read through. Read handles
//! borrow the sketch immutably; edit handles borrow it mutably and route every endpoint
//! change through the vertex pool, so references stay consistent when the pool compacts.

use tracing::trace;

use crate::error::{reserve, GeometryError, HandleError, IndexError, Result, SketchError};
use crate::geometry::{Bezier, CircularArc, Embedding, Line, Nurb, Segment, SegmentKind};
use crate::math::arc_2d::arc_center_from_chord;
use crate::math::{Point2, Point3};

use super::curve::{CurveSequence, RefSlot, SegmentId};
use super::vertex_pool::{VertexIndex, VertexPool};

/// Capabilities shared by every segment handle.
pub trait SegmentAccess {
    /// Returns the generational id of the segment.
    fn id(&self) -> SegmentId;

    fn kind(&self) -> SegmentKind;

    /// Returns the first point of the segment.
    ///
    /// # Errors
    ///
    /// Returns an index error for a curve without control points or a dangling reference.
    fn start_point(&self) -> Result<Point2>;

    /// Returns the last point of the segment.
    ///
    /// # Errors
    ///
    /// Returns an index error for a curve without control points or a dangling reference.
    fn end_point(&self) -> Result<Point2>;

    /// Returns an owned copy of the segment's raw data.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle no longer resolves to its segment.
    fn to_segment(&self) -> Result<Segment>;
}

/// Endpoint edits shared by every mutable segment handle.
///
/// Moving an endpoint only rewrites this segment's slot. Another segment sharing the old
/// vertex keeps it; to move a joint, move the endpoint on every segment that shares it.
pub trait SegmentEdit: SegmentAccess {
    /// Moves the start point.
    ///
    /// # Errors
    ///
    /// Returns an index error for a curve without control points, or a storage error if
    /// the pool cannot grow.
    fn set_start_point(&mut self, point: Point2) -> Result<()>;

    /// Moves the end point.
    ///
    /// # Errors
    ///
    /// Returns an index error for a curve without control points, or a storage error if
    /// the pool cannot grow.
    fn set_end_point(&mut self, point: Point2) -> Result<()>;
}

fn mismatch(expected: SegmentKind, found: SegmentKind) -> SketchError {
    HandleError::KindMismatch { expected, found }.into()
}

fn no_control_points() -> SketchError {
    IndexError::ControlPoint { index: 0, count: 0 }.into()
}

fn control_point_at(points: &[VertexIndex], index: usize) -> Result<VertexIndex> {
    points.get(index).copied().ok_or_else(|| {
        IndexError::ControlPoint {
            index,
            count: points.len(),
        }
        .into()
    })
}

// --- Read handles ---

#[derive(Debug, Clone, Copy)]
struct ViewCtx<'a> {
    vertices: &'a VertexPool,
    embedding: &'a Embedding,
    id: SegmentId,
}

impl ViewCtx<'_> {
    fn point(&self, index: VertexIndex) -> Result<Point2> {
        self.vertices.get(index)
    }

    fn first(&self, points: &[VertexIndex]) -> Result<Point2> {
        self.point(*points.first().ok_or_else(no_control_points)?)
    }

    fn last(&self, points: &[VertexIndex]) -> Result<Point2> {
        self.point(*points.last().ok_or_else(no_control_points)?)
    }
}

/// Read handle on a line segment.
#[derive(Debug, Clone, Copy)]
pub struct LineRef<'a> {
    ctx: ViewCtx<'a>,
    line: &'a Line,
}

impl LineRef<'_> {
    /// Returns the raw line data.
    #[must_use]
    pub fn line(&self) -> &Line {
        self.line
    }
}

impl SegmentAccess for LineRef<'_> {
    fn id(&self) -> SegmentId {
        self.ctx.id
    }

    fn kind(&self) -> SegmentKind {
        SegmentKind::Line
    }

    fn start_point(&self) -> Result<Point2> {
        self.ctx.point(self.line.start)
    }

    fn end_point(&self) -> Result<Point2> {
        self.ctx.point(self.line.end)
    }

    fn to_segment(&self) -> Result<Segment> {
        Ok(Segment::Line(*self.line))
    }
}

/// Read handle on a circular arc.
#[derive(Debug, Clone, Copy)]
pub struct ArcRef<'a> {
    ctx: ViewCtx<'a>,
    arc: &'a CircularArc,
}

impl ArcRef<'_> {
    /// Returns the raw arc data.
    #[must_use]
    pub fn arc(&self) -> &CircularArc {
        self.arc
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.arc.radius
    }

    #[must_use]
    pub fn center_is_left(&self) -> bool {
        self.arc.center_is_left
    }

    #[must_use]
    pub fn clockwise_oriented(&self) -> bool {
        self.arc.clockwise
    }

    /// Returns the arc center in sketch coordinates.
    ///
    /// A radius `<= 0` makes the end vertex the center of a full circle. Otherwise the
    /// explicit center vertex is used when set, and the center is derived from the chord,
    /// radius and side flag when not.
    ///
    /// # Errors
    ///
    /// Returns a geometry error if the chord is degenerate or longer than the diameter.
    pub fn center_2d(&self) -> Result<Point2> {
        if self.arc.is_full_circle() {
            return self.ctx.point(self.arc.end);
        }
        if let Some(center) = self.arc.center {
            return self.ctx.point(center);
        }
        let start = self.ctx.point(self.arc.start)?;
        let end = self.ctx.point(self.arc.end)?;
        arc_center_from_chord(&start, &end, self.arc.radius, self.arc.center_is_left).ok_or_else(
            || {
                GeometryError::Degenerate(format!(
                    "arc chord from {start} to {end} does not fit radius {}",
                    self.arc.radius
                ))
                .into()
            },
        )
    }

    /// Returns the arc center placed in 3D by the sketch embedding.
    ///
    /// # Errors
    ///
    /// See [`ArcRef::center_2d`].
    pub fn center(&self) -> Result<Point3> {
        Ok(self.ctx.embedding.to_world(&self.center_2d()?))
    }
}

impl SegmentAccess for ArcRef<'_> {
    fn id(&self) -> SegmentId {
        self.ctx.id
    }

    fn kind(&self) -> SegmentKind {
        SegmentKind::CircularArc
    }

    fn start_point(&self) -> Result<Point2> {
        self.ctx.point(self.arc.start)
    }

    fn end_point(&self) -> Result<Point2> {
        self.ctx.point(self.arc.end)
    }

    fn to_segment(&self) -> Result<Segment> {
        Ok(Segment::CircularArc(*self.arc))
    }
}

/// Read handle on a NURBS curve.
#[derive(Debug, Clone, Copy)]
pub struct NurbRef<'a> {
    ctx: ViewCtx<'a>,
    nurb: &'a Nurb,
}

impl NurbRef<'_> {
    /// Returns the raw curve data.
    #[must_use]
    pub fn nurb(&self) -> &Nurb {
        self.nurb
    }

    #[must_use]
    pub fn order(&self) -> usize {
        self.nurb.order
    }

    #[must_use]
    pub fn is_rational(&self) -> bool {
        self.nurb.is_rational()
    }

    #[must_use]
    pub fn number_of_knots(&self) -> usize {
        self.nurb.knots.len()
    }

    /// Returns knot `index`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Knot`] if `index` is out of range.
    pub fn knot(&self, index: usize) -> Result<f64> {
        self.nurb.knots.get(index).copied().ok_or_else(|| {
            IndexError::Knot {
                index,
                count: self.nurb.knots.len(),
            }
            .into()
        })
    }

    #[must_use]
    pub fn number_of_control_points(&self) -> usize {
        self.nurb.control_points.len()
    }

    /// Returns control point `index`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::ControlPoint`] if `index` is out of range.
    pub fn control_point(&self, index: usize) -> Result<Point2> {
        self.ctx
            .point(control_point_at(&self.nurb.control_points, index)?)
    }

    /// Returns the weight of control point `index`, `0.0` for a non-rational curve.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::ControlPoint`] if `index` is out of range.
    pub fn control_point_weight(&self, index: usize) -> Result<f64> {
        control_point_at(&self.nurb.control_points, index)?;
        match &self.nurb.weights {
            None => Ok(0.0),
            Some(weights) => weights.get(index).copied().ok_or_else(|| {
                IndexError::ControlPoint {
                    index,
                    count: weights.len(),
                }
                .into()
            }),
        }
    }
}

impl SegmentAccess for NurbRef<'_> {
    fn id(&self) -> SegmentId {
        self.ctx.id
    }

    fn kind(&self) -> SegmentKind {
        SegmentKind::Nurb
    }

    fn start_point(&self) -> Result<Point2> {
        self.ctx.first(&self.nurb.control_points)
    }

    fn end_point(&self) -> Result<Point2> {
        self.ctx.last(&self.nurb.control_points)
    }

    fn to_segment(&self) -> Result<Segment> {
        Ok(Segment::Nurb(self.nurb.clone()))
    }
}

/// Read handle on a Bezier curve.
#[derive(Debug, Clone, Copy)]
pub struct BezierRef<'a> {
    ctx: ViewCtx<'a>,
    bezier: &'a Bezier,
}

impl BezierRef<'_> {
    /// Returns the raw curve data.
    #[must_use]
    pub fn bezier(&self) -> &Bezier {
        self.bezier
    }

    #[must_use]
    pub fn degree(&self) -> usize {
        self.bezier.degree()
    }

    #[must_use]
    pub fn number_of_control_points(&self) -> usize {
        self.bezier.control_points.len()
    }

    /// Returns control point `index`, valid for `0..=degree`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::ControlPoint`] if `index` is out of range.
    pub fn control_point(&self, index: usize) -> Result<Point2> {
        self.ctx
            .point(control_point_at(&self.bezier.control_points, index)?)
    }
}

impl SegmentAccess for BezierRef<'_> {
    fn id(&self) -> SegmentId {
        self.ctx.id
    }

    fn kind(&self) -> SegmentKind {
        SegmentKind::Bezier
    }

    fn start_point(&self) -> Result<Point2> {
        self.ctx.first(&self.bezier.control_points)
    }

    fn end_point(&self) -> Result<Point2> {
        self.ctx.last(&self.bezier.control_points)
    }

    fn to_segment(&self) -> Result<Segment> {
        Ok(Segment::Bezier(self.bezier.clone()))
    }
}

/// Read handle on a segment of any kind, as passed to [`Sketch::get`](super::Sketch::get).
#[derive(Debug, Clone, Copy)]
pub enum SegmentRef<'a> {
    Line(LineRef<'a>),
    CircularArc(ArcRef<'a>),
    Nurb(NurbRef<'a>),
    Bezier(BezierRef<'a>),
}

impl<'a> SegmentRef<'a> {
    pub(crate) fn new(
        vertices: &'a VertexPool,
        embedding: &'a Embedding,
        id: SegmentId,
        segment: &'a Segment,
    ) -> Self {
        let ctx = ViewCtx {
            vertices,
            embedding,
            id,
        };
        match segment {
            Segment::Line(line) => Self::Line(LineRef { ctx, line }),
            Segment::CircularArc(arc) => Self::CircularArc(ArcRef { ctx, arc }),
            Segment::Nurb(nurb) => Self::Nurb(NurbRef { ctx, nurb }),
            Segment::Bezier(bezier) => Self::Bezier(BezierRef { ctx, bezier }),
        }
    }

    fn access(&self) -> &dyn SegmentAccess {
        match self {
            Self::Line(h) => h,
            Self::CircularArc(h) => h,
            Self::Nurb(h) => h,
            Self::Bezier(h) => h,
        }
    }
}

impl SegmentAccess for SegmentRef<'_> {
    fn id(&self) -> SegmentId {
        self.access().id()
    }

    fn kind(&self) -> SegmentKind {
        self.access().kind()
    }

    fn start_point(&self) -> Result<Point2> {
        self.access().start_point()
    }

    fn end_point(&self) -> Result<Point2> {
        self.access().end_point()
    }

    fn to_segment(&self) -> Result<Segment> {
        self.access().to_segment()
    }
}

// --- Edit handles ---

#[derive(Debug)]
struct EditCtx<'a> {
    vertices: &'a mut VertexPool,
    curve: &'a mut CurveSequence,
    embedding: &'a Embedding,
    id: SegmentId,
}

impl EditCtx<'_> {
    fn view(&self) -> Result<SegmentRef<'_>> {
        let segment = self.curve.by_id(self.id)?;
        Ok(SegmentRef::new(&*self.vertices, self.embedding, self.id, segment))
    }

    fn segment_mut(&mut self) -> Result<&mut Segment> {
        self.curve.by_id_mut(self.id)
    }

    /// Points `slot` at `point`, retiring the old vertex if the slot was its only user.
    fn swap(&mut self, slot: RefSlot, point: Point2) -> Result<VertexIndex> {
        let old = self.curve.slot(self.id, slot)?;
        let new = match old {
            Some(old) => self.vertices.swap_vertex(old, point, &mut *self.curve)?,
            None => self.vertices.add_vertex(point)?,
        };
        self.curve.set_slot(self.id, slot, new)?;
        Ok(new)
    }

    /// Adds `point` to the pool and reports whether the pool grew.
    fn add_if_new(&mut self, point: Point2) -> Result<Option<VertexIndex>> {
        let before = self.vertices.len();
        let index = self.vertices.add_vertex(point)?;
        if self.vertices.len() == before {
            trace!(%index, "control point deduplicated, curve unchanged");
            return Ok(None);
        }
        Ok(Some(index))
    }
}

macro_rules! edit_handle {
    ($name:ident, $view:ident, $variant:ident) => {
        impl<'a> $name<'a> {
            pub(crate) fn new(
                vertices: &'a mut VertexPool,
                curve: &'a mut CurveSequence,
                embedding: &'a Embedding,
                id: SegmentId,
            ) -> Self {
                Self {
                    ctx: EditCtx {
                        vertices,
                        curve,
                        embedding,
                        id,
                    },
                }
            }

            /// Returns a read handle on the same segment.
            ///
            /// # Errors
            ///
            /// Returns a handle error if the segment no longer has the expected kind.
            pub fn view(&self) -> Result<$view<'_>> {
                match self.ctx.view()? {
                    SegmentRef::$variant(view) => Ok(view),
                    other => Err(mismatch(SegmentKind::$variant, other.kind())),
                }
            }
        }

        impl SegmentAccess for $name<'_> {
            fn id(&self) -> SegmentId {
                self.ctx.id
            }

            fn kind(&self) -> SegmentKind {
                SegmentKind::$variant
            }

            fn start_point(&self) -> Result<Point2> {
                self.ctx.view()?.start_point()
            }

            fn end_point(&self) -> Result<Point2> {
                self.ctx.view()?.end_point()
            }

            fn to_segment(&self) -> Result<Segment> {
                self.ctx.view()?.to_segment()
            }
        }

        impl SegmentEdit for $name<'_> {
            fn set_start_point(&mut self, point: Point2) -> Result<()> {
                self.ctx.swap(RefSlot::Start, point).map(|_| ())
            }

            fn set_end_point(&mut self, point: Point2) -> Result<()> {
                self.ctx.swap(RefSlot::End, point).map(|_| ())
            }
        }
    };
}

/// Raw payload access for edit handles whose kind carries more than endpoints.
macro_rules! edit_data {
    ($name:ident, $variant:ident, $data:ty) => {
        impl $name<'_> {
            fn data_mut(&mut self) -> Result<&mut $data> {
                match self.ctx.segment_mut()? {
                    Segment::$variant(data) => Ok(data),
                    other => Err(mismatch(SegmentKind::$variant, other.kind())),
                }
            }
        }
    };
}

/// Edit handle on a line segment.
#[derive(Debug)]
pub struct LineMut<'a> {
    ctx: EditCtx<'a>,
}

edit_handle!(LineMut, LineRef, Line);

/// Edit handle on a circular arc.
#[derive(Debug)]
pub struct ArcMut<'a> {
    ctx: EditCtx<'a>,
}

edit_handle!(ArcMut, ArcRef, CircularArc);
edit_data!(ArcMut, CircularArc, CircularArc);

impl ArcMut<'_> {
    /// Sets the explicit center vertex.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the pool cannot grow.
    pub fn set_center(&mut self, center: Point2) -> Result<()> {
        self.ctx.swap(RefSlot::Center, center).map(|_| ())
    }

    /// Sets the radius; `<= 0` switches the arc to the full-circle convention.
    ///
    /// # Errors
    ///
    /// Returns a handle error if the segment is no longer an arc.
    pub fn set_radius(&mut self, radius: f64) -> Result<()> {
        self.data_mut()?.radius = radius;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns a handle error if the segment is no longer an arc.
    pub fn set_center_is_left(&mut self, center_is_left: bool) -> Result<()> {
        self.data_mut()?.center_is_left = center_is_left;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns a handle error if the segment is no longer an arc.
    pub fn set_clockwise_oriented(&mut self, clockwise: bool) -> Result<()> {
        self.data_mut()?.clockwise = clockwise;
        Ok(())
    }
}

/// Edit handle on a NURBS curve.
#[derive(Debug)]
pub struct NurbMut<'a> {
    ctx: EditCtx<'a>,
}

edit_handle!(NurbMut, NurbRef, Nurb);
edit_data!(NurbMut, Nurb, Nurb);

impl NurbMut<'_> {
    /// # Errors
    ///
    /// Returns a handle error if the segment is no longer a NURBS curve.
    pub fn set_order(&mut self, order: usize) -> Result<()> {
        self.data_mut()?.order = order;
        Ok(())
    }

    /// Appends a knot. Knot monotonicity is checked by validation, not here.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the knot vector cannot grow.
    pub fn add_knot(&mut self, knot: f64) -> Result<()> {
        let nurb = self.data_mut()?;
        reserve(&mut nurb.knots, 1, "nurb knots")?;
        nurb.knots.push(knot);
        Ok(())
    }

    /// Moves control point `index`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::ControlPoint`] if `index` is out of range.
    pub fn set_control_point(&mut self, index: usize, point: Point2) -> Result<()> {
        self.ctx.swap(RefSlot::ControlPoint(index), point).map(|_| ())
    }

    /// Appends a control point.
    ///
    /// The control polygon only grows when `point` adds a new vertex to the pool; a point
    /// that matches an existing vertex leaves the curve unchanged and returns `false`.
    /// A rational curve gets weight `1.0` for the new point.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the curve or pool cannot grow.
    pub fn add_control_point(&mut self, point: Point2) -> Result<bool> {
        {
            let nurb = self.data_mut()?;
            reserve(&mut nurb.control_points, 1, "nurb control points")?;
            if let Some(weights) = nurb.weights.as_mut() {
                reserve(weights, 1, "nurb weights")?;
            }
        }
        let Some(index) = self.ctx.add_if_new(point)? else {
            return Ok(false);
        };
        let nurb = self.data_mut()?;
        nurb.control_points.push(index);
        if let Some(weights) = nurb.weights.as_mut() {
            weights.push(1.0);
        }
        Ok(true)
    }

    /// Appends a weighted control point, making the curve rational.
    ///
    /// Follows the growth rule of [`NurbMut::add_control_point`]. When the curve was not
    /// rational yet, the existing control points get weight `1.0`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the curve or pool cannot grow.
    pub fn add_control_point_weight(&mut self, point: Point2, weight: f64) -> Result<bool> {
        let fresh_weights = {
            let nurb = self.data_mut()?;
            reserve(&mut nurb.control_points, 1, "nurb control points")?;
            match nurb.weights.as_mut() {
                Some(weights) => {
                    reserve(weights, 1, "nurb weights")?;
                    None
                }
                None => {
                    let mut weights = Vec::new();
                    reserve(&mut weights, nurb.control_points.len() + 1, "nurb weights")?;
                    weights.resize(nurb.control_points.len(), 1.0);
                    Some(weights)
                }
            }
        };
        let Some(index) = self.ctx.add_if_new(point)? else {
            return Ok(false);
        };
        let nurb = self.data_mut()?;
        if let Some(weights) = fresh_weights {
            nurb.weights = Some(weights);
        }
        nurb.control_points.push(index);
        if let Some(weights) = nurb.weights.as_mut() {
            weights.push(weight);
        }
        Ok(true)
    }
}

/// Edit handle on a Bezier curve.
#[derive(Debug)]
pub struct BezierMut<'a> {
    ctx: EditCtx<'a>,
}

edit_handle!(BezierMut, BezierRef, Bezier);
edit_data!(BezierMut, Bezier, Bezier);

impl BezierMut<'_> {
    /// Moves control point `index`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::ControlPoint`] if `index` is out of range.
    pub fn set_control_point(&mut self, index: usize, point: Point2) -> Result<()> {
        self.ctx.swap(RefSlot::ControlPoint(index), point).map(|_| ())
    }

    /// Appends a control point, raising the degree by one.
    ///
    /// Like [`NurbMut::add_control_point`], nothing is appended when `point` matches a
    /// vertex already in the pool.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the curve or pool cannot grow.
    pub fn add_control_point(&mut self, point: Point2) -> Result<bool> {
        reserve(&mut self.data_mut()?.control_points, 1, "bezier control points")?;
        let Some(index) = self.ctx.add_if_new(point)? else {
            return Ok(false);
        };
        self.data_mut()?.control_points.push(index);
        Ok(true)
    }
}

/// Edit handle on a segment of any kind, as passed to
/// [`Sketch::get_mut`](super::Sketch::get_mut).
#[derive(Debug)]
pub enum SegmentMut<'a> {
    Line(LineMut<'a>),
    CircularArc(ArcMut<'a>),
    Nurb(NurbMut<'a>),
    Bezier(BezierMut<'a>),
}

impl<'a> SegmentMut<'a> {
    pub(crate) fn new(
        vertices: &'a mut VertexPool,
        curve: &'a mut CurveSequence,
        embedding: &'a Embedding,
        id: SegmentId,
    ) -> Result<Self> {
        let kind = curve.by_id(id)?.kind();
        Ok(match kind {
            SegmentKind::Line => Self::Line(LineMut::new(vertices, curve, embedding, id)),
            SegmentKind::CircularArc => {
                Self::CircularArc(ArcMut::new(vertices, curve, embedding, id))
            }
            SegmentKind::Nurb => Self::Nurb(NurbMut::new(vertices, curve, embedding, id)),
            SegmentKind::Bezier => Self::Bezier(BezierMut::new(vertices, curve, embedding, id)),
        })
    }

    fn edit(&mut self) -> &mut dyn SegmentEdit {
        match self {
            Self::Line(h) => h,
            Self::CircularArc(h) => h,
            Self::Nurb(h) => h,
            Self::Bezier(h) => h,
        }
    }

    fn access(&self) -> &dyn SegmentAccess {
        match self {
            Self::Line(h) => h,
            Self::CircularArc(h) => h,
            Self::Nurb(h) => h,
            Self::Bezier(h) => h,
        }
    }
}

impl SegmentAccess for SegmentMut<'_> {
    fn id(&self) -> SegmentId {
        self.access().id()
    }

    fn kind(&self) -> SegmentKind {
        self.access().kind()
    }

    fn start_point(&self) -> Result<Point2> {
        self.access().start_point()
    }

    fn end_point(&self) -> Result<Point2> {
        self.access().end_point()
    }

    fn to_segment(&self) -> Result<Segment> {
        self.access().to_segment()
    }
}

impl SegmentEdit for SegmentMut<'_> {
    fn set_start_point(&mut self, point: Point2) -> Result<()> {
        self.edit().set_start_point(point)
    }

    fn set_end_point(&mut self, point: Point2) -> Result<()> {
        self.edit().set_end_point(point)
    }
}
