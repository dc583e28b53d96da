use crate::sketch::VertexIndex;

/// A circular arc between two pool vertices.
///
/// The arc runs from `start` to `end` on a circle of `radius`, with its center on the
/// side of the chord selected by `center_is_left`. A radius `<= 0` marks a full circle
/// centered on `end` and passing through `start`. The optional explicit `center` vertex
/// is only consulted for a positive radius. None of these fields are cross-checked.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CircularArc {
    pub(crate) start: VertexIndex,
    pub(crate) end: VertexIndex,
    pub(crate) center: Option<VertexIndex>,
    pub(crate) radius: f64,
    pub(crate) center_is_left: bool,
    pub(crate) clockwise: bool,
}

impl CircularArc {
    /// Creates an arc without an explicit center vertex.
    #[must_use]
    pub fn new(
        start: VertexIndex,
        end: VertexIndex,
        radius: f64,
        center_is_left: bool,
        clockwise: bool,
    ) -> Self {
        Self {
            start,
            end,
            center: None,
            radius,
            center_is_left,
            clockwise,
        }
    }

    /// Returns this arc with an explicit center vertex.
    #[must_use]
    pub fn with_center(mut self, center: VertexIndex) -> Self {
        self.center = Some(center);
        self
    }

    #[must_use]
    pub fn start(&self) -> VertexIndex {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> VertexIndex {
        self.end
    }

    /// Returns the explicit center vertex, if one was set.
    #[must_use]
    pub fn center(&self) -> Option<VertexIndex> {
        self.center
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns `true` if this arc uses the full-circle convention (`radius <= 0`).
    #[must_use]
    pub fn is_full_circle(&self) -> bool {
        self.radius <= 0.0
    }

    #[must_use]
    pub fn center_is_left(&self) -> bool {
        self.center_is_left
    }

    #[must_use]
    pub fn clockwise_oriented(&self) -> bool {
        self.clockwise
    }
}
