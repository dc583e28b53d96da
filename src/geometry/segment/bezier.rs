use crate::sketch::VertexIndex;

/// A Bezier curve over pool vertices; its degree is one less than its control point count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bezier {
    pub(crate) control_points: Vec<VertexIndex>,
}

impl Bezier {
    /// Creates a Bezier curve from its control polygon.
    #[must_use]
    pub fn new(control_points: Vec<VertexIndex>) -> Self {
        Self { control_points }
    }

    #[must_use]
    pub fn control_points(&self) -> &[VertexIndex] {
        &self.control_points
    }

    /// Returns the degree, `0` for a curve with fewer than two control points.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.control_points.len().saturating_sub(1)
    }
}
