use crate::sketch::VertexIndex;

/// A NURBS curve over pool vertices.
///
/// `order` is degree + 1. The knot vector should hold `control_points + order`
/// non-decreasing values. When `weights` is present it runs parallel to the control
/// points and the curve is rational.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Nurb {
    pub(crate) order: usize,
    pub(crate) control_points: Vec<VertexIndex>,
    pub(crate) knots: Vec<f64>,
    pub(crate) weights: Option<Vec<f64>>,
}

impl Nurb {
    /// Creates a NURBS curve from its raw parts.
    #[must_use]
    pub fn new(
        order: usize,
        control_points: Vec<VertexIndex>,
        knots: Vec<f64>,
        weights: Option<Vec<f64>>,
    ) -> Self {
        Self {
            order,
            control_points,
            knots,
            weights,
        }
    }

    #[must_use]
    pub fn order(&self) -> usize {
        self.order
    }

    #[must_use]
    pub fn control_points(&self) -> &[VertexIndex] {
        &self.control_points
    }

    #[must_use]
    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    #[must_use]
    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }

    /// Returns `true` if the curve carries a weight list.
    #[must_use]
    pub fn is_rational(&self) -> bool {
        self.weights.is_some()
    }
}
