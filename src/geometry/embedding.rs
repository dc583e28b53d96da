use crate::math::{Point2, Point3, Vector3};

/// The 3D frame a sketch lives in.
///
/// Sketch coordinates `(x, y)` map to `origin + x * plane_x + y * plane_y`.
/// The basis is stored verbatim. It is neither normalized nor checked for orthogonality;
/// callers supply a sane basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Embedding {
    origin: Point3,
    plane_x: Vector3,
    plane_y: Vector3,
}

impl Default for Embedding {
    /// The world XY plane through the origin.
    fn default() -> Self {
        Self {
            origin: Point3::origin(),
            plane_x: Vector3::x(),
            plane_y: Vector3::y(),
        }
    }
}

impl Embedding {
    /// Creates an embedding from an origin and two basis vectors.
    #[must_use]
    pub fn new(origin: Point3, plane_x: Vector3, plane_y: Vector3) -> Self {
        Self {
            origin,
            plane_x,
            plane_y,
        }
    }

    #[must_use]
    pub fn origin(&self) -> Point3 {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Point3) {
        self.origin = origin;
    }

    /// Returns the basis vector sketch `x` coordinates scale.
    #[must_use]
    pub fn plane_x(&self) -> Vector3 {
        self.plane_x
    }

    pub fn set_plane_x(&mut self, plane_x: Vector3) {
        self.plane_x = plane_x;
    }

    /// Returns the basis vector sketch `y` coordinates scale.
    #[must_use]
    pub fn plane_y(&self) -> Vector3 {
        self.plane_y
    }

    pub fn set_plane_y(&mut self, plane_y: Vector3) {
        self.plane_y = plane_y;
    }

    /// Places a sketch point in 3D space.
    #[must_use]
    pub fn to_world(&self, point: &Point2) -> Point3 {
        self.origin + self.plane_x * point.x + self.plane_y * point.y
    }
}
