pub mod arc_2d;
pub mod intersect_2d;
pub mod spline_2d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Per-component tolerance under which two sketch vertices are the same vertex.
pub const VERTEX_TOLERANCE: f64 = 1e-15;

/// Returns `true` if every coordinate of `a` and `b` differs by less than `tolerance`.
#[must_use]
pub fn near_equal_2d(a: &Point2, b: &Point2, tolerance: f64) -> bool {
    (a.x - b.x).abs() < tolerance && (a.y - b.y).abs() < tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn near_equal_is_per_component() {
        let a = Point2::new(1.0, 2.0);
        assert!(near_equal_2d(&a, &Point2::new(1.0, 2.0), VERTEX_TOLERANCE));
        assert!(near_equal_2d(&a, &Point2::new(1.0 + 1e-12, 2.0), 1e-10));
        assert!(!near_equal_2d(&a, &Point2::new(1.0, 2.0 + 1e-9), 1e-10));
    }
}
