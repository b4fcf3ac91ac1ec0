//! Geometry kernel for the whitted ray tracer.
//!
//! Everything here is a plain value type: double precision vectors from glam,
//! parametric intervals, axis-aligned boxes and rays.

// Re-export glam's double precision types for convenience
pub use glam::{dvec2, dvec3, ivec3, DVec2, DVec3, IVec3};

/// 3D vector / point / RGB color.
pub type Vec3 = DVec3;

/// 2D vector, used for texture coordinates and film positions.
pub type Vec2 = DVec2;

// Whitted math types
mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_operations() {
        let a = dvec3(1.0, 2.0, 3.0);
        let b = dvec3(4.0, 5.0, 6.0);
        assert_eq!(a + b, dvec3(5.0, 7.0, 9.0));
        assert_eq!(a.dot(b), 32.0);
        assert_eq!(Vec3::X.cross(Vec3::Y), Vec3::Z);
    }

    #[test]
    fn test_vec3_axis_indexing() {
        let v = dvec3(1.0, 2.0, 3.0);
        assert_eq!(v[0], 1.0);
        assert_eq!(v[2], 3.0);

        let cells = ivec3(4, 5, 6);
        assert_eq!(cells[1], 5);
    }
}
