//! Triangle mesh object.
//!
//! Each triangle is one part, so the acceleration grid can place triangles
//! individually. Inside/outside is decided with signed barycentric weights
//! and a small tolerance, which closes seams along shared edges.

use std::sync::Arc;

use crate::{Hit, Object, SMALL_T};
use whitted_core::Mesh;
use whitted_math::{Aabb, Ray, Vec2, Vec3};

/// Barycentric weights may be this far below zero and still count as inside.
const WEIGHT_TOLERANCE: f64 = 1e-4;

/// `|direction . normal|` below this counts as parallel.
const PARALLEL_TOLERANCE: f64 = 1e-12;

/// A renderable triangle mesh.
#[derive(Debug, Clone)]
pub struct MeshObject {
    mesh: Arc<Mesh>,
}

impl MeshObject {
    pub fn new(mesh: Arc<Mesh>) -> Self {
        Self { mesh }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    fn intersect_triangle(&self, ray: &Ray, tri: usize) -> Option<Hit> {
        let [a, b, c] = self.mesh.triangle(tri);

        let normal = (b - a).cross(c - a);
        let normal_sq = normal.length_squared();
        if normal_sq == 0.0 {
            // Degenerate triangle
            return None;
        }

        let denominator = ray.direction.dot(normal);
        if denominator.abs() < PARALLEL_TOLERANCE * normal_sq.sqrt() {
            return None;
        }

        let t = (a - ray.endpoint).dot(normal) / denominator;
        if t < SMALL_T {
            return None;
        }

        let p = ray.at(t);

        // Signed sub-triangle areas relative to the full triangle
        let alpha = (b - p).cross(c - p).dot(normal) / normal_sq;
        let beta = (c - p).cross(a - p).dot(normal) / normal_sq;
        let gamma = 1.0 - alpha - beta;

        if alpha < -WEIGHT_TOLERANCE || beta < -WEIGHT_TOLERANCE || gamma < -WEIGHT_TOLERANCE {
            return None;
        }

        let uv = match self.mesh.triangle_uvs(tri) {
            Some([uv_a, uv_b, uv_c]) => uv_a * alpha + uv_b * beta + uv_c * gamma,
            None => Vec2::ZERO,
        };

        Some(Hit::new(t, Some(tri)).with_uv(uv))
    }
}

impl Object for MeshObject {
    fn intersection(&self, ray: &Ray, part: Option<usize>) -> Option<Hit> {
        match part {
            Some(tri) => self.intersect_triangle(ray, tri),
            None => (0..self.mesh.triangle_count())
                .filter_map(|tri| self.intersect_triangle(ray, tri))
                .fold(None, |best: Option<Hit>, hit| match best {
                    Some(b) if b.dist <= hit.dist => Some(b),
                    _ => Some(hit),
                }),
        }
    }

    fn normal(&self, _point: Vec3, hit: &Hit) -> Vec3 {
        let Some(tri) = hit.part else {
            return Vec3::ZERO;
        };
        let [a, b, c] = self.mesh.triangle(tri);
        (b - a).cross(c - a).normalize_or_zero()
    }

    fn bounding_box(&self, part: Option<usize>) -> (Aabb, bool) {
        match part {
            Some(tri) => {
                let [a, b, c] = self.mesh.triangle(tri);
                let mut bbox = Aabb::from_points(a, b);
                bbox.include_point(c);
                (bbox, false)
            }
            None => (self.mesh.bounds, false),
        }
    }

    fn num_parts(&self) -> usize {
        self.mesh.triangle_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unit square in the z = 0 plane split along its diagonal, with UVs.
    fn quad() -> MeshObject {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let uvs = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        let indices = vec![0, 1, 2, 0, 2, 3];
        let mesh = Mesh::new_with_uvs(positions, indices.clone(), Some((uvs, indices))).unwrap();
        MeshObject::new(Arc::new(mesh))
    }

    fn down_at(x: f64, y: f64) -> Ray {
        Ray::new(Vec3::new(x, y, 2.0), Vec3::new(0.0, 0.0, -1.0))
    }

    #[test]
    fn test_triangle_hit() {
        let quad = quad();
        let hit = quad.intersection(&down_at(0.75, 0.25), None).unwrap();
        assert!((hit.dist - 2.0).abs() < 1e-12);
        assert_eq!(hit.part, Some(0));

        let hit = quad.intersection(&down_at(0.25, 0.75), None).unwrap();
        assert_eq!(hit.part, Some(1));
    }

    #[test]
    fn test_triangle_miss() {
        let quad = quad();
        assert!(quad.intersection(&down_at(1.5, 0.5), None).is_none());
        assert!(quad.intersection(&down_at(-0.2, 0.5), None).is_none());

        // Pointing away
        let ray = Ray::new(Vec3::new(0.5, 0.5, 2.0), Vec3::Z);
        assert!(quad.intersection(&ray, None).is_none());
    }

    #[test]
    fn test_point_outside_triangle_rejected_per_part() {
        // (0.25, 0.75) lies in triangle 1, not triangle 0
        let quad = quad();
        assert!(quad.intersection(&down_at(0.25, 0.75), Some(0)).is_none());
        assert!(quad.intersection(&down_at(0.25, 0.75), Some(1)).is_some());
    }

    #[test]
    fn test_shared_edge_is_covered() {
        let quad = quad();
        for s in [0.1, 0.37, 0.5, 0.93] {
            let ray = down_at(s, s);
            let either = quad.intersection(&ray, Some(0)).is_some()
                || quad.intersection(&ray, Some(1)).is_some();
            assert!(either, "gap on the diagonal at {}", s);
        }
    }

    #[test]
    fn test_uv_interpolation() {
        let quad = quad();
        let hit = quad.intersection(&down_at(0.3, 0.6), None).unwrap();
        assert!((hit.uv - Vec2::new(0.3, 0.6)).length() < 1e-12);
    }

    #[test]
    fn test_normal_follows_winding() {
        let quad = quad();
        let hit = quad.intersection(&down_at(0.5, 0.2), None).unwrap();
        assert_eq!(quad.normal(Vec3::ZERO, &hit), Vec3::Z);
    }

    #[test]
    fn test_parallel_ray_misses() {
        let quad = quad();
        let ray = Ray::new(Vec3::new(-1.0, 0.5, 0.0), Vec3::X);
        assert!(quad.intersection(&ray, None).is_none());
    }

    #[test]
    fn test_part_bounding_boxes() {
        let quad = quad();
        assert_eq!(quad.num_parts(), 2);

        let (bbox, infinite) = quad.bounding_box(Some(1));
        assert!(!infinite);
        assert_eq!(bbox.lo, Vec3::ZERO);
        assert_eq!(bbox.hi, Vec3::new(1.0, 1.0, 0.0));

        let (whole, _) = quad.bounding_box(None);
        assert_eq!(whole.hi, Vec3::new(1.0, 1.0, 0.0));
    }
}
