//! Infinite plane primitive.

use crate::{Hit, Object, SMALL_T};
use whitted_math::{Aabb, Ray, Vec3};

/// `|direction . normal|` below this counts as parallel.
const PARALLEL_TOLERANCE: f64 = 1e-12;

/// The plane through `point` with unit `normal`.
#[derive(Debug, Clone)]
pub struct Plane {
    point: Vec3,
    normal: Vec3,
}

impl Plane {
    /// Create a plane. The normal is normalized here.
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self {
            point,
            normal: normal.normalize_or_zero(),
        }
    }
}

impl Object for Plane {
    fn intersection(&self, ray: &Ray, part: Option<usize>) -> Option<Hit> {
        let u_dot_n = ray.direction.dot(self.normal);
        if u_dot_n.abs() < PARALLEL_TOLERANCE {
            return None;
        }

        let t = (self.point - ray.endpoint).dot(self.normal) / u_dot_n;
        (t > SMALL_T).then(|| Hit::new(t, part))
    }

    fn normal(&self, _point: Vec3, _hit: &Hit) -> Vec3 {
        self.normal
    }

    fn bounding_box(&self, _part: Option<usize>) -> (Aabb, bool) {
        (Aabb::FULL, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> Plane {
        Plane::new(Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, 3.0, 0.0))
    }

    #[test]
    fn test_plane_hit() {
        let ray = Ray::new(Vec3::new(2.0, 4.0, 1.0), Vec3::new(0.0, -1.0, 0.0));
        let hit = floor().intersection(&ray, None).unwrap();
        assert!((hit.dist - 5.0).abs() < 1e-12);
        assert_eq!(floor().normal(ray.at(hit.dist), &hit), Vec3::Y);
    }

    #[test]
    fn test_plane_hit_from_below() {
        let ray = Ray::new(Vec3::new(0.0, -3.0, 0.0), Vec3::new(0.0, 1.0, 1.0));
        let hit = floor().intersection(&ray, None).unwrap();
        assert!((hit.dist - 2.0 * 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_parallel_ray_never_hits() {
        for origin in [
            Vec3::new(0.0, 5.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(3.0, -7.0, 2.0),
        ] {
            let ray = Ray::new(origin, Vec3::new(1.0, 0.0, 1.0));
            assert!(floor().intersection(&ray, None).is_none());
        }
    }

    #[test]
    fn test_plane_behind_ray() {
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Y);
        assert!(floor().intersection(&ray, None).is_none());
    }

    #[test]
    fn test_plane_is_infinite() {
        let (bbox, infinite) = floor().bounding_box(None);
        assert!(infinite);
        assert!(bbox.is_full());
    }
}
