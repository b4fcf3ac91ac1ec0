//! Sphere primitive for ray tracing.

use crate::{Hit, Object, SMALL_T};
use whitted_math::{Aabb, Ray, Vec3};

/// A sphere primitive.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f64,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f64) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            radius,
            bbox,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl Object for Sphere {
    fn intersection(&self, ray: &Ray, part: Option<usize>) -> Option<Hit> {
        let oc = self.center - ray.endpoint;
        let a = ray.direction.length_squared();
        if a == 0.0 {
            return None;
        }
        let h = ray.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Nearest root that is far enough in front of the endpoint
        let mut root = (h - sqrtd) / a;
        if root < SMALL_T {
            root = (h + sqrtd) / a;
            if root < SMALL_T {
                return None;
            }
        }

        Some(Hit::new(root, part))
    }

    fn normal(&self, point: Vec3, _hit: &Hit) -> Vec3 {
        (point - self.center).normalize_or_zero()
    }

    fn bounding_box(&self, _part: Option<usize>) -> (Aabb, bool) {
        (self.bbox, false)
    }
}
