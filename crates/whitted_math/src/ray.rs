use crate::Vec3;

/// A ray in 3D space with an endpoint and a unit direction.
///
/// The direction is normalized on construction so the parameter `t` of
/// [`Ray::at`] is a physical distance from the endpoint.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub endpoint: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray. A zero direction stays zero.
    pub fn new(endpoint: Vec3, direction: Vec3) -> Self {
        Self {
            endpoint,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: endpoint + t * direction
    #[inline]
    pub fn at(&self, t: f64) -> Vec3 {
        self.endpoint + self.direction * t
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self {
            endpoint: Vec3::ZERO,
            direction: Vec3::Z,
        }
    }
}
