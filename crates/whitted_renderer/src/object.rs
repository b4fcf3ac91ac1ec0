//! The intersectable object interface.

use crate::Hit;
use whitted_math::{Aabb, Ray, Vec3};

/// Trait for geometry that rays can hit.
///
/// Objects are split into parts: a mesh has one part per triangle, simple
/// shapes have a single part. `part = None` means "the whole object".
pub trait Object: Send + Sync {
    /// Nearest hit with `dist >= SMALL_T`, testing only `part` if given.
    fn intersection(&self, ray: &Ray, part: Option<usize>) -> Option<Hit>;

    /// Geometric surface normal at `point`, a location produced by `hit`.
    fn normal(&self, point: Vec3, hit: &Hit) -> Vec3;

    /// Bounding box of `part` (or of the whole object) and whether it is
    /// infinite. Infinite objects return [`Aabb::FULL`].
    fn bounding_box(&self, part: Option<usize>) -> (Aabb, bool);

    /// Number of independently intersectable parts.
    fn num_parts(&self) -> usize {
        1
    }
}
