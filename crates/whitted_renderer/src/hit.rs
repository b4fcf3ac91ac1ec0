//! Intersection results.

use whitted_math::Vec2;

/// Minimum distance for a hit to count. Rays leaving a surface would
/// otherwise re-hit it at distance ~0.
pub const SMALL_T: f64 = 1e-4;

/// Record of a ray-object intersection.
///
/// A `Hit` only exists for valid intersections, so `dist >= SMALL_T` always
/// holds for hits returned by objects.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hit {
    /// Distance along the (unit) ray direction
    pub dist: f64,
    /// Which part of the object was hit (the triangle of a mesh)
    pub part: Option<usize>,
    /// Texture coordinates at the hit point
    pub uv: Vec2,
}

impl Hit {
    pub fn new(dist: f64, part: Option<usize>) -> Self {
        Self {
            dist,
            part,
            uv: Vec2::ZERO,
        }
    }

    pub fn with_uv(mut self, uv: Vec2) -> Self {
        self.uv = uv;
        self
    }
}

/// A hit together with the index of the shaded object that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneHit {
    pub id: usize,
    pub hit: Hit,
}

impl SceneHit {
    /// Strict ordering of hits: nearer first, then lower object id, then
    /// lower part. The result of a query is independent of visiting order.
    pub fn precedes(&self, other: &SceneHit) -> bool {
        (self.hit.dist, self.id, self.hit.part) < (other.hit.dist, other.id, other.hit.part)
    }
}

/// Replace `best` with `candidate` if the candidate precedes it.
pub(crate) fn keep_closest(best: &mut Option<SceneHit>, id: usize, candidate: Option<Hit>) {
    if let Some(hit) = candidate {
        let candidate = SceneHit { id, hit };
        if best.map_or(true, |b| candidate.precedes(&b)) {
            *best = Some(candidate);
        }
    }
}
