use crate::{Interval, Ray, Vec3};

/// Direction components smaller than this are treated as parallel to a slab.
const PARALLEL_EPSILON: f64 = 1e-16;

/// Axis-Aligned Bounding Box.
///
/// The empty box has `lo = +inf` and `hi = -inf` on every axis, so including
/// points grows it monotonically. The full box spans `-inf..+inf` and stands
/// in for objects with no finite extent.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub lo: Vec3,
    pub hi: Vec3,
}

impl Aabb {
    /// Contains nothing; grows with [`Aabb::include_point`].
    pub const EMPTY: Aabb = Aabb {
        lo: Vec3::INFINITY,
        hi: Vec3::NEG_INFINITY,
    };

    /// Contains everything.
    pub const FULL: Aabb = Aabb {
        lo: Vec3::NEG_INFINITY,
        hi: Vec3::INFINITY,
    };

    /// Create a box from its corners.
    pub fn new(lo: Vec3, hi: Vec3) -> Self {
        Self { lo, hi }
    }

    /// Create the smallest box containing two arbitrary corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            lo: a.min(b),
            hi: a.max(b),
        }
    }

    /// Grow the box so that it contains `point`.
    pub fn include_point(&mut self, point: Vec3) {
        self.lo = self.lo.min(point);
        self.hi = self.hi.max(point);
    }

    /// The smallest box containing both boxes.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            lo: self.lo.min(other.lo),
            hi: self.hi.max(other.hi),
        }
    }

    /// The overlap of both boxes, or [`Aabb::EMPTY`] if they do not overlap
    /// on some axis.
    pub fn intersection(&self, other: &Aabb) -> Aabb {
        let lo = self.lo.max(other.lo);
        let hi = self.hi.min(other.hi);
        if (0..3).any(|axis| lo[axis] > hi[axis]) {
            return Aabb::EMPTY;
        }
        Aabb { lo, hi }
    }

    /// True if `lo > hi` on any axis.
    pub fn is_empty(&self) -> bool {
        (0..3).any(|axis| self.lo[axis] > self.hi[axis])
    }

    /// True if the box is infinite in every direction.
    pub fn is_full(&self) -> bool {
        self.lo == Vec3::NEG_INFINITY && self.hi == Vec3::INFINITY
    }

    /// True if `point` lies inside the box (boundary included).
    pub fn contains(&self, point: Vec3) -> bool {
        (0..3).all(|axis| self.lo[axis] <= point[axis] && point[axis] <= self.hi[axis])
    }

    /// Size of the box along each axis.
    pub fn extent(&self) -> Vec3 {
        self.hi - self.lo
    }

    /// Widen any axis thinner than `delta` so the box has volume.
    pub fn pad_to_minimums(&self, delta: f64) -> Aabb {
        let mut padded = *self;
        for axis in 0..3 {
            let span = Interval::new(self.lo[axis], self.hi[axis]);
            if span.size() < delta {
                let span = span.expand(delta);
                padded.lo[axis] = span.min;
                padded.hi[axis] = span.max;
            }
        }
        padded
    }

    /// Clip a ray against the box with the slab method.
    ///
    /// Returns the parametric span `[tmin, tmax]` over which the ray's line is
    /// inside the box. The span may start (or lie entirely) behind the
    /// endpoint; callers decide how to treat negative parameters.
    pub fn clip(&self, ray: &Ray) -> Option<Interval> {
        if self.is_empty() {
            return None;
        }

        let mut span = Interval::UNIVERSE;
        for axis in 0..3 {
            let origin = ray.endpoint[axis];
            let direction = ray.direction[axis];

            if direction.abs() < PARALLEL_EPSILON {
                // Parallel to this pair of planes: inside the slab or never
                if origin < self.lo[axis] || origin > self.hi[axis] {
                    return None;
                }
                continue;
            }

            let inv_dir = 1.0 / direction;
            let mut t1 = (self.lo[axis] - origin) * inv_dir;
            let mut t2 = (self.hi[axis] - origin) * inv_dir;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }

            span = span.intersect(&Interval::new(t1, t2));
            if span.is_empty() {
                return None;
            }
        }

        Some(span)
    }

    /// Nearest forward distance at which the ray meets the box.
    ///
    /// If the endpoint is inside the box the exit distance is reported.
    /// Returns `None` if the ray misses or the box is entirely behind it.
    pub fn hit_distance(&self, ray: &Ray) -> Option<f64> {
        let span = self.clip(ray)?;
        if span.max < 0.0 {
            return None;
        }
        Some(if span.min < 0.0 { span.max } else { span.min })
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Aabb::EMPTY
    }
}
