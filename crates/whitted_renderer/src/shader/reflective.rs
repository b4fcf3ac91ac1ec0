//! Mirror reflection.

use std::sync::Arc;

use super::{Shader, SECONDARY_RAY_OFFSET};
use crate::{Color, Hit, RenderWorld};
use whitted_math::{Interval, Ray, Vec3};

/// Mirror reflection blended over a base shader.
#[derive(Clone)]
pub struct ReflectiveShader {
    shader: Arc<dyn Shader>,
    reflectivity: f64,
}

impl ReflectiveShader {
    /// `reflectivity` is clamped to [0, 1].
    pub fn new(shader: Arc<dyn Shader>, reflectivity: f64) -> Self {
        Self {
            shader,
            reflectivity: Interval::UNIT.clamp(reflectivity),
        }
    }
}

impl Shader for ReflectiveShader {
    fn shade_surface(
        &self,
        world: &RenderWorld<'_>,
        ray: &Ray,
        hit: &Hit,
        point: Vec3,
        normal: Vec3,
        depth: u32,
    ) -> Color {
        let base = self
            .shader
            .shade_surface(world, ray, hit, point, normal, depth);

        let v = ray.direction;
        let reflected_dir = v - 2.0 * v.dot(normal) * normal;
        let reflected_ray = Ray::new(point + normal * SECONDARY_RAY_OFFSET, reflected_dir);
        let reflected = world.cast_ray(&reflected_ray, depth + 1);

        (1.0 - self.reflectivity) * base + self.reflectivity * reflected
    }
}
