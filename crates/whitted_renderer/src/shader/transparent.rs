//! Refraction with Fresnel-weighted reflection.

use std::sync::Arc;

use super::{Shader, SECONDARY_RAY_OFFSET};
use crate::{Color, Hit, RenderWorld};
use whitted_math::{Interval, Ray, Vec3};

/// Refraction plus Fresnel-weighted reflection, blended over a base shader
/// by opacity.
#[derive(Clone)]
pub struct TransparentShader {
    shader: Arc<dyn Shader>,
    index_of_refraction: f64,
    opacity: f64,
}

impl TransparentShader {
    pub fn new(shader: Arc<dyn Shader>, index_of_refraction: f64, opacity: f64) -> Self {
        Self {
            shader,
            index_of_refraction,
            opacity: Interval::UNIT.clamp(opacity),
        }
    }
}

/// Schlick's approximation of the Fresnel reflectance.
fn schlick(n1: f64, n2: f64, cos_theta: f64) -> f64 {
    let r0 = ((n1 - n2) / (n1 + n2)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cos_theta.abs()).powi(5)
}

impl Shader for TransparentShader {
    fn shade_surface(
        &self,
        world: &RenderWorld<'_>,
        ray: &Ray,
        hit: &Hit,
        point: Vec3,
        normal: Vec3,
        depth: u32,
    ) -> Color {
        if depth > world.scene().recursion_depth_limit {
            return Color::ZERO;
        }

        let base = self
            .shader
            .shade_surface(world, ray, hit, point, normal, depth);

        let d = ray.direction;
        let (mut n1, mut n2) = (1.0, self.index_of_refraction);
        let mut n = normal;

        // Leaving the object
        if d.dot(normal) > 0.0 {
            std::mem::swap(&mut n1, &mut n2);
            n = -normal;
        }

        let ratio = n1 / n2;
        let cos_i = -n.dot(d);
        let sin2_t = ratio * ratio * (1.0 - cos_i * cos_i);

        let refracted_dir = if sin2_t > 1.0 {
            None
        } else {
            let cos_t = (1.0 - sin2_t).sqrt();
            Some(ratio * d + (ratio * cos_i - cos_t) * n)
        };

        let reflected_dir = d - 2.0 * d.dot(n) * n;
        let reflectivity = schlick(n1, n2, cos_i);

        let reflected_ray = Ray::new(point + n * SECONDARY_RAY_OFFSET, reflected_dir);
        let reflected = world.cast_ray(&reflected_ray, depth + 1);

        let refracted = match refracted_dir {
            Some(dir) => {
                let refracted_ray = Ray::new(point - n * SECONDARY_RAY_OFFSET, dir);
                world.cast_ray(&refracted_ray, depth + 1)
            }
            None => {
                log::trace!("total internal reflection at {:?}", point);
                Color::ZERO
            }
        };

        log::trace!(
            "transparent: reflectivity {} reflected {:?} refracted {:?}",
            reflectivity,
            reflected,
            refracted
        );

        (1.0 - self.opacity) * base
            + self.opacity * (reflectivity * reflected + (1.0 - reflectivity) * refracted)
    }
}
