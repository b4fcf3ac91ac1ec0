//! Phong shading with shadow rays.
//!
//! Ambient light comes from the scene's ambient color and intensity. Each
//! visible light adds a diffuse term `kd * I * max(n.l, 0)` and a specular
//! term `ks * I * max(v.r, 0)^p`.

use std::sync::Arc;

use super::{Shader, SHADOW_OFFSET};
use crate::{Color, ColorSource, Hit, RenderWorld};
use whitted_math::{Ray, Vec2, Vec3};

/// Phong reflection model with optional shadow rays.
#[derive(Debug, Clone)]
pub struct PhongShader {
    ambient: Arc<ColorSource>,
    diffuse: Arc<ColorSource>,
    specular: Arc<ColorSource>,
    specular_power: f64,
}

impl PhongShader {
    pub fn new(
        ambient: Arc<ColorSource>,
        diffuse: Arc<ColorSource>,
        specular: Arc<ColorSource>,
        specular_power: f64,
    ) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
            specular_power,
        }
    }
}

impl Shader for PhongShader {
    fn shade_surface(
        &self,
        world: &RenderWorld<'_>,
        ray: &Ray,
        hit: &Hit,
        point: Vec3,
        normal: Vec3,
        _depth: u32,
    ) -> Color {
        let scene = world.scene();
        let mut color = Color::ZERO;

        let n = normal.normalize_or_zero();
        if n == Vec3::ZERO {
            return color;
        }

        let ambient_color = self.ambient.color_at(hit.uv);
        let diffuse_color = self.diffuse.color_at(hit.uv);
        let specular_color = self.specular.color_at(hit.uv);

        if let Some(ambient_light) = &scene.ambient_color {
            color += ambient_light.color_at(Vec2::ZERO) * scene.ambient_intensity * ambient_color;
        }

        let shadow_origin = point + n * SHADOW_OFFSET;
        let view = -ray.direction;

        for light in &scene.lights {
            let to_light = light.position() - point;
            let light_color = light.emitted_light(to_light);

            if scene.enable_shadows {
                let shadow_ray = Ray::new(shadow_origin, to_light);
                if let Some(blocker) = world.closest_intersection(&shadow_ray) {
                    if blocker.hit.dist < to_light.length() {
                        log::trace!(
                            "shadow: object {} blocks light at {:?} (dist {})",
                            blocker.id,
                            light.position(),
                            blocker.hit.dist
                        );
                        continue;
                    }
                }
            }

            let l = to_light.normalize_or_zero();
            let diffuse = diffuse_color * light_color * n.dot(l).max(0.0);

            let reflected = (2.0 * l.dot(n) * n - l).normalize_or_zero();
            let specular_factor = view.dot(reflected).max(0.0).powf(self.specular_power);
            let specular = specular_color * light_color * specular_factor;

            log::trace!(
                "light at {:?}: diffuse {:?} specular {:?}",
                light.position(),
                diffuse,
                specular
            );
            color += diffuse + specular;
        }

        color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Camera, Plane, PointLight, RenderConfig, Scene};
    use std::f64::consts::PI;

    fn flat(color: Vec3) -> Arc<ColorSource> {
        Arc::new(ColorSource::Flat(color))
    }

    /// The plane y = 0 shaded by `shader`.
    fn floor_scene(shader: PhongShader) -> Scene {
        let mut scene = Scene::new(Camera::new());
        scene.add_object(Arc::new(Plane::new(Vec3::ZERO, Vec3::Y)), Arc::new(shader));
        scene
    }

    fn shade(scene: &Scene, origin: Vec3, direction: Vec3) -> Color {
        let world = RenderWorld::new(scene, &RenderConfig::default());
        world.cast_ray(&Ray::new(origin, direction), 1)
    }

    #[test]
    fn test_ambient_term() {
        let ka = Vec3::new(1.0, 0.5, 0.2);
        let mut scene = floor_scene(PhongShader::new(
            flat(ka),
            flat(Vec3::ZERO),
            flat(Vec3::ZERO),
            10.0,
        ));
        scene.ambient_color = Some(flat(Vec3::new(0.5, 0.5, 1.0)));
        scene.ambient_intensity = 0.4;

        let color = shade(&scene, Vec3::Y, -Vec3::Y);
        let expected = Vec3::new(0.5, 0.5, 1.0) * 0.4 * ka;
        assert!((color - expected).length() < 1e-12, "{:?}", color);
    }

    #[test]
    fn test_no_ambient_light_means_no_ambient_term() {
        let scene = floor_scene(PhongShader::new(
            flat(Vec3::ONE),
            flat(Vec3::ZERO),
            flat(Vec3::ZERO),
            10.0,
        ));
        assert_eq!(shade(&scene, Vec3::Y, -Vec3::Y), Vec3::ZERO);
    }

    #[test]
    fn test_specular_highlight_along_mirror_direction() {
        let ks = Vec3::new(0.3, 0.6, 0.9);
        let mut scene = floor_scene(PhongShader::new(
            flat(Vec3::ZERO),
            flat(Vec3::ZERO),
            flat(ks),
            25.0,
        ));
        // |light - origin|^2 = 2, so the light arrives with intensity 1
        scene.add_light(Box::new(PointLight::new(
            Vec3::new(-1.0, 1.0, 0.0),
            flat(Vec3::ONE),
            8.0 * PI,
        )));

        // The eye sits on the mirror direction of the light about the normal
        let color = shade(&scene, Vec3::new(1.0, 1.0, 0.0), Vec3::new(-1.0, -1.0, 0.0));
        assert!((color - ks).length() < 1e-9, "{:?}", color);

        // Away from the mirror direction the highlight falls off
        let off = shade(&scene, Vec3::new(0.2, 1.0, 0.0), Vec3::new(-0.2, -1.0, 0.0));
        assert!(off.z < ks.z * 0.5, "{:?}", off);
    }

    #[test]
    fn test_diffuse_uses_cosine_to_light() {
        let mut scene = floor_scene(PhongShader::new(
            flat(Vec3::ZERO),
            flat(Vec3::ONE),
            flat(Vec3::ZERO),
            10.0,
        ));
        scene.add_light(Box::new(PointLight::new(
            Vec3::new(-1.0, 1.0, 0.0),
            flat(Vec3::ONE),
            8.0 * PI,
        )));

        let color = shade(&scene, Vec3::Y, -Vec3::Y);
        let expected = Vec3::splat(std::f64::consts::FRAC_1_SQRT_2);
        assert!((color - expected).length() < 1e-12, "{:?}", color);
    }

    #[test]
    fn test_light_behind_surface_adds_nothing() {
        let mut scene = floor_scene(PhongShader::new(
            flat(Vec3::ZERO),
            flat(Vec3::ONE),
            flat(Vec3::ONE),
            10.0,
        ));
        scene.enable_shadows = false;
        scene.add_light(Box::new(PointLight::new(
            Vec3::new(0.0, -2.0, 0.0),
            flat(Vec3::ONE),
            16.0 * PI,
        )));

        assert_eq!(shade(&scene, Vec3::Y, -Vec3::Y), Vec3::ZERO);
    }
}
