//! Ray casting against a scene.
//!
//! `RenderWorld` pairs a read-only [`Scene`] with its acceleration grid and
//! is the entry point shaders use to cast secondary rays. Recursion depth
//! starts at 1 for primary rays; a ray cast deeper than the scene's
//! recursion limit contributes black.

use crate::hit::keep_closest;
use crate::{Acceleration, Color, Hit, RenderConfig, Scene, SceneHit};
use whitted_math::Ray;

pub struct RenderWorld<'s> {
    scene: &'s Scene,
    acceleration: Option<Acceleration<'s>>,
    config: RenderConfig,
}

impl<'s> RenderWorld<'s> {
    /// Prepare `scene` for rendering, building the acceleration grid unless
    /// the config disables it.
    pub fn new(scene: &'s Scene, config: &RenderConfig) -> Self {
        let acceleration = config.acceleration_enabled.then(|| {
            let mut acceleration = Acceleration::new(config.grid_resolution);
            for (id, shaded) in scene.objects.iter().enumerate() {
                acceleration.add_object(shaded.object.as_ref(), id);
            }
            acceleration.initialize();
            acceleration
        });

        if acceleration.is_none() {
            log::info!("Acceleration disabled, testing all {} objects per ray", scene.objects.len());
        }

        Self {
            scene,
            acceleration,
            config: config.clone(),
        }
    }

    pub fn scene(&self) -> &'s Scene {
        self.scene
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn acceleration(&self) -> Option<&Acceleration<'s>> {
        self.acceleration.as_ref()
    }

    /// Nearest hit over all shaded objects, with the index of the object hit.
    pub fn closest_intersection(&self, ray: &Ray) -> Option<SceneHit> {
        if let Some(acceleration) = &self.acceleration {
            return acceleration.closest_intersection(ray);
        }

        let mut best = None;
        for (id, shaded) in self.scene.objects.iter().enumerate() {
            keep_closest(&mut best, id, shaded.object.intersection(ray, None));
        }
        best
    }

    /// Color seen along `ray` at recursion `depth`.
    pub fn cast_ray(&self, ray: &Ray, depth: u32) -> Color {
        if depth > self.scene.recursion_depth_limit {
            log::trace!("depth {} exceeds limit, contributing black", depth);
            return Color::ZERO;
        }

        match self.closest_intersection(ray) {
            Some(SceneHit { id, hit }) => {
                let shaded = &self.scene.objects[id];
                let point = ray.at(hit.dist);
                let normal = shaded.object.normal(point, &hit);

                log::trace!(
                    "cast depth {}: {:?} hits object {} at dist {} (part {:?}), point {:?} normal {:?}",
                    depth,
                    ray,
                    id,
                    hit.dist,
                    hit.part,
                    point,
                    normal
                );

                let color = shaded
                    .shader
                    .shade_surface(self, ray, &hit, point, normal, depth);
                log::trace!("cast depth {}: color {:?}", depth, color);
                color
            }
            None => {
                log::trace!("cast depth {}: {:?} hits background", depth, ray);
                match &self.scene.background_shader {
                    Some(shader) => shader.shade_surface(
                        self,
                        ray,
                        &Hit::default(),
                        ray.direction,
                        ray.direction,
                        depth,
                    ),
                    None => Color::ZERO,
                }
            }
        }
    }

    /// Color of pixel `(i, j)`, with `j = 0` the bottom row.
    pub fn render_pixel(&self, i: u32, j: u32) -> Color {
        let ray = self.scene.camera.primary_ray(i, j);
        self.cast_ray(&ray, 1)
    }
}
