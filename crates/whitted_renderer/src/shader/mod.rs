//! Surface shaders.
//!
//! A shader turns a hit into a color. Shaders compose: the reflective and
//! transparent shaders wrap a base shader and cast secondary rays back into
//! the render world.

mod flat;
mod phong;
mod reflective;
mod transparent;

pub use flat::FlatShader;
pub use phong::PhongShader;
pub use reflective::ReflectiveShader;
pub use transparent::TransparentShader;

use crate::{Color, Hit, RenderWorld};
use whitted_math::{Ray, Vec3};

/// Offset along the normal for shadow ray endpoints.
pub const SHADOW_OFFSET: f64 = 1e-4;

/// Offset along the normal for reflected and refracted ray endpoints.
pub const SECONDARY_RAY_OFFSET: f64 = 1e-6;

/// Trait for shading strategies.
pub trait Shader: Send + Sync {
    /// Color seen along `ray` at `point` on a surface with `normal`.
    ///
    /// For the background shader there is no surface: `point` and `normal`
    /// are both the ray direction and `hit` is the default.
    fn shade_surface(
        &self,
        world: &RenderWorld<'_>,
        ray: &Ray,
        hit: &Hit,
        point: Vec3,
        normal: Vec3,
        depth: u32,
    ) -> Color;
}
