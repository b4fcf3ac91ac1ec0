//! Flat shading.

use std::sync::Arc;

use super::Shader;
use crate::{Color, ColorSource, Hit, RenderWorld};
use whitted_math::{Ray, Vec3};

/// Unlit color, sampled at the hit's texture coordinates.
#[derive(Debug, Clone)]
pub struct FlatShader {
    color: Arc<ColorSource>,
}

impl FlatShader {
    pub fn new(color: Arc<ColorSource>) -> Self {
        Self { color }
    }
}

impl Shader for FlatShader {
    fn shade_surface(
        &self,
        _world: &RenderWorld<'_>,
        _ray: &Ray,
        hit: &Hit,
        _point: Vec3,
        _normal: Vec3,
        _depth: u32,
    ) -> Color {
        self.color.color_at(hit.uv)
    }
}
