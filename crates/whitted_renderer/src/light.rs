//! Light sources.

use std::f64::consts::PI;
use std::sync::Arc;

use crate::{Color, ColorSource};
use whitted_math::{Vec2, Vec3};

/// Squared distances below this skip the falloff.
const MIN_DISTANCE_SQUARED: f64 = 1e-16;

/// A light with a position and a falloff.
pub trait Light: Send + Sync {
    fn position(&self) -> Vec3;

    /// Light arriving at a point, given the vector from that point to the
    /// light.
    fn emitted_light(&self, vector_to_light: Vec3) -> Color;
}

/// Isotropic point light with inverse-square falloff.
#[derive(Debug, Clone)]
pub struct PointLight {
    position: Vec3,
    color: Arc<ColorSource>,
    brightness: f64,
}

impl PointLight {
    pub fn new(position: Vec3, color: Arc<ColorSource>, brightness: f64) -> Self {
        Self {
            position,
            color,
            brightness,
        }
    }
}

impl Light for PointLight {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn emitted_light(&self, vector_to_light: Vec3) -> Color {
        let color = self.color.color_at(Vec2::ZERO) * self.brightness;
        let dist2 = vector_to_light.length_squared();
        if dist2 < MIN_DISTANCE_SQUARED {
            return color;
        }
        color / (4.0 * PI * dist2)
    }
}
