//! Color sources sampled by shaders and lights.

use std::sync::Arc;

use whitted_core::Texture;
use whitted_math::{Vec2, Vec3};

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// A color that may vary over a surface.
#[derive(Debug, Clone)]
pub enum ColorSource {
    /// The same color everywhere.
    Flat(Color),
    /// An image looked up by texture coordinates.
    Texture {
        texture: Arc<Texture>,
        bilinear: bool,
    },
}

impl ColorSource {
    /// Color at texture coordinates `uv`.
    pub fn color_at(&self, uv: Vec2) -> Color {
        match self {
            ColorSource::Flat(color) => *color,
            ColorSource::Texture { texture, bilinear } => {
                if *bilinear {
                    texture.sample_bilinear(uv)
                } else {
                    texture.sample_nearest(uv)
                }
            }
        }
    }
}

/// Scale and clamp a color channel to a byte. No gamma is applied.
#[inline]
pub fn channel_to_u8(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

/// Convert a color to 8-bit RGB.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    [
        channel_to_u8(color.x),
        channel_to_u8(color.y),
        channel_to_u8(color.z),
    ]
}
