//! Texture loading and caching for color sources.
//!
//! Textures are stored as RGB in the 0-1 range, exactly as encoded in the
//! file (no color space conversion), and sampled with (0, 0) at the
//! bottom-left corner of the image.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use whitted_math::{Vec2, Vec3};

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Texture {0} has no pixels")]
    Empty(String),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A loaded texture with pixel data.
#[derive(Clone, Debug)]
pub struct Texture {
    /// Texture width in pixels
    pub width: u32,

    /// Texture height in pixels
    pub height: u32,

    /// RGB pixels, row-major, top row first (image file order)
    pub pixels: Vec<Vec3>,

    /// Original file path (for debugging)
    pub path: String,
}

impl Texture {
    /// Create a new texture from pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<Vec3>, path: impl Into<String>) -> Self {
        Self {
            width,
            height,
            pixels,
            path: path.into(),
        }
    }

    /// Load a texture from an image file.
    pub fn load(path: &Path) -> TextureResult<Self> {
        let img = image::open(path).map_err(|source| TextureError::Image {
            path: path.display().to_string(),
            source,
        })?;

        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return Err(TextureError::Empty(path.display().to_string()));
        }

        let pixels = rgb
            .pixels()
            .map(|p| Vec3::new(p[0] as f64, p[1] as f64, p[2] as f64) / 255.0)
            .collect();

        Ok(Texture::new(width, height, pixels, path.to_string_lossy()))
    }

    /// Sample the nearest texel at UV coordinates. UVs wrap into [0, 1).
    pub fn sample_nearest(&self, uv: Vec2) -> Vec3 {
        let u = uv.x.rem_euclid(1.0);
        let v = uv.y.rem_euclid(1.0);

        let i = ((u * self.width as f64) as u32).min(self.width - 1);
        let j = ((v * self.height as f64) as u32).min(self.height - 1);

        self.texel(i, j)
    }

    /// Sample the texture at UV coordinates with bilinear filtering.
    pub fn sample_bilinear(&self, uv: Vec2) -> Vec3 {
        let u = uv.x.rem_euclid(1.0);
        let v = uv.y.rem_euclid(1.0);

        // Texel centers sit at half-integer coordinates
        let x = (u * self.width as f64 - 0.5).max(0.0);
        let y = (v * self.height as f64 - 0.5).max(0.0);

        let x0 = (x.floor() as u32).min(self.width - 1);
        let y0 = (y.floor() as u32).min(self.height - 1);
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let fx = x.fract();
        let fy = y.fract();

        let bottom = self.texel(x0, y0) * (1.0 - fx) + self.texel(x1, y0) * fx;
        let top = self.texel(x0, y1) * (1.0 - fx) + self.texel(x1, y1) * fx;

        bottom * (1.0 - fy) + top * fy
    }

    /// Texel at column `i`, row `j` counted from the bottom of the image.
    fn texel(&self, i: u32, j: u32) -> Vec3 {
        let row = self.height - 1 - j;
        let idx = (row * self.width + i) as usize;
        self.pixels.get(idx).copied().unwrap_or(Vec3::ZERO)
    }
}

/// Cache for loaded textures.
///
/// Scenes may reference the same image from several texture colors; each file
/// is decoded once.
pub struct TextureCache {
    /// Cached textures by resolved file path
    textures: HashMap<PathBuf, Arc<Texture>>,

    /// Base directory for resolving relative paths
    base_dir: Option<PathBuf>,
}

impl TextureCache {
    /// Create a new empty texture cache.
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: None,
        }
    }

    /// Create a texture cache with a base directory for relative paths.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: Some(base_dir.into()),
        }
    }

    /// Load a texture from file, using cache if available.
    pub fn load(&mut self, path: &str) -> TextureResult<Arc<Texture>> {
        let full_path = resolve_path(self.base_dir.as_deref(), path);

        if let Some(texture) = self.textures.get(&full_path) {
            return Ok(texture.clone());
        }

        let texture = Arc::new(Texture::load(&full_path)?);
        self.textures.insert(full_path, texture.clone());

        log::debug!(
            "Loaded texture: {} ({}x{})",
            path,
            texture.width,
            texture.height
        );

        Ok(texture)
    }

    /// Get the number of cached textures.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve a path relative to an optional base directory.
pub fn resolve_path(base_dir: Option<&Path>, path: &str) -> PathBuf {
    let path = Path::new(path);

    match base_dir {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    }
}
