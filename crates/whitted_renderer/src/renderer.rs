//! Whole-image rendering.
//!
//! The image is split into buckets which are traced in parallel on the
//! current rayon pool and then copied into an [`ImageBuffer`].

use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::acceleration::{cell_count, MAX_GRID_CELLS};
use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::{color_to_rgb, Color, RenderWorld};

/// Errors from an invalid [`RenderConfig`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Grid resolution {resolution:?} must be at least 1 on every axis")]
    GridResolution { resolution: [usize; 3] },

    #[error("Grid resolution {resolution:?} exceeds {max} cells")]
    GridTooLarge { resolution: [usize; 3], max: usize },

    #[error("Bucket size must be at least 1")]
    BucketSize,
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Use the uniform grid; when false every object is tested per ray
    pub acceleration_enabled: bool,
    /// Grid cells along x, y and z
    pub grid_resolution: [usize; 3],
    /// Bucket edge length in pixels
    pub bucket_size: u32,
    /// Worker threads, 0 for one per core
    pub threads: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            acceleration_enabled: true,
            grid_resolution: [40, 40, 40],
            bucket_size: DEFAULT_BUCKET_SIZE,
            threads: 0,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_resolution.iter().any(|&n| n == 0) {
            return Err(ConfigError::GridResolution {
                resolution: self.grid_resolution,
            });
        }
        if cell_count(self.grid_resolution).map_or(true, |total| total > MAX_GRID_CELLS) {
            return Err(ConfigError::GridTooLarge {
                resolution: self.grid_resolution,
                max: MAX_GRID_CELLS,
            });
        }
        if self.bucket_size == 0 {
            return Err(ConfigError::BucketSize);
        }
        Ok(())
    }
}

/// Linear color image. Pixel `(0, 0)` is the bottom-left corner.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width as usize) * (height as usize)],
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// Copy a rendered bucket into its region of the image.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        let row_len = bucket.width as usize;
        for (row, colors) in result.pixels.chunks(row_len).enumerate() {
            let start = self.index(bucket.x, bucket.y + row as u32);
            self.pixels[start..start + colors.len()].copy_from_slice(colors);
        }
    }

    /// 8-bit RGB bytes in storage order (bottom row first).
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&color| color_to_rgb(color))
            .collect()
    }
}

/// Render every pixel of the scene's camera.
pub fn render(world: &RenderWorld<'_>) -> ImageBuffer {
    let camera = &world.scene().camera;
    let (width, height) = (camera.image_width, camera.image_height);
    let buckets = generate_buckets(width, height, world.config().bucket_size);

    log::info!(
        "Rendering {}x{} in {} buckets on {} threads",
        width,
        height,
        buckets.len(),
        rayon::current_num_threads()
    );
    let start = Instant::now();

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| BucketResult::new(*bucket, render_bucket(bucket, world)))
        .collect();

    let mut image = ImageBuffer::new(width, height);
    for result in &results {
        image.write_bucket(result);
    }

    log::info!("Render finished in {:.2?}", start.elapsed());
    image
}
