//! Comparison of a render against a reference image.

use std::path::Path;

use anyhow::{ensure, Context, Result};
use image::{Rgb, RgbImage};

pub struct Comparison {
    /// Mean absolute per-channel error, as a percentage of full scale
    pub error_percent: f64,
    /// Per-channel absolute differences
    pub diff: RgbImage,
}

pub fn load_reference(path: &Path) -> Result<RgbImage> {
    let image = image::open(path)
        .with_context(|| format!("Failed to read reference image {}", path.display()))?;
    Ok(image.to_rgb8())
}

pub fn compare_images(rendered: &RgbImage, reference: &RgbImage) -> Result<Comparison> {
    ensure!(
        rendered.dimensions() == reference.dimensions(),
        "Reference image is {}x{} but the render is {}x{}",
        reference.width(),
        reference.height(),
        rendered.width(),
        rendered.height()
    );

    let diff = RgbImage::from_fn(rendered.width(), rendered.height(), |x, y| {
        let a = rendered.get_pixel(x, y);
        let b = reference.get_pixel(x, y);
        Rgb([
            a[0].abs_diff(b[0]),
            a[1].abs_diff(b[1]),
            a[2].abs_diff(b[2]),
        ])
    });

    let channels = diff.as_raw();
    let error: f64 = channels.iter().map(|&e| e as f64 / 255.0).sum();
    let error_percent = if channels.is_empty() {
        0.0
    } else {
        error / channels.len() as f64 * 100.0
    };

    Ok(Comparison {
        error_percent,
        diff,
    })
}

/// The statistic line reported after a comparison.
pub fn format_statistic(comparison: &Comparison) -> String {
    format!("diff: {:.2}", comparison.error_percent)
}
