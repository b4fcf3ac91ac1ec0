//! PNG output.

use std::path::Path;

use anyhow::{Context, Result};
use image::{ImageFormat, Rgb, RgbImage};
use whitted_renderer::{color_to_rgb, ImageBuffer};

/// Convert a rendered buffer to an 8-bit image with the top row first.
pub fn to_rgb_image(buffer: &ImageBuffer) -> RgbImage {
    let height = buffer.height;
    RgbImage::from_fn(buffer.width, height, |x, y| {
        Rgb(color_to_rgb(buffer.get(x, height - 1 - y)))
    })
}

pub fn save_png(image: &RgbImage, path: &Path) -> Result<()> {
    image
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote {}x{} image to {}", image.width(), image.height(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use whitted_renderer::Vec3;

    #[test]
    fn test_rows_are_flipped() {
        let mut buffer = ImageBuffer::new(2, 3);
        // Bottom-left pixel of the render
        buffer.set(0, 0, Vec3::X);
        buffer.set(1, 2, Vec3::Z);

        let image = to_rgb_image(&buffer);
        assert_eq!(image.get_pixel(0, 2), &Rgb([255, 0, 0]));
        assert_eq!(image.get_pixel(1, 0), &Rgb([0, 0, 255]));
        assert_eq!(image.get_pixel(0, 0), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_save_png_round_trip() {
        let path = std::env::temp_dir().join(format!("whitted_output_{}.png", std::process::id()));
        let mut buffer = ImageBuffer::new(4, 2);
        buffer.set(3, 1, Vec3::new(0.5, 1.0, 0.0));
        let image = to_rgb_image(&buffer);

        save_png(&image, &path).unwrap();
        let loaded = image::open(&path).unwrap().to_rgb8();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, image);
    }
}
