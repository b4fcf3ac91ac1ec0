//! Pinhole camera for primary ray generation.
//!
//! The film sits at focal distance 1 in front of the camera. Its width is set
//! by the horizontal field of view and its height by the image aspect ratio.
//! Pixel `(0, 0)` is the bottom-left corner of the film.

use whitted_math::{Ray, Vec2, Vec3};

/// Camera for generating rays into the scene.
#[derive(Debug, Clone)]
pub struct Camera {
    // Image settings
    pub image_width: u32,
    pub image_height: u32,

    // Camera positioning
    position: Vec3,
    look_at: Vec3,
    pseudo_up: Vec3,

    /// Horizontal field of view in degrees
    field_of_view: f64,

    // Cached computed values (set by initialize())
    film_position: Vec3,
    look_vector: Vec3,
    horizontal_vector: Vec3,
    vertical_vector: Vec3,
    min: Vec2,
    pixel_size: Vec2,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        let mut camera = Self {
            image_width: 640,
            image_height: 480,
            position: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            pseudo_up: Vec3::Y,
            field_of_view: 70.0,
            // Cached values (initialized below)
            film_position: Vec3::ZERO,
            look_vector: Vec3::ZERO,
            horizontal_vector: Vec3::ZERO,
            vertical_vector: Vec3::ZERO,
            min: Vec2::ZERO,
            pixel_size: Vec2::ZERO,
        };
        camera.initialize();
        camera
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self.initialize();
        self
    }

    /// Set camera position, the point it looks at and an approximate up
    /// direction.
    pub fn with_position(mut self, position: Vec3, look_at: Vec3, pseudo_up: Vec3) -> Self {
        self.position = position;
        self.look_at = look_at;
        self.pseudo_up = pseudo_up;
        self.initialize();
        self
    }

    /// Set the horizontal field of view in degrees.
    pub fn with_field_of_view(mut self, degrees: f64) -> Self {
        self.field_of_view = degrees;
        self.initialize();
        self
    }

    /// Recompute the film frame from the current settings.
    fn initialize(&mut self) {
        // Camera basis
        self.look_vector = (self.look_at - self.position).normalize_or_zero();
        self.horizontal_vector = self.look_vector.cross(self.pseudo_up).normalize_or_zero();
        self.vertical_vector = self
            .horizontal_vector
            .cross(self.look_vector)
            .normalize_or_zero();

        // Film at focal distance 1
        let focal_distance = 1.0;
        self.film_position = self.position + self.look_vector * focal_distance;

        let aspect_ratio = self.image_width.max(1) as f64 / self.image_height.max(1) as f64;
        let width = 2.0 * focal_distance * (self.field_of_view.to_radians() / 2.0).tan();
        let image_size = Vec2::new(width, width / aspect_ratio);

        self.min = -0.5 * image_size;
        self.pixel_size = image_size
            / Vec2::new(
                self.image_width.max(1) as f64,
                self.image_height.max(1) as f64,
            );
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Film coordinates of the center of pixel `(i, j)`.
    pub fn cell_center(&self, i: u32, j: u32) -> Vec2 {
        self.min + (Vec2::new(i as f64, j as f64) + 0.5) * self.pixel_size
    }

    /// World-space position of the center of pixel `(i, j)` on the film.
    pub fn world_position(&self, i: u32, j: u32) -> Vec3 {
        let c = self.cell_center(i, j);
        self.film_position + self.horizontal_vector * c.x + self.vertical_vector * c.y
    }

    /// Ray from the camera through the center of pixel `(i, j)`.
    pub fn primary_ray(&self, i: u32, j: u32) -> Ray {
        Ray::new(self.position, self.world_position(i, j) - self.position)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn looking_down_z(width: u32, height: u32, fov: f64) -> Camera {
        Camera::new()
            .with_resolution(width, height)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_field_of_view(fov)
    }

    #[test]
    fn test_camera_basis() {
        let camera = looking_down_z(100, 100, 90.0);
        assert!((camera.look_vector - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-12);
        assert!((camera.horizontal_vector - Vec3::X).length() < 1e-12);
        assert!((camera.vertical_vector - Vec3::Y).length() < 1e-12);
    }

    #[test]
    fn test_center_pixel_looks_forward() {
        // Odd resolution: pixel (1, 1) is the exact center
        let camera = looking_down_z(3, 3, 90.0);
        let ray = camera.primary_ray(1, 1);
        assert!((ray.direction - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-12);
    }

    #[test]
    fn test_horizontal_field_of_view() {
        // 90 degrees: the film spans x in [-1, 1] at distance 1
        let camera = looking_down_z(2, 1, 90.0);

        let left = camera.world_position(0, 0);
        let right = camera.world_position(1, 0);
        assert!((left - Vec3::new(-0.5, 0.0, -1.0)).length() < 1e-12);
        assert!((right - Vec3::new(0.5, 0.0, -1.0)).length() < 1e-12);
    }

    #[test]
    fn test_row_zero_is_bottom() {
        let camera = looking_down_z(4, 4, 60.0);
        assert!(camera.world_position(0, 0).y < 0.0);
        assert!(camera.world_position(0, 3).y > 0.0);
        assert!(camera.world_position(0, 0).x < camera.world_position(3, 0).x);
    }

    #[test]
    fn test_aspect_ratio_sets_film_height() {
        let camera = looking_down_z(200, 100, 90.0);
        // Film is 2 wide and 1 tall; the top row center is half a pixel below y = 0.5
        let top = camera.world_position(0, 99);
        assert!((top.y - (0.5 - 0.005)).abs() < 1e-12);
    }
}
