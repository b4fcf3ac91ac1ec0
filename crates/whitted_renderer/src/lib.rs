//! Whitted-style recursive ray tracer.
//!
//! Objects are indexed by a uniform grid and traversed with a 3-D DDA.
//! Shaders compose through [`RenderWorld::cast_ray`], which secondary rays
//! use to recurse up to the scene's depth limit.

mod acceleration;
mod bucket;
mod camera;
mod color;
mod hit;
mod light;
mod mesh;
mod object;
mod plane;
mod render_world;
mod renderer;
mod scene;
pub mod shader;
mod sphere;

pub use acceleration::{cell_count, Acceleration, GridStats, Primitive, MAX_GRID_CELLS};
pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use camera::Camera;
pub use color::{channel_to_u8, color_to_rgb, Color, ColorSource};
pub use hit::{Hit, SceneHit, SMALL_T};
pub use light::{Light, PointLight};
pub use mesh::MeshObject;
pub use object::Object;
pub use plane::Plane;
pub use render_world::RenderWorld;
pub use renderer::{render, ConfigError, ImageBuffer, RenderConfig};
pub use scene::{Scene, SceneError, SceneResult, ShadedObject};
pub use sphere::Sphere;

/// Re-export math types from whitted_math
pub use whitted_math::{Aabb, Ray, Vec2, Vec3};
