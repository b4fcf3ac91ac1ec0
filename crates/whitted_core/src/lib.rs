//! Whitted Core - scene description loading for the ray tracer.
//!
//! This crate provides:
//!
//! - **Scene description types**: named colors, shapes, shaders and lights
//! - **Scene file parsing**: the line-based text format
//! - **Asset loading**: OBJ meshes and PNG textures
//!
//! # Example
//!
//! ```ignore
//! use whitted_core::load_scene;
//!
//! let scene = load_scene("scenes/00.txt")?;
//! println!("{}x{} with {} objects", scene.width, scene.height, scene.objects.len());
//! ```

pub mod mesh;
pub mod parser;
pub mod scene;
pub mod texture;

// Re-export commonly used types
pub use mesh::{Mesh, MeshError};
pub use parser::{load_scene, parse_scene, ParseError};
pub use scene::{
    AmbientDesc, CameraDesc, ColorDesc, ColorSourceDesc, LightDesc, ObjectDesc, SceneDescription,
    ShadedObjectDesc, ShaderDesc, ShaderKind, ShapeDesc,
};
pub use texture::{resolve_path, Texture, TextureCache, TextureError};
