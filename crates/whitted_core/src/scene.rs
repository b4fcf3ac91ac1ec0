//! Scene description types.
//!
//! A `SceneDescription` is what the scene-file parser produces: named colors,
//! shapes, shaders and lights, plus the global render settings. Names are
//! kept as strings; the renderer resolves them when it builds its runtime
//! scene. The parser guarantees every referenced name was defined earlier.

use std::path::PathBuf;

use whitted_math::Vec3;

/// A named color source.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorDesc {
    pub name: String,
    pub source: ColorSourceDesc,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ColorSourceDesc {
    /// A constant RGB color.
    Flat(Vec3),
    /// An image sampled at the surface UV.
    Texture { path: String, bilinear: bool },
}

/// A named geometric object.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectDesc {
    pub name: String,
    pub shape: ShapeDesc,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ShapeDesc {
    Sphere { center: Vec3, radius: f64 },
    /// `normal` is already normalized by the parser.
    Plane { point: Vec3, normal: Vec3 },
    Mesh { path: String },
}

/// A named shader. Shader and color fields are names defined earlier.
#[derive(Clone, Debug, PartialEq)]
pub struct ShaderDesc {
    pub name: String,
    pub kind: ShaderKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ShaderKind {
    Flat {
        color: String,
    },
    Phong {
        ambient: String,
        diffuse: String,
        specular: String,
        specular_power: f64,
    },
    Reflective {
        shader: String,
        reflectivity: f64,
    },
    Transparent {
        index_of_refraction: f64,
        opacity: f64,
        shader: String,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum LightDesc {
    Point {
        position: Vec3,
        color: String,
        brightness: f64,
    },
}

/// Pairs an object with the shader that colors it.
#[derive(Clone, Debug, PartialEq)]
pub struct ShadedObjectDesc {
    pub object: String,
    pub shader: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AmbientDesc {
    pub color: String,
    pub intensity: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraDesc {
    pub position: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    /// Horizontal field of view in degrees.
    pub field_of_view: f64,
}

/// Everything a scene file describes.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneDescription {
    pub colors: Vec<ColorDesc>,
    pub objects: Vec<ObjectDesc>,
    pub shaders: Vec<ShaderDesc>,
    pub lights: Vec<LightDesc>,
    pub shaded_objects: Vec<ShadedObjectDesc>,
    pub background_shader: Option<String>,
    pub ambient_light: Option<AmbientDesc>,
    pub width: u32,
    pub height: u32,
    pub camera: CameraDesc,
    pub enable_shadows: bool,
    pub recursion_depth_limit: u32,
    /// Directory that relative mesh and texture paths are resolved against
    pub base_dir: Option<PathBuf>,
}

impl SceneDescription {
    pub fn color(&self, name: &str) -> Option<&ColorDesc> {
        self.colors.iter().find(|c| c.name == name)
    }

    pub fn object(&self, name: &str) -> Option<&ObjectDesc> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn shader(&self, name: &str) -> Option<&ShaderDesc> {
        self.shaders.iter().find(|s| s.name == name)
    }
}
