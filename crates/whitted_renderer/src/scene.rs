//! Runtime scene: objects paired with shaders, lights and global settings.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use whitted_core::{
    resolve_path, ColorSourceDesc, LightDesc, Mesh, MeshError, SceneDescription, ShaderKind,
    ShapeDesc, TextureCache, TextureError,
};

use crate::shader::{FlatShader, PhongShader, ReflectiveShader, Shader, TransparentShader};
use crate::{Camera, ColorSource, Light, MeshObject, Object, Plane, PointLight, Sphere};

/// Errors that can occur while building a scene from its description.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Texture(#[from] TextureError),

    #[error("{kind} '{name}' is not defined")]
    UndefinedName { kind: &'static str, name: String },

    #[error("Image size {width}x{height} has no pixels")]
    EmptyImage { width: u32, height: u32 },
}

pub type SceneResult<T> = Result<T, SceneError>;

/// An object and the shader that colors it.
#[derive(Clone)]
pub struct ShadedObject {
    pub object: Arc<dyn Object>,
    pub shader: Arc<dyn Shader>,
}

/// Everything needed to render an image. Read-only while rendering.
pub struct Scene {
    pub objects: Vec<ShadedObject>,
    pub lights: Vec<Box<dyn Light>>,
    /// Shades rays that hit nothing; black if absent
    pub background_shader: Option<Arc<dyn Shader>>,
    pub ambient_color: Option<Arc<ColorSource>>,
    pub ambient_intensity: f64,
    pub enable_shadows: bool,
    /// Number of secondary bounces after the primary ray
    pub recursion_depth_limit: u32,
    pub camera: Camera,
}

impl Scene {
    /// Create an empty scene with shadows on and a recursion limit of 3.
    pub fn new(camera: Camera) -> Self {
        Self {
            objects: Vec::new(),
            lights: Vec::new(),
            background_shader: None,
            ambient_color: None,
            ambient_intensity: 0.0,
            enable_shadows: true,
            recursion_depth_limit: 3,
            camera,
        }
    }

    /// Add an object shaded by `shader`. Returns its index.
    pub fn add_object(&mut self, object: Arc<dyn Object>, shader: Arc<dyn Shader>) -> usize {
        self.objects.push(ShadedObject { object, shader });
        self.objects.len() - 1
    }

    pub fn add_light(&mut self, light: Box<dyn Light>) {
        self.lights.push(light);
    }

    /// Build a scene, loading meshes and textures relative to the
    /// description's base directory.
    pub fn from_description(desc: &SceneDescription) -> SceneResult<Self> {
        if desc.width == 0 || desc.height == 0 {
            return Err(SceneError::EmptyImage {
                width: desc.width,
                height: desc.height,
            });
        }

        let base_dir = desc.base_dir.as_deref();
        let mut textures = match base_dir {
            Some(dir) => TextureCache::with_base_dir(dir),
            None => TextureCache::new(),
        };

        let mut colors: HashMap<&str, Arc<ColorSource>> = HashMap::new();
        for color in &desc.colors {
            let source = match &color.source {
                ColorSourceDesc::Flat(rgb) => ColorSource::Flat(*rgb),
                ColorSourceDesc::Texture { path, bilinear } => ColorSource::Texture {
                    texture: textures.load(path)?,
                    bilinear: *bilinear,
                },
            };
            colors.insert(&color.name, Arc::new(source));
        }

        let mut objects: HashMap<&str, Arc<dyn Object>> = HashMap::new();
        for object in &desc.objects {
            let built: Arc<dyn Object> = match &object.shape {
                ShapeDesc::Sphere { center, radius } => Arc::new(Sphere::new(*center, *radius)),
                ShapeDesc::Plane { point, normal } => Arc::new(Plane::new(*point, *normal)),
                ShapeDesc::Mesh { path } => {
                    let mesh = Mesh::load_obj(resolve_path(base_dir, path))?;
                    Arc::new(MeshObject::new(Arc::new(mesh)))
                }
            };
            objects.insert(&object.name, built);
        }

        // Shaders only reference earlier shaders, so one pass in file order works
        let mut shaders: HashMap<&str, Arc<dyn Shader>> = HashMap::new();
        for shader in &desc.shaders {
            let built: Arc<dyn Shader> = match &shader.kind {
                ShaderKind::Flat { color } => Arc::new(FlatShader::new(lookup(&colors, "color", color)?)),
                ShaderKind::Phong {
                    ambient,
                    diffuse,
                    specular,
                    specular_power,
                } => Arc::new(PhongShader::new(
                    lookup(&colors, "color", ambient)?,
                    lookup(&colors, "color", diffuse)?,
                    lookup(&colors, "color", specular)?,
                    *specular_power,
                )),
                ShaderKind::Reflective {
                    shader,
                    reflectivity,
                } => Arc::new(ReflectiveShader::new(
                    lookup(&shaders, "shader", shader)?,
                    *reflectivity,
                )),
                ShaderKind::Transparent {
                    index_of_refraction,
                    opacity,
                    shader,
                } => Arc::new(TransparentShader::new(
                    lookup(&shaders, "shader", shader)?,
                    *index_of_refraction,
                    *opacity,
                )),
            };
            shaders.insert(&shader.name, built);
        }

        let camera = Camera::new()
            .with_resolution(desc.width, desc.height)
            .with_position(desc.camera.position, desc.camera.look_at, desc.camera.up)
            .with_field_of_view(desc.camera.field_of_view);

        let mut scene = Scene::new(camera);
        scene.enable_shadows = desc.enable_shadows;
        scene.recursion_depth_limit = desc.recursion_depth_limit;

        for shaded in &desc.shaded_objects {
            scene.add_object(
                lookup(&objects, "object", &shaded.object)?,
                lookup(&shaders, "shader", &shaded.shader)?,
            );
        }

        for light in &desc.lights {
            match light {
                LightDesc::Point {
                    position,
                    color,
                    brightness,
                } => scene.add_light(Box::new(PointLight::new(
                    *position,
                    lookup(&colors, "color", color)?,
                    *brightness,
                ))),
            }
        }

        if let Some(name) = &desc.background_shader {
            scene.background_shader = Some(lookup(&shaders, "shader", name)?);
        }

        if let Some(ambient) = &desc.ambient_light {
            scene.ambient_color = Some(lookup(&colors, "color", &ambient.color)?);
            scene.ambient_intensity = ambient.intensity;
        }

        log::info!(
            "Scene built: {} shaded objects, {} lights, {} textures, {}x{}",
            scene.objects.len(),
            scene.lights.len(),
            textures.len(),
            desc.width,
            desc.height
        );

        Ok(scene)
    }
}

fn lookup<T: ?Sized>(
    table: &HashMap<&str, Arc<T>>,
    kind: &'static str,
    name: &str,
) -> SceneResult<Arc<T>> {
    table
        .get(name)
        .cloned()
        .ok_or_else(|| SceneError::UndefinedName {
            kind,
            name: name.to_string(),
        })
}
