//! Scene file parser.
//!
//! Scene files are line oriented: one whitespace-separated command per line,
//! `#` starts a comment, blank lines are ignored. Every name a command
//! refers to must have been defined on an earlier line.
//!
//! # Supported Commands
//!
//! - `size <width> <height>`
//! - `color <name> <r> <g> <b>`
//! - `texture <name> <file> <bilinear 0|1>`
//! - `sphere <name> <cx> <cy> <cz> <radius>`
//! - `plane <name> <px> <py> <pz> <nx> <ny> <nz>`
//! - `mesh <name> <file.obj>`
//! - `flat_shader <name> <color>`
//! - `phong_shader <name> <ambient> <diffuse> <specular> <power>`
//! - `reflective_shader <name> <shader> <reflectivity>`
//! - `transparent_shader <name> <ior> <opacity> <shader>`
//! - `point_light <x> <y> <z> <color> <brightness>`
//! - `shaded_object <object> <shader>`
//! - `background_shader <shader>`
//! - `ambient_light <color> <intensity>`
//! - `camera <px> <py> <pz> <lx> <ly> <lz> <ux> <uy> <uz> <fov_degrees>`
//! - `enable_shadows <0|1>`
//! - `recursion_depth_limit <n>`

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::{FromStr, SplitWhitespace};

use thiserror::Error;
use whitted_math::{Interval, Vec3};

use crate::scene::*;

/// Errors that can occur during scene parsing.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read scene file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error at line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },

    #[error("Parse error at line {line}: missing {field}")]
    MissingField { line: usize, field: &'static str },

    #[error("Parse error at line {line}: invalid {field} '{value}'")]
    InvalidValue {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("Parse error at line {line}: {kind} '{name}' is not defined")]
    UnknownName {
        line: usize,
        kind: &'static str,
        name: String,
    },

    #[error("Parse error at line {line}: {kind} '{name}' is already defined")]
    DuplicateName {
        line: usize,
        kind: &'static str,
        name: String,
    },

    #[error("Scene has no size command")]
    MissingSize,

    #[error("Scene has no camera command")]
    MissingCamera,
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Default number of bounces after the camera ray.
pub const DEFAULT_RECURSION_DEPTH_LIMIT: u32 = 3;

/// Parse a scene file from disk. Relative paths inside the file are resolved
/// against the file's directory.
pub fn load_scene<P: AsRef<Path>>(path: P) -> ParseResult<SceneDescription> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let base_dir = path.parent().map(Path::to_path_buf);
    let scene = parse_scene(&content, base_dir)?;

    log::info!(
        "Parsed {}: {} objects, {} shaders, {} lights",
        path.display(),
        scene.objects.len(),
        scene.shaders.len(),
        scene.lights.len()
    );

    Ok(scene)
}

/// Parse scene file contents.
pub fn parse_scene(content: &str, base_dir: Option<PathBuf>) -> ParseResult<SceneDescription> {
    let mut parser = SceneParser::new(base_dir);
    for (i, line) in content.lines().enumerate() {
        parser.parse_line(i + 1, line)?;
    }
    parser.finish()
}

/// Whitespace token cursor over a single line.
struct Tokens<'a> {
    iter: SplitWhitespace<'a>,
    line: usize,
}

impl<'a> Tokens<'a> {
    fn word(&mut self, field: &'static str) -> ParseResult<&'a str> {
        self.iter.next().ok_or(ParseError::MissingField {
            line: self.line,
            field,
        })
    }

    fn number<T: FromStr>(&mut self, field: &'static str) -> ParseResult<T> {
        let word = self.word(field)?;
        word.parse().map_err(|_| ParseError::InvalidValue {
            line: self.line,
            field,
            value: word.to_string(),
        })
    }

    fn vec3(&mut self, field: &'static str) -> ParseResult<Vec3> {
        Ok(Vec3::new(
            self.number(field)?,
            self.number(field)?,
            self.number(field)?,
        ))
    }

    /// `0` or `1`, as written by the scene files.
    fn flag(&mut self, field: &'static str) -> ParseResult<bool> {
        let value: i64 = self.number(field)?;
        Ok(value != 0)
    }

    fn remaining(&mut self) -> Option<&'a str> {
        self.iter.next()
    }
}

/// Incremental parser state: the description so far plus the defined names.
struct SceneParser {
    colors: Vec<ColorDesc>,
    objects: Vec<ObjectDesc>,
    shaders: Vec<ShaderDesc>,
    lights: Vec<LightDesc>,
    shaded_objects: Vec<ShadedObjectDesc>,
    background_shader: Option<String>,
    ambient_light: Option<AmbientDesc>,
    size: Option<(u32, u32)>,
    camera: Option<CameraDesc>,
    enable_shadows: bool,
    recursion_depth_limit: u32,
    base_dir: Option<PathBuf>,

    color_names: HashSet<String>,
    object_names: HashSet<String>,
    shader_names: HashSet<String>,
}

impl SceneParser {
    fn new(base_dir: Option<PathBuf>) -> Self {
        Self {
            colors: Vec::new(),
            objects: Vec::new(),
            shaders: Vec::new(),
            lights: Vec::new(),
            shaded_objects: Vec::new(),
            background_shader: None,
            ambient_light: None,
            size: None,
            camera: None,
            enable_shadows: true,
            recursion_depth_limit: DEFAULT_RECURSION_DEPTH_LIMIT,
            base_dir,
            color_names: HashSet::new(),
            object_names: HashSet::new(),
            shader_names: HashSet::new(),
        }
    }

    fn parse_line(&mut self, line: usize, text: &str) -> ParseResult<()> {
        let text = match text.find('#') {
            Some(at) => &text[..at],
            None => text,
        };

        let mut tokens = Tokens {
            iter: text.split_whitespace(),
            line,
        };
        let Some(command) = tokens.remaining() else {
            return Ok(());
        };

        match command {
            "size" => {
                let width = tokens.number("width")?;
                let height = tokens.number("height")?;
                self.size = Some((width, height));
            }
            "color" => {
                let name = self.define(&mut tokens, Kind::Color)?;
                let rgb = tokens.vec3("color")?;
                self.colors.push(ColorDesc {
                    name,
                    source: ColorSourceDesc::Flat(rgb),
                });
            }
            "texture" => {
                let name = self.define(&mut tokens, Kind::Color)?;
                let path = tokens.word("texture file")?.to_string();
                let bilinear = tokens.flag("bilinear flag")?;
                self.colors.push(ColorDesc {
                    name,
                    source: ColorSourceDesc::Texture { path, bilinear },
                });
            }
            "sphere" => {
                let name = self.define(&mut tokens, Kind::Object)?;
                let center = tokens.vec3("center")?;
                let radius = tokens.number("radius")?;
                self.objects.push(ObjectDesc {
                    name,
                    shape: ShapeDesc::Sphere { center, radius },
                });
            }
            "plane" => {
                let name = self.define(&mut tokens, Kind::Object)?;
                let point = tokens.vec3("point")?;
                let normal = tokens.vec3("normal")?;
                if normal.length_squared() == 0.0 {
                    return Err(ParseError::InvalidValue {
                        line,
                        field: "normal",
                        value: "0 0 0".to_string(),
                    });
                }
                self.objects.push(ObjectDesc {
                    name,
                    shape: ShapeDesc::Plane {
                        point,
                        normal: normal.normalize(),
                    },
                });
            }
            "mesh" => {
                let name = self.define(&mut tokens, Kind::Object)?;
                let path = tokens.word("mesh file")?.to_string();
                self.objects.push(ObjectDesc {
                    name,
                    shape: ShapeDesc::Mesh { path },
                });
            }
            "flat_shader" => {
                let name = self.define(&mut tokens, Kind::Shader)?;
                let color = self.reference(&mut tokens, Kind::Color)?;
                self.push_shader(name, ShaderKind::Flat { color });
            }
            "phong_shader" => {
                let name = self.define(&mut tokens, Kind::Shader)?;
                let ambient = self.reference(&mut tokens, Kind::Color)?;
                let diffuse = self.reference(&mut tokens, Kind::Color)?;
                let specular = self.reference(&mut tokens, Kind::Color)?;
                let specular_power = tokens.number("specular power")?;
                self.push_shader(
                    name,
                    ShaderKind::Phong {
                        ambient,
                        diffuse,
                        specular,
                        specular_power,
                    },
                );
            }
            "reflective_shader" => {
                let name = self.define(&mut tokens, Kind::Shader)?;
                let shader = self.reference(&mut tokens, Kind::Shader)?;
                let reflectivity: f64 = tokens.number("reflectivity")?;
                self.push_shader(
                    name,
                    ShaderKind::Reflective {
                        shader,
                        reflectivity: Interval::UNIT.clamp(reflectivity),
                    },
                );
            }
            "transparent_shader" => {
                let name = self.define(&mut tokens, Kind::Shader)?;
                let index_of_refraction: f64 = tokens.number("index of refraction")?;
                if !(index_of_refraction > 0.0) {
                    return Err(ParseError::InvalidValue {
                        line,
                        field: "index of refraction",
                        value: index_of_refraction.to_string(),
                    });
                }
                let opacity: f64 = tokens.number("opacity")?;
                let shader = self.reference(&mut tokens, Kind::Shader)?;
                self.push_shader(
                    name,
                    ShaderKind::Transparent {
                        index_of_refraction,
                        opacity: Interval::UNIT.clamp(opacity),
                        shader,
                    },
                );
            }
            "point_light" => {
                let position = tokens.vec3("light position")?;
                let color = self.reference(&mut tokens, Kind::Color)?;
                let brightness = tokens.number("brightness")?;
                self.lights.push(LightDesc::Point {
                    position,
                    color,
                    brightness,
                });
            }
            "shaded_object" => {
                let object = self.reference(&mut tokens, Kind::Object)?;
                let shader = self.reference(&mut tokens, Kind::Shader)?;
                self.shaded_objects.push(ShadedObjectDesc { object, shader });
            }
            "background_shader" => {
                self.background_shader = Some(self.reference(&mut tokens, Kind::Shader)?);
            }
            "ambient_light" => {
                let color = self.reference(&mut tokens, Kind::Color)?;
                let intensity = tokens.number("ambient intensity")?;
                self.ambient_light = Some(AmbientDesc { color, intensity });
            }
            "camera" => {
                let position = tokens.vec3("camera position")?;
                let look_at = tokens.vec3("look-at point")?;
                let up = tokens.vec3("up vector")?;
                let field_of_view = tokens.number("field of view")?;
                self.camera = Some(CameraDesc {
                    position,
                    look_at,
                    up,
                    field_of_view,
                });
            }
            "enable_shadows" => {
                self.enable_shadows = tokens.flag("shadow flag")?;
            }
            "recursion_depth_limit" => {
                self.recursion_depth_limit = tokens.number("recursion depth limit")?;
            }
            _ => {
                return Err(ParseError::UnknownCommand {
                    line,
                    command: command.to_string(),
                })
            }
        }

        if let Some(extra) = tokens.remaining() {
            log::warn!("Line {}: ignoring trailing input starting at '{}'", line, extra);
        }

        Ok(())
    }

    /// Read a new name and register it, rejecting redefinitions.
    fn define(&mut self, tokens: &mut Tokens<'_>, kind: Kind) -> ParseResult<String> {
        let name = tokens.word(kind.label())?.to_string();
        if !self.names_mut(kind).insert(name.clone()) {
            return Err(ParseError::DuplicateName {
                line: tokens.line,
                kind: kind.label(),
                name,
            });
        }
        Ok(name)
    }

    /// Read a name that must already be defined.
    fn reference(&self, tokens: &mut Tokens<'_>, kind: Kind) -> ParseResult<String> {
        let name = tokens.word(kind.label())?;
        if !self.names(kind).contains(name) {
            return Err(ParseError::UnknownName {
                line: tokens.line,
                kind: kind.label(),
                name: name.to_string(),
            });
        }
        Ok(name.to_string())
    }

    fn push_shader(&mut self, name: String, kind: ShaderKind) {
        self.shaders.push(ShaderDesc { name, kind });
    }

    fn names(&self, kind: Kind) -> &HashSet<String> {
        match kind {
            Kind::Color => &self.color_names,
            Kind::Object => &self.object_names,
            Kind::Shader => &self.shader_names,
        }
    }

    fn names_mut(&mut self, kind: Kind) -> &mut HashSet<String> {
        match kind {
            Kind::Color => &mut self.color_names,
            Kind::Object => &mut self.object_names,
            Kind::Shader => &mut self.shader_names,
        }
    }

    fn finish(self) -> ParseResult<SceneDescription> {
        let (width, height) = self.size.ok_or(ParseError::MissingSize)?;
        let camera = self.camera.ok_or(ParseError::MissingCamera)?;

        Ok(SceneDescription {
            colors: self.colors,
            objects: self.objects,
            shaders: self.shaders,
            lights: self.lights,
            shaded_objects: self.shaded_objects,
            background_shader: self.background_shader,
            ambient_light: self.ambient_light,
            width,
            height,
            camera,
            enable_shadows: self.enable_shadows,
            recursion_depth_limit: self.recursion_depth_limit,
            base_dir: self.base_dir,
        })
    }
}

#[derive(Clone, Copy)]
enum Kind {
    Color,
    Object,
    Shader,
}

impl Kind {
    fn label(self) -> &'static str {
        match self {
            Kind::Color => "color",
            Kind::Object => "object",
            Kind::Shader => "shader",
        }
    }
}
