//! Triangle mesh data loaded from OBJ files.
//!
//! The mesh is renderer-agnostic: the renderer wraps it in an intersectable
//! object whose parts are the individual triangles.

use std::path::Path;

use thiserror::Error;
use whitted_math::{Aabb, Vec2, Vec3};

/// Errors that can occur while loading a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("Failed to load OBJ {path}: {source}")]
    Obj {
        path: String,
        #[source]
        source: tobj::LoadError,
    },

    #[error("OBJ file {0} contains no models")]
    NoModels(String),

    #[error("Triangle {triangle} references vertex {index}, but the mesh has {count} vertices")]
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        count: usize,
    },
}

pub type MeshResult<T> = Result<T, MeshError>;

/// A mesh consisting of vertex positions, triangle indices and optional UVs.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Texture coordinates and the per-corner indices into them.
    /// `uv_indices` runs parallel to `indices`.
    pub uvs: Option<Vec<Vec2>>,
    pub uv_indices: Option<Vec<u32>>,

    /// Axis-aligned bounding box of all vertices
    pub bounds: Aabb,
}

impl Mesh {
    /// Create a new mesh from positions and triangle indices.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> MeshResult<Self> {
        Self::new_with_uvs(positions, indices, None)
    }

    /// Create a new mesh with per-corner texture coordinates.
    pub fn new_with_uvs(
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        uvs: Option<(Vec<Vec2>, Vec<u32>)>,
    ) -> MeshResult<Self> {
        check_indices(&indices, positions.len())?;

        let (uvs, uv_indices) = match uvs {
            Some((uvs, uv_indices)) if uv_indices.len() == indices.len() => {
                check_indices(&uv_indices, uvs.len())?;
                (Some(uvs), Some(uv_indices))
            }
            Some((_, uv_indices)) => {
                log::warn!(
                    "Ignoring texture coordinates: {} UV indices for {} vertex indices",
                    uv_indices.len(),
                    indices.len()
                );
                (None, None)
            }
            None => (None, None),
        };

        let bounds = positions.iter().fold(Aabb::EMPTY, |mut aabb, p| {
            aabb.include_point(*p);
            aabb
        });

        Ok(Self {
            positions,
            indices,
            uvs,
            uv_indices,
            bounds,
        })
    }

    /// Load every model of an OBJ file into one mesh.
    ///
    /// Polygons are triangulated. Texture coordinates are kept only if every
    /// model provides them.
    pub fn load_obj<P: AsRef<Path>>(path: P) -> MeshResult<Self> {
        let path = path.as_ref();
        let (models, _materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                single_index: false,
                triangulate: true,
                ..Default::default()
            },
        )
        .map_err(|source| MeshError::Obj {
            path: path.display().to_string(),
            source,
        })?;

        if models.is_empty() {
            return Err(MeshError::NoModels(path.display().to_string()));
        }

        let with_uvs = models
            .iter()
            .all(|m| !m.mesh.texcoords.is_empty() && !m.mesh.texcoord_indices.is_empty());

        let mut positions = Vec::new();
        let mut indices = Vec::new();
        let mut uvs = Vec::new();
        let mut uv_indices = Vec::new();

        for model in &models {
            let mesh = &model.mesh;
            let vertex_offset = positions.len() as u32;
            let uv_offset = uvs.len() as u32;

            positions.extend(
                mesh.positions
                    .chunks_exact(3)
                    .map(|p| Vec3::new(p[0] as f64, p[1] as f64, p[2] as f64)),
            );
            indices.extend(mesh.indices.iter().map(|i| i + vertex_offset));

            if with_uvs {
                uvs.extend(
                    mesh.texcoords
                        .chunks_exact(2)
                        .map(|t| Vec2::new(t[0] as f64, t[1] as f64)),
                );
                uv_indices.extend(mesh.texcoord_indices.iter().map(|i| i + uv_offset));
            }
        }

        log::debug!(
            "Loaded OBJ {}: {} models, {} vertices, {} triangles{}",
            path.display(),
            models.len(),
            positions.len(),
            indices.len() / 3,
            if with_uvs { ", with UVs" } else { "" }
        );

        let uvs = with_uvs.then_some((uvs, uv_indices));
        Self::new_with_uvs(positions, indices, uvs)
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Corner positions of triangle `tri`.
    pub fn triangle(&self, tri: usize) -> [Vec3; 3] {
        let corners = &self.indices[3 * tri..3 * tri + 3];
        [
            self.positions[corners[0] as usize],
            self.positions[corners[1] as usize],
            self.positions[corners[2] as usize],
        ]
    }

    /// Corner texture coordinates of triangle `tri`, if the mesh has UVs.
    pub fn triangle_uvs(&self, tri: usize) -> Option<[Vec2; 3]> {
        let uvs = self.uvs.as_ref()?;
        let corners = &self.uv_indices.as_ref()?[3 * tri..3 * tri + 3];
        Some([
            uvs[corners[0] as usize],
            uvs[corners[1] as usize],
            uvs[corners[2] as usize],
        ])
    }

    /// Check if the mesh has UV coordinates.
    pub fn has_uvs(&self) -> bool {
        self.uvs.is_some()
    }
}

fn check_indices(indices: &[u32], count: usize) -> MeshResult<()> {
    match indices.iter().position(|&i| i as usize >= count) {
        Some(at) => Err(MeshError::IndexOutOfRange {
            triangle: at / 3,
            index: indices[at],
            count,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("whitted_mesh_{}_{}", std::process::id(), name));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_mesh_creation() {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let mesh = Mesh::new(positions.clone(), vec![0, 1, 2]).unwrap();

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert!(!mesh.has_uvs());
        assert_eq!(mesh.triangle(0), [positions[0], positions[1], positions[2]]);
        assert!(mesh.triangle_uvs(0).is_none());
    }

    #[test]
    fn test_bounds_computation() {
        let positions = vec![
            Vec3::new(-1.0, -2.0, -3.0),
            Vec3::new(4.0, 5.0, 6.0),
            Vec3::new(0.0, 0.0, 0.0),
        ];
        let mesh = Mesh::new(positions, vec![0, 1, 2]).unwrap();

        assert_eq!(mesh.bounds.lo, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(mesh.bounds.hi, Vec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_index_out_of_range() {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        let err = Mesh::new(positions, vec![0, 1, 2, 0, 2, 7]).unwrap_err();
        assert!(matches!(
            err,
            MeshError::IndexOutOfRange { triangle: 1, index: 7, count: 3 }
        ));
    }

    #[test]
    fn test_load_obj_quad_with_uvs() {
        let path = write_temp(
            "quad.obj",
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\
             vt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\n\
             f 1/1 2/2 3/3\nf 1/1 3/3 4/4\n",
        );
        let mesh = Mesh::load_obj(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.has_uvs());

        let [a, b, c] = mesh.triangle(1);
        assert_eq!(a, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(b, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(c, Vec3::new(0.0, 1.0, 0.0));

        let uvs = mesh.triangle_uvs(1).unwrap();
        assert_eq!(uvs[1], Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_load_obj_without_uvs() {
        let path = write_temp("tri.obj", "v 0 0 0\nv 2 0 0\nv 0 2 0\nf 1 2 3\n");
        let mesh = Mesh::load_obj(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(mesh.triangle_count(), 1);
        assert!(!mesh.has_uvs());
        assert_eq!(mesh.bounds.hi, Vec3::new(2.0, 2.0, 0.0));
    }

    #[test]
    fn test_load_obj_missing_file() {
        let err = Mesh::load_obj("/definitely/not/here.obj").unwrap_err();
        assert!(matches!(err, MeshError::Obj { .. }));
    }
}
