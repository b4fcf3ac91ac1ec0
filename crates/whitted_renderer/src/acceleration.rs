//! Uniform grid acceleration structure.
//!
//! Finite primitives are rasterized into a regular 3D grid of cells over the
//! union of their bounding boxes. Queries walk the cells a ray passes through
//! in order (3D DDA) and stop as soon as the best hit lies before the current
//! cell. Infinite primitives (planes) are kept aside and always tested.
//!
//! The grid only prunes work: for every ray the result equals testing every
//! primitive and keeping the nearest hit.

use crate::hit::keep_closest;
use crate::{Object, SceneHit, SMALL_T};
use whitted_math::{Aabb, IVec3, Ray, Vec3};

/// Direction components smaller than this never cross a cell boundary.
const PARALLEL_EPSILON: f64 = 1e-16;

/// Minimum domain thickness per axis. A flat domain would give zero-sized
/// cells.
const MIN_DOMAIN_EXTENT: f64 = 1e-4;

/// Upper bound on the total number of grid cells.
pub const MAX_GRID_CELLS: usize = 1 << 24;

/// Total cells of a grid resolution, or `None` on overflow.
pub fn cell_count(resolution: [usize; 3]) -> Option<usize> {
    resolution[0]
        .checked_mul(resolution[1])?
        .checked_mul(resolution[2])
}

/// One intersectable unit: a whole simple object or one triangle of a mesh.
#[derive(Clone, Copy)]
pub struct Primitive<'s> {
    pub object: &'s dyn Object,
    pub part: Option<usize>,
    /// Index of the shaded object in the scene
    pub id: usize,
}

impl<'s> Primitive<'s> {
    fn bounding_box(&self) -> (Aabb, bool) {
        self.object.bounding_box(self.part)
    }
}

/// Summary of a built grid, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GridStats {
    pub occupied_cells: usize,
    pub references: usize,
    pub infinite_primitives: usize,
}

/// Uniform grid over the finite primitives of a scene.
///
/// Holds references into the scene's objects and must not outlive them.
pub struct Acceleration<'s> {
    domain: Aabb,
    num_cells: IVec3,
    cell_size: Vec3,
    cells: Vec<Vec<Primitive<'s>>>,
    infinite_objects: Vec<Primitive<'s>>,
    finite_objects: Vec<Primitive<'s>>,
}

impl<'s> Acceleration<'s> {
    /// Create an empty structure with the given grid resolution. Each axis
    /// gets at least one cell, and the largest axes are halved until the
    /// grid fits in [`MAX_GRID_CELLS`].
    pub fn new(resolution: [usize; 3]) -> Self {
        let mut counts = resolution.map(|n| n.clamp(1, MAX_GRID_CELLS));
        while cell_count(counts).map_or(true, |total| total > MAX_GRID_CELLS) {
            let axis = (0..3).max_by_key(|&a| counts[a]).unwrap_or(0);
            counts[axis] = (counts[axis] / 2).max(1);
        }
        if counts != resolution {
            log::warn!(
                "Grid resolution {:?} reduced to {:?} (at most {} cells)",
                resolution,
                counts,
                MAX_GRID_CELLS
            );
        }
        let num_cells = IVec3::new(counts[0] as i32, counts[1] as i32, counts[2] as i32);

        Self {
            domain: Aabb::EMPTY,
            num_cells,
            cell_size: Vec3::ZERO,
            cells: Vec::new(),
            infinite_objects: Vec::new(),
            finite_objects: Vec::new(),
        }
    }

    /// Register every part of `object` under scene index `id`.
    pub fn add_object(&mut self, object: &'s dyn Object, id: usize) {
        for part in 0..object.num_parts() {
            let prim = Primitive {
                object,
                part: Some(part),
                id,
            };

            let (bbox, is_infinite) = prim.bounding_box();
            if is_infinite {
                self.infinite_objects.push(prim);
            } else {
                self.domain.include_point(bbox.lo);
                self.domain.include_point(bbox.hi);
                self.finite_objects.push(prim);
            }
        }
    }

    /// Build the grid from the finite primitives added so far.
    ///
    /// With no finite primitives the grid stays empty and queries only test
    /// the infinite ones.
    pub fn initialize(&mut self) {
        self.cells.clear();
        if self.finite_objects.is_empty() {
            log::info!(
                "Acceleration grid empty, {} infinite primitives",
                self.infinite_objects.len()
            );
            return;
        }

        self.domain = self.domain.pad_to_minimums(MIN_DOMAIN_EXTENT);
        self.cell_size = self.domain.extent() / self.num_cells.as_dvec3();

        let total = (self.num_cells.x as usize)
            * (self.num_cells.y as usize)
            * (self.num_cells.z as usize);
        self.cells = vec![Vec::new(); total];

        let finite_objects = std::mem::take(&mut self.finite_objects);
        for prim in &finite_objects {
            let (bbox, _) = prim.bounding_box();
            let min_index = self.cell_index(bbox.lo);
            let max_index = self.cell_index(bbox.hi);

            for k in min_index.z..=max_index.z {
                for j in min_index.y..=max_index.y {
                    for i in min_index.x..=max_index.x {
                        let idx = self.flat_index(IVec3::new(i, j, k));
                        self.cells[idx].push(*prim);
                    }
                }
            }
        }

        let stats = self.stats();
        log::info!(
            "Acceleration grid {}x{}x{} over {:?}..{:?}: {} primitives, {} occupied cells, {} references, {} infinite",
            self.num_cells.x,
            self.num_cells.y,
            self.num_cells.z,
            self.domain.lo,
            self.domain.hi,
            finite_objects.len(),
            stats.occupied_cells,
            stats.references,
            stats.infinite_primitives
        );
    }

    /// Nearest hit along `ray` and the scene index of the object hit.
    pub fn closest_intersection(&self, ray: &Ray) -> Option<SceneHit> {
        let mut best = None;

        for prim in &self.infinite_objects {
            keep_closest(&mut best, prim.id, prim.object.intersection(ray, prim.part));
        }

        if self.cells.is_empty() || ray.direction == Vec3::ZERO {
            return best;
        }

        let Some(span) = self.domain.clip(ray) else {
            return best;
        };
        let t_min = span.min.max(SMALL_T);
        let t_max = span.max;
        if t_max < t_min {
            return best;
        }

        let mut t_cur = t_min;
        let mut cell = self.cell_index(ray.at(t_cur));

        let mut step = IVec3::ZERO;
        let mut t_delta = Vec3::INFINITY;
        let mut next_boundary = Vec3::INFINITY;

        for axis in 0..3 {
            let direction = ray.direction[axis];
            step[axis] = if direction > 0.0 { 1 } else { -1 };
            if direction.abs() < PARALLEL_EPSILON {
                continue;
            }

            t_delta[axis] = (self.cell_size[axis] / direction).abs();

            let boundary_cell = if step[axis] > 0 { cell[axis] + 1 } else { cell[axis] };
            let boundary = self.domain.lo[axis] + boundary_cell as f64 * self.cell_size[axis];
            next_boundary[axis] = (boundary - ray.endpoint[axis]) / direction;

            // First crossing strictly ahead of the entry point
            if t_delta[axis] > 0.0 {
                while next_boundary[axis] < t_cur {
                    next_boundary[axis] += t_delta[axis];
                }
            }
        }

        'traverse: loop {
            for prim in &self.cells[self.flat_index(cell)] {
                keep_closest(&mut best, prim.id, prim.object.intersection(ray, prim.part));
            }

            // Cells not yet visited start at or after t_cur. A hit exactly at
            // t_cur may still lose a tie to one in the next cell.
            if matches!(best, Some(b) if b.hit.dist < t_cur) {
                break;
            }

            let t_next = next_boundary.min_element();
            if t_next > t_max {
                break;
            }
            t_cur = t_next;

            for axis in 0..3 {
                if next_boundary[axis] == t_next {
                    next_boundary[axis] += t_delta[axis];
                    cell[axis] += step[axis];
                    if cell[axis] < 0 || cell[axis] >= self.num_cells[axis] {
                        break 'traverse;
                    }
                }
            }
        }

        best
    }

    /// Grid cell containing `point`, clamped into the grid.
    fn cell_index(&self, point: Vec3) -> IVec3 {
        let mut idx = IVec3::ZERO;
        for axis in 0..3 {
            let rel = (point[axis] - self.domain.lo[axis]) / self.cell_size[axis];
            let cell = rel.floor() as i64;
            idx[axis] = cell.clamp(0, self.num_cells[axis] as i64 - 1) as i32;
        }
        idx
    }

    fn flat_index(&self, cell: IVec3) -> usize {
        let nx = self.num_cells.x as usize;
        let ny = self.num_cells.y as usize;
        cell.x as usize + nx * (cell.y as usize + ny * cell.z as usize)
    }

    /// Cells are allocated (there was at least one finite primitive).
    pub fn has_grid(&self) -> bool {
        !self.cells.is_empty()
    }

    pub fn domain(&self) -> Aabb {
        self.domain
    }

    pub fn num_cells(&self) -> IVec3 {
        self.num_cells
    }

    pub fn stats(&self) -> GridStats {
        GridStats {
            occupied_cells: self.cells.iter().filter(|c| !c.is_empty()).count(),
            references: self.cells.iter().map(Vec::len).sum(),
            infinite_primitives: self.infinite_objects.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MeshObject, Plane, Sphere};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::Arc;
    use whitted_core::Mesh;

    fn brute_force(objects: &[Box<dyn Object>], ray: &Ray) -> Option<SceneHit> {
        let mut best = None;
        for (id, object) in objects.iter().enumerate() {
            keep_closest(&mut best, id, object.intersection(ray, None));
        }
        best
    }

    fn build<'s>(objects: &'s [Box<dyn Object>], resolution: [usize; 3]) -> Acceleration<'s> {
        let mut accel = Acceleration::new(resolution);
        for (id, object) in objects.iter().enumerate() {
            accel.add_object(object.as_ref(), id);
        }
        accel.initialize();
        accel
    }

    fn random_vec(rng: &mut StdRng, range: f64) -> Vec3 {
        Vec3::new(
            rng.gen_range(-range..range),
            rng.gen_range(-range..range),
            rng.gen_range(-range..range),
        )
    }

    fn random_mesh(rng: &mut StdRng, triangles: usize) -> Mesh {
        let mut positions = Vec::new();
        let mut indices = Vec::new();
        for t in 0..triangles {
            let center = random_vec(rng, 4.0);
            for _ in 0..3 {
                positions.push(center + random_vec(rng, 1.0));
            }
            let base = 3 * t as u32;
            indices.extend([base, base + 1, base + 2]);
        }
        Mesh::new(positions, indices).unwrap()
    }

    fn assert_same(grid: Option<SceneHit>, brute: Option<SceneHit>, ray: &Ray) {
        match (grid, brute) {
            (None, None) => {}
            (Some(g), Some(b)) => {
                assert!(
                    (g.hit.dist - b.hit.dist).abs() < 1e-9,
                    "distance mismatch for {:?}: grid {} brute {}",
                    ray,
                    g.hit.dist,
                    b.hit.dist
                );
                assert_eq!(g.id, b.id, "object mismatch for {:?}", ray);
            }
            (g, b) => panic!("hit mismatch for {:?}: grid {:?} brute {:?}", ray, g, b),
        }
    }

    #[test]
    fn test_grid_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(42);

        let mut objects: Vec<Box<dyn Object>> = Vec::new();
        for _ in 0..25 {
            let center = random_vec(&mut rng, 5.0);
            objects.push(Box::new(Sphere::new(center, rng.gen_range(0.1..1.0))));
        }
        objects.push(Box::new(MeshObject::new(Arc::new(random_mesh(&mut rng, 40)))));
        objects.push(Box::new(Plane::new(Vec3::new(0.0, -6.0, 0.0), Vec3::Y)));

        for resolution in [[1, 1, 1], [7, 3, 11], [40, 40, 40]] {
            let accel = build(&objects, resolution);
            assert!(accel.has_grid());

            for _ in 0..2000 {
                // Origins both inside and outside the grid domain
                let origin = random_vec(&mut rng, 9.0);
                let ray = Ray::new(origin, random_vec(&mut rng, 1.0));
                assert_same(
                    accel.closest_intersection(&ray),
                    brute_force(&objects, &ray),
                    &ray,
                );
            }
        }
    }

    #[test]
    fn test_axis_aligned_rays_match_brute_force() {
        let mut rng = StdRng::seed_from_u64(7);

        let mut objects: Vec<Box<dyn Object>> = Vec::new();
        for _ in 0..30 {
            let center = random_vec(&mut rng, 5.0);
            objects.push(Box::new(Sphere::new(center, rng.gen_range(0.2..1.5))));
        }
        let accel = build(&objects, [16, 16, 16]);

        let axes = [Vec3::X, Vec3::Y, Vec3::Z, -Vec3::X, -Vec3::Y, -Vec3::Z];
        for _ in 0..500 {
            let origin = random_vec(&mut rng, 8.0);
            for dir in axes {
                let ray = Ray::new(origin, dir);
                assert_same(
                    accel.closest_intersection(&ray),
                    brute_force(&objects, &ray),
                    &ray,
                );
            }
        }
    }

    #[test]
    fn test_flat_domain_is_padded() {
        // Two triangles in the z = 0 plane: zero thickness along z
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let mesh = Mesh::new(positions, vec![0, 1, 2, 0, 2, 3]).unwrap();
        let objects: Vec<Box<dyn Object>> = vec![Box::new(MeshObject::new(Arc::new(mesh)))];
        let accel = build(&objects, [8, 8, 8]);

        assert!(accel.domain().extent().z > 0.0);

        let ray = Ray::new(Vec3::new(0.3, 0.6, 5.0), -Vec3::Z);
        let hit = accel.closest_intersection(&ray).unwrap();
        assert!((hit.hit.dist - 5.0).abs() < 1e-12);
        assert_eq!(hit.hit.part, Some(1));

        // Grazing ray inside the plane hits nothing
        let ray = Ray::new(Vec3::new(-1.0, 0.5, 0.0), Vec3::X);
        assert!(accel.closest_intersection(&ray).is_none());
    }

    #[test]
    fn test_only_infinite_objects_leaves_grid_empty() {
        let objects: Vec<Box<dyn Object>> =
            vec![Box::new(Plane::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0)))];
        let accel = build(&objects, [40, 40, 40]);

        assert!(!accel.has_grid());
        assert_eq!(accel.stats().infinite_primitives, 1);

        let ray = Ray::new(Vec3::new(0.0, 3.0, 0.0), Vec3::new(0.3, -1.0, 0.2));
        assert_same(
            accel.closest_intersection(&ray),
            brute_force(&objects, &ray),
            &ray,
        );

        let ray = Ray::new(Vec3::new(0.0, 3.0, 0.0), Vec3::X);
        assert!(accel.closest_intersection(&ray).is_none());
    }

    #[test]
    fn test_primitive_spanning_cells_is_referenced_in_each() {
        let objects: Vec<Box<dyn Object>> = vec![
            Box::new(Sphere::new(Vec3::ZERO, 1.0)),
            Box::new(Sphere::new(Vec3::new(3.0, 0.0, 0.0), 1.0)),
        ];
        // Domain spans x in [-1, 4]: cells 0..=2 hold the first sphere, 3..=4 the second
        let accel = build(&objects, [5, 1, 1]);
        let stats = accel.stats();
        assert_eq!(stats.occupied_cells, 5);
        assert_eq!(stats.references, 2 + 3);
    }

    #[test]
    fn test_resolution_is_at_least_one() {
        let accel = Acceleration::new([0, 3, 0]);
        assert_eq!(accel.num_cells(), IVec3::new(1, 3, 1));
    }

    #[test]
    fn test_oversized_resolution_is_reduced() {
        for resolution in [[3000, 3000, 3000], [1, 1, 1 << 30], [usize::MAX; 3]] {
            let cells = Acceleration::new(resolution).num_cells();
            assert!(cells.min_element() >= 1);
            let counts = [cells.x as usize, cells.y as usize, cells.z as usize];
            assert!(cell_count(counts).unwrap() <= MAX_GRID_CELLS, "{:?}", counts);
        }

        // Within the limit the resolution is kept as given
        assert_eq!(Acceleration::new([256, 256, 256]).num_cells(), IVec3::splat(256));
    }

    #[test]
    fn test_coplanar_tie_matches_brute_force() {
        // A mesh quad lying in the plane y = 0, registered before the plane
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 1.0),
        ];
        let mesh = Mesh::new(positions, vec![0, 1, 2, 0, 2, 3]).unwrap();
        let objects: Vec<Box<dyn Object>> = vec![
            Box::new(MeshObject::new(Arc::new(mesh))),
            Box::new(Plane::new(Vec3::ZERO, Vec3::Y)),
        ];
        let accel = build(&objects, [4, 4, 4]);

        let ray = Ray::new(Vec3::new(0.25, 1.0, 0.3), -Vec3::Y);
        let grid = accel.closest_intersection(&ray).unwrap();
        assert_eq!(grid.id, 0);
        assert!((grid.hit.dist - 1.0).abs() < 1e-12);
        assert_same(Some(grid), brute_force(&objects, &ray), &ray);

        // Rays through the diagonal shared by both triangles of the quad
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let x = rng.gen_range(0.0..1.0);
            let ray = Ray::new(Vec3::new(x, 2.0, x), -Vec3::Y);
            let grid = accel.closest_intersection(&ray).unwrap();
            let brute = brute_force(&objects, &ray).unwrap();
            assert_same(Some(grid), Some(brute), &ray);
            assert_eq!(grid.hit.part, Some(0), "{:?}", ray);
            assert_eq!(brute.hit.part, Some(0), "{:?}", ray);
        }

        // The same surfaces registered in the other order
        let swapped: Vec<Box<dyn Object>> = objects.into_iter().rev().collect();
        let accel = build(&swapped, [4, 4, 4]);
        assert_eq!(accel.closest_intersection(&ray).unwrap().id, 0);
        assert_eq!(brute_force(&swapped, &ray).unwrap().id, 0);
    }
}
