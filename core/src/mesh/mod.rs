//! Mesh buffers for deformable surfaces
//!
//! [`SurfaceMesh`] is the validated vertex/normal/triangle data a surface is
//! built from. Triangles are stored as index triples so pruning can drop whole
//! faces without touching the vertex buffers.

use glam::Vec3;

use crate::error::MeshError;

mod export;
mod primitives;

pub use export::write_obj;
pub use primitives::{plane, sphere};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Box centred on `center` extending `half_extent` along every axis
    pub fn from_center(center: Vec3, half_extent: f32) -> Self {
        let half = Vec3::splat(half_extent);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Smallest box enclosing all points (zero box for an empty slice)
    pub fn from_points(points: &[Vec3]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };
        points[1..].iter().fold(
            Self {
                min: *first,
                max: *first,
            },
            |aabb, p| Self {
                min: aabb.min.min(*p),
                max: aabb.max.max(*p),
            },
        )
    }

    /// Inclusive containment test
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Vertex, normal and triangle buffers of a surface
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SurfaceMesh {
    /// Vertex positions in local space
    pub positions: Vec<Vec3>,
    /// Unit normals, one per position
    pub normals: Vec<Vec3>,
    /// Counter-clockwise index triples into `positions`
    pub triangles: Vec<[u32; 3]>,
}

impl SurfaceMesh {
    /// Build a mesh, rejecting mismatched buffers, missing faces and dangling indices
    pub fn new(
        positions: Vec<Vec3>,
        normals: Vec<Vec3>,
        triangles: Vec<[u32; 3]>,
    ) -> Result<Self, MeshError> {
        let mesh = Self {
            positions,
            normals,
            triangles,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Build a mesh from a flat index buffer (three indices per triangle)
    pub fn from_flat_indices(
        positions: Vec<Vec3>,
        normals: Vec<Vec3>,
        indices: &[u32],
    ) -> Result<Self, MeshError> {
        if !indices.len().is_multiple_of(3) {
            return Err(MeshError::IndexCountNotTriangles(indices.len()));
        }
        let triangles = indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect();
        Self::new(positions, normals, triangles)
    }

    /// Check buffer lengths and index ranges
    pub fn validate(&self) -> Result<(), MeshError> {
        let vertex_count = self.positions.len();
        if vertex_count == 0 {
            return Err(MeshError::Empty);
        }
        if u32::try_from(vertex_count).is_err() {
            return Err(MeshError::TooManyVertices(vertex_count));
        }
        if self.normals.len() != vertex_count {
            return Err(MeshError::NormalCountMismatch {
                positions: vertex_count,
                normals: self.normals.len(),
            });
        }
        if self.triangles.is_empty() {
            return Err(MeshError::NoTriangles);
        }
        for (triangle, indices) in self.triangles.iter().enumerate() {
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(MeshError::IndexOutOfBounds {
                    triangle,
                    index,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(&self.positions)
    }

    /// Flatten triangles back into an index buffer
    pub fn flat_indices(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }
}

/// Area-weighted smooth vertex normals
///
/// Vertices not referenced by any non-degenerate triangle keep the matching
/// entry of `fallback`.
pub fn smooth_normals(positions: &[Vec3], triangles: &[[u32; 3]], fallback: &[Vec3]) -> Vec<Vec3> {
    let mut accum = vec![Vec3::ZERO; positions.len()];

    for &[a, b, c] in triangles {
        let (a, b, c) = (a as usize, b as usize, c as usize);
        let p0 = positions[a];
        // Unnormalized cross product weights each face by its area
        let face = (positions[b] - p0).cross(positions[c] - p0);
        accum[a] += face;
        accum[b] += face;
        accum[c] += face;
    }

    accum
        .into_iter()
        .enumerate()
        .map(|(i, n)| {
            let n = n.normalize_or_zero();
            if n == Vec3::ZERO {
                fallback.get(i).copied().unwrap_or(Vec3::Y)
            } else {
                n
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> SurfaceMesh {
        SurfaceMesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![Vec3::Z; 3],
            vec![[0, 1, 2]],
        )
        .unwrap()
    }

    #[test]
    fn test_valid_mesh() {
        let mesh = triangle();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.flat_indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_rejects_empty() {
        let result = SurfaceMesh::new(Vec::new(), Vec::new(), Vec::new());
        assert_eq!(result, Err(MeshError::Empty));
    }

    #[test]
    fn test_rejects_normal_mismatch() {
        let result = SurfaceMesh::new(vec![Vec3::ZERO, Vec3::X], vec![Vec3::Z], Vec::new());
        assert_eq!(
            result,
            Err(MeshError::NormalCountMismatch {
                positions: 2,
                normals: 1
            })
        );
    }

    #[test]
    fn test_rejects_missing_triangles() {
        let result = SurfaceMesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![Vec3::Z; 3], Vec::new());
        assert_eq!(result, Err(MeshError::NoTriangles));

        let result = SurfaceMesh::from_flat_indices(vec![Vec3::ZERO; 3], vec![Vec3::Z; 3], &[]);
        assert_eq!(result, Err(MeshError::NoTriangles));
    }

    #[test]
    fn test_rejects_dangling_index() {
        let result = SurfaceMesh::new(vec![Vec3::ZERO; 3], vec![Vec3::Z; 3], vec![[0, 1, 3]]);
        assert_eq!(
            result,
            Err(MeshError::IndexOutOfBounds {
                triangle: 0,
                index: 3,
                vertex_count: 3
            })
        );
    }

    #[test]
    fn test_rejects_partial_triangle() {
        let result = SurfaceMesh::from_flat_indices(vec![Vec3::ZERO; 3], vec![Vec3::Z; 3], &[0, 1]);
        assert_eq!(result, Err(MeshError::IndexCountNotTriangles(2)));
    }

    #[test]
    fn test_aabb() {
        let aabb = Aabb::from_points(&[Vec3::new(-1.0, 2.0, 0.0), Vec3::new(3.0, -2.0, 1.0)]);
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(3.0, 2.0, 1.0));
        assert!(aabb.contains(Vec3::new(3.0, 2.0, 1.0)));
        assert!(!aabb.contains(Vec3::new(3.1, 0.0, 0.0)));
        assert_eq!(aabb.center(), Vec3::new(1.0, 0.0, 0.5));
    }

    #[test]
    fn test_aabb_from_center() {
        let aabb = Aabb::from_center(Vec3::ONE, 0.5);
        assert_eq!(aabb.size(), Vec3::ONE);
        assert!(aabb.contains(Vec3::splat(1.5)));
    }

    #[test]
    fn test_smooth_normals_ccw() {
        let mesh = triangle();
        let normals = smooth_normals(&mesh.positions, &mesh.triangles, &mesh.normals);
        for n in normals {
            assert!((n - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn test_smooth_normals_keeps_fallback_for_orphans() {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::splat(5.0)];
        let fallback = vec![Vec3::X; 4];
        let normals = smooth_normals(&positions, &[[0, 1, 2]], &fallback);
        assert_eq!(normals[3], Vec3::X);
    }
}
