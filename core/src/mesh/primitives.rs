//! Parametric primitives for building test and demo surfaces

use glam::Vec3;
use std::f32::consts::PI;
use tracing::warn;

use super::SurfaceMesh;

/// Generate a subdivided plane on the XZ plane (Y=0) facing +Y
///
/// # Arguments
/// * `size_x` - Width along X axis
/// * `size_z` - Depth along Z axis
/// * `subdivisions_x` - Number of X subdivisions (min 1, max 1024)
/// * `subdivisions_z` - Number of Z subdivisions (min 1, max 1024)
///
/// # Returns
/// Mesh with `(subdivisions_x + 1) × (subdivisions_z + 1)` vertices
pub fn plane(size_x: f32, size_z: f32, subdivisions_x: u32, subdivisions_z: u32) -> SurfaceMesh {
    let size_x = if size_x <= 0.0 {
        warn!("plane: size_x must be > 0.0, clamping to 0.001");
        0.001
    } else {
        size_x
    };

    let size_z = if size_z <= 0.0 {
        warn!("plane: size_z must be > 0.0, clamping to 0.001");
        0.001
    } else {
        size_z
    };

    let subdivisions_x = subdivisions_x.clamp(1, 1024);
    let subdivisions_z = subdivisions_z.clamp(1, 1024);

    let mut mesh = SurfaceMesh::default();

    for z in 0..=subdivisions_z {
        for x in 0..=subdivisions_x {
            let u = x as f32 / subdivisions_x as f32;
            let v = z as f32 / subdivisions_z as f32;
            mesh.positions
                .push(Vec3::new(-size_x * 0.5 + u * size_x, 0.0, -size_z * 0.5 + v * size_z));
            mesh.normals.push(Vec3::Y);
        }
    }

    let row = subdivisions_x + 1;
    for z in 0..subdivisions_z {
        for x in 0..subdivisions_x {
            let i0 = z * row + x;
            let i1 = i0 + 1;
            let i2 = (z + 1) * row + x;
            let i3 = i2 + 1;

            // CCW winding for +Y normal
            mesh.triangles.push([i0, i2, i1]);
            mesh.triangles.push([i1, i2, i3]);
        }
    }

    mesh
}

/// Generate a UV sphere with smooth outward normals
///
/// # Arguments
/// * `radius` - Sphere radius
/// * `segments` - Longitudinal divisions (min 3, max 256)
/// * `rings` - Latitudinal divisions (min 2, max 256)
///
/// Seam and pole vertices are duplicated, so the mesh has
/// `(rings + 1) × (segments + 1)` vertices.
pub fn sphere(radius: f32, segments: u32, rings: u32) -> SurfaceMesh {
    let radius = if radius <= 0.0 {
        warn!("sphere: radius must be > 0.0, clamping to 0.001");
        0.001
    } else {
        radius
    };

    let segments = segments.clamp(3, 256);
    let rings = rings.clamp(2, 256);

    let mut mesh = SurfaceMesh::default();

    for ring in 0..=rings {
        let phi = (ring as f32 / rings as f32) * PI;
        let y = radius * phi.cos();
        let ring_radius = radius * phi.sin();

        for seg in 0..=segments {
            let theta = (seg as f32 / segments as f32) * 2.0 * PI;
            let position = Vec3::new(ring_radius * theta.cos(), y, ring_radius * theta.sin());
            mesh.positions.push(position);
            mesh.normals.push(position.normalize());
        }
    }

    let verts_per_ring = segments + 1;
    for ring in 0..rings {
        for seg in 0..segments {
            let i0 = ring * verts_per_ring + seg;
            let i1 = i0 + 1;
            let i2 = (ring + 1) * verts_per_ring + seg;
            let i3 = i2 + 1;

            mesh.triangles.push([i0, i1, i3]);
            mesh.triangles.push([i0, i3, i2]);
        }
    }

    mesh
}
