//! Wavefront OBJ export

use std::io::{self, Write};

use super::SurfaceMesh;

/// Write positions, normals and retained faces as Wavefront OBJ
///
/// Faces use 1-based `v//vn` references. Only the triangles still present in
/// the mesh are written, so pruned geometry shows up as holes.
pub fn write_obj<W: Write>(mesh: &SurfaceMesh, name: &str, mut out: W) -> io::Result<()> {
    writeln!(out, "# rubble surface export")?;
    writeln!(out, "o {name}")?;

    for p in &mesh.positions {
        writeln!(out, "v {:.6} {:.6} {:.6}", p.x, p.y, p.z)?;
    }
    for n in &mesh.normals {
        writeln!(out, "vn {:.6} {:.6} {:.6}", n.x, n.y, n.z)?;
    }
    for &[a, b, c] in &mesh.triangles {
        let (a, b, c) = (a + 1, b + 1, c + 1);
        writeln!(out, "f {a}//{a} {b}//{b} {c}//{c}")?;
    }

    out.flush()
}
