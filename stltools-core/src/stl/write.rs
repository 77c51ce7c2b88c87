//! STL encoding of indexed meshes.
use std::io::{self, Write};

use super::HEADER_SIZE;
use crate::geometry::Mesh;

/// `-0.0` prints as `-0`; write it as plain zero.
fn unsigned_zero(v: f32) -> f32 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

/// Write a mesh as an ASCII STL file.
///
/// Numbers are written in their shortest form that reads back to the same
/// `f32`, so a parsed file can be written again without loss.
pub fn write_text<W: Write>(w: &mut W, mesh: &Mesh) -> io::Result<()> {
    writeln!(w, "solid {}", mesh.name)?;
    for facet in &mesh.facets {
        let n = mesh.normal(facet).map(unsigned_zero);
        writeln!(w, "  facet normal {} {} {}", n.x, n.y, n.z)?;
        writeln!(w, "    outer loop")?;
        for &i in &facet.vertices {
            let p = mesh.vertices[i].map(unsigned_zero);
            writeln!(w, "      vertex {} {} {}", p.x, p.y, p.z)?;
        }
        writeln!(w, "    endloop")?;
        writeln!(w, "  endfacet")?;
    }
    writeln!(w, "endsolid {}", mesh.name)
}

fn write_f32s<W: Write>(w: &mut W, values: &[f32]) -> io::Result<()> {
    for v in values {
        w.write_all(&v.to_le_bytes())?;
    }
    Ok(())
}

/// Write a mesh as a binary STL file.
///
/// The name goes into the header, truncated to 80 bytes and padded with NUL.
pub fn write_binary<W: Write>(w: &mut W, mesh: &Mesh) -> io::Result<()> {
    let mut header = [0u8; HEADER_SIZE];
    let mut len = mesh.name.len().min(HEADER_SIZE);
    while !mesh.name.is_char_boundary(len) {
        len -= 1;
    }
    header[..len].copy_from_slice(&mesh.name.as_bytes()[..len]);
    w.write_all(&header)?;

    let count = u32::try_from(mesh.len()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "too many facets for a binary STL file",
        )
    })?;
    w.write_all(&count.to_le_bytes())?;

    for facet in &mesh.facets {
        let n = mesh.normal(facet);
        write_f32s(w, &[n.x, n.y, n.z])?;
        for &i in &facet.vertices {
            let p = mesh.vertices[i];
            write_f32s(w, &[p.x, p.y, p.z])?;
        }
        // Attribute byte count
        w.write_all(&0u16.to_le_bytes())?;
    }
    Ok(())
}
