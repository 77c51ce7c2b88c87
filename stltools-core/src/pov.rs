//! POV-Ray `mesh` and `mesh2` declarations
//!
//! POV-Ray uses a left-handed system with Y up, so coordinates are written in
//! (x, z, y) order.
use std::io::{self, Write};
use std::path::Path;

use data_encoding::BASE32;
use sha1::{Digest, Sha1};
use tracing::warn;

use crate::geometry::Mesh;

/// POV-Ray identifiers are at most 40 characters; `m_` takes two of them.
const MAX_NAME: usize = 38;

/// Check that `name` can follow `m_` in a POV-Ray identifier.
pub fn valid_name(name: &str) -> bool {
    (1..=MAX_NAME).contains(&name.len())
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Derive an identifier from a hash of the object name, or of the file name
/// when the object has none.
///
/// The result is eight characters of the lowercase base32 SHA-1 digest.
pub fn generate_name(name: &str, path: &Path) -> String {
    let base = if name.is_empty() {
        path.file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        name.to_string()
    };
    let encoded = BASE32.encode(&Sha1::digest(base.as_bytes()));
    encoded[8..16].to_ascii_lowercase()
}

/// The name to declare a mesh under, generating one if needed.
pub fn identifier(name: &str, path: &Path) -> String {
    if valid_name(name) {
        return format!("m_{name}");
    }
    let generated = format!("m_{}", generate_name(name, path));
    warn!(
        "the object name \"{}\" is not a valid POV-ray identifier, using \"{}\" instead",
        name, generated
    );
    generated
}

/// Write an inline triangle list.
pub fn write_mesh<W: Write>(w: &mut W, identifier: &str, mesh: &Mesh) -> io::Result<()> {
    writeln!(w, "#declare {identifier} = mesh {{")?;
    for facet in &mesh.facets {
        let [a, b, c] = facet.vertices.map(|i| mesh.vertices[i]);
        writeln!(w, "  triangle {{")?;
        writeln!(w, "    <{:e}, {:e}, {:e}>,", a.x, a.z, a.y)?;
        writeln!(w, "    <{:e}, {:e}, {:e}>,", b.x, b.z, b.y)?;
        writeln!(w, "    <{:e}, {:e}, {:e}>", c.x, c.z, c.y)?;
        writeln!(w, "  }}")?;
    }
    writeln!(w, "}}")
}

/// Write an indexed `mesh2` declaration.
pub fn write_mesh2<W: Write>(w: &mut W, identifier: &str, mesh: &Mesh) -> io::Result<()> {
    writeln!(w, "#declare {identifier} = mesh2 {{")?;
    writeln!(w, "  vertex_vectors {{")?;
    write!(w, "    {}", mesh.vertices.len())?;
    for p in &mesh.vertices {
        write!(w, ",\n    <{:e}, {:e}, {:e}>", p.x, p.z, p.y)?;
    }
    writeln!(w, "\n  }}")?;
    writeln!(w, "  face_indices {{")?;
    write!(w, "    {}", mesh.len())?;
    for facet in &mesh.facets {
        let [a, b, c] = facet.vertices;
        write!(w, ",\n    <{a}, {b}, {c}>")?;
    }
    writeln!(w, "\n  }}")?;
    writeln!(w, "}}")
}
