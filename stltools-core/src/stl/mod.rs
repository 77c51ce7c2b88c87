//! STL files, binary and ASCII.
//!
//! # Binary Format
//!
//! ```text
//! UINT8[80]    – Header, holds the object name
//! UINT32       – Number of triangles
//! foreach triangle
//!     REAL32[3] – Normal vector (ignored)
//!     REAL32[3] – Vertex 1
//!     REAL32[3] – Vertex 2
//!     REAL32[3] – Vertex 3
//!     UINT16    – Attribute byte count (ignored)
//! end
//! ```
//!
//! # ASCII Format
//!
//! ```text
//! solid name
//!   facet normal ni nj nk
//!     outer loop
//!       vertex v1x v1y v1z
//!       vertex v2x v2y v2z
//!       vertex v3x v3y v3z
//!     endloop
//!   endfacet
//!   ...
//! endsolid name
//! ```
//!
//! Stored normals are never used; see [`crate::normals`].
use encoding_rs::{Encoding, UTF_8};
use nalgebra::Point3;

use crate::error::{Error, Result};

pub mod read;
pub mod write;

pub use read::{parse_stl, read_stl};
pub use write::{write_binary, write_text};

/// STL binary header size in bytes.
pub const HEADER_SIZE: usize = 80;

/// Size of one triangle record in binary STL.
pub const TRIANGLE_SIZE: usize = 50;

/// Number of leading bytes searched for the ASCII keyword.
pub const DETECT_PREFIX: usize = 256;

/// The two layouts of an STL file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StlFormat {
    Binary,
    Ascii,
}

impl StlFormat {
    /// Decide the layout of raw file bytes.
    ///
    /// A file is ASCII only if `facet normal` occurs near its start; anything
    /// else is treated as binary.
    pub fn detect(data: &[u8]) -> Self {
        let prefix = &data[..data.len().min(DETECT_PREFIX)];
        if prefix.windows(12).any(|w| w == b"facet normal") {
            StlFormat::Ascii
        } else {
            StlFormat::Binary
        }
    }
}

/// Options for reading STL data.
#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    /// Encoding of the object name.
    pub encoding: &'static Encoding,
}

impl ReadOptions {
    /// Options using the encoding with the given label, e.g. `latin1`.
    pub fn with_encoding(label: &str) -> Result<Self> {
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| Error::UnknownEncoding(label.to_string()))?;
        Ok(Self { encoding })
    }
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self { encoding: UTF_8 }
    }
}

/// Contents of an STL file: the object name and a flat vertex stream.
///
/// Every three consecutive vertices form one facet, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stl {
    pub name: String,
    pub vertices: Vec<Point3<f32>>,
}

impl Stl {
    pub fn facet_count(&self) -> usize {
        self.vertices.len() / 3
    }
}
