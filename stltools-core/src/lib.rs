//! stltools core library - reading, indexing and rendering STL models
//!
//! An STL file is a flat list of triangles. This crate reads it into an
//! indexed [`Mesh`] with deduplicated vertices and normals recomputed from the
//! geometry, and writes that mesh back out as STL, as a POV-Ray declaration,
//! or as a flat shaded 2D view in PostScript or PDF.

pub mod bbox;
pub mod color;
pub mod error;
pub mod geometry;
pub mod index;
pub mod normals;
pub mod pdf;
pub mod pov;
pub mod projection;
pub mod ps;
pub mod stl;
pub mod transform;
pub mod vecops;

// Re-export commonly used types
pub use bbox::BoundingBox;
pub use color::Rgb;
pub use error::{Error, Result};
pub use geometry::{Facet, Mesh, Triangle};
pub use index::{indexate, to_indexed};
pub use pdf::PdfOptions;
pub use projection::{project, ProjectedFacet, Projection, ViewOptions};
pub use ps::PsOptions;
pub use stl::{ReadOptions, Stl, StlFormat};
pub use transform::{compose, Axis, Operation, Transform};
