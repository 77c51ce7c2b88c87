//! Encapsulated PostScript output of a projected mesh.
use std::io::{self, Write};

use crate::bbox::BoundingBox;
use crate::color::Rgb;
use crate::projection::Projection;

/// PostScript points per millimeter.
const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// Colors of an EPS drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PsOptions {
    pub foreground: Rgb,
    /// Only filled when it is not white.
    pub background: Rgb,
}

impl Default for PsOptions {
    fn default() -> Self {
        Self {
            foreground: Rgb::LIGHT_GRAY,
            background: Rgb::WHITE,
        }
    }
}

/// Write the visible facets of `projection` as an EPSF-3.0 file.
///
/// `model` is the bounding box of the mesh in STL units; it only appears in
/// the comments.
pub fn write_ps<W: Write>(
    w: &mut W,
    projection: &Projection,
    model: &BoundingBox,
    options: &PsOptions,
) -> io::Result<()> {
    let (maxx, maxy) = (projection.bounds.max.x, projection.bounds.max.y);

    writeln!(w, "%!PS-Adobe-3.0 EPSF-3.0")?;
    writeln!(w, "%%BoundingBox: 0 0 {maxx:.0} {maxy:.0}")?;
    writeln!(w, "%%EndComments")?;
    writeln!(w, "% Generated by stltools {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(w, "% Bounding box (STL units)")?;
    for (axis, lo, hi) in [
        ("x", model.min.x, model.max.x),
        ("y", model.min.y, model.max.y),
        ("z", model.min.z, model.max.z),
    ] {
        writeln!(w, "%   {lo:.2} ≤ {axis} ≤ {hi:.2}")?;
    }
    writeln!(
        w,
        "% The scale factor used is: {:.2} PostScript points/STL-unit",
        projection.scale
    )?;
    writeln!(
        w,
        "% This becomes a picture of {:.0}×{:.0} PostScript points; {:.0}×{:.0} mm.",
        maxx,
        maxy,
        maxx / POINTS_PER_MM,
        maxy / POINTS_PER_MM
    )?;
    writeln!(
        w,
        "% {} of {} facets are visible.",
        projection.facets.len(),
        projection.total
    )?;

    writeln!(w, "% Settings")?;
    writeln!(w, ".5 setlinewidth")?;
    writeln!(w, "1 setlinejoin")?;
    writeln!(w, "% Defining drawing commands")?;
    writeln!(w, "/c {{setrgbcolor}} def")?;
    writeln!(w, "/f {{moveto}} def")?;
    writeln!(w, "/s {{lineto}} def")?;
    writeln!(w, "/t {{lineto closepath gsave fill grestore stroke}} def")?;
    writeln!(w, "% Start drawing")?;

    let bg = options.background;
    if !bg.is_white() {
        writeln!(w, "% Fill background")?;
        writeln!(w, "{:4.2} {:4.2} {:4.2} c", bg.r, bg.g, bg.b)?;
        writeln!(w, "0 0 f")?;
        writeln!(w, "{maxx:.0} 0 s")?;
        writeln!(w, "{maxx:.0} {maxy:.0} s")?;
        writeln!(w, "0 {maxy:.0} t")?;
    }

    writeln!(w, "% Rendering triangles")?;
    for facet in &projection.facets {
        let color = options.foreground.shade(facet.intensity);
        let [a, b, c] = facet.points;
        writeln!(
            w,
            "{:4.2} {:4.2} {:4.2} c {:.3} {:.3} f {:.3} {:.3} s {:.3} {:.3} t",
            color.r, color.g, color.b, a.x, a.y, b.x, b.y, c.x, c.y
        )?;
    }
    writeln!(w, "showpage")?;
    writeln!(w, "%%EOF")
}
