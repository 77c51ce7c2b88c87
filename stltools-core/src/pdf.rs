//! Single page PDF output of a projected mesh
use std::io::Write;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use nalgebra::{Matrix4, Point2, Point3};
use tracing::debug;

use crate::color::Rgb;
use crate::error::{Error, Result};
use crate::projection::Projection;
use crate::transform::Transform;

const LINE_WIDTH: f32 = 0.25;

/// Round caps and joins.
const ROUND: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfOptions {
    pub foreground: Rgb,
    /// Draw the model's coordinate axes.
    pub axes: bool,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            foreground: Rgb::LIGHT_GRAY,
            axes: false,
        }
    }
}

fn real(v: f32) -> Object {
    Object::Real(v.into())
}

fn rgb(operator: &str, color: Rgb) -> Operation {
    Operation::new(operator, vec![real(color.r), real(color.g), real(color.b)])
}

fn point(operator: &str, p: &Point2<f32>) -> Operation {
    Operation::new(operator, vec![real(p.x), real(p.y)])
}

/// Origin and axis end points of the model coordinate system on the canvas.
///
/// The axes are a tenth of the canvas size long, measured in model units,
/// and follow the same `rotation` as the mesh.
pub fn axes(rotation: &Matrix4<f32>, projection: &Projection) -> [Point2<f32>; 4] {
    let length = projection.options.canvas / 10.0;
    let csys = [
        Point3::origin(),
        Point3::new(length, 0.0, 0.0),
        Point3::new(0.0, length, 0.0),
        Point3::new(0.0, 0.0, length),
    ];
    let m = Transform::concat(&[*rotation, projection.view]);
    let p = Transform::apply_points(&m, &csys);
    [p[0].xy(), p[1].xy(), p[2].xy(), p[3].xy()]
}

fn page_content(
    projection: &Projection,
    axes: Option<[Point2<f32>; 4]>,
    options: &PdfOptions,
) -> Vec<Operation> {
    let canvas = projection.options.canvas;
    let mut ops = Vec::with_capacity(6 * projection.facets.len() + 16);
    if projection.options.flip_y {
        // The projection uses a Y-down canvas.
        ops.push(Operation::new(
            "cm",
            vec![
                Object::Integer(1),
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(-1),
                Object::Integer(0),
                real(canvas),
            ],
        ));
    }
    ops.push(Operation::new("w", vec![real(LINE_WIDTH)]));
    ops.push(Operation::new("J", vec![Object::Integer(ROUND)]));
    ops.push(Operation::new("j", vec![Object::Integer(ROUND)]));

    for facet in &projection.facets {
        let color = options.foreground.shade(facet.intensity);
        let [a, b, c] = &facet.points;
        ops.push(rgb("rg", color));
        ops.push(rgb("RG", color));
        ops.push(point("m", a));
        ops.push(point("l", b));
        ops.push(point("l", c));
        ops.push(Operation::new("h", vec![]));
        ops.push(Operation::new("B", vec![]));
    }

    if let Some([origin, x, y, z]) = axes {
        let colors = [
            Rgb::new(1.0, 0.0, 0.0),
            Rgb::new(0.0, 1.0, 0.0),
            Rgb::new(0.0, 0.0, 1.0),
        ];
        for (end, color) in [x, y, z].iter().zip(colors) {
            ops.push(rgb("RG", color));
            ops.push(point("m", &origin));
            ops.push(point("l", end));
            ops.push(Operation::new("S", vec![]));
        }
    }
    ops
}

/// Write the visible facets of `projection` as a one page PDF document.
///
/// `rotation` is the transformation that was applied to the mesh before
/// projection; it is only used to draw the axes.
pub fn write_pdf<W: Write>(
    w: &mut W,
    projection: &Projection,
    rotation: &Matrix4<f32>,
    options: &PdfOptions,
) -> Result<()> {
    let canvas = projection.options.canvas;
    let csys = options.axes.then(|| axes(rotation, projection));
    let content = Content {
        operations: page_content(projection, csys, options),
    };
    let data = content.encode().map_err(|e| Error::Pdf(e.to_string()))?;
    debug!(bytes = data.len(), "encoded page content");

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Stream::new(dictionary! {}, data));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![Object::Reference(page_id)],
        "Count" => Object::Integer(1),
        "MediaBox" => vec![Object::Integer(0), Object::Integer(0), real(canvas), real(canvas)],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc.save_to(w).map_err(|e| Error::Pdf(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{cube_vertices, Mesh};
    use crate::projection::{project, ViewOptions};

    fn render(options: &PdfOptions) -> Vec<u8> {
        let mesh = Mesh::from_vertices("cube", &cube_vertices(1.0));
        let view = ViewOptions {
            flip_y: true,
            ..ViewOptions::default()
        };
        let projection = project(&mesh, &view).unwrap();
        let mut buf = Vec::new();
        write_pdf(&mut buf, &projection, &Transform::identity(), options).unwrap();
        buf
    }

    fn operators(pdf: &[u8]) -> Vec<String> {
        let doc = Document::load_mem(pdf).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        let page_id = *pages.values().next().unwrap();
        let data = doc.get_page_content(page_id).unwrap();
        Content::decode(&data)
            .unwrap()
            .operations
            .into_iter()
            .map(|op| op.operator)
            .collect()
    }

    #[test]
    fn test_pdf_page() {
        let pdf = render(&PdfOptions::default());
        assert!(pdf.starts_with(b"%PDF-1.5"));
        let ops = operators(&pdf);
        assert_eq!(ops[0], "cm");
        assert_eq!(ops.iter().filter(|op| *op == "B").count(), 2);
        assert!(!ops.iter().any(|op| op == "S"));
    }

    #[test]
    fn test_pdf_axes() {
        let options = PdfOptions {
            axes: true,
            ..PdfOptions::default()
        };
        let ops = operators(&render(&options));
        assert_eq!(ops.iter().filter(|op| *op == "S").count(), 3);
    }

    #[test]
    fn test_axes_follow_the_view() {
        let mesh = Mesh::from_vertices("cube", &cube_vertices(1.0));
        let projection = project(&mesh, &ViewOptions::default()).unwrap();
        let [origin, x, y, _z] = axes(&Transform::identity(), &projection);
        // The cube spans the canvas, so the model origin is its corner.
        assert!(origin.x.abs() < 1e-3 && origin.y.abs() < 1e-3);
        assert!(x.x > origin.x && (x.y - origin.y).abs() < 1e-3);
        assert!(y.y > origin.y && (y.x - origin.x).abs() < 1e-3);
    }
}
