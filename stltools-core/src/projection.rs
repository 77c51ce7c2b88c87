//! Orthographic projection of a mesh onto a 2D canvas
//!
//! The viewer looks down the negative Z axis, so +Z points towards the
//! viewer. Facets are culled by the sign of their normal and ordered back to
//! front for a painter's algorithm; there is no depth buffer.
use nalgebra::{Matrix4, Point2, Vector3};
use tracing::{debug, info};

use crate::bbox::BoundingBox;
use crate::error::{Error, Result};
use crate::geometry::Mesh;
use crate::transform::Transform;

/// Canvas configuration for 2D output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewOptions {
    /// Width and height of the square canvas.
    pub canvas: f32,
    /// Use a canvas whose Y axis points down.
    pub flip_y: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            canvas: 200.0,
            flip_y: false,
        }
    }
}

/// A facet projected onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedFacet {
    pub points: [Point2<f32>; 3],
    /// Z coordinates of the corners before projection.
    pub depths: [f32; 3],
    /// Brightness in the range 0.1 to 0.9.
    pub intensity: f32,
}

impl ProjectedFacet {
    /// Sort key: the Z coordinate of the corner nearest to the viewer.
    pub fn depth(&self) -> f32 {
        self.depths[0].max(self.depths[1]).max(self.depths[2])
    }
}

/// A mesh rendered to draw commands.
#[derive(Debug, Clone)]
pub struct Projection {
    /// Visible facets, farthest first.
    pub facets: Vec<ProjectedFacet>,
    /// Number of facets in the mesh.
    pub total: usize,
    /// Canvas units per model unit.
    pub scale: f32,
    /// Model to canvas transformation.
    pub view: Matrix4<f32>,
    /// Extents of the transformed mesh on the canvas.
    pub bounds: BoundingBox,
    pub options: ViewOptions,
}

/// Only facets facing the viewer are drawn; edge-on facets are not.
pub fn is_visible(normal: &Vector3<f32>) -> bool {
    normal.z > 0.0
}

/// Flat shading from a light along the view direction.
pub fn intensity(normal: &Vector3<f32>) -> f32 {
    0.4 * normal.z + 0.5
}

/// Order facets back to front. Facets of equal depth keep their order.
pub fn depth_sort(facets: &mut [ProjectedFacet]) {
    facets.sort_by(|a, b| a.depth().total_cmp(&b.depth()))
}

/// Build the matrix that centers `bb` on the canvas and scales it to fit.
///
/// Z is shifted so the front of the model lies at z=0. Returns the matrix and
/// the scale factor.
pub fn view_matrix(bb: &BoundingBox, options: &ViewOptions) -> Result<(Matrix4<f32>, f32)> {
    let size = bb.size();
    if size.x <= 0.0 || size.y <= 0.0 {
        return Err(Error::domain(format!(
            "cannot scale a view of {} × {} units to the canvas",
            size.x, size.y
        )));
    }
    let center = bb.center();
    let shift = Transform::translation(&Vector3::new(-center.x, -center.y, -bb.max.z));

    let scale = (options.canvas / size.x).min(options.canvas / size.y);
    let sy = if options.flip_y { -scale } else { scale };
    let half = options.canvas / 2.0;
    let fit = Transform::concat(&[
        Transform::scale_matrix(scale, sy, 1.0),
        Transform::translation(&Vector3::new(half, half, 0.0)),
    ]);

    Ok((Transform::concat(&[shift, fit]), scale))
}

/// Project a mesh onto the canvas.
///
/// The mesh should already be rotated into view. Returns the visible facets
/// in drawing order.
pub fn project(mesh: &Mesh, options: &ViewOptions) -> Result<Projection> {
    let bb = mesh
        .bounding_box()
        .ok_or_else(|| Error::domain("cannot project an empty mesh"))?;
    let (view, scale) = view_matrix(&bb, options)?;
    debug!(scale, "made model-view matrix");

    let points = Transform::apply_points(&view, &mesh.vertices);
    let bounds = BoundingBox::from_points(&points)
        .ok_or_else(|| Error::domain("cannot project an empty mesh"))?;

    let mut facets: Vec<ProjectedFacet> = mesh
        .facets
        .iter()
        .filter(|f| is_visible(&mesh.normal(f)))
        .map(|f| {
            let [a, b, c] = f.vertices.map(|i| points[i]);
            ProjectedFacet {
                points: [a.xy(), b.xy(), c.xy()],
                depths: [a.z, b.z, c.z],
                intensity: intensity(&mesh.normal(f)),
            }
        })
        .collect();

    if !mesh.is_empty() {
        info!(
            "{:.2}% of facets is visible",
            100.0 * facets.len() as f32 / mesh.len() as f32
        );
    }
    depth_sort(&mut facets);

    Ok(Projection {
        facets,
        total: mesh.len(),
        scale,
        view,
        bounds,
        options: *options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::cube_vertices;
    use nalgebra::Point3;

    fn facet_at(depth: f32) -> ProjectedFacet {
        ProjectedFacet {
            points: [Point2::origin(); 3],
            depths: [depth - 1.0, depth, depth - 2.0],
            intensity: 0.5,
        }
    }

    #[test]
    fn test_visibility() {
        assert!(is_visible(&Vector3::new(0.0, 0.0, 1.0)));
        assert!(!is_visible(&Vector3::new(0.0, 0.0, -1.0)));
        assert!(!is_visible(&Vector3::new(0.0, 0.0, 0.0)));
        assert!(!is_visible(&Vector3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_intensity_range() {
        assert!((intensity(&Vector3::z()) - 0.9).abs() < 1e-6);
        assert!((intensity(&-Vector3::z()) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_depth_sort() {
        let mut facets = vec![facet_at(1.0), facet_at(5.0), facet_at(3.0)];
        depth_sort(&mut facets);
        let depths: Vec<f32> = facets.iter().map(ProjectedFacet::depth).collect();
        assert_eq!(depths, vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_depth_sort_is_stable() {
        let mut facets: Vec<_> = (0..5)
            .map(|i| ProjectedFacet {
                intensity: i as f32,
                ..facet_at(2.0)
            })
            .collect();
        facets.push(facet_at(1.0));
        depth_sort(&mut facets);
        let order: Vec<f32> = facets.iter().map(|f| f.intensity).collect();
        assert_eq!(order, vec![0.5, 0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_project_cube() {
        let mesh = Mesh::from_vertices("cube", &cube_vertices(2.0));
        let projection = project(&mesh, &ViewOptions::default()).unwrap();
        assert_eq!(projection.total, 12);
        // Only the top of the cube faces the viewer.
        assert_eq!(projection.facets.len(), 2);
        assert!((projection.scale - 100.0).abs() < 1e-4);
        for facet in &projection.facets {
            assert!((facet.intensity - 0.9).abs() < 1e-6);
            assert!(facet.depth().abs() < 1e-6);
            for p in &facet.points {
                assert!(p.x >= -1e-3 && p.x <= 200.001);
                assert!(p.y >= -1e-3 && p.y <= 200.001);
            }
        }
    }

    #[test]
    fn test_flip_y() {
        let mesh = Mesh::from_vertices("cube", &cube_vertices(1.0));
        let up = project(&mesh, &ViewOptions::default()).unwrap();
        let down = project(
            &mesh,
            &ViewOptions {
                flip_y: true,
                ..ViewOptions::default()
            },
        )
        .unwrap();
        let a = Transform::apply_points(&up.view, &[Point3::new(0.0, 0.0, 0.0)]);
        let b = Transform::apply_points(&down.view, &[Point3::new(0.0, 0.0, 0.0)]);
        assert!((a[0].y - 0.0).abs() < 1e-4);
        assert!((b[0].y - 200.0).abs() < 1e-4);
    }

    #[test]
    fn test_flat_view_is_a_domain_error() {
        let line = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let mesh = Mesh::from_vertices("line", &line);
        assert!(matches!(
            project(&mesh, &ViewOptions::default()),
            Err(Error::Domain(_))
        ));
        assert!(matches!(
            project(&Mesh::default(), &ViewOptions::default()),
            Err(Error::Domain(_))
        ));
    }
}
