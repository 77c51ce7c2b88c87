//! Indexed triangle meshes
use nalgebra::{Matrix4, Point3, Vector3};
use tracing::info;

use crate::bbox::BoundingBox;
use crate::index::to_indexed;
use crate::normals;
use crate::stl::Stl;
use crate::transform::Transform;
use crate::vecops;

/// A triangle given by three points, in winding order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Point3<f32>; 3],
}

impl Triangle {
    pub fn new(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// Calculate the facet normal from the triangle's vertices.
    ///
    /// This is the zero vector when the triangle is degenerate.
    pub fn normal(&self) -> Vector3<f32> {
        let [a, b, c] = &self.vertices;
        vecops::normal(a, b, c)
    }

    pub fn is_degenerate(&self) -> bool {
        vecops::is_zero(&self.normal())
    }
}

/// A facet of an indexed mesh: three vertex indices and one normal index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Facet {
    pub vertices: [usize; 3],
    pub normal: usize,
}

/// A triangle mesh with deduplicated vertices and normals.
///
/// Both tables are in first-seen order. Every facet index is valid for the
/// table it points into.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Point3<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub facets: Vec<Facet>,
}

impl Mesh {
    /// Build an indexed mesh from a flat vertex stream, three vertices per
    /// facet.
    ///
    /// Normals are computed from the vertex positions. Degenerate facets are
    /// kept and get the zero vector as their normal.
    pub fn from_vertices(name: impl Into<String>, vertices: &[Point3<f32>]) -> Self {
        debug_assert_eq!(vertices.len() % 3, 0);
        let (ifacets, points) = to_indexed(vertices);
        let (inormals, normals) = normals::reconstruct(&ifacets, &points);
        let facets = ifacets
            .into_iter()
            .zip(inormals)
            .map(|(vertices, normal)| Facet { vertices, normal })
            .collect::<Vec<_>>();
        info!(
            facets = facets.len(),
            vertices = points.len(),
            normals = normals.len(),
            "indexed mesh"
        );
        Self {
            name: name.into(),
            vertices: points,
            normals,
            facets,
        }
    }

    pub fn len(&self) -> usize {
        self.facets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    pub fn triangle(&self, facet: &Facet) -> Triangle {
        let [i, j, k] = facet.vertices;
        Triangle::new(self.vertices[i], self.vertices[j], self.vertices[k])
    }

    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.facets.iter().map(move |f| self.triangle(f))
    }

    pub fn normal(&self, facet: &Facet) -> Vector3<f32> {
        self.normals[facet.normal]
    }

    /// The vertex indices of every facet.
    pub fn vertex_indices(&self) -> Vec<[usize; 3]> {
        self.facets.iter().map(|f| f.vertices).collect()
    }

    /// The normal index of every facet.
    pub fn normal_indices(&self) -> Vec<usize> {
        self.facets.iter().map(|f| f.normal).collect()
    }

    /// Expand the mesh back into a flat vertex stream.
    pub fn flat_vertices(&self) -> Vec<Point3<f32>> {
        self.triangles().flat_map(|t| t.vertices).collect()
    }

    /// Indices of the facets whose normal is the zero vector.
    pub fn degenerate_facets(&self) -> Vec<usize> {
        self.facets
            .iter()
            .enumerate()
            .filter(|(_, f)| vecops::is_zero(&self.normals[f.normal]))
            .map(|(n, _)| n)
            .collect()
    }

    /// Per-vertex normals, averaged over the facets sharing each vertex.
    pub fn corner_normals(&self) -> Vec<Vector3<f32>> {
        normals::corner_normals(
            &self.vertex_indices(),
            self.vertices.len(),
            &self.normal_indices(),
            &self.normals,
        )
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.vertices)
    }

    /// Average of all facet corners, counting shared vertices once per use.
    pub fn mean_point(&self) -> Option<Point3<f32>> {
        if self.facets.is_empty() {
            return None;
        }
        let sum = self
            .facets
            .iter()
            .flat_map(|f| f.vertices)
            .fold(Vector3::zeros(), |acc, i| acc + self.vertices[i].coords);
        Some(Point3::from(sum / (3 * self.facets.len()) as f32))
    }

    /// Apply a transformation to the vertices and recompute the normals.
    ///
    /// A mirroring transformation reverses the winding of every facet, so
    /// the normals keep pointing outward.
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> Self {
        let vertices = Transform::apply_points(matrix, &self.vertices);
        let mirrored = matrix.fixed_view::<3, 3>(0, 0).determinant() < 0.0;
        let ifacets: Vec<[usize; 3]> = self
            .facets
            .iter()
            .map(|f| {
                let [a, b, c] = f.vertices;
                if mirrored {
                    [a, c, b]
                } else {
                    [a, b, c]
                }
            })
            .collect();
        let (inormals, normals) = normals::reconstruct(&ifacets, &vertices);
        let facets = ifacets
            .into_iter()
            .zip(inormals)
            .map(|(vertices, normal)| Facet { vertices, normal })
            .collect();
        Self {
            name: self.name.clone(),
            vertices,
            normals,
            facets,
        }
    }
}

impl From<Stl> for Mesh {
    fn from(stl: Stl) -> Self {
        Self::from_vertices(stl.name, &stl.vertices)
    }
}

const CUBE_CORNERS: [[f32; 3]; 8] = [
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 0.0, 0.0],
    [0.0, 0.0, 0.0],
    [0.0, 1.0, 1.0],
    [1.0, 1.0, 1.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
];

const CUBE_FACETS: [[usize; 3]; 12] = [
    [0, 1, 4],
    [1, 5, 4],
    [0, 2, 1],
    [0, 3, 2],
    [4, 5, 6],
    [4, 6, 7],
    [3, 7, 2],
    [7, 6, 2],
    [1, 2, 5],
    [5, 2, 6],
    [0, 4, 3],
    [3, 4, 7],
];

/// Flat vertex stream of an axis aligned cube with one corner in the
/// origin, two outward facing facets per side.
pub fn cube_vertices(size: f32) -> Vec<Point3<f32>> {
    CUBE_FACETS
        .iter()
        .flatten()
        .map(|&i| {
            let [x, y, z] = CUBE_CORNERS[i];
            Point3::new(x * size, y * size, z * size)
        })
        .collect()
}
