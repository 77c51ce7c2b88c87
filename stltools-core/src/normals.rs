//! Facet normal reconstruction.
//!
//! Normals stored in STL files are often stale or simply zero, so they are
//! never read. Instead every facet normal is computed from its vertices and
//! the results are deduplicated the same way vertices are.

use nalgebra::{Point3, Vector3};
use tracing::{debug, warn};

use crate::index::indexate;
use crate::vecops;

/// Compute one normal per facet from the positions of its vertices.
///
/// Degenerate facets keep their place in the output with a zero vector, so
/// the result always has one entry per facet.
pub fn facet_normals(facets: &[[usize; 3]], points: &[Point3<f32>]) -> Vec<Vector3<f32>> {
    facets
        .iter()
        .enumerate()
        .map(|(n, &[i, j, k])| {
            let normal = vecops::normal(&points[i], &points[j], &points[k]);
            if vecops::is_zero(&normal) {
                warn!(facet = n, "degenerate facet has no normal");
            }
            normal
        })
        .collect()
}

/// Compute the facet normals and index them.
///
/// Returns the normal index of every facet and the table of unique normals.
pub fn reconstruct(
    facets: &[[usize; 3]],
    points: &[Point3<f32>],
) -> (Vec<usize>, Vec<Vector3<f32>>) {
    let normals = facet_normals(facets, points);
    let (indices, unique) = indexate(&normals);
    debug!(
        facets = facets.len(),
        unique = unique.len(),
        "reconstructed facet normals"
    );
    (indices, unique)
}

/// Calculate a normal for every unique point by averaging the normals of
/// the facets that share it.
///
/// Points that are only used by degenerate facets get the zero vector.
pub fn corner_normals(
    facets: &[[usize; 3]],
    point_count: usize,
    normal_indices: &[usize],
    normals: &[Vector3<f32>],
) -> Vec<Vector3<f32>> {
    let mut sums = vec![Vector3::zeros(); point_count];
    for (facet, &ni) in facets.iter().zip(normal_indices) {
        for &vi in facet {
            sums[vi] += normals[ni];
        }
    }
    sums.iter()
        .map(|s| vecops::normalize(s).unwrap_or(*s))
        .collect()
}
