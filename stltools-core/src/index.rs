//! Deduplication of points and vectors into a unique table plus indices.
//!
//! Values are compared exactly: two coordinates are the same only if they
//! are the same `f32` value. No tolerance is applied, so points that differ
//! in the last bit of a coordinate stay separate vertices. The only folding
//! done is `-0.0` onto `0.0`, which compare equal as numbers.

use std::hash::Hash;

use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashMap;

/// A value that can be deduplicated by exact comparison.
pub trait ExactKey: Clone {
    /// Hashable key with the same equality as the value itself.
    type Key: Hash + Eq;

    fn exact_key(&self) -> Self::Key;
}

fn coord_bits(c: f32) -> u32 {
    if c == 0.0 {
        0
    } else {
        c.to_bits()
    }
}

fn triple_bits(x: f32, y: f32, z: f32) -> [u32; 3] {
    [coord_bits(x), coord_bits(y), coord_bits(z)]
}

impl ExactKey for Point3<f32> {
    type Key = [u32; 3];

    fn exact_key(&self) -> Self::Key {
        triple_bits(self.x, self.y, self.z)
    }
}

impl ExactKey for Vector3<f32> {
    type Key = [u32; 3];

    fn exact_key(&self) -> Self::Key {
        triple_bits(self.x, self.y, self.z)
    }
}

impl ExactKey for [f32; 3] {
    type Key = [u32; 3];

    fn exact_key(&self) -> Self::Key {
        triple_bits(self[0], self[1], self[2])
    }
}

/// Create a table of unique values and indices into that table.
///
/// Ids are handed out in first-seen order, so `unique` is not sorted. For
/// every `i`, `unique[indices[i]]` equals `values[i]`.
///
/// ```
/// use stltools_core::index::indexate;
///
/// let (indices, unique) = indexate(&[[0.0, 1.0, 2.0], [3.0, 4.0, 5.0], [0.0, 1.0, 2.0]]);
/// assert_eq!(indices, vec![0, 1, 0]);
/// assert_eq!(unique.len(), 2);
/// ```
pub fn indexate<T: ExactKey>(values: &[T]) -> (Vec<usize>, Vec<T>) {
    let mut ids: FxHashMap<T::Key, usize> =
        FxHashMap::with_capacity_and_hasher(values.len(), Default::default());
    let mut unique = Vec::new();
    let mut indices = Vec::with_capacity(values.len());

    for value in values {
        let id = *ids.entry(value.exact_key()).or_insert_with(|| {
            unique.push(value.clone());
            unique.len() - 1
        });
        indices.push(id);
    }

    (indices, unique)
}

/// Convert a flat vertex stream into facets of vertex indices.
///
/// Every three consecutive vertices form one facet. Returns the facets and
/// the table of unique points they index into.
pub fn to_indexed(vertices: &[Point3<f32>]) -> (Vec<[usize; 3]>, Vec<Point3<f32>>) {
    let (indices, points) = indexate(vertices);
    let facets = indices
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2]])
        .collect();
    (facets, points)
}
