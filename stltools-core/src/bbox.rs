//! Axis aligned bounding boxes
use nalgebra::{Point3, Vector3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl BoundingBox {
    /// Find the bounding box of a set of points, `None` if there are none.
    pub fn from_points(points: &[Point3<f32>]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        Some(rest.iter().fold(
            Self {
                min: *first,
                max: *first,
            },
            |bb, p| Self {
                min: bb.min.inf(p),
                max: bb.max.sup(p),
            },
        ))
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Test if a point lies inside the box or on its boundary.
    pub fn contains(&self, p: &Point3<f32>) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] && p[i] <= self.max[i])
    }
}
