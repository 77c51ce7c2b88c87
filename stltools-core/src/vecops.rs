//! Operations on three dimensional points and vectors.
use nalgebra::{Point3, Vector3};

/// Difference `a - b` of two points as a vector.
pub fn sub(a: &Point3<f32>, b: &Point3<f32>) -> Vector3<f32> {
    a - b
}

pub fn cross(u: &Vector3<f32>, v: &Vector3<f32>) -> Vector3<f32> {
    u.cross(v)
}

pub fn dot(u: &Vector3<f32>, v: &Vector3<f32>) -> f32 {
    u.dot(v)
}

pub fn length(v: &Vector3<f32>) -> f32 {
    v.norm()
}

/// Scale a vector to length 1.
///
/// Returns `None` for a vector of length zero.
pub fn normalize(v: &Vector3<f32>) -> Option<Vector3<f32>> {
    let len = length(v);
    if len == 0.0 {
        None
    } else {
        Some(v / len)
    }
}

/// Normal vector of the facet `a → b → c`.
///
/// The normal is `(b - a) × (c - b)`, scaled to unit length. For a degenerate
/// facet (collinear or coincident vertices) the cross product has length zero
/// and the zero vector is returned unchanged.
pub fn normal(a: &Point3<f32>, b: &Point3<f32>, c: &Point3<f32>) -> Vector3<f32> {
    let n = cross(&sub(b, a), &sub(c, b));
    normalize(&n).unwrap_or(n)
}

/// A vector is degenerate when all of its components are zero.
pub fn is_zero(v: &Vector3<f32>) -> bool {
    v.x == 0.0 && v.y == 0.0 && v.z == 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32, z: f32) -> Point3<f32> {
        Point3::new(x, y, z)
    }

    #[test]
    fn test_length() {
        assert_eq!(length(&Vector3::zeros()), 0.0);
        assert_eq!(length(&Vector3::x()), 1.0);
        assert_eq!(length(&Vector3::new(20.0, 5.0, 4.0)), 21.0);
    }

    #[test]
    fn test_normalize() {
        let v = Vector3::new(20.0, 5.0, 4.0);
        let n = normalize(&v).unwrap();
        assert!((length(&n) - 1.0).abs() < 1e-6);
        assert!(normalize(&Vector3::zeros()).is_none());
    }

    #[test]
    fn test_normal_right_hand_rule() {
        let n = normal(&p(0.0, 0.0, 0.0), &p(1.0, 0.0, 0.0), &p(0.0, 1.0, 0.0));
        assert_eq!(n, Vector3::new(0.0, 0.0, 1.0));
        let n = normal(&p(0.0, 0.0, 0.0), &p(0.0, 0.0, 1.0), &p(1.0, 0.0, 0.0));
        assert_eq!(n, Vector3::new(0.0, 1.0, 0.0));
        let n = normal(&p(0.0, 0.0, 0.0), &p(0.0, 1.0, 0.0), &p(0.0, 0.0, 1.0));
        assert_eq!(n, Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_normal_flips_with_winding() {
        let n = normal(&p(0.0, 0.0, 0.0), &p(0.0, 1.0, 0.0), &p(1.0, 0.0, 0.0));
        assert_eq!(n, Vector3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_normal_of_unit_points() {
        let n = normal(&p(1.0, 0.0, 0.0), &p(0.0, 1.0, 0.0), &p(0.0, 0.0, 1.0));
        let c = 1.0 / 3.0f32.sqrt();
        assert!((n - Vector3::new(c, c, c)).norm() < 1e-6);
    }

    #[test]
    fn test_collinear_points_are_degenerate() {
        let n = normal(&p(0.0, 0.0, 0.0), &p(1.0, 0.0, 0.0), &p(2.0, 0.0, 0.0));
        assert_eq!(length(&n), 0.0);
        assert!(is_zero(&n));
    }

    #[test]
    fn test_dot_and_cross() {
        let x = Vector3::x();
        let y = Vector3::y();
        assert_eq!(dot(&x, &y), 0.0);
        assert_eq!(cross(&x, &y), Vector3::z());
    }
}
