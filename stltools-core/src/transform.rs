//! 4×4 homogeneous transformation matrices
//!
//! Matrices are applied to column vectors, `M × p`. Composing transforms with
//! [`Transform::concat`] takes them in the order they are applied: the
//! result of `concat(&[a, b])` is `b × a`, so `a` acts first.
use nalgebra::{Matrix4, Point3, Unit, Vector3, Vector4};

use crate::error::{Error, Result};

/// A coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// A single step of a model transformation, angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    Rotate(Axis, f32),
    RotateAxis(Vector3<f32>, f32),
    Translate(Vector3<f32>),
    Scale(f32, f32, f32),
}

impl Operation {
    pub fn matrix(&self) -> Result<Matrix4<f32>> {
        Ok(match *self {
            Operation::Rotate(Axis::X, deg) => Transform::rotation_x(deg),
            Operation::Rotate(Axis::Y, deg) => Transform::rotation_y(deg),
            Operation::Rotate(Axis::Z, deg) => Transform::rotation_z(deg),
            Operation::RotateAxis(axis, deg) => Transform::rotation_axis(&axis, deg)?,
            Operation::Translate(v) => Transform::translation(&v),
            Operation::Scale(x, y, z) => Transform::scale_matrix(x, y, z),
        })
    }
}

/// Compose a list of operations into one matrix, first operation applied
/// first. An empty list gives the identity.
pub fn compose(operations: &[Operation]) -> Result<Matrix4<f32>> {
    let matrices = operations
        .iter()
        .map(Operation::matrix)
        .collect::<Result<Vec<_>>>()?;
    Ok(Transform::concat(&matrices))
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    pub fn identity() -> Matrix4<f32> {
        Matrix4::identity()
    }

    /// Create a translation matrix
    pub fn translation(v: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(v)
    }

    /// Rotation around the X axis, angle in degrees.
    pub fn rotation_x(degrees: f32) -> Matrix4<f32> {
        let (s, c) = degrees.to_radians().sin_cos();
        Matrix4::new(
            1.0, 0.0, 0.0, 0.0, //
            0.0, c, -s, 0.0, //
            0.0, s, c, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Rotation around the Y axis, angle in degrees.
    pub fn rotation_y(degrees: f32) -> Matrix4<f32> {
        let (s, c) = degrees.to_radians().sin_cos();
        Matrix4::new(
            c, 0.0, s, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            -s, 0.0, c, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Rotation around the Z axis, angle in degrees.
    pub fn rotation_z(degrees: f32) -> Matrix4<f32> {
        let (s, c) = degrees.to_radians().sin_cos();
        Matrix4::new(
            c, -s, 0.0, 0.0, //
            s, c, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Rotation through the origin around an arbitrary axis (Rodrigues'
    /// formula), angle in degrees.
    ///
    /// Fails if the axis has length zero.
    pub fn rotation_axis(axis: &Vector3<f32>, degrees: f32) -> Result<Matrix4<f32>> {
        let axis = Unit::try_new(*axis, 0.0)
            .ok_or_else(|| Error::domain("rotation axis cannot have length 0"))?;
        Ok(Matrix4::from_axis_angle(&axis, degrees.to_radians()))
    }

    /// Create a scale matrix
    pub fn scale_matrix(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
    }

    /// Viewing matrix for an eye at `eye` looking at `center`.
    pub fn look_at(eye: &Point3<f32>, center: &Point3<f32>, up: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::look_at_rh(eye, center, up)
    }

    /// Orthographic projection on the z=0 plane, scaling x and y.
    pub fn orthographic(xy_scale: f32) -> Matrix4<f32> {
        let mut m = Matrix4::identity();
        m[(0, 0)] = xy_scale;
        m[(1, 1)] = xy_scale;
        m[(2, 2)] = 0.0;
        m
    }

    /// Perspective projection, vertical field of view in degrees.
    pub fn perspective(fovy: f32, width: f32, height: f32, near: f32, far: f32) -> Matrix4<f32> {
        Matrix4::new_perspective(width / height, fovy.to_radians(), near, far)
    }

    /// Concatenate transforms, the first one in the slice is applied first.
    pub fn concat(matrices: &[Matrix4<f32>]) -> Matrix4<f32> {
        matrices
            .iter()
            .fold(Matrix4::identity(), |acc, m| m * acc)
    }

    /// Transform points using homogeneous coordinates with w=1.
    ///
    /// The result is divided by w only when the transform changed it.
    pub fn apply_points(m: &Matrix4<f32>, points: &[Point3<f32>]) -> Vec<Point3<f32>> {
        points
            .iter()
            .map(|p| {
                let h = m * p.to_homogeneous();
                if h.w == 1.0 {
                    Point3::new(h.x, h.y, h.z)
                } else {
                    Point3::new(h.x / h.w, h.y / h.w, h.z / h.w)
                }
            })
            .collect()
    }

    /// Transform direction vectors (w=0) and scale them back to unit length.
    ///
    /// Zero vectors stay zero. Surface normals only stay perpendicular under
    /// rotations and uniform scaling.
    pub fn apply_vectors(m: &Matrix4<f32>, vectors: &[Vector3<f32>]) -> Vec<Vector3<f32>> {
        vectors
            .iter()
            .map(|v| {
                let h = m * Vector4::new(v.x, v.y, v.z, 0.0);
                let d = h.xyz();
                let len = d.norm();
                if len == 0.0 {
                    d
                } else {
                    d / len
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points() -> Vec<Point3<f32>> {
        vec![
            Point3::new(0.0, 1.0, 2.0),
            Point3::new(3.0, 4.0, 5.0),
            Point3::new(6.0, 7.0, 8.0),
            Point3::new(9.0, 10.0, 11.0),
            Point3::new(12.0, 13.0, 14.0),
        ]
    }

    fn close(a: &[Point3<f32>], b: &[Point3<f32>], tol: f32) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(p, q)| (p - q).norm() < tol)
    }

    #[test]
    fn test_scale() {
        let m = Transform::scale_matrix(0.5, 0.5, 0.5);
        let r = Transform::apply_points(&m, &points());
        for (p, q) in r.iter().zip(points()) {
            assert_eq!(p.coords * 2.0, q.coords);
        }
    }

    #[test]
    fn test_translation() {
        let m = Transform::translation(&Vector3::new(2.0, 3.0, 4.0));
        let r = Transform::apply_points(&m, &points());
        for (p, q) in r.iter().zip(points()) {
            assert_eq!(p - q, Vector3::new(2.0, 3.0, 4.0));
        }
    }

    #[test]
    fn test_rotation_x_three_times() {
        let m = Transform::rotation_x(120.0);
        let p = points();
        let r = Transform::apply_points(&m, &p);
        let s = Transform::apply_points(&m, &r);
        let t = Transform::apply_points(&m, &s);
        assert!(close(&t, &p, 1e-3));
    }

    #[test]
    fn test_rotation_z_four_quarter_turns() {
        let q = Transform::rotation_z(90.0);
        let m = Transform::concat(&[q, q, q, q]);
        assert!(close(&Transform::apply_points(&m, &points()), &points(), 1e-4));
        let full = Transform::rotation_z(360.0);
        assert!(close(&Transform::apply_points(&full, &points()), &points(), 1e-4));
    }

    #[test]
    fn test_rotation_direction() {
        let r = Transform::apply_points(&Transform::rotation_z(90.0), &[Point3::new(1.0, 0.0, 0.0)]);
        assert!((r[0] - Point3::new(0.0, 1.0, 0.0)).norm() < 1e-6);
        let r = Transform::apply_points(&Transform::rotation_x(90.0), &[Point3::new(0.0, 1.0, 0.0)]);
        assert!((r[0] - Point3::new(0.0, 0.0, 1.0)).norm() < 1e-6);
        let r = Transform::apply_points(&Transform::rotation_y(90.0), &[Point3::new(0.0, 0.0, 1.0)]);
        assert!((r[0] - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_rotation_axis_matches_principal_axes() {
        let m = Transform::rotation_axis(&Vector3::new(0.0, 0.0, 2.0), 37.0).unwrap();
        assert!((m - Transform::rotation_z(37.0)).norm() < 1e-6);
        let m = Transform::rotation_axis(&Vector3::x(), -20.0).unwrap();
        assert!((m - Transform::rotation_x(-20.0)).norm() < 1e-6);
    }

    #[test]
    fn test_rotation_axis_zero_length() {
        let result = Transform::rotation_axis(&Vector3::zeros(), 45.0);
        assert!(matches!(result, Err(Error::Domain(_))));
    }

    #[test]
    fn test_concat_order() {
        // Translate first, then rotate: (1,0,0) -> (2,0,0) -> (0,2,0)
        let t = Transform::translation(&Vector3::new(1.0, 0.0, 0.0));
        let r = Transform::rotation_z(90.0);
        let m = Transform::concat(&[t, r]);
        let p = Transform::apply_points(&m, &[Point3::new(1.0, 0.0, 0.0)]);
        assert!((p[0] - Point3::new(0.0, 2.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_compose_operations() {
        let ops = [
            Operation::Translate(Vector3::new(1.0, 0.0, 0.0)),
            Operation::Rotate(Axis::Z, 90.0),
            Operation::Scale(2.0, 2.0, 2.0),
        ];
        let m = compose(&ops).unwrap();
        let p = Transform::apply_points(&m, &[Point3::new(1.0, 0.0, 0.0)]);
        assert!((p[0] - Point3::new(0.0, 4.0, 0.0)).norm() < 1e-5);
        assert_eq!(compose(&[]).unwrap(), Transform::identity());
        assert!(compose(&[Operation::RotateAxis(Vector3::zeros(), 10.0)]).is_err());
    }

    #[test]
    fn test_identity() {
        let m = compose(&[]).unwrap();
        assert!((m - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_orthographic_flattens_z() {
        let m = Transform::orthographic(2.0);
        let p = Transform::apply_points(&m, &[Point3::new(1.0, 2.0, 3.0)]);
        assert_eq!(p[0], Point3::new(2.0, 4.0, 0.0));
    }

    #[test]
    fn test_perspective_divides_by_w() {
        let m = Transform::perspective(90.0, 100.0, 100.0, 1.0, 10.0);
        let near = Transform::apply_points(&m, &[Point3::new(0.0, 0.0, -1.0)]);
        let far = Transform::apply_points(&m, &[Point3::new(0.0, 0.0, -10.0)]);
        assert!((near[0].z + 1.0).abs() < 1e-5);
        assert!((far[0].z - 1.0).abs() < 1e-5);
        let edge = Transform::apply_points(&m, &[Point3::new(2.0, 0.0, -2.0)]);
        assert!((edge[0].x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_look_at_moves_eye_to_origin() {
        let eye = Point3::new(0.0, 0.0, 5.0);
        let m = Transform::look_at(&eye, &Point3::origin(), &Vector3::y());
        let p = Transform::apply_points(&m, &[eye, Point3::origin()]);
        assert!((p[0] - Point3::origin()).norm() < 1e-6);
        assert!((p[1] - Point3::new(0.0, 0.0, -5.0)).norm() < 1e-6);
    }

    #[test]
    fn test_apply_vectors_ignores_translation() {
        let m = Transform::translation(&Vector3::new(5.0, 5.0, 5.0));
        let v = Transform::apply_vectors(&m, &[Vector3::z(), Vector3::zeros()]);
        assert_eq!(v, vec![Vector3::z(), Vector3::zeros()]);
    }
}
