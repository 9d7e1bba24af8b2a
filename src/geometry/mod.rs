//! Rigid-transform primitives shared by the loaders.

use nalgebra::{Matrix3, Matrix3x4, Quaternion, UnitQuaternion, Vector3};

/// A 3x4 rigid-transform matrix.
///
/// Columns 0..=2 hold a 3x3 rotation matrix, column 3 holds the translation
/// vector. This is the pose representation consumed downstream by the mapping
/// pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    matrix: Matrix3x4<f64>,
}

impl Pose {
    /// Assembles a pose from a rotation block and a translation column.
    pub fn from_rotation_translation(rotation: &Matrix3<f64>, translation: &Vector3<f64>) -> Self {
        let mut matrix = Matrix3x4::zeros();
        matrix.fixed_view_mut::<3, 3>(0, 0).copy_from(rotation);
        matrix.fixed_view_mut::<3, 1>(0, 3).copy_from(translation);
        Pose { matrix }
    }

    /// The 3x3 rotation block.
    pub fn rotation(&self) -> Matrix3<f64> {
        self.matrix.fixed_view::<3, 3>(0, 0).into()
    }

    /// The translation column.
    pub fn translation(&self) -> Vector3<f64> {
        self.matrix.fixed_view::<3, 1>(0, 3).into()
    }

    /// The raw 3x4 matrix.
    pub fn matrix(&self) -> &Matrix3x4<f64> {
        &self.matrix
    }
}

/// Converts a quaternion `(qw, qx, qy, qz)` to a 3x3 rotation matrix using the
/// standard unit-quaternion formula.
///
/// No normalization is performed: a non-unit quaternion silently yields a
/// non-orthonormal matrix. Feeding unit quaternions is the caller's
/// responsibility.
pub fn rotation_from_quaternion(qw: f64, qx: f64, qy: f64, qz: f64) -> Matrix3<f64> {
    let quat = UnitQuaternion::new_unchecked(Quaternion::new(qw, qx, qy, qz));
    *quat.to_rotation_matrix().matrix()
}
