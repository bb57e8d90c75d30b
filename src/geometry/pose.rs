//! Rigid-body pose of a tracked object relative to the camera.

use nalgebra::{Matrix3, Matrix4, Vector3};

/// Homogeneous rigid transform `[R | t; 0 0 0 1]`.
///
/// The rotation block is stored as a plain 3x3 matrix rather than a unit
/// quaternion: poses come straight from dataset files and tracker output and
/// are never re-orthonormalized here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidPose {
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
}

impl RigidPose {
    pub fn new(rotation: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity(), Vector3::zeros())
    }

    /// Pure translation with identity rotation.
    pub fn from_translation(translation: Vector3<f64>) -> Self {
        Self::new(Matrix3::identity(), translation)
    }

    /// Build from the 12 values of a pose line:
    /// `r00 r01 r02 r10 r11 r12 r20 r21 r22 tx ty tz`.
    pub fn from_row_major(values: &[f64; 12]) -> Self {
        let rotation = Matrix3::from_row_slice(&values[..9]);
        let translation = Vector3::new(values[9], values[10], values[11]);
        Self::new(rotation, translation)
    }

    /// Take the upper 3x4 block of a homogeneous matrix. The bottom row is
    /// assumed to be `[0 0 0 1]` and is not checked.
    pub fn from_matrix(m: &Matrix4<f64>) -> Self {
        let rotation = m.fixed_view::<3, 3>(0, 0).into_owned();
        let translation = m.fixed_view::<3, 1>(0, 3).into_owned();
        Self::new(rotation, translation)
    }

    pub fn to_matrix(&self) -> Matrix4<f64> {
        let mut m = Matrix4::identity();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(&self.rotation);
        m.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.translation);
        m
    }

    /// Pose offset by `delta` in translation only.
    pub fn translated(&self, delta: Vector3<f64>) -> Self {
        Self::new(self.rotation, self.translation + delta)
    }

    /// Compose `self * other`.
    pub fn compose(&self, other: &RigidPose) -> Self {
        Self::new(
            self.rotation * other.rotation,
            self.rotation * other.translation + self.translation,
        )
    }
}

impl Default for RigidPose {
    fn default() -> Self {
        Self::identity()
    }
}
